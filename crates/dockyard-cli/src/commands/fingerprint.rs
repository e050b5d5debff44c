use dockyard_build::BuildPlan;
use dockyard_build::fingerprint::dependency_fingerprint;

pub async fn fingerprint() -> anyhow::Result<()> {
    let (project_dir, config) = super::load_project()?;
    let plan = BuildPlan::from_config(&config.image)?;
    println!("{}", dependency_fingerprint(&project_dir, &plan)?);
    Ok(())
}
