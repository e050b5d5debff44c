use dockyard_build::BuildPlan;
use dockyard_build::lock;

/// Validate the plan and check the lockfile, without bundling or building.
pub async fn check() -> anyhow::Result<()> {
    let (project_dir, config) = super::load_project()?;

    let plan = BuildPlan::from_config(&config.image)?;
    println!("Build plan OK (base image {})", plan.base_image());

    let report = lock::check_drift(&project_dir, &config.image)?;
    println!(
        "{} is up to date ({} declared, {} locked)",
        config.image.lockfile(),
        report.declared.len(),
        report.locked,
    );
    Ok(())
}
