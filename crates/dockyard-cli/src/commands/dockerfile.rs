use dockyard_build::{BuildPlan, DockerfileGenerator};

pub async fn dockerfile() -> anyhow::Result<()> {
    let (_, config) = super::load_project()?;
    let plan = BuildPlan::from_config(&config.image)?;
    print!("{}", DockerfileGenerator::new(&plan).render());
    Ok(())
}
