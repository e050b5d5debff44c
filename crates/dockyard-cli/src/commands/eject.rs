use dockyard_build::{BuildPlan, DockerfileGenerator};

pub async fn eject() -> anyhow::Result<()> {
    let (project_dir, config) = super::load_project()?;
    let plan = BuildPlan::from_config(&config.image)?;
    let dockerfile = DockerfileGenerator::new(&plan).render();

    dockyard_build::eject::eject(&project_dir, &dockerfile)?;

    println!("Ejected build config to .dockyard/Dockerfile");
    println!("You can now edit it directly. dockyard build will use this file.");
    Ok(())
}
