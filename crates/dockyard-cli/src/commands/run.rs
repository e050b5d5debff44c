use dockyard_docker::DockerClient;

/// Run the image; the process exits with the container's exit code.
pub async fn run(tag: Option<&str>) -> anyhow::Result<()> {
    let (project_dir, config) = super::load_project()?;
    let tag = tag.map_or_else(|| config.image_tag(&project_dir), str::to_owned);

    let code = DockerClient::new().run(&tag).await?;
    tracing::debug!(code, "container exited");
    std::process::exit(code);
}
