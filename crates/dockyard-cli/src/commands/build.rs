use dockyard_docker::{DockerClient, FINGERPRINT_LABEL};

/// Prepare the build context and build the image with Docker.
pub async fn build(tag: Option<&str>, skip_lock_check: bool) -> anyhow::Result<()> {
    let (project_dir, config) = super::load_project()?;
    let tag = tag.map_or_else(|| config.image_tag(&project_dir), str::to_owned);

    println!("Preparing build context...");
    let prepared = dockyard_build::prepare(&project_dir, &config.image, skip_lock_check)?;
    if prepared.ejected {
        println!("Using ejected Dockerfile from .dockyard/Dockerfile");
    }
    println!("Dependency fingerprint: {}", prepared.fingerprint);

    let client = DockerClient::new();
    match client.image_fingerprint(&tag).await {
        Ok(Some(previous)) if previous == prepared.fingerprint => {
            println!("Dependencies unchanged since the last build of {tag}");
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "no previous image to compare"),
    }

    println!("Building {tag}...");
    let labels = [(FINGERPRINT_LABEL.to_owned(), prepared.fingerprint.clone())];
    client.build(&prepared.bundle_dir, &tag, &labels).await?;

    println!();
    println!("Built {tag}");
    Ok(())
}
