use std::path::Path;

use dockyard_core::CONFIG_FILE;

const TEMPLATE: &str = r#"[project]
# name = "media-tools"

[image]
# toolchain = "uv"            # or "npm"
# base_image = "ghcr.io/astral-sh/uv:0.5.11-python3.13-bookworm-slim"
# workdir = "/app"
# version_pin = ".python-version"
# manifest = "pyproject.toml"
# lockfile = "uv.lock"
# sources = ["src"]
# entry = "main.py"
# tag = "media-tools:latest"
"#;

/// Write a commented `dockyard.toml` into the current directory.
pub async fn init_project() -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        eprintln!("{CONFIG_FILE} already exists, skipping");
        return Ok(());
    }

    std::fs::write(path, TEMPLATE)?;
    println!("Created {CONFIG_FILE}");
    println!();
    println!("Next steps:");
    println!();
    println!("  1. Lock dependencies:");
    println!("     uv lock");
    println!();
    println!("  2. Build and run:");
    println!("     dockyard build && dockyard run");

    Ok(())
}
