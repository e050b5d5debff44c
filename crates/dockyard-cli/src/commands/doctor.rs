use std::path::Path;

use dockyard_core::{CONFIG_FILE, DockyardConfig};
use dockyard_docker::{CheckResult, DockerClient};

pub async fn doctor() -> anyhow::Result<()> {
    let mut report = DockerClient::new().doctor().await;

    // A missing config file is fine: every setting has a default.
    report.config_file = if !Path::new(CONFIG_FILE).exists() {
        CheckResult::ok("not found, using defaults")
    } else {
        match DockyardConfig::load(Path::new(".")) {
            Ok(_) => CheckResult::ok("Found"),
            Err(e) => CheckResult::fail(&e.to_string()),
        }
    };

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
