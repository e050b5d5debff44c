use std::path::Path;

use dockyard_tasks::jellyfin::{self, AddOutcome, JellyfinSettings, PathReplace};

pub async fn add_all_subdirectories_to_library(
    settings: &JellyfinSettings,
    library_name: &str,
    parent_dir: &Path,
    path_replace_from: Option<String>,
    path_replace_to: Option<String>,
) -> anyhow::Result<()> {
    let client = settings.connect()?;
    let replace = PathReplace::from_options(path_replace_from, path_replace_to)?;

    let outcome =
        jellyfin::add_all_subdirectories(&client, library_name, parent_dir, replace.as_ref())
            .await?;

    match outcome {
        AddOutcome::NothingToAdd => println!("No new subdirectory paths to add, exiting."),
        AddOutcome::Added { library, paths } => {
            for path in &paths {
                println!("  + {path}");
            }
            println!("Added {} new paths to library '{library}'.", paths.len());
        }
    }
    Ok(())
}
