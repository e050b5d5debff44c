use std::path::Path;

use dockyard_tasks::backup::{self, HardlinkOptions};

pub async fn find_hardlinks(
    options: &HardlinkOptions,
    to_file: Option<&Path>,
    append: bool,
    include_originals: bool,
) -> anyhow::Result<()> {
    // The walk blocks; keep it off the runtime's worker threads.
    let groups = tokio::task::spawn_blocking({
        let options = options.clone();
        move || backup::find_hardlinks(&options)
    })
    .await??;

    let mut out = backup::open_output(to_file, append)?;
    backup::write_report(&groups, include_originals, &mut out)?;
    Ok(())
}
