mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

#[derive(Parser)]
#[command(
    name = "dockyard",
    about = "Build reproducible, cache-friendly container images for script projects"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter dockyard.toml
    Init,
    /// Print the generated Dockerfile
    Dockerfile,
    /// Validate the build plan and check the lockfile against the manifest
    Check,
    /// Print the fingerprint of the dependency layer inputs
    Fingerprint,
    /// Bundle the build context and build the image
    Build {
        /// Image tag (default: [image].tag or <project>:latest)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Build even if the lockfile does not match the manifest
        #[arg(long)]
        skip_lock_check: bool,
    },
    /// Run the built image and exit with the container's exit code
    Run {
        /// Image tag (default: [image].tag or <project>:latest)
        #[arg(long, short = 't')]
        tag: Option<String>,
    },
    /// Eject the Dockerfile for manual customization
    Eject,
    /// Check Docker setup and readiness
    Doctor,
    /// List files under ROOT that are hard links to files under ORIGINALS
    #[cfg(unix)]
    FindHardlinks {
        /// Directory searched for links
        root: PathBuf,
        /// Directory holding the original files
        originals: PathBuf,
        /// Only report originals with at least this many links
        #[arg(long, default_value_t = 1)]
        min_links: usize,
        /// Write the report to a file instead of stdout
        #[arg(long)]
        to_file: Option<PathBuf>,
        /// Truncate the report file instead of appending to it
        #[arg(long)]
        no_append: bool,
        /// Resolve symlinks under ROOT instead of skipping them
        #[arg(long)]
        follow_symlinks: bool,
        /// Print each original before its links
        #[arg(long)]
        include_originals: bool,
        /// Directory under ROOT to leave out (repeatable)
        #[arg(long = "skip-directory")]
        skip_directories: Vec<PathBuf>,
    },
    /// Add every subdirectory of PARENT_DIR to a Jellyfin library
    AddAllSubdirectoriesToLibrary {
        /// Name of the Jellyfin library
        library_name: String,
        /// Directory whose subdirectories are added
        parent_dir: PathBuf,
        /// Jellyfin server URL
        #[arg(
            long,
            env = "JELLYFIN_SERVER_URL",
            default_value = dockyard_tasks::jellyfin::DEFAULT_SERVER_URL
        )]
        jellyfin_server_url: String,
        /// Jellyfin API key
        #[arg(long, env = "JELLYFIN_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Substring of local paths to replace before sending them
        #[arg(long)]
        path_replace_from: Option<String>,
        /// Replacement for --path-replace-from
        #[arg(long)]
        path_replace_to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Before parsing, so `.env` can supply the Jellyfin settings.
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    tracing::debug!(dotenv = dotenv_loaded, "environment loaded");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init_project().await?,
        Commands::Dockerfile => commands::dockerfile().await?,
        Commands::Check => commands::check().await?,
        Commands::Fingerprint => commands::fingerprint().await?,
        Commands::Build {
            tag,
            skip_lock_check,
        } => commands::build(tag.as_deref(), skip_lock_check).await?,
        Commands::Run { tag } => commands::run(tag.as_deref()).await?,
        Commands::Eject => commands::eject().await?,
        Commands::Doctor => commands::doctor().await?,
        #[cfg(unix)]
        Commands::FindHardlinks {
            root,
            originals,
            min_links,
            to_file,
            no_append,
            follow_symlinks,
            include_originals,
            skip_directories,
        } => {
            let options = dockyard_tasks::backup::HardlinkOptions {
                root,
                originals,
                min_links,
                follow_symlinks,
                skip_directories,
            };
            commands::find_hardlinks(&options, to_file.as_deref(), !no_append, include_originals)
                .await?
        }
        Commands::AddAllSubdirectoriesToLibrary {
            library_name,
            parent_dir,
            jellyfin_server_url,
            api_key,
            path_replace_from,
            path_replace_to,
        } => {
            let settings = dockyard_tasks::jellyfin::JellyfinSettings {
                server_url: jellyfin_server_url,
                api_key: api_key.map(SecretString::from),
            };
            commands::add_all_subdirectories_to_library(
                &settings,
                &library_name,
                &parent_dir,
                path_replace_from,
                path_replace_to,
            )
            .await?
        }
    }

    Ok(())
}
