use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::plan::BuildPlan;

/// Build context directory, recreated on every bundle.
pub const BUNDLE_DIR: &str = ".dockyard-bundle";

/// Assembles the Docker build context.
///
/// Only the inputs the plan declares are copied: dependency files first,
/// then each source path. Source directories are walked with `.gitignore`
/// rules applied and hidden entries skipped. A declared path that does not
/// exist fails the bundle before anything is sent to Docker.
/// The generated Dockerfile is written into the bundle.
pub fn create_bundle(
    project_dir: &Path,
    plan: &BuildPlan,
    dockerfile_content: &str,
) -> Result<PathBuf, BundleError> {
    let missing: Vec<String> = plan
        .dependency_inputs()
        .iter()
        .chain(plan.source_paths())
        .filter(|p| !project_dir.join(p).exists())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(BundleError::MissingInput { paths: missing });
    }

    let bundle_dir = project_dir.join(BUNDLE_DIR);

    // Clean previous bundle
    if bundle_dir.exists() {
        std::fs::remove_dir_all(&bundle_dir).map_err(|e| BundleError::Cleanup {
            path: bundle_dir.clone(),
            source: e,
        })?;
    }
    create_dir(&bundle_dir)?;

    let mut copied = 0usize;
    for relative in plan.dependency_inputs() {
        copy_file(&project_dir.join(relative), &bundle_dir.join(relative))?;
        copied += 1;
    }

    for relative in plan.source_paths() {
        let src = project_dir.join(relative);
        if src.is_dir() {
            copied += copy_tree(&src, &bundle_dir.join(relative))?;
        } else {
            copy_file(&src, &bundle_dir.join(relative))?;
            copied += 1;
        }
    }

    // Write generated Dockerfile
    std::fs::write(bundle_dir.join("Dockerfile"), dockerfile_content).map_err(|e| {
        BundleError::WriteDockerfile {
            path: bundle_dir.join("Dockerfile"),
            source: e,
        }
    })?;

    tracing::info!(
        path = %bundle_dir.display(),
        files = copied,
        "build context bundled"
    );
    Ok(bundle_dir)
}

fn copy_tree(src_root: &Path, dst_root: &Path) -> Result<usize, BundleError> {
    let walker = WalkBuilder::new(src_root)
        .hidden(false)
        .filter_entry(|entry| {
            let hidden = entry.depth() > 0 && is_hidden_name(entry.file_name());
            if hidden {
                tracing::debug!(path = %entry.path().display(), "skipping hidden entry");
            }
            !hidden
        })
        .git_ignore(true)
        .git_exclude(true)
        .git_global(false)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut copied = 0usize;
    for entry in walker {
        let entry = entry.map_err(|e| BundleError::Walk {
            path: src_root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(src_root)
            .expect("walker yields paths under its root");
        copy_file(entry.path(), &dst_root.join(relative))?;
        copied += 1;
    }

    // Empty source directories still exist in the context.
    create_dir(dst_root)?;
    Ok(copied)
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), BundleError> {
    if let Some(parent) = dst.parent() {
        create_dir(parent)?;
    }
    std::fs::copy(src, dst).map_err(|e| BundleError::CopyFile {
        path: src.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), BundleError> {
    std::fs::create_dir_all(path).map_err(|e| BundleError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("declared build input not found: {}", paths.join(", "))]
    MissingInput { paths: Vec<String> },
    #[error("failed to clean up bundle directory {path}")]
    Cleanup {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk {path}")]
    Walk {
        path: std::path::PathBuf,
        source: ignore::Error,
    },
    #[error("failed to copy file {path}")]
    CopyFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write Dockerfile at {path}")]
    WriteDockerfile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
