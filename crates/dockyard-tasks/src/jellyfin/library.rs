use std::collections::BTreeSet;
use std::path::Path;

use tokio::task::JoinSet;

use super::{JellyfinClient, JellyfinError};

/// Substring rewrite applied to local paths before they are sent to the
/// server, for servers that mount the same folders elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReplace {
    pub from: String,
    pub to: String,
}

impl PathReplace {
    /// Both halves or neither.
    pub fn from_options(
        from: Option<String>,
        to: Option<String>,
    ) -> Result<Option<Self>, JellyfinError> {
        let from = from.filter(|s| !s.is_empty());
        let to = to.filter(|s| !s.is_empty());
        match (from, to) {
            (Some(from), Some(to)) => Ok(Some(Self { from, to })),
            (None, None) => Ok(None),
            _ => Err(JellyfinError::IncompletePathReplace),
        }
    }

    fn apply(&self, path: &str) -> String {
        path.replace(&self.from, &self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Every subdirectory is already a location of the library.
    NothingToAdd,
    Added { library: String, paths: Vec<String> },
}

/// Absolute paths of the immediate subdirectories of `parent`, rewritten
/// by `replace`.
pub fn subdirectory_paths(
    parent: &Path,
    replace: Option<&PathReplace>,
) -> Result<BTreeSet<String>, JellyfinError> {
    let read_dir_err = |e| JellyfinError::ReadDir {
        path: parent.to_path_buf(),
        source: e,
    };
    let parent = parent.canonicalize().map_err(read_dir_err)?;
    if !parent.is_dir() {
        return Err(JellyfinError::NotADirectory(parent));
    }

    let mut paths = BTreeSet::new();
    for entry in std::fs::read_dir(&parent).map_err(|e| JellyfinError::ReadDir {
        path: parent.clone(),
        source: e,
    })? {
        let entry = entry.map_err(|e| JellyfinError::ReadDir {
            path: parent.clone(),
            source: e,
        })?;
        // Follows symlinks, like a directory listing would.
        if !entry.path().is_dir() {
            continue;
        }
        let path = entry.path();
        let path = path
            .to_str()
            .ok_or_else(|| JellyfinError::NonUtf8Path(path.clone()))?;
        paths.insert(match replace {
            Some(r) => r.apply(path),
            None => path.to_owned(),
        });
    }
    Ok(paths)
}

/// Add every subdirectory of `parent` that the library does not list yet.
///
/// All but one path are added concurrently without a rescan; the last one
/// is added with `refreshLibrary=true` so the server scans exactly once.
pub async fn add_all_subdirectories(
    client: &JellyfinClient,
    library_name: &str,
    parent: &Path,
    replace: Option<&PathReplace>,
) -> Result<AddOutcome, JellyfinError> {
    let paths = subdirectory_paths(parent, replace)?;
    tracing::debug!(candidates = paths.len(), parent = %parent.display(), "scanned subdirectories");

    let libraries = client.get_libraries().await?;
    let library = libraries
        .into_iter()
        .find(|lib| lib.name == library_name)
        .ok_or_else(|| JellyfinError::LibraryNotFound(library_name.to_owned()))?;

    let existing: BTreeSet<&str> = library.locations.iter().map(String::as_str).collect();
    let mut new_paths: Vec<String> = paths
        .into_iter()
        .filter(|p| !existing.contains(p.as_str()))
        .collect();

    let Some(last) = new_paths.pop() else {
        return Ok(AddOutcome::NothingToAdd);
    };

    let mut tasks = JoinSet::new();
    for path in new_paths.iter().cloned() {
        let client = client.clone();
        let name = library.name.clone();
        tasks.spawn(async move { client.add_path_to_library(&name, &path, false).await });
    }
    while let Some(result) = tasks.join_next().await {
        result??;
    }

    client.add_path_to_library(&library.name, &last, true).await?;
    new_paths.push(last);

    tracing::info!(library = %library.name, added = new_paths.len(), "library paths added");
    Ok(AddOutcome::Added {
        library: library.name,
        paths: new_paths,
    })
}
