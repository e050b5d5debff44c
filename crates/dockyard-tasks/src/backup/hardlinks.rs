use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ignore::{DirEntry, WalkBuilder, WalkState};

/// Identity of a file's data: hard links share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    fn of(metadata: &std::fs::Metadata) -> Self {
        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HardlinkOptions {
    /// Tree searched for links.
    pub root: PathBuf,
    /// Tree holding the original files. Excluded from the search.
    pub originals: PathBuf,
    /// Links required outside `originals` before a file is reported.
    pub min_links: usize,
    /// Resolve symlinks under `root` instead of skipping them.
    pub follow_symlinks: bool,
    /// Subtrees of `root` that are not searched.
    pub skip_directories: Vec<PathBuf>,
}

impl Default for HardlinkOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            originals: PathBuf::from("."),
            min_links: 1,
            follow_symlinks: false,
            skip_directories: Vec::new(),
        }
    }
}

/// An original file and the links to it found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardlinkGroup {
    /// Paths under `originals` sharing the data (usually one).
    pub originals: Vec<PathBuf>,
    pub links: Vec<PathBuf>,
}

/// Find files under `root` that are hard links to files under `originals`.
///
/// Only groups with at least `min_links` links outside `originals` are
/// returned. Groups and the paths inside them are sorted.
pub fn find_hardlinks(options: &HardlinkOptions) -> Result<Vec<HardlinkGroup>, HardlinkError> {
    if options.min_links < 1 {
        return Err(HardlinkError::MinLinks);
    }
    let root = absolute_dir(&options.root)?;
    let originals = absolute_dir(&options.originals)?;
    let skip: Vec<PathBuf> = options
        .skip_directories
        .iter()
        .map(|d| {
            std::path::absolute(d).map_err(|e| HardlinkError::Resolve {
                path: d.clone(),
                source: e,
            })
        })
        .collect::<Result<_, _>>()?;

    let index = index_originals(&originals);
    tracing::debug!(files = index.len(), originals = %originals.display(), "indexed originals");

    let links = collect_links(&root, &originals, &skip, &index, options.follow_symlinks);

    let mut groups: Vec<HardlinkGroup> = links
        .into_iter()
        .filter_map(|(id, mut links)| {
            // A followed symlink can resolve to a link the walk also visits.
            links.sort();
            links.dedup();
            if links.len() < options.min_links {
                return None;
            }
            let mut originals = index.get(&id)?.clone();
            originals.sort();
            Some(HardlinkGroup { originals, links })
        })
        .collect();
    groups.sort_by(|a, b| a.originals.cmp(&b.originals));

    tracing::info!(groups = groups.len(), "hard link search finished");
    Ok(groups)
}

fn index_originals(originals: &Path) -> HashMap<FileId, Vec<PathBuf>> {
    let index: Mutex<HashMap<FileId, Vec<PathBuf>>> = Mutex::new(HashMap::new());

    walk_files(WalkBuilder::new(originals), |entry| {
        // Symlinked files count as their target.
        let Some(metadata) = stat(entry.path()) else {
            return;
        };
        if metadata.is_dir() {
            return;
        }
        index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(FileId::of(&metadata))
            .or_default()
            .push(entry.path().to_path_buf());
    });

    index.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn collect_links(
    root: &Path,
    originals: &Path,
    skip: &[PathBuf],
    index: &HashMap<FileId, Vec<PathBuf>>,
    follow_symlinks: bool,
) -> HashMap<FileId, Vec<PathBuf>> {
    let found: Mutex<HashMap<FileId, Vec<PathBuf>>> = Mutex::new(HashMap::new());

    let mut pruned = skip.to_vec();
    pruned.push(originals.to_path_buf());
    let mut builder = WalkBuilder::new(root);
    builder.filter_entry(move |entry| !pruned.iter().any(|p| entry.path().starts_with(p)));

    walk_files(builder, |entry| {
        let is_symlink = entry.path_is_symlink();
        if is_symlink && !follow_symlinks {
            return;
        }
        let path = if is_symlink {
            match entry.path().canonicalize() {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "dangling symlink");
                    return;
                }
            }
        } else {
            entry.path().to_path_buf()
        };
        if path.starts_with(originals) {
            return;
        }
        let Some(metadata) = stat(&path) else {
            return;
        };
        let id = FileId::of(&metadata);
        if metadata.is_dir() || !index.contains_key(&id) {
            return;
        }
        found
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .push(path);
    });

    found.into_inner().unwrap_or_else(PoisonError::into_inner)
}

/// Parallel walk calling `visit` for every non-directory entry.
fn walk_files<F>(mut builder: WalkBuilder, visit: F)
where
    F: Fn(&DirEntry) + Sync,
{
    builder.standard_filters(false).follow_links(false);
    let visit = &visit;
    builder.build_parallel().run(|| {
        Box::new(move |result: Result<DirEntry, ignore::Error>| {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        visit(&entry);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable entry"),
            }
            WalkState::Continue
        })
    });
}

/// Follows symlinks. Files removed mid-walk are skipped.
fn stat(path: &Path) -> Option<std::fs::Metadata> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to stat");
            None
        }
    }
}

fn absolute_dir(path: &Path) -> Result<PathBuf, HardlinkError> {
    let absolute = std::path::absolute(path).map_err(|e| HardlinkError::Resolve {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !absolute.is_dir() {
        return Err(HardlinkError::NotADirectory(absolute));
    }
    Ok(absolute)
}

/// Write one path per line: optionally the originals, then every link.
pub fn write_report<W: Write>(
    groups: &[HardlinkGroup],
    include_originals: bool,
    out: &mut W,
) -> io::Result<()> {
    for group in groups {
        if include_originals {
            for original in &group.originals {
                writeln!(out, "{}", original.display())?;
            }
        }
        for link in &group.links {
            writeln!(out, "{}", link.display())?;
        }
    }
    out.flush()
}

/// Stdout, or a file that is appended to unless `append` is false.
pub fn open_output(to_file: Option<&Path>, append: bool) -> Result<Box<dyn Write>, HardlinkError> {
    match to_file {
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(path)
                .map_err(|e| HardlinkError::Output {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HardlinkError {
    #[error("min_links must be at least 1")]
    MinLinks,

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to resolve {path}")]
    Resolve {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to open output file {path}")]
    Output {
        path: PathBuf,
        source: io::Error,
    },
}
