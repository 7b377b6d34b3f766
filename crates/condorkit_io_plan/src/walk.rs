//! Filesystem access seam and bounded-depth tree enumeration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::spec::EnumPathKind;

/// The only I/O the planner performs.
///
/// Every call goes to the backing store; nothing is cached between calls.
pub trait FsAccessor {
    /// Whether anything exists at `path` (symlinks are followed).
    fn exists(&self, path: &Path) -> bool;
    /// Whether `path` is a directory (symlinks are followed).
    fn is_dir(&self, path: &Path) -> bool;
    /// Whether `path` is a regular file (symlinks are followed).
    fn is_file(&self, path: &Path) -> bool;
    /// Full paths of the immediate children of `path`, in listing order.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Classify `path` now.
    fn classify(&self, path: &Path) -> EnumPathKind {
        if self.is_dir(path) {
            EnumPathKind::Directory
        } else if self.is_file(path) {
            EnumPathKind::File
        } else {
            EnumPathKind::Missing
        }
    }
}

/// [`FsAccessor`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FsAccessor for StdFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut l_paths = Vec::new();
        for entry_res in fs::read_dir(path)? {
            l_paths.push(entry_res?.path());
        }
        Ok(l_paths)
    }
}

/// Immediate children of `path_dir`, sorted by name.
///
/// Missing paths, plain files and listing failures all yield an empty list.
pub fn list_children<F: FsAccessor + ?Sized>(fs_accessor: &F, path_dir: &Path) -> Vec<PathBuf> {
    if !fs_accessor.is_dir(path_dir) {
        return Vec::new();
    }
    match fs_accessor.list_dir(path_dir) {
        Ok(mut l_paths) => {
            l_paths.sort();
            l_paths
        }
        Err(e) => {
            tracing::debug!(
                path = %path_dir.display(),
                "Listing failed, treating as empty ({e})"
            );
            Vec::new()
        }
    }
}

/// Every descendant of `path_dir` at levels `1..=max(depth, 1)`.
///
/// Level 1 comes first, then level 2, and so on. Depth 0 resolves to the
/// immediate children.
pub fn list_up_to_depth<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    path_dir: &Path,
    depth: usize,
) -> Vec<PathBuf> {
    let n_levels = depth.max(1);
    let mut l_found = Vec::new();
    let mut l_frontier = vec![path_dir.to_path_buf()];

    for _ in 0..n_levels {
        let mut l_next = Vec::new();
        for path_parent in &l_frontier {
            l_next.extend(list_children(fs_accessor, path_parent));
        }
        if l_next.is_empty() {
            break;
        }
        l_found.extend(l_next.iter().cloned());
        l_frontier = l_next;
    }

    l_found
}
