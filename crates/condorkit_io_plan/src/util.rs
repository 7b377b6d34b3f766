use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

////////////////////////////////////////////////////////////////////////////////
// #region PathSet

/// Insertion-ordered set of paths, unique by full path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPathSet {
    l_paths: Vec<PathBuf>,
    set_paths: HashSet<PathBuf>,
}

impl SpecPathSet {
    /// Insert `path`; returns `false` if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if !self.set_paths.insert(path.clone()) {
            return false;
        }
        self.l_paths.push(path);
        true
    }

    /// Exact membership.
    pub fn contains(&self, path: &Path) -> bool {
        self.set_paths.contains(path)
    }

    /// Whether `path` equals or lies under any member.
    pub fn covers(&self, path: &Path) -> bool {
        self.l_paths.iter().any(|member| path.starts_with(member))
    }

    /// Whether any member lies strictly under `path`.
    pub fn has_strict_descendant_of(&self, path: &Path) -> bool {
        self.l_paths
            .iter()
            .any(|member| member != path && member.starts_with(path))
    }

    /// Keep only members for which `predicate` holds, preserving order.
    pub fn retain<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&Path) -> bool,
    {
        let set_paths = &mut self.set_paths;
        self.l_paths.retain(|path| {
            let b_keep = predicate(path.as_path());
            if !b_keep {
                set_paths.remove(path);
            }
            b_keep
        });
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.l_paths.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.l_paths.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.l_paths.is_empty()
    }

    /// Members in insertion order.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.l_paths
    }
}

impl FromIterator<PathBuf> for SpecPathSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        let mut set_out = Self::default();
        for path in iter {
            set_out.insert(path);
        }
        set_out
    }
}

impl<'a> IntoIterator for &'a SpecPathSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.l_paths.iter()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Normal components of `path` relative to `path_dir_base`.
///
/// Returns an empty list when `path` is not under `path_dir_base`.
pub(crate) fn derive_relative_components(path: &Path, path_dir_base: &Path) -> Vec<String> {
    let Ok(path_rel) = path.strip_prefix(path_dir_base) else {
        return Vec::new();
    };
    path_rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

/// `/`-joined relative path string, independent of the host separator.
pub(crate) fn derive_relative_string(path: &Path, path_dir_base: &Path) -> String {
    derive_relative_components(path, path_dir_base).join("/")
}

/// `path_dir_dst` joined with `path_rel`, or `path_dir_dst` itself when
/// `path_rel` is empty.
pub(crate) fn join_or_root(path_dir_dst: &Path, path_rel: &Path) -> PathBuf {
    if path_rel.as_os_str().is_empty() {
        return path_dir_dst.to_path_buf();
    }
    path_dir_dst.join(path_rel)
}

/// Destination directory that receives `path_rel` when copied under
/// `path_dir_dst` with its parent structure kept.
pub(crate) fn derive_destination_parent(path_dir_dst: &Path, path_rel: &Path) -> PathBuf {
    match path_rel.parent() {
        Some(parent) => join_or_root(path_dir_dst, parent),
        None => path_dir_dst.to_path_buf(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
