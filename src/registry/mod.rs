//==================================================
// File: registry.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Track prefix search roots and exact symbol file overrides
// Objective: Keep registration order so lookups stay predictable
//==================================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//==================================================
// Section 1.0 - Path lists
//==================================================

/// One directory or an ordered list of directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathList {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl PathList {
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            PathList::One(path) => vec![path],
            PathList::Many(paths) => paths,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        match self {
            PathList::One(path) => std::slice::from_ref(path).iter(),
            PathList::Many(paths) => paths.iter(),
        }
    }

    pub(crate) fn extend(&mut self, more: PathList) {
        let mut paths = std::mem::replace(self, PathList::Many(Vec::new())).into_paths();
        paths.extend(more.into_paths());
        *self = PathList::Many(paths);
    }
}

impl From<&str> for PathList {
    fn from(value: &str) -> Self {
        PathList::One(PathBuf::from(value))
    }
}

impl From<String> for PathList {
    fn from(value: String) -> Self {
        PathList::One(PathBuf::from(value))
    }
}

impl From<&Path> for PathList {
    fn from(value: &Path) -> Self {
        PathList::One(value.to_path_buf())
    }
}

impl From<&PathBuf> for PathList {
    fn from(value: &PathBuf) -> Self {
        PathList::One(value.clone())
    }
}

impl From<PathBuf> for PathList {
    fn from(value: PathBuf) -> Self {
        PathList::One(value)
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for PathList {
    fn from(value: Vec<P>) -> Self {
        PathList::Many(value.into_iter().map(Into::into).collect())
    }
}

impl<P: Into<PathBuf>, const N: usize> From<[P; N]> for PathList {
    fn from(value: [P; N]) -> Self {
        PathList::Many(value.into_iter().map(Into::into).collect())
    }
}

/// Drops trailing separators without touching the rest of the path, so
/// non UTF-8 directories survive registration byte for byte.
fn trim_trailing_separators(path: PathBuf) -> PathBuf {
    let trimmed = path.components().as_path();
    if trimmed.as_os_str().len() == path.as_os_str().len() {
        return path;
    }
    trimmed.to_path_buf()
}

//==================================================
// Section 2.0 - Registry
//==================================================

/// Prefix search roots plus the exact-name override table.
///
/// Prefix registration is additive only. The override table can be merged
/// into or replaced wholesale; both forms are kept on purpose.
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    prefixes: IndexMap<String, Vec<PathBuf>>,
    overrides: IndexMap<String, PathBuf>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends directories for `prefix`, creating the entry on first use.
    pub fn add(&mut self, prefix: impl Into<String>, paths: impl Into<PathList>) {
        let prefix = prefix.into();
        let dirs = self.prefixes.entry(prefix).or_default();
        for path in paths.into().into_paths() {
            dirs.push(trim_trailing_separators(path));
        }
    }

    /// Calls [`PathRegistry::add`] for every entry. Existing directories stay.
    pub fn add_all<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathList>,
    {
        for (prefix, paths) in entries {
            self.add(prefix, paths);
        }
    }

    pub fn prefixes(&self) -> &IndexMap<String, Vec<PathBuf>> {
        &self.prefixes
    }

    pub fn set_override(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.overrides.insert(name.into(), path.into());
    }

    pub fn add_overrides<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathBuf>,
    {
        for (name, path) in entries {
            self.set_override(name, path);
        }
    }

    /// Replaces the whole override table.
    pub fn set_overrides<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathBuf>,
    {
        self.overrides = entries
            .into_iter()
            .map(|(name, path)| (name.into(), path.into()))
            .collect();
    }

    pub fn overrides(&self) -> &IndexMap<String, PathBuf> {
        &self.overrides
    }

    pub fn override_for(&self, name: &str) -> Option<&Path> {
        self.overrides.get(name).map(PathBuf::as_path)
    }
}


//==================================================
// End of file
//==================================================
