//! Capabilities the loader consumes from its host runtime.

use std::cell::RefCell;
use std::collections::HashSet;
use std::env;
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::hooks::AutoloadStack;

/// Environment variable holding the fallback search path in platform
/// path-list syntax.
pub const SEARCH_PATH_ENV: &str = "SYMLOAD_PATH";

/// Trail rendering of a probe with no search roots.
pub const EMPTY_SEARCH_PATH: &str = "<empty search path>";

pub type ExecError = Box<dyn Error + Send + Sync + 'static>;

/// Answers whether a symbol is currently defined in the host.
pub trait SymbolTable {
    fn is_defined(&self, name: &str) -> bool;
}

/// Runs a source file's top-level definitions. May re-enter the loader.
pub trait Executor {
    fn execute(&self, path: &Path) -> Result<(), ExecError>;
}

pub trait FileProbe {
    fn probe_readable(&self, path: &Path) -> bool;

    /// Looks `relative` up on the generic search path and returns its
    /// canonical absolute path.
    fn probe_search_path(&self, relative: &Path) -> Option<PathBuf>;

    /// Human readable description of the search path, used in trails.
    fn describe_search_path(&self) -> String;
}

/// Bundle of host capabilities handed to a loader.
#[derive(Clone)]
pub struct Host {
    pub symbols: Rc<dyn SymbolTable>,
    pub executor: Rc<dyn Executor>,
    pub probe: Rc<dyn FileProbe>,
    pub hooks: Rc<AutoloadStack>,
}

impl Host {
    pub fn new(
        symbols: Rc<dyn SymbolTable>,
        executor: Rc<dyn Executor>,
        probe: Rc<dyn FileProbe>,
        hooks: Rc<AutoloadStack>,
    ) -> Self {
        Self {
            symbols,
            executor,
            probe,
            hooks,
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("search_path", &self.probe.describe_search_path())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

//==================================================
// Filesystem probe
//==================================================

/// [`FileProbe`] backed by the real filesystem and an ordered list of
/// search roots.
#[derive(Debug, Clone, Default)]
pub struct FsProbe {
    search_path: Vec<PathBuf>,
}

impl FsProbe {
    pub fn new<I, P>(search_path: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_path: search_path.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the search path from `SYMLOAD_PATH`, empty when unset.
    pub fn from_env() -> Self {
        Self::from_path_list(env::var_os(SEARCH_PATH_ENV).as_deref())
    }

    /// Splits a platform path list such as `/a:/b`; empty entries are dropped.
    pub fn from_path_list(value: Option<&OsStr>) -> Self {
        let search_path = value
            .map(|value| {
                env::split_paths(value)
                    .filter(|root| !root.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { search_path }
    }

    pub fn add_search_path<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        if !self.search_path.contains(&path) {
            self.search_path.push(path);
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    fn is_readable_file(path: &Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }
}

impl FileProbe for FsProbe {
    fn probe_readable(&self, path: &Path) -> bool {
        Self::is_readable_file(path)
    }

    fn probe_search_path(&self, relative: &Path) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| Self::is_readable_file(candidate))
            .map(|found| found.canonicalize().unwrap_or(found))
    }

    fn describe_search_path(&self) -> String {
        if self.search_path.is_empty() {
            return EMPTY_SEARCH_PATH.to_string();
        }
        match env::join_paths(&self.search_path) {
            Ok(joined) => joined.to_string_lossy().into_owned(),
            Err(_) => self
                .search_path
                .iter()
                .map(|root| root.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

//==================================================
// In-memory symbol table
//==================================================

/// A [`SymbolTable`] that hosts and tests can populate directly.
#[derive(Debug, Default)]
pub struct MemorySymbols {
    defined: RefCell<HashSet<String>>,
}

impl MemorySymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the symbol was already defined.
    pub fn define(&self, name: impl Into<String>) -> bool {
        self.defined.borrow_mut().insert(name.into())
    }

    pub fn undefine(&self, name: &str) -> bool {
        self.defined.borrow_mut().remove(name)
    }

    pub fn len(&self) -> usize {
        self.defined.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.borrow().is_empty()
    }
}

impl SymbolTable for MemorySymbols {
    fn is_defined(&self, name: &str) -> bool {
        self.defined.borrow().contains(name)
    }
}
