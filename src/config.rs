//! Declarative loader configuration loaded from TOML or JSON.

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::host::FsProbe;
use crate::inflector::Inflector;
use crate::loader::{Mode, SymbolLoader};
use crate::registry::PathList;

/// Default configuration file name inside the `symload` config directory.
const CONFIG_FILE: &str = "loader.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported configuration format '{0}'")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Loader configuration. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Failure strictness; `SYMLOAD_MODE` takes precedence when set.
    pub mode: Option<Mode>,
    /// Source file extension used by the inflector.
    pub extension: Option<String>,
    /// Hierarchy separator inside symbol names.
    pub namespace_separator: Option<String>,
    /// Prefix to base directories, tried in file order.
    pub prefixes: IndexMap<String, PathList>,
    /// Exact symbol to file overrides.
    pub overrides: IndexMap<String, PathBuf>,
    /// Fallback search roots for [`FsProbe`].
    pub search_path: Vec<PathBuf>,
}

impl LoaderConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(data)?)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Reads a `.toml` or `.json` file, chosen by extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading loader configuration from {}", path.display()))?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml")
            .to_ascii_lowercase();
        let config = match format.as_str() {
            "toml" => Self::from_toml_str(&data),
            "json" => Self::from_json_str(&data),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
        .with_context(|| format!("parsing loader configuration {}", path.display()))?;
        Ok(config)
    }

    /// `<config dir>/symload/loader.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("symload").join(CONFIG_FILE))
    }

    /// Loads the default file, falling back to an empty configuration when
    /// it does not exist.
    pub fn load_default() -> anyhow::Result<Self> {
        Self::load_optional(Self::default_path().as_deref())
    }

    fn load_optional(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Layers `other` on top of `self`: prefix directories are appended,
    /// overrides merged, search roots appended and scalar settings replaced
    /// when `other` sets them.
    pub fn layer(&mut self, other: LoaderConfig) {
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.extension.is_some() {
            self.extension = other.extension;
        }
        if other.namespace_separator.is_some() {
            self.namespace_separator = other.namespace_separator;
        }
        for (prefix, paths) in other.prefixes {
            match self.prefixes.get_mut(&prefix) {
                Some(existing) => existing.extend(paths),
                None => {
                    self.prefixes.insert(prefix, paths);
                }
            }
        }
        self.overrides.extend(other.overrides);
        for root in other.search_path {
            if !self.search_path.contains(&root) {
                self.search_path.push(root);
            }
        }
    }

    /// The effective mode after the `SYMLOAD_MODE` override.
    pub fn effective_mode(&self) -> Mode {
        self.mode_over(Mode::from_env())
    }

    fn mode_over(&self, env_mode: Option<Mode>) -> Mode {
        env_mode.or(self.mode).unwrap_or_default()
    }

    pub fn inflector(&self) -> Inflector {
        let mut inflector = Inflector::new();
        if let Some(separator) = &self.namespace_separator {
            inflector = inflector.with_namespace_separator(separator.clone());
        }
        if let Some(extension) = &self.extension {
            inflector = inflector.with_extension(extension.clone());
        }
        inflector
    }

    /// Filesystem probe seeded from `SYMLOAD_PATH` followed by `search_path`.
    pub fn probe(&self) -> FsProbe {
        self.extend_probe(FsProbe::from_env())
    }

    fn extend_probe(&self, mut probe: FsProbe) -> FsProbe {
        for root in &self.search_path {
            probe.add_search_path(root.clone());
        }
        probe
    }

    /// Applies mode, prefixes and overrides to an existing loader. Prefixes
    /// and overrides are added to what the loader already has.
    pub fn apply(&self, loader: &SymbolLoader) {
        loader.set_mode(self.effective_mode());
        loader.add_all(self.prefixes.clone());
        loader.add_overrides(self.overrides.clone());
    }
}
