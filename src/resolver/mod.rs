//=====================================================
// File: resolver.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Locate the source file expected to define a symbol
// Objective: Walk overrides, prefix roots and the search path, recording
//            every location probed
//=====================================================

use crate::host::FileProbe;
use crate::inflector::Inflector;
use crate::registry::PathRegistry;
use std::ffi::OsString;
use std::fmt;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use tracing::{debug, trace};

/// Ordered record of every location one lookup probed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail {
    entries: Vec<String>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(entry)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Via {
    Override,
    Prefix(String),
    SearchPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub via: Via,
}

/// Result of a single lookup together with its own trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub location: Option<Location>,
    pub trail: Trail,
}

impl Lookup {
    pub fn path(&self) -> Option<&Path> {
        self.location.as_ref().map(|location| location.path.as_path())
    }

    pub fn is_found(&self) -> bool {
        self.location.is_some()
    }
}

pub struct Resolver<'a> {
    registry: &'a PathRegistry,
    inflector: &'a Inflector,
    probe: &'a dyn FileProbe,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a PathRegistry, inflector: &'a Inflector, probe: &'a dyn FileProbe) -> Self {
        Self {
            registry,
            inflector,
            probe,
        }
    }

    pub fn find(&self, name: &str) -> Lookup {
        if let Some(path) = self.registry.override_for(name) {
            debug!(symbol = name, path = %path.display(), "resolved through override");
            return Lookup {
                location: Some(Location {
                    path: path.to_path_buf(),
                    via: Via::Override,
                }),
                trail: Trail::new(),
            };
        }

        let mut trail = Trail::new();

        for (prefix, dirs) in self.registry.prefixes() {
            if !name.starts_with(prefix.as_str()) {
                continue;
            }
            let relative = self.inflector.to_relative_path(name);
            for dir in dirs {
                trail.record(format!("{} (prefix {})", dir.display(), prefix));
                let candidate = join_candidate(dir, &relative);
                trace!(symbol = name, candidate = %candidate.display(), "probing");
                if self.probe.probe_readable(&candidate) {
                    debug!(symbol = name, path = %candidate.display(), prefix = %prefix, "resolved");
                    return Lookup {
                        location: Some(Location {
                            path: candidate,
                            via: Via::Prefix(prefix.clone()),
                        }),
                        trail,
                    };
                }
            }
        }

        let relative = self.inflector.to_relative_path(name);
        trail.record(format!(
            "{} (search path for {})",
            self.probe.describe_search_path(),
            relative.display()
        ));
        match self.probe.probe_search_path(&relative) {
            Some(path) => {
                debug!(symbol = name, path = %path.display(), "resolved on search path");
                Lookup {
                    location: Some(Location {
                        path,
                        via: Via::SearchPath,
                    }),
                    trail,
                }
            }
            None => {
                debug!(symbol = name, probed = trail.len(), "not found");
                Lookup {
                    location: None,
                    trail,
                }
            }
        }
    }
}

// `dir` may be empty after separator trimming (a root of "/"), so this joins
// textually instead of with `Path::join`.
fn join_candidate(dir: &Path, relative: &Path) -> PathBuf {
    let mut joined = OsString::from(dir.as_os_str());
    joined.push(MAIN_SEPARATOR_STR);
    joined.push(relative.as_os_str());
    PathBuf::from(joined)
}


//=====================================================
// End of file
//=====================================================
