//==================================================
// File: loader.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Coordinate on-demand symbol loading
// Objective: Resolve, execute and record symbol files under a strictness mode
//==================================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::hooks::{Autoload, HookId};
use crate::host::Host;
use crate::inflector::Inflector;
use crate::registry::{PathList, PathRegistry};
use crate::resolver::{Lookup, Resolver};
use crate::symbol::SymbolName;

mod errors;

pub use errors::LoadError;

/// Environment variable that overrides the configured mode.
pub const MODE_ENV: &str = "SYMLOAD_MODE";

//==================================================
// Section 1.0 - Mode
//==================================================

/// How strictly `load` reports failures.
///
/// * `Silent` never fails for missing files or undeclared symbols.
/// * `Normal` fails when no file is found.
/// * `Debug` also fails on re-requests of defined symbols and on files that
///   run without declaring their symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "ModeRepr")]
pub enum Mode {
    Silent,
    #[default]
    Normal,
    Debug,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Silent => "silent",
            Mode::Normal => "normal",
            Mode::Debug => "debug",
        }
    }

    /// Reads `SYMLOAD_MODE`; unset or unparseable values yield `None`.
    pub fn from_env() -> Option<Self> {
        Self::from_env_value(env::var(MODE_ENV).ok().as_deref())
    }

    pub(crate) fn from_env_value(value: Option<&str>) -> Option<Self> {
        let value = value?;
        match value.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                warn!(var = MODE_ENV, value, %err, "ignoring malformed mode");
                None
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loader mode '{0}'")]
pub struct ParseModeError(String);

impl TryFrom<u8> for Mode {
    type Error = ParseModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Silent),
            1 => Ok(Mode::Normal),
            2 => Ok(Mode::Debug),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        match lower.as_str() {
            "silent" | "0" => Ok(Mode::Silent),
            "normal" | "1" => Ok(Mode::Normal),
            "debug" | "2" => Ok(Mode::Debug),
            _ => Err(ParseModeError(value.to_string())),
        }
    }
}

/// Config files may spell the mode as a name or a legacy numeric code.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<ModeRepr> for Mode {
    type Error = ParseModeError;

    fn try_from(repr: ModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ModeRepr::Code(code) => Mode::try_from(code),
            ModeRepr::Name(name) => name.parse(),
        }
    }
}

//==================================================
// Section 2.0 - Outcomes
//==================================================

/// Successful result of [`SymbolLoader::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file ran and the symbol is now recorded as loaded.
    Loaded(PathBuf),
    /// The symbol was defined before the call.
    AlreadyDefined,
    /// No file was found and the mode tolerates that.
    NotFound,
    /// The file ran without defining the symbol and the mode tolerates that.
    Undeclared(PathBuf),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

//==================================================
// Section 3.0 - Loader
//==================================================

/// On-demand symbol loader.
///
/// State lives in cells so `load` can take `&self` and be re-entered by the
/// executor. No borrow is held while the executor runs.
#[derive(Debug)]
pub struct SymbolLoader {
    id: HookId,
    host: Host,
    inflector: Inflector,
    registry: RefCell<PathRegistry>,
    loaded: RefCell<IndexMap<SymbolName, PathBuf>>,
    mode: Cell<Mode>,
}

impl SymbolLoader {
    pub fn new(host: Host) -> Self {
        Self::with_inflector(host, Inflector::default())
    }

    pub fn with_inflector(host: Host, inflector: Inflector) -> Self {
        Self {
            id: HookId::next(),
            host,
            inflector,
            registry: RefCell::new(PathRegistry::new()),
            loaded: RefCell::new(IndexMap::new()),
            mode: Cell::new(Mode::default()),
        }
    }

    /// Builds a loader whose inflector, mode and registry come from `config`.
    pub fn from_config(host: Host, config: &LoaderConfig) -> Self {
        let loader = Self::with_inflector(host, config.inflector());
        config.apply(&loader);
        loader
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn inflector(&self) -> &Inflector {
        &self.inflector
    }

    // Mode

    pub fn set_mode(&self, mode: Mode) {
        self.mode.set(mode);
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    pub fn is_silent(&self) -> bool {
        self.mode() == Mode::Silent
    }

    pub fn is_debug(&self) -> bool {
        self.mode() == Mode::Debug
    }

    // Registry

    pub fn add(&self, prefix: impl Into<String>, paths: impl Into<PathList>) {
        self.registry.borrow_mut().add(prefix, paths);
    }

    pub fn add_all<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathList>,
    {
        self.registry.borrow_mut().add_all(entries);
    }

    pub fn get_prefixes(&self) -> IndexMap<String, Vec<PathBuf>> {
        self.registry.borrow().prefixes().clone()
    }

    pub fn set_override(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.registry.borrow_mut().set_override(name, path);
    }

    pub fn add_overrides<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathBuf>,
    {
        self.registry.borrow_mut().add_overrides(entries);
    }

    pub fn set_overrides<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PathBuf>,
    {
        self.registry.borrow_mut().set_overrides(entries);
    }

    pub fn get_overrides(&self) -> IndexMap<String, PathBuf> {
        self.registry.borrow().overrides().clone()
    }

    pub fn get_loaded(&self) -> IndexMap<SymbolName, PathBuf> {
        self.loaded.borrow().clone()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.borrow().contains_key(name)
    }

    // Resolution

    pub fn to_relative_path(&self, name: &str) -> PathBuf {
        self.inflector.to_relative_path(name)
    }

    pub fn find(&self, name: &str) -> Lookup {
        let registry = self.registry.borrow();
        Resolver::new(&registry, &self.inflector, self.host.probe.as_ref()).find(name)
    }

    pub fn load(&self, name: &str) -> Result<LoadOutcome, LoadError> {
        if self.host.symbols.is_defined(name) {
            if self.is_debug() {
                return Err(LoadError::AlreadyLoaded { name: name.into() });
            }
            debug!(symbol = name, "already defined");
            return Ok(LoadOutcome::AlreadyDefined);
        }

        let lookup = self.find(name);
        let Some(location) = lookup.location else {
            if self.is_silent() {
                warn!(symbol = name, probed = lookup.trail.len(), "no file found, skipping");
                return Ok(LoadOutcome::NotFound);
            }
            return Err(LoadError::NotReadable {
                name: name.into(),
                trail: lookup.trail,
            });
        };
        let path = location.path;

        debug!(symbol = name, path = %path.display(), "executing");
        self.host
            .executor
            .execute(&path)
            .map_err(|source| LoadError::Execute {
                name: name.into(),
                path: path.clone(),
                source,
            })?;

        if !self.host.symbols.is_defined(name) {
            if self.is_debug() {
                return Err(LoadError::NotDeclared { name: name.into() });
            }
            warn!(symbol = name, path = %path.display(), "file ran without declaring symbol");
            return Ok(LoadOutcome::Undeclared(path));
        }

        info!(symbol = name, path = %path.display(), "loaded");
        self.loaded.borrow_mut().insert(name.into(), path.clone());
        Ok(LoadOutcome::Loaded(path))
    }

    // Hooks

    pub fn register(self: &Rc<Self>) -> bool {
        self.register_with(false)
    }

    /// Installs this loader in the host's hook stack, at the front when
    /// `prepend` is set. Returns `false` if it was already installed.
    pub fn register_with(self: &Rc<Self>, prepend: bool) -> bool {
        let hook: Weak<dyn Autoload> = Rc::<Self>::downgrade(self);
        let installed = self.host.hooks.install(self.id, hook, prepend);
        if installed {
            debug!(hook = ?self.id, prepend, "registered loader");
        }
        installed
    }

    pub fn unregister(&self) -> bool {
        self.host.hooks.uninstall(self.id)
    }

    pub fn is_registered(&self) -> bool {
        self.host.hooks.is_installed(self.id)
    }
}

impl Autoload for SymbolLoader {
    fn hook_id(&self) -> HookId {
        self.id
    }

    fn autoload(&self, name: &str) -> Result<LoadOutcome, LoadError> {
        self.load(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ExecError, Executor, FileProbe, MemorySymbols, SymbolTable};
    use crate::hooks::AutoloadStack;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;

    #[derive(Default)]
    struct FakeProbe {
        readable: HashSet<PathBuf>,
    }

    impl FileProbe for FakeProbe {
        fn probe_readable(&self, path: &Path) -> bool {
            self.readable.contains(path)
        }

        fn probe_search_path(&self, _relative: &Path) -> Option<PathBuf> {
            None
        }

        fn describe_search_path(&self) -> String {
            String::new()
        }
    }

    struct FakeExecutor {
        symbols: Rc<MemorySymbols>,
        defines: HashMap<PathBuf, &'static str>,
        executed: RefCell<Vec<PathBuf>>,
    }

    impl Executor for FakeExecutor {
        fn execute(&self, path: &Path) -> Result<(), ExecError> {
            self.executed.borrow_mut().push(path.to_path_buf());
            match self.defines.get(path) {
                Some(&"!fail") => Err("syntax error".into()),
                Some(symbol) => {
                    self.symbols.define(*symbol);
                    Ok(())
                }
                None => Ok(()),
            }
        }
    }

    struct Fixture {
        symbols: Rc<MemorySymbols>,
        executor: Rc<FakeExecutor>,
        loader: Rc<SymbolLoader>,
    }

    fn fixture(files: &[(&str, &'static str)]) -> Fixture {
        let symbols = Rc::new(MemorySymbols::new());
        let executor = Rc::new(FakeExecutor {
            symbols: Rc::clone(&symbols),
            defines: files.iter().map(|(path, symbol)| (PathBuf::from(path), *symbol)).collect(),
            executed: RefCell::new(Vec::new()),
        });
        let probe = Rc::new(FakeProbe {
            readable: files.iter().map(|(path, _)| PathBuf::from(path)).collect(),
        });
        let host = Host::new(
            symbols.clone(),
            executor.clone(),
            probe,
            Rc::new(AutoloadStack::new()),
        );
        let loader = Rc::new(SymbolLoader::with_inflector(
            host,
            Inflector::new().with_extension("ext"),
        ));
        loader.add("pkg.", "/src");
        Fixture {
            symbols,
            executor,
            loader,
        }
    }

    #[test]
    fn loads_and_records_symbol() {
        let fx = fixture(&[("/src/pkg/Widget.ext", "pkg.Widget")]);
        let outcome = fx.loader.load("pkg.Widget").expect("load widget");
        assert_eq!(outcome, LoadOutcome::Loaded(PathBuf::from("/src/pkg/Widget.ext")));
        assert_eq!(
            fx.loader.get_loaded().get("pkg.Widget"),
            Some(&PathBuf::from("/src/pkg/Widget.ext"))
        );
        assert!(fx.symbols.is_defined("pkg.Widget"));
    }

    #[test]
    fn repeated_load_is_a_no_op_outside_debug() {
        for mode in [Mode::Silent, Mode::Normal] {
            let fx = fixture(&[("/src/pkg/Widget.ext", "pkg.Widget")]);
            fx.loader.set_mode(mode);
            fx.loader.load("pkg.Widget").expect("first load");
            let second = fx.loader.load("pkg.Widget").expect("second load");
            assert_eq!(second, LoadOutcome::AlreadyDefined);
            assert_eq!(fx.loader.get_loaded().len(), 1);
            assert_eq!(fx.executor.executed.borrow().len(), 1);
        }
    }

    #[test]
    fn repeated_load_fails_in_debug() {
        let fx = fixture(&[("/src/pkg/Widget.ext", "pkg.Widget")]);
        fx.loader.load("pkg.Widget").expect("first load");
        fx.loader.set_mode(Mode::Debug);
        let err = fx.loader.load("pkg.Widget").expect_err("already loaded");
        assert!(matches!(err, LoadError::AlreadyLoaded { ref name } if name.as_str() == "pkg.Widget"));
    }

    #[test]
    fn missing_file_is_silent_in_silent_mode() {
        let fx = fixture(&[]);
        fx.loader.set_mode(Mode::Silent);
        let outcome = fx.loader.load("pkg.Missing").expect("silent skip");
        assert_eq!(outcome, LoadOutcome::NotFound);
        assert!(!fx.loader.is_loaded("pkg.Missing"));
        assert!(fx.executor.executed.borrow().is_empty());
    }

    #[test]
    fn missing_file_reports_trail() {
        for mode in [Mode::Normal, Mode::Debug] {
            let fx = fixture(&[]);
            fx.loader.add("pkg.", "/vendor");
            fx.loader.set_mode(mode);
            let err = fx.loader.load("pkg.Missing").expect_err("not readable");
            let trail = err.trail().expect("trail attached");
            assert_eq!(trail.len(), 3);
            assert_eq!(trail.entries()[0], "/src (prefix pkg.)");
            assert_eq!(trail.entries()[1], "/vendor (prefix pkg.)");
            let message = err.to_string();
            assert!(message.starts_with("pkg.Missing\n"));
            assert!(message.contains("/vendor (prefix pkg.)"));
        }
    }

    #[test]
    fn undeclared_symbol_depends_on_mode() {
        let fx = fixture(&[
            ("/src/pkg/Empty1.ext", "pkg.Other1"),
            ("/src/pkg/Empty2.ext", "pkg.Other2"),
        ]);
        let outcome = fx.loader.load("pkg.Empty1").expect("normal tolerates");
        assert_eq!(outcome, LoadOutcome::Undeclared(PathBuf::from("/src/pkg/Empty1.ext")));
        assert!(!fx.loader.is_loaded("pkg.Empty1"));

        fx.loader.set_mode(Mode::Debug);
        let err = fx.loader.load("pkg.Empty2").expect_err("debug rejects");
        assert!(matches!(err, LoadError::NotDeclared { .. }));
        assert!(fx.loader.get_loaded().is_empty());
    }

    #[test]
    fn executor_failure_is_reported_in_every_mode() {
        let fx = fixture(&[("/src/pkg/Broken.ext", "!fail")]);
        fx.loader.set_mode(Mode::Silent);
        let err = fx.loader.load("pkg.Broken").expect_err("execute error");
        assert!(matches!(err, LoadError::Execute { .. }));
        assert!(err.to_string().contains("syntax error"));
        assert!(!fx.loader.is_loaded("pkg.Broken"));
    }

    #[test]
    fn override_bypasses_probe() {
        let fx = fixture(&[("/elsewhere/Thing.ext", "Thing")]);
        fx.loader.set_override("Thing", "/elsewhere/Thing.ext");
        let outcome = fx.loader.load("Thing").expect("override load");
        assert!(outcome.is_loaded());
        assert_eq!(fx.loader.get_overrides().len(), 1);
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = fixture(&[("/src/pkg/Widget.ext", "pkg.Widget")]);
        let second = fixture(&[]);
        first.loader.set_mode(Mode::Debug);
        first.loader.add("extra.", "/extra");
        first.loader.load("pkg.Widget").expect("load widget");
        assert_eq!(second.loader.mode(), Mode::Normal);
        assert_eq!(second.loader.get_prefixes().len(), 1);
        assert!(second.loader.get_loaded().is_empty());
    }

    #[test]
    fn register_is_idempotent_and_unregister_is_safe() {
        let fx = fixture(&[]);
        assert!(!fx.loader.unregister());
        assert!(fx.loader.register());
        assert!(!fx.loader.register());
        assert_eq!(fx.loader.host().hooks.len(), 1);
        assert!(fx.loader.is_registered());
        assert!(fx.loader.unregister());
        assert!(!fx.loader.is_registered());
    }

    #[test]
    fn parses_modes() {
        assert_eq!("silent".parse::<Mode>(), Ok(Mode::Silent));
        assert_eq!("DEBUG".parse::<Mode>(), Ok(Mode::Debug));
        assert_eq!("1".parse::<Mode>(), Ok(Mode::Normal));
        assert_eq!(Mode::try_from(2u8), Ok(Mode::Debug));
        assert!(Mode::try_from(3u8).is_err());
        assert!("loud".parse::<Mode>().is_err());
    }

    #[test]
    fn env_value_overrides_only_when_valid() {
        assert_eq!(Mode::from_env_value(None), None);
        assert_eq!(Mode::from_env_value(Some("0")), Some(Mode::Silent));
        assert_eq!(Mode::from_env_value(Some(" debug ")), Some(Mode::Debug));
        assert_eq!(Mode::from_env_value(Some("loud")), None);
    }
}

//==================================================
// End of file
//==================================================
