//! On-demand symbol resolution and loading.
//!
//! A [`SymbolLoader`] maps hierarchical symbol names such as `pkg.Widget` to
//! the source file expected to define them, asks the host to execute that
//! file, and remembers which symbols it has materialized.

pub mod config;
pub mod hooks;
pub mod host;
pub mod inflector;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod symbol;

pub use config::{ConfigError, LoaderConfig};
pub use hooks::{Autoload, AutoloadStack, HookId};
pub use host::{
    EMPTY_SEARCH_PATH, ExecError, Executor, FileProbe, FsProbe, Host, MemorySymbols, SymbolTable,
};
pub use inflector::Inflector;
pub use loader::{LoadError, LoadOutcome, Mode, SymbolLoader};
pub use registry::{PathList, PathRegistry};
pub use resolver::{Location, Lookup, Resolver, Trail, Via};
pub use symbol::SymbolName;
