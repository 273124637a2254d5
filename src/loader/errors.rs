use crate::host::ExecError;
use crate::resolver::Trail;
use crate::symbol::SymbolName;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("symbol {name} is already loaded")]
    AlreadyLoaded { name: SymbolName },
    #[error("{name}\n{trail}")]
    NotReadable { name: SymbolName, trail: Trail },
    #[error("symbol {name} was not declared after loading its file")]
    NotDeclared { name: SymbolName },
    #[error("executing {} for {name} failed: {source}", .path.display())]
    Execute {
        name: SymbolName,
        path: PathBuf,
        #[source]
        source: ExecError,
    },
}

impl LoadError {
    pub fn name(&self) -> &SymbolName {
        match self {
            LoadError::AlreadyLoaded { name }
            | LoadError::NotReadable { name, .. }
            | LoadError::NotDeclared { name }
            | LoadError::Execute { name, .. } => name,
        }
    }

    pub fn trail(&self) -> Option<&Trail> {
        match self {
            LoadError::NotReadable { trail, .. } => Some(trail),
            _ => None,
        }
    }
}
