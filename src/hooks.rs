//==================================================
// File: hooks.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Host-side stack of deferred symbol resolution hooks
// Objective: Let loaders install themselves and be consulted in order when
//            the host meets an undefined symbol
//==================================================

use std::cell::RefCell;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::SymbolTable;
use crate::loader::{LoadError, LoadOutcome};

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    pub fn next() -> Self {
        HookId(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something the hook stack can ask to materialize a symbol.
pub trait Autoload {
    fn hook_id(&self) -> HookId;
    fn autoload(&self, name: &str) -> Result<LoadOutcome, LoadError>;
}

/// Ordered deferred-resolution hooks. Hooks are held weakly, so a dropped
/// loader simply stops answering.
#[derive(Default)]
pub struct AutoloadStack {
    hooks: RefCell<Vec<(HookId, Weak<dyn Autoload>)>>,
}

impl AutoloadStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `id` is already installed.
    pub fn install(&self, id: HookId, hook: Weak<dyn Autoload>, prepend: bool) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        if hooks.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        if prepend {
            hooks.insert(0, (id, hook));
        } else {
            hooks.push((id, hook));
        }
        true
    }

    pub fn uninstall(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(existing, _)| *existing != id);
        hooks.len() != before
    }

    pub fn is_installed(&self, id: HookId) -> bool {
        self.hooks.borrow().iter().any(|(existing, _)| *existing == id)
    }

    pub fn ids(&self) -> Vec<HookId> {
        self.hooks.borrow().iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.borrow().is_empty()
    }

    /// Consults each live hook in order until `name` is defined. Returns
    /// whether it ended up defined; the first hook error stops the walk.
    pub fn autoload(&self, name: &str, symbols: &dyn SymbolTable) -> Result<bool, LoadError> {
        // Snapshot so hooks may (un)register or recurse while running.
        let hooks: Vec<Weak<dyn Autoload>> =
            self.hooks.borrow().iter().map(|(_, hook)| hook.clone()).collect();
        for hook in hooks {
            let Some(hook) = hook.upgrade() else {
                continue;
            };
            hook.autoload(name)?;
            if symbols.is_defined(name) {
                return Ok(true);
            }
        }
        Ok(symbols.is_defined(name))
    }
}

impl std::fmt::Debug for AutoloadStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoloadStack").field("ids", &self.ids()).finish()
    }
}


//==================================================
// End of file
//==================================================
