//=============================================
// File: logging.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Tracing setup for hosts embedding the loader
// Objective: Install a compact subscriber once, unless the host brought its own
//=============================================

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "symload=info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

fn filter() -> EnvFilter {
    let fallback: Directive = match DEFAULT_DIRECTIVE.parse() {
        Ok(directive) => directive,
        Err(_) => tracing::Level::INFO.into(),
    };
    EnvFilter::builder()
        .with_default_directive(fallback)
        .from_env_lossy()
}

/// Installs the loader's subscriber for `component`.
///
/// Returns `true` when this crate's subscriber is the global one. A host
/// that already set its own keeps it and gets `false`. `RUST_LOG` directives
/// are honoured, e.g. `RUST_LOG=symload=trace` shows every probed candidate.
pub fn init(component: &str) -> bool {
    let installed = *INSTALLED.get_or_init(|| {
        match SubscriberBuilder::default()
            .with_env_filter(filter())
            .with_target(true)
            .compact()
            .try_init()
        {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "keeping existing global subscriber");
                false
            }
        }
    });
    tracing::debug!(component, installed, "symload tracing ready");
    installed
}


//=============================================
// End of file
//=============================================
