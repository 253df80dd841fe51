//! Tracing setup for binaries and tests that use the default logger.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is not set: scheduler lifecycle messages at
/// info, everything else at warn.
pub const DEFAULT_FILTER: &str = "warn,task_scheduler=info";

/// Install an env-filtered fmt subscriber unless one is already set.
///
/// `RUST_LOG` wins when present; otherwise [`DEFAULT_FILTER`] applies.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Install an fmt subscriber with an explicit filter directive, unless one is
/// already set.
pub fn init_tracing_with(directive: &str) {
    install(EnvFilter::new(directive));
}

fn install(filter: EnvFilter) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    // Losing the race to another initialiser is fine.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing_with("task_scheduler=debug");
        init_tracing();
        assert!(tracing::dispatcher::has_been_set());
    }
}
