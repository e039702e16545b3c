// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with `Display` plus
//! [`messages::StructuredLog`] so that log lines are not scattered as magic
//! strings through the engine.
//!
//! * `messages::engine` - model run lifecycle and branch pruning events
//! * `messages::algorithm` - provider registration and child algorithm events
//! * `messages::validation` - graph validation warnings and errors

use tracing_subscriber::EnvFilter;

pub mod messages;

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Does nothing when a global subscriber already exists.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::DEFAULT_LOG_FILTER;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(DEFAULT_LOG_FILTER);
        init_tracing(DEFAULT_LOG_FILTER);
        tracing::info!("tracing initialized");
    }
}
