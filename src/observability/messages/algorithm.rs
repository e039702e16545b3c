// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for algorithm providers and child algorithm execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A provider was added to the algorithm registry.
///
/// # Log Level
/// `debug!` - Registry bookkeeping
pub struct ProviderRegistered<'a> {
    pub provider_id: &'a str,
    pub algorithm_count: usize,
}

impl Display for ProviderRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered provider '{}' with {} algorithms",
            self.provider_id, self.algorithm_count
        )
    }
}

impl StructuredLog for ProviderRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            provider_id = self.provider_id,
            algorithm_count = self.algorithm_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "provider_registered",
            span_name = name,
            provider_id = self.provider_id,
            algorithm_count = self.algorithm_count,
        )
    }
}

pub struct ProviderRemoved<'a> {
    pub provider_id: &'a str,
}

impl Display for ProviderRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed provider '{}'", self.provider_id)
    }
}

impl StructuredLog for ProviderRemoved<'_> {
    fn log(&self) {
        tracing::debug!(provider_id = self.provider_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "provider_removed",
            span_name = name,
            provider_id = self.provider_id,
        )
    }
}

/// A child algorithm is about to run.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use processing_model::observability::messages::algorithm::AlgorithmStarted;
///
/// let msg = AlgorithmStarted {
///     child_id: "rename_1",
///     algorithm_id: "native:renamelayer",
///     step: 1,
///     step_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct AlgorithmStarted<'a> {
    pub child_id: &'a str,
    pub algorithm_id: &'a str,
    pub step: usize,
    pub step_count: usize,
}

impl Display for AlgorithmStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running {} ({}) [{}/{}]",
            self.child_id,
            self.algorithm_id,
            self.step + 1,
            self.step_count
        )
    }
}

impl StructuredLog for AlgorithmStarted<'_> {
    fn log(&self) {
        tracing::info!(
            child_id = self.child_id,
            algorithm_id = self.algorithm_id,
            step = self.step,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "child_algorithm",
            span_name = name,
            child_id = self.child_id,
            algorithm_id = self.algorithm_id,
            step = self.step,
        )
    }
}

/// A child algorithm finished successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AlgorithmCompleted<'a> {
    pub child_id: &'a str,
    pub output_count: usize,
    pub duration: Duration,
}

impl Display for AlgorithmCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "OK. Execution of {} took {:.3} seconds ({} outputs)",
            self.child_id,
            self.duration.as_secs_f64(),
            self.output_count
        )
    }
}

impl StructuredLog for AlgorithmCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            child_id = self.child_id,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "child_algorithm_completed",
            span_name = name,
            child_id = self.child_id,
            duration = ?self.duration,
        )
    }
}

/// A child algorithm raised an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct AlgorithmFailed<'a> {
    pub child_id: &'a str,
    pub algorithm_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for AlgorithmFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Child algorithm '{}' ({}) failed: {}",
            self.child_id, self.algorithm_id, self.error
        )
    }
}

impl StructuredLog for AlgorithmFailed<'_> {
    fn log(&self) {
        tracing::error!(
            child_id = self.child_id,
            algorithm_id = self.algorithm_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "child_algorithm_failed",
            span_name = name,
            child_id = self.child_id,
            algorithm_id = self.algorithm_id,
            error = %self.error,
        )
    }
}
