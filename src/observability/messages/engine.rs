// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for model run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run start, completion and cancellation
//! * Children skipped before or during a run
//! * Branch decisions and the pruning they cause

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A model run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use processing_model::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted {
///     model_name: "flood extent",
///     child_count: 5,
///     active_count: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub model_name: &'a str,
    pub child_count: usize,
    pub active_count: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting model '{}': {} children, {} active",
            self.model_name, self.child_count, self.active_count
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            model_name = self.model_name,
            child_count = self.child_count,
            active_count = self.active_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "model_run",
            span_name = name,
            model_name = self.model_name,
            child_count = self.child_count,
            active_count = self.active_count,
        )
    }
}

/// A model run finished without error.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted<'a> {
    pub model_name: &'a str,
    pub executed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Model '{}' processed OK. Executed {} algorithms, skipped {}, total {:.2} seconds",
            self.model_name,
            self.executed,
            self.skipped,
            self.duration.as_secs_f64()
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            model_name = self.model_name,
            executed = self.executed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "model_run_completed",
            span_name = name,
            model_name = self.model_name,
            executed = self.executed,
            skipped = self.skipped,
            duration = ?self.duration,
        )
    }
}

/// A model run stopped because cancellation was requested.
///
/// # Log Level
/// `warn!` - Partial results only
pub struct RunCanceled<'a> {
    pub model_name: &'a str,
    pub executed: usize,
}

impl Display for RunCanceled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Model '{}' canceled after {} algorithms",
            self.model_name, self.executed
        )
    }
}

impl StructuredLog for RunCanceled<'_> {
    fn log(&self) {
        tracing::warn!(
            model_name = self.model_name,
            executed = self.executed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "model_run_canceled",
            span_name = name,
            model_name = self.model_name,
            executed = self.executed,
        )
    }
}

/// A child was skipped.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct ChildSkipped<'a> {
    pub child_id: &'a str,
    pub reason: &'a str,
}

impl Display for ChildSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping {}: {}", self.child_id, self.reason)
    }
}

impl StructuredLog for ChildSkipped<'_> {
    fn log(&self) {
        tracing::debug!(child_id = self.child_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "child_skipped",
            span_name = name,
            child_id = self.child_id,
            reason = self.reason,
        )
    }
}

/// A branch algorithm finished and some of its branches were not taken.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BranchesPruned<'a> {
    pub child_id: &'a str,
    pub taken: &'a [String],
    pub not_taken: &'a [String],
    pub pruned_count: usize,
}

impl Display for BranchesPruned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} took branches [{}], pruned [{}] ({} children skipped)",
            self.child_id,
            self.taken.join(", "),
            self.not_taken.join(", "),
            self.pruned_count
        )
    }
}

impl StructuredLog for BranchesPruned<'_> {
    fn log(&self) {
        tracing::info!(
            child_id = self.child_id,
            taken = self.taken.join(","),
            not_taken = self.not_taken.join(","),
            pruned_count = self.pruned_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "branches_pruned",
            span_name = name,
            child_id = self.child_id,
            pruned_count = self.pruned_count,
        )
    }
}
