// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages emitted while checking a model graph before it runs: cycles
//! among active children, dependencies on children that do not exist, and
//! the summary line when a model is refused.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected between child algorithms.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use processing_model::observability::messages::validation::CycleDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CycleDetected { cycle: &cycle };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CycleDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CycleDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Child algorithms form a cycle: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CycleDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cycle_detected",
            span_name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A child declares a dependency on a child that does not exist.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedDependencyFound<'a> {
    pub child_id: &'a str,
    pub missing_dependency: &'a str,
}

impl Display for UnresolvedDependencyFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Child algorithm '{}' depends on missing child '{}'",
            self.child_id, self.missing_dependency
        )
    }
}

impl StructuredLog for UnresolvedDependencyFound<'_> {
    fn log(&self) {
        tracing::error!(
            child_id = self.child_id,
            missing_dependency = self.missing_dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unresolved_dependency",
            span_name = name,
            child_id = self.child_id,
            missing_dependency = self.missing_dependency,
        )
    }
}

/// Model validation failed before a run.
///
/// # Log Level
/// `warn!` - the run is refused, the caller can fix the model and retry
pub struct ModelValidationFailed<'a> {
    pub model_name: &'a str,
    pub error_count: usize,
}

impl Display for ModelValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Model '{}' failed validation with {} error(s)",
            self.model_name, self.error_count
        )
    }
}

impl StructuredLog for ModelValidationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            model_name = self.model_name,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "model_validation_failed",
            span_name = name,
            model_name = self.model_name,
            error_count = self.error_count,
        )
    }
}
