// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human readable line and
//! [`StructuredLog`] to emit it through `tracing` with structured fields.
//!
//! # Organization
//!
//! * `engine` - model run lifecycle, scheduling and branch pruning events
//! * `algorithm` - provider registration and child algorithm execution events
//! * `validation` - model graph validation warnings and errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use processing_model::observability::messages::engine::RunStarted;
//! use processing_model::observability::messages::StructuredLog;
//!
//! let msg = RunStarted {
//!     model_name: "flood extent",
//!     child_count: 5,
//!     active_count: 4,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod algorithm;
pub mod engine;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emits the message as a tracing event.
    fn log(&self);

    /// Opens a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
