// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod expression;
mod model;
mod registry;

pub use config::ValidationError;
pub use execution::{AlgorithmError, ExecutionError};
pub use expression::EvalError;
pub use model::ModelError;
pub use registry::RegistryError;
