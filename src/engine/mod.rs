// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod executor;
pub mod feedback;
pub mod resolver;
pub mod scope;
#[cfg(test)]
pub mod integration_tests;

pub use context::{
    InvalidGeometryCallback, LayerDetails, LayerPostProcessor, LayerStore, ProcessingContext,
};
pub use executor::{ChildState, ModelExecutor, ModelRunResult, RunStatus};
pub use feedback::{Feedback, MultiStepFeedback, ProcessingFeedback};
pub use resolver::ParameterResolver;
pub use scope::create_expression_scope;
