// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
pub mod settings;
pub mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_model, load_model, model_from_str, model_to_string, save_model,
    DocumentFormat,
};
pub use registry::AlgorithmRegistry;
pub use settings::{load_settings, InvalidGeometryCheck, ProcessingSettings};
pub use validation::validate_dependency_graph;
