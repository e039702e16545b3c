// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data model of a processing model: values, parameter sources, child
//! algorithms and the graph that owns them.

pub mod child;
pub mod dependency;
pub mod graph;
pub mod parameter;
pub mod script;
pub mod source;
pub mod value;

pub use child::{ChildAlgorithm, ModelOutput, Point, Size};
pub use dependency::ChildDependency;
pub use graph::{ProcessingModel, ValidationReport, MODEL_REPORT_KEY};
pub use parameter::{
    ModelParameter, OutputDefinition, OutputType, ParameterDefinition, ParameterType,
};
pub use source::{ParameterSource, SourceKind};
pub use value::{Extent, LayerHandle, LayerKind, Value};
