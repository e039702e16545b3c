// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Algorithm providers.
//!
//! # Available Backends
//!
//! ## Local Backend
//! The built-in `native` provider, running in-process:
//! - **Branching**: `filterlayersbytype`, `condition`
//! - **Assertions**: `raiseexception`, `raisewarning`
//! - **Values**: `renamelayer`, `stringconcatenation`, `calculateexpression`
//!
//! ## Stub Backend (Test-Only)
//! The `test` provider used by engine tests (only available in test builds):
//! - **passthrough**: copies `INPUT` to `OUTPUT`
//! - **failing**: always fails
//! - **cancel** / **interrupt**: cancel the run from inside an algorithm
//!
//! # Architecture
//!
//! ```text
//! algorithm id ("native:condition") → AlgorithmRegistry → Provider → Algorithm → ModelExecutor
//! ```
//!
//! # Examples
//!
//! ```rust
//! use processing_model::backends::local::NativeProvider;
//! use processing_model::traits::AlgorithmProvider;
//! use std::collections::BTreeMap;
//!
//! let provider = NativeProvider::new();
//! let algorithm = provider
//!     .create_algorithm("stringconcatenation", &BTreeMap::new())
//!     .ok_or("unknown algorithm")?;
//! assert_eq!(algorithm.name(), "stringconcatenation");
//! # Ok::<(), &str>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
