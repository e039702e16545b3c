// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod algorithm;
pub mod provider;

pub use algorithm::{Algorithm, AlgorithmHandle, AlgorithmParameters, AlgorithmResults};
pub use provider::AlgorithmProvider;
