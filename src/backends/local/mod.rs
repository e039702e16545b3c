// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod algorithms;
pub mod provider;

pub use algorithms::*;
pub use provider::{NativeProvider, NATIVE_PROVIDER_ID};
