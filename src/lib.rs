// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // algorithm providers
pub mod config;     // model documents, settings + registry
pub mod engine;     // model executor, context and feedback
pub mod errors;     // error handling
pub mod expression; // expression language
pub mod model;      // processing model graph
pub mod observability;
pub mod traits;     // algorithm + provider abstractions
