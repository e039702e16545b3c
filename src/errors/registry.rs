// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for provider registration in the algorithm registry.

use std::error::Error;
use std::fmt;

/// Errors that can occur while registering algorithm providers
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A provider with the same id is already registered
    DuplicateProvider { provider_id: String },

    /// The provider id is empty or contains the ':' separator
    InvalidProviderId { provider_id: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegistryError::DuplicateProvider { provider_id } => {
                write!(f, "A provider with id '{}' is already registered", provider_id)
            }
            RegistryError::InvalidProviderId { provider_id } => {
                write!(
                    f,
                    "Provider id '{}' is invalid. Ids must be non-empty and cannot contain ':'",
                    provider_id
                )
            }
        }
    }
}

impl Error for RegistryError {}
