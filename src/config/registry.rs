// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::backends::local::NativeProvider;
use crate::errors::RegistryError;
use crate::model::Value;
use crate::observability::messages::algorithm::{ProviderRegistered, ProviderRemoved};
use crate::observability::messages::StructuredLog;
use crate::traits::{AlgorithmHandle, AlgorithmProvider};

/// Session wide registry of algorithm providers.
///
/// Algorithm ids take the form `provider_id:algorithm_name`. Lookups are
/// resolved on demand, so a model loaded before its provider was registered
/// can be reattached later.
#[derive(Clone, Default)]
pub struct AlgorithmRegistry {
    providers: BTreeMap<String, Arc<dyn AlgorithmProvider>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `native` provider registered.
    pub fn with_native_provider() -> Self {
        let provider: Arc<dyn AlgorithmProvider> = Arc::new(NativeProvider::new());
        let mut providers = BTreeMap::new();
        providers.insert(provider.id().to_string(), provider);
        Self { providers }
    }

    pub fn add_provider(
        &mut self,
        provider: Arc<dyn AlgorithmProvider>,
    ) -> Result<(), RegistryError> {
        let provider_id = provider.id().to_string();
        if provider_id.is_empty() || provider_id.contains(':') {
            return Err(RegistryError::InvalidProviderId { provider_id });
        }
        if self.providers.contains_key(&provider_id) {
            return Err(RegistryError::DuplicateProvider { provider_id });
        }

        ProviderRegistered {
            provider_id: &provider_id,
            algorithm_count: provider.algorithm_names().len(),
        }
        .log();
        self.providers.insert(provider_id, provider);
        Ok(())
    }

    pub fn remove_provider(&mut self, provider_id: &str) -> bool {
        let removed = self.providers.remove(provider_id).is_some();
        if removed {
            ProviderRemoved { provider_id }.log();
        }
        removed
    }

    pub fn provider(&self, provider_id: &str) -> Option<&Arc<dyn AlgorithmProvider>> {
        self.providers.get(provider_id)
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Every fully qualified algorithm id known to the registry, sorted.
    pub fn algorithm_ids(&self) -> Vec<String> {
        self.providers
            .iter()
            .flat_map(|(provider_id, provider)| {
                provider
                    .algorithm_names()
                    .into_iter()
                    .map(move |name| format!("{}:{}", provider_id, name))
            })
            .collect()
    }

    pub fn contains(&self, algorithm_id: &str) -> bool {
        split_algorithm_id(algorithm_id)
            .and_then(|(provider_id, name)| {
                self.providers
                    .get(provider_id)
                    .map(|provider| provider.has_algorithm(name))
            })
            .unwrap_or(false)
    }

    /// Resolves an algorithm with an empty configuration.
    pub fn lookup(&self, algorithm_id: &str) -> Option<AlgorithmHandle> {
        self.create(algorithm_id, &BTreeMap::new())
    }

    /// Resolves an algorithm, passing the child's configuration to its provider.
    pub fn create(
        &self,
        algorithm_id: &str,
        configuration: &BTreeMap<String, Value>,
    ) -> Option<AlgorithmHandle> {
        let (provider_id, name) = split_algorithm_id(algorithm_id)?;
        let provider = self.providers.get(provider_id)?;
        let algorithm = provider.create_algorithm(name, configuration)?;
        Some(AlgorithmHandle::new(algorithm_id, algorithm))
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("providers", &self.provider_ids())
            .finish()
    }
}

fn split_algorithm_id(algorithm_id: &str) -> Option<(&str, &str)> {
    algorithm_id
        .split_once(':')
        .filter(|(provider_id, name)| !provider_id.is_empty() && !name.is_empty())
}
