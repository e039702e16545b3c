// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::Value;
use crate::traits::Algorithm;

/// A named family of algorithms, addressed as `provider_id:algorithm_name`.
pub trait AlgorithmProvider: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn algorithm_names(&self) -> Vec<&'static str>;

    /// Creates an algorithm instance. `configuration` carries per child
    /// settings such as branch definitions; most algorithms ignore it.
    fn create_algorithm(
        &self,
        name: &str,
        configuration: &BTreeMap<String, Value>,
    ) -> Option<Arc<dyn Algorithm>>;

    fn has_algorithm(&self, name: &str) -> bool {
        self.algorithm_names().contains(&name)
    }
}
