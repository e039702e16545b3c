// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::expression;
use crate::model::{OutputDefinition, ParameterDefinition, Value};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

/// One named branch of a condition step.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchCondition {
    pub name: String,
    pub expression: String,
}

impl BranchCondition {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Evaluates each configured condition and takes every branch whose
/// expression is truthy.
///
/// Conditions come from the child configuration:
///
/// ```yaml
/// configuration:
///   conditions:
///     type: list
///     value:
///       - type: map
///         value:
///           name: { type: string, value: "valid" }
///           expression: { type: string, value: "@area > 0" }
/// ```
#[derive(Debug, Default)]
pub struct ConditionAlgorithm {
    conditions: Vec<BranchCondition>,
}

impl ConditionAlgorithm {
    pub fn new(conditions: Vec<BranchCondition>) -> Self {
        Self { conditions }
    }

    /// Reads the `conditions` list. Malformed entries are ignored.
    pub fn from_configuration(configuration: &BTreeMap<String, Value>) -> Self {
        let conditions = configuration
            .get("conditions")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_map)
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                let expression = entry.get("expression").and_then(Value::as_str).unwrap_or("");
                (!name.is_empty()).then(|| BranchCondition::new(name, expression))
            })
            .collect();
        Self::new(conditions)
    }

    pub fn conditions(&self) -> &[BranchCondition] {
        &self.conditions
    }
}

#[async_trait]
impl Algorithm for ConditionAlgorithm {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn display_name(&self) -> String {
        "Conditional branch".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        Vec::new()
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        self.conditions
            .iter()
            .map(|c| OutputDefinition::branch(c.name.clone()))
            .collect()
    }

    async fn process_algorithm(
        &self,
        _parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let mut results = AlgorithmResults::new();
        for condition in &self.conditions {
            let value = expression::evaluate(&condition.expression, context.expression_scope())
                .map_err(|e| AlgorithmError::Validation(format!(
                    "Condition '{}' could not be evaluated: {}",
                    condition.name, e
                )))?;
            let taken = value.is_truthy();
            if taken {
                feedback.push_info(&format!("Condition '{}' passed", condition.name));
            } else {
                feedback.push_info(&format!("Condition '{}' failed", condition.name));
            }
            results.insert(condition.name.clone(), Value::Bool(taken));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessingFeedback;
    use crate::expression::ExpressionScope;

    #[test]
    fn test_from_configuration() {
        let entry = |name: &str, expression: &str| {
            Value::Map(BTreeMap::from([
                ("name".to_string(), Value::from(name)),
                ("expression".to_string(), Value::from(expression)),
            ]))
        };
        let configuration = BTreeMap::from([(
            "conditions".to_string(),
            Value::List(vec![entry("big", "@n > 5"), entry("", "TRUE"), Value::from(3)]),
        )]);

        let algorithm = ConditionAlgorithm::from_configuration(&configuration);
        assert_eq!(algorithm.conditions(), &[BranchCondition::new("big", "@n > 5")]);
        assert_eq!(algorithm.branch_names(), vec!["big".to_string()]);
    }

    #[tokio::test]
    async fn test_each_branch_evaluated() {
        let algorithm = ConditionAlgorithm::new(vec![
            BranchCondition::new("big", "@n > 5"),
            BranchCondition::new("small", "@n <= 5"),
        ]);
        let mut context = ProcessingContext::default();
        context.set_expression_scope(ExpressionScope::new().with_variable("n", 9));

        let results = algorithm
            .process_algorithm(
                &AlgorithmParameters::new(),
                &mut context,
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();
        assert_eq!(results.get("big"), Some(&Value::Bool(true)));
        assert_eq!(results.get("small"), Some(&Value::Bool(false)));
    }

    #[tokio::test]
    async fn test_bad_expression_fails() {
        let algorithm = ConditionAlgorithm::new(vec![BranchCondition::new("x", "@missing")]);
        let result = algorithm
            .process_algorithm(
                &AlgorithmParameters::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await;
        assert!(matches!(result, Err(AlgorithmError::Validation(_))));
    }
}
