// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::backends::stub::StubProvider;
use crate::config::{load_model, AlgorithmRegistry};
use crate::engine::{
    ChildState, Feedback, ModelExecutor, ProcessingContext, ProcessingFeedback, RunStatus,
};
use crate::errors::{AlgorithmError, ExecutionError, ValidationError};
use crate::model::{
    ChildAlgorithm, ChildDependency, LayerHandle, ModelOutput, ModelParameter, ParameterDefinition,
    ParameterSource, ParameterType, ProcessingModel, Value,
};

/// Integration tests for the model executor using the built-in algorithms
#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AlgorithmRegistry {
        let mut registry = AlgorithmRegistry::with_native_provider();
        registry
            .add_provider(Arc::new(StubProvider::new()))
            .expect("Failed to register test provider");
        registry
    }

    fn layer_inputs(layer: LayerHandle) -> BTreeMap<String, Value> {
        BTreeMap::from([("layer".to_string(), Value::Layer(layer))])
    }

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_type_filter_runs_vector_chain_only() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let executor = ModelExecutor::new(registry());
        let feedback = ProcessingFeedback::new(false);
        let mut context = ProcessingContext::default();

        let result = executor
            .run(
                &model,
                &layer_inputs(LayerHandle::vector("roads_1", "roads")),
                &mut context,
                &feedback,
            )
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Succeeded);
        assert_eq!(result.executed, vec!["filter", "vector_1", "vector_2", "vector_3"]);
        assert_eq!(result.skipped, strings(&["raster_1", "raster_2", "raster_3"]));

        for key in ["vector_1:renamed", "vector_2:renamed", "vector_3:renamed"] {
            assert!(result.output(key).is_some(), "missing output {}", key);
        }
        for key in ["raster_1:renamed", "raster_2:renamed", "raster_3:renamed"] {
            assert!(result.output(key).is_none(), "unexpected output {}", key);
        }

        let last = result.output("vector_3:renamed").and_then(Value::as_layer).unwrap();
        assert_eq!(last.id, "roads_1");
        assert_eq!(last.name, "vector_3");
        assert_eq!(feedback.progress(), 100.0);
    }

    #[tokio::test]
    async fn test_type_filter_runs_raster_chain_only() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let executor = ModelExecutor::new(registry());

        let result = executor
            .run(
                &model,
                &layer_inputs(LayerHandle::raster("dem_1", "dem")),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();

        assert_eq!(result.executed, vec!["filter", "raster_1", "raster_2", "raster_3"]);
        assert_eq!(result.skipped, strings(&["vector_1", "vector_2", "vector_3"]));
        assert_eq!(
            result.outputs.keys().cloned().collect::<BTreeSet<_>>(),
            strings(&["raster_1:renamed", "raster_2:renamed", "raster_3:renamed"])
        );
        assert_eq!(result.state("vector_2"), Some(ChildState::Skipped));
        assert!(!result.child_results.contains_key("vector_1"));
    }

    #[tokio::test]
    async fn test_branch_pruning_is_deterministic() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let executor = ModelExecutor::new(registry());
        let inputs = layer_inputs(LayerHandle::vector("roads_1", "roads"));

        let mut runs = Vec::new();
        for _ in 0..3 {
            let result = executor
                .run(
                    &model,
                    &inputs,
                    &mut ProcessingContext::default(),
                    &ProcessingFeedback::new(false),
                )
                .await
                .unwrap();
            runs.push((result.executed, result.skipped));
        }
        assert!(runs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_layer_identifier_is_resolved_through_context() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let mut context = ProcessingContext::default();
        context
            .project_layers_mut()
            .add_layer(LayerHandle::raster("dem_1", "dem"));
        let inputs = BTreeMap::from([("layer".to_string(), Value::from("dem"))]);

        let result = ModelExecutor::new(registry())
            .run(&model, &inputs, &mut context, &ProcessingFeedback::new(false))
            .await
            .unwrap();
        assert_eq!(result.skipped, strings(&["vector_1", "vector_2", "vector_3"]));
    }

    #[tokio::test]
    async fn test_condition_taking_exception_branch_fails() {
        let model = load_model("models/conditional-branches.yaml").unwrap();
        let feedback = ProcessingFeedback::new(false);

        let error = ModelExecutor::new(registry())
            .run(&model, &BTreeMap::new(), &mut ProcessingContext::default(), &feedback)
            .await
            .unwrap_err();

        match &error {
            ExecutionError::AlgorithmFailed {
                child_id,
                description,
                source,
            } => {
                assert_eq!(child_id, "exception");
                assert_eq!(description, "Raise exception");
                assert!(matches!(source, AlgorithmError::Validation(m) if m == "Model assertion failed"));
            }
            other => panic!("expected algorithm failure, got {:?}", other),
        }
        assert_eq!(
            error.to_string(),
            "Error encountered while running Raise exception: Model assertion failed"
        );
        assert!(feedback.html_log().contains("<span style=\"color:red\">Model assertion failed</span>"));
    }

    #[tokio::test]
    async fn test_condition_taking_warning_branch_succeeds() {
        let mut model = load_model("models/conditional-branches.yaml").unwrap();
        model.variables.insert("fail".to_string(), Value::Bool(false));
        let feedback = ProcessingFeedback::new(false);

        let result = ModelExecutor::new(registry())
            .run(&model, &BTreeMap::new(), &mut ProcessingContext::default(), &feedback)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Succeeded);
        assert_eq!(result.executed, vec!["branch", "warning"]);
        assert_eq!(result.skipped, strings(&["exception"]));
        assert!(feedback.text_log().contains("Model Conditional branches passed\n"));
    }

    #[tokio::test]
    async fn test_expressions_see_variables_and_earlier_results() {
        let mut model = ProcessingModel::new("Demo", "tests");
        model.variables.insert("base".to_string(), Value::Int(21));
        model.add_child(
            ChildAlgorithm::new("native:calculateexpression")
                .with_child_id("calc")
                .with_parameter("INPUT", ParameterSource::from_static_value("@base * 2")),
        );
        model.add_child(
            ChildAlgorithm::new("native:stringconcatenation")
                .with_child_id("concat")
                .with_parameter("INPUT_1", ParameterSource::from_expression("@model_name || '-'"))
                .with_parameter("INPUT_2", ParameterSource::from_child_output("calc", "OUTPUT"))
                .with_model_output(ModelOutput::new("joined", "CONCATENATION")),
        );

        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();

        assert_eq!(result.executed, vec!["calc", "concat"]);
        assert_eq!(result.output("concat:joined"), Some(&Value::from("Demo-42")));
    }

    #[tokio::test]
    async fn test_missing_mandatory_input() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let error = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ExecutionError::MissingModelInput { parameter } if parameter == "layer"
        ));
    }

    #[tokio::test]
    async fn test_unavailable_algorithm() {
        let model = load_model("models/buffer-centroid.yaml").unwrap();
        let error = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ExecutionError::AlgorithmNotFound { child_id, algorithm_id }
                if child_id == "buffer" && algorithm_id == "native:buffer"
        ));
    }

    #[tokio::test]
    async fn test_cyclic_model_is_rejected() {
        let mut model = ProcessingModel::new("cycle", "tests");
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("a")
                .with_parameter("INPUT", ParameterSource::from_child_output("b", "OUTPUT")),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("b")
                .with_dependency(ChildDependency::new("a")),
        );

        let error = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap_err();
        match error {
            ExecutionError::InvalidModel { errors } => {
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ValidationError::CyclicDependency { .. })));
            }
            other => panic!("expected invalid model, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_child_aborts_run() {
        let mut model = ProcessingModel::new("failing", "tests");
        model.add_child(
            ChildAlgorithm::new("test:failing")
                .with_child_id("a")
                .with_description("Failing step"),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("b")
                .with_parameter("INPUT", ParameterSource::from_child_output("a", "OUTPUT")),
        );

        let error = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Error encountered while running Failing step: Simulated algorithm failure"
        );
    }

    fn two_step_model(second: ParameterSource) -> ProcessingModel {
        let mut model = ProcessingModel::new("resolution", "tests");
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("a")
                .with_parameter("INPUT", ParameterSource::from_static_value("x")),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("b")
                .with_parameter("INPUT", second)
                .with_dependency(ChildDependency::new("a")),
        );
        model
    }

    #[tokio::test]
    async fn test_failed_expression_aborts_run() {
        let model = two_step_model(ParameterSource::from_expression("@missing + 1"));
        let feedback = ProcessingFeedback::new(false);

        let error = ModelExecutor::new(registry())
            .run(&model, &BTreeMap::new(), &mut ProcessingContext::default(), &feedback)
            .await
            .unwrap_err();

        match error {
            ExecutionError::Resolution {
                child_id,
                parameter,
                reason,
            } => {
                assert_eq!(child_id, "b");
                assert_eq!(parameter, "INPUT");
                assert!(reason.contains("@missing + 1"), "reason was {}", reason);
            }
            other => panic!("expected resolution failure, got {:?}", other),
        }

        let log = feedback.text_log();
        assert!(log.contains("Prepare algorithm: a\n"));
        assert!(log.contains("OK. Execution took"));
        assert!(!log.contains("Prepare algorithm: b"));
    }

    #[tokio::test]
    async fn test_output_never_produced_aborts_run() {
        let model = two_step_model(ParameterSource::from_child_output("a", "EXTRA"));
        let feedback = ProcessingFeedback::new(false);

        let error = ModelExecutor::new(registry())
            .run(&model, &BTreeMap::new(), &mut ProcessingContext::default(), &feedback)
            .await
            .unwrap_err();

        assert!(matches!(
            &error,
            ExecutionError::Resolution { child_id, parameter, .. }
                if child_id == "b" && parameter == "INPUT"
        ));
        assert!(error.to_string().contains("did not produce output 'EXTRA'"));
        assert!(feedback.text_log().contains("OK. Execution took"));
    }

    #[tokio::test]
    async fn test_cancellation_between_children() {
        let mut model = ProcessingModel::new("cancel", "tests");
        model.add_child(
            ChildAlgorithm::new("test:cancel")
                .with_child_id("a")
                .with_parameter("INPUT", ParameterSource::from_static_value("x")),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("b")
                .with_parameter("INPUT", ParameterSource::from_child_output("a", "OUTPUT")),
        );

        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Canceled);
        assert_eq!(result.executed, vec!["a"]);
        assert_eq!(result.state("b"), Some(ChildState::Pending));
        assert_eq!(result.child_results["a"]["OUTPUT"], Value::from("x"));
    }

    #[tokio::test]
    async fn test_cancellation_before_start() {
        let model = load_model("models/type-filter.yaml").unwrap();
        let feedback = ProcessingFeedback::new(false);
        feedback.cancel();

        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &layer_inputs(LayerHandle::vector("roads_1", "roads")),
                &mut ProcessingContext::default(),
                &feedback,
            )
            .await
            .unwrap();
        assert_eq!(result.status, RunStatus::Canceled);
        assert!(result.executed.is_empty());
        assert!(result.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_error_inside_algorithm() {
        let mut model = ProcessingModel::new("interrupt", "tests");
        model.add_child(ChildAlgorithm::new("test:interrupt").with_child_id("a"));

        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();
        assert_eq!(result.status, RunStatus::Canceled);
        assert_eq!(result.state("a"), Some(ChildState::Failed));
    }

    #[tokio::test]
    async fn test_inactive_children_and_dependents_are_skipped() {
        let mut model = ProcessingModel::new("inactive", "tests");
        model
            .add_parameter(ModelParameter::new(ParameterDefinition::new(
                "value",
                ParameterType::String,
            )))
            .unwrap();
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("a")
                .with_parameter("INPUT", ParameterSource::from_model_parameter("value")),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("b")
                .with_parameter("INPUT", ParameterSource::from_child_output("a", "OUTPUT"))
                .inactive(),
        );
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("c")
                .with_dependency(ChildDependency::new("b")),
        );

        let inputs = BTreeMap::from([("value".to_string(), Value::from("v"))]);
        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &inputs,
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();

        assert_eq!(result.executed, vec!["a"]);
        assert_eq!(result.skipped, strings(&["b", "c"]));
    }

    #[tokio::test]
    async fn test_model_output_default_when_not_produced() {
        let mut model = ProcessingModel::new("defaults", "tests");
        let mut output = ModelOutput::new("missing", "NOT_PRODUCED");
        output.default_value = Some(Value::from("fallback"));
        model.add_child(
            ChildAlgorithm::new("test:passthrough")
                .with_child_id("a")
                .with_model_output(output)
                .with_model_output(ModelOutput::new("out", "OUTPUT")),
        );

        let result = ModelExecutor::new(registry())
            .run(
                &model,
                &BTreeMap::new(),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();
        assert_eq!(result.output("a:missing"), Some(&Value::from("fallback")));
        assert_eq!(result.output("a:out"), Some(&Value::Null));
    }
}
