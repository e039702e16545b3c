// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script code generation for processing models.

use crate::model::child::ChildAlgorithm;
use crate::model::graph::ProcessingModel;
use crate::model::source::{escape_quotes, ParameterSource};

const INDENT: &str = "    ";

/// Renders the model as a standalone script running each active child in
/// dependency order, with step numbered progress and cancellation checks.
pub fn model_as_script(model: &ProcessingModel) -> String {
    let order = model
        .topological_order()
        .unwrap_or_else(|_| model.children().keys().cloned().collect());
    let steps: Vec<&ChildAlgorithm> = order
        .iter()
        .filter_map(|id| model.child(id))
        .filter(|child| child.active)
        .collect();

    let friendly_name = |child_id: &str| -> String {
        model
            .child(child_id)
            .map(|child| child.script_variable().to_string())
            .unwrap_or_else(|| child_id.to_string())
    };

    let mut lines = vec![
        "\"\"\"".to_string(),
        "Model exported as script.".to_string(),
        format!("Name : {}", model.name),
        format!("Group : {}", model.group),
        "\"\"\"".to_string(),
        String::new(),
        "import processing".to_string(),
        "from processing import MultiStepFeedback".to_string(),
        String::new(),
        String::new(),
        "def run_model(parameters, context, model_feedback):".to_string(),
    ];

    let mut body = vec![
        "# Use a multi-step feedback, so that individual child algorithm progress reports are adjusted for the".to_string(),
        "# overall progress through the model".to_string(),
        format!("feedback = MultiStepFeedback({}, model_feedback)", steps.len()),
        "results = {}".to_string(),
        "outputs = {}".to_string(),
    ];

    for (step, child) in steps.iter().enumerate() {
        if step > 0 {
            body.push(String::new());
            body.push(format!("feedback.set_current_step({})", step));
            body.push("if feedback.is_canceled():".to_string());
            body.push(format!("{}return {{}}", INDENT));
        }
        body.push(String::new());
        body.extend(child_as_script(child, &friendly_name));
    }

    body.push("return results".to_string());

    lines.extend(body.into_iter().map(|line| {
        if line.is_empty() {
            line
        } else {
            format!("{}{}", INDENT, line)
        }
    }));

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

fn child_as_script(child: &ChildAlgorithm, friendly_name: &dyn Fn(&str) -> String) -> Vec<String> {
    let variable = escape_quotes(child.script_variable());
    let mut lines = vec![format!("# {}", child.display_description())];

    let mut parameters: Vec<String> = child
        .parameter_sources
        .iter()
        .map(|(name, sources)| {
            format!(
                "'{}': {}",
                escape_quotes(name),
                sources_as_script(sources, friendly_name)
            )
        })
        .collect();

    for output in child.model_outputs.values() {
        parameters.push(format!(
            "'{}': parameters['{}']",
            escape_quotes(&output.child_output_name),
            escape_quotes(&output.result_key())
        ));
    }

    if parameters.is_empty() {
        lines.push("alg_params = {}".to_string());
    } else {
        lines.push("alg_params = {".to_string());
        let last = parameters.len() - 1;
        for (i, parameter) in parameters.into_iter().enumerate() {
            let separator = if i == last { "" } else { "," };
            lines.push(format!("{}{}{}", INDENT, parameter, separator));
        }
        lines.push("}".to_string());
    }

    lines.push(format!(
        "outputs['{}'] = processing.run('{}', alg_params, context=context, feedback=feedback, is_child_algorithm=True)",
        variable,
        escape_quotes(&child.algorithm_id)
    ));

    for output in child.model_outputs.values() {
        lines.push(format!(
            "results['{}'] = outputs['{}']['{}']",
            escape_quotes(&output.result_key()),
            variable,
            escape_quotes(&output.child_output_name)
        ));
    }
    lines
}

fn sources_as_script(
    sources: &[ParameterSource],
    friendly_name: &dyn Fn(&str) -> String,
) -> String {
    match sources {
        [single] => single.as_script_code(friendly_name),
        many => {
            let parts: Vec<String> = many
                .iter()
                .map(|source| source.as_script_code(friendly_name))
                .collect();
            format!("[{}]", parts.join(","))
        }
    }
}
