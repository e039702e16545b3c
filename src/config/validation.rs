// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph level validation for processing models.
//!
//! Per child checks (parameter bindings, algorithm resolution) live on the
//! model itself. This module checks the shape of the graph:
//!
//! 1. **Reference Validation**: every explicit dependency names an existing child
//! 2. **Cycle Detection**: the active part of the graph is acyclic
//!
//! Cycle detection only runs once references resolve, since a dangling edge
//! would otherwise be reported twice.
//!
//! ## Cycle Detection Algorithm
//! Uses **Depth-First Search (DFS) with recursion stack** to detect cycles:
//! - **Time Complexity**: O(V + E) where V = children, E = dependencies
//! - **Space Complexity**: O(V) for visited set and recursion stack
//! - **Advantage**: Provides the actual cycle path for debugging
//!
//! Both explicit dependencies and child output sources count as edges.
//! Inactive children never run, so edges touching them are ignored.

use std::collections::{BTreeMap, HashSet};

use crate::errors::ValidationError;
use crate::model::ProcessingModel;
use crate::observability::messages::validation::{CycleDetected, UnresolvedDependencyFound};
use crate::observability::messages::StructuredLog;

/// Validates a model's dependency graph for structural integrity.
///
/// # Returns
///
/// * `Ok(())` - every explicit dependency resolves and the active graph is acyclic
/// * `Err(Vec<ValidationError>)` - all problems found
///
/// # Examples
///
/// ```rust
/// use processing_model::config::validate_dependency_graph;
/// use processing_model::model::{ChildAlgorithm, ChildDependency, ProcessingModel};
///
/// let mut model = ProcessingModel::new("example", "docs");
/// model.add_child(ChildAlgorithm::new("native:raisewarning").with_child_id("a"));
/// model.add_child(
///     ChildAlgorithm::new("native:raisewarning")
///         .with_child_id("b")
///         .with_dependency(ChildDependency::new("a")),
/// );
///
/// assert!(validate_dependency_graph(&model).is_ok());
/// ```
pub fn validate_dependency_graph(model: &ProcessingModel) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(unresolved_errors) = validate_dependency_references(model) {
        errors.extend(unresolved_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(model) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every explicit dependency points to an existing child.
///
/// Child output sources naming a missing child are reported by the per child
/// checks instead, together with the parameter they belong to.
fn validate_dependency_references(model: &ProcessingModel) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for child in model.children().values() {
        for dependency in &child.dependencies {
            if model.child(&dependency.child_id).is_none() {
                UnresolvedDependencyFound {
                    child_id: &child.child_id,
                    missing_dependency: &dependency.child_id,
                }
                .log();
                errors.push(ValidationError::UnresolvedDependency {
                    child_id: child.child_id.clone(),
                    missing_dependency: dependency.child_id.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that the active part of the graph is acyclic.
///
/// Builds a forward adjacency list (predecessor → dependents) over active
/// children and runs the three colour DFS from each unvisited child in id
/// order, so the reported cycle is stable across runs.
fn validate_acyclic_graph(model: &ProcessingModel) -> Result<(), Vec<ValidationError>> {
    let mut graph: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for child in model.children().values().filter(|c| c.active) {
        graph.entry(child.child_id.as_str()).or_default();
    }

    for child in model.children().values().filter(|c| c.active) {
        for predecessor in child.predecessors() {
            if let Some(dependents) = graph.get_mut(predecessor) {
                dependents.push(&child.child_id);
            }
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for child_id in graph.keys() {
        if !visited.contains(*child_id) {
            if let Some(cycle) =
                dfs_cycle_detection(*child_id, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                CycleDetected { cycle: &cycle }.log();
                return Err(vec![ValidationError::CyclicDependency { cycle }]);
            }
        }
    }

    Ok(())
}

/// Depth-first search with cycle detection and path tracking.
///
/// When a back edge reaches a node on the current path, the path segment
/// from that node onward plus the back edge is the cycle.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) =
                    dfs_cycle_detection(neighbor, graph, visited, rec_stack, path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildAlgorithm, ChildDependency, ParameterSource};

    fn create_test_child(id: &str, depends_on: Vec<&str>) -> ChildAlgorithm {
        depends_on.into_iter().fold(
            ChildAlgorithm::new("native:raisewarning").with_child_id(id),
            |child, dependency| child.with_dependency(ChildDependency::new(dependency)),
        )
    }

    fn model_of(children: Vec<ChildAlgorithm>) -> ProcessingModel {
        let mut model = ProcessingModel::new("test", "tests");
        model.set_children(children);
        model
    }

    #[test]
    fn test_valid_graphs() {
        let cases = vec![
            ("empty", vec![]),
            ("single", vec![create_test_child("a", vec![])]),
            (
                "linear chain",
                vec![
                    create_test_child("a", vec![]),
                    create_test_child("b", vec!["a"]),
                    create_test_child("c", vec!["b"]),
                ],
            ),
            (
                "diamond",
                vec![
                    create_test_child("a", vec![]),
                    create_test_child("b", vec!["a"]),
                    create_test_child("c", vec!["a"]),
                    create_test_child("d", vec!["b", "c"]),
                ],
            ),
        ];

        for (name, children) in cases {
            assert!(
                validate_dependency_graph(&model_of(children)).is_ok(),
                "case '{}' should be valid",
                name
            );
        }
    }

    #[test]
    fn test_unresolved_dependency() {
        let model = model_of(vec![
            create_test_child("a", vec![]),
            create_test_child("b", vec!["nonexistent"]),
        ]);

        let errors = validate_dependency_graph(&model).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedDependency {
                child_id: "b".to_string(),
                missing_dependency: "nonexistent".to_string(),
            }]
        );
    }

    #[test]
    fn test_cycles() {
        let cases = vec![
            (
                "simple",
                vec![create_test_child("a", vec!["b"]), create_test_child("b", vec!["a"])],
            ),
            ("self dependency", vec![create_test_child("a", vec!["a"])]),
            (
                "complex",
                vec![
                    create_test_child("a", vec!["b"]),
                    create_test_child("b", vec!["c"]),
                    create_test_child("c", vec!["d"]),
                    create_test_child("d", vec!["b"]),
                ],
            ),
        ];

        for (name, children) in cases {
            let errors = validate_dependency_graph(&model_of(children)).unwrap_err();
            assert_eq!(errors.len(), 1, "case '{}'", name);
            assert!(
                matches!(errors[0], ValidationError::CyclicDependency { .. }),
                "case '{}'",
                name
            );
        }
    }

    #[test]
    fn test_cycle_path_is_closed() {
        let model = model_of(vec![
            create_test_child("a", vec!["b"]),
            create_test_child("b", vec!["a"]),
        ]);

        let errors = validate_dependency_graph(&model).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle, &vec!["a".to_string(), "b".to_string(), "a".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cycle_through_child_output_source() {
        let model = model_of(vec![
            create_test_child("a", vec![])
                .with_parameter("MESSAGE", ParameterSource::from_child_output("b", "OUTPUT")),
            create_test_child("b", vec!["a"]),
        ]);

        assert!(validate_dependency_graph(&model).is_err());
    }

    #[test]
    fn test_cycle_through_inactive_child_is_ignored() {
        let model = model_of(vec![
            create_test_child("a", vec!["b"]),
            create_test_child("b", vec!["a"]).inactive(),
        ]);

        assert!(validate_dependency_graph(&model).is_ok());
    }
}
