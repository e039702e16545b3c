// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Deserializer, Serialize};

/// An edge in the execution graph: a required predecessor child.
///
/// When `conditional_branch` is set the edge is satisfied only if the
/// predecessor took that named branch. Without a branch the dependency
/// simply waits for the predecessor to finish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildDependency {
    pub child_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub conditional_branch: Option<String>,
}

impl ChildDependency {
    pub fn new(child_id: impl Into<String>) -> Self {
        Self {
            child_id: child_id.into(),
            conditional_branch: None,
        }
    }

    pub fn on_branch(child_id: impl Into<String>, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        Self {
            child_id: child_id.into(),
            conditional_branch: if branch.is_empty() { None } else { Some(branch) },
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional_branch.is_some()
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let branch = Option::<String>::deserialize(deserializer)?;
    Ok(branch.filter(|b| !b.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(ChildDependency::new("a"), ChildDependency::new("a"));
        assert_ne!(ChildDependency::new("a"), ChildDependency::new("b"));
        assert_ne!(
            ChildDependency::new("a"),
            ChildDependency::on_branch("a", "VECTOR")
        );
        assert_eq!(
            ChildDependency::on_branch("a", "VECTOR"),
            ChildDependency::on_branch("a", "VECTOR")
        );
    }

    #[test]
    fn test_empty_branch_is_unconditional() {
        assert_eq!(ChildDependency::on_branch("a", ""), ChildDependency::new("a"));

        let parsed: ChildDependency =
            serde_json::from_str(r#"{"child_id": "a", "conditional_branch": ""}"#).unwrap();
        assert!(!parsed.is_conditional());
    }
}
