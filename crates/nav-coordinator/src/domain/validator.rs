//! # Navigation State Validator
//!
//! Pure structural checker for navigation state trees.
//!
//! ## Rules
//!
//! | Check | Outcome |
//! |-------|---------|
//! | Tree absent | error |
//! | Stack with no routes | error |
//! | Active index out of bounds | error |
//! | Route with empty name | error |
//! | Nesting deeper than `max_depth` | error |
//! | Route not in the catalogue for its stack | warning |
//! | Serialised size above `max_state_bytes` | warning |
//!
//! `valid` is false iff at least one error was recorded. Warnings are
//! informational only.

use super::routes::{RouteCatalogue, ROOT_STACK};
use super::state::{StateNode, StateTree};
use crate::config::ValidationConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of [`StateValidator::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn rejected(error: String) -> Self {
        Self {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

/// Outcome of [`StateValidator::is_version_compatible`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionCheck {
    pub compatible: bool,
    pub error: Option<String>,
}

/// Structural validator for navigation state.
#[derive(Clone, Debug)]
pub struct StateValidator {
    config: ValidationConfig,
    catalogue: RouteCatalogue,
}

impl Default for StateValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default(), RouteCatalogue::standard())
    }
}

impl StateValidator {
    pub fn new(config: ValidationConfig, catalogue: RouteCatalogue) -> Self {
        Self { config, catalogue }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &RouteCatalogue {
        &self.catalogue
    }

    /// Validates the structure of a state tree.
    pub fn validate(&self, tree: Option<&StateTree>) -> ValidationResult {
        let Some(tree) = tree else {
            return ValidationResult::rejected("Navigation state is absent".to_string());
        };

        if tree.routes.is_empty() {
            return ValidationResult::rejected(
                "Navigation state must have at least one route".to_string(),
            );
        }

        if tree.index >= tree.routes.len() {
            return ValidationResult::rejected(format!(
                "Navigation state index ({}) is out of bounds for routes array (length: {})",
                tree.index,
                tree.routes.len()
            ));
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match serde_json::to_vec(tree) {
            Ok(bytes) if bytes.len() > self.config.max_state_bytes => warnings.push(format!(
                "Navigation state size ({} bytes) exceeds recommended limit ({} bytes)",
                bytes.len(),
                self.config.max_state_bytes
            )),
            Ok(_) => {}
            Err(_) => warnings.push("Could not calculate navigation state size".to_string()),
        }

        for route in &tree.routes {
            self.validate_node(route, ROOT_STACK, 0, &mut errors, &mut warnings);
        }

        let valid = errors.is_empty();
        if !valid {
            warn!(?errors, ?warnings, "Navigation state validation failed");
        } else if !warnings.is_empty() {
            debug!(?warnings, "Navigation state validation passed with warnings");
        }

        ValidationResult {
            valid,
            errors,
            warnings,
        }
    }

    /// Checks one node; `depth` is the number of nested stacks above it.
    fn validate_node(
        &self,
        node: &StateNode,
        stack: &str,
        depth: usize,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) {
        if depth > self.config.max_depth {
            errors.push(format!(
                "Navigation state has too many nested levels (max {})",
                self.config.max_depth
            ));
            return;
        }

        if node.name.is_empty() {
            errors.push(format!("Route at depth {} is missing a valid name", depth));
            return;
        }

        if self.catalogue.check(&node.name, stack) == Some(false) {
            warnings.push(format!(
                "Route \"{}\" is not in the standard route list for {}",
                node.name, stack
            ));
        }

        let Some(nested) = &node.state else {
            return;
        };

        if nested.routes.is_empty() {
            errors.push(format!(
                "Route \"{}\" has nested state without routes",
                node.name
            ));
            return;
        }

        if nested.index >= nested.routes.len() {
            errors.push(format!(
                "Route \"{}\" has invalid nested state index ({} of {})",
                node.name,
                nested.index,
                nested.routes.len()
            ));
            return;
        }

        let child_stack = self.catalogue.child_stack(&node.name, stack);
        for child in &nested.routes {
            self.validate_node(child, child_stack, depth + 1, errors, warnings);
        }
    }

    /// Returns the tree unchanged when it validates, `None` otherwise.
    pub fn clean(&self, tree: Option<&StateTree>) -> Option<StateTree> {
        let result = self.validate(tree);
        if !result.valid {
            warn!(errors = ?result.errors, "Cannot clean invalid navigation state");
            return None;
        }
        tree.cloned()
    }

    /// Lenient version gate for bare trees: any present tree is accepted.
    /// Versioned records are checked with [`StateVersion::is_compatible_with`](super::record::StateVersion::is_compatible_with).
    pub fn is_version_compatible(&self, tree: Option<&StateTree>) -> VersionCheck {
        match tree {
            Some(_) => VersionCheck {
                compatible: true,
                error: None,
            },
            None => VersionCheck {
                compatible: false,
                error: Some("State is absent".to_string()),
            },
        }
    }
}
