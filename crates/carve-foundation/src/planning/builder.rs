//! Fluent construction of [`EditPlan`] values.
//!
//! # Example
//! ```rust
//! use carve_foundation::planning::EditPlanBuilder;
//!
//! let plan = EditPlanBuilder::new("src/App.jsx", "extract_component")
//!     .with_edits(vec![/* edits */])
//!     .with_syntax_validation("Verify syntax after extraction")
//!     .with_intent_args(serde_json::json!({ "componentName": "UserCard" }))
//!     .with_complexity_from_count(3)
//!     .with_impact_area("component_extraction")
//!     .build();
//! assert_eq!(plan.metadata.complexity, 3);
//! ```

use super::edit::{EditPlan, EditPlanMetadata, TextEdit, ValidationRule, ValidationType};
use std::collections::HashMap;

/// Builder for creating EditPlan instances.
pub struct EditPlanBuilder {
    source_file: String,
    intent_name: String,
    edits: Vec<TextEdit>,
    validations: Vec<ValidationRule>,
    intent_arguments: serde_json::Value,
    complexity: u8,
    impact_areas: Vec<String>,
}

impl EditPlanBuilder {
    /// Create a new EditPlanBuilder.
    ///
    /// # Arguments
    /// * `source_file` - Path to the file being refactored
    /// * `intent_name` - Name of the refactoring intent (e.g., "extract_component")
    pub fn new(source_file: impl Into<String>, intent_name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            intent_name: intent_name.into(),
            edits: Vec::new(),
            validations: Vec::new(),
            intent_arguments: serde_json::json!({}),
            complexity: 1,
            impact_areas: Vec::new(),
        }
    }

    /// Set the edits for this plan.
    pub fn with_edits(mut self, edits: Vec<TextEdit>) -> Self {
        self.edits = edits;
        self
    }

    /// Add a syntax validation rule.
    pub fn with_syntax_validation(mut self, description: impl Into<String>) -> Self {
        self.validations.push(ValidationRule {
            rule_type: ValidationType::SyntaxCheck,
            description: description.into(),
            parameters: HashMap::new(),
        });
        self
    }

    /// Require that `path` does not exist when the plan is applied.
    pub fn with_file_absent_validation(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let mut parameters = HashMap::new();
        parameters.insert("path".to_string(), serde_json::Value::String(path.clone()));
        self.validations.push(ValidationRule {
            rule_type: ValidationType::FileAbsent,
            description: format!("File '{}' must not already exist", path),
            parameters,
        });
        self
    }

    /// Set the intent arguments (JSON value).
    ///
    /// Intent arguments capture the parameters used for the refactoring operation,
    /// useful for debugging and audit trails.
    pub fn with_intent_args(mut self, args: serde_json::Value) -> Self {
        self.intent_arguments = args;
        self
    }

    /// Set the complexity score, clamped to 1-10.
    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = complexity.clamp(1, 10);
        self
    }

    /// Calculate complexity from a count (clamped to 1-10).
    pub fn with_complexity_from_count(mut self, count: usize) -> Self {
        self.complexity = count.clamp(1, 10) as u8;
        self
    }

    /// Add a single impact area.
    pub fn with_impact_area(mut self, area: impl Into<String>) -> Self {
        self.impact_areas.push(area.into());
        self
    }

    /// Build the EditPlan.
    pub fn build(self) -> EditPlan {
        EditPlan {
            source_file: self.source_file,
            edits: self.edits,
            validations: self.validations,
            metadata: EditPlanMetadata {
                intent_name: self.intent_name,
                intent_arguments: self.intent_arguments,
                created_at: chrono::Utc::now(),
                complexity: self.complexity,
                impact_areas: self.impact_areas,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_builder() {
        let plan = EditPlanBuilder::new("App.jsx", "extract_component")
            .with_complexity(5)
            .build();

        assert_eq!(plan.source_file, "App.jsx");
        assert_eq!(plan.metadata.intent_name, "extract_component");
        assert_eq!(plan.metadata.complexity, 5);
        assert_eq!(plan.edits.len(), 0);
        assert_eq!(plan.validations.len(), 0);
    }

    #[test]
    fn test_multiple_validations() {
        let plan = EditPlanBuilder::new("App.tsx", "extract_component_to_file")
            .with_syntax_validation("Verify syntax is valid after extraction")
            .with_file_absent_validation("Card.tsx")
            .build();

        assert_eq!(plan.validations.len(), 2);
        assert_eq!(plan.validations[0].rule_type, ValidationType::SyntaxCheck);
        assert_eq!(plan.validations[1].rule_type, ValidationType::FileAbsent);
        assert_eq!(
            plan.validations[1].parameters.get("path"),
            Some(&serde_json::json!("Card.tsx"))
        );
    }

    #[test]
    fn test_complexity_clamping() {
        let high = EditPlanBuilder::new("a.jsx", "refactor")
            .with_complexity(15)
            .build();
        assert_eq!(high.metadata.complexity, 10);

        let low = EditPlanBuilder::new("a.jsx", "refactor")
            .with_complexity_from_count(0)
            .build();
        assert_eq!(low.metadata.complexity, 1);
    }

    #[test]
    fn test_impact_areas_accumulate() {
        let plan = EditPlanBuilder::new("a.jsx", "extract_component")
            .with_impact_area("component_extraction")
            .with_impact_area("imports")
            .build();

        assert_eq!(
            plan.metadata.impact_areas,
            vec!["component_extraction".to_string(), "imports".to_string()]
        );
    }
}
