//! Contains all edit plan types.

use crate::error::{CarveError, CarveResult};
use crate::text::SourceText;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edit plan for a component extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditPlan {
    /// Source file being edited
    pub source_file: String,
    /// List of individual edits to apply
    pub edits: Vec<TextEdit>,
    /// Validation rules to check after editing
    pub validations: Vec<ValidationRule>,
    /// Plan metadata
    pub metadata: EditPlanMetadata,
}

impl EditPlan {
    /// Edits that target the source document (everything except file creations)
    pub fn source_edits(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter().filter(move |edit| {
            edit.edit_type != EditType::Create
                && edit
                    .file_path
                    .as_deref()
                    .map_or(true, |path| path == self.source_file)
        })
    }

    /// Files this plan creates, as `(path, contents)` pairs
    pub fn created_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edits.iter().filter_map(|edit| match edit.edit_type {
            EditType::Create => edit
                .file_path
                .as_deref()
                .map(|path| (path, edit.new_text.as_str())),
            _ => None,
        })
    }

    /// Apply the source edits to `text`, returning the edited document
    ///
    /// Edits are applied from the end of the document towards the start so
    /// earlier locations stay valid. Among edits starting at the same offset
    /// the higher priority is applied first. Overlapping edits are rejected.
    pub fn apply_to_source(&self, text: &str) -> CarveResult<String> {
        let source = SourceText::new(text);
        let mut resolved = Vec::new();
        for edit in self.source_edits() {
            let start = source.offset_at(edit.location.start_line, edit.location.start_column)?;
            let end = source.offset_at(edit.location.end_line, edit.location.end_column)?;
            if start > end {
                return Err(CarveError::invalid_input(format!(
                    "Edit '{}' ends before it starts",
                    edit.description
                )));
            }
            resolved.push((start, end, edit));
        }

        resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.priority.cmp(&a.2.priority)));

        let mut output = text.to_string();
        let mut boundary = usize::MAX;
        for (start, end, edit) in resolved {
            if end > boundary {
                return Err(CarveError::invalid_input(format!(
                    "Edit '{}' overlaps another edit",
                    edit.description
                )));
            }
            let byte_start = source.byte_offset(start)?;
            let byte_end = source.byte_offset(end)?;
            match edit.edit_type {
                EditType::Delete => output.replace_range(byte_start..byte_end, ""),
                _ => output.replace_range(byte_start..byte_end, &edit.new_text),
            }
            boundary = start;
        }

        tracing::debug!(
            source_file = %self.source_file,
            edits = self.edits.len(),
            "Applied edit plan"
        );
        Ok(output)
    }
}

/// Individual text edit operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    /// File path for this edit
    /// If None, uses the source_file from EditPlan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Edit type classification
    pub edit_type: EditType,
    /// Location of the edit
    pub location: EditLocation,
    /// Original text to be replaced
    pub original_text: String,
    /// New text to insert
    pub new_text: String,
    /// Edit priority (higher numbers applied first)
    pub priority: u32,
    /// Description of what this edit does
    pub description: String,
}

/// Types of edits that can be performed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    /// Add new import
    AddImport,
    /// Add new code
    Insert,
    /// Remove code
    Delete,
    /// Replace code
    Replace,
    /// Create a new file
    Create,
}

/// Location of an edit in the source file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditLocation {
    /// Start line (0-based)
    pub start_line: u32,
    /// Start column (0-based)
    pub start_column: u32,
    /// End line (0-based)
    pub end_line: u32,
    /// End column (0-based)
    pub end_column: u32,
}

impl EditLocation {
    /// Location spanning two character offsets of `source`
    pub fn from_offsets(source: &SourceText, start: usize, end: usize) -> Self {
        let start = source.position_at(start);
        let end = source.position_at(end);
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    /// Zero-width location at a character offset
    pub fn point(source: &SourceText, offset: usize) -> Self {
        Self::from_offsets(source, offset, offset)
    }
}

/// Validation rule to check after editing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    /// Rule type
    pub rule_type: ValidationType,
    /// Rule description
    pub description: String,
    /// Parameters for the validation
    pub parameters: HashMap<String, serde_json::Value>,
}

/// Types of validation that can be performed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    /// Check syntax is valid
    SyntaxCheck,
    /// Check the target file does not exist yet
    FileAbsent,
}

/// Metadata about the edit plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditPlanMetadata {
    /// Intent that generated this plan
    pub intent_name: String,
    /// Arguments passed to the intent
    pub intent_arguments: serde_json::Value,
    /// Timestamp when plan was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Estimated complexity (1-10)
    pub complexity: u8,
    /// Areas of code that will be impacted
    pub impact_areas: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::EditPlanBuilder;
    use pretty_assertions::assert_eq;

    fn edit(edit_type: EditType, location: EditLocation, new_text: &str, priority: u32) -> TextEdit {
        TextEdit {
            file_path: None,
            edit_type,
            location,
            original_text: String::new(),
            new_text: new_text.to_string(),
            priority,
            description: format!("{:?}", edit_type),
        }
    }

    #[test]
    fn test_apply_replaces_from_the_end() {
        let text = "const a = <b/>;\nconst c = <d/>;\n";
        let source = SourceText::new(text);
        let plan = EditPlanBuilder::new("app.jsx", "test")
            .with_edits(vec![
                edit(EditType::Insert, EditLocation::point(&source, 0), "// head\n", 100),
                edit(
                    EditType::Replace,
                    EditLocation::from_offsets(&source, 26, 30),
                    "<E />",
                    90,
                ),
            ])
            .build();

        let result = plan.apply_to_source(text).unwrap();
        assert_eq!(result, "// head\nconst a = <b/>;\nconst c = <E />;\n");
    }

    #[test]
    fn test_same_offset_applies_higher_priority_first() {
        let text = "x";
        let source = SourceText::new(text);
        let plan = EditPlanBuilder::new("app.jsx", "test")
            .with_edits(vec![
                edit(EditType::Insert, EditLocation::point(&source, 0), "a", 10),
                edit(EditType::Insert, EditLocation::point(&source, 0), "b", 20),
            ])
            .build();

        assert_eq!(plan.apply_to_source(text).unwrap(), "abx");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let text = "0123456789";
        let source = SourceText::new(text);
        let plan = EditPlanBuilder::new("app.jsx", "test")
            .with_edits(vec![
                edit(EditType::Replace, EditLocation::from_offsets(&source, 2, 6), "x", 1),
                edit(EditType::Delete, EditLocation::from_offsets(&source, 4, 8), "", 1),
            ])
            .build();

        assert!(plan.apply_to_source(text).is_err());
    }

    #[test]
    fn test_created_files_are_not_applied_to_source() {
        let text = "abc";
        let mut create = edit(
            EditType::Create,
            EditLocation::from_offsets(&SourceText::new(""), 0, 0),
            "export const X = 1;\n",
            100,
        );
        create.file_path = Some("X.js".to_string());
        let plan = EditPlanBuilder::new("app.js", "test")
            .with_edits(vec![create])
            .build();

        assert_eq!(plan.apply_to_source(text).unwrap(), "abc");
        let created: Vec<_> = plan.created_files().collect();
        assert_eq!(created, vec![("X.js", "export const X = 1;\n")]);
    }
}
