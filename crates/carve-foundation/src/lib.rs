//! Foundation layer for carve
//!
//! Shared by the extraction engine and its hosts:
//! - [`error`]: the error taxonomy every fallible operation reports through
//! - [`text`]: conversions between character offsets, byte offsets and line/column positions
//! - [`planning`]: edit plans describing the file changes a refactoring produces

pub mod error;
pub mod planning;
pub mod text;

pub use error::{CarveError, CarveResult, SourceLocation};
pub use planning::{
    EditLocation, EditPlan, EditPlanBuilder, EditPlanMetadata, EditType, TextEdit,
    ValidationRule, ValidationType,
};
pub use text::SourceText;
