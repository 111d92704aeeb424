//! Edit plans produced by refactorings

mod builder;
mod edit;

pub use builder::EditPlanBuilder;
pub use edit::{
    EditLocation, EditPlan, EditPlanMetadata, EditType, TextEdit, ValidationRule,
    ValidationType,
};
