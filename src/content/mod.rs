//! Content pool: schema types and the validated registry.

mod registry;
mod schema;

pub use registry::DynamicRegistry;
pub use schema::{
    Dynamic, DynamicId, DynamicType, GenderRule, Question, QuestionId, TargetingMode,
};
