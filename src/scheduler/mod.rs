//! Rotation scheduler: non-repeating dynamic and question selection.

mod rotation;

pub use rotation::{DynamicStatus, DynamicsManager, ResolvedQuestion, SchedulerSnapshot};
