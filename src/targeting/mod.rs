//! Player targeting: who a drawn question applies to.

mod outcome;
mod resolver;

pub use outcome::{TargetList, TargetOutcome};
pub use resolver::{SingleRotation, TargetResolver, TargetingSnapshot};
