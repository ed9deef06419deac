//! Registry of loaded dynamics.
//!
//! The `DynamicRegistry` validates the content pool once at load time and
//! provides lookup by id. Schema violations surface as [`ContentError`]
//! before a game ever starts; mid-game code can rely on the pool being
//! well formed.

use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::core::ContentError;

use super::schema::{Dynamic, DynamicId};

/// Validated, immutable pool of dynamics.
///
/// Cheap to clone: the content is shared behind an `Arc`.
///
/// ## Example
///
/// ```
/// use party_engine::content::{Dynamic, DynamicRegistry, DynamicType, Question};
///
/// let registry = DynamicRegistry::load(vec![Dynamic::new(
///     "wheel",
///     "Prize Wheel",
///     DynamicType::FreeForAll,
///     "Spin it",
///     vec![Question::new("q1", "Spin the wheel!")],
/// )])
/// .unwrap();
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.get(&"wheel".into()).is_some());
/// ```
#[derive(Clone, Debug)]
pub struct DynamicRegistry {
    dynamics: Arc<[Dynamic]>,
    index: FxHashMap<DynamicId, usize>,
}

impl DynamicRegistry {
    /// Load and validate a content pool.
    ///
    /// Validation: unique dynamic ids, unique question ids within each
    /// dynamic, no empty question lists. An empty pool is valid (the first
    /// draw simply yields nothing).
    pub fn load(dynamics: Vec<Dynamic>) -> Result<Self, ContentError> {
        let mut index = FxHashMap::default();

        for (pos, dynamic) in dynamics.iter().enumerate() {
            if index.insert(dynamic.id.clone(), pos).is_some() {
                return Err(ContentError::DuplicateDynamic(dynamic.id.as_str().into()));
            }

            if dynamic.questions.is_empty() {
                return Err(ContentError::EmptyDynamic(dynamic.id.as_str().into()));
            }

            let mut seen = HashSet::new();
            for question in &dynamic.questions {
                if !seen.insert(&question.id) {
                    return Err(ContentError::DuplicateQuestion {
                        dynamic: dynamic.id.as_str().into(),
                        question: question.id.as_str().into(),
                    });
                }
            }
        }

        Ok(Self {
            dynamics: dynamics.into(),
            index,
        })
    }

    /// Get a dynamic by ID.
    #[must_use]
    pub fn get(&self, id: &DynamicId) -> Option<&Dynamic> {
        self.index.get(id).map(|&pos| &self.dynamics[pos])
    }

    /// Check if a dynamic ID is registered.
    #[must_use]
    pub fn contains(&self, id: &DynamicId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of dynamics in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dynamics.len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dynamics.is_empty()
    }

    /// Iterate over all dynamics in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Dynamic> {
        self.dynamics.iter()
    }

    /// All dynamic IDs in load order.
    pub fn ids(&self) -> impl Iterator<Item = &DynamicId> {
        self.dynamics.iter().map(|d| &d.id)
    }

    /// Total question count across the pool.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.dynamics.iter().map(Dynamic::question_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{DynamicType, Question};

    fn dynamic(id: &str, questions: Vec<Question>) -> Dynamic {
        Dynamic::new(id, id, DynamicType::SingleTarget, "instr", questions)
    }

    #[test]
    fn test_load_and_get() {
        let registry = DynamicRegistry::load(vec![
            dynamic("a", vec![Question::new("q1", "t")]),
            dynamic("b", vec![Question::new("q1", "t"), Question::new("q2", "t")]),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.total_questions(), 3);
        assert!(registry.contains(&"a".into()));
        assert!(registry.get(&"missing".into()).is_none());
    }

    #[test]
    fn test_empty_pool_is_valid() {
        let registry = DynamicRegistry::load(vec![]).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.total_questions(), 0);
    }

    #[test]
    fn test_duplicate_dynamic_rejected() {
        let err = DynamicRegistry::load(vec![
            dynamic("a", vec![Question::new("q1", "t")]),
            dynamic("a", vec![Question::new("q2", "t")]),
        ])
        .unwrap_err();

        assert!(matches!(err, ContentError::DuplicateDynamic(id) if id == "a"));
    }

    #[test]
    fn test_duplicate_question_rejected() {
        let err = DynamicRegistry::load(vec![dynamic(
            "a",
            vec![Question::new("q1", "t"), Question::new("q1", "t")],
        )])
        .unwrap_err();

        assert!(matches!(err, ContentError::DuplicateQuestion { .. }));
    }

    #[test]
    fn test_empty_dynamic_rejected() {
        let err = DynamicRegistry::load(vec![dynamic("a", vec![])]).unwrap_err();
        assert!(matches!(err, ContentError::EmptyDynamic(id) if id == "a"));
    }

    #[test]
    fn test_clone_shares_content() {
        let registry = DynamicRegistry::load(vec![dynamic("a", vec![Question::new("q1", "t")])])
            .unwrap();
        let cloned = registry.clone();
        assert_eq!(cloned.len(), registry.len());
    }
}
