//! Content rotation: which dynamic plays next, with which question.
//!
//! ## Guarantees
//!
//! - Every non-reusable question is drawn at most once per game
//! - A dynamic with no unused questions left is retired for the game
//! - The same dynamic is never drawn twice in a row while an alternative
//!   exists
//!
//! `paired_challenge` and `preference_vote` dynamics never mark questions
//! used: they vary by targeting rather than content and keep their small
//! pools alive for the whole game.

use im::HashSet as ImHashSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::content::{
    Dynamic, DynamicId, DynamicRegistry, DynamicType, Question, QuestionId, TargetingMode,
};
use crate::core::{EngineError, EngineResult, GameRng};

/// A question drawn by the scheduler, denormalized with its dynamic's
/// display fields so the caller can render a round without extra lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedQuestion {
    /// The drawn question content.
    pub question: Question,

    /// Owning dynamic.
    pub dynamic_id: DynamicId,

    /// Dynamic display name.
    pub dynamic_name: String,

    /// Dynamic-level instruction.
    pub dynamic_instruction: String,

    /// Dynamic type, driving targeting.
    pub dynamic_type: DynamicType,
}

impl ResolvedQuestion {
    fn new(dynamic: &Dynamic, question: &Question) -> Self {
        Self {
            question: question.clone(),
            dynamic_id: dynamic.id.clone(),
            dynamic_name: dynamic.name.clone(),
            dynamic_instruction: dynamic.instruction.clone(),
            dynamic_type: dynamic.dynamic_type,
        }
    }

    /// The drawn question's id.
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.question.id
    }

    /// Targeting mode required before this question can be shown.
    #[must_use]
    pub fn targeting(&self) -> TargetingMode {
        self.dynamic_type.targeting()
    }

    /// Question-level instruction, falling back to the dynamic's.
    #[must_use]
    pub fn instruction(&self) -> &str {
        self.question
            .instruction
            .as_deref()
            .unwrap_or(&self.dynamic_instruction)
    }
}

/// Per-dynamic usage report for UI display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicStatus {
    /// Dynamic id.
    pub id: DynamicId,
    /// Total questions in the pool.
    pub total: usize,
    /// Questions consumed this game.
    pub used: usize,
    /// Questions still drawable. Reusable dynamics report their raw pool size.
    pub remaining: usize,
    /// Whether the scheduler can still return this dynamic.
    pub available: bool,
}

/// Serializable scheduler state for persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Consumed question ids per dynamic.
    pub used_questions: FxHashMap<DynamicId, Vec<QuestionId>>,
    /// Immediately-previous dynamic, excluded from the next draw.
    pub last_dynamic: Option<DynamicId>,
    /// Dynamics still in rotation.
    pub available_dynamics: Vec<DynamicId>,
}

/// Rotation scheduler over a validated content pool.
#[derive(Clone, Debug)]
pub struct DynamicsManager {
    registry: DynamicRegistry,
    used: FxHashMap<DynamicId, ImHashSet<QuestionId>>,
    available: Vec<DynamicId>,
    last_dynamic: Option<DynamicId>,
}

impl DynamicsManager {
    /// Create a scheduler with the full pool available.
    #[must_use]
    pub fn new(registry: DynamicRegistry) -> Self {
        let available = registry.ids().cloned().collect();
        Self {
            registry,
            used: FxHashMap::default(),
            available,
            last_dynamic: None,
        }
    }

    /// The content pool this scheduler draws from.
    #[must_use]
    pub fn registry(&self) -> &DynamicRegistry {
        &self.registry
    }

    /// Draw the next question: pick an available dynamic (avoiding an
    /// immediate repeat when an alternative exists), then an unused question
    /// within it. Returns `None` once the pool is exhausted.
    pub fn next_question(&mut self, rng: &mut GameRng) -> Option<ResolvedQuestion> {
        loop {
            let dynamic_id = self.pick_dynamic(rng)?;
            // The available set only holds registered ids; guard anyway.
            let Some(dynamic) = self.registry.get(&dynamic_id).cloned() else {
                self.retire(&dynamic_id);
                continue;
            };

            match self.pick_question(&dynamic, rng) {
                Some(question) => {
                    self.last_dynamic = Some(dynamic_id);
                    return Some(ResolvedQuestion::new(&dynamic, &question));
                }
                // The available set claimed a dynamic with nothing left.
                // Retire it and redraw.
                None => self.retire(&dynamic_id),
            }
        }
    }

    fn pick_dynamic(&mut self, rng: &mut GameRng) -> Option<DynamicId> {
        if self.available.is_empty() {
            return None;
        }

        // Exclude the previous dynamic only when something else exists.
        let candidates: Vec<&DynamicId> = match &self.last_dynamic {
            Some(last) if self.available.iter().any(|id| id != last) => {
                self.available.iter().filter(|id| *id != last).collect()
            }
            _ => self.available.iter().collect(),
        };

        rng.choose(&candidates).map(|id| (*id).clone())
    }

    fn pick_question(&mut self, dynamic: &Dynamic, rng: &mut GameRng) -> Option<Question> {
        let used = self.used.entry(dynamic.id.clone()).or_default();
        let unused: Vec<&Question> = dynamic
            .questions
            .iter()
            .filter(|q| !used.contains(&q.id))
            .collect();

        let question = rng.choose(&unused).map(|q| (*q).clone())?;

        if !dynamic.dynamic_type.reusable_questions() {
            used.insert(question.id.clone());
            if used.len() == dynamic.question_count() {
                self.retire(&dynamic.id);
            }
        }

        Some(question)
    }

    fn retire(&mut self, id: &DynamicId) {
        self.available.retain(|d| d != id);
    }

    /// Whether any dynamic still has a drawable question.
    #[must_use]
    pub fn has_more_questions(&self) -> bool {
        !self.available.is_empty()
    }

    /// Total drawable questions across available dynamics.
    ///
    /// Reusable dynamics count their raw pool size.
    #[must_use]
    pub fn remaining_questions(&self) -> usize {
        self.available
            .iter()
            .filter_map(|id| self.registry.get(id))
            .map(|d| {
                if d.dynamic_type.reusable_questions() {
                    d.question_count()
                } else {
                    d.question_count() - self.used_count(&d.id)
                }
            })
            .sum()
    }

    fn used_count(&self, id: &DynamicId) -> usize {
        self.used.get(id).map_or(0, ImHashSet::len)
    }

    /// Per-dynamic usage report covering the whole pool, in load order.
    #[must_use]
    pub fn dynamics_status(&self) -> Vec<DynamicStatus> {
        self.registry
            .iter()
            .map(|d| {
                let used = self.used_count(&d.id);
                let total = d.question_count();
                let remaining = if d.dynamic_type.reusable_questions() {
                    total
                } else {
                    total - used
                };
                DynamicStatus {
                    id: d.id.clone(),
                    total,
                    used,
                    remaining,
                    available: self.available.contains(&d.id),
                }
            })
            .collect()
    }

    /// Clear all ledgers and restore the full pool.
    pub fn reset(&mut self) {
        self.used.clear();
        self.available = self.registry.ids().cloned().collect();
        self.last_dynamic = None;
    }

    /// Capture scheduler state for persistence.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let used_questions = self
            .used
            .iter()
            .map(|(id, set)| {
                let mut ids: Vec<QuestionId> = set.iter().cloned().collect();
                ids.sort();
                (id.clone(), ids)
            })
            .collect();

        SchedulerSnapshot {
            used_questions,
            last_dynamic: self.last_dynamic.clone(),
            available_dynamics: self.available.clone(),
        }
    }

    /// Restore scheduler state from a snapshot.
    ///
    /// Fails with [`EngineError::UnknownDynamic`] if the snapshot references
    /// content missing from the loaded pool.
    pub fn restore(&mut self, snapshot: SchedulerSnapshot) -> EngineResult<()> {
        for id in snapshot
            .used_questions
            .keys()
            .chain(snapshot.available_dynamics.iter())
            .chain(snapshot.last_dynamic.iter())
        {
            if !self.registry.contains(id) {
                return Err(EngineError::UnknownDynamic(id.clone()));
            }
        }

        self.used = snapshot
            .used_questions
            .into_iter()
            .map(|(id, ids)| (id, ids.into_iter().collect()))
            .collect();
        self.available = snapshot.available_dynamics;
        self.last_dynamic = snapshot.last_dynamic;
        Ok(())
    }
}
