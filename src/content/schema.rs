//! Content schema: dynamics and their questions.
//!
//! A `Dynamic` is a mini-game mode (mention challenge, arm wrestling,
//! spin-the-bottle...) carrying a list of questions. Content is authored
//! externally as JSON and is immutable once loaded; the engine only reads it.
//!
//! Question `text` may embed `{player1}` / `{player2}` placeholders which the
//! caller substitutes with the resolved target names.

use serde::{Deserialize, Serialize};

use crate::core::Gender;

/// Unique identifier for a dynamic. Author-assigned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicId(String);

impl DynamicId {
    /// Create a new dynamic ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DynamicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DynamicId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for DynamicId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Question identifier, unique within its dynamic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a new question ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How many players a question must be resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetingMode {
    /// No external targets (votes, spin-the-bottle, prize wheel).
    None,
    /// Exactly one target player.
    Single,
    /// Exactly two target players.
    Paired,
}

/// Dynamic type tag.
///
/// Determines targeting and question reuse. `paired_challenge` and
/// `preference_vote` questions are never marked used: those dynamics vary by
/// targeting, not content, and reuse their small question sets across plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicType {
    /// One target player (e.g. mention challenge).
    SingleTarget,
    /// Two target players, possibly gender constrained (e.g. arm wrestling).
    PairedTarget,
    /// Two target players, reusable questions (e.g. rock-paper-scissors).
    PairedChallenge,
    /// Group vote, self-contained, reusable questions.
    #[serde(alias = "vote")]
    PreferenceVote,
    /// No targeting at all (e.g. spin-the-bottle, prize wheel).
    FreeForAll,
}

impl DynamicType {
    /// Targeting mode for this dynamic type.
    #[must_use]
    pub fn targeting(self) -> TargetingMode {
        match self {
            DynamicType::SingleTarget => TargetingMode::Single,
            DynamicType::PairedTarget | DynamicType::PairedChallenge => TargetingMode::Paired,
            DynamicType::PreferenceVote | DynamicType::FreeForAll => TargetingMode::None,
        }
    }

    /// Whether questions of this type may be drawn again across plays.
    #[must_use]
    pub fn reusable_questions(self) -> bool {
        matches!(
            self,
            DynamicType::PairedChallenge | DynamicType::PreferenceVote
        )
    }
}

/// Gender eligibility rule attached to a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderRule {
    /// Pair members must share a gender (any gender). Inert for single targets.
    SameGender,
    /// Only male players are eligible.
    Male,
    /// Only female players are eligible.
    Female,
}

impl GenderRule {
    /// Whether a player of `gender` is individually eligible under this rule.
    #[must_use]
    pub fn allows(self, gender: Gender) -> bool {
        match self {
            GenderRule::SameGender => true,
            GenderRule::Male => gender == Gender::Male,
            GenderRule::Female => gender == Gender::Female,
        }
    }

    /// The single gender this rule restricts to, if any.
    #[must_use]
    pub fn required_gender(self) -> Option<Gender> {
        match self {
            GenderRule::SameGender => None,
            GenderRule::Male => Some(Gender::Male),
            GenderRule::Female => Some(Gender::Female),
        }
    }
}

/// A single prompt within a dynamic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within the owning dynamic.
    pub id: QuestionId,

    /// Prompt text, optionally with `{player1}` / `{player2}` placeholders.
    pub text: String,

    /// Decorative emoji.
    #[serde(default)]
    pub emoji: Option<String>,

    /// Question-specific instruction overriding the dynamic's.
    #[serde(default)]
    pub instruction: Option<String>,

    /// Restricts who may be targeted.
    #[serde(default)]
    pub gender_restriction: Option<GenderRule>,

    /// Gender the question text addresses (content metadata).
    #[serde(default)]
    pub target_gender: Option<Gender>,

    /// Prize variants for prize-wheel style content.
    #[serde(default)]
    pub prizes: Vec<String>,

    /// Phrase variants for phrase-challenge content.
    #[serde(default)]
    pub phrases: Vec<String>,
}

impl Question {
    /// Create a question with just an id and text.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            emoji: None,
            instruction: None,
            gender_restriction: None,
            target_gender: None,
            prizes: Vec::new(),
            phrases: Vec::new(),
        }
    }

    /// Set the gender restriction (builder pattern).
    #[must_use]
    pub fn with_gender_restriction(mut self, rule: GenderRule) -> Self {
        self.gender_restriction = Some(rule);
        self
    }

    /// Substitute target names into the text placeholders.
    #[must_use]
    pub fn fill_text(&self, player1: &str, player2: Option<&str>) -> String {
        let mut text = self.text.replace("{player1}", player1);
        if let Some(name) = player2 {
            text = text.replace("{player2}", name);
        }
        text
    }
}

/// A mini-game mode with its question pool. Immutable content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamic {
    /// Unique identifier.
    pub id: DynamicId,

    /// Display name.
    pub name: String,

    /// Type tag driving targeting and reuse.
    #[serde(rename = "type")]
    pub dynamic_type: DynamicType,

    /// How to play this dynamic.
    pub instruction: String,

    /// Question pool. Non-empty (validated at load).
    pub questions: Vec<Question>,
}

impl Dynamic {
    /// Create a dynamic from parts.
    pub fn new(
        id: impl Into<DynamicId>,
        name: impl Into<String>,
        dynamic_type: DynamicType,
        instruction: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dynamic_type,
            instruction: instruction.into(),
            questions,
        }
    }

    /// Number of questions in the pool.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Look up a question by id.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }
}
