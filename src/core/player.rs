//! Player identity types.
//!
//! The roster is owned by the caller: the engine reads a snapshot of it on
//! each selection call and never mutates player identity, only internal
//! ledgers keyed by [`PlayerId`].

use serde::{Deserialize, Serialize};

/// Stable player identifier, assigned by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Player gender, used by targeting eligibility rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    /// Forms its own pairing bucket for same-gender dynamics.
    Other,
}

/// Player orientation. Carried for content personalization; the targeting
/// rules in this crate do not branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Straight,
    Gay,
    Bisexual,
    Other,
}

/// A participant in the session.
///
/// Identity fields are caller-owned; the engine treats them as read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier, unique within the roster.
    pub id: PlayerId,

    /// Display name, substituted into question placeholders.
    pub name: String,

    /// Gender, consulted by eligibility filters.
    pub gender: Gender,

    /// Orientation (content metadata).
    pub orientation: Orientation,

    /// Whether this player created the session.
    pub is_host: bool,
}

impl Player {
    /// Create a player with the given id, name, and gender.
    ///
    /// Defaults: `orientation = Other`, `is_host = false`.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender,
            orientation: Orientation::Other,
            is_host: false,
        }
    }

    /// Mark this player as the session host (builder pattern).
    #[must_use]
    pub fn host(mut self) -> Self {
        self.is_host = true;
        self
    }

    /// Set the orientation (builder pattern).
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}
