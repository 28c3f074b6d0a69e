// crates/trodl-core/src/identity.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StakingError;

/// Maximum length of a participant identifier, in bytes.
pub const MAX_ID_LEN: usize = 64;

/// Identity of a party interacting with the pool.
///
/// Used for stakers, reward consumers, and role administrators alike. The
/// ledger treats identities as opaque: it never derives anything from them
/// beyond equality and ordering. Identifiers are validated on construction
/// (non-empty, at most `MAX_ID_LEN` bytes, ASCII alphanumerics plus `-`, `_`,
/// `.` and `:`), so every `ParticipantId` in the system is well formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    /// Returns `StakingError::InvalidIdentifier` for empty, oversized, or
    /// non-conforming input.
    pub fn new(raw: impl Into<String>) -> Result<Self, StakingError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(StakingError::InvalidIdentifier("empty identifier".to_string()));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(StakingError::InvalidIdentifier(format!(
                "identifier is {} bytes, maximum is {}",
                raw.len(),
                MAX_ID_LEN
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')))
        {
            return Err(StakingError::InvalidIdentifier(format!(
                "identifier {:?} contains invalid character {:?}",
                raw, bad
            )));
        }
        Ok(Self(raw))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = StakingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ParticipantId {
    type Error = StakingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}
