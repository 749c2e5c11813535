use serde::{Deserialize, Serialize};

/// Character record stored in redb, keyed by character id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub role: String,
    pub level: i32,
    /// When the character was created (Unix timestamp)
    pub created_at: i64,
}

/// Character model for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub level: i32,
}

impl Character {
    /// Build the API model from a stored record and its table key
    pub fn from_record(id: u64, record: &CharacterRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            role: record.role.clone(),
            level: record.level,
        }
    }

    /// Validate a character name: must be non-empty after trimming.
    /// Role and level are opaque and accepted as-is.
    pub fn validate_name(name: &str) -> bool {
        !name.trim().is_empty()
    }
}

/// Caller-supplied character fields, used for both create and update.
/// The id is never accepted from the caller; it is assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub role: String,
    pub level: i32,
}
