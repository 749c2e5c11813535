use serde::{Deserialize, Serialize};

/// Account record stored in redb, keyed by account name
/// Uses Unix timestamp for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Numeric account id, assigned at seed time
    pub id: u64,
    /// Character slots still available to this account.
    /// Decremented on character creation, restored on deletion;
    /// must never go below zero.
    pub slots_remaining: u32,
    /// When the account was created (Unix timestamp)
    pub created_at: i64,
}

/// Account model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    /// Unique human-readable lookup key
    pub name: String,
    #[serde(rename = "slotsRemaining")]
    pub slots_remaining: u32,
}

impl Account {
    /// Build the API model from a stored record and its table key
    pub fn from_record(name: &str, record: &AccountRecord) -> Self {
        Self {
            id: record.id,
            name: name.to_string(),
            slots_remaining: record.slots_remaining,
        }
    }
}
