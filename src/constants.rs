/// Default number of character slots granted to the seed account
/// when it is created for the first time. Overridable via the
/// `CHARACTER_SLOTS` environment variable.
pub const DEFAULT_CHARACTER_SLOTS: u32 = 8;

/// Name of the account seeded at startup when `SEED_ACCOUNT` is unset
pub const DEFAULT_SEED_ACCOUNT: &str = "admin";

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for a missing character name on create
pub const ERR_EMPTY_NAME: &str = "Character name must not be empty";
