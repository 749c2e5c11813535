use redb::TableDefinition;

/// Accounts table: account name -> AccountRecord (serialized)
/// The name is the quota-owner lookup key; numeric ids live inside the record.
pub const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Characters table: character id -> CharacterRecord (serialized)
/// Ids are assigned on insert as last key + 1 within the write transaction.
pub const CHARACTERS: TableDefinition<u64, &[u8]> = TableDefinition::new("characters");
