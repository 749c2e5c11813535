use std::time::Instant;

use chrono::Utc;
use redb::ReadableTable;

use crate::constants::ERR_EMPTY_NAME;
use crate::db::{tables, Db, BINCODE_CONFIG};
use crate::error::{AppError, Result};
use crate::models::{Account, AccountRecord, Character, CharacterDraft, CharacterRecord};

/// High-level data access over the `accounts` and `characters` tables.
///
/// Holds a shared handle to a store it does not open or close. Every write
/// runs inside one exclusive write transaction: an uncommitted transaction
/// rolls back when dropped, so no failure path leaves a partial update
/// behind, and concurrent creators serialize on the writer lock instead of
/// racing the quota check. The `*_with_deadline` variants bound a write by a
/// caller-supplied deadline: once it passes, the in-flight transaction is
/// dropped uncommitted (rolled back) and `DeadlineExceeded` returned, so a
/// caller whose deadline fires never has a write committed behind its back.
/// Dropping a returned future before completion likewise cannot produce a
/// partial commit.
///
/// The per-account invariant maintained by `create_character` and
/// `delete_character`: slots_remaining + number of owned characters stays
/// constant across every committed transaction.
#[derive(Clone)]
pub struct RosterRepository {
    db: Db,
}

fn decode_account(bytes: &[u8]) -> Result<AccountRecord> {
    let (record, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(record)
}

fn decode_character(bytes: &[u8]) -> Result<CharacterRecord> {
    let (record, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(record)
}

fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(AppError::DeadlineExceeded),
        _ => Ok(()),
    }
}

impl RosterRepository {
    /// Create a repository over an already-open database handle
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a character owned by the named account and return its assigned id.
    ///
    /// Inside one write transaction: the owning account is read, the quota is
    /// checked, then the character table is scanned for a name collision. The
    /// quota check runs first, so an exhausted account is reported as
    /// `QuotaExceeded` even when the name is also taken. Name uniqueness is
    /// enforced here as a business rule; the store keeps no unique index.
    ///
    /// Fails with `AccountNotFound`, `QuotaExceeded` or `DuplicateName`; on
    /// any failure the transaction is rolled back and no row is written.
    pub async fn create_character(
        &self,
        account_name: &str,
        draft: CharacterDraft,
    ) -> Result<u64> {
        self.create_character_with_deadline(account_name, draft, None)
            .await
    }

    /// Like [`Self::create_character`], bounded by a caller-supplied deadline.
    ///
    /// The deadline is checked once the writer lock has been acquired and
    /// again just before commit. When it has passed, the transaction is
    /// dropped uncommitted and `DeadlineExceeded` returned: the rollback is
    /// guaranteed and no partial write is observable.
    pub async fn create_character_with_deadline(
        &self,
        account_name: &str,
        draft: CharacterDraft,
        deadline: Option<Instant>,
    ) -> Result<u64> {
        if !Character::validate_name(&draft.name) {
            return Err(AppError::InvalidInput(ERR_EMPTY_NAME.to_string()));
        }

        let db = self.db.clone();
        let account_name = account_name.to_string();

        let id = tokio::task::spawn_blocking(move || -> Result<u64> {
            let write_txn = db.begin_write()?;
            check_deadline(deadline)?;
            let assigned_id;
            {
                let mut accounts = write_txn.open_table(tables::ACCOUNTS)?;
                let mut account = match accounts.get(account_name.as_str())? {
                    Some(bytes) => decode_account(bytes.value())?,
                    None => {
                        tracing::warn!("Character creation for unknown account '{}'", account_name);
                        return Err(AppError::AccountNotFound);
                    }
                };

                // Quota before the duplicate check: an exhausted account wins
                // when both would apply. The counter is re-read inside every
                // transaction; nothing is cached across calls.
                if account.slots_remaining == 0 {
                    tracing::info!(
                        "Character creation refused for '{}': no slots remaining",
                        account_name
                    );
                    return Err(AppError::QuotaExceeded);
                }

                let mut characters = write_txn.open_table(tables::CHARACTERS)?;
                for entry in characters.iter()? {
                    let (_, value) = entry?;
                    if decode_character(value.value())?.name == draft.name {
                        tracing::info!("Duplicate character name '{}' refused", draft.name);
                        return Err(AppError::DuplicateName);
                    }
                }

                let next_id = match characters.iter()?.next_back() {
                    Some(entry) => entry?.0.value() + 1,
                    None => 1,
                };

                let record = CharacterRecord {
                    name: draft.name,
                    role: draft.role,
                    level: draft.level,
                    created_at: Utc::now().timestamp(),
                };
                let bytes = bincode::serde::encode_to_vec(&record, BINCODE_CONFIG)?;
                characters.insert(next_id, bytes.as_slice())?;

                account.slots_remaining -= 1;
                let bytes = bincode::serde::encode_to_vec(&account, BINCODE_CONFIG)?;
                accounts.insert(account_name.as_str(), bytes.as_slice())?;

                assigned_id = next_id;
            }
            check_deadline(deadline)?;
            write_txn.commit()?;

            Ok(assigned_id)
        })
        .await??;

        tracing::info!("Character {} created", id);
        Ok(id)
    }

    /// Delete a character by id, restoring one slot to the owning account.
    ///
    /// Returns the number of rows removed (0 or 1). Deleting a non-existent
    /// id is not an error: the transaction still commits and returns 0. A
    /// missing account row is tolerated and the slot restore skipped, so
    /// deletion stays possible even if account bookkeeping is inconsistent.
    pub async fn delete_character(&self, account_name: &str, id: u64) -> Result<u64> {
        self.delete_character_with_deadline(account_name, id, None)
            .await
    }

    /// Like [`Self::delete_character`], bounded by a caller-supplied deadline.
    ///
    /// Checked at the same points as the create path; a timed-out delete
    /// rolls back and neither the character row nor the slot count changes.
    pub async fn delete_character_with_deadline(
        &self,
        account_name: &str,
        id: u64,
        deadline: Option<Instant>,
    ) -> Result<u64> {
        let db = self.db.clone();
        let account_name = account_name.to_string();

        tokio::task::spawn_blocking(move || -> Result<u64> {
            let write_txn = db.begin_write()?;
            check_deadline(deadline)?;
            let removed;
            {
                let mut accounts = write_txn.open_table(tables::ACCOUNTS)?;
                let account = match accounts.get(account_name.as_str())? {
                    Some(bytes) => Some(decode_account(bytes.value())?),
                    None => None,
                };

                let mut characters = write_txn.open_table(tables::CHARACTERS)?;
                removed = characters.remove(id)?.is_some();

                // Only a real deletion restores a slot
                if removed {
                    if let Some(mut account) = account {
                        account.slots_remaining += 1;
                        let bytes = bincode::serde::encode_to_vec(&account, BINCODE_CONFIG)?;
                        accounts.insert(account_name.as_str(), bytes.as_slice())?;
                    }
                }
            }
            check_deadline(deadline)?;
            write_txn.commit()?;

            if removed {
                tracing::info!("Character {} deleted", id);
            }
            Ok(if removed { 1 } else { 0 })
        })
        .await?
    }

    /// Replace a character's name, role and level by id.
    ///
    /// Never touches the account quota. Returns the number of rows affected;
    /// 0 (not an error) when no row matches the id.
    pub async fn update_character(&self, id: u64, draft: CharacterDraft) -> Result<u64> {
        if !Character::validate_name(&draft.name) {
            return Err(AppError::InvalidInput(ERR_EMPTY_NAME.to_string()));
        }

        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<u64> {
            let write_txn = db.begin_write()?;
            let affected;
            {
                let mut characters = write_txn.open_table(tables::CHARACTERS)?;
                let existing = match characters.get(id)? {
                    Some(bytes) => Some(decode_character(bytes.value())?),
                    None => None,
                };

                match existing {
                    Some(record) => {
                        let updated = CharacterRecord {
                            name: draft.name,
                            role: draft.role,
                            level: draft.level,
                            created_at: record.created_at,
                        };
                        let bytes = bincode::serde::encode_to_vec(&updated, BINCODE_CONFIG)?;
                        characters.insert(id, bytes.as_slice())?;
                        affected = 1;
                    }
                    None => affected = 0,
                }
            }
            write_txn.commit()?;

            Ok(affected)
        })
        .await?
    }

    /// Fetch a single character by id; `CharacterNotFound` when absent
    pub async fn character_by_id(&self, id: u64) -> Result<Character> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Character> {
            let read_txn = db.begin_read()?;
            let characters = read_txn.open_table(tables::CHARACTERS)?;

            let bytes = characters.get(id)?.ok_or(AppError::CharacterNotFound)?;
            let record = decode_character(bytes.value())?;

            Ok(Character::from_record(id, &record))
        })
        .await?
    }

    /// Fetch all characters with the given role (exact match)
    pub async fn characters_by_role(&self, role: &str) -> Result<Vec<Character>> {
        let db = self.db.clone();
        let role = role.to_string();

        tokio::task::spawn_blocking(move || -> Result<Vec<Character>> {
            let read_txn = db.begin_read()?;
            let characters = read_txn.open_table(tables::CHARACTERS)?;

            let mut found = Vec::new();
            for entry in characters.iter()? {
                let (key, value) = entry?;
                let record = decode_character(value.value())?;
                if record.role == role {
                    found.push(Character::from_record(key.value(), &record));
                }
            }

            Ok(found)
        })
        .await?
    }

    /// Fetch all characters, ordered by id
    pub async fn all_characters(&self) -> Result<Vec<Character>> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Character>> {
            let read_txn = db.begin_read()?;
            let characters = read_txn.open_table(tables::CHARACTERS)?;

            let mut found = Vec::new();
            for entry in characters.iter()? {
                let (key, value) = entry?;
                let record = decode_character(value.value())?;
                found.push(Character::from_record(key.value(), &record));
            }

            Ok(found)
        })
        .await?
    }

    /// Fetch a single account by name; `AccountNotFound` when absent
    pub async fn account_by_name(&self, name: &str) -> Result<Account> {
        let db = self.db.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || -> Result<Account> {
            let read_txn = db.begin_read()?;
            let accounts = read_txn.open_table(tables::ACCOUNTS)?;

            let bytes = accounts.get(name.as_str())?.ok_or(AppError::AccountNotFound)?;
            let record = decode_account(bytes.value())?;

            Ok(Account::from_record(&name, &record))
        })
        .await?
    }

    /// Fetch all accounts with their remaining slot counts
    pub async fn all_accounts(&self) -> Result<Vec<Account>> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Account>> {
            let read_txn = db.begin_read()?;
            let accounts = read_txn.open_table(tables::ACCOUNTS)?;

            let mut found = Vec::new();
            for entry in accounts.iter()? {
                let (key, value) = entry?;
                let record = decode_account(value.value())?;
                found.push(Account::from_record(key.value(), &record));
            }

            Ok(found)
        })
        .await?
    }
}
