pub mod repository;
pub mod tables;

use chrono::Utc;
use redb::{Database, Error as RedbError, ReadableTable};
use std::path::Path;
use std::sync::Arc;

use crate::models::AccountRecord;

pub use repository::RosterRepository;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode configuration shared by everything that touches stored records
pub(crate) const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                RedbError::Io(e)
            })?;
        }
    }

    let db = Database::create(path)?;

    // Initialize tables on first run
    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::ACCOUNTS)?;
        let _ = write_txn.open_table(tables::CHARACTERS)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}

/// Seed an account with the given number of character slots.
///
/// Accounts are created out-of-band rather than through the API; this runs at
/// startup and is a no-op if the account already exists, so restarting the
/// server never resets a live quota.
#[allow(clippy::result_large_err)]
pub fn seed_account(db: &Db, name: &str, slots: u32) -> crate::error::Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mut accounts = write_txn.open_table(tables::ACCOUNTS)?;

        if accounts.get(name)?.is_none() {
            let id = accounts.iter()?.count() as u64 + 1;
            let record = AccountRecord {
                id,
                slots_remaining: slots,
                created_at: Utc::now().timestamp(),
            };
            let bytes = bincode::serde::encode_to_vec(&record, BINCODE_CONFIG)?;
            accounts.insert(name, bytes.as_slice())?;
            tracing::info!("Seeded account '{}' with {} character slots", name, slots);
        }
    }
    write_txn.commit()?;

    Ok(())
}
