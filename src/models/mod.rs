pub mod account;
pub mod character;

pub use account::{Account, AccountRecord};
pub use character::{Character, CharacterDraft, CharacterRecord};
