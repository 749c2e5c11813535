pub mod accounts;
pub mod characters;
pub mod health;

pub use accounts::list_accounts;
pub use characters::{
    create_character, delete_character, get_character, list_characters, update_character,
};
pub use health::health_check;
