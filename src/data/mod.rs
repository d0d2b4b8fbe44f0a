pub mod fighter;
pub mod store;

pub use fighter::{fighter_from_value, fighters_from_value, safe_num, Fighter, Stat};
pub use store::{FighterStore, JsonFileStore, MemoryStore, DEFAULT_STORE_DIR, FIGHTERS_KEY};
