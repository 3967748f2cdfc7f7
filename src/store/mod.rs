//! Persistence of rule-set configuration in a WordPress-style option store.

mod config;
mod error;
mod memory;
mod php;
mod ruleset_store;
mod value;

pub use config::{StoreConfig, DEFAULT_OPTION_PREFIX};
pub use error::{DecodeError, StoreError};
pub use memory::MemoryOptionStore;
pub use ruleset_store::{dedupe_priorities, fields, OptionStore, RulesetStore};
pub use value::{OptionKey, OptionValue};
