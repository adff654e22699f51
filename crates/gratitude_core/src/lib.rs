pub mod backend;
pub mod calendar;
pub mod date_key;
pub mod entry;
pub mod error;
pub mod notifications;
pub mod profile;
pub mod progress;
pub mod prompt;
pub mod service;
pub mod store;
pub mod streak;

pub use crate::date_key::DateKey;
pub use crate::error::JournalError;
pub use crate::service::{JournalService, JournalServiceBuilder};
pub use crate::store::{JournalStore, JournalStoreBuilder};
