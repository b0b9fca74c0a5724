//! Allergen detective
//!
//! Records the products a user reacted to, and surfaces the ingredients that
//! keep turning up across them.

pub mod domain;
pub use domain::{
    AllergenCandidate, Config, ItemStore, KnownAllergies, LogBook, LogEntry, ReactionItem,
    analyze,
};

/// External collaborators: ingredient parsing, descriptions and barcodes.
pub mod services;

/// Orchestration of the item store, known allergies and candidate selection.
pub mod session;
pub use session::{Session, SessionError};

/// Filesystem storage of the user's records.
pub mod storage;
pub use storage::Store;
