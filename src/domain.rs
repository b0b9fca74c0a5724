//! Domain models for allergen detection.
//!
//! This module contains the reaction items and the known-allergy set, the
//! co-occurrence analyzer that ranks candidate allergens, and the selection
//! state used when looking up a candidate's description.

/// Co-occurrence analysis of ingredients across reaction items.
pub mod analysis;
pub use analysis::{AllergenCandidate, analyze};

mod allergies;
pub use allergies::KnownAllergies;

mod config;
pub use config::{Config, ConfigError};

/// Ingredient normalization and fallback parsing.
pub mod ingredient;

mod item;
pub use item::{ItemStore, ReactionItem, ResolveError};

mod log_entry;
pub use log_entry::{LogBook, LogEntry};

/// Candidate selection and detail lookup fencing.
pub mod selection;
pub use selection::{Detail, LookupTicket, SelectOutcome, Selection};
