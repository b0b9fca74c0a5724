//! A [`Session`] owns the user's reaction items and known allergies, and keeps
//! the ranked candidate list in step with them.
//!
//! Every mutation reruns the analysis before returning, so
//! [`Session::candidates`] is never stale, and a selection whose candidate has
//! disappeared is cleared in the same step.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use non_empty_string::NonEmptyString;
use uuid::Uuid;

use crate::{
    domain::{
        AllergenCandidate, Detail, ItemStore, KnownAllergies, LookupTicket, ReactionItem,
        SelectOutcome, Selection, analyze,
        ingredient::{normalize, normalize_all, split_fallback},
    },
    services::{IngredientDescriber, IngredientParser, ServiceError},
};

/// Errors returned by [`Session`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// An item submission is already waiting on the ingredient parser.
    #[error("another item is still being submitted")]
    Busy,
    /// Items must have a name.
    #[error("item name must not be empty")]
    EmptyName,
    /// Only names in the current candidate list can be selected.
    #[error("'{0}' is not a current candidate")]
    UnknownCandidate(String),
}

/// An item submission waiting for its ingredient list to be parsed.
///
/// Obtained from [`Session::begin_submission`] and consumed by
/// [`Session::finish_submission`] or [`Session::abandon_submission`]. The
/// session is busy for as long as the submission exists; dropping it, for
/// example when a pending parse is cancelled, abandons it.
#[derive(Debug)]
#[must_use = "dropping a submission abandons it"]
pub struct Submission {
    name: NonEmptyString,
    raw_text: String,
    _pending: Arc<()>,
}

impl Submission {
    /// The raw ingredient text to be parsed.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// The user's reaction items, known allergies and the derived candidates.
#[derive(Debug, Clone, Default)]
pub struct Session {
    items: ItemStore,
    allergies: KnownAllergies,
    candidates: Vec<AllergenCandidate>,
    selection: Selection,
    pending: Weak<()>,
}

impl Session {
    /// Create a session from previously stored items and allergies.
    #[must_use]
    pub fn new(items: ItemStore, allergies: KnownAllergies) -> Self {
        let mut session = Self {
            items,
            allergies,
            ..Self::default()
        };
        session.recompute();
        session
    }

    /// The reaction items, in the order they were added.
    #[must_use]
    pub const fn items(&self) -> &ItemStore {
        &self.items
    }

    /// The known allergies.
    #[must_use]
    pub const fn known_allergies(&self) -> &KnownAllergies {
        &self.allergies
    }

    /// The ranked potential allergens.
    #[must_use]
    pub fn candidates(&self) -> &[AllergenCandidate] {
        &self.candidates
    }

    /// Look up a current candidate by name, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn candidate(&self, name: &str) -> Option<&AllergenCandidate> {
        let name = normalize(name);
        self.candidates.iter().find(|c| c.name == name)
    }

    /// The selected candidate and its description state.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether an item submission is waiting on the parser.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.strong_count() > 0
    }

    /// Start submitting an item.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] if another submission is in progress, or
    /// [`SessionError::EmptyName`] if the name is blank.
    pub fn begin_submission(
        &mut self,
        name: &str,
        raw_text: &str,
    ) -> Result<Submission, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let name = NonEmptyString::new(name.trim().to_string())
            .map_err(|_| SessionError::EmptyName)?;

        let pending = Arc::new(());
        self.pending = Arc::downgrade(&pending);
        Ok(Submission {
            name,
            raw_text: raw_text.to_string(),
            _pending: pending,
        })
    }

    /// Complete a submission with the parser's result.
    ///
    /// If the parser failed, or found nothing in non-blank text, the raw text
    /// is split on commas instead.
    pub fn finish_submission(
        &mut self,
        submission: Submission,
        parsed: Result<Vec<String>, ServiceError>,
    ) -> &ReactionItem {
        let Submission { name, raw_text, .. } = submission;

        let ingredients = match parsed.map(normalize_all) {
            Ok(ingredients) if !ingredients.is_empty() || raw_text.trim().is_empty() => {
                ingredients
            }
            Ok(_) => {
                tracing::warn!("Parser found no ingredients in '{raw_text}', splitting on commas");
                split_fallback(&raw_text)
            }
            Err(e) => {
                tracing::warn!("Failed to parse ingredients ({e}), splitting on commas");
                split_fallback(&raw_text)
            }
        };

        self.items.add(name, raw_text, ingredients);
        self.recompute();
        &self.items.list()[self.items.len() - 1]
    }

    /// Give up on a submission without adding anything.
    ///
    /// Equivalent to dropping it.
    pub fn abandon_submission(&mut self, submission: Submission) {
        tracing::debug!("Abandoned submission of {}", submission.name);
        self.pending = Weak::new();
    }

    /// Parse the ingredient text and add the item.
    ///
    /// # Errors
    ///
    /// Returns an error if another submission is in progress or the name is
    /// blank. Parser failures are not errors; see
    /// [`Session::finish_submission`].
    pub async fn add_item<P: IngredientParser>(
        &mut self,
        name: &str,
        raw_text: &str,
        parser: &P,
    ) -> Result<&ReactionItem, SessionError> {
        let submission = self.begin_submission(name, raw_text)?;
        let parsed = parser.parse(submission.raw_text()).await;
        Ok(self.finish_submission(submission, parsed))
    }

    /// Remove an item by id.
    ///
    /// Removing an unknown id is a no-op.
    pub fn remove_item(&mut self, id: Uuid) -> Option<ReactionItem> {
        let removed = self.items.remove(id);
        if removed.is_some() {
            self.recompute();
        }
        removed
    }

    /// Record a known allergy.
    ///
    /// Returns `true` if it was not already known.
    pub fn add_allergy(&mut self, name: &str) -> bool {
        let added = self.allergies.add(name);
        if added {
            self.recompute();
        }
        added
    }

    /// Forget a known allergy.
    ///
    /// Returns `true` if it was known.
    pub fn remove_allergy(&mut self, name: &str) -> bool {
        let removed = self.allergies.remove(name);
        if removed {
            self.recompute();
        }
        removed
    }

    /// Select a candidate. The name is normalized like an ingredient.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCandidate`] if `name` is not in the
    /// current candidate list.
    pub fn select(&mut self, name: &str) -> Result<SelectOutcome, SessionError> {
        let Some(candidate) = self.candidate(name) else {
            return Err(SessionError::UnknownCandidate(name.to_string()));
        };
        let name = candidate.name.clone();
        Ok(self.selection.select(&name))
    }

    /// Record the result of a description lookup.
    ///
    /// Returns `false` if the lookup was for a selection that is no longer
    /// current; the result is then ignored.
    pub fn complete_lookup<E: fmt::Display>(
        &mut self,
        ticket: &LookupTicket,
        result: Result<String, E>,
    ) -> bool {
        self.selection.complete(ticket, result)
    }

    /// Select a candidate and fetch its description if it is not cached.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCandidate`] if `name` is not in the
    /// current candidate list. Lookup failures are not errors; they leave the
    /// selection in [`Detail::Unavailable`].
    pub async fn select_and_describe<D: IngredientDescriber>(
        &mut self,
        name: &str,
        describer: &D,
    ) -> Result<&Detail, SessionError> {
        if let SelectOutcome::Lookup(ticket) = self.select(name)? {
            let result = describer.describe(ticket.name()).await;
            self.complete_lookup(&ticket, result);
        }
        self.selection
            .detail()
            .ok_or_else(|| SessionError::UnknownCandidate(name.to_string()))
    }

    /// Consume the session, returning its items and allergies.
    #[must_use]
    pub fn into_parts(self) -> (ItemStore, KnownAllergies) {
        (self.items, self.allergies)
    }

    fn recompute(&mut self) {
        self.candidates = analyze(self.items.list(), &self.allergies);
        let candidates = &self.candidates;
        self.selection
            .retain(|name| candidates.iter().any(|c| c.name == name));
    }
}
