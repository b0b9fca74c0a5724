//! The currently selected candidate and its description.
//!
//! Descriptions come from a slow external lookup. Every lookup is issued
//! against a [`LookupTicket`]; a result is only accepted while its ticket is
//! still the current one. Selecting something else, or invalidating the
//! selection, makes any in-flight result harmless when it finally arrives.

/// Message shown when a description could not be retrieved.
pub const UNAVAILABLE: &str =
    "Could not retrieve information for this ingredient. Please try again.";

/// Identifies one outstanding description lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    name: String,
}

impl LookupTicket {
    /// The candidate the lookup is for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The state of the selected candidate's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    /// A lookup is in flight.
    Loading,
    /// The description was retrieved.
    Ready(String),
    /// The lookup failed; nothing is cached.
    Unavailable,
}

/// What the caller needs to do after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The candidate was already selected and its description is cached.
    Cached,
    /// A lookup must be issued for this ticket.
    Lookup(LookupTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Current {
    ticket: LookupTicket,
    detail: Detail,
}

/// Selection state for the candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<Current>,
    generation: u64,
}

impl Selection {
    /// Select a candidate by name.
    ///
    /// Re-selecting the current candidate is a no-op once its description has
    /// been retrieved. Otherwise any previous description is dropped, the
    /// selection enters [`Detail::Loading`] and a fresh ticket is issued.
    pub fn select(&mut self, name: &str) -> SelectOutcome {
        if let Some(current) = &self.current {
            if current.ticket.name == name && matches!(current.detail, Detail::Ready(_)) {
                return SelectOutcome::Cached;
            }
        }

        self.generation += 1;
        let ticket = LookupTicket {
            generation: self.generation,
            name: name.to_string(),
        };
        self.current = Some(Current {
            ticket: ticket.clone(),
            detail: Detail::Loading,
        });
        SelectOutcome::Lookup(ticket)
    }

    /// Record the result of a lookup.
    ///
    /// Returns `false` if the ticket is stale, in which case the result is
    /// discarded and the state is unchanged.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        ticket: &LookupTicket,
        result: Result<String, E>,
    ) -> bool {
        let Some(current) = self.current.as_mut().filter(|c| c.ticket == *ticket) else {
            tracing::debug!("Discarding stale description for {}", ticket.name);
            return false;
        };

        current.detail = match result {
            Ok(text) => Detail::Ready(text),
            Err(e) => {
                tracing::warn!("Failed to fetch description for {}: {e}", ticket.name);
                Detail::Unavailable
            }
        };
        true
    }

    /// The selected candidate, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.ticket.name.as_str())
    }

    /// The description state of the selected candidate, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&Detail> {
        self.current.as_ref().map(|c| &c.detail)
    }

    /// Whether the given ticket is the one the selection is waiting on.
    #[must_use]
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.current.as_ref().is_some_and(|c| c.ticket == *ticket)
    }

    /// Clear the selection unless `is_valid` accepts the selected name.
    ///
    /// Returns `true` if the selection was cleared.
    pub fn retain(&mut self, is_valid: impl Fn(&str) -> bool) -> bool {
        let invalid = self.selected().is_some_and(|name| !is_valid(name));
        if invalid {
            tracing::debug!("Clearing selection of {:?}", self.selected());
            self.clear();
        }
        invalid
    }

    /// Drop the selection and any cached description.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
