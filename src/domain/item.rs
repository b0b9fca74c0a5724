use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use uuid::Uuid;

/// A product the user reacted to, together with its parsed ingredients.
///
/// Items are immutable once created. The ingredient list is stored as produced
/// by the parser (normalized, but possibly containing duplicates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionItem {
    id: Uuid,
    name: NonEmptyString,
    raw_text: String,
    ingredients: Vec<String>,
    created: DateTime<Utc>,
}

impl ReactionItem {
    pub(crate) const fn from_parts(
        id: Uuid,
        name: NonEmptyString,
        raw_text: String,
        ingredients: Vec<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            raw_text,
            ingredients,
            created,
        }
    }

    /// The unique, stable identifier of this item.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The display name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The ingredient text exactly as it was entered.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The parsed ingredients, in parser order.
    #[must_use]
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// When the item was added.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// The ordered collection of reaction items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<ReactionItem>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a new item to the end of the store.
    ///
    /// A fresh UUID is generated for the item.
    pub fn add(
        &mut self,
        name: NonEmptyString,
        raw_text: String,
        ingredients: Vec<String>,
    ) -> &ReactionItem {
        let mut id = Uuid::new_v4();
        while self.get(id).is_some() {
            id = Uuid::new_v4();
        }

        let item = ReactionItem::from_parts(id, name, raw_text, ingredients, Utc::now());
        tracing::info!("Added item {} ({})", item.name(), item.id());
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Restore a previously persisted item, keeping its identity.
    ///
    /// Returns `false` (and leaves the store unchanged) if an item with the
    /// same id is already present.
    pub(crate) fn restore(&mut self, item: ReactionItem) -> bool {
        if self.get(item.id()).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with the given id.
    ///
    /// Returns the removed item, or `None` if no item had that id.
    pub fn remove(&mut self, id: Uuid) -> Option<ReactionItem> {
        let position = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(position);
        tracing::info!("Removed item {} ({})", item.name(), item.id());
        Some(item)
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&ReactionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The items in insertion order.
    #[must_use]
    pub fn list(&self) -> &[ReactionItem] {
        &self.items
    }

    /// The number of items in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve a (possibly abbreviated) id into the id of a stored item.
    ///
    /// # Errors
    ///
    /// Returns an error if no item id starts with `prefix`, or if more than
    /// one does.
    pub fn resolve(&self, prefix: &str) -> Result<Uuid, ResolveError> {
        resolve_prefix(self.items.iter().map(ReactionItem::id), prefix)
    }
}

/// Errors that can occur when resolving an abbreviated id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No record id starts with the given prefix.
    #[error("no record matches '{0}'")]
    NotFound(String),
    /// More than one record id starts with the given prefix.
    #[error("'{prefix}' is ambiguous ({matches} records match)")]
    Ambiguous {
        /// The prefix that was looked up.
        prefix: String,
        /// How many ids matched.
        matches: usize,
    },
}

pub(crate) fn resolve_prefix(
    ids: impl IntoIterator<Item = Uuid>,
    prefix: &str,
) -> Result<Uuid, ResolveError> {
    let needle = prefix.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ResolveError::NotFound(prefix.to_string()));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(ResolveError::NotFound(prefix.to_string())),
        [id] => Ok(*id),
        _ => Err(ResolveError::Ambiguous {
            prefix: prefix.to_string(),
            matches: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    #[test]
    fn add_appends_in_order_with_unique_ids() {
        let mut store = ItemStore::new();
        let a = store.add(name("A"), "soy".into(), vec!["soy".into()]).id();
        let b = store.add(name("B"), "salt".into(), vec!["salt".into()]).id();

        assert_ne!(a, b);
        let names: Vec<_> = store.list().iter().map(ReactionItem::name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let mut store = ItemStore::new();
        store.add(name("A"), String::new(), Vec::new());

        assert!(store.remove(Uuid::new_v4()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut store = ItemStore::new();
        store.add(name("A"), String::new(), Vec::new());
        let b = store.add(name("B"), String::new(), Vec::new()).id();
        store.add(name("C"), String::new(), Vec::new());

        let removed = store.remove(b).unwrap();
        assert_eq!(removed.name(), "B");
        let names: Vec<_> = store.list().iter().map(ReactionItem::name).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn restore_rejects_duplicate_ids() {
        let mut store = ItemStore::new();
        let item = store.add(name("A"), String::new(), Vec::new()).clone();

        assert!(!store.restore(item));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn resolve_by_prefix() {
        let a = Uuid::parse_str("aaaaaaaa-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("aaaabbbb-0000-4000-8000-000000000000").unwrap();
        let c = Uuid::parse_str("cccccccc-0000-4000-8000-000000000000").unwrap();
        let ids = [a, b, c];

        assert_eq!(resolve_prefix(ids, "CCC"), Ok(c));
        assert_eq!(resolve_prefix(ids, "aaaab"), Ok(b));
        assert_eq!(
            resolve_prefix(ids, "aaaa"),
            Err(ResolveError::Ambiguous {
                prefix: "aaaa".to_string(),
                matches: 2
            })
        );
        assert_eq!(
            resolve_prefix(ids, "ffff"),
            Err(ResolveError::NotFound("ffff".to_string()))
        );
        assert_eq!(
            resolve_prefix(ids, " "),
            Err(ResolveError::NotFound(" ".to_string()))
        );
    }
}
