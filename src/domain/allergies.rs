use std::collections::BTreeSet;

use crate::domain::ingredient::normalize;

/// Ingredients the user already knows they react to.
///
/// Names are normalized on the way in, so membership tests are
/// case-insensitive. Iteration is in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownAllergies {
    names: BTreeSet<String>,
}

impl KnownAllergies {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Add an allergy.
    ///
    /// Returns `true` if the normalized name was inserted, or `false` if it was
    /// already present or blank.
    pub fn add(&mut self, name: &str) -> bool {
        let name = normalize(name);
        if name.is_empty() {
            return false;
        }
        self.names.insert(name)
    }

    /// Remove an allergy.
    ///
    /// Returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(&normalize(name))
    }

    /// Whether the (normalized) name is a known allergy.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize(name))
    }

    /// The known allergies in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The number of known allergies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no allergies are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownAllergies {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut allergies = Self::new();
        for name in iter {
            allergies.add(name.as_ref());
        }
        allergies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_normalizes_and_deduplicates() {
        let mut allergies = KnownAllergies::new();
        assert!(allergies.add("Peanuts"));
        assert!(!allergies.add("  PEANUTS "));
        assert_eq!(allergies.len(), 1);
        assert!(allergies.contains("peanuts"));
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut allergies = KnownAllergies::new();
        assert!(!allergies.add("   "));
        assert!(allergies.is_empty());
    }

    #[test]
    fn iteration_is_sorted() {
        let allergies: KnownAllergies = ["wheat", "Milk", "egg"].into_iter().collect();
        let names: Vec<_> = allergies.iter().collect();
        assert_eq!(names, ["egg", "milk", "wheat"]);
    }

    #[test]
    fn remove_missing_is_a_no_op() {
        let mut allergies: KnownAllergies = ["soy"].into_iter().collect();
        assert!(!allergies.remove("milk"));
        assert!(allergies.remove("SOY"));
        assert!(allergies.is_empty());
    }
}
