//! Co-occurrence analysis
//!
//! Every ingredient that shows up in two or more distinct reaction items is a
//! potential allergen. [`analyze`] counts, for each normalized ingredient, how
//! many items contain it and which ones, drops anything already known to be an
//! allergy, and ranks what remains.
//!
//! The analysis is a pure function of its inputs. It keeps no state between
//! calls, so callers rerun it whenever the items or the known allergies change.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use serde::Serialize;

use crate::domain::{KnownAllergies, ReactionItem, ingredient::normalize};

/// An ingredient that recurs across several reaction items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllergenCandidate {
    /// The normalized ingredient name.
    pub name: String,
    /// How many distinct items contain the ingredient.
    pub count: usize,
    /// Display names of the contributing items, in store order.
    ///
    /// Two distinct items that share a display name are both listed.
    pub contributing_items: Vec<String>,
}

impl AllergenCandidate {
    /// Ranking order: most frequent first, then alphabetical.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.name.cmp(&other.name))
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    items: Vec<String>,
}

/// Rank the ingredients shared by two or more items.
///
/// Each item contributes at most once per ingredient, however many times the
/// ingredient appears in its list. Known allergies are excluded. The result is
/// sorted by count (descending) and then by name (ascending), so equal inputs
/// always produce equal output.
pub fn analyze<'a, I>(items: I, known_allergies: &KnownAllergies) -> Vec<AllergenCandidate>
where
    I: IntoIterator<Item = &'a ReactionItem>,
{
    let mut accumulators: HashMap<String, Accumulator> = HashMap::new();

    for item in items {
        let mut seen = HashSet::new();
        for ingredient in item.ingredients() {
            let ingredient = normalize(ingredient);
            if ingredient.is_empty() || !seen.insert(ingredient.clone()) {
                continue;
            }
            let entry = accumulators.entry(ingredient).or_default();
            entry.count += 1;
            entry.items.push(item.name().to_string());
        }
    }

    let mut candidates: Vec<AllergenCandidate> = accumulators
        .into_iter()
        .filter(|(name, acc)| acc.count > 1 && !known_allergies.contains(name))
        .map(|(name, acc)| AllergenCandidate {
            name,
            count: acc.count,
            contributing_items: acc.items,
        })
        .collect();

    candidates.sort_by(AllergenCandidate::rank);
    tracing::debug!("Analysis produced {} candidates", candidates.len());
    candidates
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use non_empty_string::NonEmptyString;
    use test_case::test_case;
    use uuid::Uuid;

    use super::*;

    fn item(name: &str, ingredients: &[&str]) -> ReactionItem {
        ReactionItem::from_parts(
            Uuid::new_v4(),
            NonEmptyString::new(name.to_string()).unwrap(),
            ingredients.join(", "),
            ingredients.iter().map(ToString::to_string).collect(),
            Utc::now(),
        )
    }

    fn candidate(name: &str, items: &[&str]) -> AllergenCandidate {
        AllergenCandidate {
            name: name.to_string(),
            count: items.len(),
            contributing_items: items.iter().map(ToString::to_string).collect(),
        }
    }

    fn sample() -> Vec<ReactionItem> {
        vec![
            item("Crackers", &["wheat", "salt", "soy lecithin", "sugar"]),
            item("Noodles", &["Wheat", "egg", "salt"]),
            item("Chocolate", &["sugar", "milk", "soy lecithin"]),
            item("Bread", &["wheat", "yeast", "salt", "sugar"]),
            item("Custard", &["milk", "egg", "sugar"]),
        ]
    }

    #[test]
    fn shared_ingredient_is_surfaced() {
        let items = [item("A", &["soy", "salt"]), item("B", &["soy", "pepper"])];

        let candidates = analyze(&items, &KnownAllergies::new());

        assert_eq!(candidates, [candidate("soy", &["A", "B"])]);
    }

    #[test]
    fn known_allergy_is_excluded() {
        let items = [item("A", &["soy", "salt"]), item("B", &["soy", "pepper"])];
        let known: KnownAllergies = ["soy"].into_iter().collect();

        assert!(analyze(&items, &known).is_empty());
    }

    #[test]
    fn known_allergy_exclusion_ignores_case() {
        let items = [item("A", &["Soy"]), item("B", &["SOY"])];
        let known: KnownAllergies = ["  sOy"].into_iter().collect();

        assert!(analyze(&items, &known).is_empty());
    }

    #[test]
    fn empty_and_single_item_stores_have_no_candidates() {
        let known = KnownAllergies::new();
        assert!(analyze(std::iter::empty(), &known).is_empty());
        assert!(analyze(&[item("A", &["soy", "soy", "salt"])], &known).is_empty());
    }

    #[test]
    fn duplicates_within_an_item_count_once() {
        let items = [
            item("A", &["soy", "soy", "SOY "]),
            item("B", &["salt"]),
            item("C", &["salt", "pepper"]),
        ];

        let candidates = analyze(&items, &KnownAllergies::new());

        assert_eq!(candidates, [candidate("salt", &["B", "C"])]);
    }

    #[test]
    fn items_sharing_a_display_name_are_listed_twice() {
        let items = [item("Snack", &["soy"]), item("Snack", &["soy"])];

        let candidates = analyze(&items, &KnownAllergies::new());

        assert_eq!(candidates, [candidate("soy", &["Snack", "Snack"])]);
    }

    #[test]
    fn ranking_is_by_count_then_name() {
        let candidates = analyze(&sample(), &KnownAllergies::new());

        let ranked: Vec<_> = candidates
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(
            ranked,
            [
                ("sugar", 4),
                ("salt", 3),
                ("wheat", 3),
                ("egg", 2),
                ("milk", 2),
                ("soy lecithin", 2),
            ]
        );
    }

    #[test]
    fn contributing_items_follow_store_order() {
        let candidates = analyze(&sample(), &KnownAllergies::new());

        let sugar = candidates.iter().find(|c| c.name == "sugar").unwrap();
        assert_eq!(
            sugar.contributing_items,
            ["Crackers", "Chocolate", "Bread", "Custard"]
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        let items = sample();
        let known: KnownAllergies = ["milk"].into_iter().collect();

        let first = analyze(&items, &known);
        let second = analyze(&items, &known);

        assert_eq!(first, second);
    }

    /// Check every property the ranking promises, against counts computed
    /// independently from the raw items.
    fn assert_invariants(items: &[ReactionItem], known: &KnownAllergies) {
        let candidates = analyze(items, known);

        for c in &candidates {
            assert!(c.count > 1, "{} has count {}", c.name, c.count);
            assert!(!known.contains(&c.name), "{} is a known allergy", c.name);
            assert_eq!(c.count, c.contributing_items.len());

            let containing: Vec<&str> = items
                .iter()
                .filter(|item| item.ingredients().iter().any(|i| normalize(i) == c.name))
                .map(ReactionItem::name)
                .collect();
            assert_eq!(c.contributing_items, containing, "{}", c.name);
        }

        for pair in candidates.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.count > b.count || (a.count == b.count && a.name < b.name));
        }

        assert_eq!(candidates, analyze(items, known));
    }

    #[test]
    fn output_invariants_hold_for_sample() {
        let known: KnownAllergies = ["egg", "Salt"].into_iter().collect();
        assert_invariants(&sample(), &known);
    }

    #[test_case(&[], &[]; "no items")]
    #[test_case(&[&["soy"]], &[]; "single item")]
    #[test_case(&[&["soy", "soy", "SOY"]], &[]; "repeats within one item")]
    #[test_case(&[&[], &[]], &[]; "items without ingredients")]
    #[test_case(&[&["  ", ""], &["", " "]], &[]; "blank ingredients only")]
    #[test_case(&[&["soy"], &["Soy "]], &["SOY"]; "everything known")]
    #[test_case(&[&["b", "a"], &["a", "b"], &["c"], &["c"]], &[]; "all tied")]
    #[test_case(&[&["x"], &["x"], &["x"], &["y"], &["y"]], &["z"]; "unrelated allergy")]
    fn output_invariants_hold_for_edge_inputs(ingredients: &[&[&str]], known: &[&str]) {
        let items: Vec<_> = ingredients
            .iter()
            .enumerate()
            .map(|(i, list)| item(&format!("Item {i}"), list))
            .collect();
        let known: KnownAllergies = known.iter().collect();

        assert_invariants(&items, &known);
    }

    #[test]
    fn output_invariants_hold_for_generated_inputs() {
        const POOL: [&str; 10] = [
            "soy", "Soy", " wheat", "WHEAT ", "milk", "egg", "salt", "sugar", "", "sesame",
        ];

        // Small linear congruential generator, so every run sees the same inputs.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: usize| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            usize::try_from(state >> 33).unwrap() % bound
        };

        for _ in 0..200 {
            let item_count = next(8);
            let items: Vec<_> = (0..item_count)
                .map(|i| {
                    let list: Vec<&str> = (0..next(6)).map(|_| POOL[next(POOL.len())]).collect();
                    // Reuse display names now and then.
                    item(&format!("Item {}", i % 3), &list)
                })
                .collect();
            let known: KnownAllergies = (0..next(3)).map(|_| POOL[next(POOL.len())]).collect();

            assert_invariants(&items, &known);
        }
    }
}
