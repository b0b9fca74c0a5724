//! Ingredient names are compared in a single normalized form: trimmed and
//! lower-cased. Everything that stores, filters or counts ingredients goes
//! through [`normalize`] so that "Soy", " soy " and "SOY" are the same thing.

/// Normalize an ingredient name.
///
/// Normalization is idempotent: `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize every ingredient in a parsed list, dropping blank entries.
///
/// Order and duplicates are preserved; deduplication is the analyzer's job.
#[must_use]
pub fn normalize_all<I, S>(ingredients: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ingredients
        .into_iter()
        .map(|ingredient| normalize(ingredient.as_ref()))
        .filter(|ingredient| !ingredient.is_empty())
        .collect()
}

/// Split raw ingredient text on commas.
///
/// This is the fallback used when the ingredient parser is unavailable. Each
/// fragment is lower-cased, stripped of parentheses and trimmed; empty
/// fragments are discarded.
#[must_use]
pub fn split_fallback(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(|fragment| normalize(&fragment.replace(['(', ')'], "")))
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Soy Sauce, (Wheat), Salt", &["soy sauce", "wheat", "salt"]; "parenthesised fragment")]
    #[test_case("sugar,,  , salt", &["sugar", "salt"]; "empty fragments")]
    #[test_case("Milk ( 2% )", &["milk  2%"]; "inner parens removed")]
    #[test_case("", &[]; "empty input")]
    #[test_case("()", &[]; "only parens")]
    fn fallback_split(raw: &str, expected: &[&str]) {
        assert_eq!(split_fallback(raw), expected);
    }

    #[test_case("  Soy  ", "soy")]
    #[test_case("SOY LECITHIN", "soy lecithin")]
    #[test_case("salt", "salt")]
    fn normalize_is_idempotent(input: &str, expected: &str) {
        let once = normalize(input);
        assert_eq!(once, expected);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_all_drops_blanks_but_keeps_duplicates() {
        let normalized = normalize_all(["Soy", "  ", "soy", "Salt"]);
        assert_eq!(normalized, ["soy", "soy", "salt"]);
    }
}
