use strsim::normalized_levenshtein;

use crate::util::text::fold_for_match;

use super::options::COLOMBIAN_CITIES;

const MIN_QUERY_CHARS: usize = 2;

/// Autocomplete for the city field.
///
/// Matches are accent- and case-insensitive substrings of the query, best
/// match first. Queries under two characters suggest nothing.
pub fn suggest_cities(query: &str) -> Vec<&'static str> {
    let folded = fold_for_match(query);
    if folded.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let mut scored = COLOMBIAN_CITIES
        .iter()
        .filter_map(|city| {
            let folded_city = fold_for_match(city);
            if !folded_city.contains(&folded) {
                return None;
            }
            let prefix_boost = if folded_city.starts_with(&folded) { 1.0 } else { 0.0 };
            Some((*city, prefix_boost + normalized_levenshtein(&folded_city, &folded)))
        })
        .collect::<Vec<(&'static str, f64)>>();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.into_iter().map(|(city, _)| city).collect()
}
