use crate::corpus::{clean, Recipe};
use crate::error::{Error, Result};
use crate::text::normalize::{is_kitchen_stop_word, normalize, simplify};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Sorted set of food terms that misspelled input is matched against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermDictionary {
    terms: Vec<String>,
}

/// Close matches for one comma-separated phrase of the input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub phrase: String,
    pub normalized: String,
    pub matches: Vec<String>,
}

impl TermDictionary {
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = terms.into_iter().map(Into::into).collect();
        Self {
            terms: set.into_iter().collect(),
        }
    }

    /// Collect terms from recipe names, ingredients and instructions
    pub fn from_recipes(recipes: &[Recipe]) -> Self {
        let mut set = BTreeSet::new();
        for recipe in recipes {
            let texts = std::iter::once(recipe.name.clone())
                .chain(clean::clean_ingredients(recipe.ingredients_raw.as_deref()))
                .chain(clean::clean_instructions(recipe.instructions_raw.as_deref()));
            for text in texts {
                set.extend(
                    simplify(&text)
                        .into_iter()
                        .filter(|w| w.chars().count() > 1 && !is_kitchen_stop_word(w)),
                );
            }
        }
        Self {
            terms: set.into_iter().collect(),
        }
    }

    /// Read a dictionary file with one term per line
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read term dictionary from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(Self::from_terms(
            content
                .lines()
                .map(|line| line.trim().to_lowercase())
                .filter(|line| !line.is_empty()),
        ))
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.terms.join("\n"))?;
        Ok(())
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Up to `n` terms whose similarity ratio to `word` is at least `cutoff`, best first
    pub fn close_matches(&self, word: &str, n: usize, cutoff: f64) -> Vec<String> {
        if word.is_empty() || n == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &String)> = self
            .terms
            .iter()
            .map(|term| (similarity_ratio(word, term), term))
            .filter(|(score, _)| *score >= cutoff)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.into_iter().take(n).map(|(_, t)| t.clone()).collect()
    }
}

/// Ratcliff/Obershelp similarity: twice the matched characters over the total length
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common block as `(start_a, start_b, len)`, earliest in `a` then `b`
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = cur;
    }
    best
}

/// Suggest dictionary terms for each comma-separated phrase of `text`
pub fn suggest(dictionary: &TermDictionary, text: &str, n: usize, cutoff: f64) -> Vec<Suggestion> {
    text.split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| {
            let normalized = normalize(phrase).join(" ");
            let matches = dictionary.close_matches(&normalized, n, cutoff);
            Suggestion {
                phrase: phrase.to_lowercase(),
                normalized,
                matches,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
        assert_eq!(similarity_ratio("tomato", "tomato"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
        assert!(similarity_ratio("tomatto", "tomato") > 0.9);
    }

    #[test]
    fn test_close_matches_orders_best_first() {
        let dict = TermDictionary::from_terms(["apple", "ape", "peach", "puppy", "apply"]);
        assert_eq!(dict.close_matches("appel", 3, 0.6), vec!["apple", "apply", "ape"]);
        assert!(dict.close_matches("zzz", 3, 0.6).is_empty());
        assert_eq!(dict.close_matches("appel", 1, 0.6), vec!["apple"]);
    }

    #[test]
    fn test_suggest_per_phrase() {
        let dict = TermDictionary::from_terms(["tomato", "cheese", "basil"]);
        let suggestions = suggest(&dict, "Tomatos, chese ,, 12 basill", 3, 0.65);

        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].phrase, "tomatos");
        assert_eq!(suggestions[0].normalized, "tomato");
        assert_eq!(suggestions[0].matches, vec!["tomato"]);
        assert_eq!(suggestions[1].matches, vec!["cheese"]);
        assert_eq!(suggestions[2].matches, vec!["basil"]);
    }

    #[test]
    fn test_from_recipes_collects_terms() {
        let recipe = Recipe {
            id: 1,
            name: "Garlic Bread".to_string(),
            ingredients_raw: Some("c(\"2 cups flour\", \"garlic\")".to_string()),
            instructions_raw: Some("Bake it.".to_string()),
            duration_raw: None,
            nutrition: Default::default(),
            image_raw: None,
            avg_rating: None,
        };
        let dict = TermDictionary::from_recipes(&[recipe]);
        // "cups" is a unit and "it" a function word
        assert_eq!(dict.terms(), &["bake", "bread", "flour", "garlic"]);
    }

    #[test]
    fn test_dictionary_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terms.txt");
        let dict = TermDictionary::from_terms(["basil", "thyme"]);
        dict.write_to(&path).unwrap();
        assert_eq!(TermDictionary::read_from(&path).unwrap(), dict);
    }
}
