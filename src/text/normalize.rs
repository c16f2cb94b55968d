//! Free-text normalization for the spelling-suggestion path.
//!
//! Text is lowercased, stripped of digits and punctuation, filtered against
//! a kitchen stop list (function words, units, preparation adjectives) and
//! reduced to singular noun forms.

use std::collections::HashSet;
use std::sync::LazyLock;

pub const KITCHEN_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "for", "to", "with", "on", "in", "at", "by", "from",
    "into", "over", "under", "about", "as", "is", "are", "was", "were", "be", "been", "being",
    "it", "its", "this", "that", "these", "those", "you", "your", "i", "we", "they", "he", "she",
    "but", "if", "then", "than", "so", "not", "no", "yes", "up", "down", "out", "off", "very",
    "can", "could", "should", "would", "may", "might", "will", "just", "also",
    "cup", "cups", "tbsp", "tsp", "tablespoon", "tablespoons", "teaspoon", "teaspoons",
    "ounce", "ounces", "oz", "gram", "grams", "g", "kg", "ml", "ltr", "liter", "liters",
    "inch", "inches", "large", "small", "medium", "fresh", "dried", "ground", "chopped",
    "minced", "sliced", "diced", "whole", "skinless", "boneless", "optional", "plus", "divided",
    "taste",
];

static KITCHEN: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| KITCHEN_STOP_WORDS.iter().copied().collect());

/// Plurals that suffix rules would get wrong
const IRREGULAR: &[(&str, &str)] = &[
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("knives", "knife"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("mangoes", "mango"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("mice", "mouse"),
    ("children", "child"),
    ("molasses", "molasses"),
    ("cookies", "cookie"),
    ("brownies", "brownie"),
    ("smoothies", "smoothie"),
    ("veggies", "veggie"),
    ("pies", "pie"),
    ("calories", "calorie"),
];

pub fn is_kitchen_stop_word(word: &str) -> bool {
    KITCHEN.contains(word)
}

/// Reduce a lowercase word to its singular noun form
pub fn lemmatize(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return lemma.to_string();
    }

    if word.chars().count() <= 3 {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    for suffix in ["ches", "shes", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

/// Lowercase, drop digits and ASCII punctuation, split on whitespace
pub fn simplify(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_digit() { ' ' } else { c })
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalized tokens: simplified, stop words removed, lemmatized
pub fn normalize(text: &str) -> Vec<String> {
    simplify(text)
        .into_iter()
        .filter(|w| !is_kitchen_stop_word(w))
        .map(|w| lemmatize(&w))
        .collect()
}
