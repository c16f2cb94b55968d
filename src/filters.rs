//! Keyword-based candidate filters.
//!
//! Dietary and allergy labels exclude a recipe when its lowercased name or
//! ingredient text contains any keyword of any requested label. Matching is
//! plain substring search, so an egg allergy also excludes "eggplant".

use crate::config::FilterRules;
use crate::corpus::Recipe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Optional constraints shared by search and both recommendation modes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub dietary: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisines: Vec<String>,
    pub max_calories: Option<f64>,
    /// Minutes
    pub max_cook_time: Option<u32>,
}

impl SearchFilters {
    pub fn has_exclusions(&self) -> bool {
        !self.dietary.is_empty() || !self.allergies.is_empty()
    }
}

/// Union of exclude keywords for a set of dietary and allergy labels
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet<'a> {
    keywords: Vec<&'a str>,
}

impl<'a> ExclusionSet<'a> {
    /// Unknown labels contribute nothing
    pub fn new(rules: &'a FilterRules, dietary: &[String], allergies: &[String]) -> Self {
        let mut seen = HashSet::new();
        let keywords = dietary
            .iter()
            .filter_map(|label| rules.diet_keywords(label))
            .chain(allergies.iter().filter_map(|label| rules.allergy_keywords(label)))
            .flatten()
            .map(String::as_str)
            .filter(|k| seen.insert(*k))
            .collect();

        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether the recipe contains none of the keywords
    pub fn allows(&self, recipe: &Recipe) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let text = recipe.filter_text();
        !self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Keep candidates that match no exclude keyword of the requested labels
pub fn apply_exclusions<'r>(
    rules: &FilterRules,
    candidates: Vec<&'r Recipe>,
    dietary: &[String],
    allergies: &[String],
) -> Vec<&'r Recipe> {
    let exclusions = ExclusionSet::new(rules, dietary, allergies);
    if exclusions.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|recipe| exclusions.allows(recipe))
        .collect()
}

/// Names of recipes that pass the dietary and allergy labels
pub fn allowed_names<'r>(
    rules: &FilterRules,
    recipes: &'r [Recipe],
    dietary: &[String],
    allergies: &[String],
) -> HashSet<&'r str> {
    let exclusions = ExclusionSet::new(rules, dietary, allergies);
    recipes
        .iter()
        .filter(|recipe| exclusions.allows(recipe))
        .map(|recipe| recipe.name.as_str())
        .collect()
}

/// Calorie ceiling, cook-time ceiling and cuisine keywords.
///
/// A ceiling drops recipes whose value is unknown. Cuisines are disjunctive:
/// the name must contain at least one recognized cuisine keyword. When none of
/// the requested cuisines is recognized the cuisine constraint is ignored.
pub fn matches_attributes(rules: &FilterRules, recipe: &Recipe, filters: &SearchFilters) -> bool {
    if let Some(max) = filters.max_calories {
        match recipe.nutrition.calories {
            Some(calories) if calories <= max => {}
            _ => return false,
        }
    }

    if let Some(max) = filters.max_cook_time {
        match recipe.cook_minutes() {
            Some(minutes) if minutes <= max => {}
            _ => return false,
        }
    }

    let cuisines: Vec<&str> = filters
        .cuisines
        .iter()
        .filter_map(|c| rules.cuisine(c))
        .collect();
    if !cuisines.is_empty() {
        let name = recipe.name.to_lowercase();
        if !cuisines.iter().any(|c| name.contains(c)) {
            return false;
        }
    }

    true
}

/// Labels and keywords callers may filter by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub dietary: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisines: Vec<String>,
}

pub fn options(rules: &FilterRules) -> FilterOptions {
    FilterOptions {
        dietary: rules.dietary.iter().map(|r| r.label.clone()).collect(),
        allergies: rules.allergies.iter().map(|r| r.label.clone()).collect(),
        cuisines: rules.cuisines.clone(),
    }
}
