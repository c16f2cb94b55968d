//! Query orchestration over the corpus snapshot.
//!
//! Free-text search filters first and ranks the survivors. Both
//! recommendation modes rank the whole snapshot first and filter the top-N
//! afterwards, so they may return fewer than N results.

use crate::config::{FilterRules, SearchConfig};
use crate::corpus::{CorpusStore, Recipe, RecipeView, Snapshot};
use crate::error::{Error, Result};
use crate::filters::{self, FilterOptions, SearchFilters};
use crate::similarity::{self, Ranked, TfIdfModel};
use crate::text::{self, Suggestion, TermDictionary};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SearchService {
    store: Arc<CorpusStore>,
    rules: Arc<FilterRules>,
    config: SearchConfig,
    fallback_image: String,
    dictionary: Option<Arc<TermDictionary>>,
}

impl SearchService {
    pub fn new(
        store: Arc<CorpusStore>,
        rules: Arc<FilterRules>,
        config: SearchConfig,
        fallback_image: impl Into<String>,
    ) -> Self {
        Self {
            store,
            rules,
            config,
            fallback_image: fallback_image.into(),
            dictionary: None,
        }
    }

    /// Match suggestions against a fixed word list instead of corpus terms
    pub fn with_dictionary(mut self, dictionary: TermDictionary) -> Self {
        self.dictionary = Some(Arc::new(dictionary));
        self
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    /// Rank recipes passing every filter against free query text
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<RecipeView>> {
        let snapshot = self.store.snapshot()?;
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let candidates: Vec<&Recipe> = snapshot
            .recipes()
            .iter()
            .filter(|recipe| filters::matches_attributes(&self.rules, recipe, filters))
            .collect();
        let candidates =
            filters::apply_exclusions(&self.rules, candidates, &filters.dietary, &filters.allergies);

        debug!(
            "Search over {} of {} recipes",
            candidates.len(),
            snapshot.len()
        );

        // Candidates keep corpus order, so an unfiltered set lines up with the snapshot rows
        let ranked = if candidates.len() == snapshot.len() {
            similarity::rank_by_text(snapshot.model(), query, self.config.search_limit)
        } else {
            let documents: Vec<String> = candidates.iter().map(|r| r.document()).collect();
            let model = TfIdfModel::fit(&documents);
            similarity::rank_by_text(&model, query, self.config.search_limit)
        };

        Ok(ranked
            .into_iter()
            .map(|r| candidates[r.index].present(&self.fallback_image))
            .collect())
    }

    /// Top-N recipes for an ingredient list, filtered after ranking
    pub fn recommend_by_ingredients(
        &self,
        ingredients: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<RecipeView>> {
        let snapshot = self.store.snapshot()?;
        let ranked =
            similarity::rank_by_text(snapshot.model(), ingredients, self.config.recommend_limit);
        Ok(self.filter_ranked(&snapshot, ranked, filters))
    }

    /// Top-N recipes similar to the one named `title`, filtered after ranking
    pub fn recommend_by_recipe(&self, title: &str, filters: &SearchFilters) -> Result<Vec<RecipeView>> {
        let snapshot = self.store.snapshot()?;
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let seed = snapshot
            .find_by_name(title)
            .ok_or_else(|| Error::NotFound(format!("Recipe '{}' not found", title.trim())))?;

        let ranked = similarity::rank_like(snapshot.model(), seed, self.config.recommend_limit);
        Ok(self.filter_ranked(&snapshot, ranked, filters))
    }

    pub fn get_recipe(&self, id: i64) -> Result<RecipeView> {
        let snapshot = self.store.snapshot()?;
        snapshot
            .get(id)
            .map(|recipe| recipe.present(&self.fallback_image))
            .ok_or_else(|| Error::NotFound(format!("Recipe {id} not found")))
    }

    pub fn filter_options(&self) -> FilterOptions {
        filters::options(&self.rules)
    }

    /// Spelling suggestions for each comma-separated phrase of `text`
    pub fn suggest(&self, text: &str) -> Result<Vec<Suggestion>> {
        let (limit, cutoff) = (self.config.suggestion_limit, self.config.suggestion_cutoff);
        if let Some(dictionary) = &self.dictionary {
            return Ok(text::suggest(dictionary, text, limit, cutoff));
        }

        let snapshot = self.store.snapshot()?;
        Ok(text::suggest(snapshot.terms(), text, limit, cutoff))
    }

    fn filter_ranked(
        &self,
        snapshot: &Snapshot,
        ranked: Vec<Ranked>,
        filters: &SearchFilters,
    ) -> Vec<RecipeView> {
        let allowed = filters.has_exclusions().then(|| {
            filters::allowed_names(
                &self.rules,
                snapshot.recipes(),
                &filters.dietary,
                &filters.allergies,
            )
        });

        let total = ranked.len();
        let kept: Vec<RecipeView> = ranked
            .into_iter()
            .map(|r| &snapshot.recipes()[r.index])
            .filter(|recipe| {
                allowed
                    .as_ref()
                    .map_or(true, |names| names.contains(recipe.name.as_str()))
            })
            .filter(|recipe| filters::matches_attributes(&self.rules, recipe, filters))
            .map(|recipe| recipe.present(&self.fallback_image))
            .collect();

        if kept.len() < total {
            debug!("Filters dropped {} of {} recommendations", total - kept.len(), total);
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FALLBACK_IMAGE;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "\
RecipeId,Name,RecipeIngredientParts,Calories,TotalTime
1,Chicken Broth,\"c(\"\"chicken\"\", \"\"broth\"\")\",300,PT1H
2,Beef Broth,\"c(\"\"beef\"\", \"\"broth\"\")\",450,PT2H
3,Garden Salad,\"c(\"\"lettuce\"\", \"\"tomato\"\")\",120,PT10M
";

    fn service(csv: &str, recommend_limit: usize) -> (TempDir, SearchService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.csv");
        fs::write(&path, csv).unwrap();

        let service = SearchService::new(
            Arc::new(CorpusStore::new(path)),
            Arc::new(FilterRules::builtin().unwrap()),
            SearchConfig {
                recommend_limit,
                ..Default::default()
            },
            DEFAULT_FALLBACK_IMAGE,
        );
        (dir, service)
    }

    fn vegetarian() -> SearchFilters {
        SearchFilters {
            dietary: vec!["vegetarian".to_string()],
            ..Default::default()
        }
    }

    fn names(views: &[RecipeView]) -> Vec<&str> {
        views.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_search_ranks_matches_first() {
        let (_dir, service) = service(CSV, 5);
        let results = service.search("beef", &SearchFilters::default()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "Beef Broth");
        assert_eq!(results[0].ingredients, vec!["beef", "broth"]);
    }

    #[test]
    fn test_search_filters_before_ranking() {
        let (_dir, service) = service(CSV, 5);
        let results = service.search("broth", &vegetarian()).unwrap();
        assert_eq!(names(&results), vec!["Garden Salad"]);

        let light = SearchFilters {
            max_calories: Some(400.0),
            max_cook_time: Some(90),
            ..Default::default()
        };
        let results = service.search("broth", &light).unwrap();
        assert_eq!(names(&results), vec!["Chicken Broth", "Garden Salad"]);
    }

    #[test]
    fn test_recommendations_do_not_backfill() {
        let (_dir, service) = service(CSV, 2);

        let unfiltered = service
            .recommend_by_ingredients("broth", &SearchFilters::default())
            .unwrap();
        assert_eq!(names(&unfiltered), vec!["Chicken Broth", "Beef Broth"]);

        // Both top-ranked recipes contain meat; the salad is never pulled up
        let filtered = service.recommend_by_ingredients("broth", &vegetarian()).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_recommend_by_recipe_excludes_seed() {
        let (_dir, service) = service(CSV, 5);
        let results = service
            .recommend_by_recipe("  chicken BROTH ", &SearchFilters::default())
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Beef Broth");
        assert!(results.iter().all(|r| r.recipe_id != 1));
    }

    #[test]
    fn test_recommend_by_unknown_recipe_is_not_found() {
        let (_dir, service) = service(CSV, 5);
        let err = service
            .recommend_by_recipe("Lasagna", &SearchFilters::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        let (_dir, service) = service("RecipeId,Name\n", 5);
        let none = SearchFilters::default();
        assert!(service.search("soup", &none).unwrap().is_empty());
        assert!(service.recommend_by_ingredients("soup", &none).unwrap().is_empty());
        assert!(service.recommend_by_recipe("Soup", &none).unwrap().is_empty());
        assert!(service.suggest("soup").unwrap().iter().all(|s| s.matches.is_empty()));
    }

    #[test]
    fn test_get_recipe() {
        let (_dir, service) = service(CSV, 5);
        let recipe = service.get_recipe(3).unwrap();
        assert_eq!(recipe.name, "Garden Salad");
        assert_eq!(recipe.cook_time, "0h 10m");
        assert_eq!(recipe.image_url, DEFAULT_FALLBACK_IMAGE);
        assert!(matches!(service.get_recipe(999), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_suggest_uses_corpus_terms() {
        let (_dir, service) = service(CSV, 5);
        let suggestions = service.suggest("letuce, tomatos").unwrap();
        assert_eq!(suggestions[0].matches.first().map(String::as_str), Some("lettuce"));
        assert_eq!(suggestions[1].matches.first().map(String::as_str), Some("tomato"));
    }

    #[test]
    fn test_suggest_prefers_configured_dictionary() {
        let (_dir, service) = service(CSV, 5);
        let service = service.with_dictionary(TermDictionary::from_terms(["saffron", "tomato"]));

        let suggestions = service.suggest("safron, letuce").unwrap();
        assert_eq!(suggestions[0].matches, vec!["saffron"]);
        // Corpus terms are not consulted once a word list is set
        assert!(suggestions[1].matches.is_empty());
    }
}
