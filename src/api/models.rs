use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};

use crate::corpus::RecipeView;
use crate::filters::SearchFilters;
use crate::Error;

/// Decoded query string pairs; a key may appear more than once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// First value given for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value given for `key`, each split on commas
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| split_list(Some(v)))
            .collect()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;
        Ok(Self(pairs))
    }
}

/// Search request parameters
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: String,
    pub filters: FilterParams,
}

impl From<&QueryPairs> for SearchParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            q: pairs
                .first("q")
                .or_else(|| pairs.first("ingredients"))
                .unwrap_or_default()
                .to_string(),
            filters: pairs.into(),
        }
    }
}

/// Recommend-by-ingredients request parameters
#[derive(Debug, Clone, Default)]
pub struct IngredientParams {
    pub ingredients: String,
    pub filters: FilterParams,
}

impl From<&QueryPairs> for IngredientParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            ingredients: pairs.first("ingredients").unwrap_or_default().to_string(),
            filters: pairs.into(),
        }
    }
}

/// Recommend-by-recipe request parameters
#[derive(Debug, Clone, Default)]
pub struct RecipeParams {
    pub recipe: String,
    pub filters: FilterParams,
}

impl From<&QueryPairs> for RecipeParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            recipe: pairs.first("recipe").unwrap_or_default().to_string(),
            filters: pairs.into(),
        }
    }
}

/// Filter parameters shared by search and recommendations.
///
/// List parameters may repeat (`dietary=vegan&dietary=keto`) or carry
/// comma-separated values (`dietary=vegan,keto`); both forms combine.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub dietary: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisine: Vec<String>,
    pub max_calories: Option<String>,
    pub max_cook_time: Option<String>,
}

impl From<&QueryPairs> for FilterParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            dietary: pairs.list("dietary"),
            allergies: pairs.list("allergies"),
            cuisine: pairs.list("cuisine"),
            max_calories: pairs.first("max_calories").map(str::to_string),
            max_cook_time: pairs.first("max_cook_time").map(str::to_string),
        }
    }
}

impl FilterParams {
    /// Convert to core filters; unparseable numbers are a validation error
    pub fn into_filters(self) -> crate::Result<SearchFilters> {
        let max_calories = parse_optional::<f64>(self.max_calories.as_deref(), "max_calories")?;
        if max_calories.is_some_and(|c| !c.is_finite() || c < 0.0) {
            return Err(Error::Validation(
                "max_calories must be a non-negative number".to_string(),
            ));
        }

        Ok(SearchFilters {
            dietary: self.dietary,
            allergies: self.allergies,
            cuisines: self.cuisine,
            max_calories,
            max_cook_time: parse_optional(self.max_cook_time.as_deref(), "max_cook_time")?,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(raw: Option<&str>, name: &str) -> crate::Result<Option<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Validation(format!("Invalid {name} value: {value}"))),
        None => Ok(None),
    }
}

/// Split a comma-separated parameter, dropping blank items
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Suggestion request parameters
#[derive(Debug, Clone, Default)]
pub struct SuggestParams {
    pub q: String,
}

impl From<&QueryPairs> for SuggestParams {
    fn from(pairs: &QueryPairs) -> Self {
        Self {
            q: pairs.first("q").unwrap_or_default().to_string(),
        }
    }
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub data: Vec<RecipeView>,
}

/// Recommendation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<RecipeView>,
}

/// Spelling suggestion response
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<crate::text::Suggestion>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub corpus: String,
    pub recipes: usize,
    pub fingerprint: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}
