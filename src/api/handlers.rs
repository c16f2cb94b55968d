use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{api::models::*, filters::FilterOptions, search::SearchService, Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
    pub settings: crate::config::Settings,
}

/// GET /api/search - Rank recipes against free text
pub async fn search_recipes(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<SearchResponse>> {
    let params = SearchParams::from(&query);
    debug!("Search request: {:?}", params);

    let text = require("q", &params.q)?.to_string();
    let filters = params.filters.into_filters()?;
    let data = blocking(move || state.service.search(&text, &filters)).await?;

    Ok(Json(SearchResponse {
        status: "success".to_string(),
        data,
    }))
}

/// GET /api/recommend/by_ingredients - Recipes matching an ingredient list
pub async fn recommend_by_ingredients(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<RecommendResponse>> {
    let params = IngredientParams::from(&query);
    debug!("Recommend by ingredients request: {:?}", params);

    let ingredients = require("ingredients", &params.ingredients)?.to_string();
    let filters = params.filters.into_filters()?;
    let recommendations =
        blocking(move || state.service.recommend_by_ingredients(&ingredients, &filters)).await?;

    Ok(Json(RecommendResponse { recommendations }))
}

/// GET /api/recommend/by_recipe - Recipes similar to a named recipe
pub async fn recommend_by_recipe(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<RecommendResponse>> {
    let params = RecipeParams::from(&query);
    debug!("Recommend by recipe request: {:?}", params);

    let recipe = require("recipe", &params.recipe)?.to_string();
    let filters = params.filters.into_filters()?;
    let recommendations =
        blocking(move || state.service.recommend_by_recipe(&recipe, &filters)).await?;

    Ok(Json(RecommendResponse { recommendations }))
}

/// GET /api/recipes/:id - Get recipe details
pub async fn get_recipe(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<crate::corpus::RecipeView>> {
    let Path(id) = id.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    debug!("Get recipe request: {}", id);

    let recipe = blocking(move || state.service.get_recipe(id)).await?;
    Ok(Json(recipe))
}

/// GET /api/dietary-options - Labels accepted by the filters
pub async fn dietary_options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.service.filter_options())
}

/// GET /api/suggest - Spelling suggestions for ingredient input
pub async fn suggest(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<SuggestResponse>> {
    let params = SuggestParams::from(&query);
    debug!("Suggest request: {:?}", params);

    let text = require("q", &params.q)?.to_string();
    let suggestions = blocking(move || state.service.suggest(&text)).await?;

    Ok(Json(SuggestResponse { suggestions }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let service = state.service.clone();
    let reload = blocking(move || service.store().snapshot()).await;

    // A corpus that fails to load leaves the last good snapshot in place
    let (corpus, snapshot) = match reload {
        Ok(snapshot) => ("ok", snapshot),
        Err(e) => {
            warn!("Corpus reload failed: {}", e.log_safe());
            ("error", state.service.store().current())
        }
    };

    Ok(Json(ReadinessResponse {
        ready: corpus == "ok",
        corpus: corpus.to_string(),
        recipes: snapshot.len(),
        fingerprint: snapshot.fingerprint().to_string(),
        loaded_at: snapshot.loaded_at(),
    }))
}

/// Run corpus work (file reads, hashing, model fitting) off the async workers
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal(format!("Blocking task failed: {e}")))?
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("Parameter '{name}' is required")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_returns_work_result() {
        assert_eq!(blocking(|| Ok(21 * 2)).await.unwrap(), 42);

        let err = blocking::<(), _>(|| Err(Error::NotFound("gone".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blocking_panic_is_internal_error() {
        let err = blocking::<(), _>(|| panic!("worker crashed")).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
