use cookmate::config::{FilterRules, SearchConfig};
use cookmate::corpus::CorpusStore;
use cookmate::filters::SearchFilters;
use cookmate::search::SearchService;
use cookmate::Error;
use std::path::Path;
use std::sync::Arc;

const FALLBACK: &str = "https://example.com/placeholder.png";

const SOUPS: &str = "\
RecipeId,Name,RecipeIngredientParts,Images
1,Chicken Soup,\"chicken, broth, carrot\",\"c(\"\"http://a.jpg\"\",\"\"http://b.jpg\"\")\"
2,Veggie Soup,\"broth, carrot, celery\",
";

fn service_for(path: &Path) -> SearchService {
    SearchService::new(
        Arc::new(CorpusStore::new(path)),
        Arc::new(FilterRules::builtin().expect("built-in filter tables")),
        SearchConfig::default(),
        FALLBACK,
    )
}

fn write_corpus(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("recipes.csv");
    std::fs::write(&path, content).expect("Failed to write corpus");
    path
}

fn ids(views: &[cookmate::corpus::RecipeView]) -> Vec<i64> {
    views.iter().map(|v| v.recipe_id).collect()
}

#[test]
fn test_soup_search_ranks_both_rows() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(&write_corpus(&dir, SOUPS));

    let results = service
        .search("broth carrot", &SearchFilters::default())
        .expect("search failed");

    // Veggie Soup spends more of its weight on the query terms
    assert_eq!(ids(&results), vec![2, 1]);
    assert_eq!(results[1].image_url, "http://a.jpg");
    assert_eq!(results[0].image_url, FALLBACK);
    assert_eq!(results[0].ingredients, vec!["broth", "carrot", "celery"]);
}

#[test]
fn test_soup_search_vegetarian_keeps_veggie_soup() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(&write_corpus(&dir, SOUPS));

    let filters = SearchFilters {
        dietary: vec!["vegetarian".to_string()],
        ..Default::default()
    };
    let results = service.search("broth carrot", &filters).unwrap();
    assert_eq!(ids(&results), vec![2]);
}

#[test]
fn test_get_unknown_recipe_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(&write_corpus(&dir, SOUPS));

    assert!(matches!(service.get_recipe(999), Err(Error::NotFound(_))));
    assert_eq!(service.get_recipe(1).unwrap().name, "Chicken Soup");
}

#[test]
fn test_empty_or_missing_corpus_searches_empty() {
    let dir = tempfile::tempdir().unwrap();

    let empty = service_for(&write_corpus(&dir, ""));
    assert!(empty.search("anything", &SearchFilters::default()).unwrap().is_empty());

    let missing = service_for(&dir.path().join("nope.csv"));
    assert!(missing.search("anything", &SearchFilters::default()).unwrap().is_empty());
    assert!(matches!(missing.get_recipe(1), Err(Error::NotFound(_))));
}

#[test]
fn test_results_bounded_and_non_increasing() {
    let mut csv = String::from("RecipeId,Name,RecipeIngredientParts\n");
    for i in 0..150 {
        let extra = if i % 3 == 0 { "tomato, basil" } else { "rice, beans" };
        csv.push_str(&format!("{i},Dish {i},\"{extra}, salt\"\n"));
    }

    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(&dir, &csv);
    let service = SearchService::new(
        Arc::new(CorpusStore::new(&path)),
        Arc::new(FilterRules::builtin().unwrap()),
        SearchConfig {
            search_limit: 100,
            recommend_limit: 5,
            ..Default::default()
        },
        FALLBACK,
    );

    let results = service.search("tomato basil", &SearchFilters::default()).unwrap();
    assert_eq!(results.len(), 100);
    // The 50 tomato dishes rank ahead of everything else
    assert!(results[..50].iter().all(|r| r.recipe_id % 3 == 0));
    assert_eq!(results[0].recipe_id, 0);
    assert_eq!(results[1].recipe_id, 3);

    let recs = service
        .recommend_by_ingredients("rice beans", &SearchFilters::default())
        .unwrap();
    assert_eq!(recs.len(), 5);
    assert!(recs.iter().all(|r| r.recipe_id % 3 != 0));
}

#[test]
fn test_recommend_by_recipe_never_returns_itself() {
    let dir = tempfile::tempdir().unwrap();
    let csv = format!("{SOUPS}3,Chicken Stew,\"chicken, potato, carrot\",\n");
    let service = service_for(&write_corpus(&dir, &csv));

    let recs = service
        .recommend_by_recipe("Chicken Soup", &SearchFilters::default())
        .unwrap();
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r.recipe_id != 1));

    let vegetarian = SearchFilters {
        dietary: vec!["vegetarian".to_string()],
        ..Default::default()
    };
    let recs = service.recommend_by_recipe("chicken soup", &vegetarian).unwrap();
    assert_eq!(ids(&recs), vec![2]);

    assert!(matches!(
        service.recommend_by_recipe("Beef Wellington", &SearchFilters::default()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_corpus_edit_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(&dir, SOUPS);
    let service = service_for(&path);

    assert!(matches!(service.get_recipe(3), Err(Error::NotFound(_))));

    std::fs::write(&path, format!("{SOUPS}3,Apple Pie,\"apple, flour\",\n")).unwrap();
    assert_eq!(service.get_recipe(3).unwrap().name, "Apple Pie");

    let results = service.search("apple", &SearchFilters::default()).unwrap();
    assert_eq!(results[0].recipe_id, 3);
}
