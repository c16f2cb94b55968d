use crate::api::models::split_list;
use crate::cli::FilterArgs;
use crate::corpus::RecipeView;
use crate::filters::SearchFilters;
use crate::search::SearchService;
use crate::Result;
use std::path::Path;

impl FilterArgs {
    pub fn to_filters(&self) -> SearchFilters {
        SearchFilters {
            dietary: split_list(self.dietary.as_deref()),
            allergies: split_list(self.allergies.as_deref()),
            cuisines: split_list(self.cuisine.as_deref()),
            max_calories: self.max_calories,
            max_cook_time: self.max_time,
        }
    }
}

/// Search recipes
pub fn search(service: &SearchService, query: &str, filters: &FilterArgs) -> Result<()> {
    let results = service.search(query, &filters.to_filters())?;
    print_recipe_table(&results);
    Ok(())
}

/// Recommend recipes by ingredient list or by recipe name
pub fn recommend(
    service: &SearchService,
    ingredients: Option<&str>,
    recipe: Option<&str>,
    filters: &FilterArgs,
) -> Result<()> {
    let filters = filters.to_filters();
    let results = match (ingredients, recipe) {
        (_, Some(recipe)) => service.recommend_by_recipe(recipe, &filters)?,
        (Some(ingredients), None) => service.recommend_by_ingredients(ingredients, &filters)?,
        (None, None) => {
            return Err(crate::Error::Validation(
                "Either --ingredients or --recipe is required".to_string(),
            ))
        }
    };
    print_recipe_table(&results);
    Ok(())
}

/// Show one recipe in full
pub fn show(service: &SearchService, recipe_id: i64) -> Result<()> {
    let recipe = service.get_recipe(recipe_id)?;

    println!("\n{} (#{})", recipe.name, recipe.recipe_id);
    println!("  Time: {}", recipe.cook_time);
    if let Some(calories) = recipe.calories {
        println!("  Calories: {calories:.1}");
    }
    if let Some(rating) = recipe.avg_rate {
        println!("  Rating: {rating:.1}");
    }
    println!("  Image: {}", recipe.image_url);

    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {ingredient}");
    }

    println!("\nInstructions:");
    for (i, step) in recipe.instructions.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }

    Ok(())
}

/// List filter labels
pub fn options(service: &SearchService) -> Result<()> {
    let options = service.filter_options();
    println!("Dietary:   {}", options.dietary.join(", "));
    println!("Allergies: {}", options.allergies.join(", "));
    println!("Cuisines:  {}", options.cuisines.join(", "));
    Ok(())
}

/// Print spelling suggestions for each phrase
pub fn suggest(service: &SearchService, text: &str) -> Result<()> {
    let suggestions = service.suggest(text)?;
    if suggestions.is_empty() {
        println!("Nothing to suggest");
        return Ok(());
    }

    for suggestion in suggestions {
        if suggestion.matches.is_empty() {
            println!("{}: no close matches", suggestion.phrase);
        } else {
            println!("{}: {}", suggestion.phrase, suggestion.matches.join(", "));
        }
    }
    Ok(())
}

/// Write the corpus term dictionary to `output`
pub fn export_vocab(service: &SearchService, output: &Path) -> Result<usize> {
    let snapshot = service.store().snapshot()?;
    let terms = snapshot.terms();
    terms.write_to(output)?;
    println!("✓ Wrote {} terms to {}", terms.len(), output.display());
    Ok(terms.len())
}

fn print_recipe_table(results: &[RecipeView]) {
    if results.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", results.len());
    println!("{:<8} {:<50} {:<10} {:<8}", "ID", "Name", "Time", "Calories");
    println!("{}", "-".repeat(78));

    for recipe in results {
        let calories = recipe
            .calories
            .map(|c| format!("{c:.0}"))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<50} {:<10} {:<8}",
            recipe.recipe_id,
            truncate(&recipe.name, 48),
            recipe.cook_time,
            calories
        );
    }

    println!("\nTo see a recipe: cookmate show <ID>");
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
