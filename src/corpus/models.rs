use serde::{Deserialize, Serialize};

use crate::corpus::clean;

/// Nutrition facts per serving; every value is `None` when absent or non-numeric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub fat_content: Option<f64>,
    pub protein_content: Option<f64>,
    pub carbohydrate_content: Option<f64>,
    pub fiber_content: Option<f64>,
}

/// One corpus row. Raw text fields are kept as they appear in the source
/// file; cleaning happens when the recipe is presented.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients_raw: Option<String>,
    /// Instructions, or the description when the source row has none
    pub instructions_raw: Option<String>,
    /// `PT#H#M` token from TotalTime, falling back to CookTime
    pub duration_raw: Option<String>,
    pub nutrition: Nutrition,
    pub image_raw: Option<String>,
    pub avg_rating: Option<f64>,
}

impl Recipe {
    /// Text the similarity engine vectorizes for this recipe
    pub fn document(&self) -> String {
        format!("{} {}", self.name, self.ingredients_raw.as_deref().unwrap_or(""))
    }

    /// Lowercased name and ingredient text scanned by the keyword filters
    pub fn filter_text(&self) -> String {
        self.document().to_lowercase()
    }

    /// Total duration in minutes, `None` when the duration is unknown
    pub fn cook_minutes(&self) -> Option<u32> {
        clean::duration_minutes(self.duration_raw.as_deref())
    }

    /// Canonical output shape
    pub fn present(&self, fallback_image: &str) -> RecipeView {
        RecipeView {
            recipe_id: self.id,
            name: self.name.clone(),
            ingredients: clean::clean_ingredients(self.ingredients_raw.as_deref()),
            instructions: clean::clean_instructions(self.instructions_raw.as_deref()),
            cook_time: clean::parse_duration(self.duration_raw.as_deref()),
            calories: self.nutrition.calories.and_then(clean::finite),
            image_url: clean::clean_image(self.image_raw.as_deref(), fallback_image),
            avg_rate: self.avg_rating.and_then(clean::finite),
            fat_content: self.nutrition.fat_content.and_then(clean::finite),
            protein_content: self.nutrition.protein_content.and_then(clean::finite),
            carbohydrate_content: self.nutrition.carbohydrate_content.and_then(clean::finite),
            fiber_content: self.nutrition.fiber_content.and_then(clean::finite),
        }
    }
}

/// Recipe as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub recipe_id: i64,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cook_time: String,
    pub calories: Option<f64>,
    pub image_url: String,
    pub avg_rate: Option<f64>,
    pub fat_content: Option<f64>,
    pub protein_content: Option<f64>,
    pub carbohydrate_content: Option<f64>,
    pub fiber_content: Option<f64>,
}
