use crate::corpus::clean::parse_number;
use crate::corpus::models::{Nutrition, Recipe};
use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    id: usize,
    name: usize,
    ingredients: Option<usize>,
    instructions: Option<usize>,
    description: Option<usize>,
    total_time: Option<usize>,
    cook_time: Option<usize>,
    calories: Option<usize>,
    fat: Option<usize>,
    protein: Option<usize>,
    carbohydrate: Option<usize>,
    fiber: Option<usize>,
    images: Option<usize>,
    rating: Option<usize>,
}

/// Strip a byte-order mark, whether decoded properly or as Latin-1 mojibake
fn normalize_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}')
        .trim_start_matches("ï»¿")
        .trim()
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| normalize_header(h).eq_ignore_ascii_case(wanted))
        };

        let id = find("RecipeId")
            .ok_or_else(|| Error::Config("Corpus is missing the RecipeId column".to_string()))?;
        let name = find("Name")
            .ok_or_else(|| Error::Config("Corpus is missing the Name column".to_string()))?;

        Ok(Self {
            id,
            name,
            ingredients: find("RecipeIngredientParts"),
            instructions: find("RecipeInstructions"),
            description: find("Description"),
            total_time: find("TotalTime"),
            cook_time: find("CookTime"),
            calories: find("Calories"),
            fat: find("FatContent"),
            protein: find("ProteinContent"),
            carbohydrate: find("CarbohydrateContent"),
            fiber: find("FiberContent"),
            images: find("Images"),
            rating: find("AggregatedRating"),
        })
    }
}

/// Non-blank field value at an optional column
fn field(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| record.get(i))
        .filter(|value| !value.trim().is_empty())
}

/// Recipe ids are integers, but spreadsheet exports sometimes write `38.0`
fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Option<Recipe> {
    let id = parse_id(record.get(columns.id)?)?;
    let name = field(record, Some(columns.name))?.trim().to_string();

    let owned = |column: Option<usize>| field(record, column).map(str::to_string);

    Some(Recipe {
        id,
        name,
        ingredients_raw: owned(columns.ingredients),
        instructions_raw: owned(columns.instructions).or_else(|| owned(columns.description)),
        duration_raw: owned(columns.total_time).or_else(|| owned(columns.cook_time)),
        nutrition: Nutrition {
            calories: parse_number(field(record, columns.calories)),
            fat_content: parse_number(field(record, columns.fat)),
            protein_content: parse_number(field(record, columns.protein)),
            carbohydrate_content: parse_number(field(record, columns.carbohydrate)),
            fiber_content: parse_number(field(record, columns.fiber)),
        },
        image_raw: owned(columns.images),
        avg_rating: parse_number(field(record, columns.rating)),
    })
}

/// Parse a recipe CSV.
///
/// Rows that cannot be read, or that lack an id or a name, are skipped.
/// When an id repeats, the first row wins. An empty input is an empty corpus.
pub fn parse_recipes(data: &[u8]) -> Result<Vec<Recipe>> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let columns = Columns::resolve(reader.headers()?)?;

    let mut recipes = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable corpus row {}: {}", line + 2, e);
                skipped += 1;
                continue;
            }
        };

        let Some(recipe) = parse_row(&record, &columns) else {
            skipped += 1;
            continue;
        };

        if !seen.insert(recipe.id) {
            warn!("Skipping duplicate recipe id {} at row {}", recipe.id, line + 2);
            skipped += 1;
            continue;
        }

        recipes.push(recipe);
    }

    debug!("Parsed {} recipes ({} rows skipped)", recipes.len(), skipped);
    Ok(recipes)
}
