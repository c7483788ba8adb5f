use super::{http_client, LookupError};
use crate::food::analysis::dietary::classify_food_name;
use crate::food::config::FoodConfig;
use crate::food::record::{format_amount, FoodGuess, NutritionRecord, NOT_SPECIFIED};
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Data types to search, best quality first. The first type that returns a
/// food wins; lower-ranked types are never consulted after a hit.
pub const DATA_TYPE_PRIORITY: [&str; 3] = ["Survey (FNDDS)", "Foundation", "SR Legacy"];

pub const USDA_SOURCE: &str = "USDA FoodData Central";
pub const FALLBACK_SOURCE: &str = "AI Recognition (nutrition data unavailable)";
pub const FALLBACK_NOTE: &str = "Nutritional information could not be retrieved. \
Please consult a nutrition database for accurate values.";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
struct SearchFood {
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "dataType", default)]
    data_type: Option<String>,
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<SearchNutrient>,
}

#[derive(Debug, Deserialize)]
struct SearchNutrient {
    #[serde(rename = "nutrientName", default)]
    nutrient_name: String,
    #[serde(rename = "unitName", default)]
    unit_name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

/// The nutrient values a food-name record carries.
#[derive(Debug, Default, PartialEq)]
struct Nutrients {
    energy: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    fiber: Option<f64>,
    sugar: Option<f64>,
    sodium: Option<f64>,
}

/// Pick nutrients out of an unordered list by exact name. The first
/// occurrence wins, except that energy prefers the kcal entry when the
/// food also lists kJ.
fn extract_nutrients(list: &[SearchNutrient]) -> Nutrients {
    let find = |name: &str| {
        list.iter()
            .find(|n| n.nutrient_name == name && n.value.is_some())
            .and_then(|n| n.value)
    };

    let energy = list
        .iter()
        .filter(|n| n.nutrient_name == "Energy" && n.value.is_some())
        .find(|n| {
            n.unit_name
                .as_deref()
                .map_or(false, |u| u.eq_ignore_ascii_case("kcal"))
        })
        .and_then(|n| n.value)
        .or_else(|| find("Energy"));

    Nutrients {
        energy,
        protein: find("Protein"),
        carbs: find("Carbohydrate, by difference"),
        fat: find("Total lipid (fat)"),
        fiber: find("Fiber, total dietary"),
        sugar: find("Sugars, total including NLEA"),
        sodium: find("Sodium, Na"),
    }
}

fn amount(value: Option<f64>) -> String {
    value
        .map(format_amount)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Degraded record for when the nutrition database cannot help. It keeps
/// the guess's name and quantity and never invents numbers.
pub fn fallback_record(food_name: &str, quantity: &str) -> NutritionRecord {
    let mut record = NutritionRecord::placeholder(food_name, classify_food_name(food_name));
    record.description = format!("{} - {}", food_name, quantity);
    record.expiration_date = "Not applicable".to_string();
    record.calories = "Not available - please consult a nutrition database".to_string();
    record.allergens = "Unable to determine - please verify based on ingredients".to_string();
    record.important_ingredients = food_name.to_string();
    record.ingredients = food_name.to_string();
    record.protein = Some(NOT_SPECIFIED.to_string());
    record.carbs = Some(NOT_SPECIFIED.to_string());
    record.fat = Some(NOT_SPECIFIED.to_string());
    record.quantity = Some(quantity.to_string());
    record.source = Some(FALLBACK_SOURCE.to_string());
    record.note = Some(FALLBACK_NOTE.to_string());
    record
}

fn food_record(guess: &FoodGuess, food: SearchFood) -> NutritionRecord {
    let nutrients = extract_nutrients(&food.food_nutrients);
    let product_name = food
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| guess.name.clone());

    let mut record = NutritionRecord::placeholder(product_name, classify_food_name(&guess.name));
    record.description = format!("{} - {}", guess.name, guess.quantity);
    record.expiration_date = "Not applicable (fresh food)".to_string();
    record.calories = amount(nutrients.energy);
    record.allergens =
        "Please check ingredients - common allergens may include dairy, nuts, soy, gluten"
            .to_string();
    record.important_ingredients = guess.name.clone();
    record.ingredients = guess.name.clone();
    record.protein = Some(amount(nutrients.protein));
    record.carbs = Some(amount(nutrients.carbs));
    record.fat = Some(amount(nutrients.fat));
    record.fiber = Some(amount(nutrients.fiber));
    record.sugar = Some(amount(nutrients.sugar));
    record.sodium = Some(amount(nutrients.sodium));
    record.quantity = Some(guess.quantity.clone());
    record.source = Some(USDA_SOURCE.to_string());
    record.vision_raw_response = Some(guess.raw_response.clone());
    record
}

/// Food-name lookups against USDA FoodData Central.
#[derive(Debug, Clone)]
pub struct UsdaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl UsdaClient {
    pub fn new(config: &FoodConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            api_key: config.usda_api_key.clone(),
            base_url: config.usda_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a guess into a record. Always returns something: any miss or
    /// failure produces the fallback record instead.
    pub async fn lookup(&self, guess: &FoodGuess) -> NutritionRecord {
        info!("Searching USDA database for: {}", guess.name);

        match self.search_best_match(&guess.name).await {
            Ok(Some(food)) => {
                let record = food_record(guess, food);
                info!("Retrieved nutrition data for: {}", record.product_name);
                record
            }
            Ok(None) => {
                warn!("No matching food found in USDA database for {}", guess.name);
                fallback_record(&guess.name, &guess.quantity)
            }
            Err(e) => {
                error!("Error fetching USDA data for {}: {}", guess.name, e);
                fallback_record(&guess.name, &guess.quantity)
            }
        }
    }

    async fn search_best_match(&self, query: &str) -> Result<Option<SearchFood>, LookupError> {
        let url = format!("{}/foods/search", self.base_url);

        for data_type in DATA_TYPE_PRIORITY {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("query", query),
                    ("dataType", data_type),
                    ("pageSize", "1"),
                ])
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(LookupError::Status(status));
            }

            let body: SearchResponse = serde_json::from_slice(&response.bytes().await?)?;
            if let Some(food) = body.foods.into_iter().next() {
                info!(
                    "USDA match in {}: {}",
                    food.data_type.as_deref().unwrap_or(data_type),
                    food.description.as_deref().unwrap_or(query)
                );
                return Ok(Some(food));
            }
        }

        Ok(None)
    }
}
