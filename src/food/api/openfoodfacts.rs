use super::{http_client, LookupError};
use crate::food::analysis::dietary::classify_label_tags;
use crate::food::config::FoodConfig;
use crate::food::record::{format_amount, NutritionRecord, NONE_LISTED, NOT_SPECIFIED};
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ingredients estimated at or below this share of the product are not
/// considered important.
const IMPORTANT_INGREDIENT_PERCENT: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status_verbose: Option<String>,
    #[serde(default)]
    product: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    product_name: Option<String>,
    image_url: Option<String>,
    generic_name: Option<String>,
    expiration_date: Option<String>,
    ingredients_text: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    nutriments: Nutriments,
    #[serde(deserialize_with = "null_as_default")]
    allergens_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    labels_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    ingredients: Vec<Ingredient>,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_number")]
    energy_kcal_100g: Option<f64>,
}

/// One entry of the product's parsed ingredient list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_estimate: Option<f64>,
}

/// Explicit `null` is treated like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The database is inconsistent about numbers: accept `12.5`, `"12.5"` or nothing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Names of ingredients estimated above 5% of the product, in source order.
/// A missing estimate counts as zero.
pub fn important_ingredients(ingredients: &[Ingredient]) -> Vec<String> {
    ingredients
        .iter()
        .filter(|i| i.percent_estimate.unwrap_or(0.0) > IMPORTANT_INGREDIENT_PERCENT)
        .filter_map(|i| i.text.as_deref().map(str::trim))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn join_or(items: &[String], default: &str) -> String {
    if items.is_empty() {
        default.to_string()
    } else {
        items.join(", ")
    }
}

fn normalize_product(product: Product) -> NutritionRecord {
    let important = important_ingredients(&product.ingredients);
    let all_ingredients: Vec<String> = product
        .ingredients
        .iter()
        .filter_map(|i| i.text.clone())
        .filter(|t| !t.trim().is_empty())
        .collect();
    let ingredients = match product.ingredients_text {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => join_or(&all_ingredients, NOT_SPECIFIED),
    };

    let mut record = NutritionRecord::placeholder(
        text_or(product.product_name, "Unknown Product"),
        classify_label_tags(&product.labels_tags),
    );
    record.image_url = product.image_url.unwrap_or_default();
    record.description = text_or(product.generic_name, "No description available");
    record.expiration_date = text_or(product.expiration_date, NOT_SPECIFIED);
    record.calories = product
        .nutriments
        .energy_kcal_100g
        .map(format_amount)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    record.allergens = join_or(&product.allergens_tags, NONE_LISTED);
    record.important_ingredients = join_or(&important, NONE_LISTED);
    record.ingredients = ingredients;
    record
}

/// Decoded symbols are untrusted (QR payloads can hold any text), so the
/// code is encoded as a single path segment.
fn product_url(base_url: &str, barcode: &str) -> String {
    format!(
        "{}/api/v0/product/{}.json",
        base_url,
        urlencoding::encode(barcode)
    )
}

/// Barcode lookups against the Open Food Facts product database.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &FoodConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            base_url: config.openfoodfacts_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look a barcode up and normalize the product.
    ///
    /// Non-200 responses, empty products and transport errors all come back
    /// as `None` so the caller can report "no product found".
    pub async fn lookup(&self, barcode: &str) -> Option<NutritionRecord> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return None;
        }

        match self.fetch_product(barcode).await {
            Ok(Some(product)) => {
                let record = normalize_product(product);
                info!("Product found: {}", record.product_name);
                Some(record)
            }
            Ok(None) => {
                warn!("Product data is empty for barcode {}", barcode);
                None
            }
            Err(e) => {
                error!("Error fetching nutritional data for {}: {}", barcode, e);
                None
            }
        }
    }

    async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, LookupError> {
        let url = product_url(&self.base_url, barcode);
        info!("Fetching nutritional data for barcode: {}", barcode);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status));
        }

        let body: ProductResponse = serde_json::from_slice(&response.bytes().await?)?;
        info!(
            "Open Food Facts response: {}",
            body.status_verbose.as_deref().unwrap_or("No status")
        );

        match body.product {
            Some(Value::Object(map)) if !map.is_empty() => {
                Ok(Some(serde_json::from_value(Value::Object(map))?))
            }
            _ => Ok(None),
        }
    }
}
