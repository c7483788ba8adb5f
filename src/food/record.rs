use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NONE_LISTED: &str = "None listed";
pub const UNKNOWN_QUANTITY: &str = "Unknown";

/// Dietary classification attached to every nutrition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dietary {
    #[serde(rename = "Vegan")]
    Vegan,
    #[serde(rename = "Vegetarian")]
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
    #[serde(rename = "Likely Vegan (please verify ingredients)")]
    LikelyVegan,
}

impl Dietary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dietary::Vegan => "Vegan",
            Dietary::Vegetarian => "Vegetarian",
            Dietary::NonVegetarian => "Non-Vegetarian",
            Dietary::LikelyVegan => "Likely Vegan (please verify ingredients)",
        }
    }
}

impl fmt::Display for Dietary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the vision model thinks is in the picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodGuess {
    pub name: String,
    pub quantity: String,
    pub raw_response: String,
}

/// Canonical nutrition data shared by both resolution paths.
///
/// The first nine fields are always populated. The optional block is only
/// filled by the food-name path, so templates and prompts can render any
/// record without caring where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub product_name: String,
    pub image_url: String,
    pub description: String,
    pub expiration_date: String,
    pub calories: String,
    pub allergens: String,
    pub important_ingredients: String,
    pub dietary: Dietary,
    pub ingredients: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The vision model's reply, kept for diagnostics.
    #[serde(
        rename = "gemini_raw_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vision_raw_response: Option<String>,
}

impl NutritionRecord {
    /// Record with every required field set to its placeholder.
    pub fn placeholder(product_name: impl Into<String>, dietary: Dietary) -> Self {
        Self {
            product_name: product_name.into(),
            image_url: String::new(),
            description: NOT_SPECIFIED.to_string(),
            expiration_date: NOT_SPECIFIED.to_string(),
            calories: NOT_SPECIFIED.to_string(),
            allergens: NONE_LISTED.to_string(),
            important_ingredients: NONE_LISTED.to_string(),
            dietary,
            ingredients: NOT_SPECIFIED.to_string(),
            protein: None,
            carbs: None,
            fat: None,
            fiber: None,
            sugar: None,
            sodium: None,
            quantity: None,
            source: None,
            note: None,
            vision_raw_response: None,
        }
    }

    /// True when the record came out of the degraded name-lookup path.
    pub fn is_fallback(&self) -> bool {
        self.note.is_some()
    }
}

/// Render a numeric nutrient the way the databases report it, without
/// trailing `.0` on whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rendered = format!("{:.2}", value);
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dietary_serializes_to_display_labels() {
        let json = serde_json::to_string(&Dietary::NonVegetarian).unwrap();
        assert_eq!(json, "\"Non-Vegetarian\"");
        let json = serde_json::to_string(&Dietary::LikelyVegan).unwrap();
        assert_eq!(json, "\"Likely Vegan (please verify ingredients)\"");
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let record = NutritionRecord::placeholder("Oat Bar", Dietary::Vegan);
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 9);
        assert_eq!(object["dietary"], "Vegan");
        assert!(!object.contains_key("note"));
    }

    #[test]
    fn amounts_drop_redundant_decimals() {
        assert_eq!(format_amount(165.0), "165");
        assert_eq!(format_amount(3.57), "3.57");
        assert_eq!(format_amount(0.5), "0.5");
    }
}
