use crate::food::record::{NutritionRecord, NONE_LISTED, NOT_SPECIFIED};
use crate::llm::prompts::{build_user_prompt, Section, SYSTEM_PREAMBLE};
use crate::profile::UserProfile;
use crate::providers::traits::{CompletionProvider, CompletionRequest};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

/// Product-page analyses. The two personalized ones may be missing; the
/// other three always hold either generated text or a value taken straight
/// from the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sections {
    pub summary: Option<String>,
    pub alternatives: Option<String>,
    pub ingredients: String,
    pub allergens: String,
    pub calories: String,
}

fn non_blank_or(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Local stand-in for a section whose generation failed.
pub fn degraded_section(section: Section, record: &NutritionRecord) -> Option<String> {
    match section {
        Section::Summary | Section::Alternatives => None,
        Section::Ingredients => Some(non_blank_or(&record.important_ingredients, NOT_SPECIFIED)),
        Section::Allergens => Some(non_blank_or(&record.allergens, NONE_LISTED)),
        Section::Calories => Some(format!(
            "{} kcal per 100g",
            non_blank_or(&record.calories, NOT_SPECIFIED)
        )),
    }
}

#[derive(Clone)]
pub struct SectionGateway {
    provider: Arc<dyn CompletionProvider>,
}

impl SectionGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Generate all five sections at once. Each call is independent, so a
    /// failure only degrades its own section.
    pub async fn synthesize_sections(
        &self,
        profile: &UserProfile,
        record: &NutritionRecord,
    ) -> Sections {
        let (summary, alternatives, ingredients, allergens, calories) = futures::join!(
            self.generate(Section::Summary, profile, record),
            self.generate(Section::Alternatives, profile, record),
            self.generate(Section::Ingredients, profile, record),
            self.generate(Section::Allergens, profile, record),
            self.generate(Section::Calories, profile, record),
        );

        let required = |generated: Option<String>, section: Section| {
            generated
                .or_else(|| degraded_section(section, record))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string())
        };

        Sections {
            summary,
            alternatives,
            ingredients: required(ingredients, Section::Ingredients),
            allergens: required(allergens, Section::Allergens),
            calories: required(calories, Section::Calories),
        }
    }

    async fn generate(
        &self,
        section: Section,
        profile: &UserProfile,
        record: &NutritionRecord,
    ) -> Option<String> {
        let profile = section.is_personalized().then_some(profile);
        let request = CompletionRequest::text(build_user_prompt(
            profile,
            Some(record),
            section.instruction(),
        ))
        .with_system(SYSTEM_PREAMBLE);

        match self.provider.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("Generated {} section for {}", section, record.product_name);
                Some(text)
            }
            Ok(_) => {
                error!("Empty {} section from model", section);
                None
            }
            Err(e) => {
                error!("Error generating {} section: {}", section, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::record::Dietary;

    #[test]
    fn degraded_values_come_from_the_record() {
        let mut record = NutritionRecord::placeholder("Cola", Dietary::Vegan);
        record.important_ingredients = "sugar".to_string();
        record.allergens = String::new();
        record.calories = "42".to_string();

        assert_eq!(degraded_section(Section::Summary, &record), None);
        assert_eq!(degraded_section(Section::Alternatives, &record), None);
        assert_eq!(degraded_section(Section::Ingredients, &record).as_deref(), Some("sugar"));
        assert_eq!(degraded_section(Section::Allergens, &record).as_deref(), Some("None listed"));
        assert_eq!(
            degraded_section(Section::Calories, &record).as_deref(),
            Some("42 kcal per 100g")
        );
    }
}
