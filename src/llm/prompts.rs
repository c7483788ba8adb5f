use crate::food::record::NutritionRecord;
use crate::profile::UserProfile;
use std::fmt;

/// Persona and formatting rules shared by every prompt.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful nutritional assistant that provides personalized recommendations \
about food items based on personal information and user queries. \
Keep responses concise (around 150 words). \
Use markdown formatting: **bold** for important terms (nutrients, food names, allergens), \
bullet points (-) for lists, and clear structure. \
Never provide any links to images. \
You are KenShoku AI.";

const SUMMARY_PROMPT: &str = "Based on this person's profile and the food item, provide a brief personalized analysis (max 100 words):
- Is this food good for their health goals?
- Any concerns based on their allergies or dietary preferences?
- Brief recommendation.

Use **bold** for important nutrients, allergens, or food names. Keep it friendly and concise.";

const ALTERNATIVES_PROMPT: &str = "Based on the scanned food and user's profile, suggest alternatives (max 120 words):

If the food is already healthy for their goals: Start with \"This food is good enough, no alternatives needed. But if you want variety, try:\" then list 2-3 similar healthy options.

If the food is unhealthy or doesn't align with their goals: Suggest 3-4 better alternatives that match their dietary preferences and health goals.

Format with **bold** food names and brief explanation why each alternative is better.";

const INGREDIENTS_PROMPT: &str = "Provide detailed information about the key ingredients in this food (max 100 words):
- List main ingredients with **bold** names
- Brief health benefits or concerns for each
- Note any processing or additives if applicable

Format with bullet points.";

const ALLERGENS_PROMPT: &str = "Provide comprehensive allergen information for this food (max 80 words):
- List all potential allergens with **bold** names
- Include common cross-contamination risks
- Note hidden allergens in processing

If no allergens: Say \"No major allergens detected, but always check labels for cross-contamination\"";

const CALORIES_PROMPT: &str = "Provide detailed calorie and macronutrient breakdown (max 100 words):
- Total calories per serving with **bold** number
- Breakdown: **Protein**, **Carbs**, **Fats** with amounts
- Compare to daily recommended intake
- Note if high/low in any macronutrient

Format clearly with bullet points.";

/// The five independent analyses shown on the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    Alternatives,
    Ingredients,
    Allergens,
    Calories,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Summary,
        Section::Alternatives,
        Section::Ingredients,
        Section::Allergens,
        Section::Calories,
    ];

    pub fn instruction(&self) -> &'static str {
        match self {
            Section::Summary => SUMMARY_PROMPT,
            Section::Alternatives => ALTERNATIVES_PROMPT,
            Section::Ingredients => INGREDIENTS_PROMPT,
            Section::Allergens => ALLERGENS_PROMPT,
            Section::Calories => CALORIES_PROMPT,
        }
    }

    /// Only the summary and alternatives look at the user's profile; the
    /// other three describe the food itself.
    pub fn is_personalized(&self) -> bool {
        matches!(self, Section::Summary | Section::Alternatives)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Summary => "summary",
            Section::Alternatives => "alternatives",
            Section::Ingredients => "ingredients",
            Section::Allergens => "allergens",
            Section::Calories => "calories",
        };
        f.write_str(name)
    }
}

/// "Food Item Information" block, empty when the record has nothing to say.
pub fn product_context(record: &NutritionRecord) -> String {
    let dietary = record.dietary.to_string();
    let lines = [
        ("Food", Some(record.product_name.as_str())),
        ("Quantity", record.quantity.as_deref()),
        ("Calories", Some(record.calories.as_str())),
        ("Allergens", Some(record.allergens.as_str())),
        ("Dietary type", Some(dietary.as_str())),
    ];

    let present: Vec<(&str, &str)> = lines
        .iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (*label, v))
        })
        .collect();
    if present.is_empty() {
        return String::new();
    }

    let mut context = String::from("Food Item Information:\n");
    for (label, value) in present {
        context.push_str(&format!("- {}: {}\n", label, value));
    }
    context.push('\n');
    context
}

/// User message: optional personal block, optional product block, then the request.
pub fn build_user_prompt(
    profile: Option<&UserProfile>,
    record: Option<&NutritionRecord>,
    question: &str,
) -> String {
    let personal = profile.map(UserProfile::generate_context).unwrap_or_default();
    let product = record.map(product_context).unwrap_or_default();
    format!("{}{}User Question: {}\n", personal, product, question)
}
