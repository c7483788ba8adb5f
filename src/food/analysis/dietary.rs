use crate::food::record::Dietary;

const MEAT_KEYWORDS: &[&str] = &[
    "chicken", "beef", "pork", "fish", "meat", "lamb", "turkey", "bacon", "ham",
];

const DAIRY_KEYWORDS: &[&str] = &["cheese", "milk", "yogurt", "butter", "cream"];

/// Classify a packaged product from its label tags.
///
/// Precedence is vegan, then vegetarian, then non-vegetarian; the first
/// matching tag wins regardless of its position in the list.
pub fn classify_label_tags<S: AsRef<str>>(tags: &[S]) -> Dietary {
    let has = |wanted: &str| tags.iter().any(|t| t.as_ref() == wanted);

    if has("en:vegan") {
        Dietary::Vegan
    } else if has("en:vegetarian") {
        Dietary::Vegetarian
    } else {
        Dietary::NonVegetarian
    }
}

/// Guess the dietary type of a fresh food from its name alone.
///
/// Meat keywords are checked before dairy ones. Substring matching is
/// intentional, so "hamburger" counts as meat.
pub fn classify_food_name(food_name: &str) -> Dietary {
    let lower = food_name.to_lowercase();

    if MEAT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Dietary::NonVegetarian
    } else if DAIRY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Dietary::Vegetarian
    } else {
        Dietary::LikelyVegan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vegan_tag_beats_vegetarian() {
        let tags = ["en:vegetarian", "en:organic", "en:vegan"];
        assert_eq!(classify_label_tags(&tags), Dietary::Vegan);
    }

    #[test]
    fn vegetarian_tag_without_vegan() {
        let tags = vec!["en:no-gluten".to_string(), "en:vegetarian".to_string()];
        assert_eq!(classify_label_tags(&tags), Dietary::Vegetarian);
    }

    #[test]
    fn missing_tags_mean_non_vegetarian() {
        let tags: [&str; 0] = [];
        assert_eq!(classify_label_tags(&tags), Dietary::NonVegetarian);
    }

    #[test]
    fn meat_is_checked_before_dairy() {
        assert_eq!(classify_food_name("Chicken Alfredo with cream"), Dietary::NonVegetarian);
        assert_eq!(classify_food_name("Greek Yogurt"), Dietary::Vegetarian);
        assert_eq!(classify_food_name("apple slices"), Dietary::LikelyVegan);
    }
}
