use crate::food::record::{FoodGuess, UNKNOWN_QUANTITY};
use crate::providers::traits::{CompletionProvider, CompletionRequest};
use log::{error, info, warn};
use std::sync::Arc;

const IDENTIFY_PROMPT: &str = "Analyze this food image and provide:
1. The name of the food item(s) you see
2. Estimated portion size or quantity (in grams if possible)
3. If multiple items, list each separately

Format your response as:
Food: [food name]
Quantity: [estimated amount in grams]

If you see multiple items, separate each with a newline.
Be specific (e.g., \"grilled chicken breast\" not just \"chicken\").
";

const VISION_TEMPERATURE: f32 = 0.4;
const VISION_MAX_TOKENS: u32 = 500;

/// Turn the model's reply into a guess.
///
/// Only the first `Food:` line is used even when the model lists several
/// items, and only a `Quantity:` line after it counts. Without any `Food:`
/// line the whole reply becomes the name. An empty reply yields `None`.
pub fn parse_food_reply(reply: &str) -> Option<FoodGuess> {
    let mut name: Option<String> = None;
    let mut quantity: Option<String> = None;

    for line in reply.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Food:") {
            if name.is_none() {
                name = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Quantity:") {
            if name.is_some() {
                quantity = Some(rest.trim().to_string());
                break;
            }
        }
    }

    let quantity = quantity
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| UNKNOWN_QUANTITY.to_string());

    match name.filter(|n| !n.is_empty()) {
        Some(name) => {
            info!("Parsed main food: {} ({})", name, quantity);
            Some(FoodGuess {
                name,
                quantity,
                raw_response: reply.to_string(),
            })
        }
        None => {
            let whole = reply.trim();
            if whole.is_empty() {
                return None;
            }
            warn!("Could not parse structured response, using entire text");
            Some(FoodGuess {
                name: whole.to_string(),
                quantity: UNKNOWN_QUANTITY.to_string(),
                raw_response: reply.to_string(),
            })
        }
    }
}

/// Asks a multimodal model what food is in a photo.
#[derive(Clone)]
pub struct FoodIdentifier {
    provider: Arc<dyn CompletionProvider>,
}

impl FoodIdentifier {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// `None` when the model call fails or says nothing usable.
    pub async fn identify(&self, image: &[u8]) -> Option<FoodGuess> {
        let request = CompletionRequest::text(IDENTIFY_PROMPT)
            .with_image(image.to_vec())
            .with_sampling(VISION_TEMPERATURE, VISION_MAX_TOKENS);

        info!("Sending image to vision model...");
        match self.provider.complete(&request).await {
            Ok(reply) => {
                info!("Vision response:\n{}", reply);
                parse_food_reply(&reply)
            }
            Err(e) => {
                error!("Error in vision recognition: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    #[test]
    fn first_food_line_wins() {
        let reply = "Food: grilled chicken breast\nQuantity: 150g\nFood: rice\nQuantity: 200g";
        let guess = parse_food_reply(reply).unwrap();
        assert_eq!(guess.name, "grilled chicken breast");
        assert_eq!(guess.quantity, "150g");
        assert_eq!(guess.raw_response, reply);
    }

    #[test]
    fn quantity_before_food_is_ignored() {
        let guess = parse_food_reply("Quantity: 500g\nFood: banana\n").unwrap();
        assert_eq!(guess.name, "banana");
        assert_eq!(guess.quantity, "Unknown");

        let guess = parse_food_reply("Quantity: 500g\n  Food: banana\n  Quantity: 120g").unwrap();
        assert_eq!(guess.quantity, "120g");
    }

    #[test]
    fn unstructured_reply_becomes_the_name() {
        let guess = parse_food_reply("  A bowl of ramen  \n").unwrap();
        assert_eq!(guess.name, "A bowl of ramen");
        assert_eq!(guess.quantity, "Unknown");
    }

    #[test]
    fn blank_reply_is_no_guess() {
        assert!(parse_food_reply("   \n").is_none());
    }

    struct Failing;

    #[async_trait]
    impl CompletionProvider for Failing {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(anyhow!("timeout"))
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("failing".to_string())
        }
    }

    struct Echo(&'static str);

    #[async_trait]
    impl CompletionProvider for Echo {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            assert!(request.image.is_some());
            assert_eq!(request.max_tokens, 500);
            Ok(self.0.to_string())
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("echo".to_string())
        }
    }

    #[tokio::test]
    async fn provider_failure_is_no_guess() {
        let identifier = FoodIdentifier::new(Arc::new(Failing));
        assert!(identifier.identify(b"jpeg").await.is_none());
    }

    #[tokio::test]
    async fn identify_sends_image_and_parses() {
        let identifier = FoodIdentifier::new(Arc::new(Echo("Food: oatmeal\nQuantity: 250g")));
        let guess = identifier.identify(b"jpeg").await.unwrap();
        assert_eq!(guess.name, "oatmeal");
        assert_eq!(guess.quantity, "250g");
    }
}
