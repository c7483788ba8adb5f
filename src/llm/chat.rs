use crate::food::record::NutritionRecord;
use crate::llm::prompts::{build_user_prompt, SYSTEM_PREAMBLE};
use crate::profile::UserProfile;
use crate::providers::traits::{CompletionProvider, CompletionRequest};
use log::{debug, error};
use std::sync::Arc;

pub const CHAT_UNAVAILABLE: &str =
    "Sorry, I couldn't come up with an answer right now. Please try again in a moment.";

/// Free-form questions about the scanned food, answered with the user's
/// profile and the current record as context.
#[derive(Clone)]
pub struct ChatAssistant {
    provider: Arc<dyn CompletionProvider>,
    max_question_length: usize,
}

impl ChatAssistant {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            max_question_length: 1000,
        }
    }

    /// `None` if the question is blank or the model call fails.
    pub async fn answer(
        &self,
        profile: &UserProfile,
        record: Option<&NutritionRecord>,
        question: &str,
    ) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let question: String = question.chars().take(self.max_question_length).collect();

        let prompt = build_user_prompt(Some(profile), record, &question);
        debug!("Chat prompt:\n{}", prompt);

        let request = CompletionRequest::text(prompt).with_system(SYSTEM_PREAMBLE);
        match self.provider.complete(&request).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                error!("Chat error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionProvider for Recording {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.prompts.lock().push(request.clone());
            Ok("Sure!".to_string())
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("recording".to_string())
        }
    }

    #[tokio::test]
    async fn question_reaches_model_with_persona() {
        let provider = Arc::new(Recording::default());
        let chat = ChatAssistant::new(provider.clone());
        let profile = UserProfile::from_fields([("allergens", "gluten")]);

        let answer = chat.answer(&profile, None, "  Can I eat bread? ").await;
        assert_eq!(answer.as_deref(), Some("Sure!"));

        let prompts = provider.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].system.as_deref(), Some(SYSTEM_PREAMBLE));
        assert!(prompts[0].prompt.contains("- Allergies: gluten"));
        assert!(prompts[0].prompt.ends_with("User Question: Can I eat bread?\n"));
    }

    #[tokio::test]
    async fn blank_question_skips_the_model() {
        let provider = Arc::new(Recording::default());
        let chat = ChatAssistant::new(provider.clone());
        assert!(chat.answer(&UserProfile::new(), None, "   ").await.is_none());
        assert!(provider.prompts.lock().is_empty());
    }
}
