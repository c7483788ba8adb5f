pub mod gemini;
pub mod groq;
pub mod traits;
pub mod utils;

use crate::config::{ProviderConfig, ProviderKind};
use anyhow::Result;
use std::sync::Arc;
use traits::CompletionProvider;

/// Build the configured provider behind a shared handle.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn CompletionProvider>> {
    Ok(match config.kind {
        ProviderKind::Groq => Arc::new(groq::GroqProvider::new(config)?),
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(config)?),
    })
}
