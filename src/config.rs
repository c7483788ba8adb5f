use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(String),
    #[error("unknown LLM provider '{0}', expected 'groq' or 'gemini'")]
    UnknownProvider(String),
}

/// Which hosted model family answers prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Groq,
    Gemini,
}

impl ProviderKind {
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ",
            ProviderKind::Gemini => "GEMINI",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Groq => f.write_str("groq"),
            ProviderKind::Gemini => f.write_str("gemini"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub api_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env(kind: ProviderKind) -> Result<Self, ConfigError> {
        let prefix = kind.env_prefix();

        let api_key = env::var(format!("{}_API_KEY", prefix))
            .map_err(|_| ConfigError::MissingVar(format!("{}_API_KEY", prefix)))?;

        let defaults = Self::defaults(kind, api_key);

        let timeout = env::var(format!("{}_TIMEOUT_SECS", prefix))
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            api_url: env::var(format!("{}_API_URL", prefix)).unwrap_or(defaults.api_url),
            chat_model: env::var(format!("{}_CHAT_MODEL", prefix)).unwrap_or(defaults.chat_model),
            vision_model: env::var(format!("{}_VISION_MODEL", prefix))
                .unwrap_or(defaults.vision_model),
            timeout,
            ..defaults
        })
    }

    /// Built-in endpoint and model choices for a provider.
    pub fn defaults(kind: ProviderKind, api_key: String) -> Self {
        let (api_url, chat_model, vision_model) = match kind {
            ProviderKind::Groq => (
                "https://api.groq.com/openai/v1/chat/completions",
                "llama-3.3-70b-versatile",
                "meta-llama/llama-4-scout-17b-16e-instruct",
            ),
            ProviderKind::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta/models",
                "gemini-2.0-flash",
                "gemini-2.0-flash",
            ),
        };

        Self {
            kind,
            api_key,
            api_url: api_url.to_string(),
            chat_model: chat_model.to_string(),
            vision_model: vision_model.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" groq ".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn groq_defaults_use_separate_vision_model() {
        let config = ProviderConfig::defaults(ProviderKind::Groq, "key".to_string());
        assert_ne!(config.chat_model, config.vision_model);
        assert!(config.api_url.ends_with("/chat/completions"));
    }
}
