pub mod prompt;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Returned as a successful result when a backend answers with an empty
/// payload. The caller treats it like any other generated statement.
pub const EMPTY_RESPONSE_FALLBACK: &str = "Error generating SQL.";

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

/// The closed set of SQL-generation backends the tool can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Gemini,
    Together,
    Agentic,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => write!(f, "gemini"),
            Backend::Together => write!(f, "together"),
            Backend::Agentic => write!(f, "agentic"),
        }
    }
}

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, question: &str, columns: &[String]) -> Result<String, LlmError>;
}

/// Owns the adapter for the currently selected backend.
///
/// Selecting a backend builds a fresh manager; the previous adapter and its
/// credential are dropped with it, nothing carries over.
pub struct LlmManager {
    backend: Backend,
    generator: Box<dyn SqlGenerator + Send + Sync>,
}

impl LlmManager {
    pub fn new(backend: Backend, api_key: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::ConfigError(
                "API key is required to configure a backend".to_string(),
            ));
        }

        let generator: Box<dyn SqlGenerator + Send + Sync> = match backend {
            Backend::Gemini => Box::new(providers::gemini::GeminiProvider::new(api_key, config)?),
            Backend::Together => {
                Box::new(providers::together::TogetherProvider::new(api_key, config)?)
            }
            Backend::Agentic => {
                Box::new(providers::agentic::AgenticProvider::new(api_key, config)?)
            }
        };

        Ok(Self { backend, generator })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub async fn generate_sql(
        &self,
        question: &str,
        columns: &[String],
    ) -> Result<String, LlmError> {
        self.generator.generate_sql(question, columns).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn empty_api_key_is_a_config_error() {
        let config = AppConfig::default().llm;
        let result = LlmManager::new(Backend::Gemini, "  ", &config);
        assert!(matches!(result, Err(LlmError::ConfigError(_))));
    }

    #[test]
    fn selecting_a_backend_configures_exactly_that_backend() {
        let config = AppConfig::default().llm;
        let manager = LlmManager::new(Backend::Together, "test-key", &config).unwrap();
        assert_eq!(manager.backend(), Backend::Together);

        // Re-configuring replaces the manager wholesale
        let manager = LlmManager::new(Backend::Agentic, "other-key", &config).unwrap();
        assert_eq!(manager.backend(), Backend::Agentic);
    }

    #[test]
    fn backend_tags_deserialize_lowercase() {
        let backend: Backend = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(backend, Backend::Gemini);
        assert!(serde_json::from_str::<Backend>("\"mistral\"").is_err());
    }
}
