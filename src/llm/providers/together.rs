use crate::config::LlmConfig;
use crate::llm::{EMPTY_RESPONSE_FALLBACK, LlmError, SqlGenerator, prompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

// Completion budget for Together only; the other backends are uncapped.
// The asymmetry is inherited behavior, do not unify silently.
const MAX_TOKENS: usize = 200;

/// Adapter for the Together completion API.
pub struct TogetherProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: Option<String>,
}

impl TogetherProvider {
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.together_url.clone(),
            api_key: api_key.to_string(),
            model: config.together_model.clone(),
        })
    }

    fn text_payload(response: CompletionResponse) -> Option<String> {
        response.choices.into_iter().next()?.text
    }
}

#[async_trait]
impl SqlGenerator for TogetherProvider {
    async fn generate_sql(&self, question: &str, columns: &[String]) -> Result<String, LlmError> {
        let prompt = prompt::build_prompt(question, columns);

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            max_tokens: MAX_TOKENS,
        };

        info!("Sending request to Together with model: {}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ResponseError(format!(
                "Together API responded with status code: {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(e.to_string()))?;

        match Self::text_payload(body) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Ok(EMPTY_RESPONSE_FALLBACK.to_string()),
        }
    }
}
