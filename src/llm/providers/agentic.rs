use crate::config::LlmConfig;
use crate::llm::{EMPTY_RESPONSE_FALLBACK, LlmError, SqlGenerator, prompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Adapter for the agent-style OpenAI-compatible completion API.
///
/// The HTTP client is built once when the backend is configured and reused
/// for every generation in the session. Unlike the Together adapter there is
/// no token cap on completions.
pub struct AgenticProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
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

impl AgenticProvider {
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.agentic_url.clone(),
            api_key: api_key.to_string(),
            model: config.agentic_model.clone(),
        })
    }

    fn text_payload(response: CompletionResponse) -> Option<String> {
        response.choices.into_iter().next()?.text
    }
}

#[async_trait]
impl SqlGenerator for AgenticProvider {
    async fn generate_sql(&self, question: &str, columns: &[String]) -> Result<String, LlmError> {
        let prompt = prompt::build_prompt(question, columns);

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
        };

        info!("Sending request to agentic backend with model: {}", self.model);

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
                "Agentic API responded with status code: {}",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_no_token_cap() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo-instruct".to_string(),
            prompt: "p".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn null_text_yields_no_payload() {
        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"text":null}]}"#).unwrap();
        assert_eq!(AgenticProvider::text_payload(body), None);
    }
}
