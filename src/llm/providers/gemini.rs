use crate::config::LlmConfig;
use crate::llm::{EMPTY_RESPONSE_FALLBACK, LlmError, SqlGenerator, prompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Adapter for the Gemini generative-content API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.gemini_url.clone(),
            api_key: api_key.to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn text_payload(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl SqlGenerator for GeminiProvider {
    async fn generate_sql(&self, question: &str, columns: &[String]) -> Result<String, LlmError> {
        let prompt = prompt::build_prompt(question, columns);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        info!("Sending request to Gemini with model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ResponseError(format!(
                "Gemini API responded with status code: {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(e.to_string()))?;

        match Self::text_payload(body) {
            Some(text) if !text.trim().is_empty() => {
                debug!("Gemini returned {} bytes of text", text.len());
                Ok(text)
            }
            _ => Ok(EMPTY_RESPONSE_FALLBACK.to_string()),
        }
    }
}
