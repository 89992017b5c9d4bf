//! Gemini client implementing [`ModelProvider`].
//!
//! Behaviour:
//! - One non-streaming `POST /v1beta/models/{model}:generateContent` per utterance.
//! - The persona is sent as `systemInstruction`; prior turns and the new
//!   utterance are sent as `contents`, in order.
//! - The reply is the first candidate's text parts (thought parts are skipped).

use std::iter;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::core::config::ProviderConfig;
use crate::conversation::core::transcript::{Role, Turn};
use crate::llm::provider::{ModelProvider, ProviderError, ProviderFuture};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// TCP connect timeout; the overall timeout comes from configuration.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Async Gemini client holding the persona applied to every conversation.
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    system_prompt: String,
}

impl GeminiProvider {
    /// Create a client from provider settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }

    async fn post_generate(
        &self,
        history: &[Turn],
        message: &str,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let request = build_request(&self.system_prompt, history, message);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(map_transport_error)
    }
}

impl ModelProvider for GeminiProvider {
    fn generate<'a>(
        &'a self,
        history: &'a [Turn],
        message: &'a str,
    ) -> ProviderFuture<'a, Result<Turn, ProviderError>> {
        Box::pin(async move {
            let response = self.post_generate(history, message).await?;
            reply_from_response(response)
        })
    }
}

fn build_request<'a>(
    system_prompt: &'a str,
    history: &'a [Turn],
    message: &'a str,
) -> GenerateContentRequest<'a> {
    let prior = history.iter().map(|turn| Content {
        role: turn.role.as_str(),
        parts: turn.parts.iter().map(|text| Part { text }).collect(),
    });
    let current = Content {
        role: Role::User.as_str(),
        parts: vec![Part { text: message }],
    };

    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: system_prompt,
            }],
        },
        contents: prior.chain(iter::once(current)).collect(),
    }
}

fn reply_from_response(response: GenerateContentResponse) -> Result<Turn, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ProviderError::Blocked(reason));
    };

    let parts: Vec<String> = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if parts.is_empty() {
        tracing::warn!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Gemini candidate carried no text"
        );
        return Err(ProviderError::EmptyReply);
    }

    Ok(Turn::model(parts))
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(err)
    }
}
