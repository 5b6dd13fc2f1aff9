use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::{Result, TubescrubError};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Delay before the single retry of a transient API failure
const RETRY_DELAY: Duration = Duration::from_secs(2);

const PROMPT_PREAMBLE: &str = "The following is a raw YouTube transcript. Rewrite it into clear, \
readable paragraphs: remove filler words, stutters, and other disfluencies, fix obvious \
transcription mistakes, and preserve the original meaning. Do not summarize and do not add \
commentary of your own.";

const TIMESTAMP_INSTRUCTION: &str = "Each transcript line starts with its timestamp. Begin each \
paragraph with the timestamp of its first line and drop all other timestamps.";

/// Generative rewrite of a raw transcript
///
/// Callers must not pass an empty transcript; the pipeline guards for that
/// before this trait is ever invoked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptCleaner: Send + Sync {
    /// Produce the cleaned transcript for a non-empty raw transcript
    async fn clean(&self, raw_transcript: &str) -> Result<String>;
}

/// Production cleaner backed by the Gemini `generateContent` endpoint
pub struct GeminiCleaner {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    retry_transient: bool,
    timestamped_input: bool,
}

impl GeminiCleaner {
    /// Build a cleaner with an explicitly injected credential
    pub fn new(client: Client, api_key: String, api: &ApiConfig, timestamped_input: bool) -> Self {
        Self {
            client,
            api_key,
            endpoint: api.endpoint.clone(),
            model: api.model.clone(),
            temperature: api.temperature,
            retry_transient: api.retry_transient,
            timestamped_input,
        }
    }

    async fn generate(&self, raw_transcript: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let prompt = build_prompt(raw_transcript, self.timestamped_input);

        tracing::debug!("Sending {} characters to model {}", prompt.len(), self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [{ "text": prompt }],
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                },
            }))
            .send()
            .await
            .map_err(|e| TubescrubError::ApiTransient {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TubescrubError::ApiTransient {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(classify_api_error(status, &api_error_message(&body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        extract_text(&parsed)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TubescrubError::UnexpectedResponse {
                service: "gemini",
                detail: "response contains no candidate text".to_string(),
            })
    }
}

#[async_trait]
impl TranscriptCleaner for GeminiCleaner {
    async fn clean(&self, raw_transcript: &str) -> Result<String> {
        match self.generate(raw_transcript).await {
            Err(TubescrubError::ApiTransient { message }) if self.retry_transient => {
                tracing::warn!("Transient cleaning API failure, retrying once: {}", message);
                tokio::time::sleep(RETRY_DELAY).await;
                self.generate(raw_transcript).await
            }
            other => other,
        }
    }
}

fn build_prompt(raw_transcript: &str, timestamped_input: bool) -> String {
    if timestamped_input {
        format!(
            "{} {}\n\nTranscript:\n{}",
            PROMPT_PREAMBLE, TIMESTAMP_INSTRUCTION, raw_transcript
        )
    } else {
        format!("{}\n\nTranscript:\n{}", PROMPT_PREAMBLE, raw_transcript)
    }
}

/// Gemini generateContent response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.as_ref()?.first()?;
    let content = candidate.content.as_ref()?;

    let text = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<String>()
        .trim()
        .to_string();

    Some(text)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Pull a human-readable message out of an API error body, falling back to
/// the body itself
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

/// Map an HTTP failure from the cleaning API onto the error taxonomy
fn classify_api_error(status: StatusCode, message: &str) -> TubescrubError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TubescrubError::ApiAuthentication {
            message: message.to_string(),
        },
        // An invalid key surfaces as 400 INVALID_ARGUMENT rather than 401
        StatusCode::BAD_REQUEST if message.contains("API key") => {
            TubescrubError::ApiAuthentication {
                message: message.to_string(),
            }
        }
        StatusCode::TOO_MANY_REQUESTS => TubescrubError::ApiQuotaExceeded {
            message: message.to_string(),
        },
        status if status.is_server_error() => TubescrubError::ApiTransient {
            message: format!("HTTP {}: {}", status, message),
        },
        status => TubescrubError::UnexpectedResponse {
            service: "gemini",
            detail: format!("HTTP {}: {}", status, message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_instruction_and_transcript() {
        let prompt = build_prompt("um so this is a test", false);
        assert!(prompt.starts_with(PROMPT_PREAMBLE));
        assert!(prompt.ends_with("Transcript:\num so this is a test"));
        assert!(!prompt.contains(TIMESTAMP_INSTRUCTION));
    }

    #[test]
    fn prompt_mentions_timestamps_for_timestamped_input() {
        let prompt = build_prompt("[0:00:00] um so", true);
        assert!(prompt.contains(TIMESTAMP_INSTRUCTION));
    }

    #[test]
    fn extracts_candidate_text_across_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"This is "},{"text":"a test."}],"role":"model"},"finishReason":"STOP"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_text(&parsed).unwrap(), "This is a test.");
    }

    #[test]
    fn empty_candidate_list_yields_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(extract_text(&parsed), None);
    }

    #[test]
    fn reads_message_from_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for requests","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(body), "Quota exceeded for requests");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }

    #[test]
    fn classifies_authentication_failures() {
        assert!(matches!(
            classify_api_error(StatusCode::UNAUTHORIZED, "no"),
            TubescrubError::ApiAuthentication { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::FORBIDDEN, "no"),
            TubescrubError::ApiAuthentication { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::BAD_REQUEST, "API key not valid"),
            TubescrubError::ApiAuthentication { .. }
        ));
    }

    #[test]
    fn classifies_quota_and_transient_failures() {
        assert!(matches!(
            classify_api_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            TubescrubError::ApiQuotaExceeded { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            TubescrubError::ApiTransient { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            TubescrubError::ApiTransient { .. }
        ));
    }

    #[test]
    fn other_client_errors_are_unexpected_responses() {
        assert!(matches!(
            classify_api_error(StatusCode::BAD_REQUEST, "malformed request"),
            TubescrubError::UnexpectedResponse { .. }
        ));
    }
}
