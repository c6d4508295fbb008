//! Summarisation request: one prompt in, one summary (or typed failure) out.
//!
//! [`SummaryBackend`] is the seam the controller talks to. [`GeminiClient`]
//! implements it against the `generateContent` method of the Google
//! generative-language API.
//!
//! ## Response classification
//!
//! The body is decoded once into [`GenerateContentResponse`] and classified
//! into a [`GenerateOutcome`], in this order:
//!
//! 1. 2xx with `candidates[0].content.parts[0].text` → [`GenerateOutcome::Summary`]
//! 2. `error.message` → [`GenerateOutcome::ApiError`]
//! 3. `promptFeedback.blockReason` → [`GenerateOutcome::Blocked`]
//! 4. 2xx with no candidates → [`GenerateOutcome::NoCandidates`]
//! 5. anything else → [`GenerateOutcome::Unexpected`]
//!
//! There is no retry: a failed request is reported and the user decides
//! whether to try again.

use crate::config::SummarizerConfig;
use crate::error::SummarizerError;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A service that turns a prompt into generated text.
pub trait SummaryBackend: Send + Sync {
    /// Perform exactly one request for `prompt`.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, SummarizerError>>;
}

// ── Wire schema ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    /// A single user turn carrying `prompt`.
    pub fn single_turn(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Every shape a `generateContent` response can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Summary(String),
    ApiError(String),
    Blocked(String),
    NoCandidates,
    Unexpected(String),
}

/// `finishReason` values that mean the candidate was withheld by a content filter.
const BLOCK_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "RECITATION",
];

impl GenerateContentResponse {
    /// Finish reason of a text-less first candidate, when it names a block.
    fn candidate_block_reason(&self) -> Option<String> {
        let reason = self
            .candidates
            .as_ref()?
            .first()?
            .finish_reason
            .as_deref()?;
        BLOCK_FINISH_REASONS
            .contains(&reason)
            .then(|| reason.to_string())
    }

    fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    /// Classify a decoded body. `http_ok` is whether the status was 2xx.
    pub fn into_outcome(self, http_ok: bool) -> GenerateOutcome {
        if http_ok {
            if let Some(text) = self.first_text() {
                return GenerateOutcome::Summary(text.to_string());
            }
        }
        if let Some(message) = self.error.as_ref().and_then(|e| e.message.clone()) {
            return GenerateOutcome::ApiError(message);
        }
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return GenerateOutcome::Blocked(reason);
        }
        if let Some(reason) = self.candidate_block_reason() {
            return GenerateOutcome::Blocked(reason);
        }
        let candidate_count = self.candidates.as_ref().map_or(0, Vec::len);
        if http_ok && candidate_count == 0 {
            return GenerateOutcome::NoCandidates;
        }
        let detail = match (http_ok, self.candidates.as_deref().and_then(<[_]>::first)) {
            (false, _) => "non-success status without an error message".to_string(),
            (true, Some(c)) => format!(
                "first candidate has no text (finishReason: {})",
                c.finish_reason.as_deref().unwrap_or("none")
            ),
            (true, None) => "empty candidate list".to_string(),
        };
        GenerateOutcome::Unexpected(detail)
    }
}

/// Decode a raw response body and classify it.
pub fn classify_response(http_ok: bool, body: &[u8]) -> GenerateOutcome {
    match serde_json::from_slice::<GenerateContentResponse>(body) {
        Ok(response) => response.into_outcome(http_ok),
        Err(e) => GenerateOutcome::Unexpected(format!("body is not a valid response: {e}")),
    }
}

impl GenerateOutcome {
    /// The summary text, or the matching [`SummarizerError`].
    pub fn into_result(self) -> Result<String, SummarizerError> {
        match self {
            GenerateOutcome::Summary(text) => Ok(text),
            GenerateOutcome::ApiError(message) => Err(SummarizerError::ApiError { message }),
            GenerateOutcome::Blocked(reason) => Err(SummarizerError::Blocked { reason }),
            GenerateOutcome::NoCandidates => Err(SummarizerError::NoCandidates),
            GenerateOutcome::Unexpected(detail) => {
                Err(SummarizerError::UnexpectedResponse { detail })
            }
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────

static RE_API_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"key=[^&\s)]*").unwrap());

/// Replace the value of any `key=` query parameter with `***`.
pub fn redact_key(s: &str) -> String {
    RE_API_KEY.replace_all(s, "key=***").into_owned()
}

/// [`SummaryBackend`] for the Google generative-language API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from the session configuration.
    ///
    /// A timeout is only installed when `request_timeout_secs` is set.
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| SummarizerError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request URL, including the access key.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.model, self.api_key
        )
    }

    async fn request(&self, prompt: &str) -> Result<String, SummarizerError> {
        let start = Instant::now();
        let body = GenerateContentRequest::single_turn(prompt);
        debug!(
            "POST {} ({} prompt chars)",
            redact_key(&self.endpoint_url()),
            prompt.chars().count()
        );

        let response = self
            .http
            .post(self.endpoint_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let detail = redact_key(&e.to_string());
                warn!("Summarization request failed: {}", detail);
                SummarizerError::Network { detail }
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            let detail = redact_key(&e.to_string());
            warn!("Reading summarization response failed: {}", detail);
            SummarizerError::Network { detail }
        })?;

        let outcome = classify_response(status.is_success(), &bytes);
        match &outcome {
            GenerateOutcome::Summary(text) => info!(
                "Summary received: {} chars in {}ms",
                text.chars().count(),
                start.elapsed().as_millis()
            ),
            other => warn!("Summarization failed (HTTP {}): {:?}", status.as_u16(), other),
        }
        outcome.into_result()
    }
}

impl SummaryBackend for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, SummarizerError>> {
        Box::pin(self.request(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest::single_turn("Summarize the following text:\n\nhi");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "Summarize the following text:\n\nhi" }] }]
            })
        );
    }

    #[test]
    fn success_uses_first_candidate_part() {
        let body = br#"{"candidates":[
            {"content":{"parts":[{"text":"A short summary."},{"text":"ignored"}]}},
            {"content":{"parts":[{"text":"second"}]}}
        ]}"#;
        assert_eq!(
            classify_response(true, body),
            GenerateOutcome::Summary("A short summary.".into())
        );
    }

    #[test]
    fn explicit_error_wins_over_everything_else() {
        let body = br#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"},
                        "promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            classify_response(false, body),
            GenerateOutcome::ApiError("API key not valid.".into())
        );
    }

    #[test]
    fn block_reason_is_reported() {
        let body = br#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            classify_response(true, body),
            GenerateOutcome::Blocked("SAFETY".into())
        );
    }

    #[test]
    fn zero_candidates() {
        assert_eq!(
            classify_response(true, br#"{"candidates":[]}"#),
            GenerateOutcome::NoCandidates
        );
        assert_eq!(classify_response(true, b"{}"), GenerateOutcome::NoCandidates);
    }

    #[test]
    fn filtered_candidate_is_blocked() {
        for reason in ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "RECITATION"] {
            let body = format!(r#"{{"candidates":[{{"finishReason":"{reason}","index":0}}]}}"#);
            let outcome = classify_response(true, body.as_bytes());
            assert_eq!(outcome, GenerateOutcome::Blocked(reason.into()));
            assert_eq!(
                outcome.into_result().unwrap_err().to_string(),
                format!("The request was blocked: {reason}")
            );
        }
    }

    #[test]
    fn candidate_without_text_for_other_reasons_is_unexpected() {
        let body = br#"{"candidates":[{"finishReason":"OTHER"}]}"#;
        assert!(matches!(
            classify_response(true, body),
            GenerateOutcome::Unexpected(d) if d.contains("OTHER")
        ));
        assert!(matches!(
            classify_response(true, br#"{"candidates":[{}]}"#),
            GenerateOutcome::Unexpected(d) if d.contains("none")
        ));
    }

    #[test]
    fn error_message_wins_over_filtered_candidate() {
        let body = br#"{"error":{"message":"quota"},"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert_eq!(
            classify_response(false, body),
            GenerateOutcome::ApiError("quota".into())
        );
    }

    #[test]
    fn malformed_bodies_are_unexpected() {
        assert!(matches!(
            classify_response(true, b"<html>502</html>"),
            GenerateOutcome::Unexpected(_)
        ));
        assert!(matches!(
            classify_response(true, br#"{"candidates":"nope"}"#),
            GenerateOutcome::Unexpected(_)
        ));
        assert!(matches!(
            classify_response(false, b"{}"),
            GenerateOutcome::Unexpected(_)
        ));
    }

    #[test]
    fn non_success_with_candidates_is_not_a_summary() {
        let body = br#"{"candidates":[{"content":{"parts":[{"text":"x"}]}}]}"#;
        assert!(matches!(
            classify_response(false, body),
            GenerateOutcome::Unexpected(_)
        ));
    }

    #[test]
    fn outcome_maps_to_errors() {
        assert!(matches!(
            GenerateOutcome::NoCandidates.into_result(),
            Err(SummarizerError::NoCandidates)
        ));
        assert_eq!(
            GenerateOutcome::Summary("ok".into()).into_result().unwrap(),
            "ok"
        );
    }

    #[test]
    fn endpoint_is_templated_with_key() {
        let config = SummarizerConfig::builder()
            .api_base_url("http://localhost:9999/v1beta/")
            .model("gemini-test")
            .api_key("abc123")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint_url(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent?key=abc123"
        );
    }

    #[test]
    fn missing_key_is_sent_empty() {
        let client = GeminiClient::new(&SummarizerConfig::default()).unwrap();
        assert!(client.endpoint_url().ends_with(":generateContent?key="));
    }

    #[test]
    fn redaction_hides_key() {
        let s = "error sending request for url (https://x/models/m:generateContent?key=SECRET)";
        let r = redact_key(s);
        assert!(!r.contains("SECRET"), "got: {r}");
        assert!(r.contains("key=***)"));
    }
}
