//! Completion-service clients and the provider abstraction.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ServiceConfig;
use crate::error::{ConciergeError, Result};
use crate::turn::{ChatTurn, Speaker};

/// Minimal abstraction around a chat completion provider.
///
/// `Ok(None)` models a structurally valid response that carried no usable
/// text; the relay substitutes an apology for it.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        prior: &[ChatTurn],
        utterance: &str,
    ) -> Result<Option<String>>;
}

fn coalesce_error(status: reqwest::StatusCode, body: &str, provider: &str) -> ConciergeError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ConciergeError::Completion(format!("{provider} rate limit exceeded: {body}"));
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ConciergeError::Completion(format!("{provider} rejected the credential: {body}"));
    }
    ConciergeError::Completion(format!("{provider} request failed with {status}: {body}"))
}

/// Client for Google's `generateContent` endpoint.
///
/// Issues exactly one request per call: no streaming, no retry. Constructed
/// explicitly from configuration and injected wherever a model is needed.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self> {
        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ConciergeError::Config("missing Gemini API key in service config".into())
        })?;
        let endpoint = cfg
            .endpoint
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(cfg.timeout_secs))
                .build()
                .map_err(|err| ConciergeError::Completion(format!("http client error: {err}")))?,
            model: cfg.model.clone(),
            api_key,
            endpoint,
        })
    }

    fn to_contents(prior: &[ChatTurn], utterance: &str) -> Vec<GeminiMessage> {
        let mut contents: Vec<GeminiMessage> = prior
            .iter()
            .map(|turn| GeminiMessage {
                role: match turn.speaker {
                    Speaker::Visitor => "user",
                    Speaker::Assistant => "model",
                }
                .to_string(),
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(GeminiMessage {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: utterance.to_string(),
            }],
        });
        contents
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn complete(
        &self,
        system_instruction: &str,
        prior: &[ChatTurn],
        utterance: &str,
    ) -> Result<Option<String>> {
        let payload = json!({
            "systemInstruction": {
                "parts": [{ "text": system_instruction }],
            },
            "contents": Self::to_contents(prior, utterance),
        });

        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.endpoint, self.model, self.api_key
            ))
            .json(&payload)
            .send()
            .await
            .map_err(|err| ConciergeError::Completion(format!("Gemini request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "gemini"));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|err| {
            ConciergeError::Completion(format!("Gemini response parse error: {err}"))
        })?;

        let content = parsed
            .candidates
            .first()
            .and_then(|cand| cand.content.parts.first())
            .map(|part| part.text.clone())
            .unwrap_or_default();

        Ok(if content.is_empty() {
            None
        } else {
            Some(content)
        })
    }
}

/// What a [`StubCompletion`] should do for one call.
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Empty,
    Fail(String),
}

/// A deterministic model used for tests and demos. Records the system
/// instruction of every call so tests can assert the briefing is never
/// mutated between requests.
pub struct StubCompletion {
    replies: Mutex<VecDeque<StubReply>>,
    seen_instructions: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn new(replies: Vec<StubReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen_instructions: Mutex::new(Vec::new()),
        })
    }

    pub fn scripted(texts: Vec<&str>) -> Arc<Self> {
        Self::new(texts.into_iter().map(|t| StubReply::Text(t.into())).collect())
    }

    pub fn seen_instructions(&self) -> Vec<String> {
        self.seen_instructions.lock().expect("stub poisoned").clone()
    }
}

#[async_trait]
impl CompletionModel for StubCompletion {
    async fn complete(
        &self,
        system_instruction: &str,
        _prior: &[ChatTurn],
        _utterance: &str,
    ) -> Result<Option<String>> {
        self.seen_instructions
            .lock()
            .expect("stub poisoned")
            .push(system_instruction.to_string());

        let reply = self
            .replies
            .lock()
            .expect("stub poisoned")
            .pop_front()
            .ok_or_else(|| {
                ConciergeError::Completion("StubCompletion ran out of scripted replies".into())
            })?;

        match reply {
            StubReply::Text(text) => Ok(Some(text)),
            StubReply::Empty => Ok(None),
            StubReply::Fail(reason) => Err(ConciergeError::Completion(reason)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prior_turns_map_to_wire_roles() {
        let prior = vec![
            ChatTurn::assistant("Namaste."),
            ChatTurn::visitor("Hello there"),
        ];
        let contents = GeminiClient::to_contents(&prior, "Are pets allowed?");

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "model");
        assert_eq!(contents[1].role, "user");
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "Are pets allowed?");
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let cfg = ServiceConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&cfg),
            Err(ConciergeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn stub_plays_back_its_script() {
        let stub = StubCompletion::new(vec![
            StubReply::Text("hello".into()),
            StubReply::Empty,
            StubReply::Fail("boom".into()),
        ]);

        assert_eq!(
            stub.complete("sys", &[], "hi").await.unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(stub.complete("sys", &[], "hi").await.unwrap(), None);
        assert!(stub.complete("sys", &[], "hi").await.is_err());
        assert_eq!(stub.seen_instructions().len(), 3);
    }
}
