use crate::coach::{ChatBackend, ChatSession, CoachError, SessionConfig};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire types for the Generative Language `generateContent` call
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    system_instruction: &'a Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<&'a GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ============================================================================
// Backend
// ============================================================================

/// Google Gemini chat backend over the REST API.
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Box<dyn ChatSession>, CoachError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, config.model);
        Ok(Box::new(GeminiSession {
            client: self.client.clone(),
            url,
            api_key: self.api_key.clone(),
            system_instruction: Content::text(None, &config.system_prompt),
            generation_config: config.thinking_budget.map(|thinking_budget| GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget },
            }),
            contents: Vec::new(),
        }))
    }
}

/// Conversation state lives client-side: every call replays the prior turns.
struct GeminiSession {
    client: Client,
    url: String,
    api_key: String,
    system_instruction: Content,
    generation_config: Option<GenerationConfig>,
    contents: Vec<Content>,
}

impl GeminiSession {
    fn map_api_error(status: u16, body: &str) -> CoachError {
        let message = serde_json::from_str::<GenerateContentResponse>(body)
            .ok()
            .and_then(|response| response.error)
            .map_or_else(|| body.to_string(), |err| err.message);
        CoachError::Api { status, message }
    }

    fn extract_text(response: &GenerateContentResponse) -> String {
        response
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_turn(&mut self, text: &str) -> Result<String, CoachError> {
        let mut contents = self.contents.clone();
        contents.push(Content::text(Some("user"), text));

        let request = GenerateContentRequest {
            contents: &contents,
            system_instruction: &self.system_instruction,
            generation_config: self.generation_config.as_ref(),
        };

        debug!("sending {} turn(s) to {}", contents.len(), self.url);
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("chat service error status {status}");
            return Err(Self::map_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        if let Some(err) = parsed.error {
            return Err(CoachError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        let reply = Self::extract_text(&parsed);
        if !reply.trim().is_empty() {
            contents.push(Content::text(Some("model"), &reply));
            self.contents = contents;
        }
        Ok(reply)
    }
}
