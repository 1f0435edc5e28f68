pub mod client;
pub mod gemini;

use crate::config::CoachConfig;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;

pub use client::CoachClient;
pub use gemini::GeminiBackend;

pub const SYSTEM_PROMPT: &str = "You are an expert Kettlebell Coach specializing in Pavel Tsatsouline's \"Simple and Sinister\" (S&S) program.
Your goal is to help the user progress safely and effectively towards the \"Simple\" and eventually \"Sinister\" goals.
The \"Simple\" goal is:
- Men: 32kg Swings (100 in 5 min), 32kg Get-ups (10 in 10 min)
- Women: 24kg Swings, 16kg Get-ups
The \"Sinister\" goal is:
- Men: 48kg Swings, 48kg Get-ups
- Women: 32kg Swings, 24kg Get-ups

Be concise, encouraging, and focus on technique (tension, breathing, safety).
If the user mentions pain, suggest regression or seeing a medical professional.";

pub const WELCOME_MESSAGE: &str = "Comrade! I am your S&S Coach. How can I assist your training today? Ask about form, progression, or recovery.";
pub const MISSING_CREDENTIAL_REPLY: &str = "API Key is missing. Please configure the API_KEY environment variable to use the Coach feature.";
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting to the training database right now.";
pub const EMPTY_REPLY: &str = "I couldn't generate a response. Keep swinging!";
pub const DEMO_MODE_NOTICE: &str = "API Key not detected. Chat is in demo mode.";

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("request to chat service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode chat service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("chat service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("no chat service credential configured")]
    MissingCredential,
    #[error("chat service returned an empty reply")]
    EmptyResponse,
    #[error("async runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}

/// Fixed at session creation; never renegotiated per turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub system_prompt: String,
    pub thinking_budget: Option<u32>,
}

impl SessionConfig {
    pub fn coaching(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            thinking_budget: Some(0),
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Box<dyn ChatSession>, CoachError>;
}

/// A live conversation. Prior turns are kept by the session, not by the caller.
#[async_trait]
pub trait ChatSession: Send {
    async fn send_turn(&mut self, text: &str) -> Result<String, CoachError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachStatus {
    Uninitialized,
    Ready,
    Unavailable,
}

enum CoachState {
    Uninitialized,
    Ready(Box<dyn ChatSession>),
    Unavailable,
}

/// Single conversation with the coaching model for the life of the process.
///
/// Every user turn resolves to some reply text: the model's answer, or one of
/// the fixed fallback strings when the service is missing or failing.
pub struct CoachProxy {
    backend: Option<Arc<dyn ChatBackend>>,
    session_config: SessionConfig,
    timeout: Duration,
    state: CoachState,
}

impl CoachProxy {
    pub fn new(
        backend: Option<Arc<dyn ChatBackend>>,
        session_config: SessionConfig,
        timeout: Duration,
    ) -> Self {
        let state = if backend.is_some() {
            CoachState::Uninitialized
        } else {
            CoachState::Unavailable
        };
        Self {
            backend,
            session_config,
            timeout,
            state,
        }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        let backend = config.api_key.as_ref().map(|key| {
            Arc::new(GeminiBackend::new(key.clone(), config.base_url.clone()))
                as Arc<dyn ChatBackend>
        });
        if backend.is_none() {
            info!("no coach credential configured, coach runs in demo mode");
        }
        Self::new(
            backend,
            SessionConfig::coaching(config.model.clone()),
            config.timeout,
        )
    }

    pub fn status(&self) -> CoachStatus {
        match self.state {
            CoachState::Uninitialized => CoachStatus::Uninitialized,
            CoachState::Ready(_) => CoachStatus::Ready,
            CoachState::Unavailable => CoachStatus::Unavailable,
        }
    }

    /// Opens the conversation if needed. A failed attempt leaves the proxy
    /// uninitialized so the next send retries.
    pub async fn init(&mut self) -> Result<CoachStatus, CoachError> {
        let timeout = self.timeout;
        match time::timeout(timeout, self.session()).await {
            Ok(Ok(_)) => Ok(CoachStatus::Ready),
            Ok(Err(CoachError::MissingCredential)) => Ok(CoachStatus::Unavailable),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(CoachError::Timeout(timeout)),
        }
    }

    /// One deadline covers opening the session and the turn itself.
    pub async fn send(&mut self, text: &str) -> String {
        let timeout = self.timeout;
        let outcome = match time::timeout(timeout, self.exchange(text)).await {
            Ok(result) => result,
            Err(_) => Err(CoachError::Timeout(timeout)),
        };

        match outcome {
            Ok(reply) => reply,
            Err(CoachError::MissingCredential) => MISSING_CREDENTIAL_REPLY.to_string(),
            Err(CoachError::EmptyResponse) => {
                warn!("coach returned an empty reply");
                EMPTY_REPLY.to_string()
            }
            Err(err) => {
                error!("coach turn failed: {err}");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn exchange(&mut self, text: &str) -> Result<String, CoachError> {
        let session = self.session().await?;
        debug!("sending coach turn ({} chars)", text.len());
        let reply = session.send_turn(text).await?;
        if reply.trim().is_empty() {
            return Err(CoachError::EmptyResponse);
        }
        Ok(reply)
    }

    async fn session(&mut self) -> Result<&mut Box<dyn ChatSession>, CoachError> {
        if matches!(self.state, CoachState::Uninitialized) {
            let Some(backend) = self.backend.as_ref() else {
                self.state = CoachState::Unavailable;
                return Err(CoachError::MissingCredential);
            };
            let session = backend.create_session(&self.session_config).await?;
            info!("coach session created with model {}", self.session_config.model);
            self.state = CoachState::Ready(session);
        }

        match &mut self.state {
            CoachState::Ready(session) => Ok(session),
            _ => Err(CoachError::MissingCredential),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("{timestamp}-{seq}"),
            role,
            text: text.into(),
            timestamp,
        }
    }

    pub fn welcome() -> Self {
        Self {
            id: "welcome".to_string(),
            ..Self::new(ChatRole::Model, WELCOME_MESSAGE)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{ChatBackend, ChatSession, CoachError, SessionConfig};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Replies are popped in order; `Err(status)` simulates an API failure.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedBackend {
        pub sessions_created: Arc<AtomicUsize>,
        pub create_failures: Arc<AtomicUsize>,
        pub turns: Arc<Mutex<Vec<String>>>,
        pub configs: Arc<Mutex<Vec<SessionConfig>>>,
        replies: Arc<Mutex<VecDeque<Result<String, u16>>>>,
        delay: Option<Duration>,
        creation_delay: Option<Duration>,
        gate: Option<Arc<Semaphore>>,
    }

    impl ScriptedBackend {
        pub fn with_replies(replies: Vec<Result<&str, u16>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(
                    replies
                        .into_iter()
                        .map(|reply| reply.map(str::to_string))
                        .collect(),
                )),
                ..Self::default()
            }
        }

        pub fn failing_creation(self, failures: usize) -> Self {
            self.create_failures.store(failures, Ordering::SeqCst);
            self
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn slow_creation(mut self, delay: Duration) -> Self {
            self.creation_delay = Some(delay);
            self
        }

        pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    struct ScriptedSession {
        backend: ScriptedBackend,
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn create_session(
            &self,
            config: &SessionConfig,
        ) -> Result<Box<dyn ChatSession>, CoachError> {
            if let Some(delay) = self.creation_delay {
                tokio::time::sleep(delay).await;
            }
            let remaining = self.create_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.create_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(CoachError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.sessions_created.fetch_add(1, Ordering::SeqCst);
            self.configs
                .lock()
                .expect("configs lock")
                .push(config.clone());
            Ok(Box::new(ScriptedSession {
                backend: self.clone(),
            }))
        }
    }

    #[async_trait]
    impl ChatSession for ScriptedSession {
        async fn send_turn(&mut self, text: &str) -> Result<String, CoachError> {
            if let Some(gate) = &self.backend.gate {
                let permit = gate.acquire().await.expect("gate should stay open");
                permit.forget();
            }
            if let Some(delay) = self.backend.delay {
                tokio::time::sleep(delay).await;
            }
            self.backend
                .turns
                .lock()
                .expect("turns lock")
                .push(text.to_string());
            let next = self
                .backend
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or(Ok(String::new()));
            next.map_err(|status| CoachError::Api {
                status,
                message: "scripted failure".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::{
        ChatBackend, ChatMessage, ChatRole, CoachProxy, CoachStatus, SessionConfig, EMPTY_REPLY,
        FALLBACK_REPLY, MISSING_CREDENTIAL_REPLY, SYSTEM_PROMPT,
    };
    use crate::config::CoachConfig;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn proxy_with(backend: &ScriptedBackend, timeout: Duration) -> CoachProxy {
        CoachProxy::new(
            Some(Arc::new(backend.clone()) as Arc<dyn ChatBackend>),
            SessionConfig::coaching("test-model"),
            timeout,
        )
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_every_send() {
        let mut proxy = CoachProxy::from_config(&CoachConfig::default());
        assert_eq!(proxy.status(), CoachStatus::Unavailable);

        for text in ["how heavy?", "", "pain in my wrist"] {
            assert_eq!(proxy.send(text).await, MISSING_CREDENTIAL_REPLY);
        }
        assert_eq!(proxy.init().await.expect("init is infallible here"), CoachStatus::Unavailable);
    }

    #[tokio::test]
    async fn session_is_created_lazily_and_reused() {
        let backend = ScriptedBackend::with_replies(vec![Ok("Pack the shoulder."), Ok("Breathe.")]);
        let mut proxy = proxy_with(&backend, Duration::from_secs(5));
        assert_eq!(proxy.status(), CoachStatus::Uninitialized);

        assert_eq!(proxy.send("get-up tips?").await, "Pack the shoulder.");
        assert_eq!(proxy.status(), CoachStatus::Ready);
        assert_eq!(proxy.send("and swings?").await, "Breathe.");

        assert_eq!(backend.sessions_created.load(Ordering::SeqCst), 1);
        assert_eq!(
            *backend.turns.lock().expect("turns lock"),
            vec!["get-up tips?".to_string(), "and swings?".to_string()]
        );
    }

    #[tokio::test]
    async fn session_is_configured_with_coaching_prompt() {
        let backend = ScriptedBackend::with_replies(Vec::new());
        let mut proxy = proxy_with(&backend, Duration::from_secs(5));

        assert_eq!(proxy.init().await.expect("init should succeed"), CoachStatus::Ready);
        let configs = backend.configs.lock().expect("configs lock");
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].system_prompt, SYSTEM_PROMPT);
        assert_eq!(configs[0].thinking_budget, Some(0));
        assert_eq!(configs[0].model, "test-model");
    }

    #[tokio::test]
    async fn failing_backend_resolves_to_fallback() {
        let backend = ScriptedBackend::with_replies(vec![Err(500), Err(429), Ok("Recovered.")]);
        let mut proxy = proxy_with(&backend, Duration::from_secs(5));

        assert_eq!(proxy.send("one").await, FALLBACK_REPLY);
        assert_eq!(proxy.send("two").await, FALLBACK_REPLY);
        assert_eq!(proxy.send("three").await, "Recovered.");
    }

    #[tokio::test]
    async fn failed_session_creation_is_retried_on_next_send() {
        let backend = ScriptedBackend::with_replies(vec![Ok("Hello comrade.")]).failing_creation(1);
        let mut proxy = proxy_with(&backend, Duration::from_secs(5));

        assert_eq!(proxy.send("hi").await, FALLBACK_REPLY);
        assert_eq!(proxy.status(), CoachStatus::Uninitialized);

        assert_eq!(proxy.send("hi again").await, "Hello comrade.");
        assert_eq!(proxy.status(), CoachStatus::Ready);
    }

    #[tokio::test]
    async fn empty_reply_is_replaced() {
        let backend = ScriptedBackend::with_replies(vec![Ok("   ")]);
        let mut proxy = proxy_with(&backend, Duration::from_secs(5));

        assert_eq!(proxy.send("anything?").await, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn slow_backend_times_out_into_fallback() {
        let backend = ScriptedBackend::with_replies(vec![Ok("too late")])
            .delayed(Duration::from_secs(5));
        let mut proxy = proxy_with(&backend, Duration::from_millis(50));

        assert_eq!(proxy.send("quick question").await, FALLBACK_REPLY);
        assert_eq!(proxy.status(), CoachStatus::Ready);
    }

    #[tokio::test]
    async fn first_turn_shares_one_deadline_with_session_creation() {
        let backend = ScriptedBackend::with_replies(vec![Ok("Steady.")])
            .slow_creation(Duration::from_millis(200))
            .delayed(Duration::from_millis(200));
        let mut proxy = proxy_with(&backend, Duration::from_millis(300));

        assert_eq!(proxy.send("first").await, FALLBACK_REPLY);
        assert_eq!(proxy.status(), CoachStatus::Ready);
        assert_eq!(proxy.send("second").await, "Steady.");
    }

    #[tokio::test]
    async fn init_reports_unavailable_without_backend() {
        let mut proxy =
            CoachProxy::new(None, SessionConfig::coaching("test-model"), Duration::from_secs(1));
        let status = proxy.init().await.expect("missing credential is a status");
        assert_eq!(status, CoachStatus::Unavailable);
    }

    #[test]
    fn messages_get_distinct_ids() {
        let first = ChatMessage::new(ChatRole::User, "a");
        let second = ChatMessage::new(ChatRole::User, "b");
        assert_ne!(first.id, second.id);

        let welcome = ChatMessage::welcome();
        assert_eq!(welcome.id, "welcome");
        assert_eq!(welcome.role, ChatRole::Model);
    }
}
