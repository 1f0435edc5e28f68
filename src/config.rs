use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COACH_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_COACH_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_COACH_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub coach: CoachConfig,
}

#[derive(Clone)]
pub struct CoachConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for CoachConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_COACH_MODEL.to_string(),
            base_url: DEFAULT_COACH_BASE_URL.to_string(),
            timeout: DEFAULT_COACH_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = non_blank("SINISTER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir(&non_blank).join(".sinister"));

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|&name| non_blank(name))
            .map(|key| key.trim().to_string());

        let timeout = match non_blank("SINISTER_COACH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("ignoring invalid SINISTER_COACH_TIMEOUT_SECS={raw}");
                    DEFAULT_COACH_TIMEOUT
                }
            },
            None => DEFAULT_COACH_TIMEOUT,
        };

        Self {
            data_dir,
            coach: CoachConfig {
                api_key,
                model: non_blank("SINISTER_COACH_MODEL")
                    .unwrap_or_else(|| DEFAULT_COACH_MODEL.to_string()),
                base_url: non_blank("SINISTER_COACH_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_COACH_BASE_URL.to_string()),
                timeout,
            },
        }
    }
}

fn home_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("HOME")
        .or_else(|| lookup("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
