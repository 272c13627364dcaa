use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Build/run flavour of the client. `Dev` turns on browse mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    Dev,
    #[default]
    Production,
}

impl RunMode {
    /// Reads `QUIZ_MODE`; anything other than `dev` is production.
    #[must_use]
    pub fn from_env() -> Self {
        env::var("QUIZ_MODE")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("dev") {
            Self::Dev
        } else {
            Self::Production
        }
    }

    /// Browse mode loads once and never polls the server.
    #[must_use]
    pub fn is_browse(self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl FromStr for RunMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[derive(Clone, Debug)]
pub struct QuizServiceConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Default for QuizServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl QuizServiceConfig {
    /// Reads `QUIZ_API_BASE_URL`, `QUIZ_API_TOKEN` and `QUIZ_API_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("QUIZ_API_BASE_URL").unwrap_or_else(|_| {
            info!("QUIZ_API_BASE_URL not set, using default: {DEFAULT_BASE_URL}");
            DEFAULT_BASE_URL.into()
        });
        let auth_token = env::var("QUIZ_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeout = env::var("QUIZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| warn!("Invalid QUIZ_API_TIMEOUT_SECS value: {e}"))
                    .ok()
            })
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        Self {
            base_url,
            auth_token,
            timeout,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
