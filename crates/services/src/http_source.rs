use async_trait::async_trait;
use log::debug;
use quiz_core::model::{QuizId, QuizItem};
use reqwest::{Client, StatusCode, Url};

use crate::config::QuizServiceConfig;
use crate::error::QuizSourceError;
use crate::quiz_source::QuizDataSource;

/// Reads quizzes from the REST backend: `GET {base}/quizzes/{id}/items`.
#[derive(Clone)]
pub struct HttpQuizSource {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpQuizSource {
    /// # Errors
    ///
    /// Returns `QuizSourceError::InvalidBaseUrl` if the base url cannot be used,
    /// or `QuizSourceError::Http` if the client cannot be built.
    pub fn new(config: QuizServiceConfig) -> Result<Self, QuizSourceError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| QuizSourceError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(QuizSourceError::InvalidBaseUrl(config.base_url));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token,
        })
    }

    /// # Errors
    ///
    /// See [`HttpQuizSource::new`].
    pub fn from_env() -> Result<Self, QuizSourceError> {
        Self::new(QuizServiceConfig::from_env())
    }

    fn items_url(&self, id: &QuizId) -> Result<Url, QuizSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QuizSourceError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["quizzes", id.as_str(), "items"]);
        Ok(url)
    }
}

fn check_status(status: StatusCode) -> Result<(), QuizSourceError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(QuizSourceError::Unauthorized);
    }
    if !status.is_success() {
        return Err(QuizSourceError::HttpStatus(status));
    }
    Ok(())
}

#[async_trait]
impl QuizDataSource for HttpQuizSource {
    async fn get_quiz(&self, id: &QuizId) -> Result<Vec<QuizItem>, QuizSourceError> {
        let url = self.items_url(id)?;
        debug!("GET {url}");

        let mut request = self.client.get(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        check_status(response.status())?;

        let items: Vec<QuizItem> = response.json().await?;
        Ok(items)
    }
}
