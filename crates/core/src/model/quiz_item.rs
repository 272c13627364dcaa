use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/poll entry of a quiz.
///
/// Navigation only ever looks at `start_time`; the remaining fields are carried
/// through to whoever renders the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    start_time: DateTime<Utc>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl QuizItem {
    #[must_use]
    pub fn new(start_time: DateTime<Utc>, question: impl Into<String>) -> Self {
        Self {
            start_time,
            question: question.into(),
            answers: Vec::new(),
            image_url: None,
        }
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}
