use serde::{Deserialize, Deserializer, Serialize};

use crate::model::QuizId;

/// Identifies which quiz to load and how many items the backend promised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMetadata {
    id: QuizId,
    #[serde(deserialize_with = "lenient_count")]
    number_of_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl QuizMetadata {
    #[must_use]
    pub fn new(id: QuizId, number_of_items: usize) -> Self {
        Self {
            id,
            number_of_items,
            title: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    /// Expected item count, only used to detect partially loaded quizzes.
    #[must_use]
    pub fn number_of_items(&self) -> usize {
        self.number_of_items
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(usize),
    Text(String),
}

// Some backends serialize the count as a string ("4").
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match RawCount::deserialize(deserializer)? {
        RawCount::Number(n) => Ok(n),
        RawCount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid numberOfItems: {text}"))),
    }
}
