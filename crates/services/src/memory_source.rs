use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{QuizId, QuizItem, QuizMetadata};
use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, QuizSourceError};
use crate::quiz_source::QuizDataSource;

/// One quiz inside a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureQuiz {
    pub metadata: QuizMetadata,
    #[serde(default)]
    pub items: Vec<QuizItem>,
}

/// On-disk shape of an offline quiz set: `{ "quizzes": [ { "metadata": .., "items": [..] } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizFixture {
    pub quizzes: Vec<FixtureQuiz>,
}

impl QuizFixture {
    /// # Errors
    ///
    /// Returns `FixtureError::Json` if the text is not a valid fixture.
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Returns `FixtureError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    #[must_use]
    pub fn metadata_for(&self, id: &QuizId) -> Option<&QuizMetadata> {
        self.quizzes
            .iter()
            .map(|quiz| &quiz.metadata)
            .find(|metadata| metadata.id() == id)
    }
}

/// In-memory quiz source for offline runs and tests.
#[derive(Clone, Default)]
pub struct InMemoryQuizSource {
    quizzes: Arc<Mutex<HashMap<QuizId, Vec<QuizItem>>>>,
    locked: Arc<Mutex<HashSet<QuizId>>>,
}

impl InMemoryQuizSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_fixture(fixture: &QuizFixture) -> Self {
        let quizzes = fixture
            .quizzes
            .iter()
            .map(|quiz| (quiz.metadata.id().clone(), quiz.items.clone()))
            .collect();
        Self {
            quizzes: Arc::new(Mutex::new(quizzes)),
            locked: Arc::default(),
        }
    }

    /// Store or replace the items of a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizSourceError::Unavailable` if the store lock is poisoned.
    pub fn upsert_quiz(&self, id: QuizId, items: Vec<QuizItem>) -> Result<(), QuizSourceError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| QuizSourceError::Unavailable(e.to_string()))?;
        guard.insert(id, items);
        Ok(())
    }

    /// Make reads of `id` fail as unauthorized until unlocked.
    ///
    /// # Errors
    ///
    /// Returns `QuizSourceError::Unavailable` if the store lock is poisoned.
    pub fn set_locked(&self, id: QuizId, locked: bool) -> Result<(), QuizSourceError> {
        let mut guard = self
            .locked
            .lock()
            .map_err(|e| QuizSourceError::Unavailable(e.to_string()))?;
        if locked {
            guard.insert(id);
        } else {
            guard.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl QuizDataSource for InMemoryQuizSource {
    async fn get_quiz(&self, id: &QuizId) -> Result<Vec<QuizItem>, QuizSourceError> {
        let is_locked = self
            .locked
            .lock()
            .map_err(|e| QuizSourceError::Unavailable(e.to_string()))?
            .contains(id);
        if is_locked {
            return Err(QuizSourceError::Unauthorized);
        }

        let guard = self
            .quizzes
            .lock()
            .map_err(|e| QuizSourceError::Unavailable(e.to_string()))?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| QuizSourceError::NotFound(id.clone()))
    }
}
