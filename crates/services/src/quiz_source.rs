use async_trait::async_trait;
use quiz_core::model::{QuizId, QuizItem};

use crate::error::QuizSourceError;

/// Backend contract for loading the items of one quiz.
#[async_trait]
pub trait QuizDataSource: Send + Sync {
    /// Fetch the ordered items of a quiz. An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizSourceError::Unauthorized` when the caller must log in again,
    /// or another variant for transport and server failures.
    async fn get_quiz(&self, id: &QuizId) -> Result<Vec<QuizItem>, QuizSourceError>;
}
