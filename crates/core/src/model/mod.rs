mod ids;
mod metadata;
mod quiz_item;

pub use ids::{QuizId, QuizIdError};
pub use metadata::QuizMetadata;
pub use quiz_item::QuizItem;
