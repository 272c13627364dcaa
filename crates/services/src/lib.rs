#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod http_source;
pub mod memory_source;
pub mod quiz_source;

pub use config::{QuizServiceConfig, RunMode};
pub use error::{FailureKind, FixtureError, QuizSourceError};
pub use http_source::HttpQuizSource;
pub use memory_source::{FixtureQuiz, InMemoryQuizSource, QuizFixture};
pub use quiz_source::QuizDataSource;
