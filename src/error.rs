//! Application error type and its mapping to HTTP responses.
//!
//! Every failure past the indexing phase reaches the client as one of these
//! variants, so each gets a distinct status and a stable `code` string.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::domain::{Difficulty, UnknownDifficulty};
use crate::sampler::SampleError;

#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    InvalidDifficulty(String),
    InvalidTimer(String),
    NoCandidates,
    InsufficientOptions { available: usize, required: usize },
    DifficultyMismatch { expected: Difficulty, submitted: Difficulty },

    // 404 Not Found
    UnknownQuestionId(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDifficulty(_)
            | AppError::InvalidTimer(_)
            | AppError::NoCandidates
            | AppError::InsufficientOptions { .. }
            | AppError::DifficultyMismatch { .. } => StatusCode::BAD_REQUEST,
            AppError::UnknownQuestionId(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidDifficulty(_) => "invalid_difficulty",
            AppError::InvalidTimer(_) => "invalid_timer",
            AppError::NoCandidates => "no_candidates",
            AppError::InsufficientOptions { .. } => "insufficient_options",
            AppError::DifficultyMismatch { .. } => "difficulty_mismatch",
            AppError::UnknownQuestionId(_) => "unknown_question_id",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidDifficulty(d) => write!(f, "Unsupported difficulty: {}", d),
            AppError::InvalidTimer(t) => {
                write!(f, "Timer must be between 10 and 60 seconds, got {:?}", t)
            }
            AppError::NoCandidates => {
                f.write_str("No cars left to ask about. Retry without exclusions.")
            }
            AppError::InsufficientOptions { available, required } => write!(
                f,
                "Dataset too sparse for this difficulty: {} distinct options, {} required",
                available, required
            ),
            AppError::DifficultyMismatch { expected, submitted } => write!(
                f,
                "Difficulty mismatch: question was issued as {}, answer submitted as {}",
                expected, submitted
            ),
            AppError::UnknownQuestionId(_) => f.write_str("Invalid question id."),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response `{ "error": ..., "code": ... }`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

impl From<SampleError> for AppError {
    fn from(err: SampleError) -> Self {
        match err {
            SampleError::NoCandidates => AppError::NoCandidates,
            SampleError::InsufficientOptions { available, required } => {
                AppError::InsufficientOptions { available, required }
            }
        }
    }
}

impl From<UnknownDifficulty> for AppError {
    fn from(err: UnknownDifficulty) -> Self {
        AppError::InvalidDifficulty(err.0)
    }
}
