//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::logic::{issue_question, submit_answer};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  Json(HealthOut {
    ok: true,
    entries: state.dataset.len(),
    pending_questions: state.questions.len(),
  })
}

#[instrument(level = "info", skip(state, pairs))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<QuestionPayload>, AppError> {
  let query = QuestionQuery::from_pairs(pairs);
  let payload = issue_question(&state, query)?;
  info!(target: "quiz", qid = %payload.qid, difficulty = %payload.difficulty, timeout = payload.timeout, "HTTP question served");
  Ok(Json(payload))
}

#[instrument(level = "info", skip(state, body), fields(qid = %body.qid, difficulty = %body.difficulty))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, AppError> {
  let out = submit_answer(&state, body)?;
  info!(target: "quiz", correct = out.correct, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LeaderboardQuery>,
) -> Json<LeaderboardOut> {
  let max = state.scoreboard.max_entries();
  let limit = q.limit.map(|l| l.min(max)).unwrap_or(max);
  Json(LeaderboardOut { entries: state.scoreboard.top_entries(limit) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_leaderboard_reset(State(state): State<Arc<AppState>>) -> Json<LeaderboardResetOut> {
  let cleared = state.scoreboard.reset();
  info!(target: "leaderboard", cleared, "HTTP leaderboard reset");
  Json(LeaderboardResetOut { cleared })
}
