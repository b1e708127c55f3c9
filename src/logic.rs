//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Issuing a question (sample, store the correct option, build the payload)
//!   - Grading a submitted answer against the stored question
//!   - Updating the score board for named players

use std::collections::HashSet;

use tracing::{info, instrument};

use crate::domain::{Difficulty, QuizOption};
use crate::error::AppError;
use crate::protocol::{AnswerIn, AnswerOut, PlayerScore, QuestionPayload, QuestionQuery, SubmittedAnswer};
use crate::sampler::build_question;
use crate::state::AppState;

pub const TIMER_RANGE: std::ops::RangeInclusive<u32> = 10..=60;

/// Parse a difficulty from the wire, defaulting when absent.
pub fn parse_difficulty(raw: Option<&str>) -> Result<Difficulty, AppError> {
  match raw {
    None => Ok(Difficulty::default()),
    Some(s) => Ok(s.parse::<Difficulty>()?),
  }
}

fn parse_timer(raw: Option<&str>) -> Result<Option<u32>, AppError> {
  let Some(raw) = raw else { return Ok(None) };
  match raw.trim().parse::<u32>() {
    Ok(timer) if TIMER_RANGE.contains(&timer) => Ok(Some(timer)),
    _ => Err(AppError::InvalidTimer(raw.to_string())),
  }
}

#[instrument(level = "info", skip(state, query), fields(excluded = query.exclude.len()))]
pub fn issue_question(state: &AppState, query: QuestionQuery) -> Result<QuestionPayload, AppError> {
  let difficulty = parse_difficulty(query.difficulty.as_deref())?;
  let timer = parse_timer(query.timer.as_deref())?;
  let exclude: HashSet<String> = query.exclude.into_iter().collect();

  let question = state.with_rng(|rng| build_question(&state.dataset, difficulty, &exclude, rng))?;
  let stored = state.questions.issue(difficulty, question.correct);

  info!(target: "quiz", qid = %stored.qid, %difficulty, entry = %question.entry.id, "Question issued");
  Ok(QuestionPayload {
    qid: stored.qid,
    difficulty,
    entry_id: question.entry.id.clone(),
    image_url: state.settings.image_url(&question.entry.relative_path),
    prompt: difficulty.prompt().to_string(),
    options: question.options,
    timeout: timer.unwrap_or(state.settings.timeout_seconds),
  })
}

#[instrument(level = "info", skip(state, body), fields(qid = %body.qid, timed_out = body.timeout))]
pub fn submit_answer(state: &AppState, body: AnswerIn) -> Result<AnswerOut, AppError> {
  let submitted = body.difficulty.parse::<Difficulty>()?;

  let stored = state
    .questions
    .resolve(&body.qid)
    .ok_or_else(|| AppError::UnknownQuestionId(body.qid.clone()))?;

  if stored.difficulty != submitted {
    return Err(AppError::DifficultyMismatch {
      expected: stored.difficulty,
      submitted,
    });
  }

  let correct = !body.timeout && check_answer(&stored.correct, &body.answer, stored.difficulty);
  let message = if body.timeout {
    "Timed out."
  } else if correct {
    "Correct."
  } else {
    "Incorrect."
  };

  let score = body
    .player
    .as_deref()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .map(|player| PlayerScore::from(state.scoreboard.register_attempt(player, stored.difficulty, correct)));

  info!(target: "quiz", qid = %stored.qid, %correct, scored = score.is_some(), "Answer graded");
  Ok(AnswerOut {
    correct,
    correct_answer: stored.correct,
    message: message.to_string(),
    score,
  })
}

/// Case-insensitive comparison of the fields that matter at `difficulty`.
/// A missing submitted field counts as an empty string.
pub fn check_answer(correct: &QuizOption, answer: &SubmittedAnswer, difficulty: Difficulty) -> bool {
  fn same(expected: Option<&str>, got: Option<&str>) -> bool {
    expected.unwrap_or("").to_lowercase() == got.unwrap_or("").to_lowercase()
  }

  let make = same(Some(correct.make.as_str()), answer.make.as_deref());
  match difficulty {
    Difficulty::Make => make,
    Difficulty::MakeModel => make && same(correct.model.as_deref(), answer.model.as_deref()),
    Difficulty::MakeModelYear => {
      make
        && same(correct.model.as_deref(), answer.model.as_deref())
        && same(correct.year.as_deref(), answer.year.as_deref())
    }
  }
}
