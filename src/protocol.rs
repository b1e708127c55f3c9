//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, QuizOption};
use crate::score::{LeaderboardEntry, ScoreRecord};

//
// Question
//

/// Parsed form of `GET /api/question`. Built from raw pairs because `exclude`
/// may repeat (`exclude=a&exclude=b`, or the `exclude[]` spelling).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuestionQuery {
    pub difficulty: Option<String>,
    pub exclude: Vec<String>,
    pub timer: Option<String>,
}

impl QuestionQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut q = QuestionQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "difficulty" => q.difficulty = Some(value),
                "exclude" | "exclude[]" => {
                    if !value.is_empty() {
                        q.exclude.push(value);
                    }
                }
                "timer" => q.timer = Some(value),
                _ => {}
            }
        }
        q
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub qid: String,
    pub difficulty: Difficulty,
    pub entry_id: String,
    pub image_url: String,
    pub prompt: String,
    pub options: Vec<QuizOption>,
    pub timeout: u32,
}

//
// Answer
//

/// Submitted choice. Any missing field compares as an empty string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SubmittedAnswer {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub qid: String,
    pub difficulty: String,
    #[serde(default)]
    pub answer: SubmittedAnswer,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub timeout: bool,
}

#[derive(Debug, Serialize)]
pub struct PlayerScore {
    pub player: String,
    pub points: u64,
    pub streak: u32,
    pub total_correct: u32,
    pub total_attempts: u32,
    pub accuracy: f64,
}

impl From<ScoreRecord> for PlayerScore {
    fn from(r: ScoreRecord) -> Self {
        Self {
            accuracy: r.accuracy(),
            player: r.player,
            points: r.points,
            streak: r.streak,
            total_correct: r.total_correct,
            total_attempts: r.total_attempts,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub correct: bool,
    pub correct_answer: QuizOption,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<PlayerScore>,
}

//
// Leaderboard
//

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardOut {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResetOut {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub entries: usize,
    pub pending_questions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn question_query_collects_repeated_excludes() {
        let q = QuestionQuery::from_pairs(pairs(&[
            ("difficulty", "make"),
            ("exclude", "a"),
            ("exclude[]", "b"),
            ("exclude", ""),
            ("timer", "25"),
            ("other", "x"),
        ]));
        assert_eq!(q.difficulty.as_deref(), Some("make"));
        assert_eq!(q.exclude, vec!["a", "b"]);
        assert_eq!(q.timer.as_deref(), Some("25"));
    }

    #[test]
    fn answer_in_accepts_minimal_body() {
        let body: AnswerIn =
            serde_json::from_str(r#"{"qid":"q","difficulty":"make","timeout":true}"#).unwrap();
        assert!(body.timeout);
        assert!(body.player.is_none());
        assert!(body.answer.make.is_none());
    }
}
