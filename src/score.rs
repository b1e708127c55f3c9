//! In-memory score board: per-player attempts, streaks, and points, plus a
//! ranked leaderboard snapshot.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::Difficulty;

const BASE_POINTS: u64 = 10;
const STREAK_BONUS: u64 = 5;
const STREAK_THRESHOLD: u32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub player: String,
    pub points: u64,
    pub streak: u32,
    pub total_correct: u32,
    pub total_attempts: u32,
}

impl ScoreRecord {
    fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
            points: 0,
            streak: 0,
            total_correct: 0,
            total_attempts: 0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        f64::from(self.total_correct) / f64::from(self.total_attempts)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub points: u64,
    pub accuracy: f64,
}

pub struct ScoreBoard {
    max_entries: usize,
    records: Mutex<HashMap<String, ScoreRecord>>,
}

impl ScoreBoard {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record one answer and return the player's updated record.
    /// The whole read-modify-write happens under the lock.
    #[instrument(level = "debug", skip(self), fields(%difficulty))]
    pub fn register_attempt(&self, player: &str, difficulty: Difficulty, correct: bool) -> ScoreRecord {
        let mut records = self.lock();
        let record = records
            .entry(player.to_string())
            .or_insert_with(|| ScoreRecord::new(player));

        record.total_attempts += 1;
        if correct {
            record.total_correct += 1;
            record.streak += 1;
            let mut earned = BASE_POINTS + difficulty.bonus();
            if record.streak >= STREAK_THRESHOLD {
                earned += STREAK_BONUS;
            }
            record.points = record.points.saturating_add(earned);
        } else {
            record.streak = 0;
        }
        record.clone()
    }

    /// Highest points first, then highest accuracy; remaining ties go to the
    /// player name so the order is stable. Accuracy is rounded only in the output.
    pub fn top_entries(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<ScoreRecord> = self.lock().values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| b.accuracy().total_cmp(&a.accuracy()))
                .then_with(|| a.player.cmp(&b.player))
        });
        ranked
            .into_iter()
            .take(limit)
            .map(|r| LeaderboardEntry {
                accuracy: round3(r.accuracy()),
                player: r.player,
                points: r.points,
            })
            .collect()
    }

    pub fn top(&self) -> Vec<LeaderboardEntry> {
        self.top_entries(self.max_entries)
    }

    pub fn get(&self, player: &str) -> Option<ScoreRecord> {
        self.lock().get(player).cloned()
    }

    /// Drop every record; returns how many were cleared.
    pub fn reset(&self) -> usize {
        let cleared = {
            let mut records = self.lock();
            let n = records.len();
            records.clear();
            n
        };
        info!(target: "leaderboard", cleared, "Leaderboard reset");
        cleared
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ScoreRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn streak_bonus_starts_on_third_correct_answer() {
        let board = ScoreBoard::new(10);
        let d = Difficulty::MakeModelYear;

        assert_eq!(board.register_attempt("ana", d, true).points, 20);
        assert_eq!(board.register_attempt("ana", d, true).points, 40);
        let third = board.register_attempt("ana", d, true);
        assert_eq!(third.points, 65);
        assert_eq!(third.streak, 3);

        let miss = board.register_attempt("ana", d, false);
        assert_eq!(miss.points, 65);
        assert_eq!(miss.streak, 0);
        assert_eq!(miss.total_correct, 3);
        assert_eq!(miss.total_attempts, 4);
        assert!((miss.accuracy() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn difficulty_bonus_applies_per_level() {
        let board = ScoreBoard::new(10);
        assert_eq!(board.register_attempt("a", Difficulty::Make, true).points, 10);
        assert_eq!(board.register_attempt("b", Difficulty::MakeModel, true).points, 15);
        assert_eq!(board.register_attempt("c", Difficulty::MakeModelYear, true).points, 20);
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        assert_eq!(ScoreRecord::new("x").accuracy(), 0.0);
    }

    #[test]
    fn top_entries_orders_by_points_then_accuracy() {
        let board = ScoreBoard::new(10);
        seed(&board, "p50", 30, 3, 6);
        seed(&board, "p80", 30, 4, 5);
        seed(&board, "p100", 10, 1, 1);

        let top = board.top_entries(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player, "p80");
        assert_eq!(top[0].accuracy, 0.8);
        assert_eq!(top[1].player, "p50");
        assert_eq!(top[1].accuracy, 0.5);
    }

    #[test]
    fn accuracy_is_rounded_in_output_only() {
        let board = ScoreBoard::new(10);
        board.register_attempt("p", Difficulty::Make, true);
        board.register_attempt("p", Difficulty::Make, false);
        board.register_attempt("p", Difficulty::Make, false);
        let top = board.top();
        assert_eq!(top[0].accuracy, 0.333);
        let record = board.get("p").unwrap();
        assert!((record.accuracy() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_clears_and_counts() {
        let board = ScoreBoard::new(10);
        board.register_attempt("a", Difficulty::Make, true);
        board.register_attempt("b", Difficulty::Make, false);
        assert_eq!(board.reset(), 2);
        assert!(board.top().is_empty());
        assert_eq!(board.reset(), 0);
    }

    #[test]
    fn concurrent_attempts_are_not_lost() {
        let board = Arc::new(ScoreBoard::new(10));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let board = board.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        board.register_attempt("shared", Difficulty::Make, true);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let record = board.get("shared").unwrap();
        assert_eq!(record.total_attempts, 800);
        assert_eq!(record.total_correct, 800);
        assert_eq!(record.streak, 800);
    }

    /// Write a record with exact totals straight into the map.
    fn seed(board: &ScoreBoard, player: &str, points: u64, correct: u32, attempts: u32) {
        board.lock().insert(
            player.to_string(),
            ScoreRecord {
                player: player.to_string(),
                points,
                streak: 0,
                total_correct: correct,
                total_attempts: attempts,
            },
        );
    }
}
