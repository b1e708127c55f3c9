//! Issued-question store. The server keeps the correct option for each issued
//! question so answers are graded without trusting the client.
//!
//! Records are one-shot: `resolve` removes them. At capacity the oldest record
//! is evicted before inserting; records older than the TTL resolve as missing.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{Difficulty, QuizOption};

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Clone, Debug)]
pub struct StoredQuestion {
    pub qid: String,
    pub difficulty: Difficulty,
    pub correct: QuizOption,
    pub created_at: Instant,
}

pub struct QuestionStore {
    limit: usize,
    ttl: Duration,
    inner: Mutex<HashMap<String, StoredQuestion>>,
}

impl QuestionStore {
    pub fn new(limit: usize, ttl: Duration) -> Self {
        Self {
            limit: limit.max(1),
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    #[instrument(level = "debug", skip(self, correct), fields(%difficulty))]
    pub fn issue(&self, difficulty: Difficulty, correct: QuizOption) -> StoredQuestion {
        self.issue_at(difficulty, correct, Instant::now())
    }

    /// Remove and return the record for `qid`. A second call with the same qid
    /// always misses, and so does a record older than the TTL.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, qid: &str) -> Option<StoredQuestion> {
        self.resolve_at(qid, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn issue_at(&self, difficulty: Difficulty, correct: QuizOption, now: Instant) -> StoredQuestion {
        let stored = StoredQuestion {
            qid: Uuid::new_v4().simple().to_string(),
            difficulty,
            correct,
            created_at: now,
        };

        let mut map = self.lock();
        if map.len() >= self.limit {
            let oldest = map
                .values()
                .min_by_key(|q| q.created_at)
                .map(|q| q.qid.clone());
            if let Some(qid) = oldest {
                map.remove(&qid);
                debug!(target: "quiz", %qid, limit = self.limit, "Evicted oldest question");
            }
        }
        map.insert(stored.qid.clone(), stored.clone());
        stored
    }

    fn resolve_at(&self, qid: &str, now: Instant) -> Option<StoredQuestion> {
        let stored = self.lock().remove(qid)?;
        if now.saturating_duration_since(stored.created_at) > self.ttl {
            debug!(target: "quiz", %qid, "Question expired before it was answered");
            return None;
        }
        Some(stored)
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredQuestion>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option() -> QuizOption {
        QuizOption::new("Audi", Some("A5"), None)
    }

    #[test]
    fn resolve_is_one_shot() {
        let store = QuestionStore::new(8, DEFAULT_TTL);
        let issued = store.issue(Difficulty::MakeModel, option());
        assert_eq!(store.len(), 1);

        let resolved = store.resolve(&issued.qid).expect("first resolve hits");
        assert_eq!(resolved.qid, issued.qid);
        assert_eq!(resolved.difficulty, Difficulty::MakeModel);
        assert_eq!(resolved.correct, option());

        assert!(store.resolve(&issued.qid).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_qid_misses() {
        let store = QuestionStore::new(8, DEFAULT_TTL);
        assert!(store.resolve("nope").is_none());
    }

    #[test]
    fn qids_are_unique() {
        let store = QuestionStore::new(64, DEFAULT_TTL);
        let qids: std::collections::HashSet<_> = (0..32)
            .map(|_| store.issue(Difficulty::Make, option()).qid)
            .collect();
        assert_eq!(qids.len(), 32);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let store = QuestionStore::new(2, DEFAULT_TTL);
        let t0 = Instant::now();
        let first = store.issue_at(Difficulty::Make, option(), t0);
        let second = store.issue_at(Difficulty::Make, option(), t0 + Duration::from_secs(1));
        let third = store.issue_at(Difficulty::Make, option(), t0 + Duration::from_secs(2));
        assert_eq!(store.len(), 2);

        let now = t0 + Duration::from_secs(3);
        assert!(store.resolve_at(&first.qid, now).is_none());
        assert!(store.resolve_at(&second.qid, now).is_some());
        assert!(store.resolve_at(&third.qid, now).is_some());
    }

    #[test]
    fn expired_record_misses_and_is_removed() {
        let store = QuestionStore::new(8, Duration::from_secs(600));
        let t0 = Instant::now();
        let issued = store.issue_at(Difficulty::MakeModelYear, option(), t0);

        let late = t0 + Duration::from_secs(601);
        assert!(store.resolve_at(&issued.qid, late).is_none());
        assert!(store.is_empty());
        assert!(store.resolve_at(&issued.qid, t0).is_none());
    }

    #[test]
    fn record_at_exact_ttl_still_resolves() {
        let store = QuestionStore::new(8, Duration::from_secs(600));
        let t0 = Instant::now();
        let issued = store.issue_at(Difficulty::Make, option(), t0);
        assert!(store
            .resolve_at(&issued.qid, t0 + Duration::from_secs(600))
            .is_some());
    }
}
