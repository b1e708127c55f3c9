//! Application state shared by every handler.
//!
//! This module owns:
//!   - the dataset index (read-only after startup, no lock)
//!   - the issued-question store and the score board (each behind its own lock)
//!   - the sampler's random source (seedable through settings)
//!   - the validated settings

use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument};

use crate::config::Settings;
use crate::dataset::CarDataset;
use crate::score::ScoreBoard;
use crate::store::QuestionStore;

pub struct AppState {
    pub settings: Settings,
    pub dataset: Arc<CarDataset>,
    pub questions: QuestionStore,
    pub scoreboard: ScoreBoard,
    rng: Mutex<StdRng>,
}

impl AppState {
    /// Wire the core components from validated settings and a built index.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: Settings, dataset: CarDataset) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let questions = QuestionStore::new(settings.question_store_limit, settings.question_ttl());
        let scoreboard = ScoreBoard::new(settings.leaderboard_size);

        info!(
            target: "car_picker",
            entries = dataset.len(),
            store_limit = settings.question_store_limit,
            leaderboard_size = settings.leaderboard_size,
            "Application state ready"
        );

        Self {
            settings,
            dataset: Arc::new(dataset),
            questions,
            scoreboard,
            rng: Mutex::new(rng),
        }
    }

    /// Run `f` with exclusive access to the sampler's random source.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}
