//! Question sampling: pick a correct entry and assemble a deduplicated set of
//! multiple-choice options for a difficulty.
//!
//! Flow:
//! 1) Filter out excluded ids and pick the correct entry uniformly at random.
//! 2) Insert the correct option first so a colliding distractor can never displace it.
//! 3) Walk the difficulty-specific fallback chain (closest distractors first),
//!    ending in a difficulty-agnostic random fill.
//! 4) Shuffle and truncate to `OPTION_COUNT`.
//!
//! All randomness comes from the caller-supplied `Rng`, so a seeded source gives
//! a reproducible question.

use std::{collections::HashSet, fmt};

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, instrument};

use crate::dataset::CarDataset;
use crate::domain::{CarEntry, Difficulty, QuizOption};

pub const OPTION_COUNT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleError {
    /// Every entry was excluded by the caller.
    NoCandidates,
    /// The dataset does not hold enough distinct labels at this difficulty.
    InsufficientOptions { available: usize, required: usize },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::NoCandidates => f.write_str("no entries left after exclusions"),
            SampleError::InsufficientOptions { available, required } => write!(
                f,
                "only {} distinct options available, {} required",
                available, required
            ),
        }
    }
}

impl std::error::Error for SampleError {}

#[derive(Clone, Debug)]
pub struct Question {
    pub entry: CarEntry,
    pub correct: QuizOption,
    pub options: Vec<QuizOption>,
}

/// Label-keyed option set that keeps insertion order.
struct OptionSet {
    difficulty: Difficulty,
    labels: HashSet<String>,
    options: Vec<QuizOption>,
}

impl OptionSet {
    fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            labels: HashSet::with_capacity(OPTION_COUNT),
            options: Vec::with_capacity(OPTION_COUNT),
        }
    }

    fn add(&mut self, entry: &CarEntry) {
        let option = self.difficulty.option_for(entry);
        if self.labels.insert(option.label.clone()) {
            self.options.push(option);
        }
    }

    fn is_full(&self) -> bool {
        self.options.len() >= OPTION_COUNT
    }

    fn len(&self) -> usize {
        self.options.len()
    }
}

#[instrument(level = "debug", skip(dataset, exclude_ids, rng), fields(%difficulty, excluded = exclude_ids.len()))]
pub fn build_question<R: Rng + ?Sized>(
    dataset: &CarDataset,
    difficulty: Difficulty,
    exclude_ids: &HashSet<String>,
    rng: &mut R,
) -> Result<Question, SampleError> {
    let candidates: Vec<&CarEntry> = dataset
        .entries()
        .iter()
        .filter(|e| !exclude_ids.contains(&e.id))
        .collect();
    let entry = *candidates.choose(rng).ok_or(SampleError::NoCandidates)?;

    let correct = difficulty.option_for(entry);
    let options = generate_options(dataset, entry, difficulty, rng)?;
    debug!(target: "quiz", id = %entry.id, correct = %correct.label, "Question sampled");

    Ok(Question {
        entry: entry.clone(),
        correct,
        options,
    })
}

fn generate_options<R: Rng + ?Sized>(
    dataset: &CarDataset,
    correct: &CarEntry,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Vec<QuizOption>, SampleError> {
    let mut set = OptionSet::new(difficulty);
    set.add(correct);

    match difficulty {
        Difficulty::Make => fill_make(dataset, correct, &mut set, rng),
        Difficulty::MakeModel => fill_make_model(dataset, correct, &mut set, rng),
        Difficulty::MakeModelYear => fill_make_model_year(dataset, correct, &mut set, rng),
    }

    if set.len() < OPTION_COUNT {
        return Err(SampleError::InsufficientOptions {
            available: set.len(),
            required: OPTION_COUNT,
        });
    }

    let mut options = set.options;
    options.shuffle(rng);
    options.truncate(OPTION_COUNT);
    Ok(options)
}

/// One random entry from every other make. Ends with the random fill so a
/// dataset with a handful of makes still fails only when labels run out.
fn fill_make<R: Rng + ?Sized>(
    dataset: &CarDataset,
    correct: &CarEntry,
    set: &mut OptionSet,
    rng: &mut R,
) {
    let mut makes = dataset.unique_makes();
    makes.shuffle(rng);
    for make in makes {
        if set.is_full() {
            return;
        }
        if make == correct.make {
            continue;
        }
        if let Some(entry) = dataset.entries_by_make(make).choose(rng) {
            set.add(entry);
        }
    }
    fill_random(dataset, set, rng);
}

/// Same make, different model first.
fn fill_make_model<R: Rng + ?Sized>(
    dataset: &CarDataset,
    correct: &CarEntry,
    set: &mut OptionSet,
    rng: &mut R,
) {
    let mut same_make = dataset.entries_by_make(&correct.make);
    same_make.shuffle(rng);
    add_until_full(set, same_make, |e| e.model != correct.model);
    fill_random(dataset, set, rng);
}

/// Other years of the same model, then anything of the same make that is not
/// the exact (model, year), then the random fill.
fn fill_make_model_year<R: Rng + ?Sized>(
    dataset: &CarDataset,
    correct: &CarEntry,
    set: &mut OptionSet,
    rng: &mut R,
) {
    let mut variants = dataset.entries_by_make_model(&correct.make, &correct.model);
    variants.shuffle(rng);
    add_until_full(set, variants, |e| e.year != correct.year);

    let mut same_make = dataset.entries_by_make(&correct.make);
    same_make.shuffle(rng);
    add_until_full(set, same_make, |e| {
        !(e.model == correct.model && e.year == correct.year)
    });

    fill_random(dataset, set, rng);
}

/// Terminal fallback shared by every difficulty.
fn fill_random<R: Rng + ?Sized>(dataset: &CarDataset, set: &mut OptionSet, rng: &mut R) {
    let mut all: Vec<&CarEntry> = dataset.entries().iter().collect();
    all.shuffle(rng);
    add_until_full(set, all, |_| true);
}

fn add_until_full<'a>(
    set: &mut OptionSet,
    entries: impl IntoIterator<Item = &'a CarEntry>,
    accept: impl Fn(&CarEntry) -> bool,
) {
    for e in entries {
        if set.is_full() {
            break;
        }
        if accept(e) {
            set.add(e);
        }
    }
}
