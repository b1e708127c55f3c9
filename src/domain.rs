//! Domain models used by the backend: dataset entries, difficulty levels, and quiz options.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One indexed dataset record, derived from an image filename.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CarEntry {
  pub id: String,
  pub make: String,
  pub model: String,
  pub year: String,
  pub relative_path: String,
}

/// Granularity of a question: which fields of an entry the player has to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Make,
  MakeModel,
  MakeModelYear,
}

impl Default for Difficulty {
  fn default() -> Self { Difficulty::MakeModelYear }
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Make => "make",
      Difficulty::MakeModel => "make_model",
      Difficulty::MakeModelYear => "make_model_year",
    }
  }

  /// Extra points awarded on top of the base score for a correct answer.
  pub fn bonus(self) -> u64 {
    match self {
      Difficulty::Make => 0,
      Difficulty::MakeModel => 5,
      Difficulty::MakeModelYear => 10,
    }
  }

  pub fn prompt(self) -> &'static str {
    match self {
      Difficulty::Make => "Pick the correct manufacturer for this car.",
      Difficulty::MakeModel => "Pick the correct manufacturer and model.",
      Difficulty::MakeModelYear => "Pick the correct manufacturer, model, and year.",
    }
  }

  /// Project an entry onto the fields exposed at this difficulty.
  pub fn option_for(self, entry: &CarEntry) -> QuizOption {
    match self {
      Difficulty::Make => QuizOption::new(&entry.make, None, None),
      Difficulty::MakeModel => QuizOption::new(&entry.make, Some(&entry.model), None),
      Difficulty::MakeModelYear => {
        QuizOption::new(&entry.make, Some(&entry.model), Some(&entry.year))
      }
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returned when a difficulty string is not one of the known wire names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unsupported difficulty: {}", self.0)
  }
}

impl std::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
  type Err = UnknownDifficulty;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "make" => Ok(Difficulty::Make),
      "make_model" => Ok(Difficulty::MakeModel),
      "make_model_year" => Ok(Difficulty::MakeModelYear),
      other => Err(UnknownDifficulty(other.to_string())),
    }
  }
}

/// A candidate answer. `label` is the space-joined rendering of the present
/// fields and doubles as the dedup key: two options are the same choice iff
/// their labels match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
  pub make: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub model: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub year: Option<String>,
  pub label: String,
}

impl QuizOption {
  pub fn new(make: &str, model: Option<&str>, year: Option<&str>) -> Self {
    let label = [Some(make), model, year]
      .into_iter()
      .flatten()
      .collect::<Vec<_>>()
      .join(" ");
    Self {
      make: make.to_string(),
      model: model.map(str::to_string),
      year: year.map(str::to_string),
      label,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry() -> CarEntry {
    CarEntry {
      id: "Audi_A5_2013_x".into(),
      make: "Audi".into(),
      model: "A5".into(),
      year: "2013".into(),
      relative_path: "Audi_A5_2013_x.jpg".into(),
    }
  }

  #[test]
  fn option_projection_follows_difficulty() {
    let e = entry();

    let make = Difficulty::Make.option_for(&e);
    assert_eq!(make.label, "Audi");
    assert_eq!(make.model, None);
    assert_eq!(make.year, None);

    let make_model = Difficulty::MakeModel.option_for(&e);
    assert_eq!(make_model.label, "Audi A5");
    assert_eq!(make_model.model.as_deref(), Some("A5"));
    assert_eq!(make_model.year, None);

    let full = Difficulty::MakeModelYear.option_for(&e);
    assert_eq!(full.label, "Audi A5 2013");
    assert_eq!(full.year.as_deref(), Some("2013"));
  }

  #[test]
  fn difficulty_parses_wire_names() {
    for d in [Difficulty::Make, Difficulty::MakeModel, Difficulty::MakeModelYear] {
      assert_eq!(d.as_str().parse::<Difficulty>(), Ok(d));
    }
    assert_eq!(
      "expert".parse::<Difficulty>(),
      Err(UnknownDifficulty("expert".into()))
    );
  }

  #[test]
  fn difficulty_serializes_snake_case() {
    let json = serde_json::to_string(&Difficulty::MakeModelYear).unwrap();
    assert_eq!(json, "\"make_model_year\"");
  }
}
