//! Loading service settings from TOML plus `CAR_PICKER_*` environment overrides.
//!
//! Precedence: built-in defaults < TOML file at `CAR_PICKER_CONFIG` < environment.
//! The result is validated once and passed by value into `AppState`.

use std::{
  fmt,
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_dir: PathBuf,
  pub static_dir: PathBuf,
  pub static_url_prefix: String,
  pub cars_mount_name: String,
  pub image_extension: String,
  /// Default question timer reported to clients, in seconds.
  pub timeout_seconds: u32,
  pub leaderboard_size: usize,
  pub question_store_limit: usize,
  pub question_ttl_seconds: u64,
  pub port: u16,
  /// Fixed seed for the question sampler; entropy when absent.
  pub rng_seed: Option<u64>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir: PathBuf::from("./data"),
      static_dir: PathBuf::from("./static"),
      static_url_prefix: "/static".into(),
      cars_mount_name: "cars".into(),
      image_extension: "jpg".into(),
      timeout_seconds: 20,
      leaderboard_size: 10,
      question_store_limit: 512,
      question_ttl_seconds: 600,
      port: 3000,
      rng_seed: None,
    }
  }
}

#[derive(Debug)]
pub enum ConfigError {
  Read { path: PathBuf, source: std::io::Error },
  Parse { path: PathBuf, source: toml::de::Error },
  InvalidValue { key: &'static str, value: String },
  MissingDataDir(PathBuf),
  NotADirectory(PathBuf),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Read { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
      ConfigError::Parse { path, source } => write!(f, "failed to parse {}: {}", path.display(), source),
      ConfigError::InvalidValue { key, value } => write!(f, "invalid value for {}: {:?}", key, value),
      ConfigError::MissingDataDir(p) => write!(f, "data directory not found: {}", p.display()),
      ConfigError::NotADirectory(p) => write!(f, "data_dir must be a directory: {}", p.display()),
    }
  }
}

impl std::error::Error for ConfigError {}

impl Settings {
  /// Defaults, then the TOML file named by CAR_PICKER_CONFIG (if any), then env overrides.
  pub fn load() -> Result<Self, ConfigError> {
    let mut settings = match std::env::var("CAR_PICKER_CONFIG") {
      Ok(path) => Self::from_file(Path::new(&path))?,
      Err(_) => Self::default(),
    };
    settings.apply_env(|key| std::env::var(key).ok())?;
    settings.validate()?;
    info!(
      target: "car_picker",
      data_dir = %settings.data_dir.display(),
      leaderboard_size = settings.leaderboard_size,
      question_store_limit = settings.question_store_limit,
      question_ttl_seconds = settings.question_ttl_seconds,
      seeded = settings.rng_seed.is_some(),
      "Settings loaded"
    );
    Ok(settings)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
      error!(target: "car_picker", path = %path.display(), error = %source, "Failed to read TOML config file");
      ConfigError::Read { path: path.to_path_buf(), source }
    })?;
    let settings = Self::from_toml_str(&raw).map_err(|source| {
      error!(target: "car_picker", path = %path.display(), error = %source, "Failed to parse TOML config");
      ConfigError::Parse { path: path.to_path_buf(), source }
    })?;
    info!(target: "car_picker", path = %path.display(), "Loaded settings (TOML)");
    Ok(settings)
  }

  pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(raw)
  }

  /// Overlay values from a key lookup (the process environment in production).
  pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(v) = lookup("CAR_PICKER_DATA_DIR") { self.data_dir = PathBuf::from(v); }
    if let Some(v) = lookup("CAR_PICKER_STATIC_DIR") { self.static_dir = PathBuf::from(v); }
    if let Some(v) = lookup("CAR_PICKER_STATIC_URL_PREFIX") { self.static_url_prefix = v; }
    if let Some(v) = lookup("CAR_PICKER_CARS_MOUNT_NAME") { self.cars_mount_name = v; }
    if let Some(v) = lookup("CAR_PICKER_IMAGE_EXTENSION") { self.image_extension = v; }
    if let Some(v) = lookup("CAR_PICKER_TIMEOUT_SECONDS") {
      self.timeout_seconds = parse_num("CAR_PICKER_TIMEOUT_SECONDS", &v)?;
    }
    if let Some(v) = lookup("CAR_PICKER_LEADERBOARD_SIZE") {
      self.leaderboard_size = parse_num("CAR_PICKER_LEADERBOARD_SIZE", &v)?;
    }
    if let Some(v) = lookup("CAR_PICKER_QUESTION_STORE_LIMIT") {
      self.question_store_limit = parse_num("CAR_PICKER_QUESTION_STORE_LIMIT", &v)?;
    }
    if let Some(v) = lookup("CAR_PICKER_QUESTION_TTL_SECONDS") {
      self.question_ttl_seconds = parse_num("CAR_PICKER_QUESTION_TTL_SECONDS", &v)?;
    }
    if let Some(v) = lookup("CAR_PICKER_RNG_SEED") {
      self.rng_seed = Some(parse_num("CAR_PICKER_RNG_SEED", &v)?);
    }
    if let Some(v) = lookup("PORT") {
      self.port = parse_num("PORT", &v)?;
    }
    Ok(())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.data_dir.exists() {
      return Err(ConfigError::MissingDataDir(self.data_dir.clone()));
    }
    if !self.data_dir.is_dir() {
      return Err(ConfigError::NotADirectory(self.data_dir.clone()));
    }
    if self.leaderboard_size == 0 {
      return Err(ConfigError::InvalidValue { key: "leaderboard_size", value: "0".into() });
    }
    if self.question_store_limit == 0 {
      return Err(ConfigError::InvalidValue { key: "question_store_limit", value: "0".into() });
    }
    if !self.static_url_prefix.starts_with('/') {
      return Err(ConfigError::InvalidValue {
        key: "static_url_prefix",
        value: self.static_url_prefix.clone(),
      });
    }
    Ok(())
  }

  pub fn question_ttl(&self) -> Duration {
    Duration::from_secs(self.question_ttl_seconds)
  }

  /// Public URL for an image, e.g. `/static/cars/Audi_A5_2013_x.jpg`.
  pub fn image_url(&self, relative_path: &str) -> String {
    format!(
      "{}/{}/{}",
      self.static_url_prefix.trim_end_matches('/'),
      self.cars_mount_name,
      relative_path
    )
  }
}

fn parse_num<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
  raw.trim()
    .parse()
    .map_err(|_| ConfigError::InvalidValue { key, value: raw.to_string() })
}
