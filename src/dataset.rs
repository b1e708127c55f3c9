//! Dataset index: turns a directory of `<make>_<model>_<year>_<...>.<ext>` image
//! files into `CarEntry` records plus lookup tables by make, model, and
//! (make, model).
//!
//! The index is built once at startup and is read-only afterwards. Lookup maps
//! are `BTreeMap`s so iteration order (and therefore seeded sampling) does not
//! depend on hash seeds.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument};

use crate::domain::CarEntry;

/// Why a filename was skipped during indexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedFilename {
    MissingFields { found: usize },
    EmptyMakeOrModel,
    InvalidYear(String),
    NotUtf8,
}

impl fmt::Display for MalformedFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedFilename::MissingFields { found } => {
                write!(f, "expected at least 4 underscore-separated fields, found {}", found)
            }
            MalformedFilename::EmptyMakeOrModel => f.write_str("make or model field is empty"),
            MalformedFilename::InvalidYear(y) => write!(f, "year '{}' is not 4 digits", y),
            MalformedFilename::NotUtf8 => f.write_str("file name is not valid UTF-8"),
        }
    }
}

impl std::error::Error for MalformedFilename {}

/// Parse a single image path into an entry. Only the first three fields carry
/// meaning; at least one trailing field must exist.
pub fn parse_filename(path: &Path) -> Result<CarEntry, MalformedFilename> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(MalformedFilename::NotUtf8)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or(MalformedFilename::NotUtf8)?;

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 4 {
        return Err(MalformedFilename::MissingFields { found: parts.len() });
    }

    let (make, model, year) = (parts[0], parts[1], parts[2]);
    if make.is_empty() || model.is_empty() {
        return Err(MalformedFilename::EmptyMakeOrModel);
    }
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedFilename::InvalidYear(year.to_string()));
    }

    Ok(CarEntry {
        id: stem.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year: year.to_string(),
        relative_path: file_name.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct CarDataset {
    root: PathBuf,
    entries: Vec<CarEntry>,
    by_make: BTreeMap<String, Vec<usize>>,
    by_model: BTreeMap<String, Vec<usize>>,
    by_make_model: BTreeMap<(String, String), Vec<usize>>,
}

impl CarDataset {
    /// Scan `root` (non-recursive) for files with the given extension and index
    /// every well-formed filename. Malformed names are logged and skipped;
    /// only a failure to read the directory itself is an error.
    #[instrument(level = "info", skip_all)]
    pub fn load(root: impl AsRef<Path>, extension: &str) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        info!(target: "dataset", root = %root.display(), "Scanning data directory");

        let mut paths = Vec::new();
        for dirent in fs::read_dir(&root)? {
            let path = dirent?.path();
            if !path.is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false);
            if matches_ext {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut entries = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;
        for path in &paths {
            match parse_filename(path) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    skipped += 1;
                    debug!(target: "dataset", file = %path.display(), %reason, "Skipping malformed filename");
                }
            }
        }

        let dataset = Self::from_entries(root, entries);
        info!(
            target: "dataset",
            entries = dataset.len(),
            skipped,
            makes = dataset.by_make.len(),
            models = dataset.by_model.len(),
            "Dataset indexed"
        );
        Ok(dataset)
    }

    /// Build an index from already-parsed entries. Entries are sorted by their
    /// relative path so the flat list matches what `load` would produce.
    pub fn from_entries(root: impl Into<PathBuf>, mut entries: Vec<CarEntry>) -> Self {
        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut by_make: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_model: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_make_model: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
        for (idx, e) in entries.iter().enumerate() {
            by_make.entry(e.make.clone()).or_default().push(idx);
            by_model.entry(e.model.clone()).or_default().push(idx);
            by_make_model
                .entry((e.make.clone(), e.model.clone()))
                .or_default()
                .push(idx);
        }

        Self {
            root: root.into(),
            entries,
            by_make,
            by_model,
            by_make_model,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[CarEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CarEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn unique_makes(&self) -> Vec<&str> {
        self.by_make.keys().map(String::as_str).collect()
    }

    pub fn unique_models(&self) -> Vec<&str> {
        self.by_model.keys().map(String::as_str).collect()
    }

    pub fn entries_by_make(&self, make: &str) -> Vec<&CarEntry> {
        self.collect(self.by_make.get(make))
    }

    pub fn entries_by_model(&self, model: &str) -> Vec<&CarEntry> {
        self.collect(self.by_model.get(model))
    }

    pub fn entries_by_make_model(&self, make: &str, model: &str) -> Vec<&CarEntry> {
        self.collect(self.by_make_model.get(&(make.to_string(), model.to_string())))
    }

    /// Absolute (root-joined) location of an entry's image file.
    pub fn resolve_path(&self, entry: &CarEntry) -> PathBuf {
        self.root.join(&entry.relative_path)
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<&CarEntry> {
        indices
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }
}
