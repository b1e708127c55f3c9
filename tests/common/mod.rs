use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use car_picker::{build_router, config::Settings, dataset::CarDataset, AppState};

/// 13 distinct cars across 10 makes.
pub const SAMPLE_CARS: &[(&str, &str, &str, &str)] = &[
    ("Audi", "A5", "2013", "AAA"),
    ("Audi", "A5", "2014", "AAB"),
    ("Audi", "A4", "2013", "AAC"),
    ("BMW", "3Series", "2015", "BBA"),
    ("BMW", "X5", "2016", "BBB"),
    ("Hyundai", "Sonata", "2018", "HYA"),
    ("Kia", "Morning", "2017", "KIA"),
    ("Ford", "Focus", "2015", "FOA"),
    ("Toyota", "Camry", "2019", "TOA"),
    ("Honda", "Civic", "2020", "HOA"),
    ("Mercedes-Benz", "C300", "2018", "MBA"),
    ("Nissan", "Altima", "2016", "NIA"),
    ("Lexus", "RX350", "2021", "LEX"),
];

pub fn sample_file_name(make: &str, model: &str, year: &str, suffix: &str) -> String {
    format!("{make}_{model}_{year}_40_18_200_20_4_70_55_180_30_FWD_5_4_Sedan_{suffix}.jpg")
}

/// Write the sample dataset (plus one malformed file) into a fresh temp dir.
pub fn create_sample_data_dir() -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("car_picker_test_{}_{}", std::process::id(), id));
    // Clean up leftovers from previous runs
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create sample data dir");

    for (make, model, year, suffix) in SAMPLE_CARS {
        let path = dir.join(sample_file_name(make, model, year, suffix));
        std::fs::write(path, [0xff, 0xd8, 0xff]).expect("failed to write sample image");
    }
    std::fs::write(dir.join("Audi_A5_20x3_rest_BAD.jpg"), [0xff, 0xd8, 0xff])
        .expect("failed to write malformed sample");
    dir
}

pub fn test_settings(data_dir: PathBuf) -> Settings {
    Settings {
        data_dir,
        rng_seed: Some(1234),
        ..Settings::default()
    }
}

pub fn app_with(settings: Settings) -> (axum::Router, Arc<AppState>) {
    settings.validate().expect("test settings must be valid");
    let dataset = CarDataset::load(&settings.data_dir, &settings.image_extension)
        .expect("failed to index sample data");
    let state = Arc::new(AppState::new(settings, dataset));
    (build_router(state.clone()), state)
}

pub fn app() -> axum::Router {
    app_with(test_settings(create_sample_data_dir())).0
}
