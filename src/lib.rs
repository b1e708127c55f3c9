//! Car Picker · quiz backend library.
//!
//! The binary in `main.rs` only loads settings, indexes the dataset, and serves
//! the router built here; everything else lives in these modules.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod sampler;
pub mod score;
pub mod state;
pub mod store;
pub mod telemetry;

pub use routes::build_router;
pub use state::AppState;
