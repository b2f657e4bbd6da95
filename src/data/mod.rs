//! Chart data sources.
//!
//! - the immutable, validated record store (`store`)
//! - a seeded synthetic dataset for demos and tests (`sample`)

pub mod sample;
pub mod store;

pub use sample::{SampleConfig, generate_rows};
pub use store::{LoadOutcome, RecordStore};
