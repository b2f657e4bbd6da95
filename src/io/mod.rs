//! Input/output helpers.
//!
//! - CSV ingest of raw chart rows (`ingest`)
//! - view JSON and raw CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
