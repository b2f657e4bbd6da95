//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the canonical `Country` enumeration and the region normalizer (`region`)
//! - raw and validated chart rows (`RawRow`, `ChartRecord`)
//! - the parameter model (`SelectionParameters`, `ParameterChange`, `SortKey`, `ViewMode`)

pub mod region;
pub mod types;

pub use region::normalize;
pub use types::*;
