//! Core data types: catalog entities, enums, samples and series.

pub mod entities;
pub mod enums;
pub mod samples;

pub use entities::*;
pub use enums::*;
pub use samples::*;
