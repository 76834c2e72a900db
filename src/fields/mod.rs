//! Field values, sample-derived fields and previews

pub mod preview;
pub mod sample;
pub mod value;

pub use value::{FieldType, FieldValue};
