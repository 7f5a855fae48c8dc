pub mod outcome;
pub mod tag;

pub use tag::{TagClassification, TagEffect};
