pub mod types;

pub use types::{ActivityDetails, MANUAL_TAG_NAME, Outcome, RawError, ScenarioDetails, SerializedTag, Tag};
