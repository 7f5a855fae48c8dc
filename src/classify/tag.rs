//! Tag classification: serialized form plus the structural effect on a report.
//!
//! Capability and feature names are composed from tags recorded *earlier*
//! (theme -> capability -> feature), so the result depends on arrival order.
//! A feature tagged before its capability keeps the shorter name.

use crate::model::{SerializedTag, Tag};

/// What a tag changes on the report root besides being listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEffect {
    None,
    MarkManual,
    /// Dedicated feature tag field, with the uncomposed name
    RecordFeature(SerializedTag),
    RecordIssue(String),
    /// Browser name; used as context only if none is set yet
    DefaultContext(String),
    /// Explicit context; always wins
    SetContext(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagClassification {
    pub serialized: SerializedTag,
    pub effect: TagEffect,
}

/// Classify `tag` against the tags already recorded on the report
pub fn classify(tag: &Tag, recorded: &[SerializedTag]) -> TagClassification {
    // A generic tag spelling a reserved type behaves like the dedicated variant
    let tag = Tag::from(tag.to_serialized());
    let mut serialized = tag.to_serialized();

    let effect = match &tag {
        Tag::Manual => TagEffect::MarkManual,
        Tag::Capability(name) => {
            serialized.name = compose(&[recorded_name(recorded, "theme"), Some(name)]);
            TagEffect::None
        }
        Tag::Feature(name) => {
            serialized.name = compose(&[recorded_name(recorded, "capability"), Some(name)]);
            TagEffect::RecordFeature(tag.to_serialized())
        }
        Tag::Issue(name) => TagEffect::RecordIssue(name.clone()),
        Tag::Browser(name) => TagEffect::DefaultContext(name.clone()),
        Tag::Context(name) => TagEffect::SetContext(name.clone()),
        Tag::Theme(_) | Tag::Generic { .. } => TagEffect::None,
    };

    TagClassification { serialized, effect }
}

/// Name of the first recorded tag of the given type
fn recorded_name<'a>(recorded: &'a [SerializedTag], tag_type: &str) -> Option<&'a str> {
    recorded
        .iter()
        .find(|tag| tag.tag_type == tag_type)
        .map(|tag| tag.name.as_str())
}

/// Join present, non-empty parts with '/'
fn compose(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
