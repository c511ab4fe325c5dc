//! Card records and deck references.

use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Separator between question and answer in remote card content.
pub const CONTENT_SEPARATOR: &str = "---";

/// A set of tags that remembers insertion order.
///
/// Equality ignores order; iteration and serialization keep the order the
/// tags were first seen in. Duplicates are dropped on insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a tag. Returns false if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Returns true if the tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Returns the number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the tags in insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn as_set(&self) -> BTreeSet<&str> {
        self.iter().collect()
    }
}

impl PartialEq for Tags {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.as_set() == other.as_set()
    }
}

impl Eq for Tags {}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// A single flashcard and its sync metadata.
///
/// A record without a `remote_id` is a pending creation: the remote service
/// has never seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    /// Identifier assigned by the remote service.
    pub remote_id: Option<String>,
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
    /// Tags attached to the card.
    pub tags: Tags,
    /// Whether the card is archived.
    pub archived: bool,
}

impl CardRecord {
    /// Creates a pending card with no tags.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            remote_id: None,
            question: question.into(),
            answer: answer.into(),
            tags: Tags::new(),
            archived: false,
        }
    }

    /// Builds a record from remote card content (`question --- answer`).
    pub fn from_remote(
        remote_id: impl Into<String>,
        content: &str,
        tags: impl Into<Tags>,
        archived: bool,
    ) -> Self {
        let (question, answer) = split_content(content);
        Self {
            remote_id: Some(remote_id.into()),
            question: question.to_string(),
            answer: answer.to_string(),
            tags: tags.into(),
            archived,
        }
    }

    /// Sets the remote id.
    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }

    /// Sets the tags.
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the archived flag.
    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Returns true if the remote service does not know this card yet.
    pub fn is_pending(&self) -> bool {
        self.remote_id.is_none()
    }

    /// Returns the content fingerprint of this card.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.question, &self.answer)
    }

    /// Returns the content string sent to the remote service.
    pub fn content(&self) -> String {
        join_content(&self.question, &self.answer)
    }

    /// Returns true if syncing `other` over this card would change nothing
    /// material: same fingerprint, same tag set, same archived flag.
    pub fn materially_equal(&self, other: &CardRecord) -> bool {
        self.archived == other.archived
            && self.tags == other.tags
            && self.fingerprint() == other.fingerprint()
    }
}

/// Splits remote card content at the first separator line and trims both
/// sides. Later separator lines (extra card sides) stay in the answer.
///
/// Content without a separator line is treated as a question with an empty
/// answer.
pub fn split_content(content: &str) -> (&str, &str) {
    let mut start = 0;
    for line in content.split_inclusive('\n') {
        let end = start + line.len();
        if line.trim() == CONTENT_SEPARATOR {
            return (content[..start].trim(), content[end..].trim());
        }
        start = end;
    }
    (content.trim(), "")
}

/// Joins question and answer into remote card content.
pub fn join_content(question: &str, answer: &str) -> String {
    format!("{}\n{}\n{}", question, CONTENT_SEPARATOR, answer)
}

/// Reference to a remote deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRef {
    /// Opaque deck identifier.
    pub deck_id: String,
    /// Display name, used only to name the local document.
    pub deck_name: String,
}

impl DeckRef {
    /// Creates a deck reference.
    pub fn new(deck_id: impl Into<String>, deck_name: impl Into<String>) -> Self {
        Self {
            deck_id: deck_id.into(),
            deck_name: deck_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_compare_as_sets() {
        let a: Tags = vec!["rust", "cli"].into_iter().collect();
        let b: Tags = vec!["cli", "rust"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), &["rust".to_string(), "cli".to_string()]);

        let c: Tags = vec!["rust"].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn tags_drop_duplicates() {
        let mut tags: Tags = vec!["a", "b", "a"].into_iter().collect();
        assert_eq!(tags.len(), 2);
        assert!(!tags.insert("b"));
        assert!(tags.insert("c"));
        assert!(tags.contains("c"));
    }

    #[test]
    fn split_remote_content() {
        assert_eq!(split_content("Q1\n---\nA1"), ("Q1", "A1"));
        assert_eq!(split_content("  Q \n---\n A\n---\nmore "), ("Q", "A\n---\nmore"));
        assert_eq!(split_content("only a question"), ("only a question", ""));
        assert_eq!(split_content("Q\n---\nA1\n---\nA2"), ("Q", "A1\n---\nA2"));
    }

    #[test]
    fn split_ignores_inline_separator() {
        assert_eq!(split_content("a---b\n---\nc"), ("a---b", "c"));
        assert_eq!(split_content("x --- y"), ("x --- y", ""));
        assert_eq!(split_content("---\nA"), ("", "A"));
    }

    #[test]
    fn record_from_remote() {
        let card = CardRecord::from_remote("c1", "Q\n---\nA", vec!["t".to_string()], true);
        assert_eq!(card.remote_id.as_deref(), Some("c1"));
        assert_eq!(card.question, "Q");
        assert_eq!(card.answer, "A");
        assert!(card.archived);
        assert!(!card.is_pending());
        assert_eq!(card.content(), "Q\n---\nA");
    }

    #[test]
    fn material_equality_ignores_whitespace_and_id() {
        let local = CardRecord::new("Q", "A\n").with_tags(["x"]);
        let remote = CardRecord::new(" Q", "A").with_tags(["x"]).with_remote_id("c1");
        assert!(local.materially_equal(&remote));

        assert!(!local.materially_equal(&remote.clone().with_archived(true)));
        assert!(!local.materially_equal(&remote.clone().with_tags(["y"])));
    }
}
