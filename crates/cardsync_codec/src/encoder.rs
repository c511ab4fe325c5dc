//! Local deck document encoder.

use crate::card::CardRecord;
use crate::decoder::{escape_line, is_null_id, DELIMITER, FIELD_ARCHIVED, FIELD_CARD_ID, FIELD_TAGS};

/// Encode card records into a local deck document.
///
/// Each card becomes one block:
///
/// ```text
/// ---
/// card_id: <id or null>
/// tags: ["a", "b"]
/// archived: true
/// ---
/// <question>
/// ---
/// <answer>
/// ```
///
/// `tags` is omitted when empty and `archived` when false. Content lines
/// that read as `---` are written with a leading `\`.
pub fn encode_document(records: &[CardRecord]) -> String {
    let mut encoder = DocumentEncoder::new();
    for record in records {
        encoder.encode(record);
    }
    encoder.into_string()
}

/// A local deck document encoder.
pub struct DocumentEncoder {
    buffer: String,
}

impl DocumentEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Append one card block.
    pub fn encode(&mut self, record: &CardRecord) {
        self.line(DELIMITER);
        self.encode_card_id(record.remote_id.as_deref());
        if !record.tags.is_empty() {
            self.encode_tags(record.tags.as_slice());
        }
        if record.archived {
            self.line(&format!("{}: true", FIELD_ARCHIVED));
        }
        self.line(DELIMITER);
        self.text(&record.question);
        self.line(DELIMITER);
        self.text(&record.answer);
    }

    /// Consume this encoder and return the document text.
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Get a reference to the document text produced so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn text(&mut self, text: &str) {
        for line in text.lines() {
            self.line(&escape_line(line));
        }
    }

    fn encode_card_id(&mut self, remote_id: Option<&str>) {
        let value = match remote_id {
            None => "null".to_string(),
            Some(id) if needs_quoting(id) => json_string(id),
            Some(id) => id.to_string(),
        };
        self.line(&format!("{}: {}", FIELD_CARD_ID, value));
    }

    fn encode_tags(&mut self, tags: &[String]) {
        let items: Vec<String> = tags.iter().map(|tag| json_string(tag)).collect();
        self.line(&format!("{}: [{}]", FIELD_TAGS, items.join(", ")));
    }
}

impl Default for DocumentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids that would read back differently when written bare.
fn needs_quoting(id: &str) -> bool {
    is_null_id(id) || id.starts_with('"') || id.trim() != id || id.contains('\n')
}

fn json_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_document;

    #[test]
    fn encode_empty() {
        assert_eq!(encode_document(&[]), "");
    }

    #[test]
    fn encode_minimal_card() {
        let card = CardRecord::new("What is 2+2?", "4").with_remote_id("c1");
        assert_eq!(
            encode_document(&[card]),
            "---\ncard_id: c1\n---\nWhat is 2+2?\n---\n4\n"
        );
    }

    #[test]
    fn encode_pending_card_with_metadata() {
        let card = CardRecord::new("Q", "A")
            .with_tags(["rust", "cli"])
            .with_archived(true);
        assert_eq!(
            encode_document(&[card]),
            "---\ncard_id: null\ntags: [\"rust\", \"cli\"]\narchived: true\n---\nQ\n---\nA\n"
        );
    }

    #[test]
    fn encode_escapes_separator_lines() {
        let card = CardRecord::new("Q", "A1\n---\nA2\n\\---").with_remote_id("c1");
        let text = encode_document(std::slice::from_ref(&card));
        assert_eq!(text, "---\ncard_id: c1\n---\nQ\n---\nA1\n\\---\nA2\n\\\\---\n");
        assert_eq!(decode_document(&text).unwrap(), vec![card]);
    }

    #[test]
    fn encode_multiple_cards() {
        let cards = vec![
            CardRecord::new("Q1", "A1").with_remote_id("c1"),
            CardRecord::new("Q2", "A2"),
        ];
        let text = encode_document(&cards);
        assert_eq!(
            text,
            "---\ncard_id: c1\n---\nQ1\n---\nA1\n---\ncard_id: null\n---\nQ2\n---\nA2\n"
        );
    }

    #[test]
    fn encode_quotes_ambiguous_ids() {
        let card = CardRecord::new("Q", "A").with_remote_id("null");
        assert!(encode_document(&[card]).contains("card_id: \"null\"\n"));

        let card = CardRecord::new("Q", "A").with_remote_id(" padded");
        assert!(encode_document(&[card]).contains("card_id: \" padded\"\n"));
    }
}
