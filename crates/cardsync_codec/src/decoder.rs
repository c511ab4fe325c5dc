//! Local deck document decoder.

use crate::card::{CardRecord, Tags};
use crate::error::{DocumentError, DocumentResult};
use std::borrow::Cow;
use std::collections::HashSet;

/// Line separating metadata, question, answer and successive blocks.
pub const DELIMITER: &str = "---";

/// Metadata key holding the remote card id.
pub const FIELD_CARD_ID: &str = "card_id";
/// Metadata key holding the JSON tag array.
pub const FIELD_TAGS: &str = "tags";
/// Metadata key holding the archived flag.
pub const FIELD_ARCHIVED: &str = "archived";

const FIELDS: [&str; 3] = [FIELD_CARD_ID, FIELD_TAGS, FIELD_ARCHIVED];

/// `card_id` values that mean "not created remotely yet".
const NULL_IDS: [&str; 4] = ["null", "none", "~", ""];

/// Decode a local deck document into card records, in document order.
///
/// # Errors
///
/// Returns [`DocumentError::MalformedDocument`] if a block is missing a
/// delimiter, has an empty question or answer, carries an unparseable
/// metadata header, or repeats a card id. Returns
/// [`DocumentError::UnknownField`] for metadata keys outside
/// `card_id`, `tags` and `archived`.
pub fn decode_document(text: &str) -> DocumentResult<Vec<CardRecord>> {
    DocumentDecoder::new(text).decode()
}

/// Returns true if a bare `card_id` value denotes a pending card.
pub(crate) fn is_null_id(value: &str) -> bool {
    NULL_IDS.iter().any(|null| value.eq_ignore_ascii_case(null))
}

/// Number of backslashes in front of a `---` line (`Some(0)` for a bare
/// delimiter), or `None` for any other line.
fn escape_depth(line: &str) -> Option<usize> {
    let prefix = line.trim_end().strip_suffix(DELIMITER)?;
    prefix
        .chars()
        .all(|c| c == '\\')
        .then_some(prefix.len())
}

/// Escapes a content line that would otherwise read as a delimiter.
///
/// `---` becomes `\---`, and already escaped lines gain one more backslash
/// so that unescaping is exact.
pub(crate) fn escape_line(line: &str) -> Cow<'_, str> {
    match escape_depth(line) {
        Some(_) => Cow::Owned(format!("\\{}", line)),
        None => Cow::Borrowed(line),
    }
}

fn unescape_line(line: &str) -> &str {
    match escape_depth(line) {
        Some(depth) if depth > 0 => &line[1..],
        _ => line,
    }
}

/// Text between two delimiter lines.
#[derive(Debug)]
struct Segment<'a> {
    lines: Vec<&'a str>,
    /// 1-based line number of the first line.
    start_line: usize,
}

impl<'a> Segment<'a> {
    fn new(start_line: usize) -> Self {
        Self {
            lines: Vec::new(),
            start_line,
        }
    }

    fn text(&self) -> String {
        let lines: Vec<&str> = self.lines.iter().map(|line| unescape_line(line)).collect();
        lines.join("\n").trim().to_string()
    }

    fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    fn is_comment(&self) -> bool {
        self.lines.iter().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        })
    }

    /// A segment is a metadata header if its first non-blank line opens with
    /// a known field.
    fn is_header(&self) -> bool {
        self.lines
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .and_then(|line| line.split_once(':'))
            .is_some_and(|(key, _)| FIELDS.contains(&key.trim()))
    }

    fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(move |(offset, line)| (self.start_line + offset, *line))
    }
}

/// Metadata collected from a block header.
#[derive(Debug, Default)]
struct Metadata {
    remote_id: Option<String>,
    tags: Tags,
    archived: bool,
    /// Line of the header, for error reporting.
    line: usize,
}

/// Where the decoder is within the current block.
enum State {
    BlockStart,
    Question(Metadata),
    Answer(Metadata, String),
}

/// A local deck document decoder.
///
/// The document is cut into segments at every delimiter line. Segments are
/// then consumed as `[header] question answer` triples; the header is
/// optional and defaults to a pending card with no tags.
pub struct DocumentDecoder<'a> {
    text: &'a str,
    seen_ids: HashSet<String>,
}

impl<'a> DocumentDecoder<'a> {
    /// Create a new decoder for the given document text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            seen_ids: HashSet::new(),
        }
    }

    /// Decode all card blocks.
    pub fn decode(mut self) -> DocumentResult<Vec<CardRecord>> {
        let segments = self.segments();
        let mut cards = Vec::new();
        let mut state = State::BlockStart;

        for (index, segment) in segments.iter().enumerate() {
            let block = cards.len() + 1;
            state = match state {
                State::BlockStart => {
                    if segment.is_blank() || (index == 0 && segment.is_comment()) {
                        State::BlockStart
                    } else if segment.is_header() {
                        State::Question(self.parse_header(segment, block)?)
                    } else {
                        let metadata = Metadata {
                            line: segment.start_line,
                            ..Metadata::default()
                        };
                        State::Answer(metadata, segment.text())
                    }
                }
                State::Question(metadata) => {
                    let question = segment.text();
                    if question.is_empty() {
                        return Err(DocumentError::malformed(
                            block,
                            segment.start_line,
                            "empty question",
                        ));
                    }
                    State::Answer(metadata, question)
                }
                State::Answer(metadata, question) => {
                    let answer = segment.text();
                    if answer.is_empty() {
                        return Err(DocumentError::malformed(
                            block,
                            segment.start_line,
                            "empty answer",
                        ));
                    }
                    cards.push(CardRecord {
                        remote_id: metadata.remote_id,
                        question,
                        answer,
                        tags: metadata.tags,
                        archived: metadata.archived,
                    });
                    State::BlockStart
                }
            };
        }

        let block = cards.len() + 1;
        match state {
            State::BlockStart => Ok(cards),
            State::Question(metadata) => Err(DocumentError::malformed(
                block,
                metadata.line,
                "block ends after its metadata header; missing question and answer",
            )),
            State::Answer(metadata, _) => Err(DocumentError::malformed(
                block,
                metadata.line,
                "block is missing the `---` line between question and answer",
            )),
        }
    }

    fn segments(&self) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut current = Segment::new(1);
        for (index, line) in self.text.lines().enumerate() {
            if line.trim_end() == DELIMITER {
                segments.push(std::mem::replace(&mut current, Segment::new(index + 2)));
            } else {
                current.lines.push(line);
            }
        }
        segments.push(current);
        segments
    }

    fn parse_header(&mut self, segment: &Segment<'a>, block: usize) -> DocumentResult<Metadata> {
        let mut metadata = Metadata {
            line: segment.start_line,
            ..Metadata::default()
        };
        let mut seen_fields = HashSet::new();

        for (line_no, line) in segment.numbered_lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                DocumentError::malformed(block, line_no, format!("expected `key: value`, got `{}`", line))
            })?;
            let key = key.trim();
            let value = value.trim();

            if !FIELDS.contains(&key) {
                return Err(DocumentError::unknown_field(key, block, line_no));
            }
            if !seen_fields.insert(key) {
                return Err(DocumentError::malformed(
                    block,
                    line_no,
                    format!("duplicate field `{}`", key),
                ));
            }

            match key {
                FIELD_CARD_ID => {
                    metadata.remote_id = parse_card_id(value)
                        .map_err(|message| DocumentError::malformed(block, line_no, message))?;
                    if let Some(id) = &metadata.remote_id {
                        if !self.seen_ids.insert(id.clone()) {
                            return Err(DocumentError::malformed(
                                block,
                                line_no,
                                format!("card_id `{}` appears in more than one block", id),
                            ));
                        }
                    }
                }
                FIELD_TAGS => {
                    metadata.tags = parse_tags(value)
                        .map_err(|message| DocumentError::malformed(block, line_no, message))?;
                }
                _ => {
                    metadata.archived = parse_archived(value)
                        .map_err(|message| DocumentError::malformed(block, line_no, message))?;
                }
            }
        }

        Ok(metadata)
    }
}

fn parse_card_id(value: &str) -> Result<Option<String>, String> {
    if is_null_id(value) {
        return Ok(None);
    }
    if value.starts_with('"') {
        return serde_json::from_str::<String>(value)
            .map(Some)
            .map_err(|e| format!("invalid quoted card_id: {}", e));
    }
    Ok(Some(value.to_string()))
}

fn parse_tags(value: &str) -> Result<Tags, String> {
    if value.is_empty() {
        return Ok(Tags::new());
    }
    serde_json::from_str::<Vec<String>>(value)
        .map(Tags::from)
        .map_err(|e| format!("tags must be a JSON array of strings: {}", e))
}

fn parse_archived(value: &str) -> Result<bool, String> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("archived must be `true` or `false`, got `{}`", value))
    }
}
