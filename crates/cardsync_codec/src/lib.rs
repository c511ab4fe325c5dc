//! # cardsync codec
//!
//! Card records and the local deck document format.
//!
//! This crate provides:
//! - [`CardRecord`], the in-memory form of one flashcard and its sync metadata
//! - [`Fingerprint`], a content digest used for duplicate detection
//! - The local document codec ([`decode_document`] / [`encode_document`])
//!
//! ## Document format
//!
//! A deck document is a sequence of blocks. Each block is an optional
//! metadata header, a question and an answer, all separated by `---` lines:
//!
//! ```text
//! ---
//! card_id: 3hZ1aXkq
//! tags: ["rust", "ownership"]
//! ---
//! What does `&mut` guarantee?
//! ---
//! Exclusive access for the lifetime of the borrow.
//! ```
//!
//! ## Usage
//!
//! ```
//! use cardsync_codec::{decode_document, encode_document, CardRecord};
//!
//! let cards = vec![CardRecord::new("Q", "A").with_remote_id("c1")];
//! let text = encode_document(&cards);
//! assert_eq!(decode_document(&text).unwrap(), cards);
//! ```
//!
//! ## Invariants
//!
//! - `decode_document(&encode_document(&cards)) == cards` for every record
//!   sequence `decode_document` can produce
//! - Fingerprints depend only on normalized question and answer text

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod card;
mod decoder;
mod encoder;
mod error;
mod fingerprint;

pub use card::{join_content, split_content, CardRecord, DeckRef, Tags, CONTENT_SEPARATOR};
pub use decoder::{decode_document, DocumentDecoder, DELIMITER};
pub use encoder::{encode_document, DocumentEncoder};
pub use error::{DocumentError, DocumentResult};
pub use fingerprint::{normalize_text, Fingerprint};
