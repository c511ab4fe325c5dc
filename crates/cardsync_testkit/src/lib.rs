//! # Cardsync Testkit
//!
//! Test utilities for cardsync.
//!
//! This crate provides:
//! - Sample documents and seeded in-memory card services
//! - Temporary deck files
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cardsync_testkit::prelude::*;
//!
//! #[test]
//! fn pulls_sample_deck() {
//!     let engine = SyncEngine::new(seeded_service(SAMPLE_DECK_ID, &sample_remote_cards()));
//!     let pulled = engine.pull(SAMPLE_DECK_ID).unwrap();
//!     // ... assertions
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use cardsync_codec::{decode_document, encode_document, CardRecord, DeckRef};
    pub use cardsync_engine::{plan, MemoryCardService, Operation, OperationKind, SyncEngine};
}

pub use fixtures::*;
pub use generators::*;
