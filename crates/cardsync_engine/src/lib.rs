//! # Cardsync Engine
//!
//! Reconciliation engine that makes a remote flashcard deck match a local
//! deck document.
//!
//! This crate provides:
//! - A remote card service abstraction with an in-memory implementation
//! - An HTTP implementation of the Mochi REST API over a pluggable client
//! - Paginated remote fetching
//! - Fingerprint-based duplicate detection
//! - Deterministic push planning (create, update, delete)
//! - Ordered plan execution with partial-failure reporting
//!
//! ## Architecture
//!
//! A push runs in three phases:
//! 1. Decode the local document and fetch the whole remote deck
//! 2. Plan the operations that make the remote deck match the local one
//! 3. Execute creates, then updates, then deletes
//!
//! ## Key Invariants
//!
//! - The local document is the source of truth
//! - Nothing is written if decoding or fetching fails
//! - A pending card whose content already exists remotely is not re-created
//!   unless forced
//! - Remote cards not referenced locally are deleted
//! - Completed writes are never rolled back
//!
//! ## Example
//!
//! ```
//! use cardsync_codec::CardRecord;
//! use cardsync_engine::{MemoryCardService, SyncEngine};
//!
//! let service = MemoryCardService::new();
//! service.add_deck("d1", "Rust");
//! service.insert_card("d1", CardRecord::new("Old", "Gone").with_remote_id("c1"));
//!
//! let engine = SyncEngine::new(service);
//! let outcome = engine
//!     .push("d1", "---\ncard_id: null\n---\nWhat is 2+2?\n---\n4\n", false)
//!     .unwrap();
//! assert_eq!(outcome.report.created_count(), 1);
//! assert_eq!(outcome.report.deleted_count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod executor;
mod fetcher;
mod http;
mod index;
mod planner;
mod service;

pub use config::{ServiceConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use engine::{PulledDeck, PushOutcome, PushPlan, SyncEngine, SyncStats};
pub use error::{ServiceError, ServiceResult, SyncError, SyncResult};
pub use executor::{assign_remote_ids, execute_plan, AppliedOperation, ExecutionReport};
pub use fetcher::fetch_remote_cards;
pub use http::{HttpCardService, HttpClient, HttpRequest, HttpResponse, Method};
pub use index::FingerprintIndex;
pub use planner::{plan, DuplicateMatch, Operation, OperationKind, Plan, PlanSummary};
pub use service::{CardPage, CardService, MemoryCardService, ServiceCall};
