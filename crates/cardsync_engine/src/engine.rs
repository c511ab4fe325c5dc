//! Pull and push workflows.

use crate::config::{ServiceConfig, DEFAULT_PAGE_SIZE};
use crate::error::{SyncError, SyncResult};
use crate::executor::{assign_remote_ids, execute_plan, ExecutionReport};
use crate::fetcher::fetch_remote_cards;
use crate::http::{HttpCardService, HttpClient};
use crate::planner::{plan, Plan};
use crate::service::CardService;
use cardsync_codec::{decode_document, encode_document, CardRecord, DeckRef};
use parking_lot::RwLock;
use tracing::{info, warn};

/// Statistics about engine runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Decks pulled.
    pub pulls: u64,
    /// Plans executed to completion.
    pub pushes: u64,
    /// Remote writes applied, including those of failed pushes.
    pub operations_applied: u64,
    /// Pending records suppressed as duplicates.
    pub duplicates_suppressed: u64,
    /// Last error message.
    pub last_error: Option<String>,
}

/// A deck fetched from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulledDeck {
    /// The deck.
    pub deck: DeckRef,
    /// Its cards in service order.
    pub records: Vec<CardRecord>,
    /// The cards encoded as a local document.
    pub document: String,
}

/// Everything a push decided before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// Decoded local records.
    pub local: Vec<CardRecord>,
    /// Remote cards as fetched.
    pub remote: Vec<CardRecord>,
    /// Operations to apply.
    pub plan: Plan,
}

impl PushPlan {
    /// Returns true if nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Re-encodes the local records with the ids learned from `report`.
    ///
    /// Works with partial reports, so cards created before a failure keep
    /// their new ids.
    pub fn updated_document(&self, report: &ExecutionReport) -> String {
        let mut records = self.local.clone();
        assign_remote_ids(&mut records, &self.plan, report);
        encode_document(&records)
    }

    /// Like [`PushPlan::updated_document`], but `None` when no record gained
    /// an id, so callers can leave the local document untouched.
    pub fn document_with_new_ids(&self, report: &ExecutionReport) -> Option<String> {
        let mut records = self.local.clone();
        let assigned = assign_remote_ids(&mut records, &self.plan, report);
        (assigned > 0).then(|| encode_document(&records))
    }
}

/// Result of a completed push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// What was planned.
    pub plan: PushPlan,
    /// What was applied.
    pub report: ExecutionReport,
}

impl PushOutcome {
    /// The local document with newly assigned ids.
    pub fn updated_document(&self) -> String {
        self.plan.updated_document(&self.report)
    }
}

/// Reconciles local deck documents with a remote card service.
///
/// Runs are sequential: fetch, then plan, then execute. Nothing is written
/// unless fetching and planning both succeed.
pub struct SyncEngine<S: CardService> {
    service: S,
    page_size: u32,
    stats: RwLock<SyncStats>,
}

impl<S: CardService> SyncEngine<S> {
    /// Creates an engine over a card service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            page_size: DEFAULT_PAGE_SIZE,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Sets the page size used when listing cards.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the card service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the listing page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Lists all decks.
    pub fn list_decks(&self) -> SyncResult<Vec<DeckRef>> {
        let decks = self.service.list_decks();
        self.track(decks.map_err(Into::into))
    }

    /// Looks up one deck.
    pub fn deck(&self, deck_id: &str) -> SyncResult<DeckRef> {
        let deck = self.service.get_deck(deck_id);
        self.track(deck.map_err(Into::into))
    }

    /// Fetches every card of a deck.
    pub fn fetch(&self, deck_id: &str) -> SyncResult<Vec<CardRecord>> {
        self.track(fetch_remote_cards(&self.service, deck_id, self.page_size))
    }

    /// Fetches a deck and encodes it as a local document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnrepresentableCard`] if a card would not read
    /// back unchanged from the document (for example an empty answer).
    pub fn pull(&self, deck_id: &str) -> SyncResult<PulledDeck> {
        let deck = self.deck(deck_id)?;
        let records = self.fetch(deck_id)?;
        for record in &records {
            self.track(check_representable(record))?;
        }
        let document = encode_document(&records);
        info!(deck_id, cards = records.len(), "pulled deck");
        self.stats.write().pulls += 1;
        Ok(PulledDeck {
            deck,
            records,
            document,
        })
    }

    /// Decodes a local document, fetches the deck and plans the push.
    ///
    /// No remote write happens here.
    pub fn plan_push(&self, deck_id: &str, document: &str, force: bool) -> SyncResult<PushPlan> {
        let local = self.track(decode_document(document).map_err(Into::into))?;
        let remote = self.fetch(deck_id)?;
        let plan = plan(&local, &remote, force);
        info!(
            deck_id,
            local = local.len(),
            remote = remote.len(),
            summary = %plan.summary(),
            "planned push"
        );
        if !plan.duplicates.is_empty() {
            warn!(deck_id, count = plan.duplicates.len(), "duplicate cards suppressed");
            self.stats.write().duplicates_suppressed += plan.duplicates.len() as u64;
        }
        Ok(PushPlan {
            local,
            remote,
            plan,
        })
    }

    /// Applies a plan to a deck.
    pub fn execute(&self, deck_id: &str, plan: &Plan) -> SyncResult<ExecutionReport> {
        let result = execute_plan(&self.service, deck_id, plan);
        {
            let mut stats = self.stats.write();
            match &result {
                Ok(report) => {
                    stats.pushes += 1;
                    stats.operations_applied += report.applied.len() as u64;
                }
                Err(err) => {
                    if let Some(report) = err.report() {
                        stats.operations_applied += report.applied.len() as u64;
                    }
                }
            }
        }
        self.track(result)
    }

    /// Plans and executes a push in one step.
    pub fn push(&self, deck_id: &str, document: &str, force: bool) -> SyncResult<PushOutcome> {
        let plan = self.plan_push(deck_id, document, force)?;
        let report = self.execute(deck_id, &plan.plan)?;
        Ok(PushOutcome { plan, report })
    }

    fn track<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(err) = &result {
            self.stats.write().last_error = Some(err.to_string());
        }
        result
    }
}

/// Checks that a record decodes back to itself once encoded.
fn check_representable(record: &CardRecord) -> SyncResult<()> {
    let unrepresentable = |reason: String| SyncError::UnrepresentableCard {
        remote_id: record.remote_id.clone().unwrap_or_default(),
        reason,
    };
    let document = encode_document(std::slice::from_ref(record));
    match decode_document(&document) {
        Ok(decoded) if decoded.len() == 1 && decoded[0] == *record => Ok(()),
        Ok(_) => Err(unrepresentable("content changes when read back".into())),
        Err(err) => Err(unrepresentable(err.to_string())),
    }
}

impl<C: HttpClient> SyncEngine<HttpCardService<C>> {
    /// Creates an engine talking to the Mochi API through `client`.
    pub fn http(config: ServiceConfig, client: C) -> SyncResult<Self> {
        let page_size = config.page_size;
        let service = HttpCardService::new(config, client)?;
        Ok(Self::new(service).with_page_size(page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MemoryCardService;
    use cardsync_codec::Tags;

    fn engine() -> SyncEngine<MemoryCardService> {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust");
        service.insert_card("d1", CardRecord::new("Q1", "A1").with_remote_id("c1"));
        SyncEngine::new(service).with_page_size(10)
    }

    #[test]
    fn pull_encodes_remote_cards() {
        let engine = engine();
        let pulled = engine.pull("d1").unwrap();
        assert_eq!(pulled.deck.deck_name, "Rust");
        assert_eq!(pulled.records.len(), 1);
        assert!(pulled.document.contains("card_id: c1"));
        assert_eq!(engine.stats().pulls, 1);
    }

    #[test]
    fn malformed_document_aborts_before_fetch() {
        let engine = engine();
        let err = engine.plan_push("d1", "---\ncard_id: x\n", false).unwrap_err();
        assert!(matches!(err, SyncError::Document(_)));
        assert!(engine.service().calls().is_empty());
        assert!(engine.stats().last_error.is_some());
    }

    #[test]
    fn push_then_updated_document_is_stable() {
        let engine = engine();
        let document = "---\ncard_id: c1\n---\nQ1\n---\nA1\n---\ncard_id: null\n---\nQ2\n---\nA2\n";

        let outcome = engine.push("d1", document, false).unwrap();
        assert_eq!(outcome.report.created_count(), 1);
        let updated = outcome.updated_document();
        assert!(!updated.contains("null"));

        let again = engine.plan_push("d1", &updated, false).unwrap();
        assert!(again.is_empty());
        assert_eq!(again.document_with_new_ids(&ExecutionReport::default()), None);
        assert_eq!(
            outcome.plan.document_with_new_ids(&outcome.report),
            Some(updated)
        );
        assert_eq!(engine.stats().pushes, 1);
        assert_eq!(engine.stats().operations_applied, 1);
    }

    #[test]
    fn pull_then_plan_keeps_multi_sided_cards() {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust");
        service.insert_card(
            "d1",
            CardRecord::from_remote("c1", "Q\n---\nA1\n---\nA2", Tags::new(), false),
        );
        service.insert_card(
            "d1",
            CardRecord::from_remote("c2", "Q2\n---\nA2b", Tags::new(), false),
        );
        service.insert_card(
            "d1",
            CardRecord::from_remote("c3", "a---b\n---\n\\---", Tags::new(), false),
        );
        let engine = SyncEngine::new(service);

        let pulled = engine.pull("d1").unwrap();
        assert_eq!(decode_document(&pulled.document).unwrap(), pulled.records);
        let planned = engine.plan_push("d1", &pulled.document, false).unwrap();
        assert!(planned.is_empty());
        assert!(planned.plan.duplicates.is_empty());
    }

    #[test]
    fn pull_rejects_card_without_answer() {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust");
        service.insert_card("d1", CardRecord::from_remote("c7", "question only", Tags::new(), false));
        let engine = SyncEngine::new(service);

        match engine.pull("d1") {
            Err(SyncError::UnrepresentableCard { remote_id, .. }) => assert_eq!(remote_id, "c7"),
            other => panic!("unexpected result: {:?}", other.map(|p| p.document)),
        }
        assert_eq!(engine.stats().pulls, 0);
    }

    #[test]
    fn unknown_deck_is_reported() {
        let engine = engine();
        assert!(matches!(engine.deck("nope"), Err(SyncError::Service(_))));
    }

    #[test]
    fn page_size_is_at_least_one() {
        let engine = SyncEngine::new(MemoryCardService::new()).with_page_size(0);
        assert_eq!(engine.page_size(), 1);
    }
}
