//! Remote card service abstraction.

use crate::error::{ServiceError, ServiceResult};
use cardsync_codec::{CardRecord, DeckRef};
use parking_lot::Mutex;
use uuid::Uuid;

/// One page of a card listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPage {
    /// Cards on this page, in service order.
    pub cards: Vec<CardRecord>,
    /// Continuation token; `None` or empty marks the last page.
    pub next_page_token: Option<String>,
}

/// A remote flashcard service.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (the Mochi HTTP API, an in-memory service for tests).
/// Every call is blocking and is attempted exactly once.
pub trait CardService: Send + Sync {
    /// Lists all decks.
    fn list_decks(&self) -> ServiceResult<Vec<DeckRef>>;

    /// Looks up a single deck.
    fn get_deck(&self, deck_id: &str) -> ServiceResult<DeckRef>;

    /// Lists one page of the cards in a deck.
    fn list_cards(
        &self,
        deck_id: &str,
        page_token: Option<&str>,
        limit: u32,
    ) -> ServiceResult<CardPage>;

    /// Creates a card and returns its new remote id.
    fn create_card(&self, deck_id: &str, card: &CardRecord) -> ServiceResult<String>;

    /// Replaces the content, tags and archived flag of a card.
    fn update_card(&self, remote_id: &str, card: &CardRecord) -> ServiceResult<()>;

    /// Deletes a card.
    fn delete_card(&self, remote_id: &str) -> ServiceResult<()>;
}

/// A call recorded by [`MemoryCardService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    /// `list_cards`.
    ListCards {
        /// Deck listed.
        deck_id: String,
        /// Token passed in.
        page_token: Option<String>,
    },
    /// `create_card`.
    Create {
        /// Deck written to.
        deck_id: String,
        /// Question of the created card.
        question: String,
    },
    /// `update_card`.
    Update {
        /// Card updated.
        remote_id: String,
    },
    /// `delete_card`.
    Delete {
        /// Card deleted.
        remote_id: String,
    },
}

#[derive(Debug, Default)]
struct MemoryState {
    decks: Vec<DeckRef>,
    /// Cards with the deck they belong to, in creation order.
    cards: Vec<(String, CardRecord)>,
    calls: Vec<ServiceCall>,
    max_page_size: Option<u32>,
    token_on_last_page: bool,
    fail_listing_at_page: Option<usize>,
    fail_write_at: Option<usize>,
    writes: usize,
}

/// An in-memory card service for tests.
///
/// Supports pagination, call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryCardService {
    state: Mutex<MemoryState>,
}

impl MemoryCardService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a deck.
    pub fn add_deck(&self, deck_id: impl Into<String>, name: impl Into<String>) {
        self.state.lock().decks.push(DeckRef::new(deck_id, name));
    }

    /// Stores a card, assigning an id if it has none. Returns the id.
    pub fn insert_card(&self, deck_id: &str, card: CardRecord) -> String {
        let mut state = self.state.lock();
        let id = card.remote_id.clone().unwrap_or_else(new_card_id);
        state
            .cards
            .push((deck_id.to_string(), CardRecord { remote_id: Some(id.clone()), ..card }));
        id
    }

    /// Returns the cards of a deck in service order.
    pub fn cards(&self, deck_id: &str) -> Vec<CardRecord> {
        self.state
            .lock()
            .cards
            .iter()
            .filter(|(deck, _)| deck == deck_id)
            .map(|(_, card)| card.clone())
            .collect()
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().calls.clone()
    }

    /// Caps the number of cards returned per page.
    pub fn set_max_page_size(&self, size: u32) {
        self.state.lock().max_page_size = Some(size);
    }

    /// Makes the last page carry a continuation token, as Mochi does.
    pub fn set_token_on_last_page(&self, enabled: bool) {
        self.state.lock().token_on_last_page = enabled;
    }

    /// Fails the listing request for the given 0-based page.
    pub fn fail_listing_at_page(&self, page: usize) {
        self.state.lock().fail_listing_at_page = Some(page);
    }

    /// Fails the given 0-based write (create, update or delete).
    pub fn fail_write_at(&self, write: usize) {
        self.state.lock().fail_write_at = Some(write);
    }

    fn begin_write(state: &mut MemoryState, call: ServiceCall) -> ServiceResult<()> {
        let index = state.writes;
        state.writes += 1;
        state.calls.push(call);
        if state.fail_write_at == Some(index) {
            return Err(ServiceError::Transport(format!("injected failure on write {}", index)));
        }
        Ok(())
    }
}

fn new_card_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl CardService for MemoryCardService {
    fn list_decks(&self) -> ServiceResult<Vec<DeckRef>> {
        Ok(self.state.lock().decks.clone())
    }

    fn get_deck(&self, deck_id: &str) -> ServiceResult<DeckRef> {
        self.state
            .lock()
            .decks
            .iter()
            .find(|deck| deck.deck_id == deck_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("deck {}", deck_id)))
    }

    fn list_cards(
        &self,
        deck_id: &str,
        page_token: Option<&str>,
        limit: u32,
    ) -> ServiceResult<CardPage> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::ListCards {
            deck_id: deck_id.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ServiceError::Protocol(format!("bad page token {}", token)))?,
            None => 0,
        };
        let limit = state.max_page_size.map_or(limit, |max| max.min(limit)) as usize;
        if limit > 0 && state.fail_listing_at_page == Some(offset / limit) {
            return Err(ServiceError::Transport("injected listing failure".into()));
        }

        let deck_cards: Vec<&CardRecord> = state
            .cards
            .iter()
            .filter(|(deck, _)| deck == deck_id)
            .map(|(_, card)| card)
            .collect();
        let end = (offset + limit).min(deck_cards.len());
        let cards: Vec<CardRecord> = deck_cards
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|card| (*card).clone())
            .collect();

        let next_page_token = if end < deck_cards.len() || state.token_on_last_page {
            Some(end.to_string())
        } else {
            None
        };
        Ok(CardPage {
            cards,
            next_page_token,
        })
    }

    fn create_card(&self, deck_id: &str, card: &CardRecord) -> ServiceResult<String> {
        let mut state = self.state.lock();
        Self::begin_write(
            &mut state,
            ServiceCall::Create {
                deck_id: deck_id.to_string(),
                question: card.question.clone(),
            },
        )?;
        let id = new_card_id();
        state.cards.push((
            deck_id.to_string(),
            CardRecord {
                remote_id: Some(id.clone()),
                ..card.clone()
            },
        ));
        Ok(id)
    }

    fn update_card(&self, remote_id: &str, card: &CardRecord) -> ServiceResult<()> {
        let mut state = self.state.lock();
        Self::begin_write(
            &mut state,
            ServiceCall::Update {
                remote_id: remote_id.to_string(),
            },
        )?;
        let (_, stored) = state
            .cards
            .iter_mut()
            .find(|(_, stored)| stored.remote_id.as_deref() == Some(remote_id))
            .ok_or_else(|| ServiceError::NotFound(format!("card {}", remote_id)))?;
        *stored = CardRecord {
            remote_id: Some(remote_id.to_string()),
            ..card.clone()
        };
        Ok(())
    }

    fn delete_card(&self, remote_id: &str) -> ServiceResult<()> {
        let mut state = self.state.lock();
        Self::begin_write(
            &mut state,
            ServiceCall::Delete {
                remote_id: remote_id.to_string(),
            },
        )?;
        let before = state.cards.len();
        state
            .cards
            .retain(|(_, card)| card.remote_id.as_deref() != Some(remote_id));
        if state.cards.len() == before {
            return Err(ServiceError::NotFound(format!("card {}", remote_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_service_paginates() {
        let service = MemoryCardService::new();
        for i in 0..5 {
            service.insert_card("d1", CardRecord::new(format!("Q{}", i), "A"));
        }
        service.insert_card("other", CardRecord::new("X", "Y"));

        let first = service.list_cards("d1", None, 2).unwrap();
        assert_eq!(first.cards.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("2"));

        let last = service.list_cards("d1", Some("4"), 2).unwrap();
        assert_eq!(last.cards.len(), 1);
        assert_eq!(last.cards[0].question, "Q4");
        assert!(last.next_page_token.is_none());
    }

    #[test]
    fn memory_service_writes() {
        let service = MemoryCardService::new();
        let id = service.create_card("d1", &CardRecord::new("Q", "A")).unwrap();
        service
            .update_card(&id, &CardRecord::new("Q", "A2").with_archived(true))
            .unwrap();
        let cards = service.cards("d1");
        assert_eq!(cards[0].answer, "A2");
        assert_eq!(cards[0].remote_id.as_deref(), Some(id.as_str()));

        service.delete_card(&id).unwrap();
        assert!(service.cards("d1").is_empty());
        assert!(matches!(service.delete_card(&id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn memory_service_injected_write_failure() {
        let service = MemoryCardService::new();
        service.fail_write_at(1);
        assert!(service.create_card("d1", &CardRecord::new("Q1", "A")).is_ok());
        assert!(matches!(
            service.create_card("d1", &CardRecord::new("Q2", "A")),
            Err(ServiceError::Transport(_))
        ));
        assert_eq!(service.cards("d1").len(), 1);
        assert_eq!(service.calls().len(), 2);
    }

    #[test]
    fn memory_service_decks() {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust");
        assert_eq!(service.get_deck("d1").unwrap().deck_name, "Rust");
        assert!(matches!(service.get_deck("nope"), Err(ServiceError::NotFound(_))));
        assert_eq!(service.list_decks().unwrap().len(), 1);
    }
}
