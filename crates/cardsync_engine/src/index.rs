//! Duplicate fingerprint index.

use cardsync_codec::{CardRecord, Fingerprint};
use std::collections::HashMap;

/// Maps content fingerprints of remote cards to the remote ids sharing them.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    entries: HashMap<Fingerprint, Vec<String>>,
}

impl FingerprintIndex {
    /// Builds the index from fetched remote records. Records without a
    /// remote id are ignored.
    pub fn build(remote: &[CardRecord]) -> Self {
        let mut entries: HashMap<Fingerprint, Vec<String>> = HashMap::new();
        for card in remote {
            if let Some(id) = &card.remote_id {
                entries.entry(card.fingerprint()).or_default().push(id.clone());
            }
        }
        Self { entries }
    }

    /// Returns the remote ids whose content matches, in remote order.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> &[String] {
        self.entries
            .get(fingerprint)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no remote card was indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
