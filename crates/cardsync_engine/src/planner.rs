//! Reconciliation planning.
//!
//! The planner diffs the local records against a fresh remote snapshot and
//! produces the operations that make the remote deck match the local one.
//! Local is authoritative: remote cards missing locally are deleted, and a
//! known local card whose remote counterpart vanished is recreated.

use crate::index::FingerprintIndex;
use cardsync_codec::CardRecord;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Longest question excerpt shown when displaying an operation.
const EXCERPT_CHARS: usize = 50;

/// Kind of a planned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    /// Create a new remote card.
    Create,
    /// Overwrite an existing remote card.
    Update,
    /// Delete a remote card.
    Delete,
}

/// A single planned remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a card from a local record.
    Create {
        /// Position of the record in the local document.
        local_index: usize,
        /// The record to create.
        record: CardRecord,
    },
    /// Overwrite a remote card with a local record.
    Update {
        /// Position of the record in the local document.
        local_index: usize,
        /// Remote card to overwrite.
        remote_id: String,
        /// The new content.
        record: CardRecord,
    },
    /// Delete a remote card absent locally.
    Delete {
        /// Remote card to delete.
        remote_id: String,
    },
}

impl Operation {
    /// Returns the kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Create { .. } => OperationKind::Create,
            Operation::Update { .. } => OperationKind::Update,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }

    /// Returns the remote id this operation targets, if it has one yet.
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Operation::Create { .. } => None,
            Operation::Update { remote_id, .. } | Operation::Delete { remote_id } => {
                Some(remote_id.as_str())
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create { record, .. } => write!(f, "create \"{}\"", excerpt(&record.question)),
            Operation::Update {
                remote_id, record, ..
            } => write!(f, "update {} \"{}\"", remote_id, excerpt(&record.question)),
            Operation::Delete { remote_id } => write!(f, "delete {}", remote_id),
        }
    }
}

fn excerpt(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    match first_line.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &first_line[..cut]),
        None => first_line.to_string(),
    }
}

/// A pending local record that already exists remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// Position of the record in the local document.
    pub local_index: usize,
    /// Remote card with the same content.
    pub remote_id: String,
    /// True if this record now stands for `remote_id`. False when every
    /// matching remote card is already referenced by another local record.
    pub claimed: bool,
}

/// Operation counts of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    /// Cards to create.
    pub creates: usize,
    /// Cards to update.
    pub updates: usize,
    /// Cards to delete.
    pub deletes: usize,
}

impl PlanSummary {
    /// Total number of operations.
    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete",
            self.creates, self.updates, self.deletes
        )
    }
}

/// The ordered result of reconciliation.
///
/// Operations are stored in execution order: every create, then every
/// update, then every delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Operations in execution order.
    pub operations: Vec<Operation>,
    /// Pending local records suppressed as duplicates of remote cards.
    pub duplicates: Vec<DuplicateMatch>,
}

impl Plan {
    /// Returns true if nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Iterates over operations of one kind, in plan order.
    pub fn of_kind(&self, kind: OperationKind) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(move |op| op.kind() == kind)
    }

    /// Counts operations per kind.
    pub fn summary(&self) -> PlanSummary {
        self.operations
            .iter()
            .fold(PlanSummary::default(), |mut summary, op| {
                match op.kind() {
                    OperationKind::Create => summary.creates += 1,
                    OperationKind::Update => summary.updates += 1,
                    OperationKind::Delete => summary.deletes += 1,
                }
                summary
            })
    }
}

/// Computes the operations that make `remote` match `local`.
///
/// 1. Known local records (with a remote id) present remotely become an
///    `Update` when content, tags or archived flag differ.
/// 2. Pending local records become a `Create`, unless `force` is false and
///    a remote card with the same fingerprint exists, in which case they are
///    recorded as a [`DuplicateMatch`] and nothing is created. A claimed match
///    whose tags or archived flag differ becomes an `Update`. Known records
///    whose id is missing remotely (or repeated locally) take this path too.
/// 3. Remote cards not referenced by any local record become a `Delete`.
///
/// The result is a deterministic function of the three inputs.
pub fn plan(local: &[CardRecord], remote: &[CardRecord], force: bool) -> Plan {
    let remote_by_id: HashMap<&str, &CardRecord> = remote
        .iter()
        .filter_map(|card| card.remote_id.as_deref().map(|id| (id, card)))
        .collect();

    let mut referenced: HashSet<String> = HashSet::new();
    let mut local_ids: HashSet<&str> = HashSet::new();
    let mut pending = Vec::new();
    let mut updates = Vec::new();

    for (local_index, record) in local.iter().enumerate() {
        let Some(id) = record.remote_id.as_deref() else {
            pending.push(local_index);
            continue;
        };
        if !local_ids.insert(id) {
            warn!(card_id = id, "card id appears twice locally; treating the copy as new");
            pending.push(local_index);
            continue;
        }
        match remote_by_id.get(id) {
            Some(remote_card) => {
                referenced.insert(id.to_string());
                if !record.materially_equal(remote_card) {
                    debug!(card_id = id, "card changed locally");
                    updates.push(Operation::Update {
                        local_index,
                        remote_id: id.to_string(),
                        record: record.clone(),
                    });
                }
            }
            None => {
                warn!(card_id = id, "card not found remotely; it will be recreated");
                pending.push(local_index);
            }
        }
    }

    let index = if force {
        None
    } else {
        Some(FingerprintIndex::build(remote))
    };
    let mut creates = Vec::new();
    let mut duplicates = Vec::new();

    for local_index in pending {
        let record = &local[local_index];
        let candidates = index
            .as_ref()
            .map(|index| index.lookup(&record.fingerprint()))
            .unwrap_or_default();

        if candidates.is_empty() {
            creates.push(Operation::Create {
                local_index,
                record: record.clone(),
            });
            continue;
        }

        let duplicate = match candidates.iter().find(|id| !referenced.contains(id.as_str())) {
            Some(id) => {
                referenced.insert(id.clone());
                if let Some(remote_card) = remote_by_id.get(id.as_str()) {
                    if !record.materially_equal(remote_card) {
                        debug!(card_id = %id, "matched card differs in tags or archived flag");
                        updates.push(Operation::Update {
                            local_index,
                            remote_id: id.clone(),
                            record: record.clone(),
                        });
                    }
                }
                DuplicateMatch {
                    local_index,
                    remote_id: id.clone(),
                    claimed: true,
                }
            }
            None => DuplicateMatch {
                local_index,
                remote_id: candidates[0].clone(),
                claimed: false,
            },
        };
        warn!(
            remote_id = %duplicate.remote_id,
            question = %excerpt(&record.question),
            "card already exists remotely; skipping creation"
        );
        duplicates.push(duplicate);
    }

    let mut deleted = HashSet::new();
    let deletes: Vec<Operation> = remote
        .iter()
        .filter_map(|card| card.remote_id.as_deref())
        .filter(|id| !referenced.contains(*id) && deleted.insert(*id))
        .map(|id| Operation::Delete {
            remote_id: id.to_string(),
        })
        .collect();

    updates.sort_by_key(|op| match op {
        Operation::Update { local_index, .. } => *local_index,
        _ => usize::MAX,
    });
    let mut operations = creates;
    operations.extend(updates);
    operations.extend(deletes);

    let plan = Plan {
        operations,
        duplicates,
    };
    debug!(summary = %plan.summary(), duplicates = plan.duplicates.len(), "planned push");
    plan
}
