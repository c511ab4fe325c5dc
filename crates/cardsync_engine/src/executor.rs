//! Plan execution.

use crate::error::{SyncError, SyncResult};
use crate::planner::{Operation, OperationKind, Plan};
use crate::service::CardService;
use cardsync_codec::CardRecord;
use tracing::{error, info};

/// A remote write that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedOperation {
    /// A card was created.
    Created {
        /// Position of the record in the local document.
        local_index: usize,
        /// Id assigned by the service.
        remote_id: String,
    },
    /// A card was updated.
    Updated {
        /// Card updated.
        remote_id: String,
    },
    /// A card was deleted.
    Deleted {
        /// Card deleted.
        remote_id: String,
    },
}

/// Outcome of executing a plan.
///
/// On success `applied` holds every operation and the rest is empty. When a
/// write fails, `failed` names it and `not_attempted` lists what never ran;
/// nothing already applied is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Operations applied, in execution order.
    pub applied: Vec<AppliedOperation>,
    /// The operation that failed, if any.
    pub failed: Option<Operation>,
    /// Operations never attempted because of the failure.
    pub not_attempted: Vec<Operation>,
}

impl ExecutionReport {
    /// Returns true if every planned operation was applied.
    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.not_attempted.is_empty()
    }

    /// Iterates over `(local_index, remote_id)` of created cards.
    pub fn created(&self) -> impl Iterator<Item = (usize, &str)> {
        self.applied.iter().filter_map(|op| match op {
            AppliedOperation::Created {
                local_index,
                remote_id,
            } => Some((*local_index, remote_id.as_str())),
            _ => None,
        })
    }

    /// Number of cards created.
    pub fn created_count(&self) -> usize {
        self.created().count()
    }

    /// Number of cards updated.
    pub fn updated_count(&self) -> usize {
        self.applied
            .iter()
            .filter(|op| matches!(op, AppliedOperation::Updated { .. }))
            .count()
    }

    /// Number of cards deleted.
    pub fn deleted_count(&self) -> usize {
        self.applied
            .iter()
            .filter(|op| matches!(op, AppliedOperation::Deleted { .. }))
            .count()
    }
}

/// Applies a plan: every create, then every update, then every delete.
///
/// Each operation is one independent service call. The first failure stops
/// execution.
///
/// # Errors
///
/// Returns [`SyncError::RemoteWriteFailed`] carrying the partial
/// [`ExecutionReport`].
pub fn execute_plan<S: CardService + ?Sized>(
    service: &S,
    deck_id: &str,
    plan: &Plan,
) -> SyncResult<ExecutionReport> {
    let ordered: Vec<&Operation> = [
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Delete,
    ]
    .into_iter()
    .flat_map(|kind| plan.of_kind(kind))
    .collect();

    let mut report = ExecutionReport::default();
    for (position, operation) in ordered.iter().enumerate() {
        match apply(service, deck_id, operation) {
            Ok(applied) => {
                info!(%operation, "applied");
                report.applied.push(applied);
            }
            Err(source) => {
                error!(%operation, error = %source, "remote write failed; stopping");
                report.failed = Some((*operation).clone());
                report.not_attempted = ordered[position + 1..]
                    .iter()
                    .map(|op| (*op).clone())
                    .collect();
                return Err(SyncError::RemoteWriteFailed {
                    operation: operation.to_string(),
                    source,
                    report: Box::new(report),
                });
            }
        }
    }

    info!(
        created = report.created_count(),
        updated = report.updated_count(),
        deleted = report.deleted_count(),
        "plan executed"
    );
    Ok(report)
}

fn apply<S: CardService + ?Sized>(
    service: &S,
    deck_id: &str,
    operation: &Operation,
) -> crate::error::ServiceResult<AppliedOperation> {
    match operation {
        Operation::Create {
            local_index,
            record,
        } => service
            .create_card(deck_id, record)
            .map(|remote_id| AppliedOperation::Created {
                local_index: *local_index,
                remote_id,
            }),
        Operation::Update {
            remote_id, record, ..
        } => service
            .update_card(remote_id, record)
            .map(|()| AppliedOperation::Updated {
                remote_id: remote_id.clone(),
            }),
        Operation::Delete { remote_id } => {
            service
                .delete_card(remote_id)
                .map(|()| AppliedOperation::Deleted {
                    remote_id: remote_id.clone(),
                })
        }
    }
}

/// Writes remote ids learned during a push back into the local records.
///
/// Covers cards created by `report` and pending records the plan matched
/// to (and claimed) an existing remote card. Returns how many records were
/// changed. Re-encoding the records gives the updated local document.
pub fn assign_remote_ids(
    records: &mut [CardRecord],
    plan: &Plan,
    report: &ExecutionReport,
) -> usize {
    let claimed = plan
        .duplicates
        .iter()
        .filter(|duplicate| duplicate.claimed)
        .map(|duplicate| (duplicate.local_index, duplicate.remote_id.as_str()));

    let mut assigned = 0;
    for (local_index, remote_id) in report.created().chain(claimed) {
        if let Some(record) = records.get_mut(local_index) {
            if record.remote_id.as_deref() != Some(remote_id) {
                record.remote_id = Some(remote_id.to_string());
                assigned += 1;
            }
        }
    }
    assigned
}
