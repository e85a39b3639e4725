// Workflow engine - pure record transitions
//
// Every function here takes a snapshot and returns the next document; nothing
// touches the ledger. A failed transition leaves the snapshot untouched.

use chrono::{DateTime, Utc};
use serde_json::Map;
use tracing::debug;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::model::{
    Caller, Category, CreatedMethod, DeedDetails, EntryDetails, IncumbranceDetails, LedgerEntry,
    Record, Resolution,
};
use crate::model::payload::{parse_whole_number, WholeNumber};
use crate::workflow::commands::{CreateRecord, RecordPatch};
use crate::workflow::policy::AuthorityPolicy;

/// Identifies the pending entry a resolution acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySelector {
    /// Raw positional index as supplied by the caller, parsed at resolution time
    Index(String),
    Id(Uuid),
}

impl EntrySelector {
    /// UUIDs select by entry id; anything else is treated as a positional index
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => EntrySelector::Id(id),
            Err(_) => EntrySelector::Index(raw.to_string()),
        }
    }

    fn locate<T>(
        &self,
        category: Category,
        pending: &[LedgerEntry<T>],
    ) -> Result<usize, WorkflowError> {
        match self {
            EntrySelector::Index(raw) => {
                let index = match parse_whole_number("index", raw)? {
                    WholeNumber::NonNegative(index) => Some(index),
                    WholeNumber::Negative => None,
                };
                index
                    .filter(|i| *i < pending.len())
                    .ok_or_else(|| WorkflowError::IndexOutOfRange {
                        category,
                        index: raw.trim().to_string(),
                        len: pending.len(),
                    })
            }
            EntrySelector::Id(id) => pending
                .iter()
                .position(|entry| entry.entry_id == Some(*id))
                .ok_or_else(|| WorkflowError::EntryNotFound {
                    category,
                    entry_id: id.to_string(),
                }),
        }
    }
}

impl std::fmt::Display for EntrySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntrySelector::Index(raw) => write!(f, "index {raw}"),
            EntrySelector::Id(id) => write!(f, "entry {id}"),
        }
    }
}

/// Build a freshly created record at version 1
pub fn create_record(cmd: &CreateRecord, now: DateTime<Utc>) -> Record {
    Record {
        id: cmd.id.clone(),
        version: 1,
        created_at: now,
        updated_at: now,
        created_method: CreatedMethod::Add,
        status: cmd.status,
        doc_type: None,
        property_reference_number: cmd.property_reference_number.clone(),
        property_held_infos: cmd.property_held_infos.clone(),
        property_address: cmd.property_address.clone(),
        property_chinese_address: cmd.property_chinese_address.clone(),
        property_share_of_the_location: cmd.property_share_of_the_location.clone(),
        property_remarks: cmd.property_remarks.clone(),
        transaction_history: Vec::new(),
        deeds_pending_registration: Vec::new(),
        deeds_pending_registration_rejected: Vec::new(),
        incumbrance_history: Vec::new(),
        incumbrance_pending_registration: Vec::new(),
        incumbrance_pending_registration_rejected: Vec::new(),
        extra: Map::new(),
    }
}

/// Overlay the supplied fields on the current record
pub fn apply_update(
    current: &Record,
    path_id: &str,
    patch: &RecordPatch,
    now: DateTime<Utc>,
) -> Result<Record, WorkflowError> {
    if path_id != patch.id {
        return Err(WorkflowError::IdentifierMismatch {
            path: path_id.to_string(),
            payload: patch.id.clone(),
        });
    }
    let mut next = current.clone();
    patch.apply_to(&mut next);
    next.bump(now);
    Ok(next)
}

/// Append a new pending entry to the category's pending list
pub fn submit_entry<T: EntryDetails>(
    current: &Record,
    details: T,
    caller: &Caller,
    now: DateTime<Utc>,
) -> (Record, Uuid) {
    let entry = LedgerEntry::submitted(details, caller, now);
    let entry_id = entry.entry_id.unwrap_or_else(Uuid::new_v4);
    let mut next = current.clone();
    T::lists(&mut next).pending.push(entry);
    next.bump(now);
    (next, entry_id)
}

/// Move one pending entry to history (approve) or rejected (reject)
pub fn resolve_entry<T: EntryDetails>(
    current: &Record,
    selector: &EntrySelector,
    resolution: Resolution,
    caller: &Caller,
    now: DateTime<Utc>,
) -> Result<Record, WorkflowError> {
    let position = selector.locate(T::CATEGORY, T::pending(current))?;

    let mut next = current.clone();
    let mut lists = T::lists(&mut next);
    let mut entry = lists.pending.remove(position);
    entry.resolve(resolution, caller, now);
    lists.destination(resolution).push(entry);
    next.bump(now);
    Ok(next)
}

/// A caller request against one record
#[derive(Debug, Clone)]
pub enum Command {
    Create(CreateRecord),
    Update {
        path_id: String,
        patch: RecordPatch,
    },
    SubmitDeed {
        id: String,
        details: DeedDetails,
    },
    SubmitIncumbrance {
        id: String,
        details: IncumbranceDetails,
    },
    Resolve {
        id: String,
        category: Category,
        selector: EntrySelector,
        resolution: Resolution,
    },
    Delete {
        id: String,
    },
}

impl Command {
    pub fn record_id(&self) -> &str {
        match self {
            Command::Create(cmd) => &cmd.id,
            Command::Update { path_id, .. } => path_id,
            Command::SubmitDeed { id, .. }
            | Command::SubmitIncumbrance { id, .. }
            | Command::Resolve { id, .. }
            | Command::Delete { id } => id,
        }
    }
}

/// What the store should do with the record once the write is applied
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Put(Box<Record>),
    Remove,
}

/// A computed next state plus the version it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub record_id: String,
    /// `None` when the record must not exist yet
    pub expected_version: Option<u64>,
    pub outcome: TransitionOutcome,
    /// Set for submissions
    pub entry_id: Option<Uuid>,
}

impl Transition {
    pub fn next_version(&self) -> Option<u64> {
        match &self.outcome {
            TransitionOutcome::Put(record) => Some(record.version),
            TransitionOutcome::Remove => None,
        }
    }
}

/// Stateless dispatcher from commands to transitions
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    policy: AuthorityPolicy,
}

impl WorkflowEngine {
    pub fn new(policy: AuthorityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AuthorityPolicy {
        &self.policy
    }

    pub fn apply(
        &self,
        snapshot: Option<&Record>,
        command: &Command,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> Result<Transition, WorkflowError> {
        let record_id = command.record_id().to_string();

        let Some(current) = snapshot else {
            return match command {
                Command::Create(cmd) => Ok(Transition {
                    record_id,
                    expected_version: None,
                    outcome: TransitionOutcome::Put(Box::new(create_record(cmd, now))),
                    entry_id: None,
                }),
                _ => Err(WorkflowError::NotFound(record_id)),
            };
        };
        let expected_version = Some(current.version);
        debug!(record_id = %record_id, version = current.version, caller = %caller, "Computing transition");

        let (outcome, entry_id) = match command {
            Command::Create(_) => return Err(WorkflowError::AlreadyExists(record_id)),
            Command::Update { path_id, patch } => {
                let next = apply_update(current, path_id, patch, now)?;
                (TransitionOutcome::Put(Box::new(next)), None)
            }
            Command::SubmitDeed { details, .. } => {
                let (next, entry_id) = submit_entry(current, details.clone(), caller, now);
                (TransitionOutcome::Put(Box::new(next)), Some(entry_id))
            }
            Command::SubmitIncumbrance { details, .. } => {
                let (next, entry_id) = submit_entry(current, details.clone(), caller, now);
                (TransitionOutcome::Put(Box::new(next)), Some(entry_id))
            }
            Command::Resolve {
                category,
                selector,
                resolution,
                ..
            } => {
                self.policy.authorize(caller, *category, *resolution)?;
                let next = match category {
                    Category::Deed => {
                        resolve_entry::<DeedDetails>(current, selector, *resolution, caller, now)?
                    }
                    Category::Incumbrance => resolve_entry::<IncumbranceDetails>(
                        current,
                        selector,
                        *resolution,
                        caller,
                        now,
                    )?,
                };
                (TransitionOutcome::Put(Box::new(next)), None)
            }
            Command::Delete { .. } => (TransitionOutcome::Remove, None),
        };

        Ok(Transition {
            record_id,
            expected_version,
            outcome,
            entry_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OwnerRef, PropertyStatus};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn caller() -> Caller {
        Caller::new("Org1MSP").unwrap()
    }

    fn base_record() -> Record {
        create_record(
            &CreateRecord {
                id: "asset1".into(),
                status: PropertyStatus::Develop,
                property_reference_number: "PRN0001".into(),
                property_held_infos: vec![],
                property_address: "1 Queen's Road Central".into(),
                property_chinese_address: "皇后大道中1號".into(),
                property_share_of_the_location: "1/1".into(),
                property_remarks: vec![],
            },
            now(),
        )
    }

    fn deed(memorial: &str) -> DeedDetails {
        DeedDetails {
            owners: vec![OwnerRef::Named("Person AAA".into())],
            memorial_number: memorial.into(),
            date_of_instrument: "2020/01/01".into(),
            date_of_registration: "2020/02/01".into(),
            consideration: "$1".into(),
            remarks: "ASSIGNMENT".into(),
        }
    }

    #[test]
    fn create_starts_at_version_one_with_empty_lists() {
        let record = base_record();
        assert_eq!(record.version, 1);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.created_method, CreatedMethod::Add);
        assert!(record.entry_lists_empty());
    }

    #[test]
    fn update_rejects_identifier_mismatch_and_keeps_lists() {
        let (record, _) = submit_entry(&base_record(), deed("M1"), &caller(), now());
        let patch = RecordPatch {
            id: "asset2".into(),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&record, "asset1", &patch, now()),
            Err(WorkflowError::IdentifierMismatch { .. })
        ));

        let patch = RecordPatch {
            id: "asset1".into(),
            status: Some(PropertyStatus::InMarket),
            ..Default::default()
        };
        let next = apply_update(&record, "asset1", &patch, now()).unwrap();
        assert_eq!(next.status, PropertyStatus::InMarket);
        assert_eq!(next.version, record.version + 1);
        assert_eq!(next.deeds_pending_registration.len(), 1);
    }

    #[test]
    fn resolve_by_index_moves_entry() {
        let (record, _) = submit_entry(&base_record(), deed("M1"), &caller(), now());
        let (record, _) = submit_entry(&record, deed("M2"), &caller(), now());

        let next = resolve_entry::<DeedDetails>(
            &record,
            &EntrySelector::Index("1".into()),
            Resolution::Reject,
            &caller(),
            now(),
        )
        .unwrap();

        assert_eq!(next.deeds_pending_registration.len(), 1);
        assert_eq!(next.deeds_pending_registration[0].details.memorial_number, "M1");
        assert_eq!(next.deeds_pending_registration_rejected.len(), 1);
        let rejected = &next.deeds_pending_registration_rejected[0];
        assert_eq!(rejected.rejected_by.as_deref(), Some("Org1MSP"));
        assert!(rejected.approved_at.is_none());
        assert_eq!(next.version, 4);
    }

    #[test]
    fn resolve_by_entry_id() {
        let (record, _) = submit_entry(&base_record(), deed("M1"), &caller(), now());
        let (record, second) = submit_entry(&record, deed("M2"), &caller(), now());

        let next = resolve_entry::<DeedDetails>(
            &record,
            &EntrySelector::Id(second),
            Resolution::Approve,
            &caller(),
            now(),
        )
        .unwrap();
        assert_eq!(next.transaction_history[0].details.memorial_number, "M2");

        let missing = resolve_entry::<DeedDetails>(
            &record,
            &EntrySelector::Id(Uuid::new_v4()),
            Resolution::Approve,
            &caller(),
            now(),
        );
        assert!(matches!(missing, Err(WorkflowError::EntryNotFound { .. })));
    }

    #[test]
    fn index_is_parsed_without_coercion() {
        let (record, _) = submit_entry(&base_record(), deed("M1"), &caller(), now());
        for raw in ["1.0", "one", "", "0x0"] {
            let result = resolve_entry::<DeedDetails>(
                &record,
                &EntrySelector::Index(raw.into()),
                Resolution::Approve,
                &caller(),
                now(),
            );
            assert!(
                matches!(result, Err(WorkflowError::Validation { ref field, .. }) if field == "index"),
                "{raw:?} should not parse"
            );
        }
        for raw in ["-1", "1", "99", "99999999999999999999", "-99999999999999999999"] {
            let result = resolve_entry::<DeedDetails>(
                &record,
                &EntrySelector::Index(raw.into()),
                Resolution::Approve,
                &caller(),
                now(),
            );
            assert!(matches!(result, Err(WorkflowError::IndexOutOfRange { len: 1, .. })));
        }
    }

    #[test]
    fn selector_parse_distinguishes_ids() {
        let id = Uuid::new_v4();
        assert_eq!(EntrySelector::parse(&id.to_string()), EntrySelector::Id(id));
        assert_eq!(EntrySelector::parse("0"), EntrySelector::Index("0".into()));
    }

    #[test]
    fn engine_checks_existence_and_authority() {
        let engine = WorkflowEngine::new(AuthorityPolicy::new(vec!["Org1MSP".into()], vec![]));
        let record = base_record();

        let create = Command::Create(CreateRecord {
            id: "asset1".into(),
            status: PropertyStatus::Develop,
            property_reference_number: "PRN0001".into(),
            property_held_infos: vec![],
            property_address: "x".into(),
            property_chinese_address: "y".into(),
            property_share_of_the_location: "1/1".into(),
            property_remarks: vec![],
        });
        assert!(matches!(
            engine.apply(Some(&record), &create, &caller(), now()),
            Err(WorkflowError::AlreadyExists(_))
        ));

        let delete = Command::Delete { id: "asset1".into() };
        assert!(matches!(
            engine.apply(None, &delete, &caller(), now()),
            Err(WorkflowError::NotFound(_))
        ));
        let transition = engine.apply(Some(&record), &delete, &caller(), now()).unwrap();
        assert_eq!(transition.expected_version, Some(1));
        assert_eq!(transition.outcome, TransitionOutcome::Remove);

        let resolve = Command::Resolve {
            id: "asset1".into(),
            category: Category::Deed,
            selector: EntrySelector::Index("0".into()),
            resolution: Resolution::Approve,
        };
        let outsider = Caller::new("Org2MSP").unwrap();
        assert!(matches!(
            engine.apply(Some(&record), &resolve, &outsider, now()),
            Err(WorkflowError::PermissionDenied { .. })
        ));
    }
}
