// Workflow engine tests - transitions computed from ledger snapshots
// Covers version monotonicity, entry movement and the no-mutation-on-failure rule

mod fixtures;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use fixtures::{caller, deed_payload, load_land_assets};
use land_registry::model::{normalize_document, DeedDetails, EntryDetails, IncumbranceDetails};
use land_registry::workflow::{
    apply_update, resolve_entry, submit_entry, AuthorityPolicy, Command, EntrySelector,
    RecordPatch, TransitionOutcome, WorkflowEngine,
};
use land_registry::{Caller, Category, PropertyStatus, Record, Resolution, WorkflowError};

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn asset(id: &str) -> Record {
    let documents = load_land_assets();
    normalize_document(id, documents[id].clone()).unwrap()
}

fn deed(memorial: &str) -> DeedDetails {
    DeedDetails::from_payload(&deed_payload(memorial)).unwrap()
}

proptest! {
    #[test]
    fn each_update_advances_the_version_by_one(updates in 1usize..20) {
        let start = asset("asset4");
        let mut record = start.clone();
        for n in 0..updates {
            let patch = RecordPatch {
                id: "asset4".into(),
                property_remarks: Some(vec![format!("REMARK {n}")]),
                ..RecordPatch::default()
            };
            record = apply_update(&record, "asset4", &patch, now()).unwrap();
        }
        prop_assert_eq!(record.version, start.version + updates as u64);
        prop_assert_eq!(record.property_remarks, vec![format!("REMARK {}", updates - 1)]);
    }

    #[test]
    fn resolving_moves_exactly_one_entry(submitted in 1usize..8, pick in 0usize..8, approve in any::<bool>()) {
        let pick = pick % submitted;
        let mut record = asset("asset4");
        for n in 0..submitted {
            record = submit_entry(&record, deed(&format!("UB93{n:05}")), &caller(), now()).0;
        }
        let resolution = if approve { Resolution::Approve } else { Resolution::Reject };
        let selector = EntrySelector::Index(pick.to_string());
        let chosen = record.deeds_pending_registration[pick].clone();

        let next = resolve_entry::<DeedDetails>(&record, &selector, resolution, &caller(), now()).unwrap();

        prop_assert_eq!(next.version, record.version + 1);
        prop_assert_eq!(next.deeds_pending_registration.len(), submitted - 1);
        let (destination, untouched) = match resolution {
            Resolution::Approve => (&next.transaction_history, &next.deeds_pending_registration_rejected),
            Resolution::Reject => (&next.deeds_pending_registration_rejected, &next.transaction_history),
        };
        prop_assert_eq!(destination.len(), 1);
        prop_assert!(untouched.is_empty());
        prop_assert_eq!(destination[0].entry_id, chosen.entry_id);
        prop_assert_eq!(destination[0].resolution(), Some(resolution));
        prop_assert!(next.deeds_pending_registration.iter().all(|e| e.entry_id != chosen.entry_id));
    }

    #[test]
    fn out_of_range_index_leaves_the_record_alone(index in 1i64..1000) {
        let record = asset("asset1");
        let selector = EntrySelector::parse(&index.to_string());
        let before = record.clone();

        let err = resolve_entry::<DeedDetails>(&record, &selector, Resolution::Approve, &caller(), now()).unwrap_err();

        let is_out_of_range = matches!(err, WorkflowError::IndexOutOfRange { len: 1, .. });
        prop_assert!(is_out_of_range);
        prop_assert_eq!(record, before);
    }
}

#[test]
fn negative_and_non_numeric_indexes_are_distinguished() {
    let record = asset("asset2");

    let negative = resolve_entry::<DeedDetails>(
        &record,
        &EntrySelector::parse("-1"),
        Resolution::Approve,
        &caller(),
        now(),
    );
    assert!(matches!(negative, Err(WorkflowError::IndexOutOfRange { len: 2, .. })));

    let garbage = resolve_entry::<DeedDetails>(
        &record,
        &EntrySelector::parse("first"),
        Resolution::Approve,
        &caller(),
        now(),
    );
    assert!(matches!(garbage, Err(WorkflowError::Validation { ref field, .. }) if field == "index"));
}

#[test]
fn indexes_wider_than_a_machine_word_are_out_of_range() {
    let record = asset("asset1");

    for raw in ["99999999999999999999", "-99999999999999999999"] {
        let result = resolve_entry::<DeedDetails>(
            &record,
            &EntrySelector::parse(raw),
            Resolution::Approve,
            &caller(),
            now(),
        );
        match result {
            Err(WorkflowError::IndexOutOfRange { index, len, .. }) => {
                assert_eq!(index, raw);
                assert_eq!(len, 1);
            }
            other => panic!("expected {raw} to be out of range, got {other:?}"),
        }
    }
}

#[test]
fn entry_id_selects_regardless_of_position() {
    let record = asset("asset2");
    let second: Uuid = "0b8d7e6f-5a4c-4b3a-8e2d-9c1b0a2f3e4d".parse().unwrap();

    let next = resolve_entry::<DeedDetails>(
        &record,
        &EntrySelector::parse(&second.to_string()),
        Resolution::Reject,
        &caller(),
        now(),
    )
    .unwrap();

    assert_eq!(next.deeds_pending_registration.len(), 1);
    assert_eq!(next.deeds_pending_registration_rejected[0].entry_id, Some(second));
    assert_eq!(next.deeds_pending_registration_rejected[0].rejected_by.as_deref(), Some("Org1MSP"));

    let missing = resolve_entry::<DeedDetails>(
        &record,
        &EntrySelector::Id(Uuid::new_v4()),
        Resolution::Reject,
        &caller(),
        now(),
    );
    assert!(matches!(missing, Err(WorkflowError::EntryNotFound { .. })));
}

#[test]
fn imported_entries_keep_their_submission_metadata_when_approved() {
    let record = asset("asset1");
    let pending = &record.deeds_pending_registration[0];
    assert!(pending.entry_id.is_none());
    assert!(pending.submitted_at.is_some());

    let next = resolve_entry::<DeedDetails>(
        &record,
        &EntrySelector::parse("0"),
        Resolution::Approve,
        &caller(),
        now(),
    )
    .unwrap();

    let approved = &next.transaction_history[0];
    assert_eq!(approved.submitted_at, pending.submitted_at);
    assert_eq!(approved.submitted_by.as_deref(), Some("Org2MSP"));
    assert_eq!(approved.approved_at, Some(now()));
}

#[test]
fn engine_rejects_resolutions_outside_the_policy() {
    let engine = WorkflowEngine::new(AuthorityPolicy::new(vec![], vec!["Org3MSP".into()]));
    let record = asset("asset2");

    let command = Command::Resolve {
        id: "asset2".into(),
        category: Category::Incumbrance,
        selector: EntrySelector::parse("0"),
        resolution: Resolution::Approve,
    };
    let denied = engine.apply(Some(&record), &command, &caller(), now());
    assert!(matches!(denied, Err(WorkflowError::PermissionDenied { .. })));

    let registrar = Caller::new("Org3MSP").unwrap();
    let transition = engine.apply(Some(&record), &command, &registrar, now()).unwrap();
    assert_eq!(transition.expected_version, Some(record.version));
    match transition.outcome {
        TransitionOutcome::Put(next) => {
            assert!(next.incumbrance_pending_registration.is_empty());
            assert_eq!(next.incumbrance_history.len(), 1);
        }
        TransitionOutcome::Remove => panic!("expected a put"),
    }
}

#[test]
fn submissions_report_their_entry_id() {
    let engine = WorkflowEngine::default();
    let record = asset("asset5");
    let details = IncumbranceDetails::from_payload(&fixtures::incumbrance_payload()).unwrap();
    let command = Command::SubmitIncumbrance {
        id: "asset5".into(),
        details,
    };

    let transition = engine.apply(Some(&record), &command, &caller(), now()).unwrap();
    let entry_id = transition.entry_id.expect("submission carries an entry id");
    assert_eq!(transition.next_version(), Some(record.version + 1));
    match transition.outcome {
        TransitionOutcome::Put(next) => {
            assert_eq!(next.incumbrance_pending_registration[0].entry_id, Some(entry_id));
            assert_eq!(next.status, PropertyStatus::Recycled);
        }
        TransitionOutcome::Remove => panic!("expected a put"),
    }
}

#[test]
fn update_with_mismatched_identifier_is_refused() {
    let record = asset("asset3");
    let patch = RecordPatch {
        id: "asset4".into(),
        status: Some(PropertyStatus::InMarket),
        ..RecordPatch::default()
    };
    let result = apply_update(&record, "asset3", &patch, now());
    assert!(matches!(result, Err(WorkflowError::IdentifierMismatch { .. })));
}
