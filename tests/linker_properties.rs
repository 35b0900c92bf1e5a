//! Name-Matching Linker Tests
//!
//! Tests for the linker's guarantees:
//! - One target per distinct requested name
//! - Shared names share a target
//! - Re-running never duplicates targets
//! - Matching is exact and case-sensitive

use std::sync::Arc;

use crmdml::access::{AccessOperation, ObjectAccess, ObjectPermissions};
use crmdml::dml::{DmlError, LinkSpec};
use crmdml::sobject::fields;
use crmdml::store::Criteria;
use crmdml::{DmlService, InMemoryStore, ObjectType, Record, RecordStore};

fn setup() -> (Arc<InMemoryStore>, DmlService) {
    let store = Arc::new(InMemoryStore::new());
    let service = DmlService::new(store.clone(), Arc::new(ObjectPermissions::allow_all()));
    (store, service)
}

fn contact(last_name: &str) -> Record {
    Record::new(ObjectType::Contact).with_field(fields::LAST_NAME, last_name)
}

fn accounts_named(store: &InMemoryStore, name: &str) -> Vec<Record> {
    store
        .query(ObjectType::Account, &Criteria::all().eq(fields::NAME, name))
        .unwrap()
}

// =============================================================================
// Creation and Linking
// =============================================================================

/// ["Doe", "Jane", "Doe"] with no accounts yields two accounts and three links.
#[test]
fn test_duplicate_names_share_one_target() {
    let (store, service) = setup();
    let spec = LinkSpec::contacts_to_accounts();

    let outcome = service
        .upsert_accounts_with_contacts(vec![contact("Doe"), contact("Jane"), contact("Doe")])
        .unwrap()
        .unwrap();

    assert_eq!(store.count(ObjectType::Account).unwrap(), 2);
    assert_eq!(accounts_named(&store, "Doe").len(), 1);
    assert_eq!(accounts_named(&store, "Jane").len(), 1);
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.unmatched, 0);

    let refs: Vec<_> = (0..3)
        .map(|i| outcome.reference_of(&spec, i).unwrap())
        .collect();
    assert_eq!(refs[0], refs[2]);
    assert_ne!(refs[0], refs[1]);
    assert_eq!(refs[0], accounts_named(&store, "Doe")[0].id.clone().unwrap());
}

/// Linking records are persisted with their reference.
#[test]
fn test_links_are_saved() {
    let (store, service) = setup();

    service
        .upsert_accounts_with_contacts(vec![contact("Doe"), contact("Jane")])
        .unwrap()
        .unwrap();

    let contacts = store
        .query(ObjectType::Contact, &Criteria::all())
        .unwrap();
    assert_eq!(contacts.len(), 2);
    for saved in contacts {
        let account_id = saved.get_str(fields::ACCOUNT_ID).unwrap();
        let account = store
            .get(&crmdml::RecordId::new(account_id))
            .unwrap()
            .unwrap();
        assert_eq!(account.name(), saved.name());
    }
}

// =============================================================================
// Reuse and Idempotence
// =============================================================================

/// An existing account with the requested name is reused, not duplicated.
#[test]
fn test_existing_target_is_reused() {
    let (store, service) = setup();
    let existing = service.insert_account("Doe").unwrap().unwrap();

    let outcome = service
        .upsert_accounts_with_contacts(vec![contact("Doe")])
        .unwrap()
        .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 1);
    assert_eq!(
        outcome.reference_of(&LinkSpec::contacts_to_accounts(), 0),
        Some(existing)
    );
}

/// Running twice with the same input creates no duplicate targets.
#[test]
fn test_second_run_creates_no_targets() {
    let (store, service) = setup();
    let names = ["Doe", "Jane", "Doe"];

    let first = service
        .upsert_accounts_with_contacts(names.iter().map(|n| contact(n)).collect())
        .unwrap()
        .unwrap();
    let second = service
        .upsert_accounts_with_contacts(names.iter().map(|n| contact(n)).collect())
        .unwrap()
        .unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 0);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 2);

    let spec = LinkSpec::contacts_to_accounts();
    for i in 0..names.len() {
        assert_eq!(first.reference_of(&spec, i), second.reference_of(&spec, i));
    }
}

/// Saved contacts are updated in place when re-linked.
#[test]
fn test_relinking_saved_contacts_updates_them() {
    let (store, service) = setup();
    let first = service
        .upsert_accounts_with_contacts(vec![contact("Doe")])
        .unwrap()
        .unwrap();

    service
        .upsert_accounts_with_contacts(first.links.clone())
        .unwrap()
        .unwrap();

    assert_eq!(store.count(ObjectType::Contact).unwrap(), 1);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 1);
}

// =============================================================================
// Matching Rules
// =============================================================================

/// "doe" and "Doe" are different names.
#[test]
fn test_matching_is_case_sensitive() {
    let (store, service) = setup();
    service.insert_account("Doe").unwrap();

    let outcome = service
        .upsert_accounts_with_contacts(vec![contact("doe")])
        .unwrap()
        .unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 2);
}

/// A prefix of an existing name is not a match.
#[test]
fn test_matching_requires_whole_string() {
    let (store, service) = setup();
    service.insert_account("Doerr").unwrap();

    service
        .upsert_accounts_with_contacts(vec![contact("Doe")])
        .unwrap()
        .unwrap();

    assert_eq!(accounts_named(&store, "Doe").len(), 1);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 2);
}

// =============================================================================
// Edge Cases
// =============================================================================

/// No contacts means no store traffic.
#[test]
fn test_empty_input() {
    let (_, service) = setup();
    let outcome = service
        .upsert_accounts_with_contacts(Vec::new())
        .unwrap()
        .unwrap();

    assert!(outcome.targets.is_empty());
    assert_eq!(service.metrics().queries_executed, 0);
}

/// A contact without a last name is rejected before any store call.
#[test]
fn test_nameless_contact_rejected() {
    let (store, service) = setup();
    let nameless = Record::new(ObjectType::Contact).with_field(fields::FIRST_NAME, "Jane");

    let err = service
        .upsert_accounts_with_contacts(vec![contact("Doe"), nameless])
        .unwrap_err();

    assert!(matches!(err, DmlError::MissingName { .. }));
    assert_eq!(store.count(ObjectType::Account).unwrap(), 0);
}

/// Denied create on the target name skips the whole run.
#[test]
fn test_denied_target_create_skips_everything() {
    let store = Arc::new(InMemoryStore::new());
    let policy = ObjectPermissions::allow_all().deny_field(
        ObjectType::Account,
        AccessOperation::Create,
        fields::NAME,
    );
    let service = DmlService::new(store.clone(), Arc::new(policy));

    let result = service
        .upsert_accounts_with_contacts(vec![contact("Doe")])
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.count(ObjectType::Account).unwrap(), 0);
    assert_eq!(store.count(ObjectType::Contact).unwrap(), 0);
}

/// Denied reference field on contacts also skips target creation.
#[test]
fn test_denied_reference_skips_targets_too() {
    let store = Arc::new(InMemoryStore::new());
    let policy = ObjectPermissions::allow_all().deny_field(
        ObjectType::Contact,
        AccessOperation::Create,
        fields::ACCOUNT_ID,
    );
    let service = DmlService::new(store.clone(), Arc::new(policy));

    assert!(service
        .upsert_accounts_with_contacts(vec![contact("Doe")])
        .unwrap()
        .is_none());
    assert_eq!(store.count(ObjectType::Account).unwrap(), 0);
}

/// Reusing an existing account writes nothing to it, so no update
/// capability on Account is needed.
#[test]
fn test_reused_target_needs_no_update_access() {
    let store = Arc::new(InMemoryStore::new());
    let policy = ObjectPermissions::allow_all().with_object(
        ObjectType::Account,
        ObjectAccess {
            update: false,
            ..ObjectAccess::FULL
        },
    );
    let service = DmlService::new(store.clone(), Arc::new(policy));
    let existing = service.insert_account("Doe").unwrap().unwrap();
    let before = store.get(&existing).unwrap().unwrap();

    let outcome = service
        .upsert_accounts_with_contacts(vec![contact("Doe"), contact("Jane")])
        .unwrap()
        .unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(
        outcome.reference_of(&LinkSpec::contacts_to_accounts(), 0),
        Some(existing.clone())
    );
    assert_eq!(store.get(&existing).unwrap().unwrap(), before);

    let metrics = service.metrics();
    assert_eq!(metrics.records_updated, 0);
    assert_eq!(metrics.records_inserted, 1 + 1 + 2);
    assert_eq!(metrics.permission_denials, 0);
}

/// A run where every target already exists issues no target save.
#[test]
fn test_all_targets_existing_counts_no_updates() {
    let (store, service) = setup();
    service.insert_account("Doe").unwrap();
    service.insert_account("Jane").unwrap();

    let outcome = service
        .upsert_accounts_with_contacts(vec![contact("Doe"), contact("Jane")])
        .unwrap()
        .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.targets.len(), 2);
    assert_eq!(store.count(ObjectType::Account).unwrap(), 2);
    assert_eq!(service.metrics().records_updated, 0);
}
