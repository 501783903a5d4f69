//! Export and import of whole backups.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tracing_test::traced_test;
use veritas_core::{
    Account, BackupEnvelope, BackupSource, RawBackup, RecordStore, Role, StudentResult,
    TeacherConfig,
};
use veritas_state::fakes::{MemoryLocalStore, MemoryRemoteStore};
use veritas_state::RemoteStore;

fn online_store() -> RecordStore {
    RecordStore::new(
        Some(Arc::new(MemoryRemoteStore::new()) as Arc<dyn RemoteStore>),
        Arc::new(MemoryLocalStore::new()),
    )
}

fn local_store() -> RecordStore {
    RecordStore::new(None, Arc::new(MemoryLocalStore::new()))
}

async fn populate(store: &RecordStore) {
    store
        .save_account(Account::new("dir", "pw", "Director", Role::Director))
        .await
        .unwrap();
    store
        .save_account(Account::new("prof", "pw", "Prof", Role::Teacher))
        .await
        .unwrap();
    store
        .save_teacher_config(TeacherConfig::new("Artes", "1").with_teacher("prof"))
        .await
        .unwrap();
    store
        .save_student_result(StudentResult::new("Ana", "Artes", "1", 9.0, 10))
        .await
        .unwrap();
}

fn usernames(envelope: &BackupEnvelope) -> BTreeSet<String> {
    envelope.users.iter().map(|a| a.username.clone()).collect()
}

#[tokio::test]
async fn export_then_import_into_empty_store_reproduces_records() {
    let source = online_store();
    populate(&source).await;
    let exported = source.export_json().await.unwrap();

    let target = local_store();
    assert!(target.import_json(&exported).await);

    let before = source.export_all().await;
    let after = target.export_all().await;
    assert_eq!(usernames(&before), usernames(&after));
    assert_eq!(before.configs, after.configs);
    assert_eq!(before.results, after.results);
}

#[tokio::test]
async fn reimport_into_same_store_keeps_record_set() {
    for store in [online_store(), local_store()] {
        populate(&store).await;
        let before = store.export_all().await;

        assert!(store.import_json(&store.export_json().await.unwrap()).await);
        let after = store.export_all().await;

        assert_eq!(usernames(&before), usernames(&after));
        assert_eq!(after.users.len(), before.users.len());
        assert_eq!(before.configs, after.configs);

        // results have no natural key, so a replay appends copies
        assert_eq!(after.results.len(), 2 * before.results.len());
        assert!(after.results.iter().all(|r| before.results.contains(r)));
        assert!(before.results.iter().all(|r| after.results.contains(r)));
    }
}

#[tokio::test]
async fn envelope_records_the_serving_backend() {
    let online = online_store().export_all().await;
    assert_eq!(online.source, BackupSource::RemoteStore);

    let offline = local_store().export_all().await;
    assert_eq!(offline.source, BackupSource::LocalStorage);

    let json = serde_json::to_value(&offline).unwrap();
    assert_eq!(json["source"], "local_storage");
    assert!(json["timestamp"].is_string());
}

#[traced_test]
#[tokio::test]
async fn malformed_backup_is_rejected() {
    let store = local_store();
    assert!(!store.import_json("{ not json").await);
    assert!(!store.import_json(r#"{"users": 3}"#).await);
    assert!(store.list_accounts().await.value.is_empty());
    assert!(logs_contain("invalid backup file"));
}

#[tokio::test]
async fn missing_sections_are_skipped() {
    let store = local_store();
    assert!(store.import_json(r#"{"timestamp": "whenever"}"#).await);
    assert!(store.import_json("{}").await);
}

#[traced_test]
#[tokio::test]
async fn undecodable_account_is_skipped() {
    let store = local_store();
    let backup: RawBackup = serde_json::from_value(json!({
        "users": [
            {"username": "broken"},
            {"username": "ok", "password": "p", "name": "Ok", "role": "STUDENT"}
        ],
        "configs": [],
        "results": []
    }))
    .unwrap();

    let report = store.replay(backup).await.unwrap();
    assert_eq!(report.accounts, 1);
    assert_eq!(report.skipped_accounts, 1);
    assert!(store.authenticate("ok", "p").await.is_some());
    assert!(logs_contain("skipping account from backup"));
}

#[tokio::test]
async fn undecodable_config_aborts_import() {
    let store = local_store();
    let backup = json!({
        "users": [{"username": "u", "password": "p", "name": "U", "role": "TEACHER"}],
        "configs": [{"subject": 1}],
        "results": [{"studentName": "x", "subject": "s", "bimester": "b", "score": 1.0, "totalQuestions": 1}]
    });

    assert!(!store.import_json(&backup.to_string()).await);
    // records before the failing config stay saved
    assert_eq!(store.list_accounts().await.value.len(), 1);
    assert!(store.list_student_results().await.value.is_empty());
}

#[tokio::test]
async fn backups_from_the_web_client_import_despite_their_source_tag() {
    let store = local_store();
    let backup = json!({
        "users": [{"username": "prof", "password": "pw", "name": "Prof", "role": "TEACHER"}],
        "configs": [],
        "results": [],
        "timestamp": "2024-03-01T12:00:00.000Z",
        "source": "firebase_cloud"
    });

    assert!(store.import_json(&backup.to_string()).await);
    assert!(store.authenticate("prof", "pw").await.is_some());
}
