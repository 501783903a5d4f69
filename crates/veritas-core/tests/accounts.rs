//! Account lifecycle on both backends.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use veritas_core::{Account, Backend, DomainError, RecordStore, Role};
use veritas_state::fakes::{MemoryLocalStore, MemoryRemoteStore};
use veritas_state::{Document, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore};

fn online_store() -> (RecordStore, Arc<MemoryRemoteStore>) {
    let remote = Arc::new(MemoryRemoteStore::new());
    let store = RecordStore::new(
        Some(remote.clone() as Arc<dyn RemoteStore>),
        Arc::new(MemoryLocalStore::new()),
    );
    (store, remote)
}

fn local_store() -> RecordStore {
    RecordStore::new(None, Arc::new(MemoryLocalStore::new()))
}

fn director(username: &str) -> Account {
    Account::new(username, "secret", "Director", Role::Director)
}

#[tokio::test]
async fn distinct_usernames_are_all_listed() {
    for store in [online_store().0, local_store()] {
        let accounts = vec![
            director("dir"),
            Account::new("prof", "a", "Prof", Role::Teacher),
            Account::new("aluno", "b", "Aluno", Role::Student),
        ];
        for account in &accounts {
            store.save_account(account.clone()).await.unwrap();
        }

        let mut listed = store.list_accounts().await.into_value();
        listed.sort_by(|a, b| a.username.cmp(&b.username));
        let mut expected = accounts;
        expected.sort_by(|a, b| a.username.cmp(&b.username));
        assert_eq!(listed, expected);
    }
}

#[tokio::test]
async fn remote_save_overwrites_same_username() {
    let (store, _remote) = online_store();
    store.save_account(director("dir")).await.unwrap();
    store
        .save_account(Account::new("dir", "other", "Renamed", Role::Director))
        .await
        .unwrap();

    let listed = store.list_accounts().await.into_value();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Renamed");
}

#[tokio::test]
async fn local_save_keeps_first_account_for_username() {
    let store = local_store();
    store.save_account(director("dir")).await.unwrap();
    store
        .save_account(Account::new("dir", "other", "Renamed", Role::Director))
        .await
        .unwrap();

    let listed = store.list_accounts().await.into_value();
    assert_eq!(listed, vec![director("dir")]);
}

#[tokio::test]
async fn last_director_cannot_be_deleted() {
    for store in [online_store().0, local_store()] {
        store.save_account(director("only")).await.unwrap();

        let err = store.delete_account("only").await.unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::LastDirector));
        assert_eq!(store.list_accounts().await.value.len(), 1);
    }
}

#[tokio::test]
async fn director_can_be_deleted_when_another_remains() {
    for store in [online_store().0, local_store()] {
        store.save_account(director("one")).await.unwrap();
        store.save_account(director("two")).await.unwrap();

        store.delete_account("one").await.unwrap();
        let listed = store.list_accounts().await.into_value();
        assert_eq!(listed, vec![director("two")]);
    }
}

#[tokio::test]
async fn deleting_unknown_username_is_a_no_op() {
    let store = local_store();
    store.save_account(director("dir")).await.unwrap();

    let served = store.delete_account("ghost").await.unwrap();
    assert_eq!(served.backend, Backend::Local);
    assert_eq!(store.list_accounts().await.value.len(), 1);
}

#[tokio::test]
async fn password_change_requires_current_password() {
    for store in [online_store().0, local_store()] {
        store
            .save_account(Account::new("prof", "old", "Prof", Role::Teacher))
            .await
            .unwrap();

        let err = store
            .update_password("prof", "wrong", "new")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::WrongPassword));
        assert!(store.authenticate("prof", "old").await.is_some());

        store.update_password("prof", "old", "new").await.unwrap();
        assert!(store.authenticate("prof", "old").await.is_none());
        assert!(store.authenticate("prof", "new").await.is_some());
    }
}

#[tokio::test]
async fn password_change_for_unknown_account_fails() {
    let (store, _remote) = online_store();
    let err = store
        .update_password("ghost", "x", "y")
        .await
        .unwrap_err();
    assert_eq!(
        err.as_domain(),
        Some(&DomainError::AccountNotFound("ghost".to_string()))
    );
}

/// Remote store whose updates always fail with a timeout.
struct UpdatesTimeOut(MemoryRemoteStore);

#[async_trait]
impl RemoteStore for UpdatesTimeOut {
    async fn list(&self, collection: &str) -> RemoteResult<Vec<Document>> {
        self.0.list(collection).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> RemoteResult<()> {
        self.0.set(collection, id, data).await
    }

    async fn add(&self, collection: &str, data: Value) -> RemoteResult<String> {
        self.0.add(collection, data).await
    }

    async fn update(&self, _: &str, _: &str, _: Map<String, Value>) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorKind::Timeout, "update timed out"))
    }

    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()> {
        self.0.delete(collection, id).await
    }
}

#[tokio::test]
async fn password_change_falls_back_when_update_fails() {
    let local = Arc::new(MemoryLocalStore::new());
    let store = RecordStore::new(
        Some(Arc::new(UpdatesTimeOut(MemoryRemoteStore::new())) as Arc<dyn RemoteStore>),
        local.clone(),
    );
    store
        .save_account(Account::new("prof", "old", "Prof", Role::Teacher))
        .await
        .unwrap();

    let served = store.update_password("prof", "old", "new").await.unwrap();
    assert_eq!(served.backend, Backend::Local);
    assert!(store.selector().is_remote_available());

    // The account only existed remotely, so the full record lands locally.
    let offline = RecordStore::new(None, local);
    let listed = offline.list_accounts().await.into_value();
    assert_eq!(listed, vec![Account::new("prof", "new", "Prof", Role::Teacher)]);
}

#[tokio::test]
async fn authenticate_requires_exact_match() {
    let store = local_store();
    store
        .save_account(Account::new("Ana", "Senha1", "Ana", Role::Student))
        .await
        .unwrap();

    let found = store.authenticate("Ana", "Senha1").await;
    assert_eq!(found.map(|a| a.role), Some(Role::Student));
    assert!(store.authenticate("ana", "Senha1").await.is_none());
    assert!(store.authenticate("Ana", "senha1").await.is_none());
    assert!(store.authenticate("", "").await.is_none());
}

#[tokio::test]
async fn default_admin_password_is_kept_on_wrong_current_password() {
    let store = local_store();
    store.bootstrap().unwrap().wait().await.unwrap();

    let err = store
        .update_password("diretor", "wrong", "new")
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::WrongPassword));
    assert!(store.authenticate("diretor", "Matuto@84").await.is_some());
    assert!(store.authenticate("diretor", "new").await.is_none());
}
