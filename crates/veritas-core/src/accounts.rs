//! Account operations and password authentication.

use serde_json::{Map, Value};
use veritas_state::USERS_COLLECTION;

use crate::domain::{Account, Record};
use crate::error::{DomainError, Result};
use crate::store::{RecordStore, Served};

impl RecordStore {
    pub async fn list_accounts(&self) -> Served<Vec<Account>> {
        self.list::<Account>().await
    }

    /// Create or overwrite an account.
    ///
    /// The local fallback never overwrites an existing username.
    pub async fn save_account(&self, account: Account) -> Result<Served<()>> {
        self.save(account).await
    }

    /// Delete an account, refusing to remove the last director.
    ///
    /// Unknown usernames are a no-op.
    pub async fn delete_account(&self, username: &str) -> Result<Served<()>> {
        let accounts = self.list_accounts().await.into_value();

        if let Some(target) = accounts.iter().find(|a| a.username == username) {
            let directors = accounts.iter().filter(|a| a.is_director()).count();
            if target.is_director() && directors <= 1 {
                return Err(DomainError::LastDirector.into());
            }
        }

        let id = username.to_string();
        let attempt = self
            .attempt_remote("delete", Account::KIND, move |remote| async move {
                remote.delete(USERS_COLLECTION, &id).await
            })
            .await;

        match attempt {
            Ok(()) => Ok(Served::remote(())),
            Err(fallback) => {
                let mut local = self.load_local::<Account>()?;
                local.retain(|a| a.username != username);
                self.store_local(&local)?;
                Ok(Served::local((), fallback))
            }
        }
    }

    /// Change a password after checking the current one.
    pub async fn update_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<Served<()>> {
        let accounts = self.list_accounts().await.into_value();
        let account = accounts
            .into_iter()
            .find(|a| a.username == username)
            .ok_or_else(|| DomainError::AccountNotFound(username.to_string()))?;

        if account.password != current_password {
            return Err(DomainError::WrongPassword.into());
        }

        let id = username.to_string();
        let mut fields = Map::new();
        fields.insert(
            "password".to_string(),
            Value::String(new_password.to_string()),
        );
        let attempt = self
            .attempt_remote("update_password", Account::KIND, move |remote| async move {
                remote.update(USERS_COLLECTION, &id, fields).await
            })
            .await;

        match attempt {
            Ok(()) => Ok(Served::remote(())),
            Err(fallback) => {
                let mut local = self.load_local::<Account>()?;
                match local.iter().position(|a| a.username == username) {
                    Some(i) => local[i].password = new_password.to_string(),
                    None => local.push(Account {
                        password: new_password.to_string(),
                        ..account
                    }),
                }
                self.store_local(&local)?;
                Ok(Served::local((), fallback))
            }
        }
    }

    /// Find the account matching both username and password exactly.
    pub async fn authenticate(&self, username: &str, password: &str) -> Option<Account> {
        self.list_accounts()
            .await
            .into_value()
            .into_iter()
            .find(|a| a.username == username && a.password == password)
    }
}
