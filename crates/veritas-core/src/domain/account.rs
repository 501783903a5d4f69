//! User accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use veritas_state::USERS_COLLECTION;

use super::{DocumentKey, Record, USERS_KEY};

/// Username of the default administrator
pub const DEFAULT_ADMIN_USERNAME: &str = "diretor";

/// Password of the default administrator
pub const DEFAULT_ADMIN_PASSWORD: &str = "Matuto@84";

/// Display name of the default administrator
pub const DEFAULT_ADMIN_NAME: &str = "Diretor Geral";

/// What an account is allowed to do in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Director,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "DIRECTOR",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECTOR" => Ok(Role::Director),
            "TEACHER" => Ok(Role::Teacher),
            "STUDENT" => Ok(Role::Student),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A user account.
///
/// The password is stored and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl Account {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            name: name.into(),
            role,
        }
    }

    /// The administrator seeded when no account exists.
    pub fn default_admin() -> Self {
        Self::new(
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_PASSWORD,
            DEFAULT_ADMIN_NAME,
            Role::Director,
        )
    }

    pub fn is_director(&self) -> bool {
        self.role == Role::Director
    }
}

impl Record for Account {
    const KIND: &'static str = "account";
    const COLLECTION: &'static str = USERS_COLLECTION;
    const LOCAL_KEY: &'static str = USERS_KEY;

    fn document_key(&self) -> DocumentKey {
        DocumentKey::Fixed(self.username.clone())
    }

    /// Local writes never overwrite: an existing username wins.
    fn merge_into(self, local: &mut Vec<Self>) {
        if !local.iter().any(|a| a.username == self.username) {
            local.push(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_upper_case() {
        let json = serde_json::to_string(&Account::default_admin()).unwrap();
        assert!(json.contains(r#""role":"DIRECTOR""#));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn local_merge_keeps_existing_username() {
        let mut local = vec![Account::new("ana", "1", "Ana", Role::Teacher)];
        Account::new("ana", "2", "Ana B", Role::Student).merge_into(&mut local);
        Account::new("bia", "3", "Bia", Role::Student).merge_into(&mut local);

        assert_eq!(local.len(), 2);
        assert_eq!(local[0].password, "1");
        assert_eq!(local[1].username, "bia");
    }

    #[test]
    fn document_key_is_username() {
        let acct = Account::new("Ana", "x", "Ana", Role::Teacher);
        assert_eq!(acct.document_key(), DocumentKey::Fixed("Ana".to_string()));
    }
}
