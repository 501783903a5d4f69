//! SurrealDB-backed RemoteStore implementation
//!
//! Each collection is a SCHEMAFULL table whose records carry the JSON
//! document as a single `body` string, keyed by the document id.
//!
//! Supports in-memory, local file (`surrealkv://`) and cloud (WebSocket)
//! connections.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::{RemoteError, StateError};
use crate::storage_traits::{Document, RemoteResult, RemoteStore, COLLECTIONS};

/// Default namespace for Veritas data
pub const DEFAULT_NAMESPACE: &str = "veritas";

/// Default database name
pub const DEFAULT_DATABASE: &str = "main";

/// How the client authenticates after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    /// Root user, valid for every namespace
    Root,
    /// User defined on the target database
    Database,
}

/// Username and password for an authenticated endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub sign_in: SignIn,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("sign_in", &self.sign_in)
            .finish_non_exhaustive()
    }
}

/// Where the remote store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTarget {
    /// A SurrealDB endpoint: `mem://`, `surrealkv://path`, `ws://host:port`,
    /// `wss://...` for hosted instances.
    Endpoint {
        url: String,
        namespace: String,
        database: String,
        credentials: Option<Credentials>,
    },
    /// No remote store; run on local storage only
    Disabled,
}

impl RemoteTarget {
    /// Unauthenticated endpoint in the default namespace and database.
    pub fn endpoint(url: impl Into<String>) -> Self {
        RemoteTarget::Endpoint {
            url: url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Resolve the target from the process environment.
    ///
    /// See [`from_lookup`](Self::from_lookup) for the variables read.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the target from a variable lookup.
    ///
    /// The endpoint is SURREALDB_ENDPOINT, else SURREALDB_URL; with neither
    /// set the remote store is disabled. SURREALDB_USERNAME and
    /// SURREALDB_PASSWORD enable sign-in (root when SURREALDB_ROOT is
    /// "true"). SURREALDB_NAMESPACE and SURREALDB_DATABASE override the
    /// defaults. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let Some(url) = var("SURREALDB_ENDPOINT").or_else(|| var("SURREALDB_URL")) else {
            return RemoteTarget::Disabled;
        };

        let credentials = match (var("SURREALDB_USERNAME"), var("SURREALDB_PASSWORD")) {
            (Some(username), Some(password)) => {
                let root = var("SURREALDB_ROOT").is_some_and(|v| v.eq_ignore_ascii_case("true"));
                Some(Credentials {
                    username,
                    password,
                    sign_in: if root { SignIn::Root } else { SignIn::Database },
                })
            }
            _ => None,
        };

        RemoteTarget::Endpoint {
            url,
            namespace: var("SURREALDB_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            database: var("SURREALDB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            credentials,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, RemoteTarget::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct DocumentRow {
    doc_id: String,
    body: String,
}

impl DocumentRow {
    fn into_document(self) -> RemoteResult<Document> {
        let data = serde_json::from_str(&self.body)?;
        Ok(Document {
            id: self.doc_id,
            data,
        })
    }
}

/// SurrealDB-backed implementation of [`RemoteStore`].
#[derive(Clone)]
pub struct SurrealRemoteStore {
    db: Surreal<Any>,
}

impl SurrealRemoteStore {
    /// In-memory instance with the tables defined, for tests.
    pub async fn in_memory() -> Result<Self, StateError> {
        Self::connect(&RemoteTarget::endpoint("mem://")).await
    }

    /// Connect, sign in if credentials are given, select the namespace and
    /// database, then define the tables.
    #[instrument(skip_all)]
    pub async fn connect(target: &RemoteTarget) -> Result<Self, StateError> {
        let RemoteTarget::Endpoint {
            url,
            namespace,
            database,
            credentials,
        } = target
        else {
            return Err(StateError::Connection(
                "no remote store configured".to_string(),
            ));
        };

        info!(url = %url, namespace = %namespace, database = %database, "connecting to remote store");
        let db = surrealdb::engine::any::connect(url.as_str())
            .await
            .map_err(|e| StateError::Connection(format!("{}: {}", url, e)))?;

        let signed_in = match credentials {
            Some(Credentials {
                username,
                password,
                sign_in: SignIn::Root,
            }) => {
                db.signin(Root { username, password }).await.map(|_| ())
            }
            Some(Credentials {
                username,
                password,
                sign_in: SignIn::Database,
            }) => {
                db.signin(Database {
                    namespace,
                    database,
                    username,
                    password,
                })
                .await
                .map(|_| ())
            }
            None => Ok(()),
        };
        signed_in.map_err(|e| {
            StateError::Connection(format!("sign-in as {:?} failed: {}", credentials, e))
        })?;

        db.use_ns(namespace.as_str())
            .use_db(database.as_str())
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        let store = SurrealRemoteStore { db };
        store.init_schema().await?;

        debug!("remote store ready");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StateError> {
        debug!("Initializing Veritas schema");

        let schema: String = COLLECTIONS
            .iter()
            .map(|table| {
                format!(
                    "DEFINE TABLE IF NOT EXISTS {table} SCHEMAFULL;\n\
                     DEFINE FIELD IF NOT EXISTS body ON {table} TYPE string;\n"
                )
            })
            .collect();

        self.db
            .query(schema)
            .await
            .and_then(|response| response.check())
            .map_err(|e| StateError::SchemaSetup(e.to_string()))?;

        debug!("Schema initialized successfully");
        Ok(())
    }

    async fn write_body(&self, collection: &str, id: &str, data: &Value) -> RemoteResult<()> {
        let body = serde_json::to_string(data)?;
        self.db
            .query("UPSERT type::thing($tb, $id) CONTENT { body: $body }")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .bind(("body", body))
            .await?
            .check()?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SurrealRemoteStore {
    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> RemoteResult<Vec<Document>> {
        let mut response = self
            .db
            .query("SELECT meta::id(id) AS doc_id, body FROM type::table($tb)")
            .bind(("tb", collection.to_string()))
            .await?
            .check()?;

        let rows: Vec<DocumentRow> = response.take(0)?;
        debug!(count = rows.len(), "documents listed");
        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    #[instrument(skip(self, data))]
    async fn set(&self, collection: &str, id: &str, data: Value) -> RemoteResult<()> {
        self.write_body(collection, id, &data).await
    }

    #[instrument(skip(self, data))]
    async fn add(&self, collection: &str, data: Value) -> RemoteResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&data)?;
        self.db
            .query("CREATE type::thing($tb, $id) CONTENT { body: $body }")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.clone()))
            .bind(("body", body))
            .await?
            .check()?;
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> RemoteResult<()> {
        let mut response = self
            .db
            .query("SELECT meta::id(id) AS doc_id, body FROM type::thing($tb, $id)")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .await?
            .check()?;

        let rows: Vec<DocumentRow> = response.take(0)?;
        let existing = rows
            .into_iter()
            .next()
            .ok_or_else(|| {
                RemoteError::not_found(format!("no document {}/{} to update", collection, id))
            })?
            .into_document()?;

        let mut body = match existing.data {
            Value::Object(body) => body,
            _ => Map::new(),
        };
        body.extend(fields);
        self.write_body(collection, id, &Value::Object(body)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()> {
        self.db
            .query("DELETE type::thing($tb, $id)")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
