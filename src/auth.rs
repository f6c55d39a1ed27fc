use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::info;
use ts_rs::TS;

use crate::error::{AppError, AppResult};
use crate::id::new_uuid_v7;
use crate::store::StoreHandle;

pub const ACTIVE_OWNER_KEY: &str = "activeOwnerId";

/// A resolved sign-in. The rest of the crate only ever needs `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct Session {
    pub owner_id: String,
    pub email: String,
}

/// Authentication boundary, consumed here and implemented elsewhere.
/// `subscribe` yields the current session and every later change, which is
/// how the UI flips between the remote and local collection backends.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_out(&self) -> AppResult<()>;
    async fn current_session(&self) -> AppResult<Option<Session>>;
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// In-memory provider backing tests and the CLI. Real deployments plug in
/// a hosted identity service behind the same trait.
pub struct MemoryAuth {
    users: Mutex<HashMap<String, (String, String)>>,
    sessions: watch::Sender<Option<Session>>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (sessions, _) = watch::channel(None);
        MemoryAuth {
            users: Mutex::new(HashMap::new()),
            sessions,
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| AppError::new("AUTH/STATE", "auth state poisoned"))?;
        if users.contains_key(email) {
            return Err(AppError::new(
                "AUTH/EMAIL_TAKEN",
                "An account with this email already exists.",
            ));
        }
        let owner_id = new_uuid_v7();
        users.insert(email.to_string(), (password.to_string(), owner_id.clone()));
        let session = Session {
            owner_id,
            email: email.to_string(),
        };
        let _ = self.sessions.send(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let users = self
            .users
            .lock()
            .map_err(|_| AppError::new("AUTH/STATE", "auth state poisoned"))?;
        match users.get(email) {
            Some((stored, owner_id)) if stored == password => {
                let session = Session {
                    owner_id: owner_id.clone(),
                    email: email.to_string(),
                };
                let _ = self.sessions.send(Some(session.clone()));
                Ok(session)
            }
            _ => Err(AppError::new(
                "AUTH/INVALID_CREDENTIALS",
                "Email or password is incorrect.",
            )),
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        let _ = self.sessions.send(None);
        Ok(())
    }

    async fn current_session(&self) -> AppResult<Option<Session>> {
        Ok(self.sessions.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

/// The CLI's owner profile: a persisted owner id in the scoped key-value
/// store, created on first use so repeated invocations address the same
/// collection.
pub fn active_owner_id(store: &StoreHandle) -> anyhow::Result<String> {
    if let Some(id) = store
        .get(ACTIVE_OWNER_KEY)
        .and_then(|v| v.as_str().map(str::to_owned))
    {
        return Ok(id);
    }

    let id = new_uuid_v7();
    store.set(ACTIVE_OWNER_KEY, Value::String(id.clone()));
    store.persist().context("persist active owner id")?;
    info!(
        target: "piecekeeper",
        event = "active_owner_created",
        owner_id = %id
    );
    Ok(id)
}
