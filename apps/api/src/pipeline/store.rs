use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::session::Session;

/// In-memory registry of live sessions.
///
/// Each session has its own lock, held for the whole of a scan or tailor call,
/// so work on one session is serialized while other sessions proceed.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: Session) -> Arc<Mutex<Session>> {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        let active = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id, handle.clone());
            sessions.len()
        };
        info!("Session {id} created ({active} active)");
        handle
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Ends a session. Its state is dropped once in-flight calls release it.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {id} ended"))
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }
}
