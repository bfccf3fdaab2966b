//! Per-session runtimes
//!
//! Each session gets its own task that owns the conversation state, the
//! message log and the session's API key. Sessions share nothing but the
//! completion client and the loaded configuration.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::completion::CompletionClient;
use crate::config::AppConfig;
use crate::llm::Message;
use crate::state_machine::{ConvContext, ConvState, Event, StateChange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::task::JoinHandle;

/// Point-in-time view of a session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: ConvState,
    /// Visible transcript, system message excluded
    pub messages: Vec<Message>,
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { snapshot: SessionSnapshot },
    Message { message: Message },
    Reset { messages: Vec<Message> },
    StateChange(StateChange),
    Error { message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Session {0} is no longer running")]
    SessionClosed(String),
}

/// Handle to interact with a running session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

struct SessionEntry {
    handle: SessionHandle,
    last_active: Instant,
}

/// Manager for all session runtimes
///
/// The map holds the only long-lived `event_tx` of each session, so removing
/// an entry lets that session's task drain its queue and stop.
pub struct RuntimeManager {
    config: Arc<AppConfig>,
    completion: Arc<CompletionClient>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl RuntimeManager {
    pub fn new(config: Arc<AppConfig>, completion: Arc<CompletionClient>) -> Self {
        Self {
            config,
            completion,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session with a freshly seeded conversation
    pub async fn create_session(&self) -> SessionHandle {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = ConvContext::new(&session_id, self.config.app.clone());

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = SessionRuntime::new(
            context,
            self.completion.clone(),
            event_rx,
            broadcast_tx.clone(),
        );
        let snapshot_rx = runtime.subscribe_snapshots();

        let id = session_id.clone();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session_id = %id, "Session runtime finished");
        });

        let handle = SessionHandle {
            session_id: session_id.clone(),
            created_at: Utc::now(),
            event_tx,
            broadcast_tx,
            snapshot_rx,
        };

        self.sessions.write().await.insert(
            session_id,
            SessionEntry {
                handle: handle.clone(),
                last_active: Instant::now(),
            },
        );

        handle
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, RuntimeError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.to_string()))
    }

    /// Look up a session and mark it active
    async fn touch(&self, session_id: &str) -> Result<SessionHandle, RuntimeError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.to_string()))?;
        entry.last_active = Instant::now();
        Ok(entry.handle.clone())
    }

    /// Send an event to a session
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), RuntimeError> {
        let handle = self.touch(session_id).await?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::SessionClosed(session_id.to_string()))
    }

    /// Subscribe to session updates. The snapshot is taken after subscribing
    /// so no update is missed.
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), RuntimeError> {
        let handle = self.touch(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        Ok((handle.snapshot(), rx))
    }

    /// Drop a session. Its task stops once queued events are processed.
    pub async fn remove_session(&self, session_id: &str) -> Result<(), RuntimeError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(RuntimeError::SessionNotFound(session_id.to_string()));
        }
        tracing::info!(session_id = %session_id, "Session removed");
        Ok(())
    }

    /// Drop every session with no stream subscribers that has been idle for
    /// at least `ttl`. A session with subscribers counts as active.
    ///
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|session_id, entry| {
            if entry.handle.broadcast_tx.receiver_count() > 0 {
                entry.last_active = now;
                return true;
            }
            let idle = now.saturating_duration_since(entry.last_active);
            if idle < ttl {
                return true;
            }
            tracing::info!(
                session_id = %session_id,
                idle_secs = idle.as_secs(),
                "Evicting idle session"
            );
            false
        });

        before - sessions.len()
    }

    /// Run [`Self::evict_idle`] every `every` for the life of the process
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, ttl: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let evicted = manager.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = manager.session_count().await;
                    tracing::info!(evicted, remaining, "Session sweep finished");
                }
            }
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }
}
