//! Session runtime executor

use super::{SessionSnapshot, SseEvent};
use crate::completion::CompletionClient;
use crate::history::ConversationLog;
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use crate::system_prompt::{greeting, SYSTEM_PROMPT};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Runs one session: applies events in order, one turn at a time
pub struct SessionRuntime {
    context: ConvContext,
    state: ConvState,
    log: ConversationLog,
    /// API key supplied by this session only
    credential: Option<String>,
    completion: Arc<CompletionClient>,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionRuntime {
    pub fn new(
        context: ConvContext,
        completion: Arc<CompletionClient>,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        let log = ConversationLog::seeded(SYSTEM_PROMPT, greeting(&context.app));
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            state: ConvState::Idle,
            messages: log.transcript(),
        });

        Self {
            context,
            state: ConvState::Idle,
            log,
            credential: None,
            completion,
            event_rx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.process_event(event).await {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    state = self.state.as_str(),
                    error = %e,
                    "Rejected event"
                );
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Effects may generate follow-up events (a completion reply)
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    let _ = self.broadcast_tx.send(SseEvent::Error {
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            };

            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect).await {
                    events_to_process.push(generated);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendMessage(message) => {
                self.log.append(message.clone());
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
                None
            }
            Effect::RequestCompletion => {
                let text = self
                    .completion
                    .reply(self.log.messages(), self.credential.as_deref())
                    .await;
                Some(Event::ModelReply { text })
            }
            Effect::ResetHistory { notice } => {
                self.log.clear(notice);
                let _ = self.broadcast_tx.send(SseEvent::Reset {
                    messages: self.log.transcript(),
                });
                None
            }
            Effect::StoreCredential { api_key } => {
                tracing::info!(
                    session_id = %self.context.session_id,
                    present = api_key.is_some(),
                    "Session credential updated"
                );
                self.credential = api_key;
                None
            }
            Effect::NotifyClient(change) => {
                self.publish_snapshot();
                let _ = self.broadcast_tx.send(SseEvent::StateChange(change));
                None
            }
        }
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(SessionSnapshot {
            state: self.state,
            messages: self.log.transcript(),
        });
    }
}
