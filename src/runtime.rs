//! Runtime for executing conversations
//!
//! One tokio task per open panel owns the conversation. Callers talk to it
//! through an [`AssistantHandle`]: commands go in over an mpsc channel and
//! snapshots come out over a watch channel.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::message::Message;
use crate::state_machine::{ConvContext, Generation, Status, TransitionError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch, RwLock};

/// Requests from handles to the runtime task
#[derive(Debug)]
pub enum Command {
    Submit {
        text: String,
        reply: oneshot::Sender<Result<Generation, SubmitError>>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
}

/// Read-only view of a conversation at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub status: Status,
    pub generation: Generation,
}

impl ConversationSnapshot {
    pub fn is_idle(&self) -> bool {
        self.status == Status::Idle
    }
}

/// Why a submission or clear was not carried out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Message is empty")]
    Empty,
    #[error("Assistant is busy, wait for the current response")]
    Busy,
    #[error("Assistant panel is closed")]
    Closed,
    #[error("{0}")]
    Rejected(String),
}

impl From<TransitionError> for SubmitError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::EmptyMessage => SubmitError::Empty,
            TransitionError::AgentBusy => SubmitError::Busy,
            other @ TransitionError::StaleResult { .. } => SubmitError::Rejected(other.to_string()),
        }
    }
}

/// Handle to interact with a running conversation
#[derive(Debug, Clone)]
pub struct AssistantHandle {
    conversation_id: String,
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Arc<ConversationSnapshot>>,
}

impl AssistantHandle {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Append a user message and start the gateway request. Resolves once
    /// the message is in the history, not when the reply arrives.
    pub async fn submit(&self, text: impl Into<String>) -> Result<Generation, SubmitError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Submit {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| SubmitError::Closed)?;
        rx.await.map_err(|_| SubmitError::Closed)?
    }

    /// Reset to a single seed message. Any in-flight reply is discarded.
    pub async fn clear(&self) -> Result<(), SubmitError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Clear { reply })
            .await
            .map_err(|_| SubmitError::Closed)?;
        rx.await.map_err(|_| SubmitError::Closed)
    }

    pub fn snapshot(&self) -> Arc<ConversationSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<ConversationSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Wait until no request is outstanding
    #[cfg(test)]
    pub async fn wait_idle(&self) -> Result<Arc<ConversationSnapshot>, SubmitError> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(|s| s.is_idle())
            .await
            .map_err(|_| SubmitError::Closed)?;
        Ok(snapshot.clone())
    }
}

/// Start a runtime task for a new conversation
pub fn spawn_assistant<C>(context: ConvContext, client: Arc<C>) -> AssistantHandle
where
    C: CompletionClient + ?Sized + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(32);
    let conversation_id = context.conversation_id.clone();
    let runtime = ConversationRuntime::new(context, client, command_rx);
    let snapshot_rx = runtime.subscribe();

    let conv_id = conversation_id.clone();
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(conv_id = %conv_id, "Conversation runtime finished");
    });

    AssistantHandle {
        conversation_id,
        command_tx,
        snapshot_rx,
    }
}

/// Owns the (single) assistant panel of this server
pub struct PanelManager {
    client: Arc<dyn CompletionClient>,
    panel: RwLock<Option<AssistantHandle>>,
}

impl PanelManager {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            panel: RwLock::new(None),
        }
    }

    /// Get the open panel, opening a fresh conversation if there is none
    pub async fn open(&self) -> AssistantHandle {
        if let Some(handle) = self.panel.read().await.as_ref() {
            return handle.clone();
        }

        let mut panel = self.panel.write().await;
        // Another caller may have opened it while we waited for the lock
        if let Some(handle) = panel.as_ref() {
            return handle.clone();
        }

        let context = ConvContext::new(uuid::Uuid::new_v4().to_string());
        tracing::info!(conv_id = %context.conversation_id, "Opening assistant panel");
        let handle = spawn_assistant(context, self.client.clone());
        *panel = Some(handle.clone());
        handle
    }

    /// Close the panel, discarding its conversation. Returns false if no
    /// panel was open.
    pub async fn close(&self) -> bool {
        match self.panel.write().await.take() {
            Some(handle) => {
                tracing::info!(conv_id = %handle.conversation_id(), "Closing assistant panel");
                true
            }
            None => false,
        }
    }
}
