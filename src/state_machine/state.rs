//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Greeting the panel opens with
pub const GREETING: &str = "Hello. I am the P3394 Working Group Assistant. I can help you draft agenda items, summarize standard clauses, or discuss AI topics. How can I assist you today?";

/// Seed message after the user clears the chat
pub const CLEARED_GREETING: &str =
    "Chat cleared. How can I help you with P3394 standards today?";

/// Assistant reply when the gateway fails
pub const FAILURE_FALLBACK: &str =
    "I encountered an error connecting to the knowledge base. Please try again later.";

/// Conversation epoch. Advanced by every clear; results tagged with an
/// older generation belong to a superseded conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Generation {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Busy/idle status as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    AwaitingResponse,
}

/// Conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for user input, no request outstanding
    Idle { generation: Generation },

    /// User message appended, gateway request in flight
    AwaitingResponse { generation: Generation },
}

impl Default for ConvState {
    fn default() -> Self {
        ConvState::Idle {
            generation: Generation::default(),
        }
    }
}

impl ConvState {
    pub fn generation(self) -> Generation {
        match self {
            ConvState::Idle { generation } | ConvState::AwaitingResponse { generation } => {
                generation
            }
        }
    }

    pub fn status(self) -> Status {
        match self {
            ConvState::Idle { .. } => Status::Idle,
            ConvState::AwaitingResponse { .. } => Status::AwaitingResponse,
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation_id: String,
    pub greeting: String,
    pub cleared_greeting: String,
    pub failure_fallback: String,
}

impl ConvContext {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            greeting: GREETING.to_string(),
            cleared_greeting: CLEARED_GREETING.to_string(),
            failure_fallback: FAILURE_FALLBACK.to_string(),
        }
    }
}
