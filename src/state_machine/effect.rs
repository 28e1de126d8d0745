//! Effects produced by state transitions

use super::state::Generation;
use crate::message::Role;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a new message to the history
    AppendMessage { role: Role, content: String },

    /// Replace the whole history with a single assistant seed message
    ResetHistory { seed: String },

    /// Ask the gateway to answer `utterance`. The context is every message
    /// before the most recent one (the user message just appended).
    RequestCompletion {
        generation: Generation,
        utterance: String,
    },

    /// Record a gateway failure for diagnostics
    LogGatewayFailure { message: String },

    /// Push the current snapshot to observers
    PublishSnapshot,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
