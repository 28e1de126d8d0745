//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result, with no I/O. The runtime executes the returned effects.

use super::state::Generation;
use super::{ConvContext, ConvState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Assistant is busy, wait for the current response")]
    AgentBusy,
    /// Gateway result for a request that is no longer outstanding
    #[error("Stale gateway result from generation {issued} (current {current})")]
    StaleResult {
        issued: Generation,
        current: Generation,
    },
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // User Message Handling
        // ============================================================

        // Rejected before any state change
        (_, Event::UserMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + UserMessage -> AwaitingResponse
        // The user message is published before the request goes out
        (ConvState::Idle { generation }, Event::UserMessage { text }) => {
            Ok(TransitionResult::new(ConvState::AwaitingResponse { generation })
                .with_effect(Effect::append_user(text.clone()))
                .with_effect(Effect::PublishSnapshot)
                .with_effect(Effect::RequestCompletion {
                    generation,
                    utterance: text,
                }))
        }

        (ConvState::AwaitingResponse { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::AgentBusy)
        }

        // ============================================================
        // Clear: valid from any state, advances the generation
        // ============================================================
        (current, Event::Clear) => Ok(TransitionResult::new(ConvState::Idle {
            generation: current.generation().next(),
        })
        .with_effect(Effect::ResetHistory {
            seed: context.cleared_greeting.clone(),
        })
        .with_effect(Effect::PublishSnapshot)),

        // ============================================================
        // Gateway Results
        // ============================================================
        (ConvState::AwaitingResponse { generation }, Event::GatewayResponse { generation: issued, text })
            if issued == generation =>
        {
            Ok(TransitionResult::new(ConvState::Idle { generation })
                .with_effect(Effect::append_assistant(text))
                .with_effect(Effect::PublishSnapshot))
        }

        (ConvState::AwaitingResponse { generation }, Event::GatewayFailed { generation: issued, message })
            if issued == generation =>
        {
            Ok(TransitionResult::new(ConvState::Idle { generation })
                .with_effect(Effect::LogGatewayFailure { message })
                .with_effect(Effect::append_assistant(context.failure_fallback.clone()))
                .with_effect(Effect::PublishSnapshot))
        }

        // Superseded by a clear (or otherwise not outstanding)
        (
            current,
            Event::GatewayResponse { generation: issued, .. }
            | Event::GatewayFailed { generation: issued, .. },
        ) => Err(TransitionError::StaleResult {
            issued,
            current: current.generation(),
        }),
    }
}
