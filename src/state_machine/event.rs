//! Events that can occur in a conversation

use super::state::Generation;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },
    Clear,

    // Gateway events, tagged with the generation the request was issued in
    GatewayResponse {
        generation: Generation,
        text: String,
    },
    GatewayFailed {
        generation: Generation,
        message: String,
    },
}
