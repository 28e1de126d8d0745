//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::gateway::{CompletionGateway, GatewayError};
use crate::message::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of assistant replies
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Answer `utterance` given the prior `history`
    async fn respond(&self, history: &[Message], utterance: &str) -> Result<String, GatewayError>;
}

#[async_trait]
impl CompletionClient for CompletionGateway {
    async fn respond(&self, history: &[Message], utterance: &str) -> Result<String, GatewayError> {
        CompletionGateway::respond(self, history, utterance).await
    }
}

// ============================================================================
// Arc implementation for trait objects
// ============================================================================

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn respond(&self, history: &[Message], utterance: &str) -> Result<String, GatewayError> {
        (**self).respond(history, utterance).await
    }
}
