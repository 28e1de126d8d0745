//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::gateway::GatewayError;
use crate::llm::LlmError;
use crate::message::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock completion client that returns queued replies
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    /// Record of (prior history, utterance) for every call
    pub calls: Mutex<Vec<(Vec<Message>, String)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a transport failure
    pub fn queue_failure(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(GatewayError::Service {
            attempts: 1,
            source: LlmError::network(message),
        }));
    }

    pub fn recorded_calls(&self) -> Vec<(Vec<Message>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockGateway {
    async fn respond(&self, history: &[Message], utterance: &str) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((history.to_vec(), utterance.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::Unavailable))
    }
}

// ============================================================================
// Gated Gateway
// ============================================================================

/// Completion client whose calls block until the test releases them.
/// Replies echo the utterance so late results are recognizable.
pub struct GatedGateway {
    gate: Semaphore,
}

impl Default for GatedGateway {
    fn default() -> Self {
        Self {
            gate: Semaphore::new(0),
        }
    }
}

impl GatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let one pending (or future) call complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl CompletionClient for GatedGateway {
    async fn respond(&self, _history: &[Message], utterance: &str) -> Result<String, GatewayError> {
        self.gate.acquire().await.unwrap().forget();
        Ok(format!("reply to {utterance}"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::runtime::{spawn_assistant, AssistantHandle, ConversationSnapshot, PanelManager, SubmitError};
    use crate::state_machine::state::{CLEARED_GREETING, FAILURE_FALLBACK, GREETING};
    use crate::state_machine::{ConvContext, Status};
    use std::sync::Arc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn spawn_with<C: CompletionClient + 'static>(client: &Arc<C>) -> AssistantHandle {
        spawn_assistant(ConvContext::new("test-conv"), client.clone())
    }

    async fn settle(handle: &AssistantHandle) -> Arc<ConversationSnapshot> {
        tokio::time::timeout(TIMEOUT, handle.wait_idle())
            .await
            .expect("runtime did not become idle")
            .unwrap()
    }

    fn contents(snapshot: &ConversationSnapshot) -> Vec<(Role, &str)> {
        snapshot
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn test_opens_with_greeting() {
        let handle = spawn_with(&Arc::new(MockGateway::new()));
        let snapshot = handle.snapshot();

        assert_eq!(contents(&snapshot), vec![(Role::Assistant, GREETING)]);
        assert_eq!(snapshot.status, Status::Idle);
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_reply("The timeline is...");
        let handle = spawn_with(&gateway);

        handle.submit("What is the timeline for P3394?").await.unwrap();
        let snapshot = settle(&handle).await;

        assert_eq!(
            contents(&snapshot),
            vec![
                (Role::Assistant, GREETING),
                (Role::User, "What is the timeline for P3394?"),
                (Role::Assistant, "The timeline is..."),
            ]
        );

        // Gateway sees only what came before the new utterance
        let calls = gateway.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), 1);
        assert_eq!(calls[0].0[0].content, GREETING);
        assert_eq!(calls[0].1, "What is the timeline for P3394?");
    }

    #[tokio::test]
    async fn test_gateway_failure_appends_fallback() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_failure("connection refused");
        let handle = spawn_with(&gateway);

        handle.submit("Hello").await.unwrap();
        let snapshot = settle(&handle).await;

        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(snapshot.messages[2].role, Role::Assistant);
        assert_eq!(snapshot.messages[2].content, FAILURE_FALLBACK);
        assert_eq!(snapshot.status, Status::Idle);
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_rejected() {
        let gateway = Arc::new(GatedGateway::new());
        let handle = spawn_with(&gateway);

        handle.submit("x").await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, Status::AwaitingResponse);
        assert_eq!(snapshot.messages.len(), 2);

        assert_eq!(handle.submit("y").await.unwrap_err(), SubmitError::Busy);
        assert_eq!(handle.snapshot().messages.len(), 2);

        gateway.release();
        let snapshot = settle(&handle).await;
        assert_eq!(
            contents(&snapshot)[1..],
            [(Role::User, "x"), (Role::Assistant, "reply to x")]
        );
    }

    #[tokio::test]
    async fn test_clear_discards_in_flight_reply() {
        let gateway = Arc::new(GatedGateway::new());
        let handle = spawn_with(&gateway);

        let issued = handle.submit("x").await.unwrap();
        handle.clear().await.unwrap();

        let snapshot = handle.snapshot();
        assert_eq!(contents(&snapshot), vec![(Role::Assistant, CLEARED_GREETING)]);
        assert_eq!(snapshot.status, Status::Idle);
        assert!(snapshot.generation > issued);

        // The old call completes after the clear
        gateway.release();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(contents(&handle.snapshot()), vec![(Role::Assistant, CLEARED_GREETING)]);

        // And never lands in a later exchange either
        handle.submit("next").await.unwrap();
        gateway.release();
        let snapshot = settle(&handle).await;
        assert_eq!(
            contents(&snapshot),
            vec![
                (Role::Assistant, CLEARED_GREETING),
                (Role::User, "next"),
                (Role::Assistant, "reply to next"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_submit_is_noop() {
        let handle = spawn_with(&Arc::new(MockGateway::new()));
        let before = handle.snapshot();

        for text in ["", "   ", "\n"] {
            assert_eq!(handle.submit(text).await.unwrap_err(), SubmitError::Empty);
        }
        assert_eq!(handle.snapshot(), before);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_reply("answer");
        let handle = spawn_with(&gateway);
        handle.submit("question").await.unwrap();
        settle(&handle).await;

        handle.clear().await.unwrap();
        let once = handle.snapshot();
        handle.clear().await.unwrap();
        let twice = handle.snapshot();

        assert_eq!(contents(&once), contents(&twice));
        assert_eq!(contents(&twice), vec![(Role::Assistant, CLEARED_GREETING)]);
        assert_eq!(twice.status, Status::Idle);
    }

    #[tokio::test]
    async fn test_each_exchange_adds_two_messages() {
        let gateway = Arc::new(MockGateway::new());
        let handle = spawn_with(&gateway);

        for i in 0..5 {
            if i % 2 == 0 {
                gateway.queue_reply(format!("answer {i}"));
            } else {
                gateway.queue_failure("timeout");
            }
            let before = handle.snapshot().messages.len();
            handle.submit(format!("question {i}")).await.unwrap();
            let after = settle(&handle).await;
            assert_eq!(after.messages.len(), before + 2);
        }

        // Later calls replay the whole prior history
        let calls = gateway.recorded_calls();
        assert_eq!(calls[4].0.len(), 9);
    }

    #[tokio::test]
    async fn test_message_ids_never_reused() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_reply("a");
        let handle = spawn_with(&gateway);

        handle.submit("q").await.unwrap();
        let first = settle(&handle).await;
        handle.clear().await.unwrap();
        let cleared = handle.snapshot();

        let ids: Vec<_> = first.messages.iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(cleared.messages[0].id > *ids.last().unwrap());
    }

    #[tokio::test]
    async fn test_subscriber_sees_awaiting_then_idle() {
        let gateway = Arc::new(GatedGateway::new());
        let handle = spawn_with(&gateway);
        let mut rx = handle.subscribe();

        handle.submit("x").await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.status, Status::AwaitingResponse);
        assert_eq!(seen.messages.last().unwrap().content, "x");

        gateway.release();
        tokio::time::timeout(TIMEOUT, rx.changed()).await.unwrap().unwrap();
        assert!(rx.borrow().is_idle());
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_dropped() {
        let handle = spawn_with(&Arc::new(MockGateway::new()));
        let mut rx = handle.subscribe();
        drop(handle);

        let result = tokio::time::timeout(TIMEOUT, rx.changed()).await.unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_panel_manager_lifecycle() {
        let gateway: Arc<dyn CompletionClient> = Arc::new(MockGateway::new());
        let panels = PanelManager::new(gateway);

        assert!(!panels.close().await);

        let first = panels.open().await;
        let again = panels.open().await;
        assert_eq!(first.conversation_id(), again.conversation_id());

        assert!(panels.close().await);
        assert!(!panels.close().await);

        let reopened = panels.open().await;
        assert_ne!(reopened.conversation_id(), first.conversation_id());
        assert_eq!(contents(&reopened.snapshot()), vec![(Role::Assistant, GREETING)]);
    }

    #[tokio::test]
    async fn test_handle_outlives_panel_close() {
        let gateway: Arc<dyn CompletionClient> = Arc::new(MockGateway::new());
        let panels = PanelManager::new(gateway);
        let handle = panels.open().await;
        panels.close().await;

        // The caller's handle still keeps the runtime alive
        assert_eq!(handle.submit("").await.unwrap_err(), SubmitError::Empty);
    }
}
