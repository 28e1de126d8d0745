//! Conversation runtime executor

use super::traits::CompletionClient;
use super::{Command, ConversationSnapshot, SubmitError};

use crate::message::{Message, MessageId, Role};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Single writer for one conversation. Owns the history and the state;
/// everything else observes it through the snapshot channel.
pub struct ConversationRuntime<C>
where
    C: CompletionClient + ?Sized + 'static,
{
    context: ConvContext,
    state: ConvState,
    history: Vec<Message>,
    next_message_id: MessageId,
    client: Arc<C>,
    command_rx: mpsc::Receiver<Command>,
    /// Gateway results come back through here
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    snapshot_tx: watch::Sender<Arc<ConversationSnapshot>>,
}

impl<C> ConversationRuntime<C>
where
    C: CompletionClient + ?Sized + 'static,
{
    /// A fresh conversation holding only the greeting seed
    pub fn new(context: ConvContext, client: Arc<C>, command_rx: mpsc::Receiver<Command>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        let seed = Message::new(MessageId::FIRST, Role::Assistant, context.greeting.clone());
        let state = ConvState::default();
        let (snapshot_tx, _) = watch::channel(Arc::new(ConversationSnapshot {
            messages: vec![seed.clone()],
            status: state.status(),
            generation: state.generation(),
        }));
        Self {
            context,
            state,
            history: vec![seed],
            next_message_id: MessageId::FIRST.next(),
            client,
            command_rx,
            event_rx,
            event_tx,
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ConversationSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Snapshot of the current history and status
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.history.clone(),
            status: self.state.status(),
            generation: self.state.generation(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(conv_id = %self.context.conversation_id, "Starting conversation runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // Every handle dropped
                    None => break,
                },
                Some(event) = self.event_rx.recv() => self.handle_gateway_event(event),
            }
        }

        tracing::info!(conv_id = %self.context.conversation_id, "Conversation runtime stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { text, reply } => {
                let result = self
                    .process_event(Event::UserMessage { text })
                    .map(|()| self.state.generation())
                    .map_err(SubmitError::from);
                if let Err(e) = &result {
                    tracing::debug!(conv_id = %self.context.conversation_id, error = %e, "Submission rejected");
                }
                let _ = reply.send(result);
            }
            Command::Clear { reply } => {
                if let Err(e) = self.process_event(Event::Clear) {
                    // Clear is accepted from every state
                    tracing::error!(conv_id = %self.context.conversation_id, error = %e, "Clear rejected");
                }
                let _ = reply.send(());
            }
        }
    }

    fn handle_gateway_event(&mut self, event: Event) {
        match self.process_event(event) {
            Ok(()) => {}
            Err(TransitionError::StaleResult { issued, current }) => {
                tracing::debug!(
                    conv_id = %self.context.conversation_id,
                    %issued,
                    %current,
                    "Discarding gateway result from a cleared conversation"
                );
            }
            Err(e) => {
                tracing::warn!(conv_id = %self.context.conversation_id, error = %e, "Unexpected gateway event");
            }
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { role, content } => {
                let id = self.allocate_message_id();
                self.history.push(Message::new(id, role, content));
            }

            Effect::ResetHistory { seed } => {
                let id = self.allocate_message_id();
                self.history = vec![Message::new(id, Role::Assistant, seed)];
            }

            Effect::RequestCompletion {
                generation,
                utterance,
            } => {
                // The utterance was just appended; the gateway only sees what came before it
                let prior = self
                    .history
                    .split_last()
                    .map(|(_, rest)| rest.to_vec())
                    .unwrap_or_default();
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();
                let conv_id = self.context.conversation_id.clone();

                tokio::spawn(async move {
                    tracing::info!(conv_id = %conv_id, %generation, history_len = prior.len(), "Requesting completion");
                    let event = match client.respond(&prior, &utterance).await {
                        Ok(text) => Event::GatewayResponse { generation, text },
                        Err(e) => Event::GatewayFailed {
                            generation,
                            message: e.to_string(),
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            Effect::LogGatewayFailure { message } => {
                tracing::error!(conv_id = %self.context.conversation_id, error = %message, "Completion gateway failed");
            }

            Effect::PublishSnapshot => self.publish(),
        }
    }

    fn allocate_message_id(&mut self) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id = id.next();
        id
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Arc::new(self.snapshot()));
    }
}
