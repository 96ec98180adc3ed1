//! Turn lifecycle orchestration
//!
//! [`ChatManager`] is the single writer of the conversation. One
//! submission runs at a time: it records the user turn, creates the
//! paired assistant placeholder, issues the backend request, and applies
//! decoded payloads in arrival order, emitting an event after every
//! mutation so the display layer never renders stale state.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use astraeus_stream::{Backend, PayloadStream};

use crate::{
    conversation::Conversation,
    error::{Error, Result},
    events::{TurnEvent, TurnView},
    turn::{ConversationTurn, FAILURE_REPLY, TurnId, TurnStatus},
};

/// Orchestrates conversation turns over a [`Backend`].
pub struct ChatManager {
    conversation: Conversation,
    backend: Arc<dyn Backend>,
    event_tx: broadcast::Sender<TurnEvent>,
}

impl ChatManager {
    /// Create a manager over the given backend
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Conversation::new(),
            backend,
            event_tx,
        }
    }

    /// Subscribe to turn events
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.event_tx.subscribe()
    }

    /// The conversation state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// All turns, in insertion order
    pub fn turns(&self) -> &[ConversationTurn] {
        self.conversation.turns()
    }

    /// Display snapshots of all turns, markup freshly recomputed
    pub fn views(&self) -> Vec<TurnView> {
        self.conversation.turns().iter().map(TurnView::of).collect()
    }

    /// Whether an assistant turn is currently in flight
    pub fn is_streaming(&self) -> bool {
        self.conversation.active_turn().is_some()
    }

    /// Submit a query and drive the paired assistant turn to a terminal
    /// state before returning.
    pub async fn submit(&mut self, query: &str) -> Result<TurnId> {
        self.submit_with_cancel(query, CancellationToken::new())
            .await
    }

    /// Like [`submit`](Self::submit), with cooperative cancellation: if
    /// `cancel` fires mid-stream the turn is driven to failed, never
    /// left streaming.
    ///
    /// Returns `Err` only for rejected submissions (empty input, or a
    /// response already in flight) — in those cases no turn is created
    /// and no request is made. Transport failures resolve the turn to
    /// failed with the fixed reply and still return `Ok`.
    pub async fn submit_with_cancel(
        &mut self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<TurnId> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        if self.conversation.active_turn().is_some() {
            return Err(Error::Busy);
        }

        let user_id = self.conversation.push_user(query);
        let assistant_id = self.conversation.push_assistant();
        self.send_event(TurnEvent::Submitted {
            user: self.view_of(user_id)?,
            assistant: self.view_of(assistant_id)?,
        });

        match self.backend.stream_query(query).await {
            Ok(stream) => self.drive_stream(assistant_id, stream, cancel).await?,
            Err(e) => {
                tracing::warn!("query request failed: {}", e);
                self.fail_turn(assistant_id)?;
            }
        }

        Ok(assistant_id)
    }

    /// Apply payloads to the turn in arrival order until the stream
    /// ends, errors, or is cancelled.
    async fn drive_stream(
        &mut self,
        id: TurnId,
        mut stream: PayloadStream,
        cancel: CancellationToken,
    ) -> Result<()> {
        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!("stream cancelled for turn {}", id);
                    return self.fail_turn(id);
                }
                item = stream.next() => item,
            };

            match item {
                Some(Ok(payload)) => {
                    let was_pending = self
                        .conversation
                        .get(id)
                        .is_some_and(|t| t.status == TurnStatus::Pending);

                    let turn = self.conversation.append(id, &payload)?;
                    let view = TurnView::of(turn);

                    if was_pending {
                        self.send_event(TurnEvent::StreamStart {
                            turn: view.clone(),
                        });
                    }
                    // Emitted before the next payload is polled; updates
                    // are never batched across the stream.
                    self.send_event(TurnEvent::StreamUpdate {
                        turn: view,
                        delta: payload,
                    });
                }
                Some(Err(e)) => {
                    tracing::warn!("stream read failed: {}", e);
                    return self.fail_turn(id);
                }
                None => {
                    let turn = self.conversation.complete(id)?;
                    let view = TurnView::of(turn);
                    self.send_event(TurnEvent::StreamEnd { turn: view });
                    return Ok(());
                }
            }
        }
    }

    /// Fail the turn, replacing any partial text with the fixed reply.
    fn fail_turn(&mut self, id: TurnId) -> Result<()> {
        let turn = self.conversation.fail(id, FAILURE_REPLY)?;
        let view = TurnView::of(turn);
        self.send_event(TurnEvent::StreamFailed { turn: view });
        Ok(())
    }

    fn view_of(&self, id: TurnId) -> Result<TurnView> {
        self.conversation
            .get(id)
            .map(TurnView::of)
            .ok_or(Error::UnknownTurn(id))
    }

    fn send_event(&self, event: TurnEvent) {
        // No subscribers is fine; state remains queryable via views().
        let _ = self.event_tx.send(event);
    }
}
