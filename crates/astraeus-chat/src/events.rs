//! Turn lifecycle events for the display layer

use serde::{Deserialize, Serialize};

use crate::turn::{ConversationTurn, Role, TurnId, TurnStatus};

/// Display-boundary snapshot of a turn.
///
/// `rendered_markup` is recomputed from the entire current text on every
/// emission — never cached or patched incrementally — so each view
/// reflects a strictly increasing prefix of the final answer. Consumers
/// may inject it as markup directly; it is pre-sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnView {
    pub id: TurnId,
    pub role: Role,
    pub text: String,
    /// Safe display markup; assistant turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_markup: Option<String>,
    pub status: TurnStatus,
    pub created_at: i64,
}

impl TurnView {
    /// Project a turn into its display snapshot.
    pub fn of(turn: &ConversationTurn) -> Self {
        let rendered_markup = match turn.role {
            Role::Assistant => Some(astraeus_render::render_markdown(&turn.text)),
            Role::User => None,
        };
        Self {
            id: turn.id,
            role: turn.role,
            text: turn.text.clone(),
            rendered_markup,
            status: turn.status,
            created_at: turn.created_at,
        }
    }
}

/// Events emitted during a turn's lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A user turn was recorded and a paired assistant turn created
    Submitted { user: TurnView, assistant: TurnView },

    /// First payload arrived; the assistant turn is now streaming
    StreamStart { turn: TurnView },

    /// The assistant text grew by `delta`
    StreamUpdate { turn: TurnView, delta: String },

    /// The stream ended normally
    StreamEnd { turn: TurnView },

    /// The transport failed; the turn text was replaced wholesale
    StreamFailed { turn: TurnView },
}

impl TurnEvent {
    /// Check if this is a terminal event for the in-flight turn
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnEvent::StreamEnd { .. } | TurnEvent::StreamFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_view_carries_markup() {
        let mut turn = ConversationTurn::assistant(TurnId::new(1));
        turn.text = "Revenue: $2M".to_string();
        let view = TurnView::of(&turn);
        let markup = view.rendered_markup.unwrap();
        assert!(markup.contains("<p>Revenue: $2M</p>"));
    }

    #[test]
    fn test_user_view_has_no_markup() {
        let turn = ConversationTurn::user(TurnId::new(0), "Show revenue");
        let view = TurnView::of(&turn);
        assert!(view.rendered_markup.is_none());
    }

    #[test]
    fn test_terminal_events() {
        let turn = ConversationTurn::user(TurnId::new(0), "q");
        let view = TurnView::of(&turn);
        assert!(TurnEvent::StreamEnd { turn: view.clone() }.is_terminal());
        assert!(TurnEvent::StreamFailed { turn: view.clone() }.is_terminal());
        assert!(
            !TurnEvent::StreamUpdate {
                turn: view,
                delta: String::new()
            }
            .is_terminal()
        );
    }
}
