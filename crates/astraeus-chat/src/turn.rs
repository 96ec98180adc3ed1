//! Conversation turn records

use serde::{Deserialize, Serialize};

/// Fixed user-facing reply shown when a stream fails. Replaces any
/// partially accumulated text wholesale.
pub const FAILURE_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Unique turn identifier, monotonically assigned per conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TurnId(u64);

impl TurnId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle state of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Assistant turn created, no payload received yet
    Pending,
    /// Actively receiving payloads from an open response
    Streaming,
    /// Stream ended normally
    Complete,
    /// Transport failed; text holds [`FAILURE_REPLY`]
    Failed,
}

impl TurnStatus {
    /// Check if this is a terminal state (no transitions out)
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnStatus::Complete | TurnStatus::Failed)
    }
}

/// One user message or one assistant response within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Unique, immutable id
    pub id: TurnId,
    /// Author
    pub role: Role,
    /// Accumulated raw content
    pub text: String,
    /// Lifecycle state
    pub status: TurnStatus,
    /// Capture time in epoch milliseconds, immutable
    pub created_at: i64,
}

impl ConversationTurn {
    /// A user turn is complete at creation; it has no streaming phase.
    pub(crate) fn user(id: TurnId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            status: TurnStatus::Complete,
            created_at: now_millis(),
        }
    }

    /// An assistant turn starts as an empty pending placeholder.
    pub(crate) fn assistant(id: TurnId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: String::new(),
            status: TurnStatus::Pending,
            created_at: now_millis(),
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TurnStatus::Pending.is_terminal());
        assert!(!TurnStatus::Streaming.is_terminal());
        assert!(TurnStatus::Complete.is_terminal());
        assert!(TurnStatus::Failed.is_terminal());
    }

    #[test]
    fn test_user_turn_complete_at_creation() {
        let turn = ConversationTurn::user(TurnId::new(0), "Show revenue");
        assert_eq!(turn.status, TurnStatus::Complete);
        assert_eq!(turn.text, "Show revenue");
    }

    #[test]
    fn test_assistant_turn_starts_pending_and_empty() {
        let turn = ConversationTurn::assistant(TurnId::new(1));
        assert_eq!(turn.status, TurnStatus::Pending);
        assert!(turn.text.is_empty());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TurnStatus::Streaming).unwrap();
        assert_eq!(json, "\"streaming\"");
    }
}
