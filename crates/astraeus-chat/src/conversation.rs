//! Conversation state: the owned, single-writer turn list.
//!
//! Turns are stored in insertion order and never re-sorted. All mutation
//! goes through the transition methods here, which enforce the lifecycle
//! invariants: assistant text grows append-only, terminal states stick,
//! and user text is set once at creation.

use crate::{
    error::{Error, Result},
    turn::{ConversationTurn, Role, TurnId, TurnStatus},
};

/// Ordered turn list with monotonic id assignment.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    next_id: u64,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, in insertion order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Look up a turn by id
    pub fn get(&self, id: TurnId) -> Option<&ConversationTurn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// The assistant turn currently in a non-terminal state, if any.
    ///
    /// At most one exists at a time (single in-flight request policy).
    pub fn active_turn(&self) -> Option<&ConversationTurn> {
        self.turns
            .iter()
            .find(|t| t.role == Role::Assistant && !t.status.is_terminal())
    }

    /// Record a user turn; complete at creation.
    pub fn push_user(&mut self, text: &str) -> TurnId {
        let id = self.next_id();
        self.turns.push(ConversationTurn::user(id, text));
        id
    }

    /// Create a pending assistant placeholder turn.
    pub fn push_assistant(&mut self) -> TurnId {
        let id = self.next_id();
        self.turns.push(ConversationTurn::assistant(id));
        id
    }

    /// Concatenate `payload` onto the named turn's text, verbatim and in
    /// arrival order. The first append moves a pending turn to streaming.
    ///
    /// Appends to a user turn or a terminal turn are ignored: prior
    /// content is never mutated once a turn settles.
    pub fn append(&mut self, id: TurnId, payload: &str) -> Result<&ConversationTurn> {
        let turn = self.get_mut(id)?;
        if turn.role != Role::Assistant || turn.status.is_terminal() {
            tracing::debug!("ignoring append to settled turn {}", id);
            return Ok(turn);
        }
        if turn.status == TurnStatus::Pending {
            turn.status = TurnStatus::Streaming;
        }
        turn.text.push_str(payload);
        Ok(turn)
    }

    /// Transition a streaming turn to complete. Idempotent; a no-op on a
    /// turn already terminal.
    pub fn complete(&mut self, id: TurnId) -> Result<&ConversationTurn> {
        let turn = self.get_mut(id)?;
        if !turn.status.is_terminal() {
            turn.status = TurnStatus::Complete;
        }
        Ok(turn)
    }

    /// Transition a turn to failed, replacing its text wholesale with
    /// `message`. A no-op on a turn already terminal.
    pub fn fail(&mut self, id: TurnId, message: &str) -> Result<&ConversationTurn> {
        let turn = self.get_mut(id)?;
        if !turn.status.is_terminal() {
            turn.status = TurnStatus::Failed;
            turn.text = message.to_string();
        }
        Ok(turn)
    }

    fn get_mut(&mut self, id: TurnId) -> Result<&mut ConversationTurn> {
        self.turns
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::UnknownTurn(id))
    }

    fn next_id(&mut self) -> TurnId {
        let id = TurnId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::FAILURE_REPLY;

    #[test]
    fn test_ids_monotonic() {
        let mut conv = Conversation::new();
        let a = conv.push_user("one");
        let b = conv.push_assistant();
        let c = conv.push_user("two");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut conv = Conversation::new();
        conv.push_user("first");
        conv.push_assistant();
        conv.push_user("second");
        let roles: Vec<Role> = conv.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn test_append_concatenates_verbatim() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        for payload in ["Rev", "", "enue: ", "$2M"] {
            conv.append(id, payload).unwrap();
        }
        assert_eq!(conv.get(id).unwrap().text, "Revenue: $2M");
    }

    #[test]
    fn test_first_append_starts_streaming() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        assert_eq!(conv.get(id).unwrap().status, TurnStatus::Pending);
        conv.append(id, "x").unwrap();
        assert_eq!(conv.get(id).unwrap().status, TurnStatus::Streaming);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        conv.append(id, "done").unwrap();
        conv.complete(id).unwrap();
        conv.complete(id).unwrap();
        let turn = conv.get(id).unwrap();
        assert_eq!(turn.status, TurnStatus::Complete);
        assert_eq!(turn.text, "done");
    }

    #[test]
    fn test_fail_replaces_partial_text() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        conv.append(id, "Revenue is ").unwrap();
        conv.fail(id, FAILURE_REPLY).unwrap();
        let turn = conv.get(id).unwrap();
        assert_eq!(turn.status, TurnStatus::Failed);
        assert_eq!(turn.text, FAILURE_REPLY);
        assert!(!turn.text.contains("Revenue is "));
    }

    #[test]
    fn test_terminal_states_stick() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        conv.append(id, "answer").unwrap();
        conv.complete(id).unwrap();

        // A late failure or append must not disturb a settled turn.
        conv.fail(id, FAILURE_REPLY).unwrap();
        conv.append(id, " extra").unwrap();
        let turn = conv.get(id).unwrap();
        assert_eq!(turn.status, TurnStatus::Complete);
        assert_eq!(turn.text, "answer");
    }

    #[test]
    fn test_complete_after_fail_stays_failed() {
        let mut conv = Conversation::new();
        let id = conv.push_assistant();
        conv.fail(id, FAILURE_REPLY).unwrap();
        conv.complete(id).unwrap();
        assert_eq!(conv.get(id).unwrap().status, TurnStatus::Failed);
    }

    #[test]
    fn test_append_to_user_turn_ignored() {
        let mut conv = Conversation::new();
        let id = conv.push_user("as typed");
        conv.append(id, " tampered").unwrap();
        assert_eq!(conv.get(id).unwrap().text, "as typed");
    }

    #[test]
    fn test_unknown_turn_errors() {
        let mut conv = Conversation::new();
        let missing = TurnId::new(99);
        assert!(matches!(
            conv.append(missing, "x"),
            Err(Error::UnknownTurn(_))
        ));
        assert!(matches!(conv.complete(missing), Err(Error::UnknownTurn(_))));
    }

    #[test]
    fn test_active_turn_tracking() {
        let mut conv = Conversation::new();
        assert!(conv.active_turn().is_none());
        conv.push_user("q");
        assert!(conv.active_turn().is_none());
        let id = conv.push_assistant();
        assert_eq!(conv.active_turn().unwrap().id, id);
        conv.append(id, "a").unwrap();
        assert_eq!(conv.active_turn().unwrap().id, id);
        conv.complete(id).unwrap();
        assert!(conv.active_turn().is_none());
    }
}
