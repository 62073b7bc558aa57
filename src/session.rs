use crate::error::{ConciergeError, Result};
use crate::turn::ChatTurn;

/// Welcome turn seeded into every new session.
pub const GREETING: &str = "Namaste. I am the Virtual Concierge for SR Retreat. How may I assist you in planning your sanctuary?";

/// Pre-written questions offered while the conversation is still fresh.
pub const QUICK_PROMPTS: [&str; 4] = [
    "What is the price for 1BHK?",
    "Is food available?",
    "How far is the Golden Temple?",
    "Are pets allowed?",
];

/// Quick prompts disappear once this many turns exist.
const QUICK_PROMPT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Sending,
}

/// A submission the store has accepted but the relay has not yet answered.
///
/// `prior` is the transcript as it stood before the visitor turn was
/// appended; the relay receives it alongside `utterance` so the in-flight
/// text is never sent twice.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub prior: Vec<ChatTurn>,
    pub utterance: String,
}

/// Append-only transcript for one widget session, with an explicit
/// Idle/Sending state machine guarding overlapping submissions.
#[derive(Debug, Clone)]
pub struct Session {
    turns: Vec<ChatTurn>,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session containing only the assistant greeting.
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::assistant(greeting)],
            state: SessionState::Idle,
        }
    }

    /// Accepts a visitor utterance and enters Sending.
    ///
    /// Blank input (after trimming) is absorbed as a no-op and yields
    /// `Ok(None)`. A submission while another relay call is outstanding is
    /// rejected with [`ConciergeError::SessionBusy`] and leaves the
    /// transcript untouched.
    pub fn begin_submission(&mut self, text: impl Into<String>) -> Result<Option<PendingExchange>> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if self.state == SessionState::Sending {
            return Err(ConciergeError::SessionBusy);
        }

        let prior = self.turns.clone();
        self.turns.push(ChatTurn::visitor(trimmed));
        self.state = SessionState::Sending;
        Ok(Some(PendingExchange {
            prior,
            utterance: trimmed.to_string(),
        }))
    }

    /// Commits the relay's answer (genuine reply or fallback apology) and
    /// returns to Idle.
    pub fn complete_submission(&mut self, reply: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(reply));
        self.state = SessionState::Idle;
    }

    /// Discards an in-flight exchange without appending anything. Used when
    /// the session ends while a relay call is still outstanding.
    pub fn cancel_submission(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Appends an assistant turn outside the submit path. Never fails.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(text));
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Sending
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Presentation rule carried over from the widget: quick prompts are
    /// offered only before the conversation has grown past the opening
    /// exchange, and never while a relay call is outstanding.
    pub fn quick_prompts_visible(&self) -> bool {
        self.turns.len() < QUICK_PROMPT_LIMIT && !self.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Speaker;

    #[test]
    fn new_session_holds_only_the_greeting() {
        let session = Session::new();
        assert_eq!(session.len(), 1);
        assert_eq!(session.turns()[0].speaker, Speaker::Assistant);
        assert_eq!(session.turns()[0].text, GREETING);
        assert!(!session.is_busy());
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let mut session = Session::new();
        assert!(session.begin_submission("").unwrap().is_none());
        assert!(session.begin_submission("   ").unwrap().is_none());
        assert_eq!(session.len(), 1);
        assert!(!session.is_busy());
    }

    #[test]
    fn accepted_turns_appear_in_call_order() {
        let mut session = Session::new();
        let pending = session.begin_submission("Are pets allowed?").unwrap().unwrap();
        assert_eq!(pending.utterance, "Are pets allowed?");
        session.complete_submission("No pets are allowed.");

        session.push_assistant("Anything else?");

        assert_eq!(session.len(), 4);
        let speakers: Vec<Speaker> = session.turns().iter().map(|t| t.speaker).collect();
        assert_eq!(
            speakers,
            vec![
                Speaker::Assistant,
                Speaker::Visitor,
                Speaker::Assistant,
                Speaker::Assistant
            ]
        );
    }

    #[test]
    fn prior_snapshot_excludes_the_new_utterance() {
        let mut session = Session::new();
        let pending = session.begin_submission("hello").unwrap().unwrap();
        assert_eq!(pending.prior.len(), 1);
        assert!(pending.prior.iter().all(|t| t.text != "hello"));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn second_submission_while_sending_is_rejected() {
        let mut session = Session::new();
        session.begin_submission("first").unwrap().unwrap();
        assert!(session.is_busy());

        let err = session.begin_submission("second").unwrap_err();
        assert!(matches!(err, ConciergeError::SessionBusy));
        assert_eq!(session.len(), 2);

        session.complete_submission("answer");
        assert!(!session.is_busy());
        assert!(session.begin_submission("second").unwrap().is_some());
    }

    #[test]
    fn cancel_returns_to_idle_without_appending() {
        let mut session = Session::new();
        session.begin_submission("hello").unwrap().unwrap();
        session.cancel_submission();
        assert!(!session.is_busy());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn quick_prompts_hide_once_the_conversation_grows() {
        let mut session = Session::new();
        assert!(session.quick_prompts_visible());

        session.begin_submission(QUICK_PROMPTS[0]).unwrap().unwrap();
        assert!(!session.quick_prompts_visible());
        session.complete_submission("Seasonal pricing, please call us.");

        // Three or more turns: hidden from here on.
        assert!(!session.quick_prompts_visible());
        session.push_assistant("Anything else?");
        assert!(!session.quick_prompts_visible());
    }
}
