//! The relay normalizes every completion-service outcome to a displayable
//! string so callers never observe a raised fault.

use std::sync::Arc;

use tracing::warn;

use crate::briefing::DomainBriefing;
use crate::llm::CompletionModel;
use crate::turn::ChatTurn;

/// Substituted when the service answers but carries no usable text.
pub const MEDITATING_APOLOGY: &str =
    "I apologize, I am currently meditating. Please try again in a moment.";

/// Substituted for transport, credential, and every other fault.
pub const CONNECTION_APOLOGY: &str =
    "I am having trouble connecting to the sanctuary network. Please contact our front desk directly.";

/// Stateless bridge between a session and the external completion service.
/// The briefing is attached to every request unchanged.
pub struct ConciergeRelay<M: CompletionModel> {
    model: Arc<M>,
    briefing: DomainBriefing,
}

impl<M: CompletionModel> ConciergeRelay<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            briefing: DomainBriefing::default(),
        }
    }

    pub fn with_briefing(mut self, briefing: DomainBriefing) -> Self {
        self.briefing = briefing;
        self
    }

    pub fn briefing(&self) -> &DomainBriefing {
        &self.briefing
    }

    /// Issues one completion call and collapses the outcome to a string.
    ///
    /// Faults are logged here and discarded; the visitor only ever sees the
    /// reply text or one of the two fixed apologies.
    pub async fn ask(&self, prior: &[ChatTurn], utterance: &str) -> String {
        match self
            .model
            .complete(self.briefing.instruction(), prior, utterance)
            .await
        {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => MEDITATING_APOLOGY.to_string(),
            Err(err) => {
                warn!(error = %err, "completion request failed");
                CONNECTION_APOLOGY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{StubCompletion, StubReply};

    #[tokio::test]
    async fn returns_the_service_reply_verbatim() {
        let stub = StubCompletion::scripted(vec!["The 1BHK sleeps four."]);
        let relay = ConciergeRelay::new(stub);

        let reply = relay.ask(&[], "What is the price for 1BHK?").await;
        assert_eq!(reply, "The 1BHK sleeps four.");
    }

    #[tokio::test]
    async fn faults_collapse_to_the_connection_apology() {
        let stub = StubCompletion::new(vec![StubReply::Fail("connection reset".into())]);
        let relay = ConciergeRelay::new(stub);

        let reply = relay.ask(&[], "Is food available?").await;
        assert_eq!(reply, CONNECTION_APOLOGY);
    }

    #[tokio::test]
    async fn empty_replies_collapse_to_the_meditating_apology() {
        let stub = StubCompletion::new(vec![StubReply::Empty, StubReply::Text("   ".into())]);
        let relay = ConciergeRelay::new(stub);

        assert_eq!(relay.ask(&[], "hello").await, MEDITATING_APOLOGY);
        // Whitespace-only text is treated the same as no text.
        assert_eq!(relay.ask(&[], "hello").await, MEDITATING_APOLOGY);
    }

    #[tokio::test]
    async fn briefing_is_identical_across_calls() {
        let stub = StubCompletion::scripted(vec!["one", "two", "three"]);
        let relay = ConciergeRelay::new(Arc::clone(&stub));

        relay.ask(&[], "first").await;
        relay.ask(&[], "second").await;
        relay.ask(&[], "third").await;

        let seen = stub.seen_instructions();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[1], seen[2]);
        assert_eq!(seen[0], relay.briefing().instruction());
    }
}
