use std::sync::Arc;

use crate::briefing::DomainBriefing;
use crate::error::Result;
use crate::llm::CompletionModel;
use crate::relay::ConciergeRelay;
use crate::session::Session;

/// One widget session wired to the relay: submit a visitor utterance, get
/// back the committed assistant reply.
pub struct Concierge<M: CompletionModel> {
    relay: ConciergeRelay<M>,
    session: Session,
}

impl<M: CompletionModel> Concierge<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            relay: ConciergeRelay::new(model),
            session: Session::new(),
        }
    }

    pub fn with_briefing(mut self, briefing: DomainBriefing) -> Self {
        self.relay = self.relay.with_briefing(briefing);
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.session = Session::with_greeting(greeting);
        self
    }

    /// Runs one full exchange: accept the utterance, relay it with the prior
    /// transcript, commit the answer.
    ///
    /// Blank input yields `Ok(None)` without touching the transcript. The
    /// returned reply is already appended when this resolves, and the
    /// session is Idle again whether the relay succeeded or apologized.
    pub async fn submit(&mut self, text: impl Into<String>) -> Result<Option<String>> {
        let Some(pending) = self.session.begin_submission(text)? else {
            return Ok(None);
        };
        let reply = self.relay.ask(&pending.prior, &pending.utterance).await;
        self.session.complete_submission(reply.clone());
        Ok(Some(reply))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn relay(&self) -> &ConciergeRelay<M> {
        &self.relay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubCompletion;
    use crate::session::GREETING;
    use crate::turn::Speaker;

    #[tokio::test]
    async fn full_exchange_commits_both_turns() {
        let stub = StubCompletion::scripted(vec![
            "No pets are allowed, though we offer a lovely garden stroll instead.",
        ]);
        let mut concierge = Concierge::new(stub);

        let reply = concierge.submit("Are pets allowed?").await.unwrap().unwrap();
        assert_eq!(
            reply,
            "No pets are allowed, though we offer a lovely garden stroll instead."
        );

        let turns = concierge.session().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, GREETING);
        assert_eq!(turns[1].speaker, Speaker::Visitor);
        assert_eq!(turns[1].text, "Are pets allowed?");
        assert_eq!(turns[2].speaker, Speaker::Assistant);
        assert!(!concierge.session().is_busy());
    }

    #[tokio::test]
    async fn blank_submission_is_swallowed() {
        let stub = StubCompletion::scripted(vec![]);
        let mut concierge = Concierge::new(stub);

        assert!(concierge.submit("   ").await.unwrap().is_none());
        assert_eq!(concierge.session().len(), 1);
    }
}
