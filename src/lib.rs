//! Conversational concierge runtime for the SR Retreat booking site.
//!
//! The crate provides the chat widget's backend slice:
//! - An append-only session transcript with an Idle/Sending state machine (`Session`).
//! - A completion-provider abstraction (`CompletionModel`) with a Gemini client.
//! - A relay (`ConciergeRelay`) that attaches the fixed property briefing and
//!   normalizes every outcome to a displayable string.
//! - An optional axum backend (`ConciergeService`) the static site talks to.

mod briefing;
mod concierge;
mod config;
mod error;
mod llm;
mod relay;
#[cfg(feature = "server")]
mod server;
mod session;
mod turn;

pub use briefing::DomainBriefing;
pub use concierge::Concierge;
pub use config::{AppConfig, ServerConfig, ServiceConfig, WidgetConfig};
pub use error::{ConciergeError, Result};
pub use llm::{CompletionModel, GeminiClient, StubCompletion, StubReply};
pub use relay::{ConciergeRelay, CONNECTION_APOLOGY, MEDITATING_APOLOGY};
#[cfg(feature = "server")]
pub use server::ConciergeService;
pub use session::{PendingExchange, Session, GREETING, QUICK_PROMPTS};
pub use turn::{ChatTurn, Speaker};
