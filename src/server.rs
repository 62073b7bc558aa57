//! HTTP backend for the chat widget.
//!
//! The static site creates a session, posts visitor messages, and renders
//! the transcript it gets back. Session locks are held only to begin and
//! commit a submission, never across the completion-service await.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ConciergeError, Result};
use crate::llm::CompletionModel;
use crate::relay::ConciergeRelay;
use crate::session::{Session, QUICK_PROMPTS};
use crate::turn::ChatTurn;

pub struct ConciergeService<M: CompletionModel> {
    relay: ConciergeRelay<M>,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    greeting: Option<String>,
    quick_prompts: Vec<String>,
}

impl<M: CompletionModel + 'static> ConciergeService<M> {
    pub fn new(relay: ConciergeRelay<M>) -> Self {
        Self {
            relay,
            sessions: RwLock::new(HashMap::new()),
            greeting: None,
            quick_prompts: QUICK_PROMPTS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn with_quick_prompts(mut self, prompts: Vec<String>) -> Self {
        self.quick_prompts = prompts;
        self
    }

    fn new_session(&self) -> Session {
        match &self.greeting {
            Some(text) => Session::with_greeting(text.clone()),
            None => Session::new(),
        }
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/sessions", post(open_session::<M>))
            .route(
                "/sessions/:id",
                get(read_session::<M>).delete(close_session::<M>),
            )
            .route("/sessions/:id/messages", post(submit_message::<M>))
            .with_state(self)
    }

    pub async fn serve(self: Arc<Self>, addr: SocketAddr) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|err| ConciergeError::Config(format!("server error: {err}")))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SessionView {
    id: Uuid,
    transcript: Vec<ChatTurn>,
    busy: bool,
    quick_prompts: Vec<String>,
}

impl SessionView {
    fn build<M: CompletionModel>(
        service: &ConciergeService<M>,
        id: Uuid,
        session: &Session,
    ) -> Self {
        Self {
            id,
            transcript: session.turns().to_vec(),
            busy: session.is_busy(),
            quick_prompts: if session.quick_prompts_visible() {
                service.quick_prompts.clone()
            } else {
                Vec::new()
            },
        }
    }
}

async fn open_session<M: CompletionModel + 'static>(
    State(service): State<Arc<ConciergeService<M>>>,
) -> impl IntoResponse {
    let id = Uuid::new_v4();
    let session = service.new_session();
    let view = SessionView::build(&service, id, &session);
    service
        .sessions
        .write()
        .await
        .insert(id, Arc::new(Mutex::new(session)));
    (StatusCode::CREATED, Json(view))
}

async fn read_session<M: CompletionModel + 'static>(
    State(service): State<Arc<ConciergeService<M>>>,
    Path(id): Path<Uuid>,
) -> Response {
    let handle = { service.sessions.read().await.get(&id).cloned() };
    match handle {
        Some(handle) => {
            let session = handle.lock().await;
            Json(SessionView::build(&service, id, &session)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn close_session<M: CompletionModel + 'static>(
    State(service): State<Arc<ConciergeService<M>>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    match service.sessions.write().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

#[derive(Deserialize)]
struct SubmitRequest {
    text: String,
}

#[derive(Serialize)]
struct SubmitResponse {
    reply: String,
    transcript: Vec<ChatTurn>,
}

async fn submit_message<M: CompletionModel + 'static>(
    State(service): State<Arc<ConciergeService<M>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    let Some(handle) = ({ service.sessions.read().await.get(&id).cloned() }) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let pending = {
        let mut session = handle.lock().await;
        match session.begin_submission(req.text) {
            Ok(Some(pending)) => pending,
            Ok(None) => return StatusCode::NO_CONTENT.into_response(),
            Err(ConciergeError::SessionBusy) => {
                return (
                    StatusCode::CONFLICT,
                    Json(serde_json::json!({"error": "a reply is still on its way"})),
                )
                    .into_response()
            }
            Err(err) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    };

    let reply = service.relay.ask(&pending.prior, &pending.utterance).await;

    // The session may have been closed while the relay call was outstanding;
    // in that case the result is discarded rather than committed.
    if !service.sessions.read().await.contains_key(&id) {
        debug!(session = %id, "session closed mid-flight, discarding reply");
        return StatusCode::NOT_FOUND.into_response();
    }

    let mut session = handle.lock().await;
    session.complete_submission(reply.clone());
    Json(SubmitResponse {
        reply,
        transcript: session.turns().to_vec(),
    })
    .into_response()
}
