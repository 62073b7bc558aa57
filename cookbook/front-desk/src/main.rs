//! Runs the concierge backend for the retreat's static site.
//!
//! Configuration comes from `concierge.toml` in the working directory plus
//! `RETREAT_*` environment overrides; `RETREAT_API_KEY` must be set one way
//! or the other.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use sr_concierge::{AppConfig, ConciergeRelay, ConciergeService, GeminiClient};

#[tokio::main]
async fn main() -> sr_concierge::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = AppConfig::from_env_or_file("concierge.toml")?;
    let model = Arc::new(GeminiClient::from_config(&cfg.service)?);

    let mut service = ConciergeService::new(ConciergeRelay::new(model));
    if let Some(greeting) = cfg.widget.greeting.clone() {
        service = service.with_greeting(greeting);
    }
    if let Some(prompts) = cfg.widget.quick_prompts.clone() {
        service = service.with_quick_prompts(prompts);
    }

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|err| {
            sr_concierge::ConciergeError::Config(format!("invalid listen address: {err}"))
        })?;
    info!(%addr, model = %cfg.service.model, "front desk is open");
    Arc::new(service).serve(addr).await
}
