//! HTTP surface of the RushGet relay.
//!
//! # Overview
//! A single endpoint (`/api/TurboHub` by default) takes a `uri` query
//! parameter, checks it against the allowlist from `rushget-core`, fetches
//! it with reqwest and streams the body back as an attachment.
//!
//! # Design
//! - `RelayState` is the only shared state: an immutable `Arc<Allowlist>`
//!   and a pooled `reqwest::Client`. Nothing is mutated across requests.
//! - hyper runs each connection on its own task; a client that disconnects
//!   drops the response body, which drops the upstream response with it.

pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod relay;

use std::{future::Future, sync::Arc};

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use rushget_core::Allowlist;
use tokio::net::TcpListener;

pub use config::{ConfigError, RelayConfig, DEFAULT_ROUTE, HEALTH_ROUTE};

#[derive(Clone)]
pub struct RelayState {
    pub allowlist: Arc<Allowlist>,
    pub client: reqwest::Client,
}

impl RelayState {
    pub fn new(allowlist: Allowlist, client: reqwest::Client) -> Self {
        Self {
            allowlist: Arc::new(allowlist),
            client,
        }
    }

    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let allowlist = config.validate()?;
        let client = fetch::build_client(config)?;
        Ok(Self::new(allowlist, client))
    }
}

/// Build the router. `route` must start with `/`; `RelayConfig::validate`
/// checks that before startup.
pub fn app(state: RelayState, route: &str) -> Router {
    Router::new()
        .route(
            route,
            get(relay::relay_handler)
                .post(relay::relay_handler)
                .head(head_not_allowed),
        )
        .route(HEALTH_ROUTE, get(healthz))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: RelayState, route: &str) -> Result<(), std::io::Error> {
    run_until(listener, state, route, std::future::pending()).await
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn run_until<F>(
    listener: TcpListener,
    state: RelayState,
    route: &str,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state, route))
        .with_graceful_shutdown(shutdown)
        .await
}

/// axum answers HEAD with the GET handler unless told otherwise, which
/// would fetch the artifact only to discard it.
async fn head_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET,POST")])
}

async fn healthz() -> &'static str {
    "ok"
}
