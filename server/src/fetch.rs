//! Outbound GET for accepted URIs.
//!
//! One attempt per request, no retry. The body of a successful response is
//! left unread so the relay can stream it.

use reqwest::{Client, Response};
use rushget_core::{classify_status, FetchOutcome, UpstreamFailure};
use tracing::{info, warn};

use crate::config::RelayConfig;

const USER_AGENT: &str = concat!("rushget/", env!("CARGO_PKG_VERSION"));

/// Shared upstream client. Redirects follow reqwest's default policy.
pub fn build_client(config: &RelayConfig) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.read_timeout() {
        builder = builder.read_timeout(timeout);
    }
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

pub async fn fetch(client: &Client, uri: String) -> FetchOutcome<Response> {
    let response = match client.get(uri.as_str()).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(uri = %uri, error = %err, "Failed to get response from uri");
            return FetchOutcome::UpstreamError(UpstreamFailure::Transport(err.to_string()));
        }
    };

    let status = response.status().as_u16();
    if let Err(failure) = classify_status(status) {
        warn!(uri = %uri, status, "Failed to get response from uri");
        return FetchOutcome::UpstreamError(failure);
    }

    info!(uri = %uri, status, "Success to get response from uri");
    FetchOutcome::Accepted { uri, response }
}
