//! The per-request pipeline: validate, fetch, then stream or fail.
//!
//! Exactly one response leaves `relay_handler` per request. Once the 200
//! headers are sent, an upstream error can no longer become a clean error
//! response; the body stream yields the error and hyper aborts the
//! connection, leaving the client with a truncated transfer.

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use rushget_core::{ClientError, FetchOutcome, RelayHeaders, ValidationResult};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::fetch::fetch;
use crate::RelayState;

#[derive(Debug, Deserialize)]
pub struct RelayParams {
    pub uri: Option<String>,
}

/// GET and POST handler; the request body is ignored.
pub async fn relay_handler(
    State(state): State<RelayState>,
    query: Result<Query<RelayParams>, QueryRejection>,
) -> Response {
    let uri = match query {
        Ok(Query(params)) => params.uri,
        Err(rejection) => {
            info!(error = %rejection, "query string could not be decoded");
            None
        }
    };

    let outcome = match state.allowlist.validate(uri.as_deref()) {
        ValidationResult::Accepted(uri) => {
            info!(uri = %uri, "uri accepted");
            fetch(&state.client, uri).await
        }
        ValidationResult::Missing => FetchOutcome::Rejected(ClientError::MissingInput),
        ValidationResult::Rejected => FetchOutcome::Rejected(ClientError::ValidationRejected),
    };

    respond(outcome)
}

fn respond(outcome: FetchOutcome<reqwest::Response>) -> Response {
    match outcome.into_result() {
        Ok((uri, response)) => relay(&uri, response),
        Err(err) => error_response(err),
    }
}

/// Stream a successful upstream response to the client under relay headers.
pub fn relay(uri: &str, upstream: reqwest::Response) -> Response {
    let headers = RelayHeaders::for_uri(uri);
    let content_length = upstream.content_length();

    let source = uri.to_owned();
    let body = upstream.bytes_stream().inspect_err(move |err| {
        warn!(uri = %source, error = %err, "upstream stream failed mid-transfer");
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, headers.content_type)
        .header(header::CONTENT_DISPOSITION, headers.content_disposition);
    if let Some(len) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder.body(Body::from_stream(body)).unwrap_or_else(|err| {
        error!(uri = %uri, error = %err, "failed to build relay response");
        error_response(ClientError::UpstreamFailure)
    })
}

pub fn error_response(err: ClientError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.body()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_input_is_404_plain_text() {
        let resp = error_response(ClientError::MissingInput);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body_text(resp).await, "Please pass a name on the query string");
    }

    #[tokio::test]
    async fn rejection_is_400() {
        let resp = error_response(ClientError::ValidationRejected);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "uri not matched any rule");
    }

    #[tokio::test]
    async fn upstream_failure_is_500() {
        let resp = respond(FetchOutcome::UpstreamError(rushget_core::UpstreamFailure::Status(502)));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(resp).await, "Failed to get response from uri");
    }

    #[test]
    fn query_params_treat_uri_as_optional() {
        let params: RelayParams = parse_query("");
        assert!(params.uri.is_none());
        let params: RelayParams = parse_query("uri=https%3A%2F%2Fgithub.com%2Fa&other=1");
        assert_eq!(params.uri.as_deref(), Some("https://github.com/a"));
    }

    fn parse_query(query: &str) -> RelayParams {
        let uri: axum::http::Uri = format!("/api/TurboHub?{query}").parse().unwrap();
        Query::<RelayParams>::try_from_uri(&uri).unwrap().0
    }
}
