//! Scripted artifact host standing in for GitHub in relay tests.
//!
//! Serves branch archives and release assets under GitHub-shaped paths,
//! plus fixture routes that misbehave on purpose: arbitrary status codes,
//! large chunked bodies, bodies that stall, never end, or break halfway.
//! Every request (matched or not) bumps a hit counter so tests can prove
//! that a rejected URI never reached the upstream.

use std::{
    convert::Infallible,
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use futures::stream;
use tokio::{net::TcpListener, sync::Notify};

/// Leading bytes of every archive body (zip local file header magic).
pub const ARCHIVE_MAGIC: &[u8] = b"PK\x03\x04";
pub const CHUNK_SIZE: usize = 64 * 1024;
pub const LARGE_FILL: u8 = b'x';
pub const STALLED_HEAD: &[u8] = b"first-chunk;";
pub const STALLED_TAIL: &[u8] = b"rest";
pub const BROKEN_HEAD: &[u8] = b"partial-";

#[derive(Debug, Default)]
pub struct Upstream {
    hits: AtomicUsize,
    release: Notify,
    endless_dropped: AtomicBool,
}

pub type Shared = Arc<Upstream>;

impl Upstream {
    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Let a `/stalled/...` body continue past its first chunk.
    pub fn release_stalled(&self) {
        self.release.notify_one();
    }

    /// Whether an `/endless/...` body has been dropped by the server, which
    /// happens once the downstream connection goes away.
    pub fn endless_dropped(&self) -> bool {
        self.endless_dropped.load(Ordering::SeqCst)
    }
}

/// Expected archive body for a branch file name such as `main.zip`.
pub fn archive_body(branch: &str) -> Vec<u8> {
    let mut body = ARCHIVE_MAGIC.to_vec();
    body.extend_from_slice(branch.as_bytes());
    body
}

/// Expected release asset body.
pub fn release_body(tag: &str, file: &str) -> String {
    format!("asset {tag}/{file}")
}

pub fn app(upstream: Shared) -> Router {
    Router::new()
        .route("/{org}/{project}/archive/refs/heads/{branch}", get(archive))
        .route("/{org}/{project}/releases/download/{tag}/{file}", get(release_asset))
        .route("/status/{code}/{file}", get(status))
        .route("/large/{size}/{file}", get(large))
        .route("/stalled/{file}", get(stalled))
        .route("/endless/{file}", get(endless))
        .route("/broken/{file}", get(broken))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(upstream.clone(), count_hits))
        .with_state(upstream)
}

pub async fn run(listener: TcpListener, upstream: Shared) -> Result<(), std::io::Error> {
    axum::serve(listener, app(upstream)).await
}

async fn count_hits(State(upstream): State<Shared>, request: Request, next: Next) -> Response {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn archive(Path((_org, _project, branch)): Path<(String, String, String)>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/zip")], archive_body(&branch))
}

async fn release_asset(
    Path((_org, _project, tag, file)): Path<(String, String, String, String)>,
) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], release_body(&tag, &file))
}

async fn status(Path((code, _file)): Path<(u16, String)>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("scripted status {code}")).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn large(Path((size, _file)): Path<(usize, String)>) -> Body {
    let chunks = (0..size).step_by(CHUNK_SIZE).map(move |offset| {
        let len = CHUNK_SIZE.min(size - offset);
        Ok::<_, Infallible>(Bytes::from(vec![LARGE_FILL; len]))
    });
    Body::from_stream(stream::iter(chunks))
}

async fn stalled(State(upstream): State<Shared>) -> Body {
    let chunks = stream::unfold((upstream, 0u8), |(upstream, step)| async move {
        match step {
            0 => Some((Ok::<_, Infallible>(Bytes::from_static(STALLED_HEAD)), (upstream, 1))),
            1 => {
                upstream.release.notified().await;
                Some((Ok(Bytes::from_static(STALLED_TAIL)), (upstream, 2)))
            }
            _ => None,
        }
    });
    Body::from_stream(chunks)
}

struct DropFlag(Shared);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.endless_dropped.store(true, Ordering::SeqCst);
    }
}

async fn endless(State(upstream): State<Shared>) -> Body {
    let chunks = stream::unfold(DropFlag(upstream), |flag| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Some((Ok::<_, Infallible>(Bytes::from_static(&[0u8; 1024])), flag))
    });
    Body::from_stream(chunks)
}

async fn broken() -> Body {
    let chunks = stream::iter(vec![
        Ok(Bytes::from_static(BROKEN_HEAD)),
        Err(io::Error::other("upstream connection lost")),
    ]);
    Body::from_stream(chunks)
}
