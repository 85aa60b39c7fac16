//! Reverse-proxy header trust.
//!
//! The server normally sits behind exactly one proxy. With `trust_proxy`
//! enabled the last entry of each `X-Forwarded-*` header (the one our proxy
//! appended) replaces what the socket tells us; anything further left in
//! the list is client-controlled and ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PORT: &str = "x-forwarded-port";
const X_FORWARDED_PREFIX: &str = "x-forwarded-prefix";

/// Number of proxies in front of the server whose headers are believed.
const TRUSTED_HOPS: usize = 1;

/// Where a request really came from, as far as we can tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client address (proxy-reported or socket peer).
    pub addr: Option<String>,
    /// `http` / `https`.
    pub scheme: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Path prefix the proxy mounted us under, if any.
    pub prefix: Option<String>,
}

impl ClientInfo {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> Self {
        let mut info = ClientInfo {
            addr: peer.map(|p| p.ip().to_string()),
            scheme: "http".to_owned(),
            host: header_str(headers, header::HOST.as_str()).map(str::to_owned),
            port: None,
            prefix: None,
        };

        if !trust_proxy {
            return info;
        }

        if let Some(addr) = trusted_value(headers, X_FORWARDED_FOR) {
            info.addr = Some(addr);
        }
        if let Some(proto) = trusted_value(headers, X_FORWARDED_PROTO) {
            info.scheme = proto.to_ascii_lowercase();
        }
        if let Some(host) = trusted_value(headers, X_FORWARDED_HOST) {
            info.host = Some(host);
        }
        if let Some(port) = trusted_value(headers, X_FORWARDED_PORT).and_then(|p| p.parse().ok()) {
            info.port = Some(port);
        }
        if let Some(prefix) = trusted_value(headers, X_FORWARDED_PREFIX) {
            info.prefix = Some(prefix.trim_end_matches('/').to_owned());
        }
        info
    }
}

/// Attach a [`ClientInfo`] extension for downstream handlers and the trace
/// middleware.
pub async fn forwarded_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let info = ClientInfo::from_parts(req.headers(), peer, state.config.trust_proxy);
    debug!(
        client = ?info.addr,
        scheme = %info.scheme,
        host = ?info.host,
        port = ?info.port,
        prefix = ?info.prefix,
        "resolved client info"
    );
    req.extensions_mut().insert(info);
    next.run(req).await
}

// ── private helpers ──────────────────────────────────────────────────────────

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The entry `TRUSTED_HOPS` from the right of a comma-separated header,
/// across all occurrences of that header.
fn trusted_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();
    if values.len() < TRUSTED_HOPS {
        return None;
    }
    let v = values[values.len() - TRUSTED_HOPS];
    (!v.is_empty()).then(|| v.to_owned())
}
