//! Best-effort client metadata (user agent, IP) for new sessions.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use guardpost_entity::session::ClientMetadata;

/// Client metadata read from request headers and the peer address.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo(pub ClientMetadata);

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| truncate(v, 512));

        // First hop of X-Forwarded-For, else the socket peer.
        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| truncate(v, 64))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        Ok(ClientInfo(ClientMetadata {
            user_agent,
            ip_address,
        }))
    }
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
