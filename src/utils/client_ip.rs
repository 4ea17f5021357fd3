//! Client IP resolution for click metadata.
//!
//! Rate limiting resolves the caller IP inside `tower_governor`; this helper
//! is the equivalent for click events, where the IP ends up in analytics
//! rows instead of a limiter key.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Resolves the client IP for a request.
///
/// With `behind_proxy` set, forwarded headers win over the socket peer:
/// leftmost `X-Forwarded-For` entry first, then `X-Real-IP`. Unparseable
/// header values fall back to the peer address. Header trust must be limited
/// to deployments behind a proxy that overwrites these headers.
pub fn client_ip(headers: &HeaderMap, peer: IpAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    peer
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For holds "client, proxy1, proxy2"; the client is leftmost
    let from_xff = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    if from_xff.is_some() {
        return from_xff;
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
