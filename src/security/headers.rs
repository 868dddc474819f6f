//! Client identification from proxy headers.
//!
//! The gateway trusts the reverse proxy in front of it to set
//! `X-Forwarded-For` / `X-Real-IP` correctly.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Bucket shared by every client that cannot be identified.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiting key for the requesting client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// First `X-Forwarded-For` address, then `X-Real-IP`, then the peer
    /// address, then [`UNKNOWN_CLIENT`].
    pub fn derive(headers: &HeaderMap, peer: Option<IpAddr>) -> Self {
        let forwarded = header_str(headers, X_FORWARDED_FOR)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|addr| !addr.is_empty());

        let key = forwarded
            .or_else(|| header_str(headers, X_REAL_IP).map(str::trim).filter(|addr| !addr.is_empty()))
            .map(str::to_owned)
            .or_else(|| peer.map(|ip| ip.to_string()))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned());

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self::derive(&parts.headers, peer))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
