//! Client address resolution.
//!
//! # Responsibilities
//! - Decide which address a request originated from
//! - Honour `X-Forwarded-For` / `X-Real-IP` only from trusted peers
//!
//! # Design Decisions
//! - `X-Forwarded-For` is walked right to left; the first hop that is not
//!   itself a trusted proxy is the client
//! - Unparseable header values are ignored, never echoed
//! - An unknown peer resolves to the empty string

use std::net::IpAddr;

use axum::http::HeaderMap;

/// Proxy trust policy.
#[derive(Debug, Clone, Copy)]
pub enum TrustedProxies<'a> {
    All,
    Only(&'a [IpAddr]),
}

impl TrustedProxies<'_> {
    pub fn from_config(list: Option<&[IpAddr]>) -> TrustedProxies<'_> {
        match list {
            None => TrustedProxies::All,
            Some(list) => TrustedProxies::Only(list),
        }
    }

    fn trusts(&self, ip: &IpAddr) -> bool {
        match self {
            TrustedProxies::All => true,
            TrustedProxies::Only(list) => list.contains(ip),
        }
    }
}

/// Resolve the originating client address for a request.
pub fn resolve_client_ip<S: AsRef<str>>(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted: TrustedProxies<'_>,
    header_names: &[S],
) -> String {
    let Some(peer) = peer else {
        return String::new();
    };

    if trusted.trusts(&peer) {
        for name in header_names {
            let Some(value) = headers.get(name.as_ref()).and_then(|v| v.to_str().ok()) else {
                continue;
            };
            if let Some(ip) = client_from_chain(value, trusted) {
                return ip.to_string();
            }
        }
    }

    peer.to_string()
}

fn client_from_chain(value: &str, trusted: TrustedProxies<'_>) -> Option<IpAddr> {
    let hops: Vec<IpAddr> = value
        .split(',')
        .filter_map(|hop| hop.trim().parse().ok())
        .collect();

    hops.iter()
        .rev()
        .find(|ip| !trusted.trusts(ip))
        .or_else(|| hops.first())
        .copied()
}
