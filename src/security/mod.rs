//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size ceiling, 413 on overflow)
//!     → headers.rs (client IP from peer + trusted forwarding headers)
//!     → handlers
//! ```
//!
//! # Design Decisions
//! - Forwarding headers are only believed when the peer is a trusted proxy
//! - Limits apply before any handler reads the body

pub mod headers;
pub mod limits;

pub use headers::{resolve_client_ip, TrustedProxies};
pub use limits::apply_body_limit;
