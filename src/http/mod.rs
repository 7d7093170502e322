//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, client IP)
//!     → handlers/ (normalizer or synthesizer per endpoint)
//!     → response.rs (representation headers, error mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ClientIp, X_REQUEST_ID};
pub use response::{ApiError, HandlerError};
pub use server::{AppState, HttpServer};
