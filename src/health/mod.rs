//! Heartbeat subsystem.
//!
//! # Data Flow
//! ```text
//! GET /heartbeat
//!     → probe.rs (SystemProbe: CPU, memory, disks, network latency)
//!     → stats.rs (HeartbeatStats wrapped in HeartbeatResponse)
//!     → JSON
//! ```
//!
//! # Design Decisions
//! - The probe is injected into the server state so tests can supply
//!   fixed numbers
//! - Sampling never fails the request: anything unavailable reads as zero

pub mod probe;
pub mod stats;

pub use probe::{SysinfoProbe, SystemProbe};
pub use stats::{
    DiskReadWrite, DiskStats, HeartbeatResponse, HeartbeatStats, NetworkLatency, RamStats,
};
