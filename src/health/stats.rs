//! Heartbeat payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub stats: HeartbeatStats,
    pub status: String,
}

impl HeartbeatResponse {
    pub fn up(stats: HeartbeatStats) -> Self {
        Self {
            stats,
            status: "Up".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatStats {
    /// Percent, averaged over all cores.
    pub cpu_load: f64,
    pub disk: DiskStats,
    pub network_latency: NetworkLatency,
    pub physical_and_logical_cpu_count: usize,
    pub ram: RamStats,
}

/// Bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub free_disk_space: u64,
    pub read_write: DiskReadWrite,
    pub total_disk_space: u64,
    pub used_disk_space: u64,
    pub partitions: u64,
}

/// Bytes transferred since boot, summed over distinct devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskReadWrite {
    pub read: u64,
    pub written: u64,
}

/// Milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkLatency {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl NetworkLatency {
    /// Summarise a set of samples. An empty set reads as zero.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        Self { min, avg, max }
    }
}

/// Gigabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RamStats {
    pub total_ram: f64,
    pub used_ram: f64,
}
