//! Host sampling for the heartbeat endpoint.
//!
//! # Responsibilities
//! - Sample CPU load, memory, disk space and disk I/O with `sysinfo`
//! - Time a handful of GETs against the configured probe URL
//!
//! # Design Decisions
//! - `sysinfo` calls block (the CPU sample sleeps), so they run on the
//!   blocking pool
//! - One failed latency attempt zeroes the whole latency report

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::stats::{DiskReadWrite, DiskStats, HeartbeatStats, NetworkLatency, RamStats};
use crate::config::HeartbeatConfig;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const LATENCY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of heartbeat numbers.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn snapshot(&self) -> HeartbeatStats;
}

pub struct SysinfoProbe {
    cpu_sample: Duration,
    latency_url: Option<String>,
    latency_attempts: u32,
    client: reqwest::Client,
}

impl SysinfoProbe {
    pub fn new(config: &HeartbeatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(LATENCY_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            cpu_sample: Duration::from_millis(config.cpu_sample_ms)
                .max(MINIMUM_CPU_UPDATE_INTERVAL),
            latency_url: config.latency_probe_url.clone(),
            latency_attempts: config.latency_attempts,
            client,
        }
    }

    async fn network_latency(&self) -> NetworkLatency {
        let Some(url) = self.latency_url.as_deref() else {
            return NetworkLatency::default();
        };

        let mut samples = Vec::with_capacity(self.latency_attempts as usize);
        for _ in 0..self.latency_attempts {
            let start = Instant::now();
            if let Err(e) = self.client.get(url).send().await {
                tracing::warn!(url = %url, error = %e, "Latency probe failed");
                return NetworkLatency::default();
            }
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        NetworkLatency::from_samples(&samples)
    }
}

#[async_trait]
impl SystemProbe for SysinfoProbe {
    async fn snapshot(&self) -> HeartbeatStats {
        let cpu_sample = self.cpu_sample;
        let host = tokio::task::spawn_blocking(move || sample_host(cpu_sample));
        let latency = self.network_latency().await;

        let mut stats = match host.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Host sampling task failed");
                HeartbeatStats::default()
            }
        };
        stats.network_latency = latency;
        stats
    }
}

fn sample_host(cpu_sample: Duration) -> HeartbeatStats {
    let mut system = System::new();

    // Load is the delta between two refreshes.
    system.refresh_cpu_usage();
    std::thread::sleep(cpu_sample);
    system.refresh_cpu_usage();
    system.refresh_memory();

    HeartbeatStats {
        cpu_load: f64::from(system.global_cpu_usage()),
        disk: sample_disks(),
        network_latency: NetworkLatency::default(),
        physical_and_logical_cpu_count: system.cpus().len(),
        ram: RamStats {
            total_ram: system.total_memory() as f64 / BYTES_PER_GB,
            used_ram: system.used_memory() as f64 / BYTES_PER_GB,
        },
    }
}

/// Usage of the root filesystem, or of every disk summed when no disk is
/// mounted at `/`.
fn sample_disks() -> DiskStats {
    let disks = Disks::new_with_refreshed_list();
    let list = disks.list();

    let (total, free) = match list.iter().find(|d| d.mount_point() == Path::new("/")) {
        Some(root) => (root.total_space(), root.available_space()),
        None => list.iter().fold((0, 0), |(total, free), d| {
            (total + d.total_space(), free + d.available_space())
        }),
    };

    let read_write = io_totals(list.iter().map(|d| {
        let usage = d.usage();
        (d.name(), usage.total_read_bytes, usage.total_written_bytes)
    }));

    DiskStats {
        free_disk_space: free,
        read_write,
        total_disk_space: total,
        used_disk_space: total.saturating_sub(free),
        partitions: list.len() as u64,
    }
}

/// Sum read and written bytes, counting each device once. A device mounted
/// at several points is listed once per mount.
fn io_totals<'a>(disks: impl IntoIterator<Item = (&'a OsStr, u64, u64)>) -> DiskReadWrite {
    let mut seen = HashSet::new();
    disks
        .into_iter()
        .filter(|(name, _, _)| seen.insert(*name))
        .fold(DiskReadWrite::default(), |acc, (_, read, written)| DiskReadWrite {
            read: acc.read + read,
            written: acc.written + written,
        })
}
