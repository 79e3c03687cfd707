//! Thread-safe routing metrics
//!
//! Atomic counters for routing outcomes and registry health events. One
//! process-wide collector backs every registry and routing layer in the process.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

/// Thread-safe metrics collector using atomics
#[derive(Debug)]
pub struct MetricsCollector {
    // Routing outcomes
    routes_requested: AtomicU64,
    routes_succeeded: AtomicU64,
    routes_failed: AtomicU64,
    degraded_fallbacks: AtomicU64,
    sticky_hits: AtomicU64,

    // Registry events
    agents_registered: AtomicU64,
    duplicate_registrations: AtomicU64,
    heartbeats_received: AtomicU64,
    failures_recorded: AtomicU64,
    stale_evictions: AtomicU64,

    started_at: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            routes_requested: AtomicU64::new(0),
            routes_succeeded: AtomicU64::new(0),
            routes_failed: AtomicU64::new(0),
            degraded_fallbacks: AtomicU64::new(0),
            sticky_hits: AtomicU64::new(0),
            agents_registered: AtomicU64::new(0),
            duplicate_registrations: AtomicU64::new(0),
            heartbeats_received: AtomicU64::new(0),
            failures_recorded: AtomicU64::new(0),
            stale_evictions: AtomicU64::new(0),
            started_at: AtomicU64::new(current_timestamp()),
        }
    }

    // Routing outcomes
    pub fn route_requested(&self) {
        self.routes_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn route_succeeded(&self, degraded_fallback: bool, sticky_honored: bool) {
        self.routes_succeeded.fetch_add(1, Ordering::Relaxed);
        if degraded_fallback {
            self.degraded_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        if sticky_honored {
            self.sticky_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn route_failed(&self) {
        self.routes_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Registry events
    pub fn agent_registered(&self) {
        self.agents_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplicate_registration_rejected(&self) {
        self.duplicate_registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn heartbeat_received(&self) {
        self.heartbeats_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_recorded(&self) {
        self.failures_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_agent_evicted(&self) {
        self.stale_evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset all counters (for testing)
    pub fn reset(&self) {
        for counter in [
            &self.routes_requested,
            &self.routes_succeeded,
            &self.routes_failed,
            &self.degraded_fallbacks,
            &self.sticky_hits,
            &self.agents_registered,
            &self.duplicate_registrations,
            &self.heartbeats_received,
            &self.failures_recorded,
            &self.stale_evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.started_at.store(current_timestamp(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let requested = self.routes_requested.load(Ordering::Relaxed);
        let succeeded = self.routes_succeeded.load(Ordering::Relaxed);

        MetricsSnapshot {
            routing: RoutingMetrics {
                routes_requested: requested,
                routes_succeeded: succeeded,
                routes_failed: self.routes_failed.load(Ordering::Relaxed),
                degraded_fallbacks: self.degraded_fallbacks.load(Ordering::Relaxed),
                sticky_hits: self.sticky_hits.load(Ordering::Relaxed),
                success_rate: if requested > 0 {
                    succeeded as f64 / requested as f64
                } else {
                    0.0
                },
            },
            registry: RegistryMetrics {
                agents_registered: self.agents_registered.load(Ordering::Relaxed),
                duplicate_registrations: self.duplicate_registrations.load(Ordering::Relaxed),
                heartbeats_received: self.heartbeats_received.load(Ordering::Relaxed),
                failures_recorded: self.failures_recorded.load(Ordering::Relaxed),
                stale_evictions: self.stale_evictions.load(Ordering::Relaxed),
            },
            uptime_seconds: now.saturating_sub(self.started_at.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// Public metrics structures
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub routing: RoutingMetrics,
    pub registry: RegistryMetrics,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingMetrics {
    pub routes_requested: u64,
    pub routes_succeeded: u64,
    pub routes_failed: u64,
    pub degraded_fallbacks: u64,
    pub sticky_hits: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryMetrics {
    pub agents_registered: u64,
    pub duplicate_registrations: u64,
    pub heartbeats_received: u64,
    pub failures_recorded: u64,
    pub stale_evictions: u64,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
