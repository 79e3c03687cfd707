//! Health check system for the agent pools
//!
//! Provides the health check trait and a registry-backed implementation that
//! reports whether a pool still has agents a routing request could select.

use crate::agent::{AgentRegistry, LifecycleStage};
use crate::error::RouterResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub component: String,
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

/// Trait for components that can be health checked
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Perform health check on this component
    async fn health_check(&self) -> HealthCheckResult;

    /// Get the component name for reporting
    fn component_name(&self) -> &str;
}

/// Registry health check for one lifecycle pool, or the whole registry
pub struct RegistryHealthCheck {
    registry: Arc<AgentRegistry>,
    lifecycle: Option<LifecycleStage>,
    component: String,
}

impl RegistryHealthCheck {
    /// Check every registered agent regardless of lifecycle stage
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            lifecycle: None,
            component: "agent_registry".to_string(),
        }
    }

    /// Check only the pool serving `lifecycle`
    pub fn for_lifecycle(registry: Arc<AgentRegistry>, lifecycle: LifecycleStage) -> Self {
        Self {
            registry,
            lifecycle: Some(lifecycle),
            component: format!("agent_pool:{lifecycle}"),
        }
    }
}

#[async_trait]
impl HealthCheck for RegistryHealthCheck {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let summary = self.registry.status_summary(self.lifecycle);
        let routable = summary.routable();
        let healthy = routable > 0;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let message = format!(
            "{routable}/{} routable (healthy={}, degraded={}, offline={}, stale={})",
            summary.total, summary.healthy, summary.degraded, summary.offline, summary.stale
        );

        if healthy {
            debug!(
                "Registry health check: component={}, {}, response_time={}ms",
                self.component, message, response_time_ms
            );
        } else {
            warn!(
                "Registry health check failed: component={}, {}",
                self.component, message
            );
        }

        HealthCheckResult {
            component: self.component.clone(),
            healthy,
            message: Some(message),
            response_time_ms: Some(response_time_ms),
        }
    }

    fn component_name(&self) -> &str {
        &self.component
    }
}

/// Aggregated health check manager
pub struct HealthCheckManager {
    health_checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthCheckManager {
    pub fn new() -> Self {
        Self {
            health_checks: Vec::new(),
        }
    }

    /// Add a health check to the manager
    pub fn add_health_check(&mut self, health_check: Box<dyn HealthCheck>) {
        self.health_checks.push(health_check);
    }

    /// Run all health checks and return aggregated results
    pub async fn run_health_checks(&self) -> Vec<HealthCheckResult> {
        let mut results = Vec::new();

        for health_check in &self.health_checks {
            results.push(health_check.health_check().await);
        }

        results
    }

    /// Calculate overall health status from all components
    pub async fn calculate_overall_health(&self) -> RouterResult<bool> {
        let results = self.run_health_checks().await;

        if results.is_empty() {
            warn!("No health checks configured - assuming healthy");
            return Ok(true);
        }

        let healthy_count = results.iter().filter(|r| r.healthy).count();
        let total_count = results.len();

        // All components must be healthy for overall health
        let overall_healthy = healthy_count == total_count;

        debug!(
            "Overall health check: {}/{} components healthy, overall={}",
            healthy_count, total_count, overall_healthy
        );

        Ok(overall_healthy)
    }
}

impl Default for HealthCheckManager {
    fn default() -> Self {
        Self::new()
    }
}
