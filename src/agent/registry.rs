//! Agent Registry
//!
//! Authoritative, thread-safe store of [`AgentRecord`]s and the rules for their
//! health and load transitions. A single `RwLock` guards the map, so every
//! read-modify-write on one record is atomic with respect to other callers.
//!
//! Heartbeat staleness is evaluated lazily: [`AgentRegistry::get_agents_by_lifecycle`]
//! forces stale agents offline at query time instead of running a sweeper.
//!
//! Load accounting is approximate. An assignment adds a fixed increment and a
//! release removes a smaller one; the value is a routing heuristic, not a count
//! of in-flight requests.

use crate::agent::record::{
    clamp_load, AgentRecord, AgentRegistration, AgentState, AgentStatus, LifecycleStage,
};
use crate::error::{RouterError, RouterResult};
use crate::observability::metrics::metrics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default heartbeat timeout before an agent is considered offline
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Load added per assignment
pub const ASSIGNMENT_LOAD_STEP: f64 = 0.1;

/// Load removed per release
pub const RELEASE_LOAD_STEP: f64 = 0.05;

/// Consecutive failures at which an agent becomes degraded
pub const DEGRADED_FAILURE_THRESHOLD: u32 = 2;

/// Consecutive failures at which an agent becomes offline
pub const OFFLINE_FAILURE_THRESHOLD: u32 = 3;

/// Per-status counts for one pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStatusSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub offline: usize,
    /// Agents whose heartbeat exceeded the timeout but were not yet swept
    pub stale: usize,
}

impl PoolStatusSummary {
    /// Agents that a routing request could still select
    pub fn routable(&self) -> usize {
        self.total - self.offline - self.stale
    }
}

/// Thread-safe registry of agent records
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    /// Map of agent id to record
    agents: Arc<RwLock<HashMap<String, AgentRecord>>>,
    heartbeat_timeout: Duration,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_TIMEOUT)
    }
}

impl AgentRegistry {
    /// Create an empty registry with the given heartbeat timeout
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
            heartbeat_timeout,
        }
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        self.heartbeat_timeout
    }

    fn read_agents(&self) -> RwLockReadGuard<'_, HashMap<String, AgentRecord>> {
        self.agents.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_agents(&self) -> RwLockWriteGuard<'_, HashMap<String, AgentRecord>> {
        self.agents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply a mutation to one record under the write lock
    fn update<F>(&self, agent_id: &str, mutate: F) -> Option<AgentRecord>
    where
        F: FnOnce(&mut AgentRecord),
    {
        let span = crate::registry_span!(agent_id = %agent_id);
        let _enter = span.enter();
        let mut agents = self.write_agents();
        match agents.get_mut(agent_id) {
            Some(record) => {
                mutate(record);
                Some(record.clone())
            }
            None => {
                debug!("Ignoring update for unknown agent: {}", agent_id);
                None
            }
        }
    }

    fn is_stale(&self, record: &AgentRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.state.last_heartbeat)
            .to_std()
            .map(|age| age > self.heartbeat_timeout)
            .unwrap_or(false)
    }

    /// Register a new agent; duplicate ids are rejected without touching the existing record
    pub fn register_agent(&self, registration: AgentRegistration) -> RouterResult<AgentRecord> {
        let span = crate::registry_span!(agent_id = %registration.id);
        let _enter = span.enter();
        let mut agents = self.write_agents();

        if agents.contains_key(&registration.id) {
            metrics().duplicate_registration_rejected();
            warn!("Rejected duplicate registration for agent: {}", registration.id);
            return Err(RouterError::duplicate_agent(registration.id));
        }

        let record = AgentRecord {
            state: AgentState::fresh(Utc::now()),
            registration,
        };
        agents.insert(record.id().to_string(), record.clone());
        metrics().agent_registered();

        info!(
            agent_id = %record.id(),
            lifecycle = %record.lifecycle_stage(),
            "Registered new agent: {}",
            record.name()
        );

        Ok(record)
    }

    /// Remove an agent from the registry
    pub fn deregister_agent(&self, agent_id: &str) -> Option<AgentRecord> {
        let removed = self.write_agents().remove(agent_id);
        if removed.is_some() {
            info!("Deregistered agent: {}", agent_id);
        }
        removed
    }

    /// Get agent record by id
    pub fn get_agent(&self, agent_id: &str) -> Option<AgentRecord> {
        self.read_agents().get(agent_id).cloned()
    }

    /// Refresh heartbeat, optionally overwrite load and status, and clear the failure streak
    pub fn update_heartbeat(
        &self,
        agent_id: &str,
        load: Option<f64>,
        status: Option<AgentStatus>,
    ) -> Option<AgentRecord> {
        let updated = self.update(agent_id, |record| {
            record.state.last_heartbeat = Utc::now();
            if let Some(load) = load {
                record.state.load = clamp_load(load);
            }
            if let Some(status) = status {
                record.state.status = status;
            }
            record.state.consecutive_failures = 0;
        })?;

        metrics().heartbeat_received();
        debug!(
            agent_id = %agent_id,
            load = updated.state.load,
            status = %updated.state.status,
            "Heartbeat received"
        );
        Some(updated)
    }

    /// Bump load for one more unit of work
    pub fn record_assignment(&self, agent_id: &str) -> Option<AgentRecord> {
        let updated = self.update(agent_id, |record| {
            record.state.load = clamp_load(record.state.load + ASSIGNMENT_LOAD_STEP);
            record.state.last_heartbeat = Utc::now();
        })?;
        debug!("Assignment recorded for '{}' (load: {:.2})", agent_id, updated.state.load);
        Some(updated)
    }

    /// Relieve load after a unit of work finishes
    pub fn record_release(&self, agent_id: &str) -> Option<AgentRecord> {
        let updated = self.update(agent_id, |record| {
            record.state.load = clamp_load(record.state.load - RELEASE_LOAD_STEP);
            record.state.last_heartbeat = Utc::now();
        })?;
        debug!("Release recorded for '{}' (load: {:.2})", agent_id, updated.state.load);
        Some(updated)
    }

    /// Count a failure and downgrade status at the fixed thresholds
    pub fn record_failure(&self, agent_id: &str) -> Option<AgentRecord> {
        let updated = self.update(agent_id, |record| {
            record.state.consecutive_failures = record.state.consecutive_failures.saturating_add(1);
            let failures = record.state.consecutive_failures;
            if failures >= OFFLINE_FAILURE_THRESHOLD {
                record.state.status = AgentStatus::Offline;
            } else if failures >= DEGRADED_FAILURE_THRESHOLD {
                record.state.status = AgentStatus::Degraded;
            }
        })?;

        metrics().failure_recorded();
        if updated.is_healthy() {
            debug!(
                "Failure recorded for '{}' ({} consecutive)",
                agent_id, updated.state.consecutive_failures
            );
        } else {
            warn!(
                agent_id = %agent_id,
                failures = updated.state.consecutive_failures,
                status = %updated.state.status,
                "Agent health downgraded"
            );
        }
        Some(updated)
    }

    /// Force an agent back to healthy and clear its failure streak
    pub fn mark_healthy(&self, agent_id: &str) -> Option<AgentRecord> {
        let updated = self.update(agent_id, |record| {
            record.state.status = AgentStatus::Healthy;
            record.state.consecutive_failures = 0;
            record.state.last_heartbeat = Utc::now();
        })?;
        info!("Agent '{}' marked healthy", agent_id);
        Some(updated)
    }

    /// Candidate pool for a lifecycle class, least-loaded first
    ///
    /// Stale agents are forced offline before filtering. Offline agents are
    /// always excluded; degraded agents only when `include_degraded` is false.
    pub fn get_agents_by_lifecycle(
        &self,
        stage: LifecycleStage,
        include_degraded: bool,
    ) -> Vec<AgentRecord> {
        let now = Utc::now();
        let mut agents = self.write_agents();

        let mut candidates: Vec<AgentRecord> = agents
            .values_mut()
            .filter(|record| record.lifecycle_stage() == stage)
            .filter_map(|record| {
                if !record.is_offline() && self.is_stale(record, now) {
                    record.state.status = AgentStatus::Offline;
                    metrics().stale_agent_evicted();
                    warn!(
                        agent_id = %record.id(),
                        last_heartbeat = %record.state.last_heartbeat,
                        "Heartbeat timed out, marking agent offline"
                    );
                }

                match record.status() {
                    AgentStatus::Offline => None,
                    AgentStatus::Degraded if !include_degraded => None,
                    _ => Some(record.clone()),
                }
            })
            .collect();
        drop(agents);

        candidates.sort_by(|a, b| {
            a.load()
                .partial_cmp(&b.load())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "Candidate pool for '{}': {} agent(s) (include_degraded={})",
            stage,
            candidates.len(),
            include_degraded
        );
        candidates
    }

    /// Pin a session to an agent
    pub fn mark_sticky_session(&self, session_id: &str, agent_id: &str) -> Option<AgentRecord> {
        self.update(agent_id, |record| {
            if record.state.sticky_sessions.insert(session_id.to_string()) {
                debug!("Session '{}' pinned to agent '{}'", session_id, agent_id);
            }
        })
    }

    /// Unpin a session from an agent
    pub fn release_sticky_session(&self, session_id: &str, agent_id: &str) -> Option<AgentRecord> {
        self.update(agent_id, |record| {
            if record.state.sticky_sessions.remove(session_id) {
                debug!("Session '{}' released from agent '{}'", session_id, agent_id);
            }
        })
    }

    /// Find the agent a session is pinned to, in any lifecycle class
    pub fn get_sticky_agent(&self, session_id: &str) -> Option<AgentRecord> {
        self.find_sticky_agent(session_id, None)
    }

    /// Find the agent a session is pinned to within one lifecycle class
    ///
    /// A session that spans several workflow stages holds one binding per
    /// class; only the binding for `lifecycle` is relevant to a route there.
    pub fn get_sticky_agent_for(
        &self,
        session_id: &str,
        lifecycle: LifecycleStage,
    ) -> Option<AgentRecord> {
        self.find_sticky_agent(session_id, Some(lifecycle))
    }

    fn find_sticky_agent(
        &self,
        session_id: &str,
        lifecycle: Option<LifecycleStage>,
    ) -> Option<AgentRecord> {
        // Linear scan over a small pool. Several matching bindings resolve to the lowest id.
        self.read_agents()
            .values()
            .filter(|record| lifecycle.map_or(true, |stage| record.lifecycle_stage() == stage))
            .filter(|record| record.holds_session(session_id))
            .min_by(|a, b| a.id().cmp(b.id()))
            .cloned()
    }

    /// All records, sorted by id
    pub fn list_agents(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self.read_agents().values().cloned().collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records
    }

    pub fn agent_count(&self) -> usize {
        self.read_agents().len()
    }

    /// Count agents by status without sweeping stale heartbeats
    pub fn status_summary(&self, lifecycle: Option<LifecycleStage>) -> PoolStatusSummary {
        let now = Utc::now();
        let agents = self.read_agents();

        agents
            .values()
            .filter(|record| lifecycle.map_or(true, |stage| record.lifecycle_stage() == stage))
            .fold(PoolStatusSummary::default(), |mut summary, record| {
                summary.total += 1;
                match record.status() {
                    AgentStatus::Healthy => summary.healthy += 1,
                    AgentStatus::Degraded => summary.degraded += 1,
                    AgentStatus::Offline => summary.offline += 1,
                }
                if !record.is_offline() && self.is_stale(record, now) {
                    summary.stale += 1;
                }
                summary
            })
    }

    /// Overwrite an agent's heartbeat timestamp (for testing staleness only)
    ///
    /// WARNING: This bypasses normal heartbeat semantics and should ONLY be used
    /// in tests that need an agent to look stale without waiting for the timeout.
    #[doc(hidden)]
    pub fn set_last_heartbeat_for_test(&self, agent_id: &str, at: DateTime<Utc>) -> bool {
        self.update(agent_id, |record| record.state.last_heartbeat = at)
            .is_some()
    }

    /// Overwrite an agent's load without refreshing its heartbeat (for testing only)
    #[doc(hidden)]
    pub fn set_load_for_test(&self, agent_id: &str, load: f64) -> bool {
        self.update(agent_id, |record| record.state.load = clamp_load(load))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registration(id: &str, stage: LifecycleStage) -> AgentRegistration {
        AgentRegistration::new(id, format!("Agent {id}"), stage).with_capabilities(["x"])
    }

    #[test]
    fn test_register_creates_fresh_record() {
        let registry = AgentRegistry::default();
        let record = registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();

        assert_eq!(record.load(), 0.0);
        assert_eq!(record.status(), AgentStatus::Healthy);
        assert_eq!(record.state.consecutive_failures, 0);
        assert!(record.state.sticky_sessions.is_empty());
        assert_eq!(registry.agent_count(), 1);
    }

    #[test]
    fn test_duplicate_registration_preserves_state() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();
        registry.record_assignment("a1");
        registry.record_failure("a1");

        let result = registry.register_agent(registration("a1", LifecycleStage::Opportunity));
        assert!(matches!(result, Err(RouterError::DuplicateAgent { .. })));

        let record = registry.get_agent("a1").unwrap();
        assert_eq!(record.lifecycle_stage(), LifecycleStage::Target);
        assert!((record.load() - ASSIGNMENT_LOAD_STEP).abs() < 1e-9);
        assert_eq!(record.state.consecutive_failures, 1);
    }

    #[test]
    fn test_unknown_agent_operations_return_none() {
        let registry = AgentRegistry::default();

        assert!(registry.get_agent("ghost").is_none());
        assert!(registry.update_heartbeat("ghost", Some(0.5), None).is_none());
        assert!(registry.record_assignment("ghost").is_none());
        assert!(registry.record_release("ghost").is_none());
        assert!(registry.record_failure("ghost").is_none());
        assert!(registry.mark_healthy("ghost").is_none());
        assert!(registry.mark_sticky_session("s1", "ghost").is_none());
        assert!(registry.release_sticky_session("s1", "ghost").is_none());
        assert!(registry.deregister_agent("ghost").is_none());
        assert_eq!(registry.agent_count(), 0);
    }

    #[test]
    fn test_load_clamped_on_assignment_and_release() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();

        for _ in 0..20 {
            registry.record_assignment("a1");
        }
        assert_eq!(registry.get_agent("a1").unwrap().load(), 1.0);

        for _ in 0..40 {
            registry.record_release("a1");
        }
        assert_eq!(registry.get_agent("a1").unwrap().load(), 0.0);
    }

    #[test]
    fn test_heartbeat_clamps_reported_load() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();

        let record = registry.update_heartbeat("a1", Some(3.5), None).unwrap();
        assert_eq!(record.load(), 1.0);

        let record = registry.update_heartbeat("a1", Some(-2.0), None).unwrap();
        assert_eq!(record.load(), 0.0);

        let record = registry.update_heartbeat("a1", None, None).unwrap();
        assert_eq!(record.load(), 0.0);
    }

    #[test]
    fn test_failure_thresholds() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();

        let record = registry.record_failure("a1").unwrap();
        assert_eq!(record.status(), AgentStatus::Healthy);

        let record = registry.record_failure("a1").unwrap();
        assert_eq!(record.status(), AgentStatus::Degraded);

        let record = registry.record_failure("a1").unwrap();
        assert_eq!(record.status(), AgentStatus::Offline);
        assert_eq!(record.state.consecutive_failures, 3);

        let record = registry.update_heartbeat("a1", None, None).unwrap();
        assert_eq!(record.state.consecutive_failures, 0);
    }

    #[test]
    fn test_heartbeat_with_status_overrides() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();
        registry.record_failure("a1");
        registry.record_failure("a1");
        registry.record_failure("a1");

        let record = registry
            .update_heartbeat("a1", Some(0.3), Some(AgentStatus::Healthy))
            .unwrap();
        assert_eq!(record.status(), AgentStatus::Healthy);
        assert_eq!(record.state.consecutive_failures, 0);
        assert!((record.load() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_mark_healthy_resets_streak() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();
        registry.record_failure("a1");
        registry.record_failure("a1");

        let record = registry.mark_healthy("a1").unwrap();
        assert_eq!(record.status(), AgentStatus::Healthy);
        assert_eq!(record.state.consecutive_failures, 0);
    }

    #[test]
    fn test_lifecycle_pool_filters_and_sorts() {
        let registry = AgentRegistry::default();
        for id in ["busy", "idle", "degraded", "offline"] {
            registry
                .register_agent(registration(id, LifecycleStage::Target))
                .unwrap();
        }
        registry
            .register_agent(registration("other", LifecycleStage::Opportunity))
            .unwrap();

        registry.update_heartbeat("busy", Some(0.9), None);
        registry.update_heartbeat("idle", Some(0.1), None);
        registry.update_heartbeat("degraded", Some(0.0), Some(AgentStatus::Degraded));
        registry.update_heartbeat("offline", Some(0.0), Some(AgentStatus::Offline));

        let healthy_only = registry.get_agents_by_lifecycle(LifecycleStage::Target, false);
        let ids: Vec<&str> = healthy_only.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["idle", "busy"]);

        let with_degraded = registry.get_agents_by_lifecycle(LifecycleStage::Target, true);
        let ids: Vec<&str> = with_degraded.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["degraded", "idle", "busy"]);
    }

    #[test]
    fn test_stale_agent_forced_offline_lazily() {
        let registry = AgentRegistry::new(Duration::from_secs(10));
        registry
            .register_agent(registration("fresh", LifecycleStage::Target))
            .unwrap();
        registry
            .register_agent(registration("stale", LifecycleStage::Target))
            .unwrap();
        registry.set_last_heartbeat_for_test("stale", Utc::now() - chrono::Duration::seconds(11));

        // Cached status is untouched until a pool query runs.
        assert_eq!(
            registry.get_agent("stale").unwrap().status(),
            AgentStatus::Healthy
        );
        assert_eq!(registry.status_summary(None).stale, 1);

        let pool = registry.get_agents_by_lifecycle(LifecycleStage::Target, true);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id(), "fresh");
        assert_eq!(
            registry.get_agent("stale").unwrap().status(),
            AgentStatus::Offline
        );
    }

    #[test]
    fn test_sticky_session_marking_is_idempotent() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();

        registry.mark_sticky_session("s1", "a1");
        let record = registry.mark_sticky_session("s1", "a1").unwrap();
        assert_eq!(record.state.sticky_sessions.len(), 1);
        assert_eq!(registry.get_sticky_agent("s1").unwrap().id(), "a1");

        registry.release_sticky_session("s1", "a1");
        let record = registry.release_sticky_session("s1", "a1").unwrap();
        assert!(record.state.sticky_sessions.is_empty());
        assert!(registry.get_sticky_agent("s1").is_none());
    }

    #[test]
    fn test_sticky_binding_survives_offline() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a1", LifecycleStage::Target))
            .unwrap();
        registry.mark_sticky_session("s1", "a1");
        for _ in 0..3 {
            registry.record_failure("a1");
        }

        let sticky = registry.get_sticky_agent("s1").unwrap();
        assert!(sticky.is_offline());
    }

    #[test]
    fn test_sticky_lookup_scoped_to_lifecycle() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("a-scout", LifecycleStage::Opportunity))
            .unwrap();
        registry
            .register_agent(registration("t2", LifecycleStage::Target))
            .unwrap();
        registry.mark_sticky_session("s1", "a-scout");
        registry.mark_sticky_session("s1", "t2");

        assert_eq!(registry.get_sticky_agent("s1").unwrap().id(), "a-scout");
        assert_eq!(
            registry
                .get_sticky_agent_for("s1", LifecycleStage::Target)
                .unwrap()
                .id(),
            "t2"
        );
        assert_eq!(
            registry
                .get_sticky_agent_for("s1", LifecycleStage::Opportunity)
                .unwrap()
                .id(),
            "a-scout"
        );
        assert!(registry
            .get_sticky_agent_for("s1", LifecycleStage::Integrity)
            .is_none());
    }

    #[test]
    fn test_status_summary_per_lifecycle() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("t1", LifecycleStage::Target))
            .unwrap();
        registry
            .register_agent(registration("t2", LifecycleStage::Target))
            .unwrap();
        registry
            .register_agent(registration("o1", LifecycleStage::Opportunity))
            .unwrap();
        registry.record_failure("t2");
        registry.record_failure("t2");

        let summary = registry.status_summary(Some(LifecycleStage::Target));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.healthy, 1);
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.routable(), 2);

        assert_eq!(registry.status_summary(None).total, 3);
    }

    #[test]
    fn test_deregister_and_list() {
        let registry = AgentRegistry::default();
        registry
            .register_agent(registration("b", LifecycleStage::Target))
            .unwrap();
        registry
            .register_agent(registration("a", LifecycleStage::Target))
            .unwrap();

        let ids: Vec<String> = registry
            .list_agents()
            .into_iter()
            .map(|r| r.registration.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(registry.deregister_agent("a").is_some());
        assert_eq!(registry.agent_count(), 1);
        assert!(registry
            .register_agent(registration("a", LifecycleStage::Target))
            .is_ok());
    }

    #[derive(Debug, Clone)]
    enum LoadOp {
        Assign,
        Release,
        Fail,
        Heartbeat(f64),
    }

    fn load_op() -> impl Strategy<Value = LoadOp> {
        prop_oneof![
            Just(LoadOp::Assign),
            Just(LoadOp::Release),
            Just(LoadOp::Fail),
            (-5.0f64..5.0).prop_map(LoadOp::Heartbeat),
            prop_oneof![
                Just(f64::NAN),
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY)
            ]
            .prop_map(LoadOp::Heartbeat),
        ]
    }

    proptest! {
        #[test]
        fn load_stays_in_unit_range(ops in proptest::collection::vec(load_op(), 1..60)) {
            let registry = AgentRegistry::default();
            registry.register_agent(registration("a", LifecycleStage::Target)).unwrap();

            for op in ops {
                let record = match &op {
                    LoadOp::Assign => registry.record_assignment("a"),
                    LoadOp::Release => registry.record_release("a"),
                    LoadOp::Fail => registry.record_failure("a"),
                    LoadOp::Heartbeat(load) => registry.update_heartbeat("a", Some(*load), None),
                }
                .unwrap();
                prop_assert!(
                    (0.0..=1.0).contains(&record.load()),
                    "load {} after {:?}",
                    record.load(),
                    op
                );
            }
        }
    }
}
