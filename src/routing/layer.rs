//! Routing Layer
//!
//! Orchestrates one routing decision end to end: resolve the stage, pull the
//! candidate pool from the registry, rank it with the scorer, apply assignment
//! side effects and explain the choice.
//!
//! ## Decision flow
//!
//! ```text
//! Stage + Context → Registry pool → Scorer rank → select → side effects → StageRoute
//! ```
//!
//! Degraded agents stay eligible; the top-ranked *healthy* candidate wins, and
//! only when none is healthy does the best degraded one get picked. Offline
//! agents never reach the scorer.
//!
//! This layer never retries. Both exhaustion outcomes are returned to the
//! caller wrapped with the stage id.

use crate::agent::{AgentRecord, AgentRegistry, LifecycleStage};
use crate::error::{RouterError, RouterResult};
use crate::observability::metrics::metrics;
use crate::routing::context::RoutingContext;
use crate::routing::scorer::{AgentScoreBreakdown, RoutingScorer};
use crate::workflow::StageGraph;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Behavior switches for the routing layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingOptions {
    /// Only credit stickiness when the sticky agent is currently healthy.
    /// The binding itself is left in place either way.
    #[serde(default)]
    pub skip_sticky_for_unavailable: bool,
}

/// How the sticky binding influenced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StickyOutcome {
    /// No sticky agent was in the candidate pool
    None,
    /// The sticky agent was selected
    Honored,
    /// The sticky agent was in the pool but another agent won
    Overridden,
}

impl StickyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StickyOutcome::None => "none",
            StickyOutcome::Honored => "honored",
            StickyOutcome::Overridden => "overridden",
        }
    }
}

/// Fully explained routing decision for one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageRoute {
    pub stage_id: String,
    /// Lifecycle class the stage was routed against
    pub lifecycle: LifecycleStage,
    /// Selected agent, reflecting the assignment load bump
    pub agent: AgentRecord,
    /// Remaining ranked candidates, most preferred first
    pub fallbacks: Vec<AgentRecord>,
    /// Winning score breakdown, computed before side effects
    pub score: AgentScoreBreakdown,
    /// True when the sticky agent was present in the candidate pool
    pub sticky_applied: bool,
    pub sticky: StickyOutcome,
    /// True when no healthy candidate existed and a degraded one was picked
    pub degraded_fallback: bool,
    /// Upstream stage ids, informational only
    pub dependencies: Vec<String>,
    /// Audit explanation
    pub reason: String,
}

impl StageRoute {
    pub fn agent_id(&self) -> &str {
        self.agent.id()
    }

    pub fn fallback_ids(&self) -> Vec<&str> {
        self.fallbacks.iter().map(AgentRecord::id).collect()
    }
}

/// Composes registry and scorer into explained routing decisions
#[derive(Debug, Clone)]
pub struct RoutingLayer {
    registry: Arc<AgentRegistry>,
    scorer: RoutingScorer,
    options: RoutingOptions,
}

impl RoutingLayer {
    /// Create a routing layer over a shared registry
    pub fn new(registry: Arc<AgentRegistry>, scorer: RoutingScorer) -> Self {
        Self {
            registry,
            scorer,
            options: RoutingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RoutingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn scorer(&self) -> &RoutingScorer {
        &self.scorer
    }

    pub fn options(&self) -> RoutingOptions {
        self.options
    }

    /// Select an agent for `stage_id` and record the assignment
    pub fn route_stage(
        &self,
        graph: &dyn StageGraph,
        stage_id: &str,
        context: &RoutingContext,
    ) -> RouterResult<StageRoute> {
        let span = crate::route_span!(stage_id = %stage_id);
        let _enter = span.enter();

        metrics().route_requested();
        let result = self.decide(graph, stage_id, context);

        match &result {
            Ok(route) => {
                metrics().route_succeeded(
                    route.degraded_fallback,
                    route.sticky == StickyOutcome::Honored,
                );
                info!(
                    agent_id = %route.agent_id(),
                    total = route.score.total,
                    "{}",
                    route.reason
                );
            }
            Err(e) => {
                metrics().route_failed();
                warn!(code = e.code(), "{}", e);
            }
        }

        result
    }

    fn decide(
        &self,
        graph: &dyn StageGraph,
        stage_id: &str,
        context: &RoutingContext,
    ) -> RouterResult<StageRoute> {
        let stage = graph
            .stage(stage_id)
            .ok_or_else(|| RouterError::stage_not_found(stage_id))?;
        let dependencies = graph.dependencies(stage_id);
        let lifecycle = context.lifecycle_override.unwrap_or(stage.agent_type);

        let sticky_agent_id = self.resolve_sticky_agent_id(context, lifecycle);

        let pool = self.registry.get_agents_by_lifecycle(lifecycle, true);
        if pool.is_empty() {
            return Err(RouterError::no_agents_available(stage_id, lifecycle));
        }

        let sticky_agent_id = sticky_agent_id.filter(|sticky| {
            !self.options.skip_sticky_for_unavailable
                || pool
                    .iter()
                    .any(|agent| agent.id() == sticky.as_str() && agent.is_healthy())
        });

        let scored =
            self.scorer
                .score_candidates(stage, &pool, context, sticky_agent_id.as_deref());
        let sticky_applied = scored.sticky_applied;
        let mut ranked = scored.ranked;

        if ranked.is_empty() {
            return Err(RouterError::no_routable_agents(stage_id));
        }

        let selected_index = ranked
            .iter()
            .position(|candidate| candidate.agent.is_healthy())
            .unwrap_or(0);
        let winner = ranked.remove(selected_index);
        let degraded_fallback = !winner.agent.is_healthy();

        if let Some(session_id) = context.session_id.as_deref() {
            self.registry.mark_sticky_session(session_id, winner.agent.id());
        }
        let agent = self
            .registry
            .record_assignment(winner.agent.id())
            .unwrap_or_else(|| winner.agent.clone());

        let sticky = match sticky_agent_id.as_deref() {
            Some(sticky) if sticky_applied && sticky == winner.agent.id() => StickyOutcome::Honored,
            Some(_) if sticky_applied => StickyOutcome::Overridden,
            _ => StickyOutcome::None,
        };

        let fallbacks: Vec<AgentRecord> = ranked.into_iter().map(|c| c.agent).collect();

        let reason = compose_reason(&ReasonParts {
            stage_id,
            lifecycle,
            winner: &winner,
            dependencies: &dependencies,
            sticky,
            degraded_fallback,
            fallbacks: &fallbacks,
        });

        debug!(
            "Selected '{}' over {} fallback(s) for stage '{}'",
            winner.agent.id(),
            fallbacks.len(),
            stage_id
        );

        Ok(StageRoute {
            stage_id: stage_id.to_string(),
            lifecycle,
            agent,
            fallbacks,
            score: winner,
            sticky_applied,
            sticky,
            degraded_fallback,
            dependencies,
            reason,
        })
    }

    /// Session binding in the routed lifecycle first, then the caller's previous agent
    fn resolve_sticky_agent_id(
        &self,
        context: &RoutingContext,
        lifecycle: LifecycleStage,
    ) -> Option<String> {
        context
            .session_id
            .as_deref()
            .and_then(|session_id| self.registry.get_sticky_agent_for(session_id, lifecycle))
            .map(|agent| agent.registration.id)
            .or_else(|| context.previous_agent_id.clone())
    }
}

struct ReasonParts<'a> {
    stage_id: &'a str,
    lifecycle: LifecycleStage,
    winner: &'a AgentScoreBreakdown,
    dependencies: &'a [String],
    sticky: StickyOutcome,
    degraded_fallback: bool,
    fallbacks: &'a [AgentRecord],
}

/// Single-line `key=value` audit string, stable enough to grep
fn compose_reason(parts: &ReasonParts<'_>) -> String {
    let winner = &parts.winner.agent;

    format!(
        "stage={} lifecycle={} agent={:?} agent_id={} dependencies=[{}] capability_match={}/{} sticky={} mismatches=[{}] degraded_fallback={} fallbacks=[{}]",
        parts.stage_id,
        parts.lifecycle,
        winner.name(),
        winner.id(),
        parts.dependencies.join(","),
        parts.winner.matched_count(),
        parts.winner.required_count,
        parts.sticky.as_str(),
        parts.winner.capability_mismatches.join(","),
        parts.degraded_fallback,
        parts
            .fallbacks
            .iter()
            .map(|agent| format!("{:?}", agent.name()))
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentRegistration, AgentStatus};
    use crate::error::StageFailure;
    use crate::workflow::{WorkflowGraph, WorkflowStage};

    fn layer() -> RoutingLayer {
        RoutingLayer::new(Arc::new(AgentRegistry::default()), RoutingScorer::default())
    }

    fn register(layer: &RoutingLayer, id: &str, name: &str, capabilities: &[&str]) {
        layer
            .registry()
            .register_agent(
                AgentRegistration::new(id, name, LifecycleStage::Target)
                    .with_capabilities(capabilities.iter().copied())
                    .with_region("us"),
            )
            .unwrap();
    }

    fn graph() -> WorkflowGraph {
        WorkflowGraph::new()
            .with_stage(WorkflowStage::new("discover", LifecycleStage::Opportunity))
            .with_stage(
                WorkflowStage::new("business-case", LifecycleStage::Target)
                    .with_capabilities(["x", "y"]),
            )
            .with_transition("discover", "business-case")
    }

    #[test]
    fn test_unknown_stage() {
        let layer = layer();
        let err = layer
            .route_stage(&graph(), "missing", &RoutingContext::new())
            .unwrap_err();

        assert_eq!(err.stage_id(), Some("missing"));
        assert!(matches!(
            err,
            RouterError::Stage {
                failure: StageFailure::StageNotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_pool_is_exhaustion() {
        let layer = layer();
        let err = layer
            .route_stage(&graph(), "business-case", &RoutingContext::new())
            .unwrap_err();

        assert!(err.is_exhaustion());
        assert_eq!(err.stage_id(), Some("business-case"));
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_reason_format() {
        let layer = layer();
        register(&layer, "a", "Agent A", &["x"]);
        register(&layer, "b", "Agent B", &["x", "y"]);

        let route = layer
            .route_stage(
                &graph(),
                "business-case",
                &RoutingContext::new().with_region("us"),
            )
            .unwrap();

        assert_eq!(
            route.reason,
            "stage=business-case lifecycle=target agent=\"Agent B\" agent_id=b dependencies=[discover] capability_match=2/2 sticky=none mismatches=[] degraded_fallback=false fallbacks=[\"Agent A\"]"
        );
    }

    #[test]
    fn test_lifecycle_override_routes_other_pool() {
        let layer = layer();
        register(&layer, "t1", "Target", &["x", "y"]);
        layer
            .registry()
            .register_agent(AgentRegistration::new("i1", "Integrity", LifecycleStage::Integrity))
            .unwrap();

        let context = RoutingContext::new().with_lifecycle_override(LifecycleStage::Integrity);
        let route = layer.route_stage(&graph(), "business-case", &context).unwrap();

        assert_eq!(route.agent_id(), "i1");
        assert_eq!(route.lifecycle, LifecycleStage::Integrity);
        assert_eq!(route.score.capability_mismatches, vec!["x", "y"]);
    }

    #[test]
    fn test_healthy_preferred_over_higher_scoring_degraded() {
        let layer = layer();
        register(&layer, "strong", "Strong", &["x", "y"]);
        register(&layer, "weak", "Weak", &[]);
        layer.registry().record_failure("strong");
        layer.registry().record_failure("strong");

        let route = layer
            .route_stage(&graph(), "business-case", &RoutingContext::new())
            .unwrap();

        assert_eq!(route.agent_id(), "weak");
        assert!(!route.degraded_fallback);
        assert_eq!(route.fallback_ids(), vec!["strong"]);
    }

    #[test]
    fn test_degraded_selected_when_no_healthy_agent() {
        let layer = layer();
        register(&layer, "d1", "Degraded", &["x", "y"]);
        layer
            .registry()
            .update_heartbeat("d1", None, Some(AgentStatus::Degraded));

        let route = layer
            .route_stage(&graph(), "business-case", &RoutingContext::new())
            .unwrap();

        assert_eq!(route.agent_id(), "d1");
        assert!(route.degraded_fallback);
        assert!(route.reason.contains("degraded_fallback=true"));
    }

    #[test]
    fn test_side_effects_bump_load_and_pin_session() {
        let layer = layer();
        register(&layer, "a", "A", &["x", "y"]);

        let context = RoutingContext::new().with_session("s1");
        let route = layer.route_stage(&graph(), "business-case", &context).unwrap();

        assert!((route.agent.load() - 0.1).abs() < 1e-9);
        assert_eq!(route.score.agent.load(), 0.0);
        assert!(route.agent.holds_session("s1"));
        assert_eq!(layer.registry().get_sticky_agent("s1").unwrap().id(), "a");
    }

    #[test]
    fn test_no_session_no_binding() {
        let layer = layer();
        register(&layer, "a", "A", &["x", "y"]);

        let route = layer
            .route_stage(&graph(), "business-case", &RoutingContext::new())
            .unwrap();
        assert!(route.agent.state.sticky_sessions.is_empty());
    }

    #[test]
    fn test_previous_agent_used_as_affinity_hint() {
        let layer = layer();
        register(&layer, "a", "A", &["x", "y"]);
        register(&layer, "b", "B", &["x", "y"]);

        let context = RoutingContext::new().with_previous_agent("b");
        let route = layer.route_stage(&graph(), "business-case", &context).unwrap();

        assert_eq!(route.agent_id(), "b");
        assert_eq!(route.sticky, StickyOutcome::Honored);
        assert!(route.agent.state.sticky_sessions.is_empty());
    }

    #[test]
    fn test_session_binding_in_other_lifecycle_is_ignored() {
        let layer = layer();
        layer
            .registry()
            .register_agent(AgentRegistration::new("a-scout", "Scout", LifecycleStage::Opportunity))
            .unwrap();
        register(&layer, "t1", "T1", &["x", "y"]);
        register(&layer, "t2", "T2", &["x", "y"]);
        let context = RoutingContext::new().with_session("s1");

        layer.route_stage(&graph(), "discover", &context).unwrap();
        let first = layer.route_stage(&graph(), "business-case", &context).unwrap();
        let second = layer.route_stage(&graph(), "business-case", &context).unwrap();

        assert_eq!(second.agent_id(), first.agent_id());
        assert!(second.sticky_applied);
        assert_eq!(second.sticky, StickyOutcome::Honored);
        assert!(layer.registry().get_agent("a-scout").unwrap().holds_session("s1"));
    }

    #[test]
    fn test_skip_sticky_for_unavailable_agents() {
        let layer = layer().with_options(RoutingOptions {
            skip_sticky_for_unavailable: true,
        });
        register(&layer, "a", "A", &["x", "y"]);
        register(&layer, "b", "B", &["x", "y"]);
        layer.registry().mark_sticky_session("s1", "b");
        layer
            .registry()
            .update_heartbeat("b", None, Some(AgentStatus::Degraded));

        let context = RoutingContext::new().with_session("s1");
        let route = layer.route_stage(&graph(), "business-case", &context).unwrap();

        assert_eq!(route.agent_id(), "a");
        assert!(!route.sticky_applied);
        assert_eq!(route.sticky, StickyOutcome::None);
        // Original binding stays for eventual recovery.
        assert!(layer.registry().get_agent("b").unwrap().holds_session("s1"));
    }
}
