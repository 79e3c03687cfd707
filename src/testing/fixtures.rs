//! Shared fixtures for unit and integration tests

use crate::agent::{AgentRegistration, AgentRegistry, LifecycleStage};
use crate::routing::{RoutingLayer, RoutingScorer, ScoringWeights};
use crate::workflow::{WorkflowGraph, WorkflowStage};
use std::sync::Arc;
use std::time::Duration;

/// Heartbeat timeout used by fixture registries
pub const TEST_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Registration whose name equals its id
pub fn registration(id: &str, lifecycle: LifecycleStage) -> AgentRegistration {
    AgentRegistration::new(id, id, lifecycle)
}

/// Registration with capabilities and a region
pub fn registration_with(
    id: &str,
    name: &str,
    lifecycle: LifecycleStage,
    capabilities: &[&str],
    region: Option<&str>,
) -> AgentRegistration {
    let registration = AgentRegistration::new(id, name, lifecycle)
        .with_capabilities(capabilities.iter().copied());
    match region {
        Some(region) => registration.with_region(region),
        None => registration,
    }
}

/// Registry pre-populated with the given registrations
///
/// Panics on a duplicate id, which is always a fixture bug.
pub fn registry_with(registrations: Vec<AgentRegistration>) -> Arc<AgentRegistry> {
    let registry = Arc::new(AgentRegistry::new(TEST_HEARTBEAT_TIMEOUT));
    for registration in registrations {
        let id = registration.id.clone();
        if registry.register_agent(registration).is_err() {
            panic!("fixture registered duplicate agent id: {id}");
        }
    }
    registry
}

/// Routing layer with default weights over `registry`
pub fn layer_for(registry: Arc<AgentRegistry>) -> RoutingLayer {
    RoutingLayer::new(registry, RoutingScorer::default())
}

/// Routing layer with custom weights over `registry`
///
/// Panics on invalid weights.
pub fn layer_with_weights(registry: Arc<AgentRegistry>, weights: ScoringWeights) -> RoutingLayer {
    match RoutingScorer::new(weights) {
        Ok(scorer) => RoutingLayer::new(registry, scorer),
        Err(e) => panic!("fixture weights rejected: {e}"),
    }
}

/// Two-stage pipeline: `discover` (opportunity) feeds `business-case` (target)
///
/// `business-case` requires `finance` and `roi-modeling`.
pub fn sample_graph() -> WorkflowGraph {
    WorkflowGraph::new()
        .with_stage(
            WorkflowStage::new("discover", LifecycleStage::Opportunity)
                .with_capabilities(["research"]),
        )
        .with_stage(
            WorkflowStage::new("business-case", LifecycleStage::Target)
                .with_capabilities(["finance", "roi-modeling"]),
        )
        .with_transition("discover", "business-case")
}

/// Agent A (partial match, loaded, remote) and Agent B (full match, idle, local)
/// in the target pool, plus one opportunity agent
pub fn sample_registry() -> Arc<AgentRegistry> {
    let registry = registry_with(vec![
        registration_with(
            "a",
            "Agent A",
            LifecycleStage::Target,
            &["finance"],
            Some("us-east"),
        ),
        registration_with(
            "b",
            "Agent B",
            LifecycleStage::Target,
            &["finance", "roi-modeling"],
            Some("eu-west"),
        ),
        registration_with(
            "scout",
            "Scout",
            LifecycleStage::Opportunity,
            &["research"],
            Some("eu-west"),
        ),
    ]);
    registry.set_load_for_test("a", 0.6);
    registry.set_load_for_test("b", 0.2);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::StageGraph;

    #[test]
    fn test_sample_registry_shape() {
        let registry = sample_registry();
        assert_eq!(registry.agent_count(), 3);
        assert_eq!(registry.get_agent("a").unwrap().load(), 0.6);
        assert_eq!(registry.get_agent("b").unwrap().load(), 0.2);
    }

    #[test]
    fn test_sample_graph_dependencies() {
        let graph = sample_graph();
        assert_eq!(graph.dependencies("business-case"), vec!["discover"]);
        assert!(graph.dependencies("discover").is_empty());
    }

    #[test]
    #[should_panic(expected = "duplicate")]
    fn test_registry_with_rejects_duplicates() {
        registry_with(vec![
            registration("x", LifecycleStage::Target),
            registration("x", LifecycleStage::Target),
        ]);
    }
}
