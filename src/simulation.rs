//! Offline replay of routing scenarios
//!
//! A scenario is a TOML document describing an agent pool, a workflow graph and
//! an ordered list of route requests. Replaying it through a [`RoutingLayer`]
//! yields one [`RouteOutcome`] per request, so weight and option changes can be
//! evaluated without running an orchestrator.
//!
//! ```toml
//! [[agents]]
//! id = "b"
//! name = "Agent B"
//! lifecycle_stage = "target"
//! capabilities = ["finance", "roi-modeling"]
//! region = "eu-west"
//! load = 0.2
//!
//! [[graph.stages]]
//! id = "business-case"
//! agent_type = "target"
//! required_capabilities = ["finance"]
//!
//! [[requests]]
//! stage = "business-case"
//! context = { session_id = "s1", region = "eu-west" }
//! ```

use crate::agent::{AgentRegistration, AgentRegistry, AgentStatus};
use crate::config::ConfigError;
use crate::error::RouterResult;
use crate::routing::{RoutingContext, RoutingLayer, StageRoute};
use crate::workflow::WorkflowGraph;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Agent entry with optional starting state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioAgent {
    #[serde(flatten)]
    pub registration: AgentRegistration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    /// Failures recorded after the initial heartbeat
    #[serde(default)]
    pub failures: u32,
}

/// One routing request in replay order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteRequest {
    pub stage: String,
    #[serde(default)]
    pub context: RoutingContext,
    /// Release the selected agent's load once routed
    #[serde(default)]
    pub release_after: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub agents: Vec<ScenarioAgent>,
    #[serde(default)]
    pub graph: WorkflowGraph,
    #[serde(default)]
    pub requests: Vec<RouteRequest>,
}

/// Result of replaying one request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    Routed {
        request: usize,
        route: Box<StageRoute>,
    },
    Failed {
        request: usize,
        stage_id: String,
        code: &'static str,
        message: String,
    },
}

impl RouteOutcome {
    pub fn is_routed(&self) -> bool {
        matches!(self, RouteOutcome::Routed { .. })
    }
}

impl Scenario {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Register every agent and apply its starting state
    pub fn seed(&self, registry: &AgentRegistry) -> RouterResult<()> {
        for agent in &self.agents {
            let id = agent.registration.id.clone();
            registry.register_agent(agent.registration.clone())?;

            if agent.load.is_some() || agent.status.is_some() {
                registry.update_heartbeat(&id, agent.load, agent.status);
            }
            for _ in 0..agent.failures {
                registry.record_failure(&id);
            }
        }

        debug!("Seeded {} scenario agent(s)", self.agents.len());
        Ok(())
    }

    /// Seed the layer's registry and route every request in order
    ///
    /// Routing failures become [`RouteOutcome::Failed`] entries; only seeding
    /// errors abort the replay.
    pub fn replay(&self, layer: &RoutingLayer) -> RouterResult<Vec<RouteOutcome>> {
        self.seed(layer.registry())?;

        let outcomes: Vec<RouteOutcome> = self
            .requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                match layer.route_stage(&self.graph, &request.stage, &request.context) {
                    Ok(route) => {
                        if request.release_after {
                            layer.registry().record_release(route.agent_id());
                        }
                        RouteOutcome::Routed {
                            request: index,
                            route: Box::new(route),
                        }
                    }
                    Err(e) => RouteOutcome::Failed {
                        request: index,
                        stage_id: request.stage.clone(),
                        code: e.code(),
                        message: e.to_string(),
                    },
                }
            })
            .collect();

        info!(
            "Replayed {} request(s), {} routed",
            outcomes.len(),
            outcomes.iter().filter(|o| o.is_routed()).count()
        );

        Ok(outcomes)
    }
}
