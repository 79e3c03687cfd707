//! Routing Scorer
//!
//! Pure ranking of a candidate pool for one stage/context pair. The scorer holds
//! only its weight vector; it never reads or writes the registry.
//!
//! ```text
//! total = capability * w_c + load * w_l + proximity * w_p + stickiness * w_s
//! ```

use crate::agent::AgentRecord;
use crate::error::{RouterError, RouterResult};
use crate::routing::context::RoutingContext;
use crate::workflow::WorkflowStage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Proximity when both regions are known and match
pub const PROXIMITY_SAME_REGION: f64 = 1.0;
/// Proximity when either side leaves region unspecified
pub const PROXIMITY_UNKNOWN_REGION: f64 = 0.5;
/// Proximity when both regions are known and differ
pub const PROXIMITY_OTHER_REGION: f64 = 0.25;

/// Weight vector applied to the four component scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    #[serde(default = "default_capability_weight")]
    pub capability: f64,
    #[serde(default = "default_component_weight")]
    pub load: f64,
    #[serde(default = "default_component_weight")]
    pub proximity: f64,
    #[serde(default = "default_component_weight")]
    pub stickiness: f64,
}

fn default_capability_weight() -> f64 {
    0.4
}

fn default_component_weight() -> f64 {
    0.2
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            capability: default_capability_weight(),
            load: default_component_weight(),
            proximity: default_component_weight(),
            stickiness: default_component_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.capability + self.load + self.proximity + self.stickiness
    }

    /// Reject negative or non-finite weights and an all-zero vector
    ///
    /// A sum other than 1.0 is accepted with a warning.
    pub fn validate(&self) -> RouterResult<()> {
        let named = [
            ("capability", self.capability),
            ("load", self.load),
            ("proximity", self.proximity),
            ("stickiness", self.stickiness),
        ];

        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RouterError::invalid_weights(format!(
                    "{name} weight must be a non-negative number, got {weight}"
                )));
            }
        }

        let sum = self.sum();
        if sum <= 0.0 {
            return Err(RouterError::invalid_weights(
                "at least one weight must be positive",
            ));
        }
        if (sum - 1.0).abs() > 1e-6 {
            warn!("Scoring weights sum to {:.3}, expected 1.0", sum);
        }

        Ok(())
    }
}

/// Component scores for one candidate
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentScoreBreakdown {
    pub agent: AgentRecord,
    pub total: f64,
    pub capability: f64,
    pub load: f64,
    pub proximity: f64,
    pub stickiness: f64,
    /// Required capabilities this agent lacks
    pub capability_mismatches: Vec<String>,
    /// Size of the effective requirement set
    pub required_count: usize,
}

impl AgentScoreBreakdown {
    pub fn matched_count(&self) -> usize {
        self.required_count - self.capability_mismatches.len()
    }
}

/// Ranked candidates, best first
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredCandidates {
    pub ranked: Vec<AgentScoreBreakdown>,
    /// True when the sticky agent was present in the pool
    pub sticky_applied: bool,
}

/// Stateless multi-factor ranker
#[derive(Debug, Clone, Default)]
pub struct RoutingScorer {
    weights: ScoringWeights,
}

impl RoutingScorer {
    /// Create a scorer after validating the weight vector
    pub fn new(weights: ScoringWeights) -> RouterResult<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank candidates for a stage; ties keep their input order
    pub fn score_candidates(
        &self,
        stage: &WorkflowStage,
        candidates: &[AgentRecord],
        context: &RoutingContext,
        sticky_agent_id: Option<&str>,
    ) -> ScoredCandidates {
        let required = dedup_capabilities(context.effective_capabilities(&stage.required_capabilities));

        let mut ranked: Vec<AgentScoreBreakdown> = candidates
            .iter()
            .map(|agent| self.score_one(agent, &required, context, sticky_agent_id))
            .collect();

        // Vec::sort_by is stable.
        ranked.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let sticky_applied = sticky_agent_id
            .map(|sticky| candidates.iter().any(|agent| agent.id() == sticky))
            .unwrap_or(false);

        debug!(
            stage_id = %stage.id,
            candidates = ranked.len(),
            sticky_applied,
            "Scored candidate pool"
        );

        ScoredCandidates {
            ranked,
            sticky_applied,
        }
    }

    fn score_one(
        &self,
        agent: &AgentRecord,
        required: &[&str],
        context: &RoutingContext,
        sticky_agent_id: Option<&str>,
    ) -> AgentScoreBreakdown {
        let capability_mismatches: Vec<String> = required
            .iter()
            .filter(|capability| !agent.has_capability(capability))
            .map(|capability| capability.to_string())
            .collect();

        let capability = capability_score(required.len(), capability_mismatches.len());
        let load = load_score(agent.load());
        let proximity = proximity_score(
            agent.registration.region.as_deref(),
            context.region.as_deref(),
        );
        let stickiness = if sticky_agent_id == Some(agent.id()) {
            1.0
        } else {
            0.0
        };

        let total = capability * self.weights.capability
            + load * self.weights.load
            + proximity * self.weights.proximity
            + stickiness * self.weights.stickiness;

        AgentScoreBreakdown {
            agent: agent.clone(),
            total,
            capability,
            load,
            proximity,
            stickiness,
            capability_mismatches,
            required_count: required.len(),
        }
    }
}

/// Unique requirements, first spelling wins, compared case-insensitively
fn dedup_capabilities(capabilities: &[String]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::with_capacity(capabilities.len());
    for capability in capabilities {
        if !unique.iter().any(|seen| seen.eq_ignore_ascii_case(capability)) {
            unique.push(capability);
        }
    }
    unique
}

fn capability_score(required: usize, unmet: usize) -> f64 {
    if required == 0 {
        1.0
    } else {
        (required - unmet) as f64 / required as f64
    }
}

fn load_score(load: f64) -> f64 {
    1.0 - load.min(1.0)
}

fn proximity_score(agent_region: Option<&str>, requested_region: Option<&str>) -> f64 {
    match (agent_region, requested_region) {
        (Some(agent), Some(requested)) if agent.eq_ignore_ascii_case(requested) => {
            PROXIMITY_SAME_REGION
        }
        (Some(_), Some(_)) => PROXIMITY_OTHER_REGION,
        _ => PROXIMITY_UNKNOWN_REGION,
    }
}
