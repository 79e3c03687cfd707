//! Agent identity and health records
//!
//! An [`AgentRecord`] pairs the immutable [`AgentRegistration`] supplied by the
//! caller with the mutable [`AgentState`] owned by the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Class of workflow work an agent performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    Opportunity,
    Target,
    Realization,
    Expansion,
    Integrity,
    Orchestrator,
}

impl LifecycleStage {
    /// All lifecycle classes in workflow order
    pub const ALL: [LifecycleStage; 6] = [
        LifecycleStage::Opportunity,
        LifecycleStage::Target,
        LifecycleStage::Realization,
        LifecycleStage::Expansion,
        LifecycleStage::Integrity,
        LifecycleStage::Orchestrator,
    ];

    /// Lowercase tag used in serialized form and audit reasons
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::Opportunity => "opportunity",
            LifecycleStage::Target => "target",
            LifecycleStage::Realization => "realization",
            LifecycleStage::Expansion => "expansion",
            LifecycleStage::Integrity => "integrity",
            LifecycleStage::Orchestrator => "orchestrator",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized lifecycle tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown lifecycle stage: {0}")]
pub struct UnknownLifecycleStage(pub String);

impl FromStr for LifecycleStage {
    type Err = UnknownLifecycleStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        LifecycleStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == lowered)
            .ok_or_else(|| UnknownLifecycleStage(s.to_string()))
    }
}

/// Health status of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Healthy,
    Degraded,
    Offline,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Healthy => "healthy",
            AgentStatus::Degraded => "degraded",
            AgentStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity supplied when an agent is registered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRegistration {
    /// Unique agent identifier
    pub id: String,
    /// Human-readable name used in audit reasons
    pub name: String,
    /// Class of work this agent performs
    pub lifecycle_stage: LifecycleStage,
    /// Capability tags (matched case-insensitively)
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AgentRegistration {
    /// Create a registration with no capabilities, region or endpoint
    pub fn new<I: Into<String>, N: Into<String>>(
        id: I,
        name: N,
        lifecycle_stage: LifecycleStage,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lifecycle_stage,
            capabilities: Vec::new(),
            region: None,
            endpoint: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_metadata<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Mutable health and load state, written only by the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    /// Approximate load in [0, 1]
    pub load: f64,
    pub status: AgentStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub consecutive_failures: u32,
    /// Sessions currently pinned to this agent
    pub sticky_sessions: BTreeSet<String>,
}

impl AgentState {
    /// Fresh state for a newly registered agent
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            load: 0.0,
            status: AgentStatus::Healthy,
            last_heartbeat: now,
            consecutive_failures: 0,
            sticky_sessions: BTreeSet::new(),
        }
    }
}

/// Registration plus state; the only entity the registry stores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRecord {
    #[serde(flatten)]
    pub registration: AgentRegistration,
    #[serde(flatten)]
    pub state: AgentState,
}

impl AgentRecord {
    pub fn id(&self) -> &str {
        &self.registration.id
    }

    pub fn name(&self) -> &str {
        &self.registration.name
    }

    pub fn lifecycle_stage(&self) -> LifecycleStage {
        self.registration.lifecycle_stage
    }

    pub fn status(&self) -> AgentStatus {
        self.state.status
    }

    pub fn load(&self) -> f64 {
        self.state.load
    }

    pub fn is_healthy(&self) -> bool {
        self.state.status == AgentStatus::Healthy
    }

    pub fn is_offline(&self) -> bool {
        self.state.status == AgentStatus::Offline
    }

    /// Check if agent advertises a capability (case-insensitive)
    pub fn has_capability(&self, capability: &str) -> bool {
        self.registration
            .capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(capability))
    }

    /// Check if a session is pinned to this agent
    pub fn holds_session(&self, session_id: &str) -> bool {
        self.state.sticky_sessions.contains(session_id)
    }
}

/// Clamp a load value into [0, 1]; non-numbers collapse to 0
pub(crate) fn clamp_load(load: f64) -> f64 {
    if load.is_nan() {
        0.0
    } else {
        load.clamp(0.0, 1.0)
    }
}
