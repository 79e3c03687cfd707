//! Per-request routing context supplied by the caller

use crate::agent::LifecycleStage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied hints for one routing request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoutingContext {
    /// Session used for sticky affinity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Preferred region for proximity scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Replaces the stage's own capability list when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_capabilities: Option<Vec<String>>,
    /// Agent that handled the previous step, used as affinity when no session binding exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_agent_id: Option<String>,
    /// Replaces the stage's declared agent type when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_override: Option<LifecycleStage>,
    /// Open extension map for caller-specific hints
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub hints: HashMap<String, serde_json::Value>,
}

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_required_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = Some(capabilities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_previous_agent<S: Into<String>>(mut self, agent_id: S) -> Self {
        self.previous_agent_id = Some(agent_id.into());
        self
    }

    pub fn with_lifecycle_override(mut self, stage: LifecycleStage) -> Self {
        self.lifecycle_override = Some(stage);
        self
    }

    pub fn with_hint<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }

    /// Context override first, then the stage's own list
    pub fn effective_capabilities<'a>(&'a self, stage_capabilities: &'a [String]) -> &'a [String] {
        self.required_capabilities
            .as_deref()
            .unwrap_or(stage_capabilities)
    }
}
