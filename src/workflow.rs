//! Workflow stage definitions consumed by the routing layer
//!
//! The orchestrator owns the workflow DAG. Routing only needs two questions
//! answered about it, captured by the [`StageGraph`] trait: what a stage
//! requires, and which stages feed into it.

use crate::agent::LifecycleStage;
use serde::{Deserialize, Serialize};

/// A stage that needs an agent assignment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStage {
    pub id: String,
    /// Lifecycle class of agent that executes this stage
    pub agent_type: LifecycleStage,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
}

impl WorkflowStage {
    pub fn new<S: Into<String>>(id: S, agent_type: LifecycleStage) -> Self {
        Self {
            id: id.into(),
            agent_type,
            required_capabilities: Vec::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }
}

/// Directed edge: `from` must run before `to`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTransition {
    pub from: String,
    pub to: String,
}

/// Read-only view of a workflow DAG
pub trait StageGraph: Send + Sync {
    /// Look up a stage definition by id
    fn stage(&self, stage_id: &str) -> Option<&WorkflowStage>;

    /// Upstream stage ids feeding into `stage_id`, in declaration order
    fn dependencies(&self, stage_id: &str) -> Vec<String>;
}

/// Plain workflow graph: a stage list plus transition edges
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub stages: Vec<WorkflowStage>,
    #[serde(default)]
    pub transitions: Vec<StageTransition>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: WorkflowStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn with_transition<F: Into<String>, T: Into<String>>(mut self, from: F, to: T) -> Self {
        self.transitions.push(StageTransition {
            from: from.into(),
            to: to.into(),
        });
        self
    }
}

impl StageGraph for WorkflowGraph {
    fn stage(&self, stage_id: &str) -> Option<&WorkflowStage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    fn dependencies(&self, stage_id: &str) -> Vec<String> {
        let mut dependencies: Vec<String> = Vec::new();
        for transition in self.transitions.iter().filter(|t| t.to == stage_id) {
            if !dependencies.contains(&transition.from) {
                dependencies.push(transition.from.clone());
            }
        }
        dependencies
    }
}
