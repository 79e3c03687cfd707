//! Error types for agent registration and stage routing
//!
//! Every fatal routing-layer condition is wrapped in [`RouterError::Stage`] so the
//! failing stage id always travels with the error. Unknown-agent conditions are
//! not errors at all; registry methods return `None` for them.

use crate::agent::LifecycleStage;
use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for registry and routing operations
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Duplicate agent id: {agent_id}")]
    DuplicateAgent { agent_id: String },

    #[error("Routing failed for stage '{stage_id}': {failure}")]
    Stage {
        stage_id: String,
        failure: StageFailure,
    },

    #[error("Invalid scoring weights: {message}")]
    InvalidWeights { message: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Terminal reasons a single stage could not be routed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("stage not found in workflow graph")]
    StageNotFound,

    #[error("no agents available for lifecycle stage '{lifecycle}'")]
    NoAgentsAvailable { lifecycle: LifecycleStage },

    #[error("no routable agents after scoring")]
    NoRoutableAgents,
}

impl RouterError {
    /// Create duplicate registration error
    pub fn duplicate_agent<S: Into<String>>(agent_id: S) -> Self {
        Self::DuplicateAgent {
            agent_id: agent_id.into(),
        }
    }

    /// Create unknown stage error
    pub fn stage_not_found<S: Into<String>>(stage_id: S) -> Self {
        Self::stage(stage_id, StageFailure::StageNotFound)
    }

    /// Create empty candidate pool error
    pub fn no_agents_available<S: Into<String>>(stage_id: S, lifecycle: LifecycleStage) -> Self {
        Self::stage(stage_id, StageFailure::NoAgentsAvailable { lifecycle })
    }

    /// Create empty ranking error
    pub fn no_routable_agents<S: Into<String>>(stage_id: S) -> Self {
        Self::stage(stage_id, StageFailure::NoRoutableAgents)
    }

    /// Create invalid weights error
    pub fn invalid_weights<S: Into<String>>(message: S) -> Self {
        Self::InvalidWeights {
            message: message.into(),
        }
    }

    fn stage<S: Into<String>>(stage_id: S, failure: StageFailure) -> Self {
        Self::Stage {
            stage_id: stage_id.into(),
            failure,
        }
    }

    /// Stage id attached to a routing failure, if this is one
    pub fn stage_id(&self) -> Option<&str> {
        match self {
            RouterError::Stage { stage_id, .. } => Some(stage_id),
            _ => None,
        }
    }

    /// Stable error code for audit sinks
    pub fn code(&self) -> &'static str {
        match self {
            RouterError::DuplicateAgent { .. } => "DUPLICATE_AGENT",
            RouterError::Stage { failure, .. } => match failure {
                StageFailure::StageNotFound => "STAGE_NOT_FOUND",
                StageFailure::NoAgentsAvailable { .. } => "NO_AGENTS_AVAILABLE",
                StageFailure::NoRoutableAgents => "NO_ROUTABLE_AGENTS",
            },
            RouterError::InvalidWeights { .. } => "INVALID_WEIGHTS",
            RouterError::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// True for the two routing-exhaustion outcomes
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            RouterError::Stage {
                failure: StageFailure::NoAgentsAvailable { .. } | StageFailure::NoRoutableAgents,
                ..
            }
        )
    }
}

/// Result type for registry and routing operations
pub type RouterResult<T> = Result<T, RouterError>;
