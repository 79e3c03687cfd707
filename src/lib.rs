//! Agent Router - Rust Implementation
//!
//! In-memory agent registry, health tracking and explainable stage routing for
//! workflow orchestrators.
//!
//! # Overview
//!
//! This crate provides the routing core an orchestrator embeds, including:
//! - Agent registry with heartbeat, failure and load tracking
//! - Multi-factor scoring over capability, load, proximity and stickiness
//! - Stage routing with sticky sessions, degraded fallback and audit reasons
//! - Configuration, metrics and health checks for the surrounding service
//!
//! # Quick Start
//!
//! ```rust
//! use agent_router::agent::{AgentRegistration, AgentRegistry, LifecycleStage};
//! use agent_router::routing::{RoutingContext, RoutingLayer, RoutingScorer};
//! use agent_router::workflow::{WorkflowGraph, WorkflowStage};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(AgentRegistry::default());
//! registry
//!     .register_agent(
//!         AgentRegistration::new("fin-1", "Finance Analyst", LifecycleStage::Target)
//!             .with_capabilities(["finance", "roi-modeling"])
//!             .with_region("eu-west"),
//!     )
//!     .unwrap();
//!
//! let graph = WorkflowGraph::new()
//!     .with_stage(WorkflowStage::new("discover", LifecycleStage::Opportunity))
//!     .with_stage(
//!         WorkflowStage::new("business-case", LifecycleStage::Target)
//!             .with_capabilities(["finance"]),
//!     )
//!     .with_transition("discover", "business-case");
//!
//! let layer = RoutingLayer::new(registry, RoutingScorer::default());
//! let context = RoutingContext::new()
//!     .with_session("session-42")
//!     .with_region("eu-west");
//!
//! let route = layer.route_stage(&graph, "business-case", &context).unwrap();
//! assert_eq!(route.agent_id(), "fin-1");
//! assert_eq!(route.dependencies, vec!["discover"]);
//! println!("{}", route.reason);
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod health;
pub mod observability;
pub mod routing;
pub mod simulation;
pub mod testing;
pub mod workflow;

pub use agent::{
    AgentRecord, AgentRegistration, AgentRegistry, AgentStatus, LifecycleStage,
    PoolStatusSummary,
};
pub use config::{ConfigError, RouterConfig};
pub use error::{RouterError, RouterResult, StageFailure};
pub use routing::{
    RoutingContext, RoutingLayer, RoutingOptions, RoutingScorer, ScoringWeights, StageRoute,
    StickyOutcome,
};
pub use workflow::{StageGraph, StageTransition, WorkflowGraph, WorkflowStage};
