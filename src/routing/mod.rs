//! Routing Infrastructure
//!
//! Two pieces, composed bottom-up:
//!
//! ## Scorer (scorer.rs)
//!
//! Pure multi-factor ranking of candidate agents against a stage's capability
//! requirements and the caller's routing context. No registry access.
//!
//! ## Routing Layer (layer.rs)
//!
//! Resolves the stage from the workflow graph, pulls the candidate pool from the
//! [`AgentRegistry`](crate::agent::AgentRegistry), ranks it, records the assignment and
//! returns an explained [`StageRoute`].

pub mod context;
pub mod layer;
pub mod scorer;

pub use context::RoutingContext;
pub use layer::{RoutingLayer, RoutingOptions, StageRoute, StickyOutcome};
pub use scorer::{AgentScoreBreakdown, RoutingScorer, ScoredCandidates, ScoringWeights};
