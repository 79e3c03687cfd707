//! Agent records and the registry that owns their health and load state
//!
//! Registration data is immutable once supplied; everything that changes over
//! time lives in [`AgentState`] and is written only through [`AgentRegistry`].

pub mod record;
pub mod registry;

pub use record::*;
pub use registry::*;
