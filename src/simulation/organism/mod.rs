//! Organism module containing construction, movement and replication.

mod lifecycle;
mod movement;
mod replication;

// Re-export everything from the lifecycle module
pub use lifecycle::*;

pub use replication::ReplicationRules;
