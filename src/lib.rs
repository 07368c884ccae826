//! # Aptus - Artificial Life Simulation
//!
//! A simulation of multi-cell organisms whose body layout is encoded in a
//! mutable string genome. Organisms drift across a bounded world, eat food
//! that falls from the sky, split in two when they have gathered enough
//! energy, and fight whenever two of them land on the same square.
//!
//! ## Features
//!
//! - String genomes with doubling, snipping, halving, reversal and cleaning
//!   mutation operators
//! - Movement with boundary reversal and wandering organisms
//! - Replication with energy halving and optional mutation
//! - Force-based collisions between organisms
//! - Food that expires and is left behind by dead organisms
//! - A parallel three-phase tick engine
//! - Food drops paced by ticks instead of wall-clock time
//! - Lineage history of the last organism to die
//!
//! ## Core Modules
//!
//! - [`simulation::genome`] - Genome encoding and mutation
//! - [`simulation::organism`] - Organism behavior and state
//! - [`simulation::environment`] - Main simulation logic
//! - [`simulation::food`] - Food items for organisms
//! - [`simulation::runner`] - Run-state machine
//! - [`simulation::events`] - Event system for thread-safe updates

/// Core simulation logic and data structures.
pub mod simulation {
    /// Cells, the building blocks of organisms.
    pub mod cell;
    /// Simulation configuration.
    pub mod config;
    /// Shared random generator, id allocators and generation counter.
    pub mod context;
    /// The world and its three-phase tick engine.
    pub mod environment;
    /// Error types.
    pub mod error;
    /// Event system for thread-safe state updates.
    pub mod events;
    /// Food items that organisms can consume.
    pub mod food;
    /// The tick-paced food-drop loop.
    pub mod food_drop;
    /// String-encoded genomes and their mutation operators.
    pub mod genome;
    /// Geometric utility functions for bounds, extents and food sweeps.
    pub mod geometric_utils;
    /// Replay history of a lineage.
    pub mod history;
    /// Trait for locatable entities.
    ///
    /// The [`locatable::Locatable`] trait is implemented by every entity with
    /// a lattice position (Cell, Food).
    pub mod locatable;
    /// Organism behavior, state, and lifecycle.
    pub mod organism;
    /// Integer lattice positions.
    pub mod position;
    /// Movement directives carried by cells.
    pub mod propulsion;
    /// Run-state machine.
    pub mod runner;
    /// Per-tick occupancy index.
    pub mod spatial;
}
