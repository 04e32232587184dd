// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Formic: a deterministic multi-player ant battle engine.
//!
//! This crate implements the turn-based simulation core of the classic
//! "Ants" programming game:
//! - Torus map with per-player fog of war
//! - Simultaneous-move conflict resolution
//! - Four interchangeable combat policies
//! - Food economy with symmetric-fairness placement
//! - Hill razing, scoring, and early-cutoff detection
//! - Per-player wire protocol with identity remapping, plus a replay summary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Orchestrator / CLI driver       │
//! ├─────────────────────────────────────┤
//! │     Game (turn pipeline)            │
//! ├─────────────────────────────────────┤
//! │ Map · Entities · Vision · Protocol  │
//! └─────────────────────────────────────┘
//! ```
//!
//! The engine itself is single-threaded and synchronous: given a map, the
//! two seeds, and the set of submitted orders, every turn is bit-for-bit
//! reproducible.

pub mod error;
pub mod game;
pub mod replay;

pub use error::SetupError;

// Re-export key game types at crate root for convenience
pub use game::{
    CombatPolicy, Direction, FoodPlacement, Game, GameConfig, GameStats, Loc, Map, MoveOutcome,
    PlayerId,
};
