//! Game layer for Formic.
//!
//! Implements the Ants rules:
//! - Torus map with land, water, food, and ant occupancy
//! - Per-player fog of war with incremental vision tracking
//! - Order validation and simultaneous movement resolution
//! - Four combat policies
//! - Food economy (gathering plus fair spawning)
//! - Hill razing, spawning, scoring, and game-over detection
//! - The per-player wire protocol

mod combat;
mod config;
mod entities;
mod food;
mod invariants;
mod map;
mod orders;
mod player;
mod protocol;
mod ratio;
mod state;
mod symmetry;
mod vision;

pub use combat::CombatPolicy;
pub use config::{FoodPlacement, GameConfig};
pub use entities::{Ant, AntId, Ants, FoodId, FoodItem, FoodItems, Hill};
pub use invariants::{InvariantViolation, check_invariants};
pub use map::{Cell, DIRECTIONS, Direction, Loc, Map, Neighborhood, Offset, ParsedMap};
pub use orders::MoveOutcome;
pub use player::PlayerState;
pub use ratio::Ratio;
pub use state::{Game, GameStats};
pub use symmetry::{Translation, detect_translations};
pub use vision::recompute_visibility;

/// Unique identifier for a player, `0..num_players`.
pub type PlayerId = u8;

/// Maximum number of players the map format can express (`0`-`9` hills).
pub const MAX_PLAYERS: usize = 10;
