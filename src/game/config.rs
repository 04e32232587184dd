//! Game configuration.

use serde::{Deserialize, Serialize};

use crate::game::combat::CombatPolicy;

/// Strategy for placing newly spawned food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodPlacement {
    /// Uniformly random free land.
    Random,
    /// Free land near each player's starting hills, round-robin.
    StartRegion,
    /// Symmetric sets: every player receives an equidistant item at once,
    /// using the map's detected translation symmetry. Falls back to
    /// [`FoodPlacement::Random`] on maps with no detectable symmetry.
    Symmetric,
}

/// All tunable game parameters.
///
/// Defaults are the classic contest values. `loadtime_ms` and `turntime_ms`
/// are enforced by the orchestrator, not the engine; they are carried here
/// so the setup block and replay can report them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Bot setup budget in milliseconds (orchestrator-enforced).
    pub loadtime_ms: u32,
    /// Bot per-turn budget in milliseconds (orchestrator-enforced).
    pub turntime_ms: u32,
    /// Maximum number of turns.
    pub turns: u32,
    /// Squared vision radius.
    pub viewradius2: u32,
    /// Squared attack radius.
    pub attackradius2: u32,
    /// Squared food-gathering radius.
    pub spawnradius2: u32,
    /// Food items accrued per player per `food_turn` turns.
    pub food_rate: u32,
    /// Denominator for the food accrual rate.
    pub food_turn: u32,
    /// One initial food item per this many land cells, per player.
    pub food_start: u32,
    /// Consecutive dominance turns before an early cutoff.
    pub cutoff_turn: u32,
    /// Population share that counts as dominance.
    pub cutoff_percent: f64,
    /// Score awarded for razing an enemy hill.
    pub raze_bounty: i64,
    /// Score charged to a hill's owner when it is razed.
    pub raze_penalty: i64,
    /// Active combat resolution policy.
    pub combat: CombatPolicy,
    /// Active food placement strategy.
    pub food_placement: FoodPlacement,
    /// Seed for the engine's private stream (food placement, spawn
    /// tie-breaks). Must be unpredictable to bots.
    pub engine_seed: u64,
    /// Seed published to bots for their own reproducibility. Never derived
    /// from `engine_seed`.
    pub player_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            loadtime_ms: 3000,
            turntime_ms: 1000,
            turns: 1500,
            viewradius2: 77,
            attackradius2: 5,
            spawnradius2: 1,
            food_rate: 5,
            food_turn: 20,
            food_start: 75,
            cutoff_turn: 150,
            cutoff_percent: 0.85,
            raze_bounty: 2,
            raze_penalty: 1,
            combat: CombatPolicy::Focus,
            food_placement: FoodPlacement::Symmetric,
            engine_seed: 42,
            player_seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contest_values() {
        let config = GameConfig::default();
        assert_eq!(config.viewradius2, 77);
        assert_eq!(config.attackradius2, 5);
        assert_eq!(config.spawnradius2, 1);
        assert_eq!(config.turns, 1500);
        assert_eq!(config.combat, CombatPolicy::Focus);
    }

    #[test]
    fn test_config_serializes() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
