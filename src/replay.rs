//! The replay summary.
//!
//! A finished game serializes to a single structured document: every
//! parameter, the original map render, and the full lifetime of every ant,
//! food item, and hill. Ant records carry their spawn location and complete
//! move string, so a consumer can reconstruct the exact board of any turn
//! without re-running the engine; [`Replay::render_state`] reproduces the
//! engine's own full-state diff byte for byte.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::{Direction, Loc, PlayerId};

/// All game parameters, echoed for the visualizer and for reproduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayParameters {
    /// Bot setup budget in milliseconds.
    pub loadtime: u32,
    /// Bot per-turn budget in milliseconds.
    pub turntime: u32,
    /// Turn limit.
    pub turns: u32,
    /// Squared vision radius.
    pub viewradius2: u32,
    /// Squared attack radius.
    pub attackradius2: u32,
    /// Squared food-gathering radius.
    pub spawnradius2: u32,
    /// Food accrual numerator.
    pub food_rate: u32,
    /// Food accrual denominator.
    pub food_turn: u32,
    /// Initial food density divisor.
    pub food_start: u32,
    /// Cutoff streak length.
    pub cutoff_turn: u32,
    /// Cutoff dominance share.
    pub cutoff_percent: f64,
    /// Seed published to bots.
    pub player_seed: u64,
    /// The engine's private seed.
    pub engine_seed: u64,
}

/// The original map, as rendered at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayMap {
    /// Row count.
    pub rows: u16,
    /// Column count.
    pub cols: u16,
    /// One glyph string per row.
    pub data: Vec<String>,
}

/// One ant's full lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntRecord {
    /// Spawn row.
    pub row: u16,
    /// Spawn column.
    pub col: u16,
    /// Turn the ant appeared.
    pub spawn_turn: u32,
    /// Turn the ant died, if it did.
    pub die_turn: Option<u32>,
    /// Owning player.
    pub owner: PlayerId,
    /// One character per turn lived: `n`/`e`/`s`/`w` or `-` for hold.
    pub orders: String,
}

/// One food item's full lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Row.
    pub row: u16,
    /// Column.
    pub col: u16,
    /// Turn the food appeared.
    pub start_turn: u32,
    /// Turn the food was removed, if it was.
    pub end_turn: Option<u32>,
    /// The hive credited, if the food was gathered uncontested.
    pub owner: Option<PlayerId>,
}

/// One hill's full lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HillRecord {
    /// Row.
    pub row: u16,
    /// Column.
    pub col: u16,
    /// Owning player.
    pub owner: PlayerId,
    /// Turn the hill was razed, if it was.
    pub razed_turn: Option<u32>,
    /// The player whose ant razed it.
    pub killed_by: Option<PlayerId>,
}

/// A complete game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format revision.
    pub revision: u32,
    /// Player count.
    pub players: usize,
    /// All game parameters.
    pub parameters: ReplayParameters,
    /// The original map.
    pub map: ReplayMap,
    /// Every ant that ever lived, in spawn order.
    pub ants: Vec<AntRecord>,
    /// Every food item, in placement order.
    pub food: Vec<FoodRecord>,
    /// Every hill.
    pub hills: Vec<HillRecord>,
    /// Per-player score after each turn (index 0 is the initial state).
    pub scores: Vec<Vec<i64>>,
    /// Per-player hive after each turn.
    pub hive_history: Vec<Vec<u32>>,
    /// Lone-survivor bonus per player.
    pub bonus: Vec<i64>,
    /// Why the game ended.
    pub cutoff: String,
    /// The turn the game ended on.
    pub winning_turn: u32,
}

impl Replay {
    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a serde error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serde error for malformed input.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Save as JSON to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the JSON is malformed.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text).map_err(io::Error::other)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn wrap(&self, loc: Loc, dir: Direction) -> Loc {
        let (dr, dc) = dir.delta();
        Loc {
            row: (i32::from(loc.row) + dr).rem_euclid(i32::from(self.map.rows)) as u16,
            col: (i32::from(loc.col) + dc).rem_euclid(i32::from(self.map.cols)) as u16,
        }
    }

    /// An ant's location at the end of the given turn.
    ///
    /// Returns `None` when the ant does not exist at that turn (not yet
    /// spawned, or already dead).
    #[must_use]
    pub fn ant_location(&self, ant: &AntRecord, turn: u32) -> Option<Loc> {
        if turn < ant.spawn_turn || ant.die_turn.is_some_and(|d| d <= turn) {
            return None;
        }
        Some(self.walk(ant, turn))
    }

    /// An ant's final location (where it died, or stands at game end).
    #[must_use]
    pub fn ant_final_location(&self, ant: &AntRecord) -> Loc {
        self.walk(ant, u32::MAX)
    }

    fn walk(&self, ant: &AntRecord, turn: u32) -> Loc {
        let mut loc = Loc::new(ant.row, ant.col);
        let steps = usize::try_from(turn.saturating_sub(ant.spawn_turn)).unwrap_or(usize::MAX);
        for ch in ant.orders.chars().take(steps) {
            if let Some(dir) = Direction::from_char(ch) {
                loc = self.wrap(loc, dir);
            }
        }
        loc
    }

    /// Reconstruct the engine's full-state diff for a turn.
    ///
    /// Matches [`crate::game::Game::get_state`] byte for byte for every
    /// turn the engine played.
    #[must_use]
    pub fn render_state(&self, turn: u32) -> String {
        let mut out = String::new();
        out.push_str(&format!("turn {turn}\n"));

        let mut food_cells: Vec<Loc> = self
            .food
            .iter()
            .filter(|f| f.start_turn <= turn && f.end_turn.is_none_or(|e| e > turn))
            .map(|f| Loc::new(f.row, f.col))
            .collect();
        food_cells.sort_unstable();
        for loc in food_cells {
            out.push_str(&format!("f {} {}\n", loc.row, loc.col));
        }

        let mut hill_records: Vec<(Loc, PlayerId)> = self
            .hills
            .iter()
            .filter(|h| h.razed_turn.is_none_or(|e| e > turn))
            .map(|h| (Loc::new(h.row, h.col), h.owner))
            .collect();
        hill_records.sort_unstable();
        for (loc, owner) in hill_records {
            out.push_str(&format!("h {} {} {owner}\n", loc.row, loc.col));
        }

        let mut ant_records: Vec<(Loc, PlayerId)> = self
            .ants
            .iter()
            .filter_map(|a| self.ant_location(a, turn).map(|loc| (loc, a.owner)))
            .collect();
        ant_records.sort_unstable();
        for (loc, owner) in ant_records {
            out.push_str(&format!("a {} {} {owner}\n", loc.row, loc.col));
        }

        let mut death_records: Vec<(Loc, PlayerId)> = self
            .ants
            .iter()
            .filter(|a| a.die_turn == Some(turn))
            .map(|a| (self.ant_final_location(a), a.owner))
            .collect();
        death_records.sort_unstable();
        for (loc, owner) in death_records {
            out.push_str(&format!("d {} {} {owner}\n", loc.row, loc.col));
        }

        out.push_str("go\n");
        out
    }

    /// Final scores: last history entry plus the survivor bonus.
    #[must_use]
    pub fn final_scores(&self) -> Vec<i64> {
        self.scores
            .iter()
            .zip(&self.bonus)
            .map(|(history, bonus)| history.last().copied().unwrap_or(0) + bonus)
            .collect()
    }
}
