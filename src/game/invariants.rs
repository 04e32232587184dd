//! Engine invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented pipeline; a
//! violation means a phase corrupted shared state. Checked after every
//! turn in debug builds, no-op in release builds.

use crate::game::map::Cell;
use crate::game::state::Game;

/// Invariant violation description.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all engine invariants, returning every violation found.
#[must_use]
pub fn check_invariants(game: &Game) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let map = game.map();

    // Grid and arenas must agree: at most one ant per cell, and a cell is
    // never simultaneously food and occupied (the Cell enum enforces the
    // latter; the arenas must match it).
    for (loc, cell) in map.iter() {
        let ant = game.ants().at(loc, map);
        let food = game.food_items().at(loc, map);
        match cell {
            Cell::Ant(owner) => {
                let indexed = ant.map(|id| game.ants().get(id).owner);
                if indexed != Some(owner) {
                    violations.push(InvariantViolation {
                        message: format!(
                            "cell {loc:?} claims ant of player {owner} but arena has {indexed:?}"
                        ),
                    });
                }
                if food.is_some() {
                    violations.push(InvariantViolation {
                        message: format!("cell {loc:?} holds both an ant and food"),
                    });
                }
            }
            Cell::Food => {
                if food.is_none() {
                    violations.push(InvariantViolation {
                        message: format!("cell {loc:?} claims food but the arena has none"),
                    });
                }
                if ant.is_some() {
                    violations.push(InvariantViolation {
                        message: format!("cell {loc:?} holds both food and an ant"),
                    });
                }
            }
            Cell::Land | Cell::Water => {
                if ant.is_some() || food.is_some() {
                    violations.push(InvariantViolation {
                        message: format!("empty cell {loc:?} still indexed by an arena"),
                    });
                }
            }
        }
    }

    // Lifetime bookkeeping
    for (i, ant) in game.ants().records().iter().enumerate() {
        if ant.killed != ant.die_turn.is_some() {
            violations.push(InvariantViolation {
                message: format!("ant {i} kill flag disagrees with die_turn"),
            });
        }
    }

    // Razed hills must have exchanged points exactly once
    for hill in game.hills() {
        if hill.end_turn.is_some() && !hill.raze_points_applied {
            violations.push(InvariantViolation {
                message: format!("razed hill at {:?} never charged raze points", hill.loc),
            });
        }
        if hill.end_turn.is_some() && hill.killed_by.is_none() {
            violations.push(InvariantViolation {
                message: format!("razed hill at {:?} has no killer recorded", hill.loc),
            });
        }
    }

    for player in game.players() {
        // Vision counts may never underflow
        if let Some(index) = player.vision_counts().iter().position(|&c| c < 0) {
            violations.push(InvariantViolation {
                message: format!(
                    "player {} vision count at {:?} is negative",
                    player.id,
                    map.loc_at(index)
                ),
            });
        }

        // The switch table is a permutation
        let mut assigned: Vec<_> = player.switch_table().iter().filter_map(|s| *s).collect();
        assigned.sort_unstable();
        let before = assigned.len();
        assigned.dedup();
        if assigned.len() != before {
            violations.push(InvariantViolation {
                message: format!("player {} switch table assigns a private id twice", player.id),
            });
        }
    }

    violations
}

/// Assert all invariants hold, panicking with details if not.
///
/// Only active in debug builds.
///
/// # Panics
///
/// Panics with a detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub(crate) fn assert_invariants(game: &Game) {
    let violations = check_invariants(game);
    assert!(
        violations.is_empty(),
        "Engine invariant violations:\n  - {}",
        violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("\n  - ")
    );
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub(crate) fn assert_invariants(_game: &Game) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;

    #[test]
    fn test_fresh_game_passes() {
        let text = "\
rows 8
cols 8
players 2
m 0.......
m ........
m ........
m ........
m ....1...
m ........
m ........
m ........
";
        let mut game = Game::from_map_text(text, GameConfig::default()).unwrap();
        game.start_game();
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_violations_after_turns_stay_empty() {
        let text = "\
rows 8
cols 8
players 2
m 0.......
m ........
m ........
m ........
m ....1...
m ........
m ........
m ........
";
        let mut game = Game::from_map_text(text, GameConfig::default()).unwrap();
        game.start_game();
        for _ in 0..5 {
            game.start_turn();
            game.do_moves(0, &["o 0 0 e".to_string()]);
            game.finish_turn();
            assert!(check_invariants(&game).is_empty());
            if game.game_over() {
                break;
            }
        }
    }
}
