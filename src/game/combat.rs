//! Combat resolution.
//!
//! Exactly one policy is active per game, selected at setup. Every policy
//! reads a frozen pre-combat snapshot of positions and ownership and
//! returns a kill list; nothing observes kills from the same pass before
//! the whole list is computed. The one sanctioned exception is `Closest`,
//! which resolves distance shells in ascending order and deliberately
//! excludes ants already killed by a *closer* shell.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::game::entities::{AntId, Ants};
use crate::game::map::{Loc, Map, Neighborhood, Offset};
use crate::game::ratio::Ratio;

/// The four interchangeable combat policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPolicy {
    /// An engaged ant dies if some enemy in range is focused on no more
    /// opponents than it is (ties favor death).
    Focus,
    /// Iterative distance shells; mutual-destruction groups die together.
    Closest,
    /// An ant dies if enemies in range outnumber friends in range.
    Support,
    /// Each ant splits one point of damage over its enemies in range; one
    /// accumulated point kills. Damage never carries over between turns.
    Damage,
}

/// Compute the kill list for this turn's combat, sorted by ant id.
pub(crate) fn resolve_combat(
    policy: CombatPolicy,
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    attackradius2: u32,
) -> Vec<AntId> {
    let live: Vec<AntId> = ants.live_ids().collect();
    let mut kills = match policy {
        CombatPolicy::Focus => focus(map, ants, hood, attackradius2, &live),
        CombatPolicy::Closest => closest(map, ants, hood, attackradius2, &live),
        CombatPolicy::Support => support(map, ants, hood, attackradius2, &live),
        CombatPolicy::Damage => damage(map, ants, hood, attackradius2, &live),
    };
    kills.sort_unstable();
    kills
}

/// Live ants within the radius of `loc`, in deterministic offset order.
fn in_range(
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    radius2: u32,
    loc: Loc,
) -> Vec<AntId> {
    hood.offsets(radius2)
        .iter()
        .filter_map(|&offset| ants.at(map.offset_loc(loc, offset), map))
        .collect()
}

fn focus(
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    radius2: u32,
    live: &[AntId],
) -> Vec<AntId> {
    // weakness = number of enemies focused on this ant
    let mut enemies: HashMap<AntId, Vec<AntId>> = HashMap::with_capacity(live.len());
    for &id in live {
        let owner = ants.get(id).owner;
        let hostile: Vec<AntId> = in_range(map, ants, hood, radius2, ants.get(id).loc)
            .into_iter()
            .filter(|&e| ants.get(e).owner != owner)
            .collect();
        enemies.insert(id, hostile);
    }

    live.iter()
        .copied()
        .filter(|id| {
            let weakness = enemies[id].len();
            if weakness == 0 {
                return false;
            }
            // Ties favor death
            enemies[id]
                .iter()
                .map(|e| enemies[e].len())
                .min()
                .is_some_and(|min_enemy| min_enemy <= weakness)
        })
        .collect()
}

fn closest(
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    radius2: u32,
    live: &[AntId],
) -> Vec<AntId> {
    // Offsets bucketed by exact squared distance, ascending
    let mut by_shell: HashMap<u32, Vec<Offset>> = HashMap::new();
    for &(dr, dc) in hood.offsets(radius2) {
        let d = i32::from(dr) * i32::from(dr) + i32::from(dc) * i32::from(dc);
        #[allow(clippy::cast_sign_loss)]
        by_shell.entry(d as u32).or_default().push((dr, dc));
    }

    let mut killed: HashSet<AntId> = HashSet::new();
    let mut kills: Vec<AntId> = Vec::new();

    for shell in hood.shells(radius2) {
        let offsets = &by_shell[&shell];
        for &seed in live {
            if killed.contains(&seed) {
                continue;
            }
            // Flood-fill the mutual-destruction group over enemies found at
            // exactly this distance, skipping ants closer shells removed.
            let mut group = vec![seed];
            let mut stack = vec![seed];
            let mut members: HashSet<AntId> = HashSet::new();
            members.insert(seed);
            while let Some(current) = stack.pop() {
                let (loc, owner) = {
                    let ant = ants.get(current);
                    (ant.loc, ant.owner)
                };
                for &offset in offsets {
                    let Some(other) = ants.at(map.offset_loc(loc, offset), map) else {
                        continue;
                    };
                    if ants.get(other).owner == owner
                        || killed.contains(&other)
                        || !members.insert(other)
                    {
                        continue;
                    }
                    group.push(other);
                    stack.push(other);
                }
            }
            if group.len() > 1 {
                for id in group {
                    killed.insert(id);
                    kills.push(id);
                }
            }
        }
    }

    kills
}

fn support(
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    radius2: u32,
    live: &[AntId],
) -> Vec<AntId> {
    live.iter()
        .copied()
        .filter(|&id| {
            let (loc, owner) = {
                let ant = ants.get(id);
                (ant.loc, ant.owner)
            };
            let mut enemies = 0usize;
            let mut friends = 0usize;
            for other in in_range(map, ants, hood, radius2, loc) {
                if ants.get(other).owner == owner {
                    friends += 1;
                } else {
                    enemies += 1;
                }
            }
            enemies > friends
        })
        .collect()
}

fn damage(
    map: &Map,
    ants: &Ants,
    hood: &Neighborhood,
    radius2: u32,
    live: &[AntId],
) -> Vec<AntId> {
    let mut received: HashMap<AntId, Ratio> = HashMap::new();
    for &id in live {
        let (loc, owner) = {
            let ant = ants.get(id);
            (ant.loc, ant.owner)
        };
        let targets: Vec<AntId> = in_range(map, ants, hood, radius2, loc)
            .into_iter()
            .filter(|&e| ants.get(e).owner != owner)
            .collect();
        if targets.is_empty() {
            continue;
        }
        let share = Ratio::new(1, u64::try_from(targets.len()).unwrap_or(u64::MAX));
        for target in targets {
            let total = received.get(&target).copied().unwrap_or(Ratio::ZERO);
            received.insert(target, total.add(share));
        }
    }

    received
        .into_iter()
        .filter(|(_, total)| total.cmp_integer(1) != Ordering::Less)
        .map(|(id, _)| id)
        .collect()
}
