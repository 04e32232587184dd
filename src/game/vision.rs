//! Incremental fog-of-war tracking.
//!
//! A newly created ant adds one to every cell of its view disc. A moved ant
//! applies two precomputed *difference sets* relative to the hold disc:
//! `entered(d) = disc(d) \ disc(hold)` gains one, `left(d) = disc(hold) \
//! disc(d)` loses one. A killed ant subtracts the whole disc at its final
//! location. This keeps each move O(disc boundary) instead of
//! O(viewradius²), which is the performance-critical property of the
//! tracker.

use crate::game::PlayerId;
use crate::game::map::{Cell, DIRECTIONS, Direction, Loc, Map, Offset};
use crate::game::player::PlayerState;

/// A single vision-affecting change produced by the turn pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisionEvent {
    /// An ant appeared (spawn or initial placement).
    Spawned {
        /// Owner whose grid changes.
        owner: PlayerId,
        /// Where the ant appeared.
        loc: Loc,
    },
    /// An ant moved one step.
    Moved {
        /// Owner whose grid changes.
        owner: PlayerId,
        /// Pre-move location.
        from: Loc,
        /// Direction moved.
        dir: Direction,
    },
    /// An ant died.
    Died {
        /// Owner whose grid changes.
        owner: PlayerId,
        /// Final location (post-move).
        loc: Loc,
    },
}

/// Precomputed view disc and per-direction difference sets for one radius.
///
/// Owned by the game instance; built once at setup.
#[derive(Debug, Clone)]
pub(crate) struct VisionTracker {
    disc: Vec<Offset>,
    entered: [Vec<Offset>; 4],
    left: [Vec<Offset>; 4],
}

impl VisionTracker {
    /// Build the disc (`dr² + dc² <= radius2`, origin included) and the
    /// four difference-set pairs.
    pub(crate) fn new(radius2: u32) -> Self {
        let mut disc: Vec<Offset> = vec![(0, 0)];
        let r2 = i64::from(radius2);
        let mut max = 0i64;
        while (max + 1) * (max + 1) <= r2 {
            max += 1;
        }
        for dr in -max..=max {
            for dc in -max..=max {
                let d = dr * dr + dc * dc;
                if d > 0 && d <= r2 {
                    #[allow(clippy::cast_possible_truncation)]
                    disc.push((dr as i16, dc as i16));
                }
            }
        }
        disc.sort_unstable();

        let mut entered: [Vec<Offset>; 4] = Default::default();
        let mut left: [Vec<Offset>; 4] = Default::default();
        for (i, dir) in DIRECTIONS.iter().enumerate() {
            let (dr, dc) = dir.delta();
            #[allow(clippy::cast_possible_truncation)]
            let shifted: Vec<Offset> = disc
                .iter()
                .map(|&(or, oc)| (or + dr as i16, oc + dc as i16))
                .collect();
            entered[i] = shifted
                .iter()
                .copied()
                .filter(|o| disc.binary_search(o).is_err())
                .collect();
            let mut sorted_shifted = shifted;
            sorted_shifted.sort_unstable();
            left[i] = disc
                .iter()
                .copied()
                .filter(|o| sorted_shifted.binary_search(o).is_err())
                .collect();
        }

        Self {
            disc,
            entered,
            left,
        }
    }

    /// Apply a batch of events to the owning players' grids.
    pub(crate) fn apply(&self, events: &[VisionEvent], map: &Map, players: &mut [PlayerState]) {
        for event in events {
            match *event {
                VisionEvent::Spawned { owner, loc } => {
                    self.add_disc(loc, map, &mut players[usize::from(owner)]);
                }
                VisionEvent::Died { owner, loc } => {
                    self.sub_disc(loc, map, &mut players[usize::from(owner)]);
                }
                VisionEvent::Moved { owner, from, dir } => {
                    let player = &mut players[usize::from(owner)];
                    let di = dir_index(dir);
                    for &offset in &self.entered[di] {
                        let cell = map.offset_loc(from, offset);
                        player.bump_vision(map.index(cell), cell, map.get(cell) == Cell::Water);
                    }
                    for &offset in &self.left[di] {
                        let cell = map.offset_loc(from, offset);
                        player.drop_vision(map.index(cell));
                    }
                }
            }
        }
    }

    fn add_disc(&self, center: Loc, map: &Map, player: &mut PlayerState) {
        for &offset in &self.disc {
            let cell = map.offset_loc(center, offset);
            player.bump_vision(map.index(cell), cell, map.get(cell) == Cell::Water);
        }
    }

    fn sub_disc(&self, center: Loc, map: &Map, player: &mut PlayerState) {
        for &offset in &self.disc {
            let cell = map.offset_loc(center, offset);
            player.drop_vision(map.index(cell));
        }
    }

    /// Disc size, for tests.
    #[cfg(test)]
    pub(crate) fn disc_len(&self) -> usize {
        self.disc.len()
    }
}

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

/// From-scratch visibility recomputation: every cell within `radius2` of
/// any of `locs`. The incremental tracker must always agree with this.
#[must_use]
pub fn recompute_visibility(map: &Map, radius2: u32, locs: &[Loc]) -> Vec<bool> {
    let mut visible = vec![false; map.len()];
    for (cell, _) in map.iter() {
        if locs.iter().any(|&a| map.distance2(a, cell) <= radius2) {
            visible[map.index(cell)] = true;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(radius2: u32) -> (Map, VisionTracker, Vec<PlayerState>) {
        let map = Map::new(20, 20).unwrap();
        let tracker = VisionTracker::new(radius2);
        let players = vec![PlayerState::new(0, 2, map.len())];
        (map, tracker, players)
    }

    fn counts_match_reference(map: &Map, player: &PlayerState, radius2: u32, locs: &[Loc]) {
        let reference = recompute_visibility(map, radius2, locs);
        for idx in 0..map.len() {
            assert_eq!(
                player.sees(idx),
                reference[idx],
                "cell {:?} mismatch",
                map.loc_at(idx)
            );
        }
    }

    #[test]
    fn test_difference_sets_partition_correctly() {
        let tracker = VisionTracker::new(77);
        // disc = 240 offsets + origin
        assert_eq!(tracker.disc_len(), 241);
        for i in 0..4 {
            // A shifted disc keeps its size, so gains must equal losses
            assert_eq!(tracker.entered[i].len(), tracker.left[i].len());
            assert!(!tracker.entered[i].is_empty());
            // Boundary-sized, far smaller than the disc
            assert!(tracker.entered[i].len() < tracker.disc_len() / 4);
        }
    }

    #[test]
    fn test_spawn_matches_reference() {
        let (map, tracker, mut players) = setup(77);
        let loc = Loc::new(3, 17);
        tracker.apply(
            &[VisionEvent::Spawned { owner: 0, loc }],
            &map,
            &mut players,
        );
        counts_match_reference(&map, &players[0], 77, &[loc]);
    }

    #[test]
    fn test_move_chain_matches_reference() {
        let (map, tracker, mut players) = setup(10);
        let start = Loc::new(0, 0);
        tracker.apply(
            &[VisionEvent::Spawned {
                owner: 0,
                loc: start,
            }],
            &map,
            &mut players,
        );

        // Walk east across the seam and then south
        let mut loc = start;
        for dir in [
            Direction::East,
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North,
        ] {
            tracker.apply(
                &[VisionEvent::Moved {
                    owner: 0,
                    from: loc,
                    dir,
                }],
                &map,
                &mut players,
            );
            loc = map.destination(loc, dir);
        }
        counts_match_reference(&map, &players[0], 10, &[loc]);
    }

    #[test]
    fn test_death_clears_vision() {
        let (map, tracker, mut players) = setup(5);
        let loc = Loc::new(10, 10);
        tracker.apply(
            &[
                VisionEvent::Spawned { owner: 0, loc },
                VisionEvent::Died { owner: 0, loc },
            ],
            &map,
            &mut players,
        );
        for idx in 0..map.len() {
            assert!(!players[0].sees(idx));
            assert!(players[0].vision_counts()[idx] >= 0);
        }
    }

    #[test]
    fn test_overlapping_discs_survive_one_death() {
        let (map, tracker, mut players) = setup(5);
        let a = Loc::new(5, 5);
        let b = Loc::new(5, 6);
        tracker.apply(
            &[
                VisionEvent::Spawned { owner: 0, loc: a },
                VisionEvent::Spawned { owner: 0, loc: b },
                VisionEvent::Died { owner: 0, loc: a },
            ],
            &map,
            &mut players,
        );
        counts_match_reference(&map, &players[0], 5, &[b]);
    }
}
