//! Food economy: gathering and fair spawning.
//!
//! Gathering converts a food item to one hive credit when exactly one
//! player has ants in reach, and destroys it uncredited when the cell is
//! contested. Spawning accrues fractional food per turn in an exact
//! rational accumulator and places whole items through one of three
//! strategies; pending food is never placed on non-land.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::game::PlayerId;
use crate::game::config::FoodPlacement;
use crate::game::entities::{Ants, FoodId, FoodItems, Hill};
use crate::game::map::{Cell, Loc, Map, Neighborhood};
use crate::game::ratio::Ratio;
use crate::game::symmetry::Translation;

/// Outcome of the gather phase.
#[derive(Debug, Clone, Default)]
pub(crate) struct GatherResult {
    /// Food converted to hive credit, with the credited owner.
    pub(crate) gathered: Vec<(FoodId, PlayerId)>,
    /// Food destroyed because two or more players reached it.
    pub(crate) contested: Vec<FoodId>,
}

/// Classify every live food item by the distinct ant owners in reach.
pub(crate) fn gather_food(
    map: &Map,
    ants: &Ants,
    food: &FoodItems,
    hood: &Neighborhood,
    spawnradius2: u32,
) -> GatherResult {
    let mut result = GatherResult::default();
    for id in food.live_ids() {
        let loc = food.get(id).loc;
        let mut owners: Vec<PlayerId> = hood
            .offsets(spawnradius2)
            .iter()
            .filter_map(|&offset| ants.at(map.offset_loc(loc, offset), map))
            .map(|ant| ants.get(ant).owner)
            .collect();
        owners.sort_unstable();
        owners.dedup();
        match owners.as_slice() {
            [] => {}
            [single] => result.gathered.push((id, *single)),
            _ => result.contested.push(id),
        }
    }
    result
}

/// Accrues fractional food and places whole items on free land.
#[derive(Debug, Clone)]
pub(crate) struct FoodSpawner {
    placement: FoodPlacement,
    /// Exact fractional balance carried between turns.
    accumulator: Ratio,
    /// Whole food items awaiting a free cell.
    pending: u64,
    /// Per-player symmetry translations, when the map has them.
    translations: Option<Vec<Translation>>,
    /// Each player's starting hill locations, for start-region placement.
    start_regions: Vec<Vec<Loc>>,
    /// Round-robin cursor over players for start-region placement.
    cursor: usize,
}

impl FoodSpawner {
    pub(crate) fn new(
        placement: FoodPlacement,
        translations: Option<Vec<Translation>>,
        start_regions: Vec<Vec<Loc>>,
    ) -> Self {
        Self {
            placement,
            accumulator: Ratio::ZERO,
            pending: 0,
            translations,
            start_regions,
            cursor: 0,
        }
    }

    /// Queue extra whole items (initial food).
    pub(crate) fn add_pending(&mut self, amount: u64) {
        self.pending += amount;
    }

    /// Whole items currently awaiting placement.
    pub(crate) fn pending(&self) -> u64 {
        self.pending
    }

    /// Accrue one turn's fractional food for the given live-player count.
    pub(crate) fn accrue(&mut self, live_players: usize, food_rate: u32, food_turn: u32) {
        let live = u64::try_from(live_players).unwrap_or(0);
        self.accumulator = self
            .accumulator
            .add(Ratio::new(u64::from(food_rate) * live, u64::from(food_turn)));
        let whole = self.accumulator.floor();
        self.accumulator = self.accumulator.sub_integer(whole);
        self.pending += whole;
    }

    /// Place as much pending food as the board allows this turn.
    ///
    /// Returns the locations filled. Placement draws only on the engine's
    /// private RNG stream.
    pub(crate) fn place(
        &mut self,
        map: &mut Map,
        food: &mut FoodItems,
        hills: &[Hill],
        turn: u32,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Loc> {
        let hill_cells: HashSet<Loc> = hills.iter().map(|h| h.loc).collect();
        match self.placement {
            FoodPlacement::Random => self.place_random(map, food, &hill_cells, turn, rng),
            FoodPlacement::StartRegion => {
                self.place_start_region(map, food, &hill_cells, turn, rng)
            }
            FoodPlacement::Symmetric => {
                if self.translations.is_some() {
                    self.place_symmetric(map, food, &hill_cells, turn, rng)
                } else {
                    // Asymmetric map: fairness sets are impossible
                    self.place_random(map, food, &hill_cells, turn, rng)
                }
            }
        }
    }

    fn free_cells(map: &Map, hill_cells: &HashSet<Loc>) -> Vec<Loc> {
        map.iter()
            .filter(|&(loc, cell)| cell == Cell::Land && !hill_cells.contains(&loc))
            .map(|(loc, _)| loc)
            .collect()
    }

    fn place_random(
        &mut self,
        map: &mut Map,
        food: &mut FoodItems,
        hill_cells: &HashSet<Loc>,
        turn: u32,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Loc> {
        let mut candidates = Self::free_cells(map, hill_cells);
        let mut placed = Vec::new();
        while self.pending > 0 && !candidates.is_empty() {
            let pick = rng.gen_range(0..candidates.len());
            let loc = candidates.swap_remove(pick);
            food.place(loc, turn, map);
            map.set(loc, Cell::Food);
            placed.push(loc);
            self.pending -= 1;
        }
        placed
    }

    fn place_start_region(
        &mut self,
        map: &mut Map,
        food: &mut FoodItems,
        hill_cells: &HashSet<Loc>,
        turn: u32,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Loc> {
        // Keep a player's food near its own start so early-game economies
        // stay comparable.
        const REGION_RADIUS2: u32 = 77;
        if self.start_regions.is_empty() {
            return self.place_random(map, food, hill_cells, turn, rng);
        }
        let players = self.start_regions.len();
        let mut placed = Vec::new();
        let mut starved_rounds = 0usize;
        while self.pending > 0 && starved_rounds < players {
            let region = &self.start_regions[self.cursor % players];
            self.cursor = (self.cursor + 1) % players;
            let candidates: Vec<Loc> = Self::free_cells(map, hill_cells)
                .into_iter()
                .filter(|&loc| {
                    region
                        .iter()
                        .any(|&hill| map.distance2(hill, loc) <= REGION_RADIUS2)
                })
                .collect();
            if candidates.is_empty() {
                // One player's land shortage must not starve the rest for
                // more than this cycle.
                starved_rounds += 1;
                continue;
            }
            starved_rounds = 0;
            let loc = candidates[rng.gen_range(0..candidates.len())];
            food.place(loc, turn, map);
            map.set(loc, Cell::Food);
            placed.push(loc);
            self.pending -= 1;
        }
        placed
    }

    fn place_symmetric(
        &mut self,
        map: &mut Map,
        food: &mut FoodItems,
        hill_cells: &HashSet<Loc>,
        turn: u32,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Loc> {
        const ATTEMPTS_PER_SET: usize = 32;
        let translations = self.translations.clone().unwrap_or_default();
        let set_size = u64::try_from(translations.len()).unwrap_or(1).max(1);
        let mut placed = Vec::new();

        while self.pending >= set_size {
            let candidates = Self::free_cells(map, hill_cells);
            if candidates.is_empty() {
                break;
            }
            let mut found = None;
            for _ in 0..ATTEMPTS_PER_SET {
                let base = candidates[rng.gen_range(0..candidates.len())];
                let set: Vec<Loc> = translations
                    .iter()
                    .map(|&delta| map.translate(base, delta))
                    .collect();
                let distinct: HashSet<Loc> = set.iter().copied().collect();
                let all_free = distinct.len() == set.len()
                    && set
                        .iter()
                        .all(|loc| map.get(*loc) == Cell::Land && !hill_cells.contains(loc));
                if all_free {
                    found = Some(set);
                    break;
                }
            }
            let Some(set) = found else {
                // Defer the whole set to the next placement cycle rather
                // than breaking fairness.
                break;
            };
            for loc in set {
                food.place(loc, turn, map);
                map.set(loc, Cell::Food);
                placed.push(loc);
                self.pending -= 1;
            }
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn hood(radius2: u32) -> Neighborhood {
        let mut hood = Neighborhood::new();
        hood.ensure(radius2);
        hood
    }

    #[test]
    fn test_gather_single_owner_credits_once() {
        let mut map = Map::new(5, 5).unwrap();
        let mut ants = Ants::new(map.len());
        let mut food = FoodItems::new(map.len());

        food.place(Loc::new(2, 2), 0, &map);
        map.set(Loc::new(2, 2), Cell::Food);
        // Two ants of the same owner in reach still yield one credit
        ants.spawn(Loc::new(2, 1), 0, 0, &map);
        ants.spawn(Loc::new(2, 3), 0, 0, &map);

        let result = gather_food(&map, &ants, &food, &hood(1), 1);
        assert_eq!(result.gathered.len(), 1);
        assert_eq!(result.gathered[0].1, 0);
        assert!(result.contested.is_empty());
    }

    #[test]
    fn test_gather_contested_is_uncredited() {
        let mut map = Map::new(5, 5).unwrap();
        let mut ants = Ants::new(map.len());
        let mut food = FoodItems::new(map.len());

        food.place(Loc::new(2, 2), 0, &map);
        map.set(Loc::new(2, 2), Cell::Food);
        ants.spawn(Loc::new(2, 1), 0, 0, &map);
        ants.spawn(Loc::new(2, 3), 1, 0, &map);

        let result = gather_food(&map, &ants, &food, &hood(1), 1);
        assert!(result.gathered.is_empty());
        assert_eq!(result.contested.len(), 1);
    }

    #[test]
    fn test_gather_unreached_food_remains() {
        let mut map = Map::new(5, 5).unwrap();
        let ants = Ants::new(map.len());
        let mut food = FoodItems::new(map.len());
        food.place(Loc::new(2, 2), 0, &map);
        map.set(Loc::new(2, 2), Cell::Food);

        let result = gather_food(&map, &ants, &food, &hood(1), 1);
        assert!(result.gathered.is_empty());
        assert!(result.contested.is_empty());
    }

    #[test]
    fn test_accrual_is_exact() {
        let mut spawner = FoodSpawner::new(FoodPlacement::Random, None, Vec::new());
        // 5 food per 20 turns for 2 players = 1 food every 2 turns
        spawner.accrue(2, 5, 20);
        assert_eq!(spawner.pending(), 0);
        spawner.accrue(2, 5, 20);
        assert_eq!(spawner.pending(), 1);
        for _ in 0..98 {
            spawner.accrue(2, 5, 20);
        }
        assert_eq!(spawner.pending(), 50);
    }

    #[test]
    fn test_random_placement_avoids_non_land() {
        let text = "\
rows 3
cols 3
players 1
m %%%
m %0%
m %.%
";
        let parsed = Map::parse(text).unwrap();
        let mut map = parsed.map;
        let mut food = FoodItems::new(map.len());
        let hills = vec![Hill {
            loc: Loc::new(1, 1),
            owner: 0,
            end_turn: None,
            killed_by: None,
            raze_points_applied: false,
            last_touched: 0,
        }];

        let mut spawner = FoodSpawner::new(FoodPlacement::Random, None, Vec::new());
        spawner.add_pending(5);
        let placed = spawner.place(&mut map, &mut food, &hills, 1, &mut rng());

        // Only one legal cell exists: (2,1). The rest stays pending.
        assert_eq!(placed, vec![Loc::new(2, 1)]);
        assert_eq!(spawner.pending(), 4);
        assert_eq!(map.get(Loc::new(2, 1)), Cell::Food);
    }

    #[test]
    fn test_symmetric_placement_fills_whole_sets() {
        let mut map = Map::new(6, 6).unwrap();
        let mut food = FoodItems::new(map.len());
        let translations = Some(vec![(0, 0), (3, 0)]);
        let mut spawner = FoodSpawner::new(FoodPlacement::Symmetric, translations, Vec::new());
        spawner.add_pending(4);

        let placed = spawner.place(&mut map, &mut food, &[], 1, &mut rng());
        assert_eq!(placed.len(), 4);
        assert_eq!(spawner.pending(), 0);
        // Every placement pairs with its translated image
        for pair in placed.chunks(2) {
            assert_eq!(map.translate(pair[0], (3, 0)), pair[1]);
        }
    }

    #[test]
    fn test_symmetric_placement_defers_partial_sets() {
        let mut map = Map::new(4, 4).unwrap();
        let mut food = FoodItems::new(map.len());
        let translations = Some(vec![(0, 0), (2, 0)]);
        let mut spawner = FoodSpawner::new(FoodPlacement::Symmetric, translations, Vec::new());
        spawner.add_pending(1);

        // One pending item cannot fill a two-item set
        let placed = spawner.place(&mut map, &mut food, &[], 1, &mut rng());
        assert!(placed.is_empty());
        assert_eq!(spawner.pending(), 1);
    }
}
