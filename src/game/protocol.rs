//! The per-turn textual protocol.
//!
//! One record per line. The per-player encoder sends only changes visible
//! to that player this turn, with every owner id rewritten through the
//! player's switch table so each bot perceives itself as player 0 and
//! opponents in first-contact order. The full encoder used for
//! replay/streaming applies no filtering and no remapping.

use crate::game::PlayerId;
use crate::game::config::GameConfig;
use crate::game::entities::{Ants, FoodItems, Hill};
use crate::game::map::{Loc, Map};
use crate::game::player::PlayerState;

/// The setup block sent to a bot before turn 1.
pub(crate) fn render_player_start(config: &GameConfig, map: &Map) -> String {
    let mut out = String::new();
    out.push_str("turn 0\n");
    out.push_str(&format!("loadtime {}\n", config.loadtime_ms));
    out.push_str(&format!("turntime {}\n", config.turntime_ms));
    out.push_str(&format!("rows {}\n", map.rows()));
    out.push_str(&format!("cols {}\n", map.cols()));
    out.push_str(&format!("turns {}\n", config.turns));
    out.push_str(&format!("viewradius2 {}\n", config.viewradius2));
    out.push_str(&format!("attackradius2 {}\n", config.attackradius2));
    out.push_str(&format!("spawnradius2 {}\n", config.spawnradius2));
    out.push_str(&format!("player_seed {}\n", config.player_seed));
    out.push_str("ready\n");
    out
}

/// The visible-state diff for one player.
///
/// Needs `&mut PlayerState` because rendering an opponent for the first
/// time assigns its private id.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_player_view(
    map: &Map,
    ants: &Ants,
    food: &FoodItems,
    hills: &[Hill],
    deaths: &[(Loc, PlayerId)],
    player: &mut PlayerState,
    turn: u32,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("turn {turn}\n"));

    // Newly revealed water, exactly once per cell per game
    let mut water = player.new_water.clone();
    water.sort_unstable();
    for loc in water {
        out.push_str(&format!("w {} {}\n", loc.row, loc.col));
    }

    let mut food_cells: Vec<Loc> = food
        .live_ids()
        .map(|id| food.get(id).loc)
        .filter(|&loc| player.sees(map.index(loc)))
        .collect();
    food_cells.sort_unstable();
    for loc in food_cells {
        out.push_str(&format!("f {} {}\n", loc.row, loc.col));
    }

    let mut hill_records: Vec<(Loc, PlayerId)> = hills
        .iter()
        .filter(|h| h.is_standing() && player.sees(map.index(h.loc)))
        .map(|h| (h.loc, h.owner))
        .collect();
    hill_records.sort_unstable();
    for (loc, owner) in hill_records {
        let private = player.private_id(owner);
        out.push_str(&format!("h {} {} {private}\n", loc.row, loc.col));
    }

    let mut ant_records: Vec<(Loc, PlayerId)> = ants
        .live_ids()
        .map(|id| {
            let ant = ants.get(id);
            (ant.loc, ant.owner)
        })
        .filter(|&(loc, _)| player.sees(map.index(loc)))
        .collect();
    ant_records.sort_unstable();
    for (loc, owner) in ant_records {
        let private = player.private_id(owner);
        out.push_str(&format!("a {} {} {private}\n", loc.row, loc.col));
    }

    // Own deaths are always reported, even out of view
    let me = player.id;
    let mut death_records: Vec<(Loc, PlayerId)> = deaths
        .iter()
        .copied()
        .filter(|&(loc, owner)| owner == me || player.sees(map.index(loc)))
        .collect();
    death_records.sort_unstable();
    for (loc, owner) in death_records {
        let private = player.private_id(owner);
        out.push_str(&format!("d {} {} {private}\n", loc.row, loc.col));
    }

    out.push_str("go\n");
    out
}

/// The unfiltered full-state diff used for replay and streaming: global
/// owner ids, no visibility filtering.
pub(crate) fn render_full_state(
    ants: &Ants,
    food: &FoodItems,
    hills: &[Hill],
    deaths: &[(Loc, PlayerId)],
    turn: u32,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("turn {turn}\n"));

    let mut food_cells: Vec<Loc> = food.live_ids().map(|id| food.get(id).loc).collect();
    food_cells.sort_unstable();
    for loc in food_cells {
        out.push_str(&format!("f {} {}\n", loc.row, loc.col));
    }

    let mut hill_records: Vec<(Loc, PlayerId)> = hills
        .iter()
        .filter(|h| h.is_standing())
        .map(|h| (h.loc, h.owner))
        .collect();
    hill_records.sort_unstable();
    for (loc, owner) in hill_records {
        out.push_str(&format!("h {} {} {owner}\n", loc.row, loc.col));
    }

    let mut ant_records: Vec<(Loc, PlayerId)> = ants
        .live_ids()
        .map(|id| {
            let ant = ants.get(id);
            (ant.loc, ant.owner)
        })
        .collect();
    ant_records.sort_unstable();
    for (loc, owner) in ant_records {
        out.push_str(&format!("a {} {} {owner}\n", loc.row, loc.col));
    }

    let mut death_records: Vec<(Loc, PlayerId)> = deaths.to_vec();
    death_records.sort_unstable();
    for (loc, owner) in death_records {
        out.push_str(&format!("d {} {} {owner}\n", loc.row, loc.col));
    }

    out.push_str("go\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::Cell;

    fn setup() -> (Map, Ants, FoodItems, PlayerState) {
        let map = Map::new(10, 10).unwrap();
        let ants = Ants::new(map.len());
        let food = FoodItems::new(map.len());
        let player = PlayerState::new(0, 3, map.len());
        (map, ants, food, player)
    }

    fn give_full_vision(player: &mut PlayerState, map: &Map) {
        for idx in 0..map.len() {
            player.bump_vision(idx, map.loc_at(idx), map.get(map.loc_at(idx)) == Cell::Water);
        }
        player.new_water.clear();
    }

    #[test]
    fn test_setup_block_fields() {
        let (map, ..) = setup();
        let config = GameConfig::default();
        let block = render_player_start(&config, &map);
        assert!(block.starts_with("turn 0\n"));
        assert!(block.contains("rows 10\n"));
        assert!(block.contains("viewradius2 77\n"));
        assert!(block.contains("player_seed 42\n"));
        assert!(block.ends_with("ready\n"));
    }

    #[test]
    fn test_owner_remapping_is_stable() {
        let (mut map, mut ants, food, mut player) = setup();
        give_full_vision(&mut player, &map);

        // First contact order: player 2 before player 1
        ants.spawn(Loc::new(0, 0), 0, 0, &map);
        map.set(Loc::new(0, 0), Cell::Ant(0));
        ants.spawn(Loc::new(0, 1), 2, 0, &map);
        map.set(Loc::new(0, 1), Cell::Ant(2));
        ants.spawn(Loc::new(0, 2), 1, 0, &map);
        map.set(Loc::new(0, 2), Cell::Ant(1));

        let view = render_player_view(&map, &ants, &food, &[], &[], &mut player, 1);
        // Self is 0; global 2 (seen first by location order) becomes 1;
        // global 1 becomes 2
        assert!(view.contains("a 0 0 0\n"));
        assert!(view.contains("a 0 1 1\n"));
        assert!(view.contains("a 0 2 2\n"));

        // Same mapping on a later turn even after the board changes
        let view2 = render_player_view(&map, &ants, &food, &[], &[], &mut player, 2);
        assert!(view2.contains("a 0 1 1\n"));
        assert!(view2.contains("a 0 2 2\n"));
    }

    #[test]
    fn test_invisible_records_are_filtered() {
        let (mut map, mut ants, food, mut player) = setup();
        // Vision over (0,0) only
        player.bump_vision(map.index(Loc::new(0, 0)), Loc::new(0, 0), false);

        ants.spawn(Loc::new(0, 0), 0, 0, &map);
        map.set(Loc::new(0, 0), Cell::Ant(0));
        ants.spawn(Loc::new(5, 5), 1, 0, &map);
        map.set(Loc::new(5, 5), Cell::Ant(1));

        let view = render_player_view(&map, &ants, &food, &[], &[], &mut player, 1);
        assert!(view.contains("a 0 0 0\n"));
        assert!(!view.contains("a 5 5"));
    }

    #[test]
    fn test_own_death_reported_even_out_of_view() {
        let (map, ants, food, mut player) = setup();
        let deaths = vec![(Loc::new(9, 9), 0), (Loc::new(8, 8), 1)];
        let view = render_player_view(&map, &ants, &food, &[], &deaths, &mut player, 3);
        assert!(view.contains("d 9 9 0\n"));
        // The enemy death is out of view and dropped
        assert!(!view.contains("d 8 8"));
    }

    #[test]
    fn test_full_state_keeps_global_ids() {
        let (mut map, mut ants, food, _) = setup();
        ants.spawn(Loc::new(4, 4), 2, 0, &map);
        map.set(Loc::new(4, 4), Cell::Ant(2));

        let full = render_full_state(&ants, &food, &[], &[], 5);
        assert!(full.starts_with("turn 5\n"));
        assert!(full.contains("a 4 4 2\n"));
        assert!(full.ends_with("go\n"));
    }
}
