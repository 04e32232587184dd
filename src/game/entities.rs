//! Ant, food, and hill records with dense id-indexed arenas.
//!
//! Entities are keyed by stable integer ids issued at spawn time and stored
//! in append-only arenas; a record is never removed, only marked dead, so
//! the replay summary can serialize full lifetimes. Cell occupancy is a
//! parallel index from map cell to live entity id.

use crate::game::map::{Direction, Loc, Map};
use crate::game::PlayerId;

/// Stable identifier for an ant, issued at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AntId(pub u32);

/// Stable identifier for a food item, issued at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(pub u32);

/// A single ant's full lifetime record.
#[derive(Debug, Clone)]
pub struct Ant {
    /// Current (or final) location.
    pub loc: Loc,
    /// Where the ant spawned; with `orders`, enough to replay its path.
    pub initial_loc: Loc,
    /// Owning player.
    pub owner: PlayerId,
    /// Turn the ant was created.
    pub spawn_turn: u32,
    /// Turn the ant died, if it has.
    pub die_turn: Option<u32>,
    /// One entry per turn lived: the move taken, or `None` for hold.
    pub orders: Vec<Option<Direction>>,
    /// Whether the ant is dead.
    pub killed: bool,
}

impl Ant {
    /// Render the lifetime order list as a protocol move string
    /// (`n`/`e`/`s`/`w`, `-` for hold).
    #[must_use]
    pub fn order_string(&self) -> String {
        self.orders
            .iter()
            .map(|o| o.map_or('-', Direction::as_char))
            .collect()
    }
}

/// A single food item's lifetime record.
#[derive(Debug, Clone, Copy)]
pub struct FoodItem {
    /// Where the food sits.
    pub loc: Loc,
    /// Turn the food appeared.
    pub start_turn: u32,
    /// Turn the food was removed, if it has been.
    pub end_turn: Option<u32>,
    /// The player whose hive was credited; `None` if the food vanished
    /// contested or is still on the map.
    pub owner: Option<PlayerId>,
}

/// A player's hill (spawn point).
#[derive(Debug, Clone, Copy)]
pub struct Hill {
    /// The hill's fixed location.
    pub loc: Loc,
    /// Owning player.
    pub owner: PlayerId,
    /// Turn the hill was razed, if it has been.
    pub end_turn: Option<u32>,
    /// Player whose ant razed the hill.
    pub killed_by: Option<PlayerId>,
    /// Guard so the raze bounty/penalty is exchanged exactly once.
    pub raze_points_applied: bool,
    /// Turn an owning ant last stood on the hill; spawn priority goes to
    /// the least recently touched hill.
    pub last_touched: u32,
}

impl Hill {
    /// Whether the hill can still spawn ants.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        self.end_turn.is_none()
    }
}

/// Append-only ant arena with a live-cell index.
#[derive(Debug, Clone)]
pub struct Ants {
    arena: Vec<Ant>,
    by_cell: Vec<Option<AntId>>,
}

impl Ants {
    /// Create an empty arena for a map with `cells` cells.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        Self {
            arena: Vec::new(),
            by_cell: vec![None; cells],
        }
    }

    /// Append a new live ant and index its cell.
    pub fn spawn(&mut self, loc: Loc, owner: PlayerId, turn: u32, map: &Map) -> AntId {
        #[allow(clippy::cast_possible_truncation)]
        let id = AntId(self.arena.len() as u32);
        self.arena.push(Ant {
            loc,
            initial_loc: loc,
            owner,
            spawn_turn: turn,
            die_turn: None,
            orders: Vec::new(),
            killed: false,
        });
        self.by_cell[map.index(loc)] = Some(id);
        id
    }

    /// The live ant occupying a cell, if any.
    #[must_use]
    pub fn at(&self, loc: Loc, map: &Map) -> Option<AntId> {
        self.by_cell[map.index(loc)]
    }

    /// Immutable access by id.
    #[must_use]
    pub fn get(&self, id: AntId) -> &Ant {
        &self.arena[id.0 as usize]
    }

    /// Mutable access by id.
    #[must_use]
    pub fn get_mut(&mut self, id: AntId) -> &mut Ant {
        &mut self.arena[id.0 as usize]
    }

    /// Remove the cell index entry for a location.
    pub fn clear_cell(&mut self, loc: Loc, map: &Map) {
        self.by_cell[map.index(loc)] = None;
    }

    /// Point the cell index at an ant.
    pub fn set_cell(&mut self, loc: Loc, id: AntId, map: &Map) {
        self.by_cell[map.index(loc)] = Some(id);
    }

    /// Mark an ant dead and free its cell.
    pub fn kill(&mut self, id: AntId, turn: u32, map: &Map) {
        let loc = self.arena[id.0 as usize].loc;
        if self.by_cell[map.index(loc)] == Some(id) {
            self.by_cell[map.index(loc)] = None;
        }
        let ant = &mut self.arena[id.0 as usize];
        ant.killed = true;
        ant.die_turn = Some(turn);
    }

    /// Ids of all live ants, in spawn order.
    pub fn live_ids(&self) -> impl Iterator<Item = AntId> + '_ {
        self.arena.iter().enumerate().filter_map(|(i, a)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = AntId(i as u32);
            if a.killed { None } else { Some(id) }
        })
    }

    /// Count of live ants owned by a player.
    #[must_use]
    pub fn live_count(&self, owner: PlayerId) -> usize {
        self.arena
            .iter()
            .filter(|a| !a.killed && a.owner == owner)
            .count()
    }

    /// All records, in spawn order, for replay serialization.
    #[must_use]
    pub fn records(&self) -> &[Ant] {
        &self.arena
    }
}

/// Append-only food arena with a live-cell index.
#[derive(Debug, Clone)]
pub struct FoodItems {
    arena: Vec<FoodItem>,
    by_cell: Vec<Option<FoodId>>,
}

impl FoodItems {
    /// Create an empty arena for a map with `cells` cells.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        Self {
            arena: Vec::new(),
            by_cell: vec![None; cells],
        }
    }

    /// Append a new food item and index its cell.
    pub fn place(&mut self, loc: Loc, turn: u32, map: &Map) -> FoodId {
        #[allow(clippy::cast_possible_truncation)]
        let id = FoodId(self.arena.len() as u32);
        self.arena.push(FoodItem {
            loc,
            start_turn: turn,
            end_turn: None,
            owner: None,
        });
        self.by_cell[map.index(loc)] = Some(id);
        id
    }

    /// The live food item on a cell, if any.
    #[must_use]
    pub fn at(&self, loc: Loc, map: &Map) -> Option<FoodId> {
        self.by_cell[map.index(loc)]
    }

    /// Immutable access by id.
    #[must_use]
    pub fn get(&self, id: FoodId) -> &FoodItem {
        &self.arena[id.0 as usize]
    }

    /// Remove a food item, optionally crediting a gatherer.
    pub fn remove(&mut self, id: FoodId, turn: u32, owner: Option<PlayerId>, map: &Map) {
        let loc = self.arena[id.0 as usize].loc;
        self.by_cell[map.index(loc)] = None;
        let item = &mut self.arena[id.0 as usize];
        item.end_turn = Some(turn);
        item.owner = owner;
    }

    /// Ids of all food items still on the map, in placement order.
    pub fn live_ids(&self) -> impl Iterator<Item = FoodId> + '_ {
        self.arena.iter().enumerate().filter_map(|(i, f)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = FoodId(i as u32);
            if f.end_turn.is_none() { Some(id) } else { None }
        })
    }

    /// Count of food items still on the map.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.arena.iter().filter(|f| f.end_turn.is_none()).count()
    }

    /// All records, in placement order, for replay serialization.
    #[must_use]
    pub fn records(&self) -> &[FoodItem] {
        &self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Map {
        Map::new(5, 5).unwrap()
    }

    #[test]
    fn test_spawn_and_kill_round_trip() {
        let map = map();
        let mut ants = Ants::new(map.len());
        let id = ants.spawn(Loc::new(2, 2), 0, 1, &map);
        assert_eq!(ants.at(Loc::new(2, 2), &map), Some(id));
        assert_eq!(ants.live_count(0), 1);

        ants.kill(id, 4, &map);
        assert_eq!(ants.at(Loc::new(2, 2), &map), None);
        assert_eq!(ants.live_count(0), 0);
        let record = ants.get(id);
        assert!(record.killed);
        assert_eq!(record.die_turn, Some(4));
        assert_eq!(record.spawn_turn, 1);
    }

    #[test]
    fn test_order_string() {
        let map = map();
        let mut ants = Ants::new(map.len());
        let id = ants.spawn(Loc::new(0, 0), 0, 0, &map);
        let ant = ants.get_mut(id);
        ant.orders.push(Some(Direction::North));
        ant.orders.push(None);
        ant.orders.push(Some(Direction::West));
        assert_eq!(ants.get(id).order_string(), "n-w");
    }

    #[test]
    fn test_food_contested_removal_keeps_record() {
        let map = map();
        let mut food = FoodItems::new(map.len());
        let id = food.place(Loc::new(1, 1), 3, &map);
        assert_eq!(food.live_count(), 1);

        food.remove(id, 5, None, &map);
        assert_eq!(food.live_count(), 0);
        let record = food.get(id);
        assert_eq!(record.start_turn, 3);
        assert_eq!(record.end_turn, Some(5));
        assert_eq!(record.owner, None);
    }

    #[test]
    fn test_kill_after_move_does_not_clobber_new_occupant() {
        let map = map();
        let mut ants = Ants::new(map.len());
        let a = ants.spawn(Loc::new(0, 0), 0, 0, &map);
        let b = ants.spawn(Loc::new(1, 0), 1, 0, &map);

        // a vacates (0,0), b is re-indexed there, then a dies elsewhere
        ants.clear_cell(Loc::new(0, 0), &map);
        ants.clear_cell(Loc::new(1, 0), &map);
        ants.get_mut(a).loc = Loc::new(0, 1);
        ants.set_cell(Loc::new(0, 1), a, &map);
        ants.get_mut(b).loc = Loc::new(0, 0);
        ants.set_cell(Loc::new(0, 0), b, &map);

        ants.kill(a, 1, &map);
        assert_eq!(ants.at(Loc::new(0, 0), &map), Some(b));
        assert_eq!(ants.at(Loc::new(0, 1), &map), None);
    }
}
