//! Per-player mutable state.
//!
//! Besides the hive and score, each player owns the three structures that
//! implement partial observability: a vision-count grid (overlapping ant
//! view discs, so leaving vision is a decrement instead of a recompute), a
//! monotonic revealed grid gating one-time water discovery, and the
//! identity switch table that renumbers opponents in first-contact order.

use crate::game::PlayerId;
use crate::game::map::Loc;

/// State for a single player.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// This player's global id.
    pub id: PlayerId,
    /// Set when the orchestrator removes the player from participation.
    pub killed: bool,
    /// Current score.
    pub score: i64,
    /// Banked food credits awaiting ant spawn.
    pub hive: u32,
    /// Vision count per cell; a cell is visible while its count is > 0.
    vision: Vec<i32>,
    /// Cells ever observed. Monotonic.
    revealed: Vec<bool>,
    /// Global owner id to private id, assigned in first-contact order.
    switch: Vec<Option<PlayerId>>,
    next_private: PlayerId,
    /// Water cells first revealed this turn, pending protocol delivery.
    pub new_water: Vec<Loc>,
}

impl PlayerState {
    /// Create a player with empty grids and a switch table mapping only
    /// itself (every player perceives itself as id 0).
    #[must_use]
    pub fn new(id: PlayerId, num_players: usize, cells: usize) -> Self {
        let mut switch = vec![None; num_players];
        switch[usize::from(id)] = Some(0);
        Self {
            id,
            killed: false,
            score: 0,
            hive: 0,
            vision: vec![0; cells],
            revealed: vec![false; cells],
            switch,
            next_private: 1,
            new_water: Vec::new(),
        }
    }

    /// Whether the cell at `index` is currently visible.
    #[must_use]
    pub fn sees(&self, index: usize) -> bool {
        self.vision[index] > 0
    }

    /// Whether the cell at `index` has ever been observed.
    #[must_use]
    pub fn has_revealed(&self, index: usize) -> bool {
        self.revealed[index]
    }

    /// The raw vision-count grid (for invariant checks and tests).
    #[must_use]
    pub fn vision_counts(&self) -> &[i32] {
        &self.vision
    }

    /// The switch table (for invariant checks and tests).
    #[must_use]
    pub fn switch_table(&self) -> &[Option<PlayerId>] {
        &self.switch
    }

    /// Increment vision at a cell; on a first-ever reveal of water, queue a
    /// discovery record for this turn's protocol output.
    pub(crate) fn bump_vision(&mut self, index: usize, loc: Loc, is_water: bool) {
        self.vision[index] += 1;
        if self.vision[index] == 1 && !self.revealed[index] {
            self.revealed[index] = true;
            if is_water {
                self.new_water.push(loc);
            }
        }
    }

    /// Decrement vision at a cell.
    pub(crate) fn drop_vision(&mut self, index: usize) {
        self.vision[index] -= 1;
    }

    /// The private id this player uses for `owner`, assigning the next free
    /// id on first contact. The table is a permutation: an owner keeps its
    /// private id forever, even across turns out of view.
    pub fn private_id(&mut self, owner: PlayerId) -> PlayerId {
        let slot = usize::from(owner);
        if let Some(private) = self.switch[slot] {
            return private;
        }
        let private = self.next_private;
        self.switch[slot] = Some(private);
        self.next_private += 1;
        private
    }

    /// Reorder per-owner data into this player's perspective.
    ///
    /// Owners already contacted land at their private index; the rest keep
    /// global order afterwards, without mutating the switch table.
    #[must_use]
    pub fn perspective<T: Copy>(&self, data: &[T]) -> Vec<T> {
        let mut out = vec![None; data.len()];
        for (owner, private) in self.switch.iter().enumerate() {
            if let Some(private) = private {
                out[usize::from(*private)] = Some(data[owner]);
            }
        }
        let mut unassigned = data
            .iter()
            .enumerate()
            .filter(|(owner, _)| self.switch[*owner].is_none())
            .map(|(_, value)| *value);
        out.iter()
            .map(|slot| {
                slot.map_or_else(
                    || unassigned.next().unwrap_or(data[0]),
                    |value| value,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_is_always_zero() {
        let mut player = PlayerState::new(2, 4, 25);
        assert_eq!(player.private_id(2), 0);
        assert_eq!(player.private_id(0), 1);
        assert_eq!(player.private_id(3), 2);
        // Repeat contact keeps the assignment
        assert_eq!(player.private_id(0), 1);
        assert_eq!(player.private_id(2), 0);
    }

    #[test]
    fn test_switch_table_is_a_permutation() {
        let mut player = PlayerState::new(0, 4, 25);
        for owner in [3u8, 1, 2, 3, 1] {
            player.private_id(owner);
        }
        let mut assigned: Vec<PlayerId> =
            player.switch_table().iter().filter_map(|s| *s).collect();
        assigned.sort_unstable();
        assert_eq!(assigned, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_water_reveal_is_one_time() {
        let mut player = PlayerState::new(0, 2, 25);
        let loc = Loc::new(1, 2);
        player.bump_vision(7, loc, true);
        assert_eq!(player.new_water, vec![loc]);
        player.new_water.clear();

        // Leave and re-enter vision: no second discovery
        player.drop_vision(7);
        assert!(!player.sees(7));
        player.bump_vision(7, loc, true);
        assert!(player.new_water.is_empty());
        assert!(player.has_revealed(7));
    }

    #[test]
    fn test_perspective_reorders_scores() {
        let mut player = PlayerState::new(1, 3, 9);
        player.private_id(2); // first contact: global 2 becomes private 1
        let scores = [10i64, 20, 30];
        // Private order: self (20), contacted (30), never-seen (10)
        assert_eq!(player.perspective(&scores), vec![20, 30, 10]);
    }
}
