//! Game state and the turn pipeline.
//!
//! One turn runs leaves-first: movement, combat, hill razing, spawning,
//! food gathering, food spawning, vision, then cutoff/rank detection. The
//! whole pipeline is synchronous and deterministic given the map, the two
//! seeds, and the set of submitted orders; replay fidelity depends on it.

use std::collections::HashMap;

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::SetupError;
use crate::game::combat::resolve_combat;
use crate::game::config::GameConfig;
use crate::game::entities::{Ants, FoodItems, Hill};
use crate::game::food::{FoodSpawner, gather_food};
use crate::game::map::{Cell, Direction, Loc, Map, Neighborhood, ParsedMap};
use crate::game::orders::{MoveOutcome, resolve_movement, triage_moves};
use crate::game::player::PlayerState;
use crate::game::protocol::{render_full_state, render_player_start, render_player_view};
use crate::game::symmetry::detect_translations;
use crate::game::vision::{VisionEvent, VisionTracker};
use crate::game::{MAX_PLAYERS, PlayerId, invariants};
use crate::replay::{AntRecord, FoodRecord, HillRecord, Replay, ReplayMap, ReplayParameters};

/// The dominant party tracked by cutoff detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutoffParty {
    Player(PlayerId),
    /// Food accumulating on the map counts as its own virtual party.
    Food,
}

/// A point-in-time stats snapshot, serializable for the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct GameStats {
    /// Current turn.
    pub turn: u32,
    /// Live ants per player.
    pub ant_count: Vec<usize>,
    /// Banked hive food per player.
    pub hive: Vec<u32>,
    /// Food items on the map.
    pub food: usize,
    /// Current scores, global player order.
    pub scores: Vec<i64>,
    /// Liveness per player.
    pub alive: Vec<bool>,
    /// Game-over reason, once the game has ended.
    pub cutoff: Option<String>,
}

/// The complete game engine.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    map: Map,
    hood: Neighborhood,
    tracker: VisionTracker,
    ants: Ants,
    food: FoodItems,
    hills: Vec<Hill>,
    players: Vec<PlayerState>,
    spawner: FoodSpawner,
    engine_rng: ChaCha8Rng,
    turn: u32,
    /// Accepted orders this turn, per player, keyed by source cell index.
    orders: Vec<HashMap<usize, Direction>>,
    /// Death records this turn, at post-move locations.
    deaths: Vec<(Loc, PlayerId)>,
    /// Vision changes this turn, pending the vision phase.
    events: Vec<VisionEvent>,
    hill_killed_this_turn: bool,
    cutoff_streak: u32,
    cutoff_party: Option<CutoffParty>,
    cutoff_reason: Option<String>,
    over: bool,
    /// Per-player score per turn, for replay and the visualizer.
    score_history: Vec<Vec<i64>>,
    /// Per-player hive per turn.
    hive_history: Vec<Vec<u32>>,
    /// Lone-survivor bonus, applied by `finish_game`.
    bonus: Vec<i64>,
    /// The original map render embedded in the replay.
    map_render: Vec<String>,
}

impl Game {
    /// Build a game from a map file.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] for any condition under which no valid game
    /// exists: unparseable map, a player without a hill, or unequal hill
    /// counts.
    pub fn from_map_text(text: &str, config: GameConfig) -> Result<Self, SetupError> {
        Self::new(Map::parse(text)?, config)
    }

    /// Build a game from an already-parsed map.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] when hill configuration is invalid.
    pub fn new(parsed: ParsedMap, config: GameConfig) -> Result<Self, SetupError> {
        let ParsedMap {
            map,
            players: num_players,
            hills,
            ants: initial_ants,
            food: initial_food,
        } = parsed;

        debug_assert!(num_players <= MAX_PLAYERS);
        let mut hill_counts = vec![0usize; num_players];
        for &(_, owner) in &hills {
            hill_counts[usize::from(owner)] += 1;
        }
        if let Some(player) = hill_counts.iter().position(|&c| c == 0) {
            return Err(SetupError::NoHills(player));
        }
        if hill_counts.windows(2).any(|w| w[0] != w[1]) {
            return Err(SetupError::AsymmetricHills(hill_counts));
        }

        let mut hood = Neighborhood::new();
        hood.ensure(config.viewradius2);
        hood.ensure(config.attackradius2);
        hood.ensure(config.spawnradius2);
        let tracker = VisionTracker::new(config.viewradius2);

        let map_render = map.render(&hills);

        let translations = detect_translations(&map, &hills, num_players);
        log::debug!(
            "setup: {}x{} map, {num_players} players, symmetry {}",
            map.rows(),
            map.cols(),
            if translations.is_some() { "found" } else { "none" }
        );

        let mut start_regions = vec![Vec::new(); num_players];
        for &(loc, owner) in &hills {
            start_regions[usize::from(owner)].push(loc);
        }

        let hills: Vec<Hill> = hills
            .iter()
            .map(|&(loc, owner)| Hill {
                loc,
                owner,
                end_turn: None,
                killed_by: None,
                raze_points_applied: false,
                last_touched: 0,
            })
            .collect();

        let mut players: Vec<PlayerState> = (0..num_players)
            .map(|p| {
                #[allow(clippy::cast_possible_truncation)]
                let mut state = PlayerState::new(p as PlayerId, num_players, map.len());
                // Scores begin at hills-per-player so a fully razed player
                // cannot go negative from razes alone
                state.score = i64::try_from(hill_counts[p]).unwrap_or(0);
                state
            })
            .collect();

        let mut game_map = map;
        let mut ants = Ants::new(game_map.len());
        let mut events = Vec::new();
        for &(loc, owner) in &initial_ants {
            ants.spawn(loc, owner, 0, &game_map);
            game_map.set(loc, Cell::Ant(owner));
            events.push(VisionEvent::Spawned { owner, loc });
        }
        let mut food = FoodItems::new(game_map.len());
        for &loc in &initial_food {
            food.place(loc, 0, &game_map);
            game_map.set(loc, Cell::Food);
        }

        // Initial explicit entities are visible from the first state
        tracker.apply(&events, &game_map, &mut players);

        let spawner = FoodSpawner::new(config.food_placement, translations, start_regions);

        Ok(Self {
            engine_rng: ChaCha8Rng::seed_from_u64(config.engine_seed),
            config,
            map: game_map,
            hood,
            tracker,
            ants,
            food,
            hills,
            orders: vec![HashMap::new(); num_players],
            players,
            spawner,
            turn: 0,
            deaths: Vec::new(),
            events: Vec::new(),
            hill_killed_this_turn: false,
            cutoff_streak: 0,
            cutoff_party: None,
            cutoff_reason: None,
            over: false,
            score_history: vec![Vec::new(); num_players],
            hive_history: vec![Vec::new(); num_players],
            bonus: vec![0; num_players],
            map_render,
        })
    }

    /// Spawn the initial ants and food; must run once before turn 1.
    pub fn start_game(&mut self) {
        // One ant on every hill
        let mut events = Vec::new();
        for hill in &self.hills {
            if hill.is_standing() && self.ants.at(hill.loc, &self.map).is_none() {
                self.ants.spawn(hill.loc, hill.owner, 0, &self.map);
                self.map.set(hill.loc, Cell::Ant(hill.owner));
                events.push(VisionEvent::Spawned {
                    owner: hill.owner,
                    loc: hill.loc,
                });
            }
        }
        self.tracker.apply(&events, &self.map, &mut self.players);

        // One initial food per `food_start` land cells, per player
        let land = u64::try_from(self.map.land_area()).unwrap_or(0);
        let per_player = land / u64::from(self.config.food_start.max(1));
        let initial = per_player * u64::try_from(self.players.len()).unwrap_or(1);
        self.spawner.add_pending(initial);
        let placed = self.spawner.place(
            &mut self.map,
            &mut self.food,
            &self.hills,
            0,
            &mut self.engine_rng,
        );
        log::debug!("start: {} initial food placed", placed.len());

        self.record_history();
    }

    /// Begin a new turn: bump the counter and forget last turn's orders.
    pub fn start_turn(&mut self) {
        self.turn += 1;
        for orders in &mut self.orders {
            orders.clear();
        }
        log::trace!("turn {} started", self.turn);
    }

    /// Parse and validate one player's order submission.
    ///
    /// Never fails: bad lines are classified and echoed back in the
    /// outcome, and the player's unaffected ants proceed normally. Orders
    /// from a killed player are accepted but their submission is pointless;
    /// the orchestrator normally stops asking.
    pub fn do_moves(&mut self, player: PlayerId, lines: &[String]) -> MoveOutcome {
        triage_moves(
            &self.map,
            &self.ants,
            player,
            lines,
            &mut self.orders[usize::from(player)],
        )
    }

    /// Run the full turn pipeline over the submitted orders.
    pub fn finish_turn(&mut self) {
        self.deaths.clear();
        self.events.clear();
        self.hill_killed_this_turn = false;
        for player in &mut self.players {
            player.new_water.clear();
        }

        self.phase_movement();
        self.phase_combat();
        self.phase_raze_hills();
        self.phase_spawn_ants();
        self.phase_gather_food();
        self.phase_spawn_food();

        let events = std::mem::take(&mut self.events);
        self.tracker.apply(&events, &self.map, &mut self.players);

        self.record_history();
        self.detect_game_over();
        invariants::assert_invariants(self);
    }

    fn phase_movement(&mut self) {
        let result = resolve_movement(&mut self.map, &mut self.ants, &self.orders, self.turn);
        log::debug!(
            "turn {}: movement, {} collision deaths",
            self.turn,
            result.deaths.len()
        );
        self.deaths.extend(result.deaths);
        self.events.extend(result.events);
    }

    fn phase_combat(&mut self) {
        let kills = resolve_combat(
            self.config.combat,
            &self.map,
            &self.ants,
            &self.hood,
            self.config.attackradius2,
        );
        log::debug!("turn {}: combat, {} deaths", self.turn, kills.len());
        for id in kills {
            let (loc, owner) = {
                let ant = self.ants.get(id);
                (ant.loc, ant.owner)
            };
            self.ants.kill(id, self.turn, &self.map);
            self.map.set(loc, Cell::Land);
            self.deaths.push((loc, owner));
            self.events.push(VisionEvent::Died { owner, loc });
        }
    }

    fn phase_raze_hills(&mut self) {
        for hill in &mut self.hills {
            if !hill.is_standing() {
                continue;
            }
            let Some(id) = self.ants.at(hill.loc, &self.map) else {
                continue;
            };
            let occupier = self.ants.get(id).owner;
            if occupier == hill.owner {
                // The owner touching its own hill refreshes spawn priority
                hill.last_touched = self.turn;
                continue;
            }
            hill.end_turn = Some(self.turn);
            hill.killed_by = Some(occupier);
            self.hill_killed_this_turn = true;
            if !hill.raze_points_applied {
                hill.raze_points_applied = true;
                self.players[usize::from(occupier)].score += self.config.raze_bounty;
                self.players[usize::from(hill.owner)].score -= self.config.raze_penalty;
            }
            log::debug!(
                "turn {}: hill of player {} at {:?} razed by player {occupier}",
                self.turn,
                hill.owner,
                hill.loc
            );
        }
    }

    fn phase_spawn_ants(&mut self) {
        for p in 0..self.players.len() {
            if self.players[p].killed {
                continue;
            }
            loop {
                if self.players[p].hive == 0 {
                    break;
                }
                // Least recently touched standing, unoccupied hill first;
                // ties break on the engine stream
                let candidate = self
                    .hills
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| {
                        usize::from(h.owner) == p
                            && h.is_standing()
                            && self.ants.at(h.loc, &self.map).is_none()
                    })
                    .map(|(i, h)| (h.last_touched, self.engine_rng.next_u32(), i))
                    .min();
                let Some((_, _, index)) = candidate else {
                    break;
                };
                let (loc, owner) = (self.hills[index].loc, self.hills[index].owner);
                self.players[p].hive -= 1;
                self.hills[index].last_touched = self.turn;
                self.ants.spawn(loc, owner, self.turn, &self.map);
                self.map.set(loc, Cell::Ant(owner));
                self.events.push(VisionEvent::Spawned { owner, loc });
            }
        }
    }

    fn phase_gather_food(&mut self) {
        let result = gather_food(
            &self.map,
            &self.ants,
            &self.food,
            &self.hood,
            self.config.spawnradius2,
        );
        for (id, owner) in result.gathered {
            let loc = self.food.get(id).loc;
            self.food.remove(id, self.turn, Some(owner), &self.map);
            self.map.set(loc, Cell::Land);
            self.players[usize::from(owner)].hive += 1;
        }
        for id in result.contested {
            let loc = self.food.get(id).loc;
            self.food.remove(id, self.turn, None, &self.map);
            self.map.set(loc, Cell::Land);
        }
    }

    fn phase_spawn_food(&mut self) {
        let live = (0..self.players.len())
            .filter(|&p| {
                #[allow(clippy::cast_possible_truncation)]
                let id = p as PlayerId;
                self.is_alive(id)
            })
            .count();
        self.spawner
            .accrue(live, self.config.food_rate, self.config.food_turn);
        let placed = self.spawner.place(
            &mut self.map,
            &mut self.food,
            &self.hills,
            self.turn,
            &mut self.engine_rng,
        );
        log::trace!(
            "turn {}: {} food placed, {} still pending",
            self.turn,
            placed.len(),
            self.spawner.pending()
        );
    }

    fn record_history(&mut self) {
        for (p, player) in self.players.iter().enumerate() {
            self.score_history[p].push(player.score);
            self.hive_history[p].push(player.hive);
        }
    }

    fn detect_game_over(&mut self) {
        let alive: Vec<PlayerId> = self.alive_players();
        if alive.is_empty() {
            self.end_game("extermination");
            return;
        }
        if alive.len() == 1 && self.players.len() > 1 {
            self.end_game("lone survivor");
            return;
        }
        if self.turn >= self.config.turns {
            self.end_game("turn limit reached");
            return;
        }
        self.track_cutoff();
        if self.cutoff_streak >= self.config.cutoff_turn {
            let reason = match self.cutoff_party {
                Some(CutoffParty::Food) => "food not being gathered",
                _ => "ants not razing hills",
            };
            self.end_game(reason);
            return;
        }
        if self.rank_stabilized() {
            self.end_game("rank stabilized");
        }
    }

    fn end_game(&mut self, reason: &str) {
        log::debug!("turn {}: game over, {reason}", self.turn);
        self.over = true;
        self.cutoff_reason = Some(reason.to_string());
    }

    /// Track population concentration: each player's share is its ants plus
    /// banked hive food; food on the map counts toward a virtual FOOD
    /// party. A hill kill resets the streak.
    fn track_cutoff(&mut self) {
        if self.hill_killed_this_turn {
            self.cutoff_streak = 0;
            self.cutoff_party = None;
            return;
        }

        let mut parties: Vec<(CutoffParty, u64)> = self
            .players
            .iter()
            .enumerate()
            .map(|(p, player)| {
                #[allow(clippy::cast_possible_truncation)]
                let id = p as PlayerId;
                let count = u64::try_from(self.ants.live_count(id)).unwrap_or(0)
                    + u64::from(player.hive);
                (CutoffParty::Player(id), count)
            })
            .collect();
        parties.push((
            CutoffParty::Food,
            u64::try_from(self.food.live_count()).unwrap_or(0),
        ));

        let total: u64 = parties.iter().map(|(_, c)| c).sum();
        if total == 0 {
            self.cutoff_streak = 0;
            self.cutoff_party = None;
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let dominant = parties
            .iter()
            .find(|(_, count)| (*count as f64) / (total as f64) >= self.config.cutoff_percent)
            .map(|(party, _)| *party);

        match dominant {
            Some(party) if self.cutoff_party == Some(party) => self.cutoff_streak += 1,
            Some(party) => {
                self.cutoff_party = Some(party);
                self.cutoff_streak = 1;
            }
            None => {
                self.cutoff_party = None;
                self.cutoff_streak = 0;
            }
        }
    }

    /// Ranks are stable when no live player that still owns a hill could
    /// catch or overtake anyone, assuming it razes every standing enemy
    /// hill while the other player loses every hill it owns. Preserved
    /// comparison-for-comparison from the original heuristic: a hill-less
    /// player is never a candidate, which deliberately ignores raze
    /// sequences running through already-razed positions.
    fn rank_stabilized(&self) -> bool {
        if self.players.len() < 2 {
            return false;
        }
        for (p, player) in self.players.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let id = p as PlayerId;
            if !self.is_alive(id) {
                continue;
            }
            let own_hills = self
                .hills
                .iter()
                .filter(|h| h.is_standing() && h.owner == id)
                .count();
            if own_hills == 0 {
                continue;
            }
            let standing_enemy_hills = self
                .hills
                .iter()
                .filter(|h| h.is_standing() && h.owner != id)
                .count();
            let max_score = player.score
                + self.config.raze_bounty * i64::try_from(standing_enemy_hills).unwrap_or(0);
            for (o, other) in self.players.iter().enumerate() {
                if o == p {
                    continue;
                }
                #[allow(clippy::cast_possible_truncation)]
                let other_id = o as PlayerId;
                let other_hills = self
                    .hills
                    .iter()
                    .filter(|h| h.is_standing() && h.owner == other_id)
                    .count();
                let min_score = other.score
                    - self.config.raze_penalty * i64::try_from(other_hills).unwrap_or(0);
                let could_catch = player.score < other.score && max_score >= min_score;
                let could_break_tie = player.score == other.score && max_score > min_score;
                if could_catch || could_break_tie {
                    return false;
                }
            }
        }
        true
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.over
    }

    /// The reason the game ended, once it has.
    #[must_use]
    pub fn cutoff_reason(&self) -> Option<&str> {
        self.cutoff_reason.as_deref()
    }

    /// Remove a player from future participation (timeouts, crashes).
    ///
    /// The player's lingering ants keep holding; the game continues for
    /// everyone else.
    pub fn kill_player(&mut self, player: PlayerId) {
        self.players[usize::from(player)].killed = true;
        log::debug!("player {player} removed by the orchestrator");
    }

    /// Whether a player is still in the game: not orchestrator-killed and
    /// owning at least one live ant.
    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        !self.players[usize::from(player)].killed && self.ants.live_count(player) > 0
    }

    fn alive_players(&self) -> Vec<PlayerId> {
        (0..self.players.len())
            .filter_map(|p| {
                #[allow(clippy::cast_possible_truncation)]
                let id = p as PlayerId;
                self.is_alive(id).then_some(id)
            })
            .collect()
    }

    /// The setup block for one player.
    #[must_use]
    pub fn get_player_start(&self, _player: PlayerId) -> String {
        render_player_start(&self.config, &self.map)
    }

    /// The visible-state diff for one player this turn.
    ///
    /// Mutable because a first contact assigns a private id in the
    /// player's switch table.
    pub fn get_player_state(&mut self, player: PlayerId) -> String {
        render_player_view(
            &self.map,
            &self.ants,
            &self.food,
            &self.hills,
            &self.deaths,
            &mut self.players[usize::from(player)],
            self.turn,
        )
    }

    /// The unfiltered full-state diff for replay/streaming consumers.
    #[must_use]
    pub fn get_state(&self) -> String {
        render_full_state(&self.ants, &self.food, &self.hills, &self.deaths, self.turn)
    }

    /// Current scores: global order, or one player's perspective order.
    #[must_use]
    pub fn get_scores(&self, player: Option<PlayerId>) -> Vec<i64> {
        let scores: Vec<i64> = self.players.iter().map(|p| p.score).collect();
        match player {
            None => scores,
            Some(p) => self.players[usize::from(p)].perspective(&scores),
        }
    }

    /// A serializable stats snapshot.
    #[must_use]
    pub fn get_stats(&self) -> GameStats {
        GameStats {
            turn: self.turn,
            ant_count: (0..self.players.len())
                .map(|p| {
                    #[allow(clippy::cast_possible_truncation)]
                    let id = p as PlayerId;
                    self.ants.live_count(id)
                })
                .collect(),
            hive: self.players.iter().map(|p| p.hive).collect(),
            food: self.food.live_count(),
            scores: self.get_scores(None),
            alive: (0..self.players.len())
                .map(|p| {
                    #[allow(clippy::cast_possible_truncation)]
                    let id = p as PlayerId;
                    self.is_alive(id)
                })
                .collect(),
            cutoff: self.cutoff_reason.clone(),
        }
    }

    /// Apply end-of-game accounting: a sole survivor collects the bounty
    /// for every standing enemy hill, as if newly razed.
    pub fn finish_game(&mut self) {
        if self.cutoff_reason.is_none() {
            let reason = if self.turn >= self.config.turns {
                "turn limit reached"
            } else {
                "game stopped"
            };
            self.cutoff_reason = Some(reason.to_string());
        }
        self.over = true;

        let alive = self.alive_players();
        if let [survivor] = alive.as_slice() {
            let survivor = *survivor;
            let bounty: i64 = self.config.raze_bounty
                * i64::try_from(
                    self.hills
                        .iter()
                        .filter(|h| h.is_standing() && h.owner != survivor)
                        .count(),
                )
                .unwrap_or(0);
            self.bonus[usize::from(survivor)] = bounty;
            self.players[usize::from(survivor)].score += bounty;
        }
    }

    /// Build the replay summary for a finished game.
    #[must_use]
    pub fn get_replay(&self) -> Replay {
        Replay {
            revision: 3,
            players: self.players.len(),
            parameters: ReplayParameters {
                loadtime: self.config.loadtime_ms,
                turntime: self.config.turntime_ms,
                turns: self.config.turns,
                viewradius2: self.config.viewradius2,
                attackradius2: self.config.attackradius2,
                spawnradius2: self.config.spawnradius2,
                food_rate: self.config.food_rate,
                food_turn: self.config.food_turn,
                food_start: self.config.food_start,
                cutoff_turn: self.config.cutoff_turn,
                cutoff_percent: self.config.cutoff_percent,
                player_seed: self.config.player_seed,
                engine_seed: self.config.engine_seed,
            },
            map: ReplayMap {
                rows: self.map.rows(),
                cols: self.map.cols(),
                data: self.map_render.clone(),
            },
            ants: self
                .ants
                .records()
                .iter()
                .map(|ant| AntRecord {
                    row: ant.initial_loc.row,
                    col: ant.initial_loc.col,
                    spawn_turn: ant.spawn_turn,
                    die_turn: ant.die_turn,
                    owner: ant.owner,
                    orders: ant.order_string(),
                })
                .collect(),
            food: self
                .food
                .records()
                .iter()
                .map(|item| FoodRecord {
                    row: item.loc.row,
                    col: item.loc.col,
                    start_turn: item.start_turn,
                    end_turn: item.end_turn,
                    owner: item.owner,
                })
                .collect(),
            hills: self
                .hills
                .iter()
                .map(|hill| HillRecord {
                    row: hill.loc.row,
                    col: hill.loc.col,
                    owner: hill.owner,
                    razed_turn: hill.end_turn,
                    killed_by: hill.killed_by,
                })
                .collect(),
            scores: self.score_history.clone(),
            hive_history: self.hive_history.clone(),
            bonus: self.bonus.clone(),
            cutoff: self.cutoff_reason.clone().unwrap_or_default(),
            winning_turn: self.turn,
        }
    }

    // Accessors used by invariants, tests, and the CLI.

    /// Current turn number.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The map.
    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// The ant arena.
    #[must_use]
    pub const fn ants(&self) -> &Ants {
        &self.ants
    }

    /// The food arena.
    #[must_use]
    pub const fn food_items(&self) -> &FoodItems {
        &self.food
    }

    /// All hills.
    #[must_use]
    pub fn hills(&self) -> &[Hill] {
        &self.hills
    }

    /// Per-player states.
    #[must_use]
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::FoodPlacement;

    // Hills at (0,0) and (4,4): squared distance 32, far outside combat
    // range even across the torus seams.
    const ARENA: &str = "\
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

    fn quiet_config() -> GameConfig {
        GameConfig {
            food_rate: 0,
            food_start: u32::MAX,
            food_placement: FoodPlacement::Random,
            ..GameConfig::default()
        }
    }

    fn game(text: &str, config: GameConfig) -> Game {
        let mut game = Game::from_map_text(text, config).unwrap();
        game.start_game();
        game
    }

    fn run_turn(game: &mut Game, moves: &[(PlayerId, &str)]) {
        game.start_turn();
        for &(player, line) in moves {
            let outcome = game.do_moves(player, &[line.to_string()]);
            assert!(
                outcome.invalid.is_empty() && outcome.ignored.is_empty(),
                "unexpected triage for {line}: {outcome:?}"
            );
        }
        game.finish_turn();
    }

    #[test]
    fn test_setup_rejects_hill_less_player() {
        let text = "rows 2\ncols 2\nplayers 2\nm 0.\nm ..\n";
        let err = Game::from_map_text(text, GameConfig::default()).unwrap_err();
        assert_eq!(err, SetupError::NoHills(1));
    }

    #[test]
    fn test_setup_rejects_asymmetric_hills() {
        let text = "rows 2\ncols 6\nplayers 2\nm 00..1.\nm ......\n";
        let err = Game::from_map_text(text, GameConfig::default()).unwrap_err();
        assert_eq!(err, SetupError::AsymmetricHills(vec![2, 1]));
    }

    #[test]
    fn test_start_game_spawns_hill_ants_and_scores() {
        let game = game(ARENA, quiet_config());
        assert_eq!(game.ants().live_count(0), 1);
        assert_eq!(game.ants().live_count(1), 1);
        // Scores begin at hills-per-player
        assert_eq!(game.get_scores(None), vec![1, 1]);
        assert!(game.is_alive(0));
        assert!(game.is_alive(1));
    }

    #[test]
    fn test_basic_movement_turn() {
        let mut game = game(ARENA, quiet_config());
        run_turn(&mut game, &[(0, "o 0 0 e")]);
        assert_eq!(game.map().get(Loc::new(0, 1)), Cell::Ant(0));
        assert_eq!(game.map().get(Loc::new(0, 0)), Cell::Land);
        assert!(!game.game_over());
    }

    #[test]
    fn test_missing_orders_mean_hold() {
        let mut game = game(ARENA, quiet_config());
        game.start_turn();
        game.finish_turn();
        assert_eq!(game.map().get(Loc::new(0, 0)), Cell::Ant(0));
        assert_eq!(game.map().get(Loc::new(4, 4)), Cell::Ant(1));
    }

    #[test]
    fn test_gathered_food_banks_and_spawns() {
        let text = "\
rows 3
cols 9
players 2
m ..0*.....
m .........
m .....*1..
";
        let mut game = game(text, quiet_config());
        game.start_turn();
        game.finish_turn();
        // Both hills are occupied, so the banked food waits in the hive
        assert_eq!(game.players()[0].hive, 1);
        assert_eq!(game.players()[1].hive, 1);
        assert_eq!(game.food_items().live_count(), 0);

        // Move the hill ants away; the hive food spawns replacements
        run_turn(&mut game, &[(0, "o 0 2 s"), (1, "o 2 6 n")]);
        assert_eq!(game.players()[0].hive, 0);
        assert_eq!(game.players()[1].hive, 0);
        assert_eq!(game.ants().live_count(0), 2);
        assert_eq!(game.ants().live_count(1), 2);
        assert_eq!(game.map().get(Loc::new(0, 2)), Cell::Ant(0));
        assert_eq!(game.map().get(Loc::new(2, 6)), Cell::Ant(1));
    }

    #[test]
    fn test_contested_food_credits_nobody() {
        let text = "\
rows 3
cols 9
players 2
m ..a*b....
m .........
m ..0...1..
";
        // Keep attack range below the flankers' separation so combat does
        // not clear them before the gather phase runs
        let mut config = quiet_config();
        config.attackradius2 = 1;
        let mut game = game(text, config);
        game.start_turn();
        game.finish_turn();
        // Ants of both players flank the food: destroyed, uncredited
        assert_eq!(game.players()[0].hive, 0);
        assert_eq!(game.players()[1].hive, 0);
        assert_eq!(game.food_items().live_count(), 0);
        let record = game.food_items().records()[0];
        assert_eq!(record.owner, None);
        assert_eq!(record.end_turn, Some(1));
    }

    #[test]
    fn test_raze_scores_once() {
        let text = "\
rows 5
cols 7
players 2
m .......
m .......
m .0...1.
m .......
m .......
";
        let mut game = game(text, quiet_config());

        // March player 0's ant onto the enemy hill while the enemy keeps
        // its distance, staying outside attackradius2 = 5 the whole way.
        run_turn(&mut game, &[(0, "o 2 1 e"), (1, "o 2 5 e")]);
        run_turn(&mut game, &[(0, "o 2 2 e"), (1, "o 2 6 n")]);
        run_turn(&mut game, &[(0, "o 2 3 e"), (1, "o 1 6 n")]);
        run_turn(&mut game, &[(0, "o 2 4 e"), (1, "o 0 6 e")]);

        // Bounty 2 to the razer, penalty 1 to the owner
        assert_eq!(game.get_scores(None), vec![3, 0]);
        let hill = game.hills().iter().find(|h| h.owner == 1).unwrap();
        assert!(!hill.is_standing());
        assert_eq!(hill.killed_by, Some(0));
        assert_eq!(hill.end_turn, Some(4));
        assert!(hill.raze_points_applied);

        // With the loser's only hill gone, no candidate can change the
        // order any more
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("rank stabilized"));
    }

    #[test]
    fn test_rank_not_stabilized_while_tied_with_hills() {
        let mut game = game(ARENA, quiet_config());
        // Tied scores with standing hills: either player could still raze
        // and break the tie, so the game keeps going
        run_turn(&mut game, &[]);
        assert!(!game.game_over());
    }

    #[test]
    fn test_collision_deaths_reach_protocol() {
        let text = "\
rows 3
cols 7
players 2
m .0...1.
m .......
m .......
";
        let mut config = quiet_config();
        config.attackradius2 = 1;
        let mut game = game(text, config);

        // Walk toward each other until both claim the middle cell
        run_turn(&mut game, &[(0, "o 0 1 e"), (1, "o 0 5 w")]);
        game.start_turn();
        game.do_moves(0, &["o 0 2 e".to_string()]);
        game.do_moves(1, &["o 0 4 w".to_string()]);
        game.finish_turn();

        assert_eq!(game.ants().live_count(0), 0);
        assert_eq!(game.ants().live_count(1), 0);
        let state = game.get_state();
        assert!(state.contains("d 0 3 0\n"));
        assert!(state.contains("d 0 3 1\n"));
        // Extermination is detected immediately
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("extermination"));
    }

    #[test]
    fn test_cutoff_by_dominance() {
        let text = "\
rows 2
cols 6
players 2
m 0..1..
m ......
";
        let mut config = quiet_config();
        config.cutoff_turn = 3;
        config.cutoff_percent = 0.6;
        let mut game = game(text, config);

        // Pad player 0's hive so its share stays at 4/5 = 80%
        game.players[0].hive = 3;
        for _ in 0..3 {
            game.start_turn();
            game.finish_turn();
            if game.game_over() {
                break;
            }
        }
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("ants not razing hills"));
    }

    #[test]
    fn test_cutoff_food_variant() {
        let text = "\
rows 2
cols 6
players 2
m 0..1..
m ......
";
        let mut config = quiet_config();
        config.cutoff_turn = 2;
        config.cutoff_percent = 0.6;
        // A zero gather radius keeps the dropped food on the board
        config.spawnradius2 = 0;
        let mut game = game(text, config);

        // Drop uneaten food on the board until it dominates: 4 food vs 2
        // ants = 4/6 = 66%
        game.spawner.add_pending(4);
        for _ in 0..2 {
            game.start_turn();
            game.finish_turn();
            if game.game_over() {
                break;
            }
        }
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("food not being gathered"));
    }

    #[test]
    fn test_hill_kill_resets_cutoff_streak() {
        let text = "\
rows 2
cols 6
players 2
m 0..1..
m ......
";
        let mut config = quiet_config();
        config.cutoff_turn = 3;
        config.cutoff_percent = 0.6;
        let mut game = game(text, config);
        game.players[0].hive = 3;

        game.start_turn();
        game.finish_turn();
        assert_eq!(game.cutoff_streak, 1);

        // A raze in turn 2 resets the streak even though dominance holds
        game.start_turn();
        game.hill_killed_this_turn = true;
        game.track_cutoff();
        assert_eq!(game.cutoff_streak, 0);
    }

    #[test]
    fn test_turn_limit_reached() {
        let mut config = quiet_config();
        config.turns = 2;
        let mut game = game(ARENA, config);
        game.start_turn();
        game.finish_turn();
        assert!(!game.game_over());
        game.start_turn();
        game.finish_turn();
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("turn limit reached"));
    }

    #[test]
    fn test_killed_player_ants_linger_and_hold() {
        let mut game = game(ARENA, quiet_config());
        game.kill_player(1);
        run_turn(&mut game, &[(0, "o 0 0 e")]);
        // The orphan ant still exists and held its cell
        assert_eq!(game.ants().live_count(1), 1);
        assert_eq!(game.map().get(Loc::new(4, 4)), Cell::Ant(1));
        assert!(!game.is_alive(1));
        // And the game ended as lone survivor
        assert!(game.game_over());
        assert_eq!(game.cutoff_reason(), Some("lone survivor"));
    }

    #[test]
    fn test_finish_game_awards_survivor_bonus() {
        let mut game = game(ARENA, quiet_config());
        game.kill_player(1);
        game.start_turn();
        game.finish_turn();
        game.finish_game();
        // Survivor collects the standing enemy hill bounty: 1 + 2 = 3
        assert_eq!(game.get_scores(None), vec![3, 1]);
        let replay = game.get_replay();
        assert_eq!(replay.bonus, vec![2, 0]);
        assert_eq!(replay.cutoff, "lone survivor");
    }

    #[test]
    fn test_player_state_is_fogged() {
        let mut rows = vec!["0...................".to_string()];
        for r in 1..20 {
            if r == 10 {
                rows.push("..........1.........".to_string());
            } else {
                rows.push(".".repeat(20));
            }
        }
        let text = format!(
            "rows 20\ncols 20\nplayers 2\n{}\n",
            rows.iter()
                .map(|r| format!("m {r}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let mut game = game(&text, quiet_config());
        game.start_turn();
        let view = game.get_player_state(0);
        // Own ant and hill visible, self always rendered as player 0
        assert!(view.contains("a 0 0 0\n"));
        assert!(view.contains("h 0 0 0\n"));
        // The enemy at (10,10) is far outside viewradius2 = 77
        assert!(!view.contains("a 10 10"));
        assert!(!view.contains("h 10 10"));
        game.finish_turn();
    }

    #[test]
    fn test_get_stats_snapshot() {
        let mut game = game(ARENA, quiet_config());
        game.start_turn();
        game.finish_turn();
        let stats = game.get_stats();
        assert_eq!(stats.turn, 1);
        assert_eq!(stats.ant_count, vec![1, 1]);
        assert_eq!(stats.alive, vec![true, true]);
        assert_eq!(stats.cutoff, None);
        // Serializes cleanly for the orchestrator
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"turn\":1"));
    }

    #[test]
    fn test_determinism_same_seeds_same_game() {
        let text = ARENA;
        let config = GameConfig {
            food_rate: 5,
            food_turn: 4,
            food_start: 10,
            engine_seed: 777,
            food_placement: FoodPlacement::Random,
            ..GameConfig::default()
        };

        let run = |config: GameConfig| -> (String, Vec<i64>) {
            let mut game = Game::from_map_text(text, config).unwrap();
            game.start_game();
            for _ in 0..20 {
                game.start_turn();
                game.do_moves(0, &["o 0 0 e".to_string()]);
                game.finish_turn();
                if game.game_over() {
                    break;
                }
            }
            (game.get_state(), game.get_scores(None))
        };

        let (state_a, scores_a) = run(config);
        let (state_b, scores_b) = run(config);
        assert_eq!(state_a, state_b);
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_scores_in_player_perspective() {
        let mut game = game(ARENA, quiet_config());
        game.players[1].score = 5;
        // Before contact, player 0 sees itself first and the rest in
        // global order
        assert_eq!(game.get_scores(Some(0)), vec![1, 5]);
        assert_eq!(game.get_scores(Some(1)), vec![5, 1]);
    }
}
