//! Built-in scripted bots.
//!
//! These stand in for real bot subprocesses so a full game can run without
//! an external orchestrator. They consume the engine's actual protocol
//! text, which keeps the encoder honest end to end.

use std::collections::HashSet;

use clap::ValueEnum;
use rand::Rng;
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use formic::game::{DIRECTIONS, Direction, Loc};

/// Selectable bot behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BotKind {
    /// Never issues an order.
    Hold,
    /// Walks every ant in a random passable direction.
    Random,
    /// Greedily walks each ant toward the nearest visible food.
    Gatherer,
}

/// Map geometry and seed from the setup block.
#[derive(Debug, Clone, Copy, Default)]
struct BotStart {
    rows: u16,
    cols: u16,
    player_seed: u64,
}

/// A parsed per-turn view.
#[derive(Debug, Clone, Default)]
struct BotView {
    my_ants: Vec<Loc>,
    food: Vec<Loc>,
}

/// A scripted stand-in for a bot subprocess.
#[derive(Debug)]
pub(crate) struct ScriptedBot {
    kind: BotKind,
    start: BotStart,
    rng: ChaCha8Rng,
    /// Water accumulates across turns; the protocol sends each cell once.
    water: HashSet<Loc>,
}

impl ScriptedBot {
    /// Create a bot; `index` decorrelates the streams of same-kind bots.
    pub(crate) fn new(kind: BotKind, index: usize) -> Self {
        Self {
            kind,
            start: BotStart::default(),
            rng: ChaCha8Rng::seed_from_u64(u64::try_from(index).unwrap_or(0)),
            water: HashSet::new(),
        }
    }

    /// Consume the setup block.
    pub(crate) fn setup(&mut self, text: &str) {
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let (key, value) = (parts.next().unwrap_or(""), parts.next().unwrap_or(""));
            match key {
                "rows" => self.start.rows = value.parse().unwrap_or(1),
                "cols" => self.start.cols = value.parse().unwrap_or(1),
                "player_seed" => self.start.player_seed = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        // Fold the published seed into this bot's stream so runs reproduce
        let index_salt = self.rng.next_u64();
        self.rng = ChaCha8Rng::seed_from_u64(self.start.player_seed ^ index_salt);
    }

    /// Consume one turn's view and produce order lines (without `go`).
    pub(crate) fn orders(&mut self, text: &str) -> Vec<String> {
        let view = self.parse_view(text);
        match self.kind {
            BotKind::Hold => Vec::new(),
            BotKind::Random => self.random_orders(&view),
            BotKind::Gatherer => self.gatherer_orders(&view),
        }
    }

    fn parse_view(&mut self, text: &str) -> BotView {
        let mut view = BotView::default();
        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["w", row, col] => {
                    if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                        self.water.insert(Loc::new(row, col));
                    }
                }
                ["f", row, col] => {
                    if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                        view.food.push(Loc::new(row, col));
                    }
                }
                ["a", row, col, "0"] => {
                    if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                        view.my_ants.push(Loc::new(row, col));
                    }
                }
                _ => {}
            }
        }
        view
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn step(&self, loc: Loc, dir: Direction) -> Loc {
        let (dr, dc) = dir.delta();
        Loc {
            row: (i32::from(loc.row) + dr).rem_euclid(i32::from(self.start.rows.max(1))) as u16,
            col: (i32::from(loc.col) + dc).rem_euclid(i32::from(self.start.cols.max(1))) as u16,
        }
    }

    fn torus_manhattan(&self, a: Loc, b: Loc) -> u32 {
        let dr = u32::from(a.row.abs_diff(b.row));
        let dc = u32::from(a.col.abs_diff(b.col));
        dr.min(u32::from(self.start.rows) - dr) + dc.min(u32::from(self.start.cols) - dc)
    }

    fn random_orders(&mut self, view: &BotView) -> Vec<String> {
        let mut claimed: HashSet<Loc> = view.my_ants.iter().copied().collect();
        let mut orders = Vec::new();
        for &ant in &view.my_ants {
            let offset = self.rng.gen_range(0..4);
            for i in 0..4 {
                let dir = DIRECTIONS[(offset + i) % 4];
                let dest = self.step(ant, dir);
                if self.water.contains(&dest) || claimed.contains(&dest) {
                    continue;
                }
                claimed.remove(&ant);
                claimed.insert(dest);
                orders.push(format!("o {} {} {}", ant.row, ant.col, dir.as_char()));
                break;
            }
        }
        orders
    }

    fn gatherer_orders(&mut self, view: &BotView) -> Vec<String> {
        if view.food.is_empty() {
            return self.random_orders(view);
        }
        let mut claimed: HashSet<Loc> = view.my_ants.iter().copied().collect();
        let mut orders = Vec::new();
        for &ant in &view.my_ants {
            let Some(&target) = view
                .food
                .iter()
                .min_by_key(|&&f| self.torus_manhattan(ant, f))
            else {
                continue;
            };
            let current = self.torus_manhattan(ant, target);
            let offset = self.rng.gen_range(0..4);
            for i in 0..4 {
                let dir = DIRECTIONS[(offset + i) % 4];
                let dest = self.step(ant, dir);
                if self.torus_manhattan(dest, target) >= current
                    || self.water.contains(&dest)
                    || claimed.contains(&dest)
                {
                    continue;
                }
                claimed.remove(&ant);
                claimed.insert(dest);
                orders.push(format!("o {} {} {}", ant.row, ant.col, dir.as_char()));
                break;
            }
        }
        orders
    }
}
