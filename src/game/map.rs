//! Torus map, wrap-around arithmetic, and the map-file format.
//!
//! All wrap-around arithmetic in the engine goes through [`Map`]: the
//! distance between two cells is the minimum of direct and wrapped offsets
//! per axis, squared Euclidean for vision and attack radii, Manhattan for
//! pathfinding heuristics. Nothing else in the crate does its own modulo.

use std::collections::HashMap;

use crate::error::SetupError;
use crate::game::{MAX_PLAYERS, PlayerId};

/// A cell location as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loc {
    /// Row index.
    pub row: u16,
    /// Column index.
    pub col: u16,
}

impl Loc {
    /// Create a new location.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// One of the four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Decreasing row.
    North,
    /// Increasing column.
    East,
    /// Increasing row.
    South,
    /// Decreasing column.
    West,
}

/// All directions, in protocol order.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Parse a protocol direction character (`n`, `e`, `s`, `w`).
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'n' | 'N' => Some(Direction::North),
            'e' | 'E' => Some(Direction::East),
            's' | 'S' => Some(Direction::South),
            'w' | 'W' => Some(Direction::West),
            _ => None,
        }
    }

    /// The protocol character for this direction.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::East => 'e',
            Direction::South => 's',
            Direction::West => 'w',
        }
    }

    /// Row/col delta for this direction (before wrapping).
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// Contents of a single map cell.
///
/// Hills are not cells: a hill coexists with land or ant occupancy and is
/// tracked separately by location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Empty, passable land.
    Land,
    /// Impassable water; immutable for the game's duration.
    Water,
    /// A food item.
    Food,
    /// A live ant belonging to the given player.
    Ant(PlayerId),
}

/// A relative cell offset `(d_row, d_col)`.
pub type Offset = (i16, i16);

/// The game map: a torus grid of [`Cell`]s.
#[derive(Debug, Clone)]
pub struct Map {
    rows: u16,
    cols: u16,
    cells: Vec<Cell>,
}

/// A parsed map file: the grid plus the entities encoded in it.
#[derive(Debug, Clone)]
pub struct ParsedMap {
    /// The terrain grid (ants appear as occupied cells).
    pub map: Map,
    /// Declared player count.
    pub players: usize,
    /// Hill locations with owners, in file order.
    pub hills: Vec<(Loc, PlayerId)>,
    /// Explicit ant glyphs, in file order.
    pub ants: Vec<(Loc, PlayerId)>,
    /// Food glyphs, in file order.
    pub food: Vec<Loc>,
}

impl Map {
    /// Create a map filled with land.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let cells = vec![Cell::Land; usize::from(rows) * usize::from(cols)];
        Some(Self { rows, cols, cells })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Total cell count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the map has zero cells (never true for a constructed map).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert a location to an index into the cell array.
    #[must_use]
    #[inline]
    pub fn index(&self, loc: Loc) -> usize {
        usize::from(loc.row) * usize::from(self.cols) + usize::from(loc.col)
    }

    /// Convert a cell index back to a location.
    #[must_use]
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn loc_at(&self, index: usize) -> Loc {
        Loc {
            row: (index / usize::from(self.cols)) as u16,
            col: (index % usize::from(self.cols)) as u16,
        }
    }

    /// Get the cell at a location.
    #[must_use]
    #[inline]
    pub fn get(&self, loc: Loc) -> Cell {
        self.cells[self.index(loc)]
    }

    /// Set the cell at a location.
    #[inline]
    pub fn set(&mut self, loc: Loc, cell: Cell) {
        let idx = self.index(loc);
        self.cells[idx] = cell;
    }

    /// Iterate all locations and cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Loc, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.loc_at(idx), *cell))
    }

    /// Count of land cells (anything that is not water).
    #[must_use]
    pub fn land_area(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Water).count()
    }

    /// The cell one step in `dir` from `loc`, wrapping at the edges.
    #[must_use]
    pub fn destination(&self, loc: Loc, dir: Direction) -> Loc {
        let (dr, dc) = dir.delta();
        self.offset_loc(loc, (dr as i16, dc as i16))
    }

    /// Apply a relative offset to a location, wrapping at the edges.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn offset_loc(&self, loc: Loc, offset: Offset) -> Loc {
        let rows = i32::from(self.rows);
        let cols = i32::from(self.cols);
        Loc {
            row: (i32::from(loc.row) + i32::from(offset.0)).rem_euclid(rows) as u16,
            col: (i32::from(loc.col) + i32::from(offset.1)).rem_euclid(cols) as u16,
        }
    }

    /// Apply a whole-map translation in cells, wrapping at the edges.
    ///
    /// Like [`Map::offset_loc`] but for deltas that may exceed the `i16`
    /// offset range (symmetry translations span the whole map).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn translate(&self, loc: Loc, delta: (i32, i32)) -> Loc {
        Loc {
            row: (i32::from(loc.row) + delta.0).rem_euclid(i32::from(self.rows)) as u16,
            col: (i32::from(loc.col) + delta.1).rem_euclid(i32::from(self.cols)) as u16,
        }
    }

    /// The minimum-image offset from `a` to `b` on the torus.
    ///
    /// Each component has the smallest absolute value among the direct and
    /// wrapped displacements; used by symmetry detection and replay
    /// reconstruction, not by distance math.
    #[must_use]
    pub fn offset_between(&self, a: Loc, b: Loc) -> (i32, i32) {
        let wrap = |from: u16, to: u16, size: u16| -> i32 {
            let direct = i32::from(to) - i32::from(from);
            let size = i32::from(size);
            let wrapped = direct.rem_euclid(size);
            if wrapped * 2 > size {
                wrapped - size
            } else {
                wrapped
            }
        };
        (
            wrap(a.row, b.row, self.rows),
            wrap(a.col, b.col, self.cols),
        )
    }

    /// Squared Euclidean distance under the minimum-image convention.
    #[must_use]
    pub fn distance2(&self, a: Loc, b: Loc) -> u32 {
        let dr = u32::from(a.row.abs_diff(b.row));
        let dc = u32::from(a.col.abs_diff(b.col));
        let dr = dr.min(u32::from(self.rows) - dr);
        let dc = dc.min(u32::from(self.cols) - dc);
        dr * dr + dc * dc
    }

    /// Manhattan distance under the minimum-image convention.
    #[must_use]
    pub fn manhattan(&self, a: Loc, b: Loc) -> u32 {
        let dr = u32::from(a.row.abs_diff(b.row));
        let dc = u32::from(a.col.abs_diff(b.col));
        dr.min(u32::from(self.rows) - dr) + dc.min(u32::from(self.cols) - dc)
    }

    /// Parse the classic map-file format.
    ///
    /// ```text
    /// rows 4
    /// cols 4
    /// players 2
    /// m .0..
    /// m .%%.
    /// m .%%.
    /// m ..1.
    /// ```
    ///
    /// Glyphs: `.` land, `%` water, `*` food, `0`-`9` hill, `a`-`j` ant,
    /// `A`-`J` ant standing on its own hill.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] for missing headers, dimension mismatches,
    /// unknown glyphs, or out-of-range owners. Hill-count fairness is
    /// checked by [`crate::game::Game`] construction, not here, so that
    /// hill-less test fixtures still parse.
    pub fn parse(text: &str) -> Result<ParsedMap, SetupError> {
        let mut rows: Option<usize> = None;
        let mut cols: Option<usize> = None;
        let mut players: Option<usize> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, ' ');
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("").trim();
            match key {
                "rows" => rows = value.parse().ok(),
                "cols" => cols = value.parse().ok(),
                "players" => players = value.parse().ok(),
                "m" => body.push(value),
                _ => {}
            }
        }

        let rows = rows.ok_or(SetupError::MissingField("rows"))?;
        let cols = cols.ok_or(SetupError::MissingField("cols"))?;
        let players = players.ok_or(SetupError::MissingField("players"))?;

        if players == 0 {
            return Err(SetupError::ZeroPlayers);
        }
        if players > MAX_PLAYERS {
            return Err(SetupError::TooManyPlayers(players));
        }
        if rows == 0 || cols == 0 || rows > usize::from(u16::MAX) || cols > usize::from(u16::MAX) {
            return Err(SetupError::BadDimensions { rows, cols });
        }
        if body.len() != rows {
            return Err(SetupError::RowCount {
                declared: rows,
                found: body.len(),
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut map = Map::new(rows as u16, cols as u16).ok_or(SetupError::BadDimensions {
            rows,
            cols,
        })?;
        let mut hills = Vec::new();
        let mut ants = Vec::new();
        let mut food = Vec::new();

        for (r, line) in body.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != cols {
                return Err(SetupError::RowLength {
                    row: r,
                    declared: cols,
                    found: chars.len(),
                });
            }
            for (c, ch) in chars.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let loc = Loc::new(r as u16, c as u16);
                match ch {
                    '.' => {}
                    '%' => map.set(loc, Cell::Water),
                    '*' => {
                        map.set(loc, Cell::Food);
                        food.push(loc);
                    }
                    '0'..='9' => {
                        let owner = (*ch as usize) - ('0' as usize);
                        check_owner(owner, players)?;
                        hills.push((loc, owner as PlayerId));
                    }
                    'a'..='j' => {
                        let owner = (*ch as usize) - ('a' as usize);
                        check_owner(owner, players)?;
                        map.set(loc, Cell::Ant(owner as PlayerId));
                        ants.push((loc, owner as PlayerId));
                    }
                    'A'..='J' => {
                        let owner = (*ch as usize) - ('A' as usize);
                        check_owner(owner, players)?;
                        map.set(loc, Cell::Ant(owner as PlayerId));
                        hills.push((loc, owner as PlayerId));
                        ants.push((loc, owner as PlayerId));
                    }
                    _ => {
                        return Err(SetupError::InvalidCharacter {
                            row: r,
                            col: c,
                            ch: *ch,
                        });
                    }
                }
            }
        }

        Ok(ParsedMap {
            map,
            players,
            hills,
            ants,
            food,
        })
    }

    /// Render the grid back to `m` lines, overlaying the given hills.
    ///
    /// Used to embed the original map in the replay summary.
    #[must_use]
    pub fn render(&self, hills: &[(Loc, PlayerId)]) -> Vec<String> {
        let hill_at: HashMap<Loc, PlayerId> = hills.iter().copied().collect();
        let mut lines = Vec::with_capacity(usize::from(self.rows));
        for r in 0..self.rows {
            let mut line = String::with_capacity(usize::from(self.cols));
            for c in 0..self.cols {
                let loc = Loc::new(r, c);
                let hill = hill_at.get(&loc).copied();
                let glyph = match (self.get(loc), hill) {
                    (Cell::Water, _) => '%',
                    (Cell::Food, _) => '*',
                    (Cell::Ant(owner), Some(hill_owner)) if owner == hill_owner => {
                        char::from(b'A' + owner)
                    }
                    (Cell::Ant(owner), _) => char::from(b'a' + owner),
                    (Cell::Land, Some(owner)) => char::from(b'0' + owner),
                    (Cell::Land, None) => '.',
                };
                line.push(glyph);
            }
            lines.push(line);
        }
        lines
    }
}

fn check_owner(owner: usize, players: usize) -> Result<(), SetupError> {
    if owner >= players {
        return Err(SetupError::PlayerOutOfRange {
            owner,
            declared: players,
        });
    }
    Ok(())
}

/// Cached neighborhood offset lists, keyed by squared radius.
///
/// Owned by the game instance so concurrent games never share state. An
/// offset list for radius `r2` holds every `(d_row, d_col)` with
/// `0 < d_row² + d_col² <= r2`; the origin is excluded because a cell is
/// never its own neighbor.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    cache: HashMap<u32, Vec<Offset>>,
}

impl Neighborhood {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (if needed) the offset list for a squared radius.
    pub fn ensure(&mut self, radius2: u32) {
        self.cache.entry(radius2).or_insert_with(|| {
            let mut offsets = Vec::new();
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
                        offsets.push((dr as i16, dc as i16));
                    }
                }
            }
            // Deterministic order for all downstream iteration
            offsets.sort_unstable();
            offsets
        });
    }

    /// The offset list for a squared radius built by [`Neighborhood::ensure`].
    ///
    /// Returns an empty slice for a radius that was never built.
    #[must_use]
    pub fn offsets(&self, radius2: u32) -> &[Offset] {
        self.cache.get(&radius2).map_or(&[], Vec::as_slice)
    }

    /// Distinct squared distances occurring within a radius, ascending.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn shells(&self, radius2: u32) -> Vec<u32> {
        let mut shells: Vec<u32> = self
            .offsets(radius2)
            .iter()
            .map(|&(dr, dc)| {
                let dr = i32::from(dr);
                let dc = i32::from(dc);
                (dr * dr + dc * dc) as u32
            })
            .collect();
        shells.sort_unstable();
        shells.dedup();
        shells
    }
}
