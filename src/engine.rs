use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the square grid.
pub const GRID_SIZE: usize = 4;

/// Cell value: 0 for empty, otherwise a power of two (2, 4, 8, ...).
pub type Tile = u32;
pub type Score = u64;
/// One row (or, after a transpose, one column) of the grid.
pub type Line = [Tile; GRID_SIZE];
type Rows = [Line; GRID_SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in a fixed order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("tile {value} at ({row}, {col}) is not a power of two of at least 2")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("empty direction")]
    Empty,
    #[error("unknown direction: {0:?}")]
    Unknown(String),
}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Accepts full names, vi keys (hjkl), WASD and ANSI arrow-key sequences.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoveError::Empty);
        }
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" | "w" | "k" | "\x1b[a" => Ok(Move::Up),
            "down" | "s" | "j" | "\x1b[b" => Ok(Move::Down),
            "right" | "r" | "d" | "\x1b[c" => Ok(Move::Right),
            "left" | "l" | "a" | "h" | "\x1b[d" => Ok(Move::Left),
            _ => Err(ParseMoveError::Unknown(s.to_string())),
        }
    }
}

/// Grid plus the score earned by the merges that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    pub score_delta: Score,
}

/// 4x4 2048 grid holding actual tile values, row-major.
///
/// `Grid` is `Copy`: every operation returns a fresh grid and callers compare
/// grids by value to detect whether a move changed anything. Deserializing
/// checks every cell the same way `try_from_rows` does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Rows")]
pub struct Grid(Rows);

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid([[0; GRID_SIZE]; GRID_SIZE]);

    /// Build a grid from literal rows.
    ///
    /// Debug builds panic if a cell is neither 0 nor a power of two >= 2;
    /// use `try_from_rows` for rows that come from outside the program.
    #[inline]
    pub fn from_rows(rows: [[Tile; GRID_SIZE]; GRID_SIZE]) -> Self {
        debug_assert!(
            validate_rows(&rows).is_ok(),
            "tile is not a power of two of at least 2: {rows:?}"
        );
        Grid(rows)
    }

    pub fn try_from_rows(rows: [[Tile; GRID_SIZE]; GRID_SIZE]) -> Result<Self, GridError> {
        validate_rows(&rows)?;
        Ok(Grid(rows))
    }

    #[inline]
    pub fn rows(&self) -> &[[Tile; GRID_SIZE]; GRID_SIZE] {
        &self.0
    }

    /// Value at (`row`, `col`), 0 if empty. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    /// Return the grid resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use slide_2048::engine::{Grid, Move};
    /// let g = Grid::from_rows([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
    /// let out = g.shift(Move::Left);
    /// assert_eq!(out.grid.rows()[0], [4, 8, 0, 0]);
    /// assert_eq!(out.score_delta, 12);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> MoveOutcome {
        shift(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty cell, using the provided RNG.
    ///
    /// A full grid comes back unchanged and no randomness is consumed.
    ///
    /// ```
    /// use slide_2048::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let g = Grid::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        add_random_tile(self, rng)
    }

    /// Spawn a tile from the thread RNG; games built this way cannot be replayed.
    #[inline]
    pub fn with_random_tile_thread(self) -> Self {
        insert_random_tile(self)
    }

    /// True if some direction would change the grid.
    #[inline]
    pub fn can_move(self) -> bool {
        can_move(self)
    }

    /// Count the number of empty cells on the grid.
    pub fn count_empty(self) -> usize {
        self.cells().filter(|&v| v == 0).count()
    }

    /// Return the highest tile value present on the grid (0 when empty).
    pub fn highest_tile(self) -> Tile {
        self.cells().max().unwrap_or(0)
    }

    /// Sum of every tile value on the grid.
    pub fn tile_sum(self) -> Score {
        self.cells().map(Score::from).sum()
    }

    /// Iterate over cell values in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Tile> {
        self.0.into_iter().flatten()
    }

    fn empty_cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..GRID_SIZE)
            .flat_map(|r| (0..GRID_SIZE).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.0[r][c] == 0)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:?})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{}", "-".repeat(GRID_SIZE * 8 - 1))?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl TryFrom<Rows> for Grid {
    type Error = GridError;

    fn try_from(rows: Rows) -> Result<Self, Self::Error> {
        Grid::try_from_rows(rows)
    }
}

fn validate_rows(rows: &Rows) -> Result<(), GridError> {
    for (row, line) in rows.iter().enumerate() {
        for (col, &value) in line.iter().enumerate() {
            if value != 0 && !(value >= 2 && value.is_power_of_two()) {
                return Err(GridError::InvalidTile { row, col, value });
            }
        }
    }
    Ok(())
}

/// A grid with every cell empty.
pub fn create_empty_grid() -> Grid {
    Grid::EMPTY
}

/// Place a 2 (90%) or 4 (10%) in a uniformly chosen empty cell.
///
/// The cell is drawn first, then the value. Full grids are returned as-is.
pub fn add_random_tile<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Grid {
    let empty: Vec<(usize, usize)> = grid.empty_cells().collect();
    if empty.is_empty() {
        return grid;
    }
    let (row, col) = empty[rng.gen_range(0..empty.len())];
    let mut rows = grid.0;
    rows[row][col] = generate_random_tile(rng);
    Grid(rows)
}

/// `add_random_tile` driven by the thread RNG.
///
/// Sessions and tests pass their own (seeded) RNG to `add_random_tile` instead.
pub fn insert_random_tile(grid: Grid) -> Grid {
    let mut rng = rand::thread_rng();
    add_random_tile(grid, &mut rng)
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        2
    } else {
        4
    }
}

pub fn transpose(grid: Grid) -> Grid {
    let mut out = [[0; GRID_SIZE]; GRID_SIZE];
    for (r, row) in grid.0.iter().enumerate() {
        for (c, &val) in row.iter().enumerate() {
            out[c][r] = val;
        }
    }
    Grid(out)
}

pub fn reverse_rows(grid: Grid) -> Grid {
    let mut out = grid.0;
    for row in out.iter_mut() {
        row.reverse();
    }
    Grid(out)
}

/// Slide one line toward index 0, merging equal neighbours once each.
///
/// Returns the new line and the sum of the merged tile values.
pub fn slide_and_merge(line: Line) -> (Line, Score) {
    let mut out = [0; GRID_SIZE];
    let mut score_delta = 0;
    let mut tiles = line.into_iter().filter(|&v| v != 0).peekable();
    let mut idx = 0;
    while let Some(tile) = tiles.next() {
        // a merged tile is never looked at again in this pass
        match tiles.peek().and_then(|&next| merged_tile(tile, next)) {
            Some(merged) => {
                tiles.next();
                out[idx] = merged;
                score_delta += Score::from(merged);
            }
            None => out[idx] = tile,
        }
        idx += 1;
    }
    (out, score_delta)
}

/// The tile two neighbours merge into, if they are equal and the double fits a `Tile`.
fn merged_tile(a: Tile, b: Tile) -> Option<Tile> {
    if a != b {
        return None;
    }
    Tile::try_from(Score::from(a) * 2).ok()
}

/// Slide/merge tiles in the given direction. No randomness.
///
/// Every direction is reduced to "slide left" by orienting the grid first,
/// then mapped back with the inverse transform.
pub fn shift(grid: Grid, direction: Move) -> MoveOutcome {
    let oriented = match direction {
        Move::Left => grid,
        Move::Right => reverse_rows(grid),
        Move::Up => transpose(grid),
        Move::Down => reverse_rows(transpose(grid)),
    };

    let mut rows = [[0; GRID_SIZE]; GRID_SIZE];
    let mut score_delta = 0;
    for (out, &line) in rows.iter_mut().zip(oriented.0.iter()) {
        let (merged, delta) = slide_and_merge(line);
        *out = merged;
        score_delta += delta;
    }
    let slid = Grid(rows);

    let grid = match direction {
        Move::Left => slid,
        Move::Right => reverse_rows(slid),
        Move::Up => transpose(slid),
        // inverse of transpose-then-reverse; the order matters
        Move::Down => transpose(reverse_rows(slid)),
    };
    MoveOutcome { grid, score_delta }
}

/// True if any cell is empty or can merge with its right or lower neighbour.
pub fn can_move(grid: Grid) -> bool {
    let g = &grid.0;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            if g[r][c] == 0 {
                return true;
            }
            if c + 1 < GRID_SIZE && merged_tile(g[r][c], g[r][c + 1]).is_some() {
                return true;
            }
            if r + 1 < GRID_SIZE && merged_tile(g[r][c], g[r + 1][c]).is_some() {
                return true;
            }
        }
    }
    false
}

fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{:^7}", x),
    }
}
