//! Game session: current grid, cumulative score and the terminal flag.
//!
//! The session is the only writer of its state. Every change goes through
//! [`Game::apply_move`], which commits a move only when the grid actually
//! changed, then spawns one random tile and re-checks whether any move is
//! left.

use log::{debug, info, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Grid, Move, Score};

/// What `apply_move` did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The grid changed; a tile was spawned and the score grew by `score_delta`.
    Moved { score_delta: Score },
    /// Nothing would slide or merge in that direction. State untouched.
    Unchanged,
    /// The session was already over. State untouched.
    GameOver,
}

/// Read-only observation handed to renderers after every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: Score,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    grid: Grid,
    score: Score,
    game_over: bool,
    moves: u64,
}

impl Game {
    /// Start a session: empty grid plus two random tiles, score 0.
    ///
    /// ```
    /// use slide_2048::session::Game;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let game = Game::new(&mut rng);
    /// assert_eq!(game.grid().count_empty(), 14);
    /// assert_eq!(game.score(), 0);
    /// assert!(!game.is_game_over());
    /// ```
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let grid = engine::create_empty_grid()
            .with_random_tile(rng)
            .with_random_tile(rng);
        Game::from_grid(grid)
    }

    /// Start a session from a given grid with score 0.
    pub fn from_grid(grid: Grid) -> Self {
        Game {
            grid,
            score: 0,
            game_over: !engine::can_move(grid),
            moves: 0,
        }
    }

    /// Apply one directional command.
    ///
    /// Rejected commands (after game over, or ones that leave the grid as it
    /// is) change nothing and draw nothing from `rng`.
    ///
    /// ```
    /// use slide_2048::engine::{Grid, Move};
    /// use slide_2048::session::{Game, MoveResult};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let mut game = Game::from_grid(Grid::from_rows([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]));
    /// assert_eq!(game.apply_move(Move::Left, &mut rng), MoveResult::Moved { score_delta: 12 });
    /// assert_eq!(game.score(), 12);
    /// ```
    pub fn apply_move<R: Rng + ?Sized>(&mut self, direction: Move, rng: &mut R) -> MoveResult {
        if self.game_over {
            trace!("ignoring {direction}: game is over");
            return MoveResult::GameOver;
        }

        let outcome = engine::shift(self.grid, direction);
        if outcome.grid == self.grid {
            trace!("ignoring {direction}: grid unchanged");
            return MoveResult::Unchanged;
        }

        self.grid = outcome.grid.with_random_tile(rng);
        self.score += outcome.score_delta;
        self.moves += 1;
        self.game_over = !engine::can_move(self.grid);
        debug!(
            "move {} {direction}: +{} -> score {}",
            self.moves, outcome.score_delta, self.score
        );
        if self.game_over {
            info!(
                "game over after {} moves: score {}, highest tile {}",
                self.moves,
                self.score,
                self.grid.highest_tile()
            );
        }
        MoveResult::Moved {
            score_delta: outcome.score_delta,
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Number of committed (grid-changing) moves so far.
    #[inline]
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            score: self.score,
            game_over: self.game_over,
        }
    }

    /// Summary line for sharing a result, e.g. once the game is over.
    pub fn share_text(&self, url: &str) -> String {
        format!("I scored {} points in 2048! {}", self.score, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::{rngs::StdRng, SeedableRng};

    // One left move away from a full grid with no equal neighbours.
    fn almost_stuck() -> Grid {
        Grid::from_rows([[4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 8], [2, 4, 8, 8]])
    }

    #[test]
    fn it_starts_with_two_tiles() {
        let mut rng = StdRng::seed_from_u64(5);
        let game = Game::new(&mut rng);
        assert_eq!(game.grid().count_empty(), 14);
        assert!(game.grid().cells().all(|v| v == 0 || v == 2 || v == 4));
        assert_eq!(game.score(), 0);
        assert_eq!(game.moves(), 0);
        assert!(!game.is_game_over());
    }

    #[test]
    fn it_is_deterministic_for_a_seed() {
        let play = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = Game::new(&mut rng);
            for dir in [Move::Left, Move::Up, Move::Right, Move::Down].repeat(10) {
                game.apply_move(dir, &mut rng);
            }
            game
        };
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn test_merge_row_scores() {
        let mut rng = StepRng::new(0, 0);
        let mut game = Game::from_grid(Grid::from_rows([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]));
        let result = game.apply_move(Move::Left, &mut rng);
        assert_eq!(result, MoveResult::Moved { score_delta: 12 });
        assert_eq!(game.score(), 12);
        assert_eq!(game.moves(), 1);
        // spawned 2 lands in the first empty cell for an all-zero draw
        assert_eq!(
            game.grid(),
            Grid::from_rows([[4, 8, 2, 0], [0; 4], [0; 4], [0; 4]])
        );
    }

    #[test]
    fn test_unchanged_move_is_noop() {
        let start = Grid::from_rows([[2, 4, 0, 0], [8, 2, 0, 0], [4, 0, 0, 0], [0; 4]]);
        let mut game = Game::from_grid(start);
        let mut rng = StdRng::seed_from_u64(3);
        let mut untouched = rng.clone();

        assert_eq!(game.apply_move(Move::Left, &mut rng), MoveResult::Unchanged);
        assert_eq!(game.grid(), start);
        assert_eq!(game.score(), 0);
        assert_eq!(game.moves(), 0);
        assert!(!game.is_game_over());
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_move_into_terminal_state() {
        let mut rng = StepRng::new(0, 0);
        let mut game = Game::from_grid(almost_stuck());
        assert!(!game.is_game_over());

        assert_eq!(
            game.apply_move(Move::Left, &mut rng),
            MoveResult::Moved { score_delta: 16 }
        );
        assert_eq!(
            game.grid(),
            Grid::from_rows([[4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 8], [2, 4, 16, 2]])
        );
        assert_eq!(game.score(), 16);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_game_over_is_absorbing() {
        let mut rng = StepRng::new(0, 0);
        let mut game = Game::from_grid(almost_stuck());
        game.apply_move(Move::Left, &mut rng);
        let before = game.clone();
        for dir in Move::ALL {
            assert_eq!(game.apply_move(dir, &mut rng), MoveResult::GameOver);
        }
        assert_eq!(game, before);
    }

    #[test]
    fn it_flags_stuck_starting_grid() {
        let stuck = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let game = Game::from_grid(stuck);
        assert!(game.is_game_over());
    }

    #[test]
    fn it_snapshots_and_shares() {
        let mut rng = StepRng::new(0, 0);
        let mut game = Game::from_grid(Grid::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]));
        game.apply_move(Move::Left, &mut rng);
        let snap = game.snapshot();
        assert_eq!(snap.score, 4);
        assert!(!snap.game_over);
        assert_eq!(snap.grid, game.grid());
        assert_eq!(
            game.share_text("https://example.com/2048"),
            "I scored 4 points in 2048! https://example.com/2048"
        );
    }

    #[test]
    fn it_serializes_snapshot() {
        let game = Game::from_grid(Grid::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"grid":[[2,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":0,"game_over":false}"#
        );
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game.snapshot());

        let tampered = json.replacen("[[2,", "[[3,", 1);
        assert!(serde_json::from_str::<Snapshot>(&tampered).is_err());
    }
}
