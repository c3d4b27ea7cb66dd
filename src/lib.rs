//! slide-2048: the deterministic game-state core of a 2048 puzzle
//!
//! This crate provides:
//! - A `Grid` value type with the slide/merge engine (`engine` module)
//! - A `Game` session that applies moves, keeps score and detects the end (`session` module)
//!
//! Randomness is always passed in, so a seeded RNG replays a game exactly.
//!
//! Quick start:
//! ```
//! use slide_2048::engine::{Grid, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Merges keep the tile sum; the score grows by the merged values.
//! let g0 = Grid::from_rows([[2, 2, 4, 4], [0, 0, 0, 0], [8, 0, 0, 8], [0, 0, 0, 0]]);
//! let out = g0.shift(Move::Left);
//! assert_eq!(out.grid.rows()[0], [4, 8, 0, 0]);
//! assert_eq!(out.grid.rows()[2], [16, 0, 0, 0]);
//! assert_eq!(out.grid.tile_sum(), g0.tile_sum());
//! assert_eq!(out.score_delta, 28);
//!
//! // Spawning is driven by the RNG you pass in.
//! let mut rng = StdRng::seed_from_u64(42);
//! let g1 = out.grid.with_random_tile(&mut rng);
//! assert_eq!(g1.count_empty(), out.grid.count_empty() - 1);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use slide_2048::engine::Move;
//! use slide_2048::session::Game;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut game = Game::new(&mut rng);
//! let mut turns = 0u32;
//! while !game.is_game_over() && turns < 1000 {
//!     game.apply_move(Move::ALL[(turns % 4) as usize], &mut rng);
//!     turns += 1;
//! }
//! let _summary = game.share_text("https://example.com/2048");
//! ```
//!
pub mod engine;
pub mod session;

pub use engine::{Grid, GridError, Move, MoveOutcome, ParseMoveError};
pub use session::{Game, MoveResult, Snapshot};
