//! Constraint solving for the 9×9 puzzle.
//!
//! [`Game`] holds the board, [`solve`]/[`solvable`] implement the
//! depth-first search and its pre-flight gate, and [`CachedPuzzleSolver`]
//! keeps the frame loop responsive by answering from a recently-used cache
//! while at most one background task does the actual searching.

mod cache;
mod digit_set;
mod game;
mod search;

pub use cache::CachedPuzzleSolver;
pub use digit_set::{DigitSet, Digits};
pub use game::Game;
pub use search::{solvable, solve};
