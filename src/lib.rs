//! # Castellan
//!
//! A chess rules library: board representation, legal move generation,
//! validated move application with undo, FEN parsing/serialization and
//! game outcome evaluation.
pub mod board;
pub mod core;
pub mod utils;

pub use board::{Board, BoardState, GameStatus};
pub use core::*;
