//! From-scratch chess rules engine operating on UCI move strings.
//!
//! Owns the board, side to move, castling rights, en-passant file, halfmove
//! clock and repetition history; validates and applies moves; generates
//! legal moves; detects check, checkmate, stalemate and the draw rules.
//! No search, no evaluation, no I/O.

pub mod movegen;
pub mod state;
pub mod types;

pub use movegen::*;
pub use state::{CastlingRights, GameState};
pub use types::*;
