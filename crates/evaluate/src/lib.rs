//! Engine ELO evaluation against Stockfish.
//!
//! This crate provides infrastructure for:
//! - Running UCI matches between a test engine and Stockfish at fixed strengths
//! - Estimating a performance ELO from the match scores
//! - Logging games as PGN and reporting results
//!
//! # Usage
//!
//! ```bash
//! # Adaptive evaluation, 10 matches of 2 games each
//! cargo run -p evaluate -- ./my_engine --matches 10 --games 2 --movetime 100
//!
//! # Linear sweep over a fixed ELO range with PGN logs
//! cargo run -p evaluate -- ./my_engine --strategy linear --min-elo 1000 --max-elo 2200 --pgn
//! ```

pub mod config;
pub mod elo;
pub mod match_runner;
pub mod openings;
pub mod pgn;
pub mod results;
pub mod strategy;

pub use config::{ConfigError, EvalConfig};
pub use elo::{performance_rating, RatingError};
pub use match_runner::{
    engine_score, play_game, run_match, GameRecord, MatchConfig, MatchResult, Outcome,
    Termination,
};
pub use strategy::{evaluate_engine, EvalError, EvaluationResult, Strategy};
