//! Run a match between a test engine and Stockfish via UCI.
//!
//! Game termination is always derived from our own rules engine rather
//! than trusted from either engine's self-report.

use chess_rules::{has_legal_moves, validate_move, GameState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uci_client::{MoveProvider, UciEngine, UciError};

use crate::openings::random_opening;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    ThreefoldRepetition,
    FiftyMoveRule,
    IllegalMove,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::ThreefoldRepetition => "threefold_repetition",
            Termination::FiftyMoveRule => "fifty_move_rule",
            Termination::IllegalMove => "illegal_move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl Outcome {
    pub fn pgn(self) -> &'static str {
        match self {
            Outcome::WhiteWins => "1-0",
            Outcome::BlackWins => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }

    fn loss_for(side_is_white: bool) -> Outcome {
        if side_is_white {
            Outcome::BlackWins
        } else {
            Outcome::WhiteWins
        }
    }
}

/// Result of a single game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_number: u32,
    pub engine_is_white: bool,
    pub outcome: Outcome,
    /// Points for the test engine: 1.0 / 0.5 / 0.0.
    pub engine_score: f64,
    pub moves: Vec<String>,
    pub termination: Termination,
}

/// Aggregated result of a multi-game match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub total_score: f64,
    pub num_games: u32,
    pub games: Vec<GameRecord>,
}

/// Configuration for one match against Stockfish at a fixed strength.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub engine_path: String,
    pub stockfish_path: String,
    pub stockfish_elo: u32,
    pub num_games: u32,
    pub movetime_ms: u64,
    pub use_openings: bool,
}

/// Play a single game. Ends on checkmate, stalemate, threefold repetition,
/// the fifty-move rule, or an illegal-move forfeit.
pub fn play_game<'a>(
    white: &mut (dyn MoveProvider + 'a),
    black: &mut (dyn MoveProvider + 'a),
    movetime_ms: u64,
    opening: &[&str],
) -> Result<(Outcome, Vec<String>, Termination), UciError> {
    white.new_game()?;
    black.new_game()?;

    let mut state = GameState::new();
    let mut moves: Vec<String> = Vec::new();

    for mv in opening {
        moves.push(mv.to_string());
        state
            .push_uci(mv)
            .unwrap_or_else(|e| panic!("bad opening move {mv}: {e}"));
    }

    loop {
        let white_to_move = moves.len() % 2 == 0;
        let engine = if white_to_move {
            &mut *white
        } else {
            &mut *black
        };

        let (bestmove, _score) = engine.go(&moves, movetime_ms)?;

        if bestmove == "(none)" || bestmove == "0000" {
            // The engine claims it has no legal moves. The rules engine is
            // the ground truth for what that means.
            if !has_legal_moves(&state) {
                if state.is_in_check() {
                    return Ok((
                        Outcome::loss_for(white_to_move),
                        moves,
                        Termination::Checkmate,
                    ));
                }
                return Ok((Outcome::Draw, moves, Termination::Stalemate));
            }
            warn!(
                engine = engine.label(),
                "engine reported no legal moves in a playable position"
            );
            return Ok((
                Outcome::loss_for(white_to_move),
                moves,
                Termination::IllegalMove,
            ));
        }

        if !validate_move(&state, &bestmove) {
            warn!(engine = engine.label(), mv = %bestmove, "illegal move from engine");
            // The position itself may have no legal continuation.
            if !has_legal_moves(&state) {
                if state.is_in_check() {
                    return Ok((
                        Outcome::loss_for(white_to_move),
                        moves,
                        Termination::Checkmate,
                    ));
                }
                return Ok((Outcome::Draw, moves, Termination::Stalemate));
            }
            // Legal moves exist but the engine sent an illegal one: forfeit.
            return Ok((
                Outcome::loss_for(white_to_move),
                moves,
                Termination::IllegalMove,
            ));
        }

        state
            .push_uci(&bestmove)
            .unwrap_or_else(|e| panic!("validated move failed to parse: {e}"));
        moves.push(bestmove);
        debug!(ply = moves.len(), mv = %moves[moves.len() - 1]);

        // Independent checkmate / stalemate detection after each move.
        if !has_legal_moves(&state) {
            let mated_is_white = moves.len() % 2 == 0;
            if state.is_in_check() {
                return Ok((
                    Outcome::loss_for(mated_is_white),
                    moves,
                    Termination::Checkmate,
                ));
            }
            return Ok((Outcome::Draw, moves, Termination::Stalemate));
        }

        if state.is_threefold_repetition() {
            return Ok((Outcome::Draw, moves, Termination::ThreefoldRepetition));
        }

        if state.is_fifty_move_rule() {
            return Ok((Outcome::Draw, moves, Termination::FiftyMoveRule));
        }
    }
}

/// Run a match of `num_games` between the test engine and Stockfish.
///
/// The test engine alternates colors, playing white in game 0. Stockfish
/// strength is fixed via `UCI_LimitStrength`/`UCI_Elo`. `on_game` is
/// invoked after each completed game (used for PGN logging).
pub fn run_match(
    config: &MatchConfig,
    mut on_game: Option<&mut dyn FnMut(&GameRecord)>,
) -> Result<MatchResult, UciError> {
    let mut engine = UciEngine::start(&config.engine_path)?;
    let mut stockfish = UciEngine::start(&config.stockfish_path)?;
    stockfish.set_option("UCI_LimitStrength", "true")?;
    stockfish.set_option("UCI_Elo", &config.stockfish_elo.to_string())?;

    let mut result = MatchResult {
        total_score: 0.0,
        num_games: config.num_games,
        games: Vec::new(),
    };
    let mut rng = rand::thread_rng();

    for game_num in 0..config.num_games {
        let engine_is_white = game_num % 2 == 0;
        let opening: &[&str] = if config.use_openings {
            random_opening(&mut rng)
        } else {
            &[]
        };

        let (outcome, moves, termination) = if engine_is_white {
            play_game(&mut engine, &mut stockfish, config.movetime_ms, opening)?
        } else {
            play_game(&mut stockfish, &mut engine, config.movetime_ms, opening)?
        };

        let record = GameRecord {
            game_number: game_num + 1,
            engine_is_white,
            outcome,
            engine_score: engine_score(outcome, engine_is_white),
            moves,
            termination,
        };

        info!(
            game = record.game_number,
            result = outcome.pgn(),
            color = if engine_is_white { "white" } else { "black" },
            termination = termination.as_str(),
            plies = record.moves.len(),
            "game finished"
        );

        result.total_score += record.engine_score;
        if let Some(cb) = on_game.as_mut() {
            cb(&record);
        }
        result.games.push(record);
    }

    Ok(result)
}

/// Points for the test engine given the game outcome and its color.
pub fn engine_score(outcome: Outcome, engine_is_white: bool) -> f64 {
    match outcome {
        Outcome::Draw => 0.5,
        Outcome::WhiteWins => {
            if engine_is_white {
                1.0
            } else {
                0.0
            }
        }
        Outcome::BlackWins => {
            if engine_is_white {
                0.0
            } else {
                1.0
            }
        }
    }
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
