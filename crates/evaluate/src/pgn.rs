//! PGN game logging. Each finished game is written as a standalone
//! PGN file with SAN move text derived from the recorded UCI moves.

use std::fs;
use std::path::{Path, PathBuf};

use chess_rules::{
    file_of, has_legal_moves, is_piece_move_pattern_valid, rank_of, sq_to_coord,
    would_leave_king_in_check, GameState, ParseMoveError, Piece, PieceKind, UciMove,
};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::match_runner::GameRecord;

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("malformed recorded move: {0}")]
    Move(#[from] ParseMoveError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn piece_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Pawn => 'P',
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
    }
}

fn file_char(sq: u8) -> char {
    (b'a' + file_of(sq) as u8) as char
}

fn rank_char(sq: u8) -> char {
    (b'1' + rank_of(sq) as u8) as char
}

/// Convert a move to Standard Algebraic Notation given the position it is
/// played from. The state is not modified and no check suffix is added.
pub fn uci_to_san(state: &GameState, mv: UciMove) -> String {
    let piece = match state.piece_at(mv.from) {
        Some(p) => p,
        None => return mv.to_uci(),
    };
    let target = state.piece_at(mv.to);
    let mut is_capture = target.is_some();

    // En passant: a pawn moving diagonally to an empty square.
    if piece.kind == PieceKind::Pawn
        && file_of(mv.to) != file_of(mv.from)
        && target.is_none()
    {
        is_capture = true;
    }

    if piece.kind == PieceKind::King && (mv.to as i16 - mv.from as i16).abs() == 2 {
        return if mv.to > mv.from {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let mut san = String::new();

    if piece.kind == PieceKind::Pawn {
        if is_capture {
            san.push(file_char(mv.from));
            san.push('x');
        }
        san.push_str(&sq_to_coord(mv.to));
        if let Some(promo) = mv.promo {
            san.push('=');
            san.push(piece_letter(promo));
        }
    } else {
        san.push(piece_letter(piece.kind));
        san.push_str(&disambiguate(state, piece, mv.from, mv.to));
        if is_capture {
            san.push('x');
        }
        san.push_str(&sq_to_coord(mv.to));
    }

    san
}

/// Disambiguation string (file, rank, or both) when another piece of the
/// same kind and color could also legally reach the destination.
fn disambiguate(state: &GameState, piece: Piece, from: u8, to: u8) -> String {
    let mut ambiguous: Vec<u8> = Vec::new();
    for sq in 0..64u8 {
        if sq == from {
            continue;
        }
        if state.piece_at(sq) != Some(piece) {
            continue;
        }
        if let Some(target) = state.piece_at(to) {
            if target.color == piece.color {
                continue;
            }
        }
        if !is_piece_move_pattern_valid(state, sq, to) {
            continue;
        }
        if would_leave_king_in_check(state, sq, to) {
            continue;
        }
        ambiguous.push(sq);
    }

    if ambiguous.is_empty() {
        return String::new();
    }

    let same_file = ambiguous.iter().any(|&sq| file_of(sq) == file_of(from));
    let same_rank = ambiguous.iter().any(|&sq| rank_of(sq) == rank_of(from));

    if !same_file {
        file_char(from).to_string()
    } else if !same_rank {
        rank_char(from).to_string()
    } else {
        format!("{}{}", file_char(from), rank_char(from))
    }
}

fn check_suffix(state: &GameState) -> &'static str {
    if state.is_in_check() {
        if has_legal_moves(state) {
            "+"
        } else {
            "#"
        }
    } else {
        ""
    }
}

/// Convert a full game's UCI move list to numbered PGN move text.
pub fn moves_to_san(uci_moves: &[String]) -> Result<String, ParseMoveError> {
    let mut state = GameState::new();
    let mut parts: Vec<String> = Vec::new();

    for (i, text) in uci_moves.iter().enumerate() {
        let mv = UciMove::parse(text)?;
        let san = uci_to_san(&state, mv);
        state.apply(mv);
        let san = format!("{}{}", san, check_suffix(&state));

        if i % 2 == 0 {
            parts.push(format!("{}. {}", i / 2 + 1, san));
        } else {
            parts.push(san);
        }
    }

    Ok(parts.join(" "))
}

/// Generate a complete PGN document for a single game.
pub fn game_to_pgn(
    game: &GameRecord,
    match_number: u32,
    stockfish_elo: u32,
    engine_name: &str,
    date: &str,
) -> Result<String, PgnError> {
    let stockfish_name = format!("Stockfish {stockfish_elo}");
    let (white_name, black_name, white_elo, black_elo) = if game.engine_is_white {
        (
            engine_name.to_string(),
            stockfish_name,
            "?".to_string(),
            stockfish_elo.to_string(),
        )
    } else {
        (
            stockfish_name,
            engine_name.to_string(),
            stockfish_elo.to_string(),
            "?".to_string(),
        )
    };

    let move_text = moves_to_san(&game.moves)?;
    let result = game.outcome.pgn();

    let tags = [
        ("Event", format!("ELO Evaluation vs Stockfish {stockfish_elo}")),
        ("Date", date.to_string()),
        ("Round", format!("{match_number}.{}", game.game_number)),
        ("White", white_name),
        ("Black", black_name),
        ("Result", result.to_string()),
        ("WhiteElo", white_elo),
        ("BlackElo", black_elo),
        ("Termination", game.termination.as_str().to_string()),
    ];

    let mut out = String::new();
    for (key, value) in &tags {
        out.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    out.push('\n');
    out.push_str(&format!("{move_text} {result}\n"));

    Ok(out)
}

/// Create `game_logs/{engine_name}_{timestamp}/` and return its path.
pub fn create_log_dir(engine_path: &str) -> Result<PathBuf, PgnError> {
    let engine_name = Path::new(engine_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "engine".to_string());
    let timestamp = Utc::now().format("%Y-%m-%d_%H%M%S");

    let log_dir = PathBuf::from("game_logs").join(format!("{engine_name}_{timestamp}"));
    fs::create_dir_all(&log_dir)?;

    info!(dir = %log_dir.display(), "game logs");
    Ok(log_dir)
}

/// Write one game to `{log_dir}/{match_number}-{game_number}.pgn`.
pub fn write_game_pgn(
    log_dir: &Path,
    match_number: u32,
    game: &GameRecord,
    stockfish_elo: u32,
    engine_name: &str,
    date: &str,
) -> Result<(), PgnError> {
    let pgn = game_to_pgn(game, match_number, stockfish_elo, engine_name, date)?;
    let path = log_dir.join(format!("{match_number}-{}.pgn", game.game_number));
    fs::write(&path, pgn)?;
    debug!(file = %path.display(), "wrote pgn");
    Ok(())
}

#[cfg(test)]
#[path = "pgn_tests.rs"]
mod pgn_tests;
