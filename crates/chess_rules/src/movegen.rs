use crate::state::{apply_move_to_board, board_in_check, square_attacked, GameState};
use crate::types::*;

// Promotion expansion order for generated moves.
const PROMO_ORDER: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

fn promo_rank(c: Color) -> i8 {
    match c {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// Full legality check for a UCI move string. Pure predicate: any failure
/// (malformed syntax included) yields `false`, never an error.
pub fn validate_move(state: &GameState, text: &str) -> bool {
    let mv = match UciMove::parse(text) {
        Ok(m) => m,
        Err(_) => return false,
    };
    let piece = match state.piece_at(mv.from) {
        Some(p) => p,
        None => return false,
    };
    if piece.color != state.side_to_move {
        return false;
    }
    if let Some(target) = state.piece_at(mv.to) {
        if target.color == piece.color {
            return false;
        }
    }
    // A promotion letter is required exactly when a pawn reaches the last
    // rank, and forbidden otherwise.
    let needs_promo = piece.kind == PieceKind::Pawn && rank_of(mv.to) == promo_rank(piece.color);
    if needs_promo != mv.promo.is_some() {
        return false;
    }
    if !is_piece_move_pattern_valid(state, mv.from, mv.to) {
        return false;
    }
    !move_exposes_king(state, mv)
}

/// Does the move obey the mover's piece-type geometry? Does not consider
/// whether the king would be left in check.
pub fn is_piece_move_pattern_valid(state: &GameState, from: u8, to: u8) -> bool {
    let piece = match state.piece_at(from) {
        Some(p) => p,
        None => return false,
    };
    if from == to {
        return false;
    }
    let df = file_of(to) - file_of(from);
    let dr = rank_of(to) - rank_of(from);

    match piece.kind {
        PieceKind::Pawn => pawn_pattern_valid(state, piece.color, from, to, df, dr),
        PieceKind::Knight => {
            (df.abs() == 1 && dr.abs() == 2) || (df.abs() == 2 && dr.abs() == 1)
        }
        PieceKind::Bishop => df.abs() == dr.abs() && path_clear(state, from, to),
        PieceKind::Rook => (df == 0 || dr == 0) && path_clear(state, from, to),
        PieceKind::Queen => {
            (df == 0 || dr == 0 || df.abs() == dr.abs()) && path_clear(state, from, to)
        }
        PieceKind::King => {
            (df.abs() <= 1 && dr.abs() <= 1) || castling_valid(state, piece.color, from, to)
        }
    }
}

fn pawn_pattern_valid(state: &GameState, c: Color, from: u8, to: u8, df: i8, dr: i8) -> bool {
    let dir: i8 = match c {
        Color::White => 1,
        Color::Black => -1,
    };
    let start_rank: i8 = match c {
        Color::White => 1,
        Color::Black => 6,
    };

    if df == 0 {
        // Pushes never capture.
        if dr == dir {
            return state.piece_at(to).is_none();
        }
        if dr == 2 * dir && rank_of(from) == start_rank {
            let mid = (from as i8 + 8 * dir) as u8;
            return state.piece_at(mid).is_none() && state.piece_at(to).is_none();
        }
        return false;
    }

    if df.abs() == 1 && dr == dir {
        return match state.piece_at(to) {
            Some(target) => target.color != c,
            // Diagonal to an empty square is only valid as en passant.
            None => {
                let ep_rank: i8 = match c {
                    Color::White => 5,
                    Color::Black => 2,
                };
                rank_of(to) == ep_rank && state.en_passant_file == Some(to % 8)
            }
        };
    }

    false
}

// Path between from and to must be empty, exclusive of both endpoints.
// Assumes the squares are aligned on a rank, file or diagonal.
fn path_clear(state: &GameState, from: u8, to: u8) -> bool {
    let df = (file_of(to) - file_of(from)).signum();
    let dr = (rank_of(to) - rank_of(from)).signum();
    let mut f = file_of(from) + df;
    let mut r = rank_of(from) + dr;
    while let Some(s) = sq(f, r) {
        if s == to {
            return true;
        }
        if state.piece_at(s).is_some() {
            return false;
        }
        f += df;
        r += dr;
    }
    false
}

fn castling_valid(state: &GameState, c: Color, from: u8, to: u8) -> bool {
    let home: u8 = match c {
        Color::White => 4,
        Color::Black => 60,
    };
    if from != home || rank_of(to) != rank_of(from) {
        return false;
    }
    let kingside = to == home + 2;
    if !kingside && to != home - 2 {
        return false;
    }

    let (has_right, rook_sq) = match (c, kingside) {
        (Color::White, true) => (state.castling.wk, 7),
        (Color::White, false) => (state.castling.wq, 0),
        (Color::Black, true) => (state.castling.bk, 63),
        (Color::Black, false) => (state.castling.bq, 56),
    };
    if !has_right {
        return false;
    }
    if state.piece_at(rook_sq) != Some(Piece::new(c, PieceKind::Rook)) {
        return false;
    }

    // Every square strictly between king and rook must be empty.
    let between: &[u8] = if kingside {
        &[1, 2]
    } else {
        &[1, 2, 3]
    };
    for &offset in between {
        let s = if kingside { home + offset } else { home - offset };
        if state.piece_at(s).is_some() {
            return false;
        }
    }

    // The king may not castle out of or through check. The destination
    // square is covered by the post-move king-safety check.
    let enemy = c.other();
    let pass = if kingside { home + 1 } else { home - 1 };
    !square_attacked(&state.board, home, enemy) && !square_attacked(&state.board, pass, enemy)
}

/// Would moving from `from` to `to` leave the mover's own king attacked?
/// Simulated on a copy of the board; the live state is never touched.
pub fn would_leave_king_in_check(state: &GameState, from: u8, to: u8) -> bool {
    move_exposes_king(
        state,
        UciMove {
            from,
            to,
            promo: None,
        },
    )
}

fn move_exposes_king(state: &GameState, mv: UciMove) -> bool {
    let mover = match state.piece_at(mv.from) {
        Some(p) => p.color,
        None => return false,
    };
    let mut board = state.board;
    apply_move_to_board(&mut board, mv);
    board_in_check(&board, mover)
}

/// Generate all legal moves for the side to move as UCI strings, ordered by
/// source square, then destination square, then promotion piece (n, b, r, q).
pub fn legal_moves(state: &GameState) -> Vec<String> {
    let mut out = Vec::with_capacity(64);
    for from in 0..64u8 {
        let piece = match state.piece_at(from) {
            Some(p) if p.color == state.side_to_move => p,
            _ => continue,
        };
        for to in candidate_dests(state, from, piece) {
            if !candidate_is_legal(state, piece, from, to) {
                continue;
            }
            if piece.kind == PieceKind::Pawn && rank_of(to) == promo_rank(piece.color) {
                for pk in PROMO_ORDER {
                    out.push(
                        UciMove {
                            from,
                            to,
                            promo: Some(pk),
                        }
                        .to_uci(),
                    );
                }
            } else {
                out.push(
                    UciMove {
                        from,
                        to,
                        promo: None,
                    }
                    .to_uci(),
                );
            }
        }
    }
    out
}

/// Short-circuiting emptiness check: returns as soon as one legal move is
/// found instead of generating the full list.
pub fn has_legal_moves(state: &GameState) -> bool {
    for from in 0..64u8 {
        let piece = match state.piece_at(from) {
            Some(p) if p.color == state.side_to_move => p,
            _ => continue,
        };
        for to in candidate_dests(state, from, piece) {
            if candidate_is_legal(state, piece, from, to) {
                return true;
            }
        }
    }
    false
}

pub fn is_checkmate(state: &GameState) -> bool {
    state.is_in_check() && !has_legal_moves(state)
}

pub fn is_stalemate(state: &GameState) -> bool {
    !state.is_in_check() && !has_legal_moves(state)
}

fn candidate_is_legal(state: &GameState, piece: Piece, from: u8, to: u8) -> bool {
    if let Some(target) = state.piece_at(to) {
        if target.color == piece.color {
            return false;
        }
    }
    if !is_piece_move_pattern_valid(state, from, to) {
        return false;
    }
    // King safety does not depend on which piece a pawn promotes to.
    let promo = if piece.kind == PieceKind::Pawn && rank_of(to) == promo_rank(piece.color) {
        Some(PieceKind::Queen)
    } else {
        None
    };
    !move_exposes_king(state, UciMove { from, to, promo })
}

// Cheap candidate destinations per piece type; pattern validation and the
// king-safety simulation filter them afterwards. Returned sorted ascending.
fn candidate_dests(state: &GameState, from: u8, piece: Piece) -> Vec<u8> {
    let f = file_of(from);
    let r = rank_of(from);
    let mut dests = Vec::with_capacity(28);

    match piece.kind {
        PieceKind::Pawn => {
            let dir: i8 = match piece.color {
                Color::White => 1,
                Color::Black => -1,
            };
            for (df, dr) in [(0, dir), (0, 2 * dir), (-1, dir), (1, dir)] {
                if let Some(to) = sq(f + df, r + dr) {
                    dests.push(to);
                }
            }
        }
        PieceKind::Knight => {
            let deltas = [
                (1, 2),
                (2, 1),
                (-1, 2),
                (-2, 1),
                (1, -2),
                (2, -1),
                (-1, -2),
                (-2, -1),
            ];
            for (df, dr) in deltas {
                if let Some(to) = sq(f + df, r + dr) {
                    dests.push(to);
                }
            }
        }
        PieceKind::Bishop => ray_dests(state, from, &[(1, 1), (1, -1), (-1, 1), (-1, -1)], &mut dests),
        PieceKind::Rook => ray_dests(state, from, &[(1, 0), (-1, 0), (0, 1), (0, -1)], &mut dests),
        PieceKind::Queen => ray_dests(
            state,
            from,
            &[
                (1, 1),
                (1, -1),
                (-1, 1),
                (-1, -1),
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
            ],
            &mut dests,
        ),
        PieceKind::King => {
            let deltas = [
                (1, 1),
                (1, 0),
                (1, -1),
                (0, 1),
                (0, -1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
                // Castling destinations; rejected by pattern validation
                // unless the king is on its home square with rights intact.
                (2, 0),
                (-2, 0),
            ];
            for (df, dr) in deltas {
                if let Some(to) = sq(f + df, r + dr) {
                    dests.push(to);
                }
            }
        }
    }

    dests.sort_unstable();
    dests
}

// Walk each ray to the first occupied square inclusive.
fn ray_dests(state: &GameState, from: u8, dirs: &[(i8, i8)], dests: &mut Vec<u8>) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for &(df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            dests.push(to);
            if state.piece_at(to).is_some() {
                break;
            }
            f += df;
            r += dr;
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
