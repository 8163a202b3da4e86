use std::collections::HashMap;

use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

/// Repetition fingerprint: two positions are the same iff board contents,
/// side to move, castling rights and en-passant file all match.
type PositionKey = (Board, Color, CastlingRights, Option<u8>);

/// Incrementally updated game state driven by a sequence of UCI moves.
///
/// One instance per game; mutated only through `apply`/`push_uci`. All
/// query operations leave the state untouched.
#[derive(Clone, Debug)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// File of a pawn that just advanced two squares, valid for one ply.
    pub en_passant_file: Option<u8>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    // Append-only occurrence counts; grows for the life of one game.
    history: HashMap<PositionKey, u32>,
}

impl GameState {
    /// Standard starting position.
    pub fn new() -> Self {
        let mut board: Board = [None; 64];
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            board[f] = Some(Piece::new(Color::White, kind));
            board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        for f in 0..8 {
            board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
        }

        let mut state = GameState {
            board,
            side_to_move: Color::White,
            castling: CastlingRights {
                wk: true,
                wq: true,
                bk: true,
                bq: true,
            },
            en_passant_file: None,
            halfmove_clock: 0,
            history: HashMap::new(),
        };
        state.record_position();
        state
    }

    /// Forsyth-Edwards Notation parser for tests and crafted positions.
    /// Panics on malformed input.
    pub fn from_fen(fen: &str) -> Self {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        assert!(parts.len() >= 4, "Invalid FEN: expected at least 4 fields");

        let mut board: Board = [None; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        assert!(ranks.len() == 8, "Invalid FEN board section");

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file: i8 = 0;
            let rank: i8 = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    file += d as i8;
                } else {
                    let color = if ch.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let kind = match ch.to_ascii_lowercase() {
                        'p' => PieceKind::Pawn,
                        'n' => PieceKind::Knight,
                        'b' => PieceKind::Bishop,
                        'r' => PieceKind::Rook,
                        'q' => PieceKind::Queen,
                        'k' => PieceKind::King,
                        _ => panic!("Invalid piece char in FEN: {}", ch),
                    };
                    let sq = sq(file, rank).expect("Square out of bounds while parsing FEN");
                    board[sq as usize] = Some(Piece::new(color, kind));
                    file += 1;
                }
                assert!(file <= 8, "Too many files in FEN rank");
            }
            assert!(file == 8, "Not enough files in FEN rank");
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => panic!("Invalid side to move in FEN: {}", other),
        };

        let mut castling = CastlingRights {
            wk: false,
            wq: false,
            bk: false,
            bq: false,
        };
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => castling.wk = true,
                    'Q' => castling.wq = true,
                    'k' => castling.bk = true,
                    'q' => castling.bq = true,
                    _ => panic!("Invalid castling char in FEN: {}", c),
                }
            }
        }

        let en_passant_file = if parts[3] == "-" {
            None
        } else {
            coord_to_sq(parts[3]).map(|s| s % 8)
        };

        let halfmove_clock: u32 = parts
            .get(4)
            .copied()
            .unwrap_or("0")
            .parse()
            .expect("Invalid halfmove clock in FEN");

        let mut state = GameState {
            board,
            side_to_move,
            castling,
            en_passant_file,
            halfmove_clock,
            history: HashMap::new(),
        };
        state.record_position();
        state
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        square_attacked(&self.board, target, by)
    }

    /// Is the side to move currently in check?
    pub fn is_in_check(&self) -> bool {
        self.color_in_check(self.side_to_move)
    }

    pub(crate) fn color_in_check(&self, c: Color) -> bool {
        board_in_check(&self.board, c)
    }

    // --- Repetition & fifty-move tracking ---

    fn position_key(&self) -> PositionKey {
        (
            self.board,
            self.side_to_move,
            self.castling,
            self.en_passant_file,
        )
    }

    fn record_position(&mut self) {
        *self.history.entry(self.position_key()).or_insert(0) += 1;
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.history
            .get(&self.position_key())
            .is_some_and(|&n| n >= 3)
    }

    pub fn is_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    // --- Move application ---

    /// Parse and apply a UCI move (e.g. "e2e4", "e7e8q").
    ///
    /// The move is applied mechanically; legality is the caller's concern
    /// (see `validate_move`).
    pub fn push_uci(&mut self, text: &str) -> Result<(), ParseMoveError> {
        let mv = UciMove::parse(text)?;
        self.apply(mv);
        Ok(())
    }

    /// Apply an already-parsed move as a single atomic state transition.
    pub fn apply(&mut self, mv: UciMove) {
        let piece = match self.board[mv.from as usize] {
            Some(p) => p,
            None => {
                debug_assert!(false, "apply called with empty source square");
                return;
            }
        };

        let is_pawn = piece.kind == PieceKind::Pawn;
        // En passant shows up as a pawn moving diagonally to an empty square.
        let is_capture = self.board[mv.to as usize].is_some()
            || (is_pawn && file_of(mv.to) != file_of(mv.from));

        apply_move_to_board(&mut self.board, mv);

        // Any king move clears both of that color's castling rights.
        if piece.kind == PieceKind::King {
            match piece.color {
                Color::White => {
                    self.castling.wk = false;
                    self.castling.wq = false;
                }
                Color::Black => {
                    self.castling.bk = false;
                    self.castling.bq = false;
                }
            }
        }
        // Touching a rook home corner clears that right, whether the rook
        // moved away or was captured there.
        for s in [mv.from, mv.to] {
            match s {
                7 => self.castling.wk = false,
                0 => self.castling.wq = false,
                63 => self.castling.bk = false,
                56 => self.castling.bq = false,
                _ => {}
            }
        }

        self.en_passant_file = if is_pawn && (mv.to as i16 - mv.from as i16).abs() == 16 {
            Some(mv.from % 8)
        } else {
            None
        };

        if is_pawn || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.side_to_move = self.side_to_move.other();
        self.record_position();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform the board edits for a move: en-passant removal, piece
/// relocation, promotion substitution and castling rook relocation.
///
/// Shared between `GameState::apply` and the king-safety simulation,
/// which runs it on a copy of the board.
pub(crate) fn apply_move_to_board(board: &mut Board, mv: UciMove) {
    let piece = match board[mv.from as usize] {
        Some(p) => p,
        None => return,
    };

    // En passant: remove the captured pawn from its actual square.
    if piece.kind == PieceKind::Pawn
        && file_of(mv.to) != file_of(mv.from)
        && board[mv.to as usize].is_none()
    {
        let behind = match piece.color {
            Color::White => mv.to - 8,
            Color::Black => mv.to + 8,
        };
        board[behind as usize] = None;
    }

    board[mv.to as usize] = Some(piece);
    board[mv.from as usize] = None;

    if let Some(promo) = mv.promo {
        board[mv.to as usize] = Some(Piece::new(piece.color, promo));
    }

    // Castling: a king moving two files drags the rook along.
    if piece.kind == PieceKind::King && (file_of(mv.to) - file_of(mv.from)).abs() == 2 {
        let (rook_from, rook_to) = if mv.to > mv.from {
            (mv.from + 3, mv.from + 1)
        } else {
            (mv.from - 4, mv.from - 1)
        };
        board[rook_to as usize] = board[rook_from as usize];
        board[rook_from as usize] = None;
    }
}

pub(crate) fn king_square(board: &Board, c: Color) -> Option<u8> {
    for i in 0..64 {
        if board[i] == Some(Piece::new(c, PieceKind::King)) {
            return Some(i as u8);
        }
    }
    None
}

/// Whether color `c`'s king is attacked on the given board.
///
/// Panics if that king is missing: the state is only ever built from the
/// starting position (or a FEN with both kings) and kings are never
/// removed by move application, so absence means corruption.
pub(crate) fn board_in_check(board: &Board, c: Color) -> bool {
    let ksq = match king_square(board, c) {
        Some(s) => s,
        None => panic!("no {:?} king on board", c),
    };
    square_attacked(board, ksq, c.other())
}

/// Does any piece of `by` attack `target`? Pure query, walks outward from
/// the target square for each piece type.
pub(crate) fn square_attacked(board: &Board, target: u8, by: Color) -> bool {
    let tf = file_of(target);
    let tr = rank_of(target);

    // Pawns attack diagonally forward, so look one rank behind the target
    // from the attacker's perspective.
    let pawn_dirs: &[(i8, i8)] = match by {
        Color::White => &[(-1, -1), (1, -1)],
        Color::Black => &[(-1, 1), (1, 1)],
    };
    for &(df, dr) in pawn_dirs {
        if let Some(s) = sq(tf + df, tr + dr) {
            if board[s as usize] == Some(Piece::new(by, PieceKind::Pawn)) {
                return true;
            }
        }
    }

    let knight = [
        (1, 2),
        (2, 1),
        (-1, 2),
        (-2, 1),
        (1, -2),
        (2, -1),
        (-1, -2),
        (-2, -1),
    ];
    for (df, dr) in knight {
        if let Some(s) = sq(tf + df, tr + dr) {
            if board[s as usize] == Some(Piece::new(by, PieceKind::Knight)) {
                return true;
            }
        }
    }

    let king = [
        (1, 1),
        (1, 0),
        (1, -1),
        (0, 1),
        (0, -1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
    ];
    for (df, dr) in king {
        if let Some(s) = sq(tf + df, tr + dr) {
            if board[s as usize] == Some(Piece::new(by, PieceKind::King)) {
                return true;
            }
        }
    }

    // Sliding rays: walk to the first occupied square in each direction.
    let diag = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    for (df, dr) in diag {
        let mut f = tf + df;
        let mut r = tr + dr;
        while let Some(s) = sq(f, r) {
            if let Some(pc) = board[s as usize] {
                if pc.color == by
                    && (pc.kind == PieceKind::Bishop || pc.kind == PieceKind::Queen)
                {
                    return true;
                }
                break;
            }
            f += df;
            r += dr;
        }
    }
    let ortho = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    for (df, dr) in ortho {
        let mut f = tf + df;
        let mut r = tr + dr;
        while let Some(s) = sq(f, r) {
            if let Some(pc) = board[s as usize] {
                if pc.color == by && (pc.kind == PieceKind::Rook || pc.kind == PieceKind::Queen) {
                    return true;
                }
                break;
            }
            f += df;
            r += dr;
        }
    }

    false
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
