use super::*;
use crate::movegen::legal_moves;

fn push(state: &mut GameState, moves: &[&str]) {
    for m in moves {
        state.push_uci(m).unwrap();
    }
}

fn piece(ch: char) -> Option<Piece> {
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
        _ => panic!("bad piece char"),
    };
    Some(Piece::new(color, kind))
}

#[test]
fn test_initial_position() {
    let s = GameState::new();
    for (i, ch) in "RNBQKBNR".chars().enumerate() {
        assert_eq!(s.board[i], piece(ch));
    }
    for i in 8..16 {
        assert_eq!(s.board[i], piece('P'));
    }
    for i in 16..48 {
        assert_eq!(s.board[i], None, "index {i} should be empty");
    }
    for i in 48..56 {
        assert_eq!(s.board[i], piece('p'));
    }
    for (i, ch) in "rnbqkbnr".chars().enumerate() {
        assert_eq!(s.board[56 + i], piece(ch));
    }
    assert_eq!(s.side_to_move, Color::White);
    assert!(s.castling.wk && s.castling.wq && s.castling.bk && s.castling.bq);
    assert_eq!(s.en_passant_file, None);
    assert_eq!(s.halfmove_clock, 0);
}

#[test]
fn test_single_pawn_push() {
    let mut s = GameState::new();
    push(&mut s, &["e2e3"]);
    assert_eq!(s.board[12], None);
    assert_eq!(s.board[20], piece('P'));
    assert_eq!(s.side_to_move, Color::Black);
}

#[test]
fn test_double_pawn_push_sets_en_passant() {
    let mut s = GameState::new();
    push(&mut s, &["e2e4"]);
    assert_eq!(s.board[12], None);
    assert_eq!(s.board[28], piece('P'));
    assert_eq!(s.en_passant_file, Some(4));
}

#[test]
fn test_en_passant_cleared_by_any_following_move() {
    let mut s = GameState::new();
    push(&mut s, &["e2e4"]);
    assert_eq!(s.en_passant_file, Some(4));
    push(&mut s, &["g8f6"]);
    assert_eq!(s.en_passant_file, None);
}

#[test]
fn test_black_double_pawn_push() {
    let mut s = GameState::new();
    push(&mut s, &["e2e4", "d7d5"]);
    assert_eq!(s.board[51], None);
    assert_eq!(s.board[35], piece('p'));
    assert_eq!(s.en_passant_file, Some(3));
}

#[test]
fn test_white_en_passant_capture() {
    let mut s = GameState::new();
    // 1. e4 a6 2. e5 d5 3. exd6
    push(&mut s, &["e2e4", "a7a6", "e4e5", "d7d5"]);
    assert_eq!(s.en_passant_file, Some(3));
    push(&mut s, &["e5d6"]);
    assert_eq!(s.board[35], None, "captured pawn removed from d5");
    assert_eq!(s.board[43], piece('P'), "capturing pawn on d6");
    assert_eq!(s.halfmove_clock, 0);
}

#[test]
fn test_black_en_passant_capture() {
    let mut s = GameState::new();
    // 1. h3 d5 2. h4 d4 3. e4 dxe3
    push(&mut s, &["h2h3", "d7d5", "h3h4", "d5d4", "e2e4"]);
    push(&mut s, &["d4e3"]);
    assert_eq!(s.board[28], None, "captured pawn removed from e4");
    assert_eq!(s.board[20], piece('p'), "capturing pawn on e3");
}

#[test]
fn test_promotion_replaces_pawn() {
    let mut s = GameState::from_fen("8/P6k/8/8/8/8/7K/8 w - - 0 1");
    push(&mut s, &["a7a8q"]);
    assert_eq!(s.board[56], piece('Q'));
    assert_eq!(s.board[48], None);
    assert_eq!(s.halfmove_clock, 0);
}

#[test]
fn test_underpromotion_case_matches_mover() {
    let mut s = GameState::from_fen("8/8/8/8/8/7k/p6K/8 b - - 0 1");
    push(&mut s, &["a2a1n"]);
    assert_eq!(s.board[0], piece('n'));
}

#[test]
fn test_kingside_castling_moves_rook() {
    let mut s = GameState::new();
    push(&mut s, &["e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "e1g1"]);
    assert_eq!(s.board[6], piece('K'));
    assert_eq!(s.board[5], piece('R'));
    assert_eq!(s.board[4], None);
    assert_eq!(s.board[7], None);
    assert!(!s.castling.wk && !s.castling.wq);
    assert!(s.castling.bk && s.castling.bq, "black's rights untouched");
}

#[test]
fn test_queenside_castling_moves_rook() {
    let mut s = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
    push(&mut s, &["e8c8"]);
    assert_eq!(s.board[58], piece('k'));
    assert_eq!(s.board[59], piece('r'));
    assert_eq!(s.board[60], None);
    assert_eq!(s.board[56], None);
    assert!(!s.castling.bk && !s.castling.bq);
    assert!(s.castling.wk && s.castling.wq);
}

#[test]
fn test_rook_move_clears_single_right() {
    let mut s = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    push(&mut s, &["h1g1"]);
    assert!(!s.castling.wk);
    assert!(s.castling.wq && s.castling.bk && s.castling.bq);
}

#[test]
fn test_rook_captured_on_home_corner_clears_right() {
    let mut s = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    push(&mut s, &["a1a8"]);
    assert!(!s.castling.wq, "white queenside rook left a1");
    assert!(!s.castling.bq, "black queenside rook captured on a8");
    assert!(s.castling.wk && s.castling.bk);
    assert_eq!(s.halfmove_clock, 0, "capture resets the clock");
}

#[test]
fn test_halfmove_clock_counts_quiet_moves() {
    let mut s = GameState::new();
    push(&mut s, &["g1f3"]);
    assert_eq!(s.halfmove_clock, 1);
    push(&mut s, &["b8c6"]);
    assert_eq!(s.halfmove_clock, 2);
    push(&mut s, &["e2e4"]);
    assert_eq!(s.halfmove_clock, 0, "pawn move resets the clock");
}

#[test]
fn test_fifty_move_rule_threshold() {
    let mut s = GameState::new();
    s.halfmove_clock = 99;
    assert!(!s.is_fifty_move_rule());
    push(&mut s, &["g1f3"]);
    assert_eq!(s.halfmove_clock, 100);
    assert!(s.is_fifty_move_rule());
}

#[test]
fn test_threefold_repetition_knight_shuffle() {
    let mut s = GameState::new();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    push(&mut s, &shuffle);
    // Back at the start for the second time overall; not yet threefold.
    assert!(!s.is_threefold_repetition());
    push(&mut s, &shuffle);
    assert!(s.is_threefold_repetition());
}

#[test]
fn test_repetition_distinguishes_castling_rights() {
    let mut s = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    // The first rook shuffle burns both kingside rights, so the board
    // repeats but the position (per FIDE) does not match the original.
    let shuffle = ["h1g1", "h8g8", "g1h1", "g8h8"];
    push(&mut s, &shuffle);
    push(&mut s, &shuffle);
    assert!(!s.is_threefold_repetition());
    push(&mut s, &shuffle);
    assert!(s.is_threefold_repetition());
}

#[test]
fn test_is_in_check_detects_attack_on_king() {
    let s = GameState::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
    assert!(s.is_in_check());
    let s = GameState::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
    assert!(!s.is_in_check());
}

#[test]
fn test_attack_queries_cover_all_piece_types() {
    let s = GameState::from_fen("4k3/8/8/2b5/5n2/8/P2q4/R3K3 w - - 0 1");
    // d2 queen attacks e1 and e2; c5 bishop attacks e3 diagonal.
    assert!(s.is_square_attacked(4, Color::Black)); // e1 by queen
    assert!(s.is_square_attacked(20, Color::Black)); // e3 by bishop
    assert!(s.is_square_attacked(12, Color::Black)); // e2 by knight on f4
    assert!(s.is_square_attacked(17, Color::White)); // b3 by a2 pawn
    assert!(!s.is_square_attacked(33, Color::White)); // b5 attacked by nothing white
}

#[test]
fn test_sliding_attacks_are_blocked() {
    let s = GameState::from_fen("4k3/8/8/8/8/4N3/8/r3K3 w - - 0 1");
    // The a1 rook's ray along the first rank is open; through e3 it isn't.
    assert!(s.is_in_check());
    let s = GameState::from_fen("4k3/8/8/8/8/8/8/rN2K3 w - - 0 1");
    assert!(!s.is_in_check(), "b1 knight blocks the rook ray");
}

#[test]
fn test_queries_do_not_mutate_state() {
    let mut s = GameState::new();
    push(&mut s, &["e2e4", "c7c5"]);
    let board = s.board;
    let castling = s.castling;
    let ep = s.en_passant_file;
    let clock = s.halfmove_clock;
    let stm = s.side_to_move;

    let first = legal_moves(&s);
    let _ = s.is_in_check();
    let _ = s.is_threefold_repetition();
    let _ = s.is_fifty_move_rule();
    let second = legal_moves(&s);

    assert_eq!(first, second);
    assert_eq!(s.board, board);
    assert_eq!(s.castling, castling);
    assert_eq!(s.en_passant_file, ep);
    assert_eq!(s.halfmove_clock, clock);
    assert_eq!(s.side_to_move, stm);
}
