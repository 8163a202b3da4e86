use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}

/// Mailbox board: rank*8 + file, rank 0 = rank "1", file 0 = file "a".
pub type Board = [Option<Piece>; 64];

// Square helpers
pub fn file_of(sq: u8) -> i8 {
    (sq % 8) as i8
}
pub fn rank_of(sq: u8) -> i8 {
    (sq / 8) as i8
}
pub fn sq(file: i8, rank: i8) -> Option<u8> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank as u8) * 8 + (file as u8))
    } else {
        None
    }
}

pub fn sq_to_coord(sq: u8) -> String {
    let f = (b'a' + (sq % 8)) as char;
    let r = (b'1' + (sq / 8)) as char;
    format!("{f}{r}")
}

pub fn coord_to_sq(c: &str) -> Option<u8> {
    let b = c.as_bytes();
    if b.len() != 2 {
        return None;
    }
    let f = b[0];
    let r = b[1];
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
        return None;
    }
    let file = f - b'a';
    let rank = r - b'1';
    Some(rank * 8 + file)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("move must be 4 or 5 characters, got {0}")]
    BadLength(usize),
    #[error("invalid square in move: {0}")]
    BadSquare(String),
    #[error("invalid promotion piece: {0}")]
    BadPromotion(char),
}

/// A parsed UCI move: source, destination, optional promotion piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UciMove {
    pub from: u8,
    pub to: u8,
    pub promo: Option<PieceKind>,
}

impl UciMove {
    /// Parse a move of the form `e2e4` or `e7e8q`.
    pub fn parse(text: &str) -> Result<UciMove, ParseMoveError> {
        let len = text.chars().count();
        // Byte indexing below requires ASCII; non-ASCII is never a legal
        // move string anyway.
        if !text.is_ascii() || (len != 4 && len != 5) {
            return Err(ParseMoveError::BadLength(len));
        }
        let from = coord_to_sq(&text[0..2])
            .ok_or_else(|| ParseMoveError::BadSquare(text[0..2].to_string()))?;
        let to = coord_to_sq(&text[2..4])
            .ok_or_else(|| ParseMoveError::BadSquare(text[2..4].to_string()))?;
        let promo = if len == 5 {
            let ch = text.as_bytes()[4] as char;
            match ch {
                'n' => Some(PieceKind::Knight),
                'b' => Some(PieceKind::Bishop),
                'r' => Some(PieceKind::Rook),
                'q' => Some(PieceKind::Queen),
                _ => return Err(ParseMoveError::BadPromotion(ch)),
            }
        } else {
            None
        };
        Ok(UciMove { from, to, promo })
    }

    pub fn to_uci(self) -> String {
        let mut s = String::new();
        s.push_str(&sq_to_coord(self.from));
        s.push_str(&sq_to_coord(self.to));
        if let Some(p) = self.promo {
            s.push(match p {
                PieceKind::Knight => 'n',
                PieceKind::Bishop => 'b',
                PieceKind::Rook => 'r',
                _ => 'q',
            });
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_roundtrip_all_64() {
        for sq in 0..64u8 {
            assert_eq!(coord_to_sq(&sq_to_coord(sq)), Some(sq));
        }
    }

    #[test]
    fn test_square_corners() {
        assert_eq!(coord_to_sq("a1"), Some(0));
        assert_eq!(coord_to_sq("h1"), Some(7));
        assert_eq!(coord_to_sq("a8"), Some(56));
        assert_eq!(coord_to_sq("h8"), Some(63));
        assert_eq!(coord_to_sq("e2"), Some(12));
        assert_eq!(coord_to_sq("e4"), Some(28));
    }

    #[test]
    fn test_bad_squares() {
        assert_eq!(coord_to_sq("i1"), None);
        assert_eq!(coord_to_sq("a9"), None);
        assert_eq!(coord_to_sq("e"), None);
    }

    #[test]
    fn test_parse_move() {
        let mv = UciMove::parse("e2e4").unwrap();
        assert_eq!(mv.from, 12);
        assert_eq!(mv.to, 28);
        assert_eq!(mv.promo, None);

        let mv = UciMove::parse("e7e8q").unwrap();
        assert_eq!(mv.promo, Some(PieceKind::Queen));
        assert_eq!(mv.to_uci(), "e7e8q");
    }

    #[test]
    fn test_parse_move_errors() {
        assert_eq!(UciMove::parse("e2e"), Err(ParseMoveError::BadLength(3)));
        assert_eq!(
            UciMove::parse("e2e4qq"),
            Err(ParseMoveError::BadLength(6))
        );
        assert_eq!(
            UciMove::parse("z2e4"),
            Err(ParseMoveError::BadSquare("z2".to_string()))
        );
        assert_eq!(
            UciMove::parse("e7e8k"),
            Err(ParseMoveError::BadPromotion('k'))
        );
    }

    #[test]
    fn test_parse_rejects_non_ascii() {
        // Multibyte characters must error out, not panic on byte slicing.
        assert!(UciMove::parse("a\u{e9}4e").is_err());
        assert!(UciMove::parse("e2e\u{34}\u{fe0f}").is_err());
        assert!(UciMove::parse("\u{265e}f3").is_err());
    }
}
