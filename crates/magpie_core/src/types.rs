//! Core chess types: colors, piece kinds, squares, and the packed move.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline(always)]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline(always)]
    pub const fn idx(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[inline(always)]
    pub const fn idx(self) -> usize {
        self as usize
    }

    pub fn from_fen_char(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn fen_char(self, color: Color) -> char {
        let ch = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

// Square helpers. Squares are u8 indices 0..64, a1 = 0, h8 = 63.

#[inline(always)]
pub fn file_of(sq: u8) -> u8 {
    sq % 8
}

#[inline(always)]
pub fn rank_of(sq: u8) -> u8 {
    sq / 8
}

pub fn square_at(file: i8, rank: i8) -> Option<u8> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank as u8) * 8 + (file as u8))
    } else {
        None
    }
}

pub fn square_name(sq: u8) -> String {
    let f = (b'a' + (sq % 8)) as char;
    let r = (b'1' + (sq / 8)) as char;
    format!("{f}{r}")
}

pub fn parse_square(s: &str) -> Option<u8> {
    let b = s.as_bytes();
    if b.len() != 2 {
        return None;
    }
    if !(b'a'..=b'h').contains(&b[0]) || !(b'1'..=b'8').contains(&b[1]) {
        return None;
    }
    Some((b[1] - b'1') * 8 + (b[0] - b'a'))
}

/// Move special-case flag, stored in two bits of the packed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveFlag {
    None,
    Castle,
    EnPassant,
    Promotion,
}

/// A chess move packed into 16 bits.
///
/// Layout: bits 0-5 origin square, bits 6-11 destination square,
/// bits 12-13 flag (none/castle/en-passant/promotion), bits 14-15
/// promotion piece selector (knight/bishop/rook/queen).
///
/// Moves are immutable once created. The search tree's eviction marker
/// is a separate field on its edge type, never folded into these bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Move(pub u16);

const FLAG_CASTLE: u16 = 1 << 12;
const FLAG_EN_PASSANT: u16 = 2 << 12;
const FLAG_PROMOTION: u16 = 3 << 12;

impl Move {
    #[inline(always)]
    pub const fn new(from: u8, to: u8) -> Move {
        Move(from as u16 | (to as u16) << 6)
    }

    #[inline(always)]
    pub const fn castle(from: u8, to: u8) -> Move {
        Move(from as u16 | (to as u16) << 6 | FLAG_CASTLE)
    }

    #[inline(always)]
    pub const fn en_passant(from: u8, to: u8) -> Move {
        Move(from as u16 | (to as u16) << 6 | FLAG_EN_PASSANT)
    }

    /// Promotion move. `piece` must be Knight, Bishop, Rook or Queen.
    #[inline(always)]
    pub fn promotion(from: u8, to: u8, piece: PieceKind) -> Move {
        debug_assert!(matches!(
            piece,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        ));
        let sel = (piece.idx() as u16 - 1) << 14;
        Move(from as u16 | (to as u16) << 6 | FLAG_PROMOTION | sel)
    }

    #[inline(always)]
    pub const fn from(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    #[inline(always)]
    pub const fn to(self) -> u8 {
        ((self.0 >> 6) & 0x3F) as u8
    }

    #[inline(always)]
    pub const fn flag(self) -> MoveFlag {
        match (self.0 >> 12) & 0x3 {
            0 => MoveFlag::None,
            1 => MoveFlag::Castle,
            2 => MoveFlag::EnPassant,
            _ => MoveFlag::Promotion,
        }
    }

    #[inline(always)]
    pub const fn is_castle(self) -> bool {
        self.0 & (3 << 12) == FLAG_CASTLE
    }

    #[inline(always)]
    pub const fn is_en_passant(self) -> bool {
        self.0 & (3 << 12) == FLAG_EN_PASSANT
    }

    #[inline(always)]
    pub const fn is_promotion(self) -> bool {
        self.0 & (3 << 12) == FLAG_PROMOTION
    }

    /// Promotion piece, meaningful only when `is_promotion()`.
    #[inline(always)]
    pub const fn promotion_piece(self) -> PieceKind {
        match (self.0 >> 14) & 0x3 {
            0 => PieceKind::Knight,
            1 => PieceKind::Bishop,
            2 => PieceKind::Rook,
            _ => PieceKind::Queen,
        }
    }
}

/// Upper bound on legal moves in any reachable chess position.
pub const MAX_MOVES: usize = 256;

/// Fixed-capacity move buffer the generator writes into.
///
/// Callers reuse one list across generation calls; `clear` is O(1).
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveList {
    pub const fn new() -> Self {
        Self {
            moves: [Move(0); MAX_MOVES],
            len: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
