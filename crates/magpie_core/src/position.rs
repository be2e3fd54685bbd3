//! Bitboard board state: occupancy masks, castling rights, en-passant,
//! halfmove clock, and an incrementally maintained Zobrist hash.
//!
//! A `Position` is a plain value. There is no move retraction: callers that
//! need to explore a branch copy the position and mutate the copy, which
//! keeps the parent state untouched by construction.

use thiserror::Error;

use crate::attacks;
use crate::bitboard::Bitboard;
use crate::types::*;
use crate::zobrist::ZOBRIST;

/// How many recent position hashes are retained for repetition detection.
/// The fifty-move rule bounds the relevant window to 100 halfmoves.
pub const HISTORY_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN needs at least 4 fields, got {0}")]
    MissingFields(usize),
    #[error("invalid board field: {0}")]
    Board(String),
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid castling field: {0}")]
    Castling(String),
    #[error("invalid en-passant field: {0}")]
    EnPassant(String),
    #[error("invalid clock field: {0}")]
    Clock(String),
}

/// Castling rights as a 4-bit field. Bits are only ever cleared, never
/// re-set, as kings and rooks move or rooks are captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KING: u8 = 1;
    pub const WHITE_QUEEN: u8 = 2;
    pub const BLACK_KING: u8 = 4;
    pub const BLACK_QUEEN: u8 = 8;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline(always)]
    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Check and pin masks for the side to move, recomputed once per
/// generation call.
///
/// The checkmask is all squares when not in check, the block-or-capture set
/// for a single check, and empty in double check (which forces king-only
/// move generation). A piece appears in at most one pinned set; its moves
/// are confined to the matching pin mask.
#[derive(Clone, Copy, Debug)]
pub struct KingMasks {
    pub checkmask: Bitboard,
    pub checkers: Bitboard,
    pub rook_pin: Bitboard,
    pub bishop_pin: Bitboard,
    pub pinned_ortho: Bitboard,
    pub pinned_diag: Bitboard,
}

impl KingMasks {
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.checkers.any()
    }

    #[inline(always)]
    pub fn double_check(&self) -> bool {
        self.checkers.more_than_one()
    }

    /// Union of both pinned sets.
    #[inline(always)]
    pub fn pinned(&self) -> Bitboard {
        self.pinned_ortho | self.pinned_diag
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Position {
    piece_bb: [Bitboard; 6],
    color_bb: [Bitboard; 2],
    occupied: Bitboard,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<u8>,
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
    history: [u64; HISTORY_LEN],
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    fn empty() -> Self {
        Position {
            piece_bb: [Bitboard::EMPTY; 6],
            color_bb: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: [0; HISTORY_LEN],
        }
    }

    pub fn startpos() -> Self {
        Self::from_fen(START_FEN).expect("start position FEN is well-formed")
    }

    /// Parse a FEN string. Square content is checked syntactically only;
    /// semantic nonsense (two kings per side, pawns on the back rank) is the
    /// caller's problem.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let mut pos = Self::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Board(parts[0].to_string()));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as i8; // FEN lists rank 8 first
            let mut file: i8 = 0;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    file += d as i8;
                } else {
                    let color = if ch.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let kind = PieceKind::from_fen_char(ch)
                        .ok_or_else(|| FenError::Board(parts[0].to_string()))?;
                    let sq = square_at(file, rank)
                        .ok_or_else(|| FenError::Board(parts[0].to_string()))?;
                    pos.add_piece(color, kind, sq);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::Board(parts[0].to_string()));
                }
            }
            if file != 8 {
                return Err(FenError::Board(parts[0].to_string()));
            }
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        if parts[2] != "-" {
            let mut bits = 0u8;
            for c in parts[2].chars() {
                bits |= match c {
                    'K' => CastlingRights::WHITE_KING,
                    'Q' => CastlingRights::WHITE_QUEEN,
                    'k' => CastlingRights::BLACK_KING,
                    'q' => CastlingRights::BLACK_QUEEN,
                    _ => return Err(FenError::Castling(parts[2].to_string())),
                };
            }
            pos.castling = CastlingRights(bits);
        }

        pos.en_passant = match parts[3] {
            "-" => None,
            s => Some(parse_square(s).ok_or_else(|| FenError::EnPassant(s.to_string()))?),
        };

        if let Some(s) = parts.get(4) {
            pos.halfmove_clock = s.parse().map_err(|_| FenError::Clock(s.to_string()))?;
        }
        if let Some(s) = parts.get(5) {
            pos.fullmove_number = s.parse().map_err(|_| FenError::Clock(s.to_string()))?;
        }

        pos.hash = pos.compute_hash();
        pos.history[pos.halfmove_clock as usize % HISTORY_LEN] = pos.hash;
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = rank * 8 + file;
                match self.piece_at(sq) {
                    Some((color, kind)) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(kind.fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling == CastlingRights::NONE {
            out.push('-');
        } else {
            for (bit, ch) in [
                (CastlingRights::WHITE_KING, 'K'),
                (CastlingRights::WHITE_QUEEN, 'Q'),
                (CastlingRights::BLACK_KING, 'k'),
                (CastlingRights::BLACK_QUEEN, 'q'),
            ] {
                if self.castling.has(bit) {
                    out.push(ch);
                }
            }
        }

        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&square_name(sq)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline(always)]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.piece_bb[kind.idx()] & self.color_bb[color.idx()]
    }

    #[inline(always)]
    pub fn color_occupancy(&self, color: Color) -> Bitboard {
        self.color_bb[color.idx()]
    }

    /// Occupancy of the side to move, optionally restricted to one piece kind.
    #[inline(always)]
    pub fn own_pieces(&self, kind: Option<PieceKind>) -> Bitboard {
        match kind {
            Some(k) => self.pieces(self.side_to_move, k),
            None => self.color_bb[self.side_to_move.idx()],
        }
    }

    /// Occupancy of the opponent, optionally restricted to one piece kind.
    #[inline(always)]
    pub fn opponent_pieces(&self, kind: Option<PieceKind>) -> Bitboard {
        let them = self.side_to_move.opponent();
        match kind {
            Some(k) => self.pieces(them, k),
            None => self.color_bb[them.idx()],
        }
    }

    #[inline(always)]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline(always)]
    pub fn en_passant(&self) -> Option<u8> {
        self.en_passant
    }

    #[inline(always)]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline(always)]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn king_square(&self, color: Color) -> u8 {
        let kings = self.pieces(color, PieceKind::King);
        debug_assert_eq!(kings.popcount(), 1, "each side has exactly one king");
        kings.lsb().unwrap_or(0)
    }

    pub fn piece_kind_at(&self, sq: u8) -> Option<PieceKind> {
        if !self.occupied.contains(sq) {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|k| self.piece_bb[k.idx()].contains(sq))
    }

    pub fn piece_at(&self, sq: u8) -> Option<(Color, PieceKind)> {
        let kind = self.piece_kind_at(sq)?;
        let color = if self.color_bb[0].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        Some((color, kind))
    }

    // -------------------------------------------------------------------------
    // Piece placement (hash-maintaining)
    // -------------------------------------------------------------------------

    #[inline(always)]
    fn add_piece(&mut self, color: Color, kind: PieceKind, sq: u8) {
        debug_assert!(!self.occupied.contains(sq));
        self.piece_bb[kind.idx()].set(sq);
        self.color_bb[color.idx()].set(sq);
        self.occupied.set(sq);
        self.hash ^= ZOBRIST.piece_key(color, kind, sq);
    }

    #[inline(always)]
    fn remove_piece(&mut self, color: Color, kind: PieceKind, sq: u8) {
        debug_assert!(self.pieces(color, kind).contains(sq));
        self.piece_bb[kind.idx()].clear(sq);
        self.color_bb[color.idx()].clear(sq);
        self.occupied.clear(sq);
        self.hash ^= ZOBRIST.piece_key(color, kind, sq);
    }

    fn clear_castling_bit(&mut self, bit: u8) {
        if self.castling.0 & bit != 0 {
            self.castling.0 &= !bit;
            self.hash ^= ZOBRIST.castling_key(bit.trailing_zeros() as usize);
        }
    }

    // -------------------------------------------------------------------------
    // Attack queries
    // -------------------------------------------------------------------------

    /// True if any piece of `by` attacks `sq` on the current occupancy.
    pub fn square_attacked_by(&self, sq: u8, by: Color) -> bool {
        self.attackers_to(sq, by).any()
    }

    /// All pieces of `by` attacking `sq`.
    pub fn attackers_to(&self, sq: u8, by: Color) -> Bitboard {
        // A pawn of `by` attacks sq iff a pawn of the other color on sq
        // would attack the pawn's square.
        let pawns = attacks::pawn_attacks(by.opponent(), sq) & self.pieces(by, PieceKind::Pawn);
        let knights = attacks::knight_attacks(sq) & self.pieces(by, PieceKind::Knight);
        let kings = attacks::king_attacks(sq) & self.pieces(by, PieceKind::King);
        let rook_like = self.pieces(by, PieceKind::Rook) | self.pieces(by, PieceKind::Queen);
        let bishop_like = self.pieces(by, PieceKind::Bishop) | self.pieces(by, PieceKind::Queen);
        let rooks = attacks::rook_attacks(sq, self.occupied) & rook_like;
        let bishops = attacks::bishop_attacks(sq, self.occupied) & bishop_like;
        pawns | knights | kings | rooks | bishops
    }

    pub fn in_check(&self) -> bool {
        let ksq = self.king_square(self.side_to_move);
        self.square_attacked_by(ksq, self.side_to_move.opponent())
    }

    /// Compute the check and pin masks for the side to move.
    pub fn check_and_pin_masks(&self) -> KingMasks {
        let us = self.side_to_move;
        let them = us.opponent();
        let ksq = self.king_square(us);
        let our_occ = self.color_bb[us.idx()];

        let checkers = self.attackers_to(ksq, them);

        let checkmask = match checkers.popcount() {
            0 => Bitboard::ALL,
            1 => {
                let c = checkers.lsb().unwrap_or(0);
                // Sliding checkers can be blocked anywhere on the ray;
                // contact checkers can only be captured.
                attacks::between(ksq, c) | Bitboard::from_square(c)
            }
            _ => Bitboard::EMPTY,
        };

        let rook_like = self.pieces(them, PieceKind::Rook) | self.pieces(them, PieceKind::Queen);
        let bishop_like =
            self.pieces(them, PieceKind::Bishop) | self.pieces(them, PieceKind::Queen);

        let mut rook_pin = Bitboard::EMPTY;
        let mut bishop_pin = Bitboard::EMPTY;
        let mut pinned_ortho = Bitboard::EMPTY;
        let mut pinned_diag = Bitboard::EMPTY;

        // Candidate pinners: enemy sliders aligned with the king. Exactly one
        // friendly piece between king and slider makes that piece pinned; the
        // pin mask is the ray up to and including the pinner.
        for sniper in rook_like & attacks::rook_attacks(ksq, Bitboard::EMPTY) {
            let blockers = attacks::between(ksq, sniper) & self.occupied;
            if !blockers.more_than_one() && (blockers & our_occ).any() {
                pinned_ortho |= blockers;
                rook_pin |= attacks::between(ksq, sniper) | Bitboard::from_square(sniper);
            }
        }
        for sniper in bishop_like & attacks::bishop_attacks(ksq, Bitboard::EMPTY) {
            let blockers = attacks::between(ksq, sniper) & self.occupied;
            if !blockers.more_than_one() && (blockers & our_occ).any() {
                pinned_diag |= blockers;
                bishop_pin |= attacks::between(ksq, sniper) | Bitboard::from_square(sniper);
            }
        }

        KingMasks {
            checkmask,
            checkers,
            rook_pin,
            bishop_pin,
            pinned_ortho,
            pinned_diag,
        }
    }

    // -------------------------------------------------------------------------
    // Move application
    // -------------------------------------------------------------------------

    /// Apply a legal move in place. There is no undo; copy first if the
    /// pre-move state is still needed.
    pub fn apply_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();
        let kind = self
            .piece_kind_at(from)
            .expect("apply_move: no piece on origin square");
        debug_assert!(self.color_bb[us.idx()].contains(from));

        // The previous en-passant target expires no matter what.
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.ep_key(file_of(ep));
        }

        let mut reset_clock = kind == PieceKind::Pawn;

        // Captures, including the displaced pawn of an en-passant capture.
        if mv.is_en_passant() {
            let cap_sq = match us {
                Color::White => to - 8,
                Color::Black => to + 8,
            };
            self.remove_piece(them, PieceKind::Pawn, cap_sq);
            reset_clock = true;
        } else if let Some(cap_kind) = self.piece_kind_at(to) {
            self.remove_piece(them, cap_kind, to);
            reset_clock = true;
            // A rook captured on its home square loses the castling right.
            if cap_kind == PieceKind::Rook {
                match (them, to) {
                    (Color::White, 0) => self.clear_castling_bit(CastlingRights::WHITE_QUEEN),
                    (Color::White, 7) => self.clear_castling_bit(CastlingRights::WHITE_KING),
                    (Color::Black, 56) => self.clear_castling_bit(CastlingRights::BLACK_QUEEN),
                    (Color::Black, 63) => self.clear_castling_bit(CastlingRights::BLACK_KING),
                    _ => {}
                }
            }
        }

        self.remove_piece(us, kind, from);
        let placed = if mv.is_promotion() {
            mv.promotion_piece()
        } else {
            kind
        };
        self.add_piece(us, placed, to);

        // Castling moves the rook as well.
        if mv.is_castle() {
            let (rook_from, rook_to) = match to {
                6 => (7u8, 5u8),    // white king side
                2 => (0, 3),        // white queen side
                62 => (63, 61),     // black king side
                58 => (56, 59),     // black queen side
                _ => unreachable!("castle destination {to}"),
            };
            self.remove_piece(us, PieceKind::Rook, rook_from);
            self.add_piece(us, PieceKind::Rook, rook_to);
        }

        // Rights are cleared monotonically on king or home-rook departure.
        match kind {
            PieceKind::King => match us {
                Color::White => {
                    self.clear_castling_bit(CastlingRights::WHITE_KING);
                    self.clear_castling_bit(CastlingRights::WHITE_QUEEN);
                }
                Color::Black => {
                    self.clear_castling_bit(CastlingRights::BLACK_KING);
                    self.clear_castling_bit(CastlingRights::BLACK_QUEEN);
                }
            },
            PieceKind::Rook => match (us, from) {
                (Color::White, 0) => self.clear_castling_bit(CastlingRights::WHITE_QUEEN),
                (Color::White, 7) => self.clear_castling_bit(CastlingRights::WHITE_KING),
                (Color::Black, 56) => self.clear_castling_bit(CastlingRights::BLACK_QUEEN),
                (Color::Black, 63) => self.clear_castling_bit(CastlingRights::BLACK_KING),
                _ => {}
            },
            _ => {}
        }

        // A double pawn push exposes the passed-over square to en passant.
        if kind == PieceKind::Pawn {
            let double = match us {
                Color::White => rank_of(from) == 1 && rank_of(to) == 3,
                Color::Black => rank_of(from) == 6 && rank_of(to) == 4,
            };
            if double {
                let ep = (from + to) / 2;
                self.en_passant = Some(ep);
                self.hash ^= ZOBRIST.ep_key(file_of(ep));
            }
        }

        self.halfmove_clock = if reset_clock {
            0
        } else {
            self.halfmove_clock + 1
        };

        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash ^= ZOBRIST.side_to_move;

        self.history[self.halfmove_clock as usize % HISTORY_LEN] = self.hash;

        debug_assert!(self.is_consistent());
    }

    // -------------------------------------------------------------------------
    // Hashing and draws
    // -------------------------------------------------------------------------

    /// Recompute the Zobrist hash from scratch. Must always agree with the
    /// incrementally maintained hash.
    pub fn compute_hash(&self) -> u64 {
        let mut h = 0u64;
        for color in [Color::White, Color::Black] {
            for kind in PieceKind::ALL {
                for sq in self.pieces(color, kind) {
                    h ^= ZOBRIST.piece_key(color, kind, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            h ^= ZOBRIST.side_to_move;
        }
        for i in 0..4 {
            if self.castling.0 & (1 << i) != 0 {
                h ^= ZOBRIST.castling_key(i);
            }
        }
        if let Some(ep) = self.en_passant {
            h ^= ZOBRIST.ep_key(file_of(ep));
        }
        h
    }

    /// True if the current position already occurred since the last
    /// irreversible move. Scans same-side entries of the history buffer.
    pub fn is_repetition(&self) -> bool {
        let clock = (self.halfmove_clock as usize).min(HISTORY_LEN - 1);
        let mut i = clock as i32 - 4;
        while i >= 0 {
            if self.history[i as usize] == self.hash {
                return true;
            }
            i -= 2;
        }
        false
    }

    /// Fifty-move rule: 100 halfmoves without a pawn move or capture.
    #[inline(always)]
    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    #[cfg(debug_assertions)]
    fn is_consistent(&self) -> bool {
        let union = self.color_bb[0] | self.color_bb[1];
        if union != self.occupied {
            return false;
        }
        if (self.color_bb[0] & self.color_bb[1]).any() {
            return false;
        }
        let mut seen = Bitboard::EMPTY;
        for kind in PieceKind::ALL {
            if (seen & self.piece_bb[kind.idx()]).any() {
                return false;
            }
            seen |= self.piece_bb[kind.idx()];
        }
        seen == self.occupied
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn is_consistent(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
