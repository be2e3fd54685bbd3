//! Leaf evaluation contract and a material/piece-square reference evaluator.

use magpie_core::{Color, Move, PieceKind, Position};

/// Static evaluator consulted at search leaves.
///
/// Implementations keep their own incremental feature state: `push` applies
/// one move's delta, `pop` rewinds it, and `refresh` rebuilds everything from
/// a position (required after the tree is advanced to a child, where the
/// search works from a fresh copy of the board).
pub trait Evaluator {
    /// Rebuild all internal state from `pos`.
    fn refresh(&mut self, pos: &Position);

    /// Apply the feature delta of `mv`, which must be legal in `pos`
    /// (the position *before* the move).
    fn push(&mut self, pos: &Position, mv: Move);

    /// Rewind the most recent `push`.
    fn pop(&mut self);

    /// Centipawn score from `side_to_move`'s perspective.
    fn evaluate(&self, side_to_move: Color) -> i32;
}

/// Compress centipawns into the search's [-1, 1] value range.
#[inline]
pub fn cp_to_value(cp: i32, scale: f32) -> f32 {
    (cp as f32 / scale).tanh()
}

/// Inverse of [`cp_to_value`], clamped away from the asymptotes.
#[inline]
pub fn value_to_cp(value: f32, scale: f32) -> i32 {
    (value.clamp(-0.9999, 0.9999).atanh() * scale).round() as i32
}

#[inline]
fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

// Piece-square tables, written visually: first row is rank 8. A white piece
// on square `sq` indexes with `sq ^ 56`, a black piece with `sq`.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
     0,  0,  5,  5,  5,  5,  0, -5,
   -10,  5,  5,  5,  5,  5,  0,-10,
   -10,  0,  5,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -10,-20,-20,-20,-20,-20,-20,-10,
    20, 20,  0,  0,  0,  0, 20, 20,
    20, 30, 10,  0,  0, 10, 30, 20,
];

#[inline]
fn pst(kind: PieceKind) -> &'static [i32; 64] {
    match kind {
        PieceKind::Pawn => &PAWN_PST,
        PieceKind::Knight => &KNIGHT_PST,
        PieceKind::Bishop => &BISHOP_PST,
        PieceKind::Rook => &ROOK_PST,
        PieceKind::Queen => &QUEEN_PST,
        PieceKind::King => &KING_PST,
    }
}

/// Score contribution of one piece, positive regardless of color.
#[inline]
fn piece_score(color: Color, kind: PieceKind, sq: u8) -> i32 {
    let idx = match color {
        Color::White => (sq ^ 56) as usize,
        Color::Black => sq as usize,
    };
    piece_value(kind) + pst(kind)[idx]
}

/// Material + piece-square evaluator with an incremental accumulator.
///
/// The accumulator is kept from White's perspective; each `push` records the
/// prior value on an undo stack so `pop` is a plain restore.
#[derive(Debug, Default)]
pub struct MaterialEvaluator {
    score: i32,
    stack: Vec<i32>,
}

impl MaterialEvaluator {
    pub fn new(pos: &Position) -> Self {
        let mut eval = MaterialEvaluator::default();
        eval.refresh(pos);
        eval
    }

    #[inline]
    fn signed(color: Color, v: i32) -> i32 {
        match color {
            Color::White => v,
            Color::Black => -v,
        }
    }
}

impl Evaluator for MaterialEvaluator {
    fn refresh(&mut self, pos: &Position) {
        self.stack.clear();
        self.score = 0;
        for sq in 0..64u8 {
            if let Some((color, kind)) = pos.piece_at(sq) {
                self.score += Self::signed(color, piece_score(color, kind, sq));
            }
        }
    }

    fn push(&mut self, pos: &Position, mv: Move) {
        self.stack.push(self.score);

        let us = pos.side_to_move();
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();
        let Some(kind) = pos.piece_kind_at(from) else {
            debug_assert!(false, "push with an empty origin square");
            return;
        };

        let mut delta = -piece_score(us, kind, from);
        let landing = if mv.is_promotion() {
            mv.promotion_piece()
        } else {
            kind
        };
        delta += piece_score(us, landing, to);

        if mv.is_en_passant() {
            let captured_sq = match us {
                Color::White => to - 8,
                Color::Black => to + 8,
            };
            delta += piece_score(them, PieceKind::Pawn, captured_sq);
        } else if let Some(victim) = pos.piece_kind_at(to) {
            delta += piece_score(them, victim, to);
        }

        if mv.is_castle() {
            let (rook_from, rook_to) = match to {
                6 => (7u8, 5u8),
                2 => (0, 3),
                62 => (63, 61),
                _ => (56, 59),
            };
            delta -= piece_score(us, PieceKind::Rook, rook_from);
            delta += piece_score(us, PieceKind::Rook, rook_to);
        }

        // delta is from the mover's perspective; the accumulator is white's.
        self.score += Self::signed(us, delta);
    }

    fn pop(&mut self) {
        debug_assert!(!self.stack.is_empty(), "pop without a matching push");
        if let Some(prev) = self.stack.pop() {
            self.score = prev;
        }
    }

    fn evaluate(&self, side_to_move: Color) -> i32 {
        Self::signed(side_to_move, self.score)
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
