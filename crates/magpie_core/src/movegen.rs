//! Legal move generation.
//!
//! Moves are produced directly legal via check and pin masks rather than
//! generated pseudo-legally and filtered. Only two cases are validated by
//! trial application, because they are awkward to express as masks alone:
//! king steps (including the implicit "did we walk into a defended square")
//! and en-passant captures (which can expose a horizontal discovered check
//! the pin masks do not cover).

use crate::attacks;
use crate::bitboard::Bitboard;
use crate::position::{CastlingRights, KingMasks, Position};
use crate::types::*;

/// Generate all legal moves for the side to move into `out`.
///
/// No ordering is guaranteed; callers that need a particular order sort the
/// buffer themselves.
pub fn legal_moves(pos: &Position, out: &mut MoveList) {
    out.clear();
    let masks = pos.check_and_pin_masks();

    gen_king(pos, out);

    // Double check: only the king may move.
    if masks.double_check() {
        return;
    }

    if !masks.in_check() {
        gen_castles(pos, out);
    }
    gen_knights(pos, &masks, out);
    gen_sliders(pos, &masks, out);
    gen_pawns(pos, &masks, out);
}

/// Trial-apply `mv` and report whether the mover's king survives.
fn leaves_king_safe(pos: &Position, mv: Move) -> bool {
    let mut next = *pos;
    next.apply_move(mv);
    // After application the opponent is on move; the mover's king must not
    // be attacked by them.
    let king = next.king_square(next.side_to_move().opponent());
    !next.square_attacked_by(king, next.side_to_move())
}

fn gen_king(pos: &Position, out: &mut MoveList) {
    let ksq = pos.king_square(pos.side_to_move());
    let targets = attacks::king_attacks(ksq) & !pos.own_pieces(None);
    for to in targets {
        let mv = Move::new(ksq, to);
        if leaves_king_safe(pos, mv) {
            out.push(mv);
        }
    }
}

fn gen_castles(pos: &Position, out: &mut MoveList) {
    let us = pos.side_to_move();
    let them = us.opponent();
    let occ = pos.occupied();

    // (right, king from, king to, squares that must be empty, squares the
    // king crosses that must be unattacked)
    let lines: [(u8, u8, u8, &[u8], &[u8]); 2] = match us {
        Color::White => [
            (CastlingRights::WHITE_KING, 4, 6, &[5, 6], &[5, 6]),
            (CastlingRights::WHITE_QUEEN, 4, 2, &[3, 2, 1], &[3, 2]),
        ],
        Color::Black => [
            (CastlingRights::BLACK_KING, 60, 62, &[61, 62], &[61, 62]),
            (CastlingRights::BLACK_QUEEN, 60, 58, &[59, 58, 57], &[59, 58]),
        ],
    };

    for (right, from, to, empties, crossings) in lines {
        if !pos.castling().has(right) {
            continue;
        }
        if empties.iter().any(|&sq| occ.contains(sq)) {
            continue;
        }
        if crossings.iter().any(|&sq| pos.square_attacked_by(sq, them)) {
            continue;
        }
        out.push(Move::castle(from, to));
    }
}

fn gen_knights(pos: &Position, masks: &KingMasks, out: &mut MoveList) {
    // A pinned knight never has a legal move: every jump leaves the pin line.
    let knights = pos.own_pieces(Some(PieceKind::Knight)) & !masks.pinned();
    let own = pos.own_pieces(None);
    for from in knights {
        for to in attacks::knight_attacks(from) & !own & masks.checkmask {
            out.push(Move::new(from, to));
        }
    }
}

fn gen_sliders(pos: &Position, masks: &KingMasks, out: &mut MoveList) {
    let own = pos.own_pieces(None);
    let occ = pos.occupied();

    for kind in [PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen] {
        for from in pos.own_pieces(Some(kind)) {
            let reach = match kind {
                PieceKind::Bishop => attacks::bishop_attacks(from, occ),
                PieceKind::Rook => attacks::rook_attacks(from, occ),
                _ => attacks::queen_attacks(from, occ),
            };
            let mut targets = reach & !own & masks.checkmask;
            // A pinned slider stays on its pin ray; a piece pinned both ways
            // has no moves (the intersection is empty).
            if masks.pinned_ortho.contains(from) {
                targets &= masks.rook_pin;
            }
            if masks.pinned_diag.contains(from) {
                targets &= masks.bishop_pin;
            }
            for to in targets {
                out.push(Move::new(from, to));
            }
        }
    }
}

fn gen_pawns(pos: &Position, masks: &KingMasks, out: &mut MoveList) {
    let us = pos.side_to_move();
    let occ = pos.occupied();
    let enemies = pos.opponent_pieces(None);

    let (push_offset, start_rank, promo_rank): (i8, u8, u8) = match us {
        Color::White => (8, 1, 7),
        Color::Black => (-8, 6, 0),
    };

    for from in pos.own_pieces(Some(PieceKind::Pawn)) {
        let mut quiets = Bitboard::EMPTY;
        let single = (from as i8 + push_offset) as u8;
        if !occ.contains(single) {
            quiets.set(single);
            if rank_of(from) == start_rank {
                let double = (single as i8 + push_offset) as u8;
                if !occ.contains(double) {
                    quiets.set(double);
                }
            }
        }

        let mut captures = attacks::pawn_attacks(us, from) & enemies;

        quiets &= masks.checkmask;
        captures &= masks.checkmask;
        if masks.pinned_ortho.contains(from) {
            quiets &= masks.rook_pin;
            captures &= masks.rook_pin;
        }
        if masks.pinned_diag.contains(from) {
            quiets &= masks.bishop_pin;
            captures &= masks.bishop_pin;
        }

        for to in quiets | captures {
            if rank_of(to) == promo_rank {
                for piece in [
                    PieceKind::Queen,
                    PieceKind::Rook,
                    PieceKind::Bishop,
                    PieceKind::Knight,
                ] {
                    out.push(Move::promotion(from, to, piece));
                }
            } else {
                out.push(Move::new(from, to));
            }
        }

        // En passant sidesteps the mask machinery entirely: removing two
        // pawns from one rank can uncover a rook check no pin ray records.
        if let Some(ep) = pos.en_passant()
            && attacks::pawn_attacks(us, from).contains(ep)
        {
            let mv = Move::en_passant(from, ep);
            if leaves_king_safe(pos, mv) {
                out.push(mv);
            }
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
