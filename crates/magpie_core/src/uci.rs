//! UCI move notation and position-command helpers.

use crate::movegen::legal_moves;
use crate::position::Position;
use crate::types::*;

pub fn move_to_uci(mv: Move) -> String {
    let mut s = String::new();
    s.push_str(&square_name(mv.from()));
    s.push_str(&square_name(mv.to()));
    if mv.is_promotion() {
        s.push(match mv.promotion_piece() {
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            _ => 'q',
        });
    }
    s
}

/// Parse coordinate notation against the legal moves of `pos`, so the
/// castle/en-passant/promotion flags come out right.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Option<Move> {
    if txt.len() < 4 {
        return None;
    }
    let from = parse_square(&txt[0..2])?;
    let to = parse_square(&txt[2..4])?;
    let promo = txt.chars().nth(4).and_then(|c| match c {
        'q' | 'Q' => Some(PieceKind::Queen),
        'r' | 'R' => Some(PieceKind::Rook),
        'b' | 'B' => Some(PieceKind::Bishop),
        'n' | 'N' => Some(PieceKind::Knight),
        _ => None,
    });

    let mut legals = MoveList::new();
    legal_moves(pos, &mut legals);
    legals
        .iter()
        .copied()
        .find(|m| {
            m.from() == from
                && m.to() == to
                && match promo {
                    Some(p) => m.is_promotion() && m.promotion_piece() == p,
                    None => !m.is_promotion(),
                }
        })
}

/// Apply a whitespace-separated sequence of coordinate moves; stops and
/// reports the offending token on the first illegal one.
pub fn apply_uci_moves<'a>(
    pos: &mut Position,
    moves: impl IntoIterator<Item = &'a str>,
) -> Result<(), String> {
    for txt in moves {
        let mv = parse_uci_move(pos, txt).ok_or_else(|| format!("illegal move: {txt}"))?;
        pos.apply_move(mv);
    }
    Ok(())
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
