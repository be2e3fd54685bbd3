//! Perft node counting for move-generator validation.

use crate::movegen::legal_moves;
use crate::position::Position;
use crate::types::MoveList;

/// Count all leaf positions reachable from `pos` in exactly `depth` plies.
///
/// Copy-make: the position has no retraction, so each ply works on a copy.
/// One move buffer per remaining ply is reused across siblings.
pub fn perft(pos: &Position, depth: u8) -> u64 {
    fn inner(pos: &Position, depth: u8, layers: &mut [MoveList]) -> u64 {
        let (buf, rest) = layers
            .split_first_mut()
            .expect("perft requires one buffer per remaining ply");

        legal_moves(pos, buf);
        if depth == 1 {
            return buf.len() as u64;
        }

        let mut nodes = 0u64;
        for i in 0..buf.len() {
            let mv = buf.as_slice()[i];
            let mut next = *pos;
            next.apply_move(mv);
            nodes += inner(&next, depth - 1, rest);
        }
        nodes
    }

    if depth == 0 {
        return 1;
    }
    let mut layers = vec![MoveList::new(); depth as usize];
    inner(pos, depth, &mut layers[..])
}
