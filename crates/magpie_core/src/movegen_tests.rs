use super::*;
use crate::position::Position;

fn moves_of(fen: &str) -> MoveList {
    let pos = Position::from_fen(fen).expect("test FEN parses");
    let mut list = MoveList::new();
    legal_moves(&pos, &mut list);
    list
}

#[test]
fn test_startpos_moves() {
    let pos = Position::startpos();
    let mut list = MoveList::new();
    legal_moves(&pos, &mut list);
    // Starting position has 20 legal moves.
    assert_eq!(list.len(), 20);
}

#[test]
fn test_kiwipete_moves() {
    // Kiwipete position - complex with many move types.
    let list =
        moves_of("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -");
    assert_eq!(list.len(), 48);
}

#[test]
fn test_open_game_black_has_29_moves() {
    // After 1.e4 e5 2.Nf3 black has exactly 29 replies, none of which
    // leave the black king in check.
    let mut pos = Position::startpos();
    let mut list = MoveList::new();
    for uci in ["e2e4", "e7e5", "g1f3"] {
        legal_moves(&pos, &mut list);
        let mv = crate::uci::parse_uci_move(&pos, uci).expect("legal opening move");
        pos.apply_move(mv);
    }
    legal_moves(&pos, &mut list);
    assert_eq!(list.len(), 29);

    for &mv in &list {
        let mut next = pos;
        next.apply_move(mv);
        let king = next.king_square(Color::Black);
        assert!(
            !next.square_attacked_by(king, Color::White),
            "move leaves black king in check"
        );
    }
}

#[test]
fn test_double_check_only_king_moves() {
    // Rook on e8 and bishop on b4 both check the king on e1.
    let list = moves_of("4r3/8/8/8/1b6/8/8/4K3 w - -");
    for &mv in &list {
        assert_eq!(mv.from(), 4, "double check allows only king moves");
    }
    assert!(!list.is_empty());
}

#[test]
fn test_single_check_mask_is_block_or_capture() {
    // Rook on e8 checks the king on e1; e-file squares can block.
    let pos = Position::from_fen("4r3/8/8/8/8/8/8/4K2R w - -").expect("valid FEN");
    let masks = pos.check_and_pin_masks();
    assert!(masks.in_check());
    assert!(!masks.double_check());

    let mut expected = crate::attacks::between(4, 60);
    expected.set(60);
    assert_eq!(masks.checkmask, expected);
}

#[test]
fn test_pinned_knight_has_no_moves() {
    // Knight on e4 is pinned by the rook on e8.
    let list = moves_of("4r3/8/8/8/4N3/8/8/4K3 w - -");
    assert!(list.iter().all(|mv| mv.from() != 28));
}

#[test]
fn test_pinned_rook_slides_along_pin_ray() {
    // Rook on e4 pinned by rook on e8 may move only on the e-file.
    let list = moves_of("4r3/8/8/8/4R3/8/8/4K3 w - -");
    let rook_moves: Vec<_> = list.iter().filter(|mv| mv.from() == 28).collect();
    assert!(!rook_moves.is_empty());
    for mv in rook_moves {
        assert_eq!(file_of(mv.to()), 4, "pinned rook left the e-file");
    }
}

#[test]
fn test_diagonally_pinned_rook_is_immobile() {
    // Rook on d2 pinned by the bishop on a5 cannot move at all.
    let list = moves_of("8/8/8/b7/8/8/3R4/4K3 w - -");
    assert!(list.iter().all(|mv| mv.from() != 11));
}

#[test]
fn test_en_passant_discovered_check_is_illegal() {
    // White pawn e5, black pawn just played f7-f5. Capturing en passant
    // would remove both pawns from the fifth rank and expose the white
    // king on h5 to the rook on a5.
    let list = moves_of("8/8/8/r3Pp1K/8/8/8/4k3 w - f6");
    assert!(
        list.iter().all(|mv| !mv.is_en_passant()),
        "en passant must be rejected when it uncovers a rook check"
    );
}

#[test]
fn test_en_passant_capture_generated() {
    let list = moves_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6");
    assert!(list.iter().any(|mv| mv.is_en_passant() && mv.to() == 43));
}

#[test]
fn test_castling_blocked_through_attacked_square() {
    // Black rook on f8 covers f1, so white may not castle king side, but
    // queen side is fine.
    let list = moves_of("5r1k/8/8/8/8/8/8/R3K2R w KQ -");
    assert!(list.iter().any(|mv| mv.is_castle() && mv.to() == 2));
    assert!(list.iter().all(|mv| !(mv.is_castle() && mv.to() == 6)));
}

#[test]
fn test_promotions_expand_to_four_pieces() {
    let list = moves_of("8/4P3/8/8/8/8/8/k3K3 w - -");
    let promos: Vec<_> = list.iter().filter(|mv| mv.is_promotion()).collect();
    assert_eq!(promos.len(), 4);
    let kinds: std::collections::HashSet<_> =
        promos.iter().map(|mv| mv.promotion_piece().idx()).collect();
    assert_eq!(kinds.len(), 4);
}

#[test]
fn test_stalemate_has_no_moves() {
    // Classic stalemate: black king a8, white queen c7, white king c8...
    // here mirrored for white to move.
    let list = moves_of("k7/8/8/8/8/8/5q2/7K w - -");
    let pos = Position::from_fen("k7/8/8/8/8/8/5q2/7K w - -").expect("valid FEN");
    assert_eq!(list.len(), 0);
    assert!(!pos.in_check());
}
