use super::*;
use crate::uci::{apply_uci_moves, parse_uci_move};

#[test]
fn test_startpos_fields() {
    let pos = Position::startpos();
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.castling(), CastlingRights::ALL);
    assert_eq!(pos.en_passant(), None);
    assert_eq!(pos.halfmove_clock(), 0);
    assert_eq!(pos.fullmove_number(), 1);
    assert_eq!(pos.occupied().popcount(), 32);
    assert_eq!(pos.king_square(Color::White), 4);
    assert_eq!(pos.king_square(Color::Black), 60);
}

#[test]
fn test_fen_roundtrip() {
    let fens = [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3",
    ];
    for fen in fens {
        let pos = Position::from_fen(fen).expect("valid FEN");
        assert_eq!(pos.to_fen(), fen, "round-trip of {fen}");
        assert_eq!(pos.hash(), pos.compute_hash());
    }
}

#[test]
fn test_fen_errors() {
    assert!(Position::from_fen("").is_err());
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8 w KQkq -").is_err());
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
}

#[test]
fn test_value_copy_isolation() {
    let original = Position::startpos();
    let mut scratch = original;
    let mv = parse_uci_move(&scratch, "e2e4").expect("legal");
    scratch.apply_move(mv);
    // Copy-make: the parent must be untouched by work on the child.
    assert_eq!(original.to_fen(), START_FEN);
    assert_ne!(original.hash(), scratch.hash());
    assert_eq!(original.hash(), original.compute_hash());
}

#[test]
fn test_incremental_hash_matches_scratch() {
    let mut pos = Position::startpos();
    let line = [
        "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6",
        "c1g5", "e7e6", "f2f4", "f8e7", "d1f3", "d8c7", "e1c1", // long castle
    ];
    for txt in line {
        let mv = parse_uci_move(&pos, txt).unwrap_or_else(|| panic!("illegal {txt}"));
        pos.apply_move(mv);
        assert_eq!(pos.hash(), pos.compute_hash(), "after {txt}");
    }
    assert_eq!(pos.king_square(Color::White), 2);
    assert_eq!(pos.piece_kind_at(3), Some(PieceKind::Rook));
}

#[test]
fn test_en_passant_capture() {
    let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3").expect("valid FEN");
    let mv = parse_uci_move(&pos, "e5d6").expect("en passant is legal");
    assert!(mv.is_en_passant());
    pos.apply_move(mv);
    // The captured pawn sat on d5, not on the destination square.
    assert_eq!(pos.piece_at(35), None);
    assert_eq!(pos.piece_at(43), Some((Color::White, PieceKind::Pawn)));
    assert_eq!(pos.hash(), pos.compute_hash());
}

#[test]
fn test_castling_rights_only_shrink() {
    let mut pos = Position::startpos();
    let line = ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"];
    let mut prev = pos.castling().bits();
    for txt in line {
        let mv = parse_uci_move(&pos, txt).unwrap_or_else(|| panic!("illegal {txt}"));
        pos.apply_move(mv);
        let cur = pos.castling().bits();
        assert_eq!(cur & !prev, 0, "rights regained after {txt}");
        prev = cur;
    }
    assert!(!pos.castling().has(CastlingRights::WHITE_KING));
    assert!(!pos.castling().has(CastlingRights::WHITE_QUEEN));
    assert!(pos.castling().has(CastlingRights::BLACK_KING));
}

#[test]
fn test_rook_capture_clears_right() {
    let mut pos =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid FEN");
    apply_uci_moves(&mut pos, ["a1a8"]).expect("legal");
    assert!(!pos.castling().has(CastlingRights::BLACK_QUEEN));
    assert!(!pos.castling().has(CastlingRights::WHITE_QUEEN));
    assert!(pos.castling().has(CastlingRights::BLACK_KING));
    assert!(pos.castling().has(CastlingRights::WHITE_KING));
}

#[test]
fn test_repetition_detection() {
    let mut pos = Position::startpos();
    assert!(!pos.is_repetition());
    apply_uci_moves(&mut pos, ["g1f3", "g8f6", "f3g1"]).expect("legal");
    assert!(!pos.is_repetition());
    // Shuffling the knights home recreates the root position.
    apply_uci_moves(&mut pos, ["f6g8"]).expect("legal");
    assert!(pos.is_repetition());
}

#[test]
fn test_pawn_move_resets_clock_and_history() {
    let mut pos = Position::startpos();
    apply_uci_moves(&mut pos, ["g1f3", "g8f6", "f3g1", "f6g8"]).expect("legal");
    assert_eq!(pos.halfmove_clock(), 4);
    assert!(pos.is_repetition());
    // The pawn push is irreversible and fences off the knight shuffle.
    apply_uci_moves(&mut pos, ["e2e4"]).expect("legal");
    assert_eq!(pos.halfmove_clock(), 0);
    assert!(!pos.is_repetition());
    apply_uci_moves(&mut pos, ["e7e5", "g1f3", "g8f6"]).expect("legal");
    assert!(!pos.is_repetition());
}

#[test]
fn test_fifty_move_draw() {
    let mut pos = Position::from_fen("8/8/8/8/8/8/8/k1K5 w - - 99 80").expect("valid FEN");
    assert!(!pos.fifty_move_draw());
    apply_uci_moves(&mut pos, ["c1d1"]).expect("legal");
    assert!(pos.fifty_move_draw());
}

#[test]
fn test_attackers_to() {
    let pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .expect("valid FEN");
    // e6 is covered only by the d5 pawn.
    let attackers = pos.attackers_to(44, Color::White);
    assert!(attackers.contains(35));
    assert_eq!(attackers.popcount(), 1);
    // f6 is hit by the f3 queen down the half-open file.
    assert!(pos.square_attacked_by(45, Color::White));
    assert!(!pos.in_check());
}

#[test]
fn test_check_masks_shape() {
    let pos = Position::from_fen("4r3/8/8/8/8/8/8/4K2R w K - 0 1").expect("valid FEN");
    let masks = pos.check_and_pin_masks();
    assert!(masks.in_check());
    assert!(!masks.double_check());
    assert_eq!(masks.checkers.popcount(), 1);
    assert!(masks.checkmask.contains(60));
    assert!(masks.checkmask.contains(12));
    assert!(!masks.checkmask.contains(0));
    assert_eq!(masks.pinned(), Bitboard::EMPTY);
}
