use super::*;

#[test]
fn test_move_packing_roundtrip() {
    let mv = Move::new(12, 28); // e2e4
    assert_eq!(mv.from(), 12);
    assert_eq!(mv.to(), 28);
    assert_eq!(mv.flag(), MoveFlag::None);

    let castle = Move::castle(4, 6);
    assert!(castle.is_castle());
    assert!(!castle.is_promotion());

    let ep = Move::en_passant(28, 21);
    assert!(ep.is_en_passant());

    for piece in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ] {
        let promo = Move::promotion(52, 60, piece);
        assert!(promo.is_promotion());
        assert_eq!(promo.promotion_piece(), piece);
        assert_eq!(promo.from(), 52);
        assert_eq!(promo.to(), 60);
    }
}

#[test]
fn test_square_helpers() {
    assert_eq!(parse_square("a1"), Some(0));
    assert_eq!(parse_square("h8"), Some(63));
    assert_eq!(parse_square("e4"), Some(28));
    assert_eq!(parse_square("i1"), None);
    assert_eq!(square_name(28), "e4");
    assert_eq!(square_at(4, 3), Some(28));
    assert_eq!(square_at(-1, 3), None);
}

#[test]
fn test_movelist() {
    let mut list = MoveList::new();
    assert!(list.is_empty());
    list.push(Move::new(12, 28));
    list.push(Move::new(12, 20));
    assert_eq!(list.len(), 2);
    assert!(list.contains(Move::new(12, 20)));
    list.clear();
    assert!(list.is_empty());
}
