use super::*;

#[test]
fn test_from_square() {
    assert_eq!(Bitboard::from_square(0).0, 1); // a1
    assert_eq!(Bitboard::from_square(7).0, 128); // h1
    assert_eq!(Bitboard::from_square(63).0, 1 << 63); // h8
}

#[test]
fn test_popcount() {
    assert_eq!(Bitboard::EMPTY.popcount(), 0);
    assert_eq!(Bitboard::FILE_A.popcount(), 8);
    assert_eq!(Bitboard::RANK_5.popcount(), 8);
    assert_eq!(Bitboard::ALL.popcount(), 64);
}

#[test]
fn test_more_than_one() {
    assert!(!Bitboard::EMPTY.more_than_one());
    assert!(!Bitboard::from_square(12).more_than_one());
    assert!(Bitboard(0b101).more_than_one());
    assert!(Bitboard::ALL.more_than_one());
}

#[test]
fn test_iterator() {
    let bb = Bitboard(0b1010);
    let squares: Vec<u8> = bb.collect();
    assert_eq!(squares, vec![1, 3]);
}
