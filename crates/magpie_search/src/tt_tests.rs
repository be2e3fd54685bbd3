use super::*;

fn small_cache() -> TranspositionCache {
    TranspositionCache::new_mib(1)
}

#[test]
fn test_miss_then_hit() {
    let mut tt = small_cache();
    let hash = 0xDEAD_BEEF_CAFE_F00Du64;
    assert_eq!(tt.probe(hash), None);
    tt.store(hash, 0.25);
    assert_eq!(tt.probe(hash), Some(0.25));
}

#[test]
fn test_collision_overwrites() {
    let mut tt = small_cache();
    // Same slot, different upper bits.
    let a = 5u64;
    let b = 5u64 | (1u64 << 40);
    tt.store(a, 0.5);
    tt.store(b, -0.5);
    assert_eq!(tt.probe(b), Some(-0.5));
    assert_eq!(tt.probe(a), None, "the colliding write evicted a");
    // Same upper bits, different slot: both live.
    let c = 6u64 | (1u64 << 40);
    tt.store(c, 0.75);
    assert_eq!(tt.probe(b), Some(-0.5));
    assert_eq!(tt.probe(c), Some(0.75));
}

#[test]
fn test_wrong_key_same_slot_misses() {
    let mut tt = small_cache();
    let a = 9u64 | (7u64 << 32);
    let b = 9u64 | (8u64 << 32);
    tt.store(a, 0.1);
    assert_eq!(tt.probe(b), None);
}

#[test]
fn test_clear() {
    let mut tt = small_cache();
    tt.store(42, 0.9);
    tt.clear();
    assert_eq!(tt.probe(42), None);
}
