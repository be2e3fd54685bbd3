use super::*;

#[test]
fn test_defaults_are_sane() {
    let cfg = SearchConfig::default();
    assert!(cfg.exploration_root >= cfg.exploration);
    assert!(cfg.overturn_weight_floor > cfg.confirm_weight_floor);
    assert!(cfg.tree_memory_mib > 0 && cfg.tt_memory_mib > 0);
}

#[test]
fn test_partial_toml_overrides() {
    let cfg = SearchConfig::from_toml_str("tree_memory_mib = 32\nexploration = 0.4\n")
        .expect("valid TOML");
    assert_eq!(cfg.tree_memory_mib, 32);
    assert_eq!(cfg.exploration, 0.4);
    assert_eq!(cfg.tt_memory_mib, SearchConfig::default().tt_memory_mib);
}

#[test]
fn test_unknown_field_rejected() {
    assert!(SearchConfig::from_toml_str("no_such_knob = 1\n").is_err());
}
