use super::*;

fn budget(limits: SearchLimits) -> Budget {
    Budget::new(limits, &SearchConfig::default())
}

#[test]
fn test_unlimited_never_stops() {
    let b = budget(SearchLimits::Unlimited);
    assert!(!b.should_stop(u64::MAX, u64::MAX, 1));
}

#[test]
fn test_node_and_iteration_budgets() {
    let b = budget(SearchLimits::Nodes(100));
    assert!(!b.should_stop(1_000, 99, 1));
    assert!(b.should_stop(1, 100, 1));

    let b = budget(SearchLimits::Iterations(50));
    assert!(!b.should_stop(49, 1_000_000, 1));
    assert!(b.should_stop(50, 0, 1));
}

#[test]
fn test_churn_scale_clamped() {
    // No churn at all shrinks toward the lower clamp.
    assert_eq!(churn_scale(0, 1_000_000, 1.0), 0.2);
    // Wild churn saturates at the upper clamp.
    assert_eq!(churn_scale(1_000, 100, 1.0), 2.0);
    // In between, more changes mean more time.
    let quiet = churn_scale(2, 10_000, 1.0);
    let noisy = churn_scale(12, 10_000, 1.0);
    assert!(quiet < noisy);
    assert!((0.2..=2.0).contains(&quiet));
    assert!((0.2..=2.0).contains(&noisy));
}

#[test]
fn test_soft_deadline_capped_by_hard() {
    let soft = Duration::from_millis(100);
    let hard = Duration::from_millis(150);
    let mut b = budget(SearchLimits::MoveTime { soft, hard });
    for _ in 0..1_000 {
        b.record_best_change();
    }
    // Churn would stretch soft to 200ms; the hard limit caps it.
    assert_eq!(b.soft_deadline(100), Some(hard));
}

#[test]
fn test_hard_deadline_stops() {
    let b = budget(SearchLimits::MoveTime {
        soft: Duration::ZERO,
        hard: Duration::ZERO,
    });
    assert!(b.should_stop(0, 0, 1));
}

#[test]
fn test_move_time_constructor() {
    let limits = SearchLimits::move_time(Duration::from_millis(300));
    assert_eq!(
        limits,
        SearchLimits::MoveTime {
            soft: Duration::from_millis(300),
            hard: Duration::from_millis(600),
        }
    );
}
