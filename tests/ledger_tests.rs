use dispatch_lite::{HostSlotLedger, HostState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn host(id: &str, available_slots: u32) -> HostState {
    HostState::new(id, available_slots, 8)
}

#[test]
fn test_credit_and_debit_balance() {
    let ledger = HostSlotLedger::new(60_000);

    ledger.mark_available("a");
    ledger.mark_available("a");
    ledger.mark_available("a");
    ledger.mark_kicked("a");

    assert_eq!(ledger.snapshot("a"), Some(2));
    assert!(ledger.has_slot("a"));
}

#[test]
fn test_debit_clamps_at_zero() {
    let ledger = HostSlotLedger::new(60_000);

    ledger.mark_kicked("absent");
    assert_eq!(ledger.snapshot("absent"), None, "debit must not create an entry");

    ledger.mark_available("a");
    ledger.mark_kicked("a");
    ledger.mark_kicked("a");
    assert_eq!(ledger.snapshot("a"), Some(0));
    assert!(!ledger.has_slot("a"));
}

#[test]
fn test_has_slot_requires_positive_entry() {
    let ledger = HostSlotLedger::new(60_000);
    assert!(!ledger.has_slot("a"));

    ledger.refresh(&[host("a", 0), host("b", 1)], 0);
    assert!(!ledger.has_slot("a"));
    assert!(ledger.has_slot("b"));
}

#[test]
fn test_refresh_replaces_ledger_wholesale() {
    let ledger = HostSlotLedger::new(60_000);
    ledger.mark_available("stale");

    assert!(ledger.refresh(&[host("a", 4), host("b", 2)], 0));

    assert_eq!(ledger.snapshot("stale"), None);
    assert_eq!(ledger.snapshot("a"), Some(4));
    assert_eq!(ledger.snapshot("b"), Some(2));
}

#[test]
fn test_refresh_throttled_by_interval() {
    let ledger = HostSlotLedger::new(60_000);

    assert!(ledger.refresh(&[host("a", 2)], 1_000), "first refresh always applies");
    assert!(!ledger.refresh(&[host("a", 9)], 30_000));
    assert_eq!(ledger.snapshot("a"), Some(2), "throttled refresh is a no-op");

    assert!(ledger.refresh(&[host("a", 9)], 61_000));
    assert_eq!(ledger.snapshot("a"), Some(9));
}

#[test]
fn test_refresh_skips_hosts_without_id() {
    let ledger = HostSlotLedger::new(60_000);

    ledger.refresh(&[host("", 5), host("a", 3)], 0);

    assert_eq!(ledger.snapshot(""), None);
    assert_eq!(ledger.snapshot("a"), Some(3));
}

#[test]
fn test_credit_ignores_empty_host_id() {
    let ledger = HostSlotLedger::new(60_000);
    ledger.mark_available("");
    assert_eq!(ledger.snapshot(""), None);
}

#[test]
fn test_random_credit_debit_sequence_tracks_model() {
    let ledger = HostSlotLedger::new(60_000);
    ledger.refresh(&[host("a", 5)], 0);

    let mut rng = StdRng::seed_from_u64(7);
    let mut model: u32 = 5;
    for _ in 0..10_000 {
        if rng.gen_bool(0.5) {
            ledger.mark_available("a");
            model += 1;
        } else {
            ledger.mark_kicked("a");
            model = model.saturating_sub(1);
        }
        assert_eq!(ledger.snapshot("a"), Some(model));
        assert_eq!(ledger.has_slot("a"), model > 0);
    }
}
