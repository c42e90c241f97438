use chat_sms_relay::notification::{generate_dedup_key, DedupeGate, ManualClock};
use std::sync::{Arc, Barrier};
use std::time::Duration;

#[test]
fn test_concurrent_admit_single_winner_per_window() {
    for n in [1usize, 2, 8, 32] {
        let clock = Arc::new(ManualClock::new(0));
        let gate = Arc::new(DedupeGate::with_clock(clock.clone()));
        let barrier = Arc::new(Barrier::new(n));

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let gate = gate.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    gate.admit("WA: Bob: hi")
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1, "Failed for {} concurrent callers", n);
    }
}

#[test]
fn test_concurrent_readmit_after_window() {
    let clock = Arc::new(ManualClock::new(0));
    let gate = Arc::new(DedupeGate::with_clock(clock.clone()));
    assert!(gate.admit("k"));

    clock.advance(Duration::from_secs(60));

    let n = 16;
    let barrier = Arc::new(Barrier::new(n));
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let gate = gate.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                gate.admit("k")
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(admitted, 1);
}

#[test]
fn test_admitted_again_only_after_full_window() {
    let clock = Arc::new(ManualClock::new(10_000));
    let gate = DedupeGate::with_clock(clock.clone());

    assert!(gate.admit("k"));
    for offset in [0, 1, 30_000, 59_999] {
        clock.set(10_000 + offset);
        assert!(!gate.admit("k"), "Admitted at offset {}", offset);
    }
    clock.set(70_000);
    assert!(gate.admit("k"));
}

#[test]
fn test_whitespace_variants_share_a_window() {
    let clock = Arc::new(ManualClock::new(0));
    let gate = DedupeGate::with_clock(clock);

    assert!(gate.admit(&generate_dedup_key("WA: Bob — see you")));
    assert!(!gate.admit(&generate_dedup_key("WA:  Bob —\nsee you ")));
}
