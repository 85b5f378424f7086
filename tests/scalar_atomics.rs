#![cfg(not(feature = "loom"))]

use rime::{AtomicInt, AtomicLong, AtomicNativePtr, IntegerCell, ScalarCell};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const ITERS: usize = 5_000;

fn hammer_add<C>(cell: &C, delta: C::Int)
where
    C: IntegerCell,
{
    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                for _ in 0..ITERS {
                    cell.add_and_get(delta);
                }
            });
        }
    });
}

#[test]
fn test_add_and_get_is_atomic_int() {
    let cell = AtomicInt::new(-3);
    hammer_add(&cell, 3);
    assert_eq!(cell.get(), -3 + (THREADS * ITERS * 3) as i32);
}

#[test]
fn test_add_and_get_is_atomic_long() {
    let start = 1_i64 << 40;
    let cell = AtomicLong::new(start);
    hammer_add(&cell, -7);
    assert_eq!(cell.get(), start - (THREADS * ITERS * 7) as i64);
}

#[test]
fn test_increment_decrement_balance() {
    let cell = Arc::new(AtomicLong::new(0));
    thread::scope(|s| {
        for i in 0..THREADS {
            let cell = cell.clone();
            s.spawn(move || {
                for _ in 0..ITERS {
                    if i % 2 == 0 {
                        cell.increment();
                    } else {
                        cell.decrement();
                    }
                }
            });
        }
    });
    assert_eq!(cell.get(), 0);
}

fn step_through_trait<C>(cell: &C) -> (C::Int, C::Int)
where
    C: IntegerCell,
{
    let up = IntegerCell::increment(cell);
    let down = IntegerCell::decrement(cell);
    (up, down)
}

#[test]
fn test_trait_increment_decrement_defaults() {
    let int = AtomicInt::new(41);
    assert_eq!(step_through_trait(&int), (42, 41));
    assert_eq!(int.get(), 41);

    let long = AtomicLong::new(i64::MAX);
    assert_eq!(step_through_trait(&long), (i64::MIN, i64::MAX));
    assert_eq!(long.get(), i64::MAX);
}

fn cas_scenario<C>(cell: &C, ten: C::Value, twenty: C::Value, thirty: C::Value)
where
    C: ScalarCell,
{
    assert_eq!(cell.compare_and_swap(ten, twenty), ten);
    assert_eq!(cell.get(), twenty);
    assert_eq!(cell.compare_and_swap(ten, thirty), twenty);
    assert_eq!(cell.get(), twenty);

    assert!(!cell.compare_and_set(ten, thirty));
    assert_eq!(cell.get(), twenty);
    assert!(cell.compare_and_set(twenty, thirty));
    assert_eq!(cell.get(), thirty);

    cell.set(ten);
    assert_eq!(cell.get(), ten);
}

#[test]
fn test_cas_scenario_all_widths() {
    cas_scenario(&AtomicInt::new(10), 10, 20, 30);
    cas_scenario(&AtomicLong::new(10), 10, 20, 30);

    let mut slots = [0u8; 3];
    let [p10, p20, p30] = [0, 1, 2].map(|i| (&mut slots[i] as *mut u8).cast::<core::ffi::c_void>());
    cas_scenario(&AtomicNativePtr::new(p10), p10, p20, p30);
}

#[test]
fn test_cas_counter_loses_no_updates() {
    // Retry loop built on the value returned by compare_and_swap.
    let cell = AtomicInt::new(0);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERS {
                    let mut seen = cell.get();
                    loop {
                        let prior = cell.compare_and_swap(seen, seen + 1);
                        if prior == seen {
                            break;
                        }
                        seen = prior;
                    }
                }
            });
        }
    });
    assert_eq!(cell.get(), (THREADS * ITERS) as i32);
}

#[test]
fn test_compare_and_set_single_winner() {
    let cell = AtomicLong::new(0);
    let barrier = Barrier::new(THREADS);
    let winners = AtomicInt::new(0);
    thread::scope(|s| {
        for i in 0..THREADS {
            let (cell, barrier, winners) = (&cell, &barrier, &winners);
            s.spawn(move || {
                barrier.wait();
                if cell.compare_and_set(0, i as i64 + 1) {
                    winners.increment();
                }
            });
        }
    });
    assert_eq!(winners.get(), 1);
    assert_ne!(cell.get(), 0);
}

#[test]
fn test_wraparound_matches_twos_complement() {
    let cell = AtomicLong::new(i64::MAX);
    assert_eq!(cell.increment(), i64::MIN);
    let cell = AtomicInt::new(i32::MIN);
    assert_eq!(cell.add_and_get(-1), i32::MAX);
}
