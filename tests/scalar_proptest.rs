#![cfg(not(feature = "loom"))]

use proptest::prelude::*;
use rime::{AtomicInt, AtomicLong};

#[derive(Debug, Clone)]
enum Op {
    Set(i64),
    Add(i64),
    Swap(i64, i64),
    CompareSet(i64, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A narrow value range makes compare hits common.
    let small = -4_i64..4;
    prop_oneof![
        small.clone().prop_map(Op::Set),
        any::<i64>().prop_map(Op::Add),
        (small.clone(), small.clone()).prop_map(|(e, n)| Op::Swap(e, n)),
        (small.clone(), small).prop_map(|(e, n)| Op::CompareSet(e, n)),
    ]
}

proptest! {
    #[test]
    fn test_long_matches_sequential_model(start in -4_i64..4, ops in proptest::collection::vec(op_strategy(), 1..64)) {
        let cell = AtomicLong::new(start);
        let mut model = start;

        for op in ops {
            match op {
                Op::Set(v) => {
                    cell.set(v);
                    model = v;
                }
                Op::Add(d) => {
                    model = model.wrapping_add(d);
                    prop_assert_eq!(cell.add_and_get(d), model);
                }
                Op::Swap(e, n) => {
                    let prior = cell.compare_and_swap(e, n);
                    prop_assert_eq!(prior, model);
                    if model == e {
                        model = n;
                    }
                }
                Op::CompareSet(e, n) => {
                    let swapped = cell.compare_and_set(e, n);
                    prop_assert_eq!(swapped, model == e);
                    if swapped {
                        model = n;
                    }
                }
            }
            prop_assert_eq!(cell.get(), model);
        }
    }

    #[test]
    fn test_compare_and_set_agrees_with_compare_and_swap(start in any::<i32>(), expected in any::<i32>(), new in any::<i32>()) {
        let via_swap = AtomicInt::new(start);
        let via_set = AtomicInt::new(start);

        let prior = via_swap.compare_and_swap(expected, new);
        let swapped = via_set.compare_and_set(expected, new);

        prop_assert_eq!(swapped, prior == expected);
        prop_assert_eq!(via_swap.get(), via_set.get());
    }

    #[test]
    fn test_cas_scenario_any_values(old in any::<i32>(), new in any::<i32>(), other in any::<i32>()) {
        prop_assume!(other != old);
        let cell = AtomicInt::new(old);
        prop_assert_eq!(cell.compare_and_swap(old, new), old);
        prop_assert_eq!(cell.get(), new);

        let cell = AtomicInt::new(old);
        prop_assert_eq!(cell.compare_and_swap(other, new), old);
        prop_assert_eq!(cell.get(), old);
    }
}
