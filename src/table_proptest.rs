#![cfg(test)]

// Property tests for Table kept inside the crate so they can use the
// in-crate test value type.

use crate::error::{Error, Mutation};
use crate::table::OrderedMap;
use crate::testing::TV;
use proptest::prelude::*;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i64),
    Delete(usize),
    Lookup(usize),
    Clear,
    Iterate,
    Freeze,
    GuardedInsert(usize, i64),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<TV>, Vec<OpI>)> {
    // Half of the pool collides on a single hash.
    let key = prop_oneof![
        (-50i64..50).prop_map(TV::Int),
        (0i64..20).prop_map(TV::Collide),
    ];
    proptest::collection::vec(key, 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Delete),
            3 => idx.clone().prop_map(OpI::Lookup),
            1 => Just(OpI::Clear),
            2 => Just(OpI::Iterate),
            1 => Just(OpI::Freeze),
            1 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::GuardedInsert(i, v)),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against an insertion-ordered
// association list.
// Invariants exercised across random operation sequences:
// - Insert of a new key appends; insert of a present key updates in place.
// - Delete removes exactly the matching key and keeps the rest in order.
// - Lookup agrees with the model for present and absent keys.
// - Iteration yields the model's keys in model order.
// - After freeze every mutation fails with Frozen and the contents stay put.
// - While a cursor is live, mutation fails with ConcurrentMutation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: OrderedMap<TV, TV> = OrderedMap::new();
        let mut model: Vec<(TV, i64)> = Vec::new();
        let mut frozen = false;

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i].clone();
                    let res = sut.insert(k.clone(), TV::Int(v));
                    if frozen {
                        prop_assert_eq!(res, Err(Error::Frozen(Mutation::Insert)));
                    } else {
                        prop_assert!(res.is_ok());
                        match model.iter_mut().find(|(mk, _)| *mk == k) {
                            Some(slot) => slot.1 = v,
                            None => model.push((k, v)),
                        }
                    }
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    let res = sut.delete(k);
                    if frozen {
                        prop_assert_eq!(res, Err(Error::Frozen(Mutation::Delete)));
                    } else {
                        let pos = model.iter().position(|(mk, _)| mk == k);
                        let expected = pos.map(|p| TV::Int(model.remove(p).1));
                        prop_assert_eq!(res, Ok(expected));
                    }
                }
                OpI::Lookup(i) => {
                    let k = &pool[i];
                    let got = sut.lookup(k).unwrap().cloned();
                    let want = model.iter().find(|(mk, _)| mk == k).map(|(_, v)| TV::Int(*v));
                    prop_assert_eq!(got, want);
                }
                OpI::Clear => {
                    let res = sut.clear();
                    if frozen {
                        prop_assert_eq!(res, Err(Error::Frozen(Mutation::Clear)));
                    } else {
                        prop_assert!(res.is_ok());
                        model.clear();
                    }
                }
                OpI::Iterate => {
                    let got: Vec<TV> = sut.keys().cloned().collect();
                    let want: Vec<TV> = model.iter().map(|(k, _)| k.clone()).collect();
                    prop_assert_eq!(got, want);
                }
                OpI::Freeze => {
                    sut.freeze();
                    frozen = true;
                }
                OpI::GuardedInsert(i, v) => {
                    let mut cursor = sut.iterate();
                    let res = sut.insert(pool[i].clone(), TV::Int(v));
                    let expected = if frozen {
                        Error::Frozen(Mutation::Insert)
                    } else {
                        Error::ConcurrentMutation(Mutation::Insert)
                    };
                    prop_assert_eq!(res, Err(expected));
                    let mut n = 0;
                    while cursor.next(&sut).is_some() {
                        n += 1;
                    }
                    prop_assert_eq!(n, model.len());
                    cursor.done();
                    prop_assert_eq!(sut.active_iterators(), 0);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert_eq!(sut.first(), model.first().map(|(k, _)| k));
            let nb = sut.bucket_count();
            prop_assert!(nb == 0 || nb.is_power_of_two());
        }
    }
}
