#![cfg(test)]

// Property tests for NameMap kept inside the crate so they can reach the
// internal module.

use crate::name_map::{names_eq, InsertError, NameMap, Named, RenameError, Slot};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
struct Item {
    name: String,
    value: i32,
}

impl Named for Item {
    fn name(&self) -> &str {
        &self.name
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// names, the pool shrinks, and op lists shrink in length. Pool names mix
// case so case-folded collisions are common.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Find(usize),
    Rename(usize, usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-cA-C]{1,3}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Find),
            (idx.clone(), idx.clone()).prop_map(|(i, j)| OpI::Rename(i, j)),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

// Property: state-machine equivalence against a HashMap keyed by the
// case-folded name.
// - Duplicate names are rejected and hand the value back; on success a
//   stable slot is returned.
// - Rename succeeds iff the target name is free or belongs to the same
//   entry; the slot survives, the old name stops resolving.
// - `remove(slot)` returns the model's value and invalidates the slot.
// - `iter` yields each live entry exactly once.
// - Stale slots never resolve; `len` matches the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: NameMap<Item> = NameMap::new();
        let mut model: HashMap<String, (Slot, Item)> = HashMap::new();
        let mut stale: Vec<Slot> = Vec::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let name = pool[i].clone();
                    let already = model.get(&fold(&name)).map(|(s, _)| *s);
                    let it = Item { name: name.clone(), value: v };
                    match sut.insert(it.clone()) {
                        Ok(slot) => {
                            prop_assert!(already.is_none(), "insert must fail on duplicate");
                            model.insert(fold(&name), (slot, it));
                        }
                        Err(InsertError::DuplicateName { existing, value }) => {
                            prop_assert_eq!(Some(existing), already);
                            prop_assert_eq!(value, it);
                        }
                    }
                }
                OpI::Remove(i) => {
                    if let Some((slot, it)) = model.remove(&fold(&pool[i])) {
                        prop_assert_eq!(sut.remove(slot), Some(it));
                        stale.push(slot);
                    } else {
                        prop_assert!(sut.find(&pool[i]).is_none());
                    }
                }
                OpI::Find(i) => {
                    let expect = model.get(&fold(&pool[i])).map(|(s, _)| *s);
                    prop_assert_eq!(sut.find(&pool[i]), expect);
                    prop_assert_eq!(sut.contains(&pool[i]), expect.is_some());
                }
                OpI::Rename(i, j) => {
                    let from = fold(&pool[i]);
                    let to_name = pool[j].clone();
                    let Some((slot, _)) = model.get(&from).cloned() else { continue };
                    let target = model.get(&fold(&to_name)).map(|(s, _)| *s);
                    let res = sut.rename(slot, &to_name, |v| v.name = to_name.clone());
                    match target {
                        Some(other) if other != slot => {
                            prop_assert_eq!(res, Err(RenameError::DuplicateName { existing: other }));
                            prop_assert!(names_eq(&sut.get(slot).unwrap().name, &pool[i]));
                        }
                        _ => {
                            prop_assert_eq!(res, Ok(()));
                            let (s, mut it) = model.remove(&from).unwrap();
                            it.name = to_name.clone();
                            model.insert(fold(&to_name), (s, it));
                            prop_assert_eq!(sut.find(&to_name), Some(slot));
                        }
                    }
                }
                OpI::Mutate(i, d) => {
                    if let Some((slot, it)) = model.get_mut(&fold(&pool[i])) {
                        it.value = it.value.wrapping_add(d);
                        let v = sut.get_mut(*slot).expect("live slot");
                        v.value = v.value.wrapping_add(d);
                    }
                }
                OpI::Iterate => {
                    let mut seen: Vec<Slot> = Vec::new();
                    for (slot, v) in sut.iter() {
                        let m = model.get(&fold(&v.name));
                        prop_assert_eq!(m.map(|(s, it)| (*s, it)), Some((slot, v)));
                        seen.push(slot);
                    }
                    prop_assert_eq!(seen.len(), model.len());
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            for s in &stale {
                prop_assert!(sut.get(*s).is_none(), "stale slot must not resolve");
            }
        }
    }
}
