#![cfg(test)]

// Property tests for ProbeTable kept inside the crate so they can inspect
// slot-level state (tombstones, occupied slot counts).

use crate::primes::{is_prime, PRIMES};
use crate::probe_table::ProbeTable;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    ContainsValue(i32),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario(pool_max: usize) -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=pool_max).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (-4i32..4).prop_map(OpI::ContainsValue),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs `ops` against the table and a `HashMap` model, checking after every
// step:
// - `len`/`is_empty` parity with the model.
// - Occupied slot count equals `len`; tombstone count matches the array.
// - Live entries stay below 75% of a prime capacity.
// - Iteration yields exactly the model's entries.
fn run_state_machine<S>(
    mut sut: ProbeTable<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                prop_assert!(
                    sut.len() * 4 < sut.capacity() * 3,
                    "load bound broken: {} / {}",
                    sut.len(),
                    sut.capacity()
                );
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k.as_str()), model.remove(k));
                prop_assert!(!sut.contains_key(k.as_str()));
                prop_assert!(sut.get(k.as_str()).is_none());
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::ContainsValue(v) => {
                let has_model = model.values().any(|mv| *mv == v);
                prop_assert_eq!(sut.contains_value(&v), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k.as_str()), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs for {:?}", k),
                }
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
                prop_assert_eq!(sut.slot_census(), (cap, 0, 0));
            }
            OpI::Iterate => {
                let s_entries: BTreeMap<_, _> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_entries: BTreeMap<_, _> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_entries, m_entries);
                prop_assert_eq!(sut.entries().len(), model.len());
            }
        }

        let (empty, occupied, tombstones) = sut.slot_census();
        prop_assert_eq!(occupied, sut.len());
        prop_assert_eq!(tombstones, sut.tombstones());
        prop_assert!(empty > 0);
        prop_assert!(is_prime(sut.capacity()));
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    let keys: BTreeSet<_> = sut.keys().cloned().collect();
    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
    prop_assert_eq!(keys, m_keys);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap with
// the default hasher.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(40)) {
        run_state_machine(ProbeTable::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants when every key shares one probe chain, so
// tombstones and compaction sit on the only path every lookup takes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(12)) {
        run_state_machine(ProbeTable::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: growing from any prime in the table keeps every entry and lands
// on the next prime.
proptest! {
    #[test]
    fn prop_growth_preserves_entries(n in 0usize..2_000, removed in proptest::collection::btree_set(0usize..2_000, 0..200)) {
        let mut t: ProbeTable<usize, usize> = ProbeTable::new();
        let mut caps = vec![t.capacity()];
        for k in 0..n {
            t.insert(k, k * 3);
            if caps.last() != Some(&t.capacity()) {
                caps.push(t.capacity());
            }
        }
        prop_assert_eq!(&caps[..], &PRIMES[..caps.len()]);
        for k in &removed {
            prop_assert_eq!(t.remove(k), (*k < n).then_some(k * 3));
        }
        for k in 0..n {
            let expected = (!removed.contains(&k)).then_some(k * 3);
            prop_assert_eq!(t.get(&k).copied(), expected);
        }
    }
}
