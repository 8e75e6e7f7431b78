// ProbeTable property tests through the public API.
//
// Property 1: round-trip and size.
//  - Model: BTreeMap of the last value written per key.
//  - Invariant: get(k) == model[k] for every key ever touched;
//               len() == model.len().
//  - Operations: insert, remove, over a small key space so overwrites and
//    re-inserts after removal are common.
//
// Property 2: growth from unique inserts.
//  - Invariant: after each insert, len()/capacity() < 0.75 and every
//    earlier key is still readable.
use probe_table::ProbeTable;
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn prop_round_trip_and_size(ops in proptest::collection::vec((any::<bool>(), 0u16..64, any::<i64>()), 1..400)) {
        let mut t: ProbeTable<u16, i64> = ProbeTable::new();
        let mut model: BTreeMap<u16, i64> = BTreeMap::new();

        for (is_insert, k, v) in ops {
            if is_insert {
                prop_assert_eq!(t.insert(k, v), model.insert(k, v));
            } else {
                prop_assert_eq!(t.remove(&k), model.remove(&k));
                // Removed keys read back as absent until re-inserted.
                prop_assert!(!t.contains_key(&k));
            }
            prop_assert_eq!(t.len(), model.len());
        }

        for k in 0u16..64 {
            prop_assert_eq!(t.get(&k), model.get(&k));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_unique_inserts_survive_growth(keys in proptest::collection::btree_set(any::<u64>(), 1..600)) {
        let mut t = ProbeTable::new();
        let mut inserted = Vec::with_capacity(keys.len());
        for k in keys {
            prop_assert_eq!(t.insert(k, k.wrapping_mul(31)), None);
            inserted.push(k);
            prop_assert!(t.len() * 4 < t.capacity() * 3);
        }
        for k in &inserted {
            prop_assert_eq!(t.get(k), Some(&k.wrapping_mul(31)));
        }
        prop_assert_eq!(t.len(), inserted.len());
    }
}
