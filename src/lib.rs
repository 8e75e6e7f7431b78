//! probe-table: a single-array hash map using double hashing, tombstone
//! deletion and prime capacities.
//!
//! Internal Design:
//!
//! Summary
//! - One structure, `ProbeTable<K, V, S>`, owns a `Vec` of slots. Each slot
//!   is `Empty`, `Occupied` (key, value, digest) or `Tombstone`.
//! - Layers:
//!   - `primes`: the ascending prime capacity sequence and the 0.75 load
//!     bound.
//!   - `probe`: the double-hashing probe sequence over one capacity.
//!   - `probe_table`: the map itself, plus its iterators.
//!
//! Probing
//! - Start at `digest mod capacity`, advance by
//!   `1 + digest mod (capacity - 2)`. Both come from the digest computed
//!   once per operation.
//! - Capacities are prime and the step lies in `[1, capacity - 2]`, so a
//!   probe is a permutation of all slots and is bounded by `capacity` steps.
//! - Lookups and removals walk past tombstones and stop at the first empty
//!   slot. Inserts never reuse a tombstone; they fill the first empty slot.
//!
//! Growth
//! - Before probing, an insert checks whether counting the incoming entry
//!   would put live entries at 75% of the slots. If so the table moves to
//!   the next prime capacity and every live entry is placed again.
//! - If live entries are fine but live entries plus tombstones would reach
//!   the bound, the table is rebuilt at the same capacity. This keeps at
//!   least a quarter of the slots empty so every probe terminates early.
//! - Past the last prime in the table, the next capacity is the first prime
//!   above twice the current one. Growth fails with
//!   `CapacityError::Exhausted` only when that overflows `usize`.
//!
//! Hasher and rebuild invariants
//! - Each occupied slot stores its `u64` digest; rebuilds use the stored
//!   digest, so `K: Hash` is never invoked after insertion.
//! - A stored digest is also compared before `K: Eq`, which skips most
//!   equality calls on collisions.
//!
//! Notes and non-goals
//! - Single-threaded: every mutation takes `&mut self`; callers sharing a
//!   table wrap it in their own lock.
//! - Iteration order is slot order and carries no meaning.
//! - No persistence, no incremental rehash.

mod error;
mod primes;
mod probe;
pub mod probe_table;
mod probe_table_proptest;

// Public surface
pub use error::CapacityError;
pub use probe_table::ProbeTable;
