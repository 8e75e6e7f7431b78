//! ProbeTable: open-addressed map with double hashing and tombstone deletion.

use crate::error::CapacityError;
use crate::primes::{self, INITIAL_CAPACITY};
use crate::probe::Probe;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use std::{slice, vec};

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    digest: u64,
}

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Empty,
    Occupied(Entry<K, V>),
    // Removed entry; probes continue past it until the next rebuild.
    Tombstone,
}

impl<K, V> Slot<K, V> {
    #[inline]
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}

/// A map stored in one array of slots, resolving collisions by double
/// hashing.
///
/// Each key's digest (a `u64` from the `BuildHasher`) picks a start slot,
/// `digest mod capacity`, and a fixed step, `1 + digest mod (capacity - 2)`.
/// Capacities are primes, so a probe walks every slot once before giving
/// up. Removal leaves a tombstone that keeps later probe chains intact;
/// tombstones are only cleared when the table is rebuilt.
///
/// The table grows to the next prime capacity before an insert would bring
/// the number of live entries to 75% of the slots. When tombstones rather
/// than live entries crowd the table, it is rebuilt in place at the same
/// capacity instead.
///
/// Keys must hash identically for as long as they live in the table. A key
/// whose `Hash` or `Eq` changes after insertion (through interior
/// mutability, say) leaves the table in an unspecified, though memory safe,
/// state.
///
/// ```
/// use probe_table::ProbeTable;
///
/// let mut scores = ProbeTable::new();
/// assert_eq!(scores.insert("ann", 3), None);
/// assert_eq!(scores.insert("ann", 5), Some(3));
/// assert_eq!(scores.get("ann"), Some(&5));
/// assert_eq!(scores.remove("ann"), Some(5));
/// assert!(scores.is_empty());
/// ```
#[derive(Clone)]
pub struct ProbeTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    slots: Vec<Slot<K, V>>,
    count: usize,
    tombstones: usize,
}

impl<K, V> ProbeTable<K, V> {
    /// Creates an empty table with 11 slots.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty table able to hold `entries` without growing.
    ///
    /// # Panics
    ///
    /// Panics if no prime capacity large enough fits in `usize`.
    pub fn with_capacity(entries: usize) -> Self {
        Self::with_capacity_and_hasher(entries, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ProbeTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            slots: empty_slots(INITIAL_CAPACITY),
            count: 0,
            tombstones: 0,
        }
    }

    /// # Panics
    ///
    /// Panics if no prime capacity large enough fits in `usize`.
    pub fn with_capacity_and_hasher(entries: usize, hasher: S) -> Self {
        let capacity = primes::capacity_for(entries).unwrap_or_else(|e| panic!("{e}"));
        Self {
            hasher,
            slots: empty_slots(capacity),
            count: 0,
            tombstones: 0,
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots, always a prime.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live entries over slots. Tombstones are not counted.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Empties every slot and drops all entries. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.slots.fill_with(|| Slot::Empty);
        self.count = 0;
        self.tombstones = 0;
    }

    /// Iterates over entries in slot order, which is unrelated to
    /// insertion order and changes whenever the table is rebuilt.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.count,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.count,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Snapshot of all entries in slot order.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    /// Returns `true` if any live entry holds `value`. Scans every slot.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// (empty, occupied, tombstone) slot counts, recomputed from the array.
    #[cfg(test)]
    pub(crate) fn slot_census(&self) -> (usize, usize, usize) {
        self.slots
            .iter()
            .fold((0, 0, 0), |(e, o, t), slot| match slot {
                Slot::Empty => (e + 1, o, t),
                Slot::Occupied(_) => (e, o + 1, t),
                Slot::Tombstone => (e, o, t + 1),
            })
    }
}

impl<K, V, S> ProbeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    // Slot holding `q`, probing past tombstones and stopping at the first
    // empty slot.
    fn find_index<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let digest = self.make_hash(q);
        for i in Probe::start(digest, self.capacity()) {
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(e) => {
                    if e.digest == digest && e.key.borrow() == q {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    /// Inserts `key`, returning the value it replaced.
    ///
    /// An existing entry keeps its original key and slot; only the value is
    /// swapped.
    ///
    /// # Panics
    ///
    /// Panics if the table needs to grow and no larger prime capacity fits
    /// in `usize`. See [`try_insert`](Self::try_insert).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(previous) => previous,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`insert`](Self::insert), but reports a failed growth instead of
    /// panicking. On error the table is left untouched.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, CapacityError> {
        self.reserve_one()?;

        let digest = self.make_hash(&key);
        let mut vacant = None;
        for i in Probe::start(digest, self.capacity()) {
            match &mut self.slots[i] {
                Slot::Empty => {
                    vacant = Some(i);
                    break;
                }
                Slot::Tombstone => {}
                Slot::Occupied(e) => {
                    if e.digest == digest && e.key == key {
                        return Ok(Some(mem::replace(&mut e.value, value)));
                    }
                }
            }
        }

        let Some(i) = vacant else {
            unreachable!("probe found no empty slot below the load bound");
        };
        self.slots[i] = Slot::Occupied(Entry { key, value, digest });
        self.count += 1;
        Ok(None)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find_index(q)?;
        match &self.slots[i] {
            Slot::Occupied(e) => Some((&e.key, &e.value)),
            _ => None,
        }
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find_index(q)?;
        match &mut self.slots[i] {
            Slot::Occupied(e) => Some(&mut e.value),
            _ => None,
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_index(q).is_some()
    }

    /// Removes `q`, leaving a tombstone in its slot.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find_index(q)?;
        match mem::replace(&mut self.slots[i], Slot::Tombstone) {
            Slot::Occupied(e) => {
                self.count -= 1;
                self.tombstones += 1;
                Some((e.key, e.value))
            }
            other => {
                self.slots[i] = other;
                None
            }
        }
    }

    // Makes room for one more entry before probing. Live entries alone
    // reaching the bound grow the table; tombstones pushing it over rebuild
    // it at the same capacity.
    fn reserve_one(&mut self) -> Result<(), CapacityError> {
        let capacity = self.capacity();
        if primes::at_load_limit(self.count + 1, capacity) {
            return self.grow();
        }
        if primes::at_load_limit(self.count + self.tombstones + 1, capacity) {
            self.compact();
        }
        Ok(())
    }

    fn grow(&mut self) -> Result<(), CapacityError> {
        let old = self.capacity();
        let new = primes::next_capacity(old)?;
        self.rebuild(new);
        log::debug!(
            "probe table grew from {} to {} slots ({} entries moved)",
            old,
            new,
            self.count
        );
        Ok(())
    }

    fn compact(&mut self) {
        let dropped = self.tombstones;
        self.rebuild(self.capacity());
        log::debug!(
            "probe table compacted {} tombstones at {} slots",
            dropped,
            self.capacity()
        );
    }

    // Moves every live entry into a fresh all-empty array of `capacity`
    // slots. Uses stored digests, so `K: Hash` is not called again.
    fn rebuild(&mut self, capacity: usize) {
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.count = 0;
        self.tombstones = 0;
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                self.place(entry);
            }
        }
    }

    // Keys in a rebuild are already unique, so only an empty slot is sought.
    fn place(&mut self, entry: Entry<K, V>) {
        let found = Probe::start(entry.digest, self.capacity()).find(|&i| self.slots[i].is_empty());
        let Some(i) = found else {
            unreachable!("rebuild target has no empty slot");
        };
        self.slots[i] = Slot::Occupied(entry);
        self.count += 1;
    }
}

impl<K, V> Default for ProbeTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for ProbeTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        table.extend(iter);
        table
    }
}

impl<K, V, S> Extend<(K, V)> for ProbeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Iterator over shared entries in slot order.
pub struct Iter<'a, K, V> {
    slots: slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over mutable values in slot order.
pub struct IterMut<'a, K, V> {
    slots: slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator, consuming the table.
pub struct IntoIter<K, V> {
    slots: vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbeTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ProbeTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ProbeTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.count,
            slots: self.slots.into_iter(),
        }
    }
}
