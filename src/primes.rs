//! Prime capacity sequence.
//!
//! Capacities come from a fixed ascending table of primes, each roughly
//! double the previous one. Past the last entry the sequence continues
//! with the first prime above twice the current capacity, so growth only
//! stops when that arithmetic overflows `usize`.

use crate::error::CapacityError;

/// Ascending prime capacities; `PRIMES[0]` is the initial capacity.
pub(crate) const PRIMES: [usize; 27] = [
    11, 23, 47, 97, 197, 397, 797, 1597, 3203, 6421, 12853, 25717, 51437, 102877, 205759, 411527,
    823117, 1646237, 3292489, 6584983, 13169977, 26339969, 52679969, 105359939, 210719881,
    421439783, 842879579,
];

pub(crate) const INITIAL_CAPACITY: usize = PRIMES[0];

// Load factor bound, as a fraction to stay in integer arithmetic.
pub(crate) const MAX_LOAD_NUM: usize = 3;
pub(crate) const MAX_LOAD_DEN: usize = 4;

/// True when `occupied` slots out of `capacity` reach the 0.75 bound.
#[inline]
pub(crate) fn at_load_limit(occupied: usize, capacity: usize) -> bool {
    occupied.saturating_mul(MAX_LOAD_DEN) >= capacity.saturating_mul(MAX_LOAD_NUM)
}

/// Smallest prime capacity strictly greater than `current`.
pub(crate) fn next_capacity(current: usize) -> Result<usize, CapacityError> {
    if let Some(&p) = PRIMES.iter().find(|&&p| p > current) {
        return Ok(p);
    }

    let exhausted = CapacityError::Exhausted { current };
    let mut candidate = current
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .ok_or(exhausted)?;
    log::trace!(
        "prime table exhausted at {} slots, searching from {}",
        current,
        candidate
    );
    while !is_prime(candidate) {
        candidate = candidate.checked_add(2).ok_or(exhausted)?;
    }
    Ok(candidate)
}

/// Smallest capacity in the sequence that holds `entries` without growing.
pub(crate) fn capacity_for(entries: usize) -> Result<usize, CapacityError> {
    let mut capacity = INITIAL_CAPACITY;
    while at_load_limit(entries, capacity) {
        capacity = next_capacity(capacity)?;
    }
    Ok(capacity)
}

/// Trial division over 6k ± 1.
pub(crate) fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut d = 5usize;
    while d.checked_mul(d).is_some_and(|sq| sq <= n) {
        if n % d == 0 || n % (d + 2) == 0 {
            return false;
        }
        d += 6;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ascending_primes() {
        assert!(PRIMES.iter().all(|&p| is_prime(p)));
        assert!(PRIMES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(INITIAL_CAPACITY, 11);
    }

    #[test]
    fn is_prime_small_values() {
        let primes: Vec<usize> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
        assert!(!is_prime(25));
        assert!(!is_prime(49));
    }

    #[test]
    fn next_capacity_walks_the_table() {
        assert_eq!(next_capacity(11), Ok(23));
        assert_eq!(next_capacity(23), Ok(47));
        // Capacities off the table snap to the next entry.
        assert_eq!(next_capacity(12), Ok(23));
        assert_eq!(next_capacity(0), Ok(11));
    }

    #[test]
    fn next_capacity_extends_past_the_table() {
        let last = PRIMES[PRIMES.len() - 1];
        let next = next_capacity(last).unwrap();
        assert!(next > last * 2);
        assert!(is_prime(next));
    }

    #[test]
    fn next_capacity_reports_overflow() {
        let huge = usize::MAX / 2 + 1;
        assert_eq!(
            next_capacity(huge),
            Err(CapacityError::Exhausted { current: huge })
        );
    }

    #[test]
    fn capacity_for_respects_load_bound() {
        assert_eq!(capacity_for(0), Ok(11));
        assert_eq!(capacity_for(8), Ok(11));
        assert_eq!(capacity_for(9), Ok(23));
        assert_eq!(capacity_for(1000), Ok(1597));
        for n in [1usize, 17, 70, 500, 20_000] {
            let c = capacity_for(n).unwrap();
            assert!(!at_load_limit(n, c));
        }
    }

    #[test]
    fn load_limit_boundary() {
        // 9 / 11 is past 0.75, 8 / 11 is not.
        assert!(at_load_limit(9, 11));
        assert!(!at_load_limit(8, 11));
        assert!(at_load_limit(3, 4));
    }
}
