//! Errors surfaced by fallible table operations.

use thiserror::Error;

/// Returned when the table cannot grow any further.
///
/// Lookups and removals never fail; only growth can, and only once the
/// next capacity would overflow `usize`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    #[error("probe table capacity exhausted: cannot grow beyond {current} slots")]
    Exhausted { current: usize },
}

#[cfg(test)]
mod tests {
    use super::CapacityError;

    #[test]
    fn exhausted_message_names_capacity() {
        let e = CapacityError::Exhausted { current: 97 };
        assert_eq!(
            e.to_string(),
            "probe table capacity exhausted: cannot grow beyond 97 slots"
        );
    }
}
