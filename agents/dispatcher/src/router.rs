use std::sync::atomic::{AtomicUsize, Ordering};

use overlay_core::{DispatchError, DispatchResult};

/// Coarsely fair round-robin assignment of submissions to account slots.
///
/// Precise atomicity is not required; a lost increment under contention
/// costs nothing but a slightly uneven rotation.
#[derive(Debug)]
pub struct RoundRobinRouter {
    accounts: usize,
    counter: AtomicUsize,
}

impl RoundRobinRouter {
    /// Create a router over `accounts` slots.
    pub fn new(accounts: usize) -> Self {
        Self {
            accounts,
            counter: AtomicUsize::new(0),
        }
    }

    /// Pick the slot for the next submission. A forced index bypasses the
    /// rotation but still advances the counter.
    pub fn route(&self, forced: Option<usize>) -> DispatchResult<usize> {
        let next = self.counter.fetch_add(1, Ordering::Relaxed);
        match forced {
            Some(index) if index < self.accounts => Ok(index),
            Some(index) => Err(DispatchError::UnknownAccount(index)),
            None => Ok(next % self.accounts),
        }
    }

    /// Current rotation position.
    pub fn position(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rotates_across_all_slots() {
        let router = RoundRobinRouter::new(3);
        let picks: Vec<_> = (0..6).map(|_| router.route(None).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn forced_index_bypasses_rotation_but_advances_the_counter() {
        let router = RoundRobinRouter::new(4);
        for _ in 0..7 {
            router.route(None).unwrap();
        }
        assert_eq!(router.position(), 7);

        assert_eq!(router.route(Some(0)).unwrap(), 0);
        assert_eq!(router.position(), 8);
        // the rotation continues from where the forced call left it
        assert_eq!(router.route(None).unwrap(), 0);
    }

    #[test]
    fn out_of_range_forced_index_is_rejected() {
        let router = RoundRobinRouter::new(2);
        assert_eq!(
            router.route(Some(2)),
            Err(DispatchError::UnknownAccount(2))
        );
    }
}
