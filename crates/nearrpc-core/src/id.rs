//! Request identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// First id handed out by a fresh generator.
pub const FIRST_REQUEST_ID: u64 = 123;

/// Monotonically increasing JSON-RPC request ids.
///
/// Clones share the same counter, so a generator can be handed to several
/// clients when ids must be unique across all of them.
#[derive(Debug, Clone)]
pub struct RequestIdGenerator {
    next: Arc<AtomicU64>,
}

impl RequestIdGenerator {
    /// A generator with its own counter, starting at [`FIRST_REQUEST_ID`].
    pub fn new() -> Self {
        Self::starting_at(FIRST_REQUEST_ID)
    }

    /// A generator with its own counter, starting at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first)),
        }
    }

    /// A handle onto the single counter shared by the whole process.
    pub fn process_wide() -> Self {
        static SHARED: OnceLock<RequestIdGenerator> = OnceLock::new();
        SHARED.get_or_init(RequestIdGenerator::new).clone()
    }

    /// Take the next id.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The id the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn starts_at_first_id_and_increments() {
        let ids = RequestIdGenerator::new();
        assert_eq!(ids.next(), FIRST_REQUEST_ID);
        assert_eq!(ids.next(), FIRST_REQUEST_ID + 1);
        assert_eq!(ids.peek(), FIRST_REQUEST_ID + 2);
    }

    #[test]
    fn clones_share_counter() {
        let a = RequestIdGenerator::starting_at(1);
        let b = a.clone();
        assert_eq!(a.next(), 1);
        assert_eq!(b.next(), 2);
        assert_eq!(a.next(), 3);
    }

    #[test]
    fn independent_generators_do_not_interfere() {
        let a = RequestIdGenerator::starting_at(10);
        let b = RequestIdGenerator::starting_at(10);
        a.next();
        assert_eq!(b.next(), 10);
    }

    #[test]
    fn process_wide_handles_share_counter() {
        let a = RequestIdGenerator::process_wide();
        let b = RequestIdGenerator::process_wide();
        let first = a.next();
        assert!(b.next() > first);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ids_are_unique() {
        let ids = RequestIdGenerator::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ids = ids.clone();
            handles.push(tokio::spawn(async move {
                (0..500).map(|_| ids.next()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.await.unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4_000);
    }
}
