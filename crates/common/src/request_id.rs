//! Per-process request id generation.
//!
//! Ids are monotone within a process instance: a random process tag joined
//! with an atomic counter. The tag keeps ids from colliding across restarts
//! without coordinating through shared state.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

pub struct RequestIdGenerator {
    tag: u32,
    counter: AtomicU64,
}

impl RequestIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: rand::rng().random(),
            counter: AtomicU64::new(0),
        }
    }

    /// Mint the next request id.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{:08x}-{n}", self.tag)
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

    #[test]
    fn ids_are_unique_and_monotone() {
        let generator = RequestIdGenerator::new();
        let a = generator.next_id();
        let b = generator.next_id();
        assert_ne!(a, b);

        let na: u64 = a.split('-').next_back().and_then(|s| s.parse().ok()).unwrap_or(0);
        let nb: u64 = b.split('-').next_back().and_then(|s| s.parse().ok()).unwrap_or(1);
        assert!(nb > na);
    }

    #[test]
    fn ids_share_the_process_tag() {
        let generator = RequestIdGenerator::new();
        let a = generator.next_id();
        let b = generator.next_id();
        assert_eq!(a.split('-').next(), b.split('-').next());
    }
}
