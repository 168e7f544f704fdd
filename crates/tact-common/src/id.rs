//! Process-wide AST node id allocation.
//!
//! Every synthesized node receives an id from a single monotonically
//! increasing counter. Ids are never reused, so two nodes built anywhere in
//! the same process never share one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique index of an AST node.
pub type AstId = u64;

/// First id handed out by [`next_id`].
pub const FIRST_ID: AstId = 1;

static NEXT_ID: AtomicU64 = AtomicU64::new(FIRST_ID);

/// Allocate the next AST node id.
pub fn next_id() -> AstId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase() {
        let a = next_id();
        let b = next_id();
        let c = next_id();
        assert!(a >= FIRST_ID);
        assert!(a < b && b < c);
    }

    #[test]
    fn ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..100).map(|_| next_id()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<AstId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
