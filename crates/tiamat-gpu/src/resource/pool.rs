//! Cycling allocator shared by buffer and texture containers.

use std::sync::Arc;

use anyhow::Result;

/// Initial handle capacity for a fresh container.
const MIN_HANDLES: usize = 1;

/// Ordered collection of physical backings behind one logical resource.
///
/// The pool owns one `Arc` per backing; that clone is the baseline
/// reference. A backing whose strong count is back at the baseline has no
/// outstanding GPU use and is safe to hand out for writing again. Handles
/// held by in-flight command buffers keep the count above baseline until
/// the queue signals completion.
pub(crate) struct CyclePool<B> {
    slots: Vec<Arc<B>>,
    active: usize,
    label: String,
}

impl<B> CyclePool<B> {
    pub fn new(label: &str) -> Self {
        Self {
            slots: Vec::with_capacity(MIN_HANDLES),
            active: 0,
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The currently active backing, if one has been allocated yet.
    pub fn active(&self) -> Option<Arc<B>> {
        self.slots.get(self.active).cloned()
    }

    /// Acquires a backing that is safe to write without data hazards.
    ///
    /// Reuse comes strictly before growth: the slot scan runs first, and a
    /// new backing is allocated only when every existing one still has an
    /// outstanding reference. Allocation failure is local to this call;
    /// existing backings are untouched.
    pub fn acquire_writable(&mut self, alloc: impl FnOnce() -> Result<B>) -> Result<Arc<B>> {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|slot| Arc::strong_count(slot) == 1)
        {
            if idx != self.active {
                log::trace!(
                    "'{}' cycled to backing {} of {}",
                    self.label,
                    idx,
                    self.slots.len()
                );
            }
            self.active = idx;
            return Ok(Arc::clone(&self.slots[idx]));
        }

        // Every backing is still referenced by an in-flight frame. Grow the
        // handle table by doubling so slot pushes stay amortized and handle
        // identity stays stable.
        if self.slots.len() == self.slots.capacity() {
            let doubled = (self.slots.capacity() * 2).max(MIN_HANDLES);
            self.slots.reserve_exact(doubled - self.slots.len());
        }

        let backing = alloc()?;
        self.slots.push(Arc::new(backing));
        self.active = self.slots.len() - 1;
        log::trace!("'{}' grew to {} backings", self.label, self.slots.len());

        Ok(Arc::clone(&self.slots[self.active]))
    }

    /// Iterates the pool's backings.
    pub fn backings(&self) -> impl Iterator<Item = &Arc<B>> {
        self.slots.iter()
    }

    /// Drops the pool's baseline references.
    ///
    /// Backings still referenced by in-flight frames stay alive until those
    /// references drain; the rest are released immediately.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Backing that records its release into a shared log.
    struct TestBacking {
        id: u32,
        released: Arc<Mutex<Vec<u32>>>,
    }

    impl Drop for TestBacking {
        fn drop(&mut self) {
            self.released.lock().unwrap().push(self.id);
        }
    }

    struct Fixture {
        pool: CyclePool<TestBacking>,
        released: Arc<Mutex<Vec<u32>>>,
        next_id: u32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pool: CyclePool::new("test"),
                released: Arc::new(Mutex::new(Vec::new())),
                next_id: 0,
            }
        }

        fn acquire(&mut self) -> Arc<TestBacking> {
            let id = self.next_id;
            self.next_id += 1;
            let released = Arc::clone(&self.released);
            self.pool
                .acquire_writable(move || Ok(TestBacking { id, released }))
                .unwrap()
        }

        fn released(&self) -> Vec<u32> {
            self.released.lock().unwrap().clone()
        }
    }

    // ── reuse before growth ──────────────────────────────────────────────

    #[test]
    fn free_backing_is_reused_not_reallocated() {
        let mut fx = Fixture::new();

        let first = fx.acquire();
        drop(first);

        let second = fx.acquire();
        assert_eq!(fx.pool.slots.len(), 1);
        assert_eq!(second.id, 0);
    }

    #[test]
    fn referenced_backing_forces_cycle() {
        let mut fx = Fixture::new();

        let held = fx.acquire();
        let fresh = fx.acquire();

        assert_eq!(fx.pool.slots.len(), 2);
        assert!(!Arc::ptr_eq(&held, &fresh));
    }

    #[test]
    fn cycle_returns_to_drained_backing() {
        let mut fx = Fixture::new();

        let held = fx.acquire();
        let _also_held = fx.acquire();
        drop(held);

        let reused = fx.acquire();
        assert_eq!(fx.pool.slots.len(), 2);
        assert_eq!(reused.id, 0);
    }

    // ── growth policy ────────────────────────────────────────────────────

    #[test]
    fn capacity_strictly_doubles() {
        let mut fx = Fixture::new();

        let mut held = Vec::new();
        for expected in [1, 2, 4, 4, 8, 8, 8, 8] {
            held.push(fx.acquire());
            assert_eq!(fx.pool.slots.capacity(), expected);
        }
    }

    #[test]
    fn handle_identity_stable_across_growth() {
        let mut fx = Fixture::new();

        let mut held = Vec::new();
        for _ in 0..9 {
            held.push(fx.acquire());
        }

        for (handle, slot) in held.iter().zip(fx.pool.backings()) {
            assert!(Arc::ptr_eq(handle, slot));
        }
    }

    // ── deferred release ─────────────────────────────────────────────────

    #[test]
    fn no_release_while_reference_outstanding() {
        let mut fx = Fixture::new();

        let held = fx.acquire();
        fx.pool.clear();
        assert!(fx.released().is_empty());

        drop(held);
        assert_eq!(fx.released(), [0]);
    }

    #[test]
    fn clear_releases_unreferenced_backings_immediately() {
        let mut fx = Fixture::new();

        let handle = fx.acquire();
        drop(handle);

        fx.pool.clear();
        assert_eq!(fx.released(), [0]);
    }

    // ── allocation failure ───────────────────────────────────────────────

    #[test]
    fn allocation_failure_is_local() {
        let mut fx = Fixture::new();

        let _held = fx.acquire();
        let result = fx
            .pool
            .acquire_writable(|| anyhow::bail!("out of memory"));
        assert!(result.is_err());

        // Pool is still usable afterwards.
        assert_eq!(fx.pool.slots.len(), 1);
        drop(_held);
        let reused = fx.acquire();
        assert_eq!(reused.id, 0);
    }
}
