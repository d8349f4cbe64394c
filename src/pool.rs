//! Size-bucketed free lists of numeric buffers.
//!
//! Evaluating a single element operator creates many small matrices (one `N`, `B`, `D` and `J`
//! per quadrature point, plus products). A [`BufferPool`] keeps released buffers around, keyed by
//! their exact length, so that the next request of the same length is served without touching
//! the allocator.
//!
//! A pool is a plain value with no interior synchronization. Use one pool per thread, either by
//! threading it through the computation explicitly or via [`with_thread_local_pool`].

use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use log::trace;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a pool, used to check that buffers are returned to the pool that rented them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        PoolId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Tuning parameters of a [`BufferPool`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of released buffers retained per buffer length.
    pub max_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_depth: 20 }
    }
}

/// Counters describing how a pool has been used.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of non-empty buffers handed out.
    pub rents: usize,
    /// Rents that had to allocate new backing storage.
    pub fresh_allocations: usize,
    /// Rents served from a previously released buffer.
    pub recycled: usize,
    /// Released buffers that were kept for reuse.
    pub returned: usize,
    /// Released buffers dropped because their free list was full.
    pub discarded: usize,
}

/// Size-bucketed free lists of `Vec<T>` buffers.
///
/// Buffers are keyed by their exact length. Released buffers are kept up to the configured
/// depth per length and handed out again, zeroed, by later rents of the same length.
#[derive(Debug)]
pub struct BufferPool<T> {
    id: PoolId,
    config: PoolConfig,
    free_lists: FxHashMap<usize, Vec<Vec<T>>>,
    stats: PoolStats,
}

/// The pool used for dense matrix storage.
pub type MatrixPool = BufferPool<f64>;

impl<T> Default for BufferPool<T> {
    fn default() -> Self {
        Self::with_config(PoolConfig::default())
    }
}

impl<T> BufferPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            id: PoolId::next(),
            config,
            free_lists: FxHashMap::default(),
            stats: PoolStats::default(),
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Number of released buffers of the given length currently held.
    pub fn available(&self, len: usize) -> usize {
        self.free_lists.get(&len).map_or(0, Vec::len)
    }

    /// Drops every retained buffer. Statistics are kept.
    pub fn clear(&mut self) {
        self.free_lists.clear();
    }
}

impl<T: Copy + Default> BufferPool<T> {
    /// Rents a buffer of exactly `len` elements.
    ///
    /// Every buffer handed out is filled with `T::default()`: fresh buffers are created that
    /// way and released buffers are cleared by [`free`](Self::free). A request for zero elements
    /// returns an empty, unallocated vector and is not counted as a rent.
    pub fn allocate(&mut self, len: usize) -> Vec<T> {
        if len == 0 {
            return Vec::new();
        }

        self.stats.rents += 1;
        match self.free_lists.get_mut(&len).and_then(Vec::pop) {
            Some(buffer) => {
                self.stats.recycled += 1;
                buffer
            }
            None => {
                self.stats.fresh_allocations += 1;
                vec![T::default(); len]
            }
        }
    }

    /// Releases a buffer back to the pool.
    ///
    /// The buffer is cleared and retained for reuse unless the free list for its length already
    /// holds `max_depth` buffers, in which case it is dropped. Empty buffers are ignored.
    pub fn free(&mut self, mut buffer: Vec<T>) {
        let len = buffer.len();
        if len == 0 {
            return;
        }

        let max_depth = self.config.max_depth;
        let free_list = self.free_lists.entry(len).or_default();
        if free_list.len() < max_depth {
            buffer.fill(T::default());
            free_list.push(buffer);
            self.stats.returned += 1;
        } else {
            trace!("Discarding released buffer of length {len}: free list is full ({max_depth})");
            self.stats.discarded += 1;
        }
    }
}

define_thread_local_workspace!(POOL_WORKSPACE);

/// Runs `f` with the calling thread's matrix pool.
///
/// Each thread owns a separate pool, created on first use with the default configuration.
/// Matrices rented inside `f` must be returned (or detached) before `f` completes if they are
/// to outlive it on another thread.
///
/// # Panics
///
/// The pool is mutably borrowed for the duration of `f`. Calling `with_thread_local_pool` again
/// from inside `f` on the same thread panics.
pub fn with_thread_local_pool<F, R>(f: F) -> R
where
    F: FnOnce(&mut MatrixPool) -> R,
{
    with_thread_local_workspace(&POOL_WORKSPACE, f)
}
