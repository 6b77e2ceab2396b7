//! Team-shared memory analogues
//!
//! GPU kernels mutate storage buffers and `shared` scratch from many
//! invocations at once, relying on two rules: writes within a phase target
//! disjoint elements (either by static partitioning or by slots reserved
//! through an atomic counter), and a barrier separates phases that hand
//! data between workers. The types here encode exactly that model on the
//! host.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bytemuck::Zeroable;

/// Host-side analogue of a GPU storage buffer.
///
/// Reads are plain loads and always safe to call; soundness of concurrent
/// access rests entirely on the writers, which is why [`write`] is
/// `unsafe`. Ordering between phases comes from the team barrier, not from
/// the buffer itself.
///
/// [`write`]: SharedBuffer::write
pub struct SharedBuffer<T> {
    cells: Box<[UnsafeCell<T>]>,
}

// SAFETY: concurrent access is governed by the write-once-per-element-
// per-phase discipline documented on `write`; the type itself adds no
// shared mutable state beyond the cells.
unsafe impl<T: Send> Sync for SharedBuffer<T> {}

impl<T: Copy> SharedBuffer<T> {
    /// Create a buffer of `len` elements, all set to `fill`
    pub fn new(len: usize, fill: T) -> Self {
        Self {
            cells: (0..len).map(|_| UnsafeCell::new(fill)).collect(),
        }
    }

    /// Create a zero-initialized buffer
    pub fn zeroed(len: usize) -> Self
    where
        T: Zeroable,
    {
        Self::new(len, T::zeroed())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read one element
    pub fn read(&self, index: usize) -> T {
        // SAFETY: writers promise (see `write`) that no write to this
        // element is concurrent with any read of it.
        unsafe { *self.cells[index].get() }
    }

    /// Write one element.
    ///
    /// # Safety
    ///
    /// Within a dispatch phase (the region between two team barriers) the
    /// caller must be the only worker writing `index`, and no worker may
    /// read `index` during that phase. Slots reserved through
    /// [`SharedCounter::next`] and statically partitioned strided ranges
    /// both satisfy this.
    pub unsafe fn write(&self, index: usize, value: T) {
        *self.cells[index].get() = value;
    }

    /// Copy the buffer contents out. Host-side readback, only meaningful
    /// after a dispatch has completed.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len()).map(|index| self.read(index)).collect()
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// Per-candidate visibility flags, one owner per slot within a phase.
///
/// Relaxed ordering is sufficient: every phase transition goes through the
/// team barrier, which makes all prior writes visible.
pub struct SharedFlags {
    flags: Box<[AtomicBool]>,
}

impl SharedFlags {
    pub fn new(capacity: usize) -> Self {
        Self {
            flags: (0..capacity).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.flags.len()
    }

    pub fn clear(&self, index: usize) {
        self.flags[index].store(false, Ordering::Relaxed);
    }

    pub fn mark(&self, index: usize) {
        self.flags[index].store(true, Ordering::Relaxed);
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.flags[index].load(Ordering::Relaxed)
    }
}

/// The single fetch-and-increment slot counter used during compaction
#[derive(Default)]
pub struct SharedCounter {
    value: AtomicU32,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to zero. Must be followed by a barrier before any worker
    /// calls [`next`](SharedCounter::next).
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    /// Atomically reserve the next slot
    pub fn next(&self) -> u32 {
        self.value.fetch_add(1, Ordering::Relaxed)
    }

    /// Current value, including reservations past any cap
    pub fn load(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }
}
