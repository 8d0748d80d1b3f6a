//! Reference-counted data blocks for the numrt runtime.
//!
//! Every matrix backing store lives inside a block. A block couples the
//! stored value with a [`BlockHeader`] carrying:
//!
//! - **An atomic reference count** - one reference per façade pointing at
//!   the block
//! - **A per-block lock** - held for the short critical sections in which a
//!   façade inspects the reference count and performs copy-on-write
//!
//! # Ownership
//!
//! [`Shared<T>`] is the owning handle. Cloning a handle adds a reference,
//! dropping one removes it, and the block is freed when the last handle goes
//! away.
//!
//! ```
//! use numrt_rts_block::Shared;
//!
//! let a = Shared::new(vec![1.0f64, 2.0, 3.0]);
//! let mut b = a.clone();
//! assert_eq!(a.reference_count(), 2);
//!
//! // `b` is shared, so mutation clones it first.
//! b.make_unique()[0] = 10.0;
//! assert_eq!(a[0], 1.0);
//! assert_eq!(b[0], 10.0);
//! assert_eq!(a.reference_count(), 1);
//! ```
//!
//! # Locking
//!
//! [`BlockHeader::lock`] returns a [`BlockGuard`] which releases the lock
//! when dropped, so the lock is released on every exit path including early
//! returns and panics. Guards are neither `Send` nor `Sync`: a block locked
//! by a thread can only be unlocked by that thread.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicUsize, Ordering};

/// Reference counts above this value abort the process, mirroring the
/// overflow guard of `std::sync::Arc`.
const MAX_REFERENCES: usize = isize::MAX as usize;

// ============================================================================
// Block Header
// ============================================================================

/// Shared bookkeeping at the front of every data block.
pub struct BlockHeader {
    /// Number of live handles pointing at the block.
    references: AtomicUsize,
    /// Short critical-section lock used during copy-on-write.
    lock: RawMutex,
}

impl BlockHeader {
    /// Create a header for a freshly allocated block (one reference).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            references: AtomicUsize::new(1),
            lock: RawMutex::INIT,
        }
    }

    /// Register one more owner of the block.
    #[inline]
    pub fn add_reference(&self) {
        let previous = self.references.fetch_add(1, Ordering::Relaxed);
        if previous > MAX_REFERENCES {
            std::process::abort();
        }
    }

    /// Drop one owner of the block.
    ///
    /// Returns `true` when the caller released the last reference and must
    /// destroy the block.
    #[inline]
    #[must_use]
    pub fn remove_reference(&self) -> bool {
        if self.references.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    /// Current number of owners.
    #[inline]
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.references.load(Ordering::Acquire)
    }

    /// Acquire the block lock, blocking until it is available.
    pub fn lock(&self) -> BlockGuard<'_> {
        self.lock.lock();
        BlockGuard {
            header: self,
            _not_send: PhantomData,
        }
    }

    /// Acquire the block lock if nobody else holds it.
    pub fn try_lock(&self) -> Option<BlockGuard<'_>> {
        if self.lock.try_lock() {
            Some(BlockGuard {
                header: self,
                _not_send: PhantomData,
            })
        } else {
            None
        }
    }

    /// Whether some thread currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHeader")
            .field("references", &self.reference_count())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// RAII guard for a locked [`BlockHeader`].
///
/// The lock is released when the guard is dropped.
#[must_use = "the block is unlocked as soon as the guard is dropped"]
pub struct BlockGuard<'a> {
    header: &'a BlockHeader,
    // Raw pointers are !Send + !Sync; unlocking must happen on the locking thread.
    _not_send: PhantomData<*const ()>,
}

impl BlockGuard<'_> {
    /// Reference count observed while holding the lock.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.header.reference_count()
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        // Safety: the guard is only created after a successful lock and is
        // confined to the locking thread.
        unsafe { self.header.lock.unlock() };
    }
}

impl fmt::Debug for BlockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGuard")
            .field("references", &self.reference_count())
            .finish()
    }
}

// ============================================================================
// Shared Handle
// ============================================================================

struct BlockInner<T> {
    header: BlockHeader,
    value: T,
}

/// Owning handle to a reference-counted data block.
pub struct Shared<T> {
    ptr: NonNull<BlockInner<T>>,
    _owns: PhantomData<BlockInner<T>>,
}

// Safety: the handle only hands out `&T` across threads and the count is
// atomic, so the bounds match `Arc<T>`.
unsafe impl<T: Send + Sync> Send for Shared<T> {}
unsafe impl<T: Send + Sync> Sync for Shared<T> {}

impl<T> Shared<T> {
    /// Allocate a new block holding `value` with a reference count of one.
    pub fn new(value: T) -> Self {
        let inner = Box::new(BlockInner {
            header: BlockHeader::new(),
            value,
        });
        Self {
            ptr: NonNull::from(Box::leak(inner)),
            _owns: PhantomData,
        }
    }

    #[inline]
    fn inner(&self) -> &BlockInner<T> {
        // Safety: the block stays allocated while any handle exists.
        unsafe { self.ptr.as_ref() }
    }

    /// The block's header.
    #[inline]
    #[must_use]
    pub fn header(&self) -> &BlockHeader {
        &self.inner().header
    }

    /// Number of handles currently pointing at the block.
    #[inline]
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.header().reference_count()
    }

    /// Whether more than one handle points at the block.
    #[inline]
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.reference_count() > 1
    }

    /// Lock the block for a short critical section.
    pub fn lock(&self) -> BlockGuard<'_> {
        self.header().lock()
    }

    /// Borrow the stored value.
    #[inline]
    #[must_use]
    pub fn get(&self) -> &T {
        &self.inner().value
    }

    /// Mutable access when this handle is the only owner.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.reference_count() == 1 {
            // Safety: we are the unique owner and hold `&mut self`.
            Some(unsafe { &mut (*self.ptr.as_ptr()).value })
        } else {
            None
        }
    }

    /// Address of the stored value, used for identity comparisons.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        &self.inner().value
    }

    /// Whether two handles point at the same block.
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.ptr == b.ptr
    }
}

impl<T: Clone> Shared<T> {
    /// Mutable access, cloning the block first if it is shared.
    ///
    /// The sequence is: lock the current block, clone its value, swap the
    /// clone into `self` (count 1), release the lock on the old block, then
    /// drop the reference to the old block.
    pub fn make_unique(&mut self) -> &mut T {
        if self.reference_count() != 1 {
            let current = self.clone();
            let guard = current.lock();
            let fresh = Shared::new(current.get().clone());
            let displaced = std::mem::replace(self, fresh);
            drop(guard);
            drop(displaced);
            drop(current);
        }
        // Safety: either we were already unique or we just installed a fresh
        // block that nothing else references.
        unsafe { &mut (*self.ptr.as_ptr()).value }
    }

    /// Return a handle to a private copy of the value, leaving `self` alone.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let _guard = self.lock();
        Shared::new(self.get().clone())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        self.header().add_reference();
        Self {
            ptr: self.ptr,
            _owns: PhantomData,
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if self.header().remove_reference() {
            // Safety: this was the last handle; the block came from `Box::leak`.
            drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
        }
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> AsRef<T> for Shared<T> {
    fn as_ref(&self) -> &T {
        self.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("references", &self.reference_count())
            .field("value", self.get())
            .finish()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
