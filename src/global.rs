//! # `GlobalAlloc` adapter
//!
//! Only compiled in when the `global-alloc-adapter` feature is enabled.
//! Wraps a [`SegHeap`] behind a [`SpinLock`] so it can stand in as a
//! `#[global_allocator]`. The lock is mechanical scaffolding to satisfy
//! `GlobalAlloc`'s `Sync` bound — the engine underneath remains explicitly
//! single-threaded, and the lock does not add any of the correctness
//! engineering (reentrancy safety, lock-free fast paths) a real concurrent
//! allocator would need.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use crate::heap::SegHeap;
use crate::provider::HeapProvider;
use crate::spin::SpinLock;
use crate::tag::ALIGN;

enum State<P: HeapProvider> {
    Uninit,
    Ready(SegHeap<P>),
}

/// A `#[global_allocator]`-compatible wrapper around [`SegHeap`].
///
/// Construct with [`Self::new`] at a `static`, then call
/// [`Self::set_provider`] exactly once during startup before any allocation
/// reaches this adapter. Allocating before `set_provider` runs, or
/// requesting an alignment stricter than double-word, returns a null
/// pointer per [`GlobalAlloc`]'s contract for a failed allocation.
pub struct GlobalAllocAdapter<P: HeapProvider> {
    state: SpinLock<State<P>>,
}

impl<P: HeapProvider> GlobalAllocAdapter<P> {
    /// Create an adapter with no backing heap yet.
    pub const fn new() -> Self {
        Self {
            state: SpinLock::new(State::Uninit),
        }
    }

    /// Initialize the backing heap from `provider`.
    ///
    /// Calling this more than once, or after an allocation has already been
    /// served, leaves the existing heap untouched and silently drops
    /// `provider`.
    pub fn set_provider(&self, provider: P) {
        self.state.with_lock(|state| {
            if matches!(state, State::Uninit) {
                if let Ok(heap) = SegHeap::init(provider) {
                    *state = State::Ready(heap);
                }
            }
        });
    }
}

impl<P: HeapProvider> Default for GlobalAllocAdapter<P> {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: all access to the wrapped heap goes through the spinlock.
unsafe impl<P: HeapProvider + Send> Sync for GlobalAllocAdapter<P> {}

unsafe impl<P: HeapProvider + Send> GlobalAlloc for GlobalAllocAdapter<P> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > ALIGN {
            return core::ptr::null_mut();
        }
        self.state.with_lock(|state| match state {
            State::Ready(heap) => heap
                .allocate(layout.size())
                .map_or(core::ptr::null_mut(), NonNull::as_ptr),
            State::Uninit => core::ptr::null_mut(),
        })
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.state.with_lock(|state| {
            if let State::Ready(heap) = state {
                heap.free(NonNull::new(ptr));
            }
        });
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > ALIGN {
            return core::ptr::null_mut();
        }
        self.state.with_lock(|state| match state {
            State::Ready(heap) => heap
                .reallocate(NonNull::new(ptr), new_size)
                .map_or(core::ptr::null_mut(), NonNull::as_ptr),
            State::Uninit => core::ptr::null_mut(),
        })
    }
}
