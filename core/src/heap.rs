//! The managed heap: an append-only collection of integer arrays addressed
//! by reference.
//!
//! The JVM convention of packing an array's length into element slot 0 is
//! an on-the-wire detail, not something callers should see; `JvmArray` keeps
//! the length alongside the elements as an ordinary struct and exposes
//! `length()`/indexed access instead.

use crate::error::EngineTrap;

/// An opaque reference to a heap-allocated array. `0` is used as the
/// uninitialized sentinel for reference-typed locals/stack slots; it only
/// ever collides with a real array once one has been allocated, so
/// uninitialized reference slots must never be dereferenced.
pub type Reference = i32;

/// A single int32 array stored on the heap.
#[derive(Debug, Clone)]
pub struct JvmArray {
    elements: Vec<i32>,
}

impl JvmArray {
    fn zeroed(length: usize) -> Self {
        Self { elements: vec![0; length] }
    }

    pub fn length(&self) -> i32 {
        self.elements.len() as i32
    }

    pub fn get(&self, index: i32) -> i32 {
        self.elements[index as usize]
    }

    pub fn set(&mut self, index: i32, value: i32) {
        self.elements[index as usize] = value;
    }
}

/// The shared, monotonically-growing heap threaded through every frame of a
/// single top-level execution.
#[derive(Debug, Default)]
pub struct Heap {
    arrays: Vec<JvmArray>,
}

impl Heap {
    /// Allocates a heap with no arrays.
    pub fn new() -> Self {
        Self { arrays: Vec::new() }
    }

    /// Allocates a zero-filled int32 array of the given length and returns
    /// its reference. A negative length is a diagnosed trap rather than a
    /// raw panic — left unchecked, casting it to `usize` drives the
    /// allocator toward a multi-exabyte request instead of a clean abort.
    pub fn allocate(&mut self, length: i32) -> Result<Reference, EngineTrap> {
        if length < 0 {
            return Err(EngineTrap::NegativeArrayLength(length));
        }
        self.arrays.push(JvmArray::zeroed(length as usize));
        Ok((self.arrays.len() - 1) as Reference)
    }

    /// Mutable access to a previously-allocated array. Behavior is
    /// undefined if `reference` was never returned by `allocate` — the
    /// engine trusts its own references.
    pub fn get(&mut self, reference: Reference) -> &mut JvmArray {
        &mut self.arrays[reference as usize]
    }

    /// Releases every stored array. With `Heap` owning its arrays directly,
    /// this is just `Drop`, but the explicit method documents the lifecycle
    /// boundary the heap's contract names.
    pub fn free(self) {
        drop(self);
    }
}
