//! The Contiguous Handle: a typed, exclusively-owned wrapper around a byte
//! buffer whose contents are (or are about to become, via `reset`) a valid
//! in-place image of `R`.
//!
//! Shaped after the donor crate's `SpookyRecordMut { data_buf: Vec<u8>, .. }`
//! single-owned-buffer idiom (`record_mut.rs`), generalized from a
//! schemaless byte buffer to a typed one.

use crate::audit;
use crate::error::CodecError;
use crate::layout::Layout;
use std::marker::PhantomData;
use tracing::trace;

/// Owns a buffer that is either empty or holds a valid bound image of `R`.
///
/// Deliberately not `Send`/`Sync` — a buffer is owned exclusively by one
/// writer/reader at a time (§5 of the spec); the `PhantomData<*const ()>`
/// marker is the conventional Rust idiom for opting out of both auto
/// traits.
pub struct Handle<R> {
    data: Vec<u8>,
    _marker: PhantomData<(R, *const ())>,
}

impl<R: Layout + Copy> Handle<R> {
    /// Construct an empty handle (no buffer).
    pub fn empty() -> Self {
        Handle {
            data: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Wrap an already-bound buffer (descriptors already rewritten). Only
    /// called by `de::deserialize_with` once the descriptor-binding walk
    /// has completed — never exposed as a public constructor, since a
    /// caller-supplied buffer has no guarantee its descriptors are bound.
    pub(crate) fn from_bound_buffer(data: Vec<u8>) -> Self {
        debug_assert!(data.is_empty() || data.len() >= R::FIXED_SIZE);
        Handle {
            data,
            _marker: PhantomData,
        }
    }

    /// Decode this handle's fixed image into an owned `R`, or `None` when
    /// the handle is empty.
    ///
    /// Goes through `R::read_fixed` rather than casting the buffer pointer
    /// to `&R` — `self.data` is a `Vec<u8>`, only byte-aligned by the type
    /// system, while `R` may carry `u64`-aligned `DynArray` fields, and a
    /// record type's declared field order need not match the packed byte
    /// offsets every `Layout` impl hand-computes. `read_fixed` is exactly
    /// the "safe alternative to casting a buffer pointer to `&Self`" its
    /// own doc comment describes (`layout::Layout::read_fixed`).
    pub fn ptr(&self) -> Option<R> {
        if self.data.is_empty() {
            return None;
        }
        debug_assert!(self.data.len() >= R::FIXED_SIZE);
        Some(R::read_fixed(&self.data[..R::FIXED_SIZE]))
    }

    /// Decode, let `f` mutate the owned value, then write it back through
    /// `R::write_fixed`. Returns the updated value, or `None` when the
    /// handle is empty.
    ///
    /// The sanctioned path for rewriting value-typed fields; resizing a
    /// contained array through the returned `&mut R` inside `f` is a
    /// contract violation `enforce_integrity` is designed to catch after
    /// the fact, not one this method prevents. `write_fixed` writes back
    /// each `DynArray` descriptor's `offset` exactly as `f` leaves it, so
    /// a descriptor's bound offset survives a round trip through `update`
    /// untouched unless `f` itself reassigns it.
    pub fn update<F: FnOnce(&mut R)>(&mut self, f: F) -> Option<R> {
        if self.data.is_empty() {
            return None;
        }
        debug_assert!(self.data.len() >= R::FIXED_SIZE);
        let mut image = R::read_fixed(&self.data[..R::FIXED_SIZE]);
        f(&mut image);
        image.write_fixed(&mut self.data[..R::FIXED_SIZE]);
        Some(image)
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Read-only view of the whole buffer, including every dynamic array's
    /// payload — the byte-for-byte wire image, ready to hand to a socket
    /// or file write without another copy.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Truncate to logical length zero, keeping capacity — mirrors the
    /// donor crate's reuse-the-allocation idiom for repeated encode/decode
    /// cycles against the same buffer.
    pub fn reset(&mut self) {
        trace!(prev_len = self.data.len(), "resetting handle");
        self.data.clear();
    }

    /// Run the Integrity Auditor over this handle's buffer.
    pub fn enforce_integrity(&self) -> Result<(), CodecError> {
        audit::enforce_integrity::<R>(&self.data)
    }

    /// Deep-copy: clone the buffer, then re-run the descriptor-binding
    /// walk against the clone so its descriptors point into the clone's
    /// own memory rather than aliasing `self`'s.
    pub fn try_clone(&self) -> Result<Handle<R>, CodecError> {
        if self.data.is_empty() {
            return Ok(Handle::empty());
        }
        crate::de::deserialize::<R>(self.data.clone())
    }

    /// In-place re-serialize: null out every dynamic-array descriptor's
    /// `offset` in this handle's own buffer and return the slice. No copy
    /// — the buffer already has the layout a fresh `ser::serialize` call
    /// would produce, so this is the `Handle<R>` specialization of §4.3.1.
    pub fn reserialize(&mut self) -> &[u8] {
        if !self.data.is_empty() && R::HAS_DYNAMIC {
            R::null_dynamic(&mut self.data, 0);
        }
        &self.data
    }
}

impl<R> Default for Handle<R>
where
    R: Layout + Copy,
{
    fn default() -> Self {
        Handle::empty()
    }
}
