//! The Version Decorator: a leading version byte plus chained up/down
//! conversion between adjacent schema revisions.
//!
//! Grounded on the donor crate's `migration_op.rs` `rebuild_buffer_with`
//! reusable-scratch-across-structural-rebuild idiom — generalized from
//! "add/remove a field in a schemaless record" to "step one hop along a
//! statically typed version chain".

use crate::de::deserialize_with;
use crate::error::CodecError;
use crate::handle::Handle;
use crate::layout::Layout;
use crate::limits::Limits;
use crate::ser::serialize_into;
use tracing::{debug, trace};

/// Hop budget per `load` call, guarding against a malformed cyclic
/// `Prev`/`Next` chain that would otherwise recurse forever. Generous
/// relative to any real schema's version count.
pub const MAX_VERSION_HOPS: u8 = 64;

/// Implemented by a record type that participates in the version chain.
///
/// A type with no older neighbor sets `type Prev = Self` (and likewise
/// `type Next = Self` for no newer neighbor) as the "chain stops here"
/// sentinel — `Self::Prev::VERSION == Self::VERSION` is how `load` detects
/// it, since there is no way to express "no such type" as a plain
/// associated type without an extra indirection this crate doesn't need.
pub trait Versioned: Layout {
    const VERSION: u8;

    type Prev: Versioned;
    type Next: Versioned;

    /// Convert one hop up the chain. Never called when `Self::Prev` is the
    /// "no prev" sentinel (`Self::Prev::VERSION == Self::VERSION`).
    fn from_prev(prev: Self::Prev) -> Result<Self, CodecError>;

    /// Convert one hop down the chain. Never called when `Self::Next` is
    /// the "no next" sentinel.
    fn from_next(next: Self::Next) -> Result<Self, CodecError>;
}

/// Reusable scratch arena for multi-hop conversion, kept across hops
/// within one `load` call so repeated intermediate `serialize_into` calls
/// don't reallocate once it reaches steady-state capacity. Grows but never
/// shrinks on its own — matches the abstract spec's scratch-arena note.
pub struct Scratch {
    buf: Vec<u8>,
}

impl Scratch {
    pub fn new(limits: &Limits) -> Self {
        Scratch {
            buf: Vec::with_capacity(limits.initial_scratch_size),
        }
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Scratch::new(&Limits::default())
    }
}

/// Write `R::VERSION` as a leading byte, then the serialized image of `r`.
pub fn store<R: Versioned>(r: &R, buf: &mut Vec<u8>) {
    let mut body = Vec::new();
    serialize_into(r, &mut body);
    trace!(version = R::VERSION, body_len = body.len(), "storing versioned record");
    buf.clear();
    buf.reserve(1 + body.len());
    buf.push(R::VERSION);
    buf.extend_from_slice(&body);
}

/// Read the version byte and, if it matches `R::VERSION`, deserialize
/// directly. Otherwise walk the `Prev`/`Next` chain one hop at a time
/// until reaching `R`, bounded by `limits.min_hop`/`max_hop`.
pub fn load<R: Versioned>(buf: Vec<u8>) -> Result<Handle<R>, CodecError> {
    load_with::<R>(buf, &Limits::default())
}

pub fn load_with<R: Versioned>(buf: Vec<u8>, limits: &Limits) -> Result<Handle<R>, CodecError> {
    if buf.is_empty() {
        return Err(CodecError::ShortInput {
            type_name: std::any::type_name::<R>(),
            required: 1,
            available: 0,
        });
    }
    let wire_version = buf[0];
    let body = buf[1..].to_vec();

    if wire_version == R::VERSION {
        debug!(version = wire_version, "direct version match");
        return deserialize_with::<R>(body, limits);
    }

    let distance = wire_version.abs_diff(R::VERSION);
    if distance < limits.min_hop || distance > limits.max_hop {
        return Err(CodecError::VersionOutOfRange {
            distance,
            min: limits.min_hop,
            max: limits.max_hop,
        });
    }

    let mut scratch = Scratch::new(limits);
    let mut hops_left = MAX_VERSION_HOPS;
    if wire_version < R::VERSION {
        hop_up::<R>(body, wire_version, limits, &mut scratch, &mut hops_left)
    } else {
        hop_down::<R>(body, wire_version, limits, &mut scratch, &mut hops_left)
    }
}

/// Recursively deserialize `body` (known to be the encoded image of
/// whichever version `wire_version` names) as `R::Prev`, then convert one
/// hop forward with `R::from_prev`. Terminates either when `wire_version`
/// matches some ancestor's `VERSION` (base case, a direct deserialize) or
/// when `R::Prev` is the "no prev" sentinel and `wire_version` was never
/// reached (`VersionUnknown`).
fn hop_up<R: Versioned>(
    body: Vec<u8>,
    wire_version: u8,
    limits: &Limits,
    scratch: &mut Scratch,
    hops_left: &mut u8,
) -> Result<Handle<R>, CodecError> {
    if wire_version == R::VERSION {
        return deserialize_with::<R>(body, limits);
    }
    if <R::Prev as Versioned>::VERSION == R::VERSION {
        return Err(CodecError::VersionUnknown { version: wire_version });
    }
    *hops_left = hops_left
        .checked_sub(1)
        .ok_or(CodecError::CyclicVersionChain { version: wire_version })?;

    trace!(from = wire_version, to = R::VERSION, "hopping up version chain");
    let prev_handle = hop_up::<R::Prev>(body, wire_version, limits, scratch, hops_left)?;
    let prev = prev_handle
        .ptr()
        .expect("a successfully deserialized handle is never empty");
    let r = R::from_prev(prev)?;

    scratch.buf.clear();
    serialize_into(&r, &mut scratch.buf);
    deserialize_with::<R>(std::mem::take(&mut scratch.buf), limits)
}

/// Symmetric to `hop_up`, walking the `Next` direction for a wire version
/// newer than `R::VERSION`.
fn hop_down<R: Versioned>(
    body: Vec<u8>,
    wire_version: u8,
    limits: &Limits,
    scratch: &mut Scratch,
    hops_left: &mut u8,
) -> Result<Handle<R>, CodecError> {
    if wire_version == R::VERSION {
        return deserialize_with::<R>(body, limits);
    }
    if <R::Next as Versioned>::VERSION == R::VERSION {
        return Err(CodecError::VersionUnknown { version: wire_version });
    }
    *hops_left = hops_left
        .checked_sub(1)
        .ok_or(CodecError::CyclicVersionChain { version: wire_version })?;

    trace!(from = wire_version, to = R::VERSION, "hopping down version chain");
    let next_handle = hop_down::<R::Next>(body, wire_version, limits, scratch, hops_left)?;
    let next = next_handle
        .ptr()
        .expect("a successfully deserialized handle is never empty");
    let r = R::from_next(next)?;

    scratch.buf.clear();
    serialize_into(&r, &mut scratch.buf);
    deserialize_with::<R>(std::mem::take(&mut scratch.buf), limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::AuditPath;
    use std::ops::Range;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(C)]
    struct V1 {
        x: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(C)]
    struct V2 {
        x: i32,
        b: i32,
    }

    impl Layout for V1 {
        const FIXED_SIZE: usize = 4;
        const HAS_DYNAMIC: bool = false;
        fn write_fixed(&self, out: &mut [u8]) {
            out[0..4].copy_from_slice(&self.x.to_le_bytes());
        }
        fn read_fixed(buf: &[u8]) -> Self {
            V1 {
                x: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
            }
        }
        fn dynamic_size(&self) -> usize {
            0
        }
        fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}
        fn encoded_dynamic_size(_: &[u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), CodecError> {
            Ok(())
        }
        fn bind_dynamic(_: &mut [u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), CodecError> {
            Ok(())
        }
        fn audit(_: &[u8], _: usize, _: &Range<usize>, _: &mut AuditPath) -> Result<(), CodecError> {
            Ok(())
        }
        fn null_dynamic(_: &mut [u8], _: usize) {}
    }

    impl Layout for V2 {
        const FIXED_SIZE: usize = 8;
        const HAS_DYNAMIC: bool = false;
        fn write_fixed(&self, out: &mut [u8]) {
            out[0..4].copy_from_slice(&self.x.to_le_bytes());
            out[4..8].copy_from_slice(&self.b.to_le_bytes());
        }
        fn read_fixed(buf: &[u8]) -> Self {
            V2 {
                x: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
                b: i32::from_le_bytes(buf[4..8].try_into().unwrap()),
            }
        }
        fn dynamic_size(&self) -> usize {
            0
        }
        fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}
        fn encoded_dynamic_size(_: &[u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), CodecError> {
            Ok(())
        }
        fn bind_dynamic(_: &mut [u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), CodecError> {
            Ok(())
        }
        fn audit(_: &[u8], _: usize, _: &Range<usize>, _: &mut AuditPath) -> Result<(), CodecError> {
            Ok(())
        }
        fn null_dynamic(_: &mut [u8], _: usize) {}
    }

    impl Versioned for V1 {
        const VERSION: u8 = 1;
        type Prev = V1;
        type Next = V2;
        fn from_prev(prev: Self) -> Result<Self, CodecError> {
            Ok(prev)
        }
        fn from_next(next: V2) -> Result<Self, CodecError> {
            Ok(V1 { x: next.x })
        }
    }

    impl Versioned for V2 {
        const VERSION: u8 = 2;
        type Prev = V1;
        type Next = V2;
        fn from_prev(prev: V1) -> Result<Self, CodecError> {
            Ok(V2 { x: prev.x, b: 42 })
        }
        fn from_next(next: Self) -> Result<Self, CodecError> {
            Ok(next)
        }
    }

    #[test]
    fn direct_load_needs_no_conversion() {
        let mut buf = Vec::new();
        store(&V1 { x: 20 }, &mut buf);
        let h = load::<V1>(buf).unwrap();
        assert_eq!(h.ptr().unwrap().x, 20);
    }

    #[test]
    fn up_conversion_fills_new_field_matches_scenario_d() {
        let mut buf = Vec::new();
        store(&V1 { x: 20 }, &mut buf);
        let h = load::<V2>(buf).unwrap();
        let r = h.ptr().unwrap();
        assert_eq!(r.x, 20);
        assert_eq!(r.b, 42);
    }

    #[test]
    fn down_conversion_drops_new_field() {
        let mut buf = Vec::new();
        store(&V2 { x: 5, b: 99 }, &mut buf);
        let h = load::<V1>(buf).unwrap();
        assert_eq!(h.ptr().unwrap().x, 5);
    }

    #[test]
    fn version_out_of_range_is_rejected() {
        let mut buf = Vec::new();
        store(&V1 { x: 20 }, &mut buf);
        let limits = Limits {
            min_hop: 0,
            max_hop: 0,
            ..Limits::default()
        };
        let err = load_with::<V2>(buf, &limits).unwrap_err();
        assert!(matches!(err, CodecError::VersionOutOfRange { distance: 1, .. }));
    }
}
