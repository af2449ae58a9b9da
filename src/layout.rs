//! Type introspection, the size oracle, and the descriptor-binding walk.
//!
//! `Layout` is implemented by hand per concrete type rather than derived:
//! the donor crate's `RecordSerialize`/`RecordDeserialize` traits
//! (`serialization.rs`/`deserialization.rs`) are implemented the same way,
//! one impl per value representation, and that precedent is followed here
//! rather than reaching for a proc-macro derive.
//!
//! Field declaration order is the traversal order everywhere in this
//! module: every hand-written `Layout` impl for a record type must walk
//! its fields in the same order in `write_fixed`, `dynamic_size`,
//! `serialize_dynamic`, `encoded_dynamic_size`, `bind_dynamic`,
//! `null_dynamic`, and `audit`, or the passes desync silently.
//!
//! `encoded_dynamic_size` and `bind_dynamic` walk the encoded image with
//! the exact same cursor-threading shape — the former read-only (a dry
//! run that can fail without touching the buffer), the latter mutating
//! offsets as it goes. Both thread two cursors: `cursor`, the read
//! position in the main data stream, and `tail`, a bump allocator into the
//! buffer's tail region (see `de` module docs) where a branched array's
//! inner descriptors are materialized. A dynamic array's length is always
//! read from the main stream's length word at `cursor`, never from the
//! fixed-image header at `fixed_offset` — that header holds the same
//! value once binding completes, but during binding it is write-only,
//! populated from what the stream says.

use crate::error::CodecError;
use crate::limits::Limits;
use arrayvec::ArrayVec;
use std::ops::Range;

/// Maximum nesting depth tracked by the audit field-path stack.
pub const MAX_AUDIT_DEPTH: usize = 16;

pub type AuditPath = ArrayVec<&'static str, MAX_AUDIT_DEPTH>;

/// Implemented by every type that may appear as a record field: scalar
/// values, fixed arrays, dynamic arrays, and hand-written record types.
///
/// Deliberately does *not* require `Self: Copy` here: a builder-side
/// record pairs a `DynArray<T>` descriptor with the sibling `Vec<T>` it was
/// constructed from (see `DynArray::unbound`'s doc comment), and that
/// sibling field keeps the builder from being `Copy`. Only `ser::serialize`
/// needs a plain `&self` walk, so only `ser` imposes no extra bound. Every
/// other consumer of a *decoded* record — [`crate::handle::Handle`],
/// `de::deserialize`, `version::Versioned` — requires `Layout + Copy`
/// explicitly, because those reinterpret or move the record type by value
/// out of a byte buffer, which is only sound for a plain, `Drop`-free,
/// `Copy` type. The wire/accessor struct used with `Handle<R>` is always
/// such a type (value fields and `DynArray<T>` descriptors only, no owned
/// `Vec`s) — see `DESIGN.md` for the builder/accessor split.
pub trait Layout: Sized {
    /// Size in bytes of this type's fixed (non-payload) image. Identical
    /// for every instance of `Self` — computed from the type alone.
    const FIXED_SIZE: usize;

    /// Whether any field transitively reachable from `Self` is a dynamic
    /// array. When `false`, `dynamic_size`/`serialize_dynamic`/
    /// `encoded_dynamic_size`/`bind_dynamic`/`audit` are no-ops and callers
    /// may skip them.
    const HAS_DYNAMIC: bool;

    /// Whether `Self` is itself a dynamic-array descriptor type
    /// (`DynArray<U>` for some `U`). `DynArray<T>`'s own impl is the only
    /// override; every other `Layout` impl takes the default. Lets
    /// `DynArray<T>`'s own binding walk detect, without specialization,
    /// whether its element type `T` is itself a dynamic array — the
    /// "branched" case, whose inner descriptors are never written to the
    /// wire and are instead materialized fresh in the tail region at
    /// decode time.
    const IS_DYN_ARRAY: bool = false;

    /// Write this value's fixed image into `out[..Self::FIXED_SIZE]`.
    /// Every dynamic-array descriptor's `offset` field is written exactly
    /// as `self` carries it — the unbound builder-side canonical form
    /// always carries `offset: 0` (see `DynArray::unbound`/`EMPTY`), so a
    /// fresh `ser::serialize` call still emits a null descriptor; a
    /// bound, decoded `Self` read back out of a [`crate::handle::Handle`]
    /// carries its real offset, and writing it back faithfully is what
    /// makes [`crate::handle::Handle::update`] sound.
    fn write_fixed(&self, out: &mut [u8]);

    /// Inverse of `write_fixed`: reconstruct a value from its fixed image
    /// at `buf[..Self::FIXED_SIZE]`. The safe alternative to casting a
    /// buffer pointer to `&Self` for element access through a
    /// [`DynArray`] — see `DynArray::get`/`to_vec`.
    fn read_fixed(buf: &[u8]) -> Self;

    /// Size oracle: exact number of additional bytes this instance's
    /// dynamic arrays (and anything they transitively own) require beyond
    /// `Self::FIXED_SIZE`. Pure, infallible.
    fn dynamic_size(&self) -> usize;

    /// Append this instance's variable payload to `out`, in field
    /// declaration order (DFS, outer to inner). Every dynamic-array field
    /// writes its length as an 8-byte word immediately before its
    /// payload — even though the same length already sits in that
    /// field's fixed-image descriptor, the wire format repeats it so the
    /// tail-region walk in `encoded_dynamic_size`/`bind_dynamic` never
    /// needs to cross-reference the fixed image. For a field whose
    /// element is itself a dynamic array (branched), nothing else is
    /// written at this site: each inner array's own length word and
    /// payload follow in turn, and no 16-byte descriptor slots are ever
    /// placed on the wire for them — see `DynArray<T>`'s impl.
    fn serialize_dynamic(&self, out: &mut Vec<u8>);

    /// Read-only dry run of the descriptor-binding walk: validates every
    /// encoded length against `limits.max_array_length`, checks that its
    /// payload actually fits within `buf`, and advances `cursor` and
    /// `tail` exactly as `bind_dynamic` would — without writing anything.
    /// `tail` accumulates the number of tail-region bytes a branched
    /// array's materialized descriptors will need; `cursor` advances
    /// through the main data stream. Lets `de::deserialize_with` size the
    /// buffer and fail before any mutation happens.
    fn encoded_dynamic_size(
        buf: &[u8],
        fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError>;

    /// Descriptor-binding walk: rewrite every dynamic-array descriptor's
    /// `{len, offset}` header within `buf[fixed_offset..]`, reading each
    /// array's length from the main stream at `cursor` and advancing it
    /// past the payload, and bump-allocating tail-region slots from
    /// `tail` for any branched array's inner descriptors.
    fn bind_dynamic(
        buf: &mut [u8],
        fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError>;

    /// Recursively check that every dynamic-array descriptor within
    /// `buf[fixed_offset..]` lies within `bounds`.
    fn audit(
        buf: &[u8],
        fixed_offset: usize,
        bounds: &Range<usize>,
        path: &mut AuditPath,
    ) -> Result<(), CodecError>;

    /// Recursively zero every dynamic-array descriptor's `offset` field
    /// within `buf[fixed_offset..]`, in DFS order, reading each descriptor's
    /// currently-bound offset first to find nested descriptors before
    /// nulling it out. Used by [`crate::handle::Handle::reserialize`] to
    /// restore a bound buffer to the same unbound canonical form
    /// `ser::serialize` would have produced, without touching any value
    /// field's bytes. Assumes `buf` already holds a validly bound image —
    /// the only caller is `Handle::reserialize`, which upholds that.
    fn null_dynamic(buf: &mut [u8], fixed_offset: usize);
}

macro_rules! impl_layout_for_value {
    ($t:ty) => {
        impl Layout for $t {
            const FIXED_SIZE: usize = std::mem::size_of::<$t>();
            const HAS_DYNAMIC: bool = false;

            fn write_fixed(&self, out: &mut [u8]) {
                out[..Self::FIXED_SIZE].copy_from_slice(&self.to_le_bytes());
            }

            fn read_fixed(buf: &[u8]) -> Self {
                <$t>::from_le_bytes(buf[..Self::FIXED_SIZE].try_into().unwrap())
            }

            fn dynamic_size(&self) -> usize {
                0
            }

            fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}

            fn encoded_dynamic_size(
                _buf: &[u8],
                _fixed_offset: usize,
                _cursor: &mut usize,
                _tail: &mut usize,
                _limits: &Limits,
            ) -> Result<(), CodecError> {
                Ok(())
            }

            fn bind_dynamic(
                _buf: &mut [u8],
                _fixed_offset: usize,
                _cursor: &mut usize,
                _tail: &mut usize,
                _limits: &Limits,
            ) -> Result<(), CodecError> {
                Ok(())
            }

            fn audit(
                _buf: &[u8],
                _fixed_offset: usize,
                _bounds: &Range<usize>,
                _path: &mut AuditPath,
            ) -> Result<(), CodecError> {
                Ok(())
            }

            fn null_dynamic(_buf: &mut [u8], _fixed_offset: usize) {}
        }
    };
}

impl_layout_for_value!(i8);
impl_layout_for_value!(u8);
impl_layout_for_value!(i16);
impl_layout_for_value!(u16);
impl_layout_for_value!(i32);
impl_layout_for_value!(u32);
impl_layout_for_value!(i64);
impl_layout_for_value!(u64);
impl_layout_for_value!(f32);
impl_layout_for_value!(f64);

impl Layout for bool {
    const FIXED_SIZE: usize = 1;
    const HAS_DYNAMIC: bool = false;

    fn write_fixed(&self, out: &mut [u8]) {
        out[0] = *self as u8;
    }

    fn read_fixed(buf: &[u8]) -> Self {
        buf[0] != 0
    }

    fn dynamic_size(&self) -> usize {
        0
    }

    fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}

    fn encoded_dynamic_size(
        _buf: &[u8],
        _fixed_offset: usize,
        _cursor: &mut usize,
        _tail: &mut usize,
        _limits: &Limits,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn bind_dynamic(
        _buf: &mut [u8],
        _fixed_offset: usize,
        _cursor: &mut usize,
        _tail: &mut usize,
        _limits: &Limits,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn audit(
        _buf: &[u8],
        _fixed_offset: usize,
        _bounds: &Range<usize>,
        _path: &mut AuditPath,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn null_dynamic(_buf: &mut [u8], _fixed_offset: usize) {}
}

/// Fixed arrays recurse element by element; compile-time `N` plays the
/// role of the abstract spec's "FixedArray" tag.
impl<T: Layout, const N: usize> Layout for [T; N] {
    const FIXED_SIZE: usize = T::FIXED_SIZE * N;
    const HAS_DYNAMIC: bool = T::HAS_DYNAMIC;

    fn write_fixed(&self, out: &mut [u8]) {
        for (i, elem) in self.iter().enumerate() {
            let start = i * T::FIXED_SIZE;
            elem.write_fixed(&mut out[start..start + T::FIXED_SIZE]);
        }
    }

    fn read_fixed(buf: &[u8]) -> Self {
        std::array::from_fn(|i| {
            let start = i * T::FIXED_SIZE;
            T::read_fixed(&buf[start..start + T::FIXED_SIZE])
        })
    }

    fn dynamic_size(&self) -> usize {
        if !T::HAS_DYNAMIC {
            return 0;
        }
        self.iter().map(Layout::dynamic_size).sum()
    }

    fn serialize_dynamic(&self, out: &mut Vec<u8>) {
        if !T::HAS_DYNAMIC {
            return;
        }
        for elem in self.iter() {
            elem.serialize_dynamic(out);
        }
    }

    fn encoded_dynamic_size(
        buf: &[u8],
        fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError> {
        if !T::HAS_DYNAMIC {
            return Ok(());
        }
        for i in 0..N {
            T::encoded_dynamic_size(buf, fixed_offset + i * T::FIXED_SIZE, cursor, tail, limits)?;
        }
        Ok(())
    }

    fn bind_dynamic(
        buf: &mut [u8],
        fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError> {
        if !T::HAS_DYNAMIC {
            return Ok(());
        }
        for i in 0..N {
            T::bind_dynamic(buf, fixed_offset + i * T::FIXED_SIZE, cursor, tail, limits)?;
        }
        Ok(())
    }

    fn audit(
        buf: &[u8],
        fixed_offset: usize,
        bounds: &Range<usize>,
        path: &mut AuditPath,
    ) -> Result<(), CodecError> {
        if !T::HAS_DYNAMIC {
            return Ok(());
        }
        for i in 0..N {
            let _ = path.try_push("[]");
            T::audit(buf, fixed_offset + i * T::FIXED_SIZE, bounds, path)?;
            path.pop();
        }
        Ok(())
    }

    fn null_dynamic(buf: &mut [u8], fixed_offset: usize) {
        if !T::HAS_DYNAMIC {
            return;
        }
        for i in 0..N {
            T::null_dynamic(buf, fixed_offset + i * T::FIXED_SIZE);
        }
    }
}

/// An unbound or bound dynamic-array descriptor: `{len, offset}` as a pair
/// of `u64`s rather than a raw pointer, so that it survives a `Vec`
/// reallocation untouched and keeps every record type `Copy`. See
/// DESIGN.md "pointer graphs vs indices".
///
/// Before serialization, wrap a source slice with [`DynArray::unbound`].
/// After deserialization, read elements back out with [`DynArray::get`] /
/// [`DynArray::to_vec`] against the owning [`crate::handle::Handle`]'s
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct DynArray<T> {
    len: u64,
    offset: u64,
    _marker: std::marker::PhantomData<T>,
}

impl<T> DynArray<T> {
    pub const EMPTY: DynArray<T> = DynArray {
        len: 0,
        offset: 0,
        _marker: std::marker::PhantomData,
    };

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Source-side constructor: an unbound descriptor carrying only a length.
/// Record `Layout` impls hold the real `&[T]`/`Vec<T>` alongside this
/// descriptor in their un-encoded, "builder" form — a record type used
/// purely for encoding keeps a sibling `Vec<T>` field next to each
/// `DynArray<T>` descriptor it owns, the way the donor's
/// `serialize_record` pairs an index entry with its backing byte slice —
/// and reads that sibling field directly in `write_fixed`/
/// `serialize_dynamic` rather than through this descriptor, which carries
/// no payload of its own.
impl<T> DynArray<T> {
    pub fn unbound(len: usize) -> Self {
        DynArray {
            len: len as u64,
            offset: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Layout> DynArray<T> {
    /// Byte range of this descriptor's payload within `buf`, once bound.
    /// `None` for an empty (unbound or zero-length) descriptor.
    pub fn range(&self) -> Option<Range<usize>> {
        if self.len == 0 {
            return None;
        }
        let start = self.offset as usize;
        let end = start + self.len as usize * T::FIXED_SIZE;
        Some(start..end)
    }

    /// Read element `index` out of the owning handle's buffer. `None` if
    /// `index` is out of range for this descriptor.
    ///
    /// Returns an owned `T` (every `Layout` type is `Copy`) rather than a
    /// reference, via `T::read_fixed` — the safe alternative to
    /// transmuting a buffer slice into `&T`, and the only option anyway
    /// for a branched array, whose elements are themselves `DynArray<U>`
    /// descriptors carrying offsets relative to this same buffer.
    pub fn get(&self, buf: &[u8], index: usize) -> Option<T> {
        if index >= self.len as usize {
            return None;
        }
        let start = self.offset as usize + index * T::FIXED_SIZE;
        Some(T::read_fixed(&buf[start..start + T::FIXED_SIZE]))
    }

    /// Collect every element into a fresh `Vec<T>`.
    pub fn to_vec(&self, buf: &[u8]) -> Vec<T> {
        (0..self.len as usize)
            .map(|i| self.get(buf, i).expect("index within len"))
            .collect()
    }
}

impl<T: Layout> Layout for DynArray<T> {
    const FIXED_SIZE: usize = 16;
    const HAS_DYNAMIC: bool = true;
    const IS_DYN_ARRAY: bool = true;

    fn write_fixed(&self, out: &mut [u8]) {
        out[0..8].copy_from_slice(&self.len.to_le_bytes());
        out[8..16].copy_from_slice(&self.offset.to_le_bytes());
    }

    fn read_fixed(buf: &[u8]) -> Self {
        DynArray {
            len: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            offset: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            _marker: std::marker::PhantomData,
        }
    }

    fn dynamic_size(&self) -> usize {
        // The caller accounts for payload bytes via the sibling `Vec<T>`
        // field in its own `dynamic_size`; a bare `DynArray<T>` descriptor
        // carries no backing data of its own to measure.
        0
    }

    fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}

    fn encoded_dynamic_size(
        buf: &[u8],
        _fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError> {
        let len = read_len_word::<T>(buf, cursor, limits)?;
        if len == 0 {
            return Ok(());
        }
        if !T::IS_DYN_ARRAY {
            let payload_offset = *cursor;
            let end = checked_payload_range::<T>(buf.len(), payload_offset, len as usize)?;
            *cursor = end;
            if T::HAS_DYNAMIC {
                for i in 0..len as usize {
                    T::encoded_dynamic_size(buf, payload_offset + i * T::FIXED_SIZE, cursor, tail, limits)?;
                }
            }
        } else {
            *tail += len as usize * T::FIXED_SIZE;
            for _ in 0..len {
                // `fixed_offset` is irrelevant here: the inner entry has no
                // pre-existing header anywhere, so its own call reads its
                // length straight off the stream too.
                T::encoded_dynamic_size(buf, 0, cursor, tail, limits)?;
            }
        }
        Ok(())
    }

    fn bind_dynamic(
        buf: &mut [u8],
        fixed_offset: usize,
        cursor: &mut usize,
        tail: &mut usize,
        limits: &Limits,
    ) -> Result<(), CodecError> {
        let len = read_len_word::<T>(buf, cursor, limits)?;
        if len == 0 {
            write_header(buf, fixed_offset, 0, 0);
            return Ok(());
        }
        if !T::IS_DYN_ARRAY {
            let payload_offset = *cursor;
            let end = checked_payload_range::<T>(buf.len(), payload_offset, len as usize)?;
            write_header(buf, fixed_offset, len, payload_offset as u64);
            *cursor = end;
            if T::HAS_DYNAMIC {
                for i in 0..len as usize {
                    T::bind_dynamic(buf, payload_offset + i * T::FIXED_SIZE, cursor, tail, limits)?;
                }
            }
        } else {
            let first_slot = *tail;
            for _ in 0..len {
                let slot = *tail;
                *tail += T::FIXED_SIZE;
                if *tail > buf.len() {
                    return Err(CodecError::ShortInput {
                        type_name: std::any::type_name::<T>(),
                        required: *tail,
                        available: buf.len(),
                    });
                }
                // Materializes a fresh header at `slot` — `T` here is
                // itself `DynArray<U>`, so this recursive call reads the
                // inner array's own length word off the stream and writes
                // its header into the tail slot we just allocated for it.
                T::bind_dynamic(buf, slot, cursor, tail, limits)?;
            }
            write_header(buf, fixed_offset, len, first_slot as u64);
        }
        Ok(())
    }

    fn audit(
        buf: &[u8],
        fixed_offset: usize,
        bounds: &Range<usize>,
        path: &mut AuditPath,
    ) -> Result<(), CodecError> {
        let len = read_u64(buf, fixed_offset).map_err(|_| CodecError::IntegrityViolation {
            path: path_string(path),
        })?;
        if len == 0 {
            return Ok(());
        }
        let offset = read_u64(buf, fixed_offset + 8).map_err(|_| CodecError::IntegrityViolation {
            path: path_string(path),
        })? as usize;
        let byte_len = (len as usize)
            .checked_mul(T::FIXED_SIZE)
            .ok_or_else(|| CodecError::IntegrityViolation {
                path: path_string(path),
            })?;
        let end = offset
            .checked_add(byte_len)
            .ok_or_else(|| CodecError::IntegrityViolation {
                path: path_string(path),
            })?;
        if offset < bounds.start || end > bounds.end {
            return Err(CodecError::IntegrityViolation {
                path: path_string(path),
            });
        }
        if T::HAS_DYNAMIC {
            for i in 0..len as usize {
                let _ = path.try_push("[]");
                T::audit(buf, offset + i * T::FIXED_SIZE, &(offset..end.max(bounds.end)), path)?;
                path.pop();
            }
        }
        Ok(())
    }

    fn null_dynamic(buf: &mut [u8], fixed_offset: usize) {
        let len = u64::from_le_bytes(buf[fixed_offset..fixed_offset + 8].try_into().unwrap()) as usize;
        if len == 0 {
            buf[fixed_offset + 8..fixed_offset + 16].copy_from_slice(&0u64.to_le_bytes());
            return;
        }
        let offset = u64::from_le_bytes(buf[fixed_offset + 8..fixed_offset + 16].try_into().unwrap()) as usize;
        if T::HAS_DYNAMIC {
            for i in 0..len {
                T::null_dynamic(buf, offset + i * T::FIXED_SIZE);
            }
        }
        buf[fixed_offset + 8..fixed_offset + 16].copy_from_slice(&0u64.to_le_bytes());
    }
}

/// Reads the 8-byte length word at `buf[*cursor..*cursor + 8]`, validates
/// it against `limits.max_array_length`, and advances `*cursor` past it.
/// The length word in the main stream is the sole source of a dynamic
/// array's length during decode: the copy a `write_fixed` call leaves in
/// the descriptor's own fixed-image header is never read back for this —
/// it exists purely so the on-wire layout matches the abstract format's
/// redundant framing, and `bind_dynamic` always overwrites it with this
/// same value once binding completes.
fn read_len_word<T: Layout>(buf: &[u8], cursor: &mut usize, limits: &Limits) -> Result<u64, CodecError> {
    let len = read_u64(buf, *cursor)?;
    *cursor += 8;
    if len > limits.max_array_length {
        return Err(CodecError::OversizedArray {
            element_type: std::any::type_name::<T>(),
            length: len,
            limit: limits.max_array_length,
        });
    }
    Ok(len)
}

/// Checks that `len` elements of `T` starting at `payload_offset` fit
/// within a buffer of length `buf_len`, and returns the end offset.
fn checked_payload_range<T: Layout>(buf_len: usize, payload_offset: usize, len: usize) -> Result<usize, CodecError> {
    let byte_len = len.checked_mul(T::FIXED_SIZE).ok_or(CodecError::ShortInput {
        type_name: std::any::type_name::<T>(),
        required: usize::MAX,
        available: buf_len,
    })?;
    let end = payload_offset.checked_add(byte_len).ok_or(CodecError::ShortInput {
        type_name: std::any::type_name::<T>(),
        required: usize::MAX,
        available: buf_len,
    })?;
    if end > buf_len {
        return Err(CodecError::ShortInput {
            type_name: std::any::type_name::<T>(),
            required: end,
            available: buf_len,
        });
    }
    Ok(end)
}

fn write_header(buf: &mut [u8], fixed_offset: usize, len: u64, offset: u64) {
    buf[fixed_offset..fixed_offset + 8].copy_from_slice(&len.to_le_bytes());
    buf[fixed_offset + 8..fixed_offset + 16].copy_from_slice(&offset.to_le_bytes());
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, CodecError> {
    let bytes: [u8; 8] = buf
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or(CodecError::ShortInput {
            type_name: "u64 descriptor field",
            required: offset + 8,
            available: buf.len(),
        })?;
    Ok(u64::from_le_bytes(bytes))
}

fn path_string(path: &AuditPath) -> String {
    path.iter().copied().collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dyn_array_empty_round_trips_descriptor() {
        let mut buf = [0u8; 16];
        DynArray::<i32>::EMPTY.write_fixed(&mut buf);
        assert_eq!(&buf[0..8], &0u64.to_le_bytes());
        assert_eq!(&buf[8..16], &0u64.to_le_bytes());
    }

    #[test]
    fn read_len_word_rejects_oversized_length() {
        let buf = 100u64.to_le_bytes().to_vec();
        let mut cursor = 0;
        let limits = Limits::with_max_array_length(10);
        let err = read_len_word::<i32>(&buf, &mut cursor, &limits).unwrap_err();
        assert!(matches!(err, CodecError::OversizedArray { length: 100, limit: 10, .. }));
    }

    #[test]
    fn checked_payload_range_rejects_short_buffer() {
        // 10 * 4 = 40 bytes required starting at offset 8, buffer is only 16 bytes.
        let err = checked_payload_range::<i32>(16, 8, 10).unwrap_err();
        assert!(matches!(err, CodecError::ShortInput { required: 48, available: 16, .. }));
    }

    #[test]
    fn bind_dynamic_of_plain_array_reads_length_from_stream() {
        // header slot left zeroed on purpose: length comes from the stream
        // word at the cursor, not from this pre-existing header.
        let mut buf = vec![0u8; 16 + 8 + 12];
        buf[16..24].copy_from_slice(&3u64.to_le_bytes());
        buf[24..28].copy_from_slice(&1i32.to_le_bytes());
        buf[28..32].copy_from_slice(&2i32.to_le_bytes());
        buf[32..36].copy_from_slice(&3i32.to_le_bytes());

        let mut cursor = 16;
        let mut tail = 0;
        let limits = Limits::default();
        DynArray::<i32>::bind_dynamic(&mut buf, 0, &mut cursor, &mut tail, &limits).unwrap();
        assert_eq!(cursor, 36);
        assert_eq!(&buf[0..8], &3u64.to_le_bytes());
        assert_eq!(&buf[8..16], &24u64.to_le_bytes());
    }
}
