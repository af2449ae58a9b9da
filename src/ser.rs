//! The Serializer: size the instance, write its fixed image, append its
//! variable payload, null out every descriptor's `offset`.
//!
//! Field order here must match `Layout::bind_dynamic`'s field order
//! exactly (declaration order, DFS, outer to inner) — see `layout`'s module
//! doc comment.

use crate::layout::Layout;
use tracing::trace;

/// Serialize `r` into `buf`, growing or shrinking `buf` to the exact
/// encoded size, and return the encoded slice.
///
/// Equivalent to the donor crate's `serialize_into`, generalized from a
/// schemaless `SpookyValue` walk to a type-driven `Layout` walk.
pub fn serialize<'a, R: Layout>(r: &R, buf: &'a mut Vec<u8>) -> &'a [u8] {
    serialize_into(r, buf);
    buf.as_slice()
}

/// Same as [`serialize`], but returns nothing — for callers that already
/// hold `buf` and only want the write, not a re-borrow of it (mirrors the
/// donor's `serialize_into_buf` / reuse-the-buffer idiom, letting repeated
/// calls into the same `Vec` avoid reallocating once it reaches steady
/// state capacity).
pub fn serialize_into<R: Layout>(r: &R, buf: &mut Vec<u8>) {
    let total = R::FIXED_SIZE + r.dynamic_size();
    trace!(fixed = R::FIXED_SIZE, total, "serializing record");

    buf.clear();
    buf.resize(R::FIXED_SIZE, 0);

    r.write_fixed(&mut buf[..R::FIXED_SIZE]);

    if R::HAS_DYNAMIC {
        // Appends straight into `buf` rather than through an intermediate
        // scratch `Vec` — once `buf` has reached steady-state capacity
        // across repeated calls, this allocates nothing.
        r.serialize_dynamic(buf);
        debug_assert_eq!(buf.len(), total);
        // Every dynamic-array descriptor on the builder side already
        // carries `offset: 0` (`DynArray::unbound`/`EMPTY`), and
        // `write_fixed` writes a descriptor's offset field faithfully
        // rather than always zeroing it — see `Layout::write_fixed`'s doc
        // comment. So the image `write_fixed` above just wrote already
        // satisfies "overwrite the descriptor with `{length, pointer:
        // null}`"; there is nothing left to null out after the fact.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DynArray;

    #[derive(Clone, Copy)]
    #[repr(C)]
    struct Scalar {
        a: i32,
        b: i32,
    }

    impl Layout for Scalar {
        const FIXED_SIZE: usize = 8;
        const HAS_DYNAMIC: bool = false;

        fn write_fixed(&self, out: &mut [u8]) {
            out[0..4].copy_from_slice(&self.a.to_le_bytes());
            out[4..8].copy_from_slice(&self.b.to_le_bytes());
        }

        fn read_fixed(buf: &[u8]) -> Self {
            Scalar {
                a: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
                b: i32::from_le_bytes(buf[4..8].try_into().unwrap()),
            }
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
            _limits: &crate::limits::Limits,
        ) -> Result<(), crate::error::CodecError> {
            Ok(())
        }

        fn bind_dynamic(
            _buf: &mut [u8],
            _fixed_offset: usize,
            _cursor: &mut usize,
            _tail: &mut usize,
            _limits: &crate::limits::Limits,
        ) -> Result<(), crate::error::CodecError> {
            Ok(())
        }

        fn audit(
            _buf: &[u8],
            _fixed_offset: usize,
            _bounds: &std::ops::Range<usize>,
            _path: &mut crate::layout::AuditPath,
        ) -> Result<(), crate::error::CodecError> {
            Ok(())
        }

        fn null_dynamic(_buf: &mut [u8], _fixed_offset: usize) {}
    }

    #[test]
    fn scalar_record_matches_scenario_a() {
        let r = Scalar { a: 42, b: 43 };
        let mut buf = Vec::new();
        let out = serialize(&r, &mut buf);
        assert_eq!(out.len(), 8);
        assert_eq!(&out[0..4], &42i32.to_le_bytes());
        assert_eq!(&out[4..8], &43i32.to_le_bytes());
    }

    // A builder-side record pairs its `DynArray<T>` descriptor with the
    // real backing `Vec<T>` it was constructed from — see `layout`'s doc
    // comment on `DynArray::unbound`. `write_fixed`/`serialize_dynamic`
    // read the sibling `Vec`, never `DynArray` itself (which carries no
    // payload of its own, only `len`/`offset`).
    #[derive(Clone)]
    struct IntVec {
        arr: DynArray<i32>,
        values: Vec<i32>,
    }

    impl IntVec {
        fn new(values: Vec<i32>) -> Self {
            IntVec {
                arr: DynArray::unbound(values.len()),
                values,
            }
        }
    }

    impl Layout for IntVec {
        const FIXED_SIZE: usize = DynArray::<i32>::FIXED_SIZE;
        const HAS_DYNAMIC: bool = true;

        fn write_fixed(&self, out: &mut [u8]) {
            self.arr.write_fixed(out);
        }

        fn read_fixed(buf: &[u8]) -> Self {
            IntVec {
                arr: DynArray::read_fixed(buf),
                values: Vec::new(),
            }
        }

        fn dynamic_size(&self) -> usize {
            8 + self.values.len() * 4
        }

        fn serialize_dynamic(&self, out: &mut Vec<u8>) {
            out.extend_from_slice(&(self.values.len() as u64).to_le_bytes());
            for v in &self.values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }

        fn encoded_dynamic_size(
            buf: &[u8],
            fixed_offset: usize,
            cursor: &mut usize,
            tail: &mut usize,
            limits: &crate::limits::Limits,
        ) -> Result<(), crate::error::CodecError> {
            DynArray::<i32>::encoded_dynamic_size(buf, fixed_offset, cursor, tail, limits)
        }

        fn bind_dynamic(
            buf: &mut [u8],
            fixed_offset: usize,
            cursor: &mut usize,
            tail: &mut usize,
            limits: &crate::limits::Limits,
        ) -> Result<(), crate::error::CodecError> {
            DynArray::<i32>::bind_dynamic(buf, fixed_offset, cursor, tail, limits)
        }

        fn audit(
            buf: &[u8],
            fixed_offset: usize,
            bounds: &std::ops::Range<usize>,
            path: &mut crate::layout::AuditPath,
        ) -> Result<(), crate::error::CodecError> {
            DynArray::<i32>::audit(buf, fixed_offset, bounds, path)
        }

        fn null_dynamic(buf: &mut [u8], fixed_offset: usize) {
            DynArray::<i32>::null_dynamic(buf, fixed_offset)
        }
    }

    #[test]
    fn dynamic_array_matches_scenario_b() {
        // Header (16 bytes, offset left at 0 pre-bind) + redundant stream
        // length word (8 bytes) + 3 i32 payload (12 bytes) = 36 bytes.
        let r = IntVec::new(vec![1, 2, 3]);
        let mut buf = Vec::new();
        let out = serialize(&r, &mut buf);
        assert_eq!(out.len(), 16 + 8 + 12);
        assert_eq!(&out[0..8], &3u64.to_le_bytes());
        assert_eq!(&out[8..16], &0u64.to_le_bytes());
        assert_eq!(&out[16..24], &3u64.to_le_bytes());
        assert_eq!(&out[24..28], &1i32.to_le_bytes());
        assert_eq!(&out[28..32], &2i32.to_le_bytes());
        assert_eq!(&out[32..36], &3i32.to_le_bytes());
    }
}
