//! The Deserializer: validate the encoded image with a read-only dry run,
//! then run the descriptor-binding walk so every dynamic-array
//! descriptor's `offset` points at its payload inside that same buffer.
//!
//! The encoded image has two regions (see `layout`'s module doc comment):
//! the main data stream, covering everything written by `serialize_dynamic`
//! (`[0, main_len)`), and a tail region materialized only at decode time to
//! hold a branched array's inner descriptors (`[main_len, main_len +
//! tail_len)`). `encoded_dynamic_size` measures both lengths in one pass;
//! if the input is shorter than `main_len` it is rejected, and if it is
//! shorter than `main_len + tail_len` the buffer is grown and the
//! extension zeroed before `bind_dynamic` writes the tail's descriptors
//! into it.

use crate::error::CodecError;
use crate::handle::Handle;
use crate::layout::Layout;
use crate::limits::Limits;
use tracing::{debug, trace};

/// Deserialize `buf` in place into a [`Handle<R>`], using [`Limits::default`].
pub fn deserialize<R: Layout + Copy>(buf: Vec<u8>) -> Result<Handle<R>, CodecError> {
    deserialize_with(buf, &Limits::default())
}

/// Deserialize `buf` in place, enforcing `limits` on every decoded
/// dynamic-array length.
///
/// Out-of-place deserialization from a read-only source is just
/// `deserialize_with(src.to_vec(), limits)` — once descriptors are
/// buffer-relative offsets rather than raw pointers, there is no separate
/// code path for "copy first, then bind" versus "bind in place": both
/// bind against an owned `Vec<u8>` that the caller no longer aliases.
///
/// On failure, `buf` is never mutated — the size-oracle dry run
/// (`Layout::encoded_dynamic_size`) runs to completion (or fails) before
/// the mutating descriptor-binding walk (`Layout::bind_dynamic`) ever
/// starts, matching the "no observable change to the destination on
/// failure" policy.
pub fn deserialize_with<R: Layout + Copy>(mut buf: Vec<u8>, limits: &Limits) -> Result<Handle<R>, CodecError> {
    if buf.len() < R::FIXED_SIZE {
        return Err(CodecError::ShortInput {
            type_name: std::any::type_name::<R>(),
            required: R::FIXED_SIZE,
            available: buf.len(),
        });
    }

    let (main_len, tail_len) = if R::HAS_DYNAMIC {
        let mut cursor = R::FIXED_SIZE;
        let mut tail = 0usize;
        R::encoded_dynamic_size(&buf, 0, &mut cursor, &mut tail, limits)?;
        (cursor, tail)
    } else {
        (R::FIXED_SIZE, 0)
    };
    let total = main_len + tail_len;

    if buf.len() > main_len {
        trace!(
            extra = buf.len() - main_len,
            "ignoring trailing bytes after encoded image"
        );
        buf.truncate(main_len);
    }
    if tail_len > 0 {
        trace!(tail_len, "growing buffer for branched-array tail region");
        buf.resize(total, 0);
    }

    if R::HAS_DYNAMIC {
        let mut cursor = R::FIXED_SIZE;
        let mut tail = main_len;
        R::bind_dynamic(&mut buf, 0, &mut cursor, &mut tail, limits)?;
        debug_assert_eq!(cursor, main_len);
        debug_assert_eq!(tail, total);
    }

    debug!(total, "deserialized record");
    Ok(Handle::from_bound_buffer(buf))
}
