//! Integrity Auditor entry point.
//!
//! The recursive bounds check itself lives on each [`crate::layout::Layout`]
//! impl (`Layout::audit`) — one fold per type, mirroring every other pass in
//! this crate. This module just owns the top-level call: seed the root
//! bounds and field-path stack, then hand off to the type tree.

use crate::layout::{AuditPath, Layout};
use crate::error::CodecError;
use tracing::trace;

/// Recursively check that every dynamic-array descriptor reachable from
/// `R`'s fixed image at the start of `buf` lies within `buf`.
///
/// Returns the first violation found, naming the dotted field path from
/// the root (e.g. `"tags.[]"` for the third element of a branched array
/// field named `tags`).
pub fn enforce_integrity<R: Layout>(buf: &[u8]) -> Result<(), CodecError> {
    trace!(buf_len = buf.len(), "auditing buffer integrity");
    if buf.is_empty() {
        return Ok(());
    }
    let mut path = AuditPath::new();
    R::audit(buf, 0, &(0..buf.len()), &mut path)
}
