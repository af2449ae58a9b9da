//! Contiguous binary serialization core.
//!
//! Encodes an arbitrary record type — a tree of value fields, fixed and
//! variable-length arrays, nested records — into a single self-contained
//! byte buffer, and decodes it back in place so the decoded record and
//! every array it transitively owns live inside one contiguous memory
//! region. A [`version`] decorator prepends a version byte and performs
//! chained conversions between adjacent schema revisions when the on-wire
//! version differs from the expected one.
//!
//! Transformed from `timothybesel-spooky_db_module`'s schemaless,
//! hash-indexed record reader into a statically typed one; see
//! `DESIGN.md` in the crate root for the full grounding ledger.
//!
//! # Example
//!
//! ```
//! use cocoon::layout::{AuditPath, Layout};
//! use cocoon::limits::Limits;
//! use cocoon::{de, ser};
//! use std::ops::Range;
//!
//! #[derive(Clone, Copy)]
//! #[repr(C)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Layout for Point {
//!     const FIXED_SIZE: usize = 8;
//!     const HAS_DYNAMIC: bool = false;
//!
//!     fn write_fixed(&self, out: &mut [u8]) {
//!         out[0..4].copy_from_slice(&self.x.to_le_bytes());
//!         out[4..8].copy_from_slice(&self.y.to_le_bytes());
//!     }
//!     fn read_fixed(buf: &[u8]) -> Self {
//!         Point {
//!             x: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
//!             y: i32::from_le_bytes(buf[4..8].try_into().unwrap()),
//!         }
//!     }
//!     fn dynamic_size(&self) -> usize { 0 }
//!     fn serialize_dynamic(&self, _out: &mut Vec<u8>) {}
//!     fn encoded_dynamic_size(_: &[u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), cocoon::error::CodecError> {
//!         Ok(())
//!     }
//!     fn bind_dynamic(_: &mut [u8], _: usize, _: &mut usize, _: &mut usize, _: &Limits) -> Result<(), cocoon::error::CodecError> {
//!         Ok(())
//!     }
//!     fn audit(_: &[u8], _: usize, _: &Range<usize>, _: &mut AuditPath) -> Result<(), cocoon::error::CodecError> {
//!         Ok(())
//!     }
//!     fn null_dynamic(_: &mut [u8], _: usize) {}
//! }
//!
//! let mut buf = Vec::new();
//! ser::serialize(&Point { x: 3, y: 4 }, &mut buf);
//! let handle = de::deserialize::<Point>(buf).unwrap();
//! assert_eq!(handle.ptr().unwrap().x, 3);
//! ```

pub mod audit;
pub mod de;
pub mod error;
pub mod handle;
pub mod layout;
pub mod limits;
pub mod ser;
pub mod version;

pub use de::{deserialize, deserialize_with};
pub use error::CodecError;
pub use handle::Handle;
pub use layout::{DynArray, Layout};
pub use limits::Limits;
pub use ser::{serialize, serialize_into};
pub use version::{Scratch, Versioned};
