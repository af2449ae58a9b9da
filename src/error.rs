//! Error taxonomy shared by every component of the serialization core.

use thiserror::Error;

/// Everything that can go wrong decoding, auditing, or version-converting
/// a contiguous record. Never produced by `serialize` (the abstract size
/// oracle cannot fail once a record type-checks).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("short input: {type_name} requires at least {required} bytes, got {available}")]
    ShortInput {
        type_name: &'static str,
        required: usize,
        available: usize,
    },

    #[error("oversized array: {element_type}[{length}] exceeds limit {limit}")]
    OversizedArray {
        element_type: &'static str,
        length: u64,
        limit: u64,
    },

    #[error("integrity violation at {path}")]
    IntegrityViolation { path: String },

    #[error("unknown version {version}")]
    VersionUnknown { version: u8 },

    #[error("version distance {distance} out of range [{min}, {max}]")]
    VersionOutOfRange { distance: u8, min: u8, max: u8 },

    #[error("no converter from version {from_version} to {to_version} for field {field}")]
    ConverterMissing {
        field: &'static str,
        from_version: u8,
        to_version: u8,
    },

    #[error("version hop chain revisited version {version}, would not terminate")]
    CyclicVersionChain { version: u8 },
}
