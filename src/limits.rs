//! Construction-time configuration knobs. Not a deployment config surface —
//! there is no file or environment parsing here, just plain values the
//! embedding program passes in, the abstract core has nothing to discover
//! at runtime.

/// Bounds on decode behavior. Pass to [`crate::de::deserialize_with`] and
/// [`crate::version::load_with`]; [`Default`] matches "no limit" on every
/// knob, including the version hop range — callers that want the plain
/// single-hop decorator's stricter behavior pass `min_hop: 1, max_hop: 1`
/// explicitly (see `DESIGN.md`'s plain-vs-multi-version decorator note).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Hard upper bound on any decoded dynamic-array length word. Guards
    /// against a corrupt or hostile buffer claiming an absurd length before
    /// any allocation happens.
    pub max_array_length: u64,
    /// Starting capacity hint for the version decorator's per-hop scratch
    /// buffer. Tuning only; the buffer grows past this as needed.
    pub initial_scratch_size: usize,
    /// Minimum accepted version distance for a single `load` call.
    pub min_hop: u8,
    /// Maximum accepted version distance for a single `load` call.
    pub max_hop: u8,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_array_length: u64::MAX,
            initial_scratch_size: 256,
            min_hop: 0,
            max_hop: u8::MAX,
        }
    }
}

impl Limits {
    /// Convenience constructor for the common case of capping array length
    /// while leaving version-hop behavior at its permissive default.
    pub fn with_max_array_length(max_array_length: u64) -> Self {
        Limits {
            max_array_length,
            ..Limits::default()
        }
    }
}
