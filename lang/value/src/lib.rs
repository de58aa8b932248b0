//! The universal data substrate of the glas runtime.
//!
//! Everything the runtime touches (stack cells, module artifacts, programs,
//! effect requests) is one [`Value`]: an immutable tree of bits with
//! persistent structural sharing. Records and lists are canonical shapes
//! over the same substrate rather than separate types.

/// Trimmed bitstrings and natural-number arithmetic over them.
pub mod bits;
pub use bits::Bits;

/// The value tree: stems, branches, and compact list nodes.
pub mod value;
pub use value::Value;

/// Rendering for values.
pub mod fmt;
