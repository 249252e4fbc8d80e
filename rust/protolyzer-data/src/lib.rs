//! Binary structured data engine.
//!
//! [`RawBuffer`] holds bytes, either owned or borrowed from the caller, with an
//! endianness label. [`BitView`] and [`BitViewMut`] compute over its bits, and
//! [`StructuredBuffer`] partitions it into variable-width fields described by a
//! [`FieldLayout`].

pub mod bit_view;
pub mod endian;
pub mod field_layout;
pub mod format;
pub mod raw_buffer;
pub mod span;
pub mod structured;
#[cfg(test)]
mod tests;

pub use bit_view::{BitView, BitViewMut};
pub use endian::{Endianness, Propagation, StorageMode};
pub use field_layout::FieldLayout;
pub use format::{FieldRadix, FormatOptions};
pub use raw_buffer::{RawBuffer, share_bytes};
pub use span::BitSpan;
pub use structured::{StructuredBuffer, first_nonempty_field};
