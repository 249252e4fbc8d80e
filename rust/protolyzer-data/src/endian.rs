//! Byte-order labels and write-propagation modes.

use serde::{Deserialize, Serialize};

/// The byte order under which a buffer's bytes are interpreted.
///
/// The label never moves bytes. It only decides which physical byte is the
/// most significant one when the buffer (or a byte-aligned field) is read as a
/// number: under [`Endianness::Big`] the first byte in memory is the most
/// significant, under [`Endianness::Little`] the last one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host.
    #[inline]
    pub const fn native() -> Endianness {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// Maps a logical (most-significant-first) byte position within a run of
    /// `len` bytes to its physical position.
    #[inline]
    pub fn physical_index(self, logical: usize, len: usize) -> usize {
        debug_assert!(logical < len);
        match self {
            Endianness::Big => logical,
            Endianness::Little => len - 1 - logical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::native()
    }
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Endianness {
    type Err = protolyzer_common::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" | "network" => Ok(Endianness::Big),
            "native" => Ok(Endianness::native()),
            _ => protolyzer_common::result::invalid_arg("endianness", s),
        }
    }
}

/// Whether a write lands in memory shared with other views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    /// The write is applied to the aliased bytes in place and is visible to
    /// every other view of the same memory.
    #[default]
    Dependent,
    /// The write is applied to a private copy taken on first mutation; the
    /// aliased memory stays untouched.
    Independent,
}

/// Ownership regime of a buffer's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// The buffer exclusively owns a copy of the bytes.
    Owned,
    /// The buffer aliases memory managed by someone else.
    Reference,
}
