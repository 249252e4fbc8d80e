//! Bit ranges over byte storage and the bit-order rule shared by every view.
//!
//! A [`BitSpan`] is a half-open range of bits in *layout space*: layout bit `p`
//! is bit `p % 8` (counted from the most significant bit) of physical byte
//! `p / 8`. Bit `k` of a span is, by default, layout bit `start + k`.
//!
//! A span that starts and ends on byte boundaries is additionally read under an
//! endianness label: under [`Endianness::Little`] its bytes are taken in reverse
//! memory order, so that bit 0 is always the most significant bit of the value
//! the span encodes. Spans that are not byte-aligned are always read in memory
//! order.

use std::cell::Cell;
use std::ops::Range;

use crate::endian::Endianness;

/// A half-open range `[start, start + len)` of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitSpan {
    start: usize,
    len: usize,
}

impl BitSpan {
    #[inline]
    pub const fn new(start: usize, len: usize) -> BitSpan {
        BitSpan { start, len }
    }

    /// The span covering `len_bytes` whole bytes from the beginning of storage.
    #[inline]
    pub const fn whole_bytes(len_bytes: usize) -> BitSpan {
        BitSpan::new(0, len_bytes * 8)
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns `true` if both ends of the span fall on byte boundaries.
    #[inline]
    pub fn is_byte_aligned(&self) -> bool {
        self.start % 8 == 0 && self.len % 8 == 0
    }

    /// The physical byte range covered by a byte-aligned span.
    pub fn byte_range(&self) -> Option<Range<usize>> {
        self.is_byte_aligned()
            .then(|| self.start / 8..self.end() / 8)
    }

    /// Maps span-local bit `k` to a physical `(byte index, bit mask)` pair.
    #[inline]
    pub fn locate(&self, k: usize, endianness: Endianness) -> (usize, u8) {
        debug_assert!(k < self.len, "bit {k} out of span (len: {})", self.len);
        let position = match endianness {
            Endianness::Little if self.is_byte_aligned() => {
                let len_bytes = self.len / 8;
                let logical = k / 8;
                let byte = self.start / 8 + Endianness::Little.physical_index(logical, len_bytes);
                byte * 8 + k % 8
            }
            _ => self.start + k,
        };
        (position / 8, 0x80u8 >> (position % 8))
    }

    /// Yields, for every physical byte the span touches, the byte index and
    /// the mask of the bits within that byte that belong to the span.
    ///
    /// The result does not depend on endianness: relabeling only permutes
    /// whole bytes inside a byte-aligned span.
    pub fn byte_masks(&self) -> impl Iterator<Item = (usize, u8)> + use<> {
        let (start, end) = (self.start, self.end());
        let bytes = if self.len == 0 {
            0..0
        } else {
            start / 8..end.div_ceil(8)
        };
        bytes.map(move |byte| {
            let base = byte * 8;
            let lo = start.max(base) - base;
            let hi = end.min(base + 8) - base;
            let mask = (0xFFu16 >> lo) & !(0xFFu16 >> hi);
            (byte, mask as u8)
        })
    }
}

/// Bit-level access to a span of shared byte cells.
///
/// Reading and writing go through [`Cell`], so several views may alias the
/// same storage on a single thread and observe each other's writes.
#[derive(Clone, Copy)]
pub(crate) struct BitCells<'v> {
    cells: &'v [Cell<u8>],
    span: BitSpan,
    endianness: Endianness,
}

impl<'v> BitCells<'v> {
    #[inline]
    pub fn new(cells: &'v [Cell<u8>], span: BitSpan, endianness: Endianness) -> BitCells<'v> {
        debug_assert!(span.end() <= cells.len() * 8);
        BitCells {
            cells,
            span,
            endianness,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.span.len()
    }

    #[inline]
    pub fn get(&self, k: usize) -> bool {
        let (byte, mask) = self.span.locate(k, self.endianness);
        self.cells[byte].get() & mask != 0
    }

    #[inline]
    pub fn set(&self, k: usize, value: bool) {
        let (byte, mask) = self.span.locate(k, self.endianness);
        let cell = &self.cells[byte];
        if value {
            cell.set(cell.get() | mask);
        } else {
            cell.set(cell.get() & !mask);
        }
    }

    /// Reads bits `[from, to)` as an unsigned number, most significant first.
    /// The caller guarantees `to - from <= 128`.
    pub fn read(&self, from: usize, to: usize) -> u128 {
        debug_assert!(to - from <= 128);
        (from..to).fold(0u128, |acc, k| (acc << 1) | self.get(k) as u128)
    }

    pub fn is_zero(&self) -> bool {
        self.span
            .byte_masks()
            .all(|(byte, mask)| self.cells[byte].get() & mask == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.span
            .byte_masks()
            .map(|(byte, mask)| (self.cells[byte].get() & mask).count_ones() as usize)
            .sum()
    }
}
