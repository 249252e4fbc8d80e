//! Bit-level computation over a [`RawBuffer`](crate::RawBuffer).
//!
//! [`BitView`] is a cheap, copyable, read-only handle obtained from
//! [`RawBuffer::bits`](crate::RawBuffer::bits): population count, bit tests,
//! integer extraction, boolean algebra and rendering. [`BitViewMut`] is obtained
//! from [`RawBuffer::bits_mut`](crate::RawBuffer::bits_mut) and adds single-bit
//! writes, rotations and shifts. Neither keeps state of its own; both interpret
//! the buffer under the endianness it had when the view was taken.

use std::cell::Cell;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Deref};

use num_traits::{NumCast, PrimInt, Unsigned};
use protolyzer_common::{
    Result,
    result::{capacity_overflow, invalid_index},
    verify_index, verify_size, verify_state,
};

use crate::endian::Endianness;
use crate::format;
use crate::raw_buffer::RawBuffer;
use crate::span::{BitCells, BitSpan};

/// Read-only bit view over a whole buffer.
#[derive(Clone, Copy)]
pub struct BitView<'v> {
    cells: &'v [Cell<u8>],
    endianness: Endianness,
}

impl<'v> BitView<'v> {
    #[inline]
    pub(crate) fn new(cells: &'v [Cell<u8>], endianness: Endianness) -> BitView<'v> {
        BitView { cells, endianness }
    }

    #[inline]
    fn bits(&self) -> BitCells<'v> {
        BitCells::new(
            self.cells,
            BitSpan::whole_bytes(self.cells.len()),
            self.endianness,
        )
    }

    /// Total number of bits.
    #[inline]
    pub fn length(&self) -> usize {
        self.cells.len() * 8
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Number of set bits. Independent of the endianness label.
    pub fn count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.get().count_ones() as usize)
            .sum()
    }

    /// Returns the value of bit `index`.
    pub fn test(&self, index: usize) -> Result<bool> {
        verify_index!("BitView.test", index, self.length());
        Ok(self.bits().get(index))
    }

    /// Returns `true` if every bit is set (vacuously true when empty).
    pub fn all(&self) -> bool {
        self.cells.iter().all(|cell| cell.get() == 0xFF)
    }

    /// Returns `true` if at least one bit is set.
    pub fn any(&self) -> bool {
        self.cells.iter().any(|cell| cell.get() != 0)
    }

    /// Returns `true` if no bit is set.
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Extracts bits `[from, to)` as an unsigned integer, most significant bit
    /// first.
    ///
    /// Fails with `InvalidIndex` if the range is empty or exceeds
    /// [`length`](Self::length), and with `CapacityOverflow` if it is wider
    /// than `T`.
    pub fn convert<T: PrimInt + Unsigned>(&self, from: usize, to: usize) -> Result<T> {
        read_unsigned(&self.bits(), from, to, "BitView.convert")
    }

    /// The bytes in logical (most significant first) order.
    pub fn logical_bytes(self) -> impl Iterator<Item = u8> + 'v {
        let len = self.cells.len();
        (0..len).map(move |logical| self.cells[self.endianness.physical_index(logical, len)].get())
    }

    /// Iterates over all bits, starting with bit 0.
    pub fn iter(self) -> impl Iterator<Item = bool> + 'v {
        let bits = self.bits();
        (0..bits.len()).map(move |k| bits.get(k))
    }

    /// Renders the bits in groups of 8, separated by a space.
    pub fn to_bit_string(&self) -> String {
        format::bit_string(self.iter(), " ")
    }

    pub fn to_bit_string_with(&self, options: &format::FormatOptions) -> String {
        format::bit_string(self.iter(), &options.bit_group_separator)
    }

    /// Bitwise XOR. See [`BitView::combine`] for the operand rules.
    pub fn xor(&self, other: &BitView<'_>) -> Result<RawBuffer<'static>> {
        self.combine(other, "BitView.xor", |l, r| l ^ r)
    }

    /// Bitwise AND. See [`BitView::combine`] for the operand rules.
    pub fn and(&self, other: &BitView<'_>) -> Result<RawBuffer<'static>> {
        self.combine(other, "BitView.and", |l, r| l & r)
    }

    /// Bitwise OR. See [`BitView::combine`] for the operand rules.
    pub fn or(&self, other: &BitView<'_>) -> Result<RawBuffer<'static>> {
        self.combine(other, "BitView.or", |l, r| l | r)
    }

    /// Combines two equally long views byte by byte.
    ///
    /// Each operand is read under its own endianness, so relabeling one operand
    /// changes the result. The result is a new owned buffer labelled with the
    /// left operand's endianness, whose logical bytes are the combined bytes.
    pub fn combine(
        &self,
        other: &BitView<'_>,
        name: &str,
        op: impl Fn(u8, u8) -> u8,
    ) -> Result<RawBuffer<'static>> {
        verify_size!(name, self.cells.len(), other.cells.len());
        let combined: Vec<u8> = self
            .logical_bytes()
            .zip(other.logical_bytes())
            .map(|(l, r)| op(l, r))
            .collect();
        Ok(RawBuffer::from_logical(&combined, self.endianness))
    }
}

impl fmt::Display for BitView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl fmt::Debug for BitView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitView")
            .field("endianness", &self.endianness)
            .field("bits", &self.to_bit_string())
            .finish()
    }
}

impl<'w> BitXor<BitView<'w>> for BitView<'_> {
    type Output = Result<RawBuffer<'static>>;

    fn bitxor(self, rhs: BitView<'w>) -> Self::Output {
        self.xor(&rhs)
    }
}

impl<'w> BitAnd<BitView<'w>> for BitView<'_> {
    type Output = Result<RawBuffer<'static>>;

    fn bitand(self, rhs: BitView<'w>) -> Self::Output {
        self.and(&rhs)
    }
}

impl<'w> BitOr<BitView<'w>> for BitView<'_> {
    type Output = Result<RawBuffer<'static>>;

    fn bitor(self, rhs: BitView<'w>) -> Self::Output {
        self.or(&rhs)
    }
}

/// Mutating bit view over a whole buffer.
///
/// Dereferences to [`BitView`] for the read-only operations.
pub struct BitViewMut<'v> {
    view: BitView<'v>,
}

impl<'v> BitViewMut<'v> {
    #[inline]
    pub(crate) fn new(cells: &'v [Cell<u8>], endianness: Endianness) -> BitViewMut<'v> {
        BitViewMut {
            view: BitView::new(cells, endianness),
        }
    }

    /// Sets bit `index` to `value`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        verify_index!("BitView.set", index, self.length());
        self.view.bits().set(index, value);
        Ok(())
    }

    /// Clears bit `index`.
    pub fn reset(&mut self, index: usize) -> Result<()> {
        self.set(index, false)
    }

    /// Flips bit `index`.
    pub fn invert(&mut self, index: usize) -> Result<()> {
        verify_index!("BitView.invert", index, self.length());
        let bits = self.view.bits();
        bits.set(index, !bits.get(index));
        Ok(())
    }

    pub fn set_all(&mut self) {
        self.view.cells.iter().for_each(|cell| cell.set(0xFF));
    }

    pub fn reset_all(&mut self) {
        self.view.cells.iter().for_each(|cell| cell.set(0));
    }

    pub fn invert_all(&mut self) {
        self.view.cells.iter().for_each(|cell| cell.set(!cell.get()));
    }

    /// Rotates the whole bit sequence left by `n mod length()` positions:
    /// bit `k` takes the value of bit `(k + n) mod length()`.
    pub fn round_shift_left(&mut self, n: usize) -> Result<()> {
        verify_state!("BitView.round_shift_left", !self.is_empty());
        let shift = n % self.length();
        if shift != 0 {
            let mut bytes: Vec<u8> = self.view.logical_bytes().collect();
            rotate_left(&mut bytes, shift);
            self.store_logical(&bytes);
        }
        Ok(())
    }

    /// Rotates the whole bit sequence right by `n mod length()` positions; the
    /// inverse of [`round_shift_left`](Self::round_shift_left).
    pub fn round_shift_right(&mut self, n: usize) -> Result<()> {
        verify_state!("BitView.round_shift_right", !self.is_empty());
        let length = self.length();
        self.round_shift_left(length - n % length)
    }

    /// Shifts left by `n` positions, filling vacated low-order bits with `fill`.
    pub fn shift_left(&mut self, n: usize, fill: bool) -> Result<()> {
        verify_state!("BitView.shift_left", !self.is_empty());
        let source: Vec<bool> = self.view.iter().collect();
        let bits = self.view.bits();
        for k in 0..source.len() {
            let value = k
                .checked_add(n)
                .and_then(|from| source.get(from).copied())
                .unwrap_or(fill);
            bits.set(k, value);
        }
        Ok(())
    }

    /// Shifts right by `n` positions, filling vacated high-order bits with `fill`.
    pub fn shift_right(&mut self, n: usize, fill: bool) -> Result<()> {
        verify_state!("BitView.shift_right", !self.is_empty());
        let source: Vec<bool> = self.view.iter().collect();
        let bits = self.view.bits();
        for k in 0..source.len() {
            let value = k.checked_sub(n).map_or(fill, |from| source[from]);
            bits.set(k, value);
        }
        Ok(())
    }

    fn store_logical(&self, logical: &[u8]) {
        let cells = self.view.cells;
        let len = cells.len();
        for (index, byte) in logical.iter().enumerate() {
            cells[self.view.endianness.physical_index(index, len)].set(*byte);
        }
    }
}

impl<'v> Deref for BitViewMut<'v> {
    type Target = BitView<'v>;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}

impl fmt::Display for BitViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view, f)
    }
}

/// Rotates a most-significant-first byte sequence left by `shift` bits,
/// `0 < shift < bytes.len() * 8`.
fn rotate_left(bytes: &mut [u8], shift: usize) {
    bytes.rotate_left(shift / 8);
    let rem = (shift % 8) as u32;
    if rem == 0 {
        return;
    }
    let first = bytes[0];
    let len = bytes.len();
    for index in 0..len {
        let next = if index + 1 < len { bytes[index + 1] } else { first };
        bytes[index] = (bytes[index] << rem) | (next >> (8 - rem));
    }
}

/// Reads bits `[from, to)` of `bits` into `T`, validating range and capacity.
pub(crate) fn read_unsigned<T: PrimInt + Unsigned>(
    bits: &BitCells<'_>,
    from: usize,
    to: usize,
    name: &str,
) -> Result<T> {
    if to > bits.len() {
        return invalid_index(name, to, bits.len());
    }
    verify_index!(name, from, to);
    let width = to - from;
    let capacity = std::mem::size_of::<T>() * 8;
    if width > capacity {
        return capacity_overflow(name, width, capacity);
    }
    match <T as NumCast>::from(bits.read(from, to)) {
        Some(value) => Ok(value),
        None => capacity_overflow(name, width, capacity),
    }
}
