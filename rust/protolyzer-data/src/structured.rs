//! Field-indexed access to a buffer through an attached [`FieldLayout`].

use std::cell::Cell;

use bytemuck::Pod;
use itertools::Itertools;
use num_traits::{PrimInt, Unsigned};
use protolyzer_common::{
    Result,
    result::{invalid_arg, invalid_index, invalid_state, size_mismatch},
    verify_index, verify_size, verify_state,
};

use crate::bit_view::read_unsigned;
use crate::endian::{Endianness, Propagation};
use crate::field_layout::FieldLayout;
use crate::format::{self, FieldRadix, FormatOptions};
use crate::raw_buffer::RawBuffer;
use crate::span::{BitCells, BitSpan};

/// A [`RawBuffer`] with an attached [`FieldLayout`].
///
/// Fields follow memory order: field `i` covers layout bits
/// `[offset(i), offset(i + 1))`, where layout bit `p` is bit `p % 8` (from the
/// most significant bit) of byte `p / 8`. Inside a byte-aligned field, bits are
/// numbered under the buffer's endianness, so that bit 0 is the most
/// significant bit of the value the field encodes; other fields are numbered
/// in memory order.
///
/// Every field operation requires an assigned buffer and an attached layout
/// and fails with `InvalidState` otherwise. A failed operation never modifies
/// the buffer.
#[derive(Debug, Clone, Default)]
pub struct StructuredBuffer<'a> {
    buffer: RawBuffer<'a>,
    layout: Option<FieldLayout>,
}

impl<'a> StructuredBuffer<'a> {
    /// Creates an empty structured buffer labelled with the host byte order.
    pub fn new() -> StructuredBuffer<'a> {
        Self::with_endianness(Endianness::native())
    }

    /// Creates an empty structured buffer whose assignments are labelled with
    /// `endianness`.
    pub fn with_endianness(endianness: Endianness) -> StructuredBuffer<'a> {
        StructuredBuffer {
            buffer: RawBuffer::with_default_endianness(endianness),
            layout: None,
        }
    }

    /// Copies `source` into owned storage and attaches a layout built from
    /// widths given in bytes.
    ///
    /// Exactly `sum(byte_widths)` bytes are copied; `source` may be longer.
    pub fn assign_data_bytes(&mut self, source: &[u8], byte_widths: &[usize]) -> Result<()> {
        let layout = FieldLayout::from_bytes(byte_widths)?;
        self.assign_copy(source, layout)
    }

    /// Copies `source` into owned storage and attaches a layout built from
    /// widths given in bits. The widths must add up to whole bytes.
    pub fn assign_data_bits(&mut self, source: &[u8], bit_widths: &[usize]) -> Result<()> {
        let layout = FieldLayout::from_bits(bit_widths)?;
        self.assign_copy(source, layout)
    }

    /// Copies the bytes of a plain-old-data record and attaches a layout built
    /// from widths given in bytes.
    pub fn assign_value<T: Pod>(&mut self, value: &T, byte_widths: &[usize]) -> Result<()> {
        self.assign_data_bytes(bytemuck::bytes_of(value), byte_widths)
    }

    /// References caller memory without copying and attaches `layout`, which
    /// must cover `cells` exactly.
    pub fn assign_reference(&mut self, cells: &'a [Cell<u8>], layout: FieldLayout) -> Result<()> {
        layout.verify_covers(cells.len() * 8)?;
        self.buffer.assign_reference(cells)?;
        self.layout = Some(layout);
        Ok(())
    }

    fn assign_copy(&mut self, source: &[u8], layout: FieldLayout) -> Result<()> {
        const NAME: &str = "StructuredBuffer.assign_data";
        if layout.total_bits() % 8 != 0 {
            return size_mismatch(NAME, layout.total_bytes() * 8, layout.total_bits());
        }
        let total = layout.total_bytes();
        if source.len() < total {
            return size_mismatch(NAME, total, source.len());
        }
        self.buffer.assign_bytes(&source[..total])?;
        self.layout = Some(layout);
        Ok(())
    }

    /// Replaces the attached layout. The new layout must cover the buffer.
    pub fn attach_layout(&mut self, layout: FieldLayout) -> Result<()> {
        verify_state!("StructuredBuffer.attach_layout", !self.buffer.is_empty());
        layout.verify_covers(self.buffer.len_bits())?;
        log::debug!(
            "StructuredBuffer: attaching layout of {} fields over {} bytes",
            layout.len(),
            self.buffer.len_bytes()
        );
        self.layout = Some(layout);
        Ok(())
    }

    /// Releases the buffer and detaches the layout.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.layout = None;
    }

    pub fn layout(&self) -> Option<&FieldLayout> {
        self.layout.as_ref()
    }

    /// The underlying buffer.
    pub fn data(&self) -> &RawBuffer<'a> {
        &self.buffer
    }

    /// Number of fields of the attached layout (0 if none).
    pub fn field_count(&self) -> usize {
        self.layout.as_ref().map_or(0, FieldLayout::len)
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.buffer.endianness()
    }

    /// Relabels the byte order used inside byte-aligned fields.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.buffer.set_endianness(endianness);
    }

    pub fn propagation(&self) -> Propagation {
        self.buffer.propagation()
    }

    /// Sets the propagation used by [`set_field`](Self::set_field).
    pub fn set_propagation(&mut self, propagation: Propagation) {
        self.buffer.set_propagation(propagation);
    }

    fn attached(&self, name: &str) -> Result<&FieldLayout> {
        match &self.layout {
            Some(layout) if !self.buffer.is_empty() => Ok(layout),
            _ => invalid_state(name, "no buffer or layout assigned"),
        }
    }

    fn field_span(&self, index: usize, name: &str) -> Result<BitSpan> {
        let layout = self.attached(name)?;
        verify_index!(name, index, layout.len());
        Ok(layout.span_unchecked(index))
    }

    #[inline]
    fn field_bits(&self, span: BitSpan) -> BitCells<'_> {
        BitCells::new(self.buffer.as_cells(), span, self.buffer.endianness())
    }

    /// Width of field `index` in bits.
    pub fn field_width(&self, index: usize) -> Result<usize> {
        Ok(self.field_span(index, "StructuredBuffer.field_width")?.len())
    }

    /// Number of set bits in field `index`.
    pub fn field_count_ones(&self, index: usize) -> Result<usize> {
        let span = self.field_span(index, "StructuredBuffer.field_count_ones")?;
        Ok(self.field_bits(span).count_ones())
    }

    /// Extracts `bit_width` bits starting `bit_offset` bits into field `index`.
    ///
    /// Fails with `InvalidIndex` if the field does not exist or the bits run past
    /// its end (or `bit_width` is zero), and with `CapacityOverflow` if
    /// `bit_width` exceeds the width of `T`.
    pub fn get_sub_field<T: PrimInt + Unsigned>(
        &self,
        index: usize,
        bit_offset: usize,
        bit_width: usize,
    ) -> Result<T> {
        const NAME: &str = "StructuredBuffer.get_sub_field";
        let span = self.field_span(index, NAME)?;
        let Some(end) = bit_offset.checked_add(bit_width) else {
            return invalid_index(NAME, bit_offset, span.len());
        };
        read_unsigned(&self.field_bits(span), bit_offset, end, NAME)
    }

    /// The whole field `index` as an integer.
    pub fn get_field_value<T: PrimInt + Unsigned>(&self, index: usize) -> Result<T> {
        let width = self.field_width(index)?;
        self.get_sub_field(index, 0, width)
    }

    /// Overwrites field `index` with the native bytes of `value`.
    ///
    /// The size of `T` in bits must equal the field width. The write honours the
    /// buffer's propagation.
    pub fn set_field<T: Pod>(&mut self, index: usize, value: T) -> Result<()> {
        self.set_field_bytes(index, bytemuck::bytes_of(&value))
    }

    /// Overwrites field `index` with `bytes`, in memory order.
    ///
    /// For a field that is not byte-aligned, bit `k` of the field (in memory
    /// order) receives bit `k % 8` (from the most significant bit) of
    /// `bytes[k / 8]`.
    pub fn set_field_bytes(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        const NAME: &str = "StructuredBuffer.set_field";
        let span = self.field_span(index, NAME)?;
        verify_size!(NAME, span.len(), bytes.len() * 8);
        self.buffer.prepare_write(self.buffer.propagation());
        let bits = BitCells::new(self.buffer.as_cells(), span, Endianness::Big);
        for k in 0..span.len() {
            bits.set(k, bytes[k / 8] & (0x80 >> (k % 8)) != 0);
        }
        Ok(())
    }

    /// Reads bit `bit` of field `index`.
    pub fn get_field_bit(&self, index: usize, bit: usize) -> Result<bool> {
        const NAME: &str = "StructuredBuffer.get_field_bit";
        let span = self.field_span(index, NAME)?;
        verify_index!(NAME, bit, span.len());
        Ok(self.field_bits(span).get(bit))
    }

    /// Writes bit `bit` of field `index`.
    ///
    /// With [`Propagation::Dependent`] the write lands in the memory shared with
    /// every other view of it. With [`Propagation::Independent`] a referenced
    /// buffer is first detached into private storage, leaving the source
    /// untouched.
    pub fn set_field_bit(
        &mut self,
        index: usize,
        bit: usize,
        value: bool,
        propagation: Propagation,
    ) -> Result<()> {
        const NAME: &str = "StructuredBuffer.set_field_bit";
        let span = self.field_span(index, NAME)?;
        verify_index!(NAME, bit, span.len());
        self.buffer.prepare_write(propagation);
        self.field_bits(span).set(bit, value);
        Ok(())
    }

    /// Returns field `index` as a standalone buffer labelled with `endianness`.
    ///
    /// [`Propagation::Dependent`] aliases the field's bytes inside this buffer;
    /// [`Propagation::Independent`] returns an owned copy. Only byte-aligned
    /// fields can be extracted.
    pub fn get_field(
        &self,
        index: usize,
        propagation: Propagation,
        endianness: Endianness,
    ) -> Result<RawBuffer<'_>> {
        const NAME: &str = "StructuredBuffer.get_field";
        let span = self.field_span(index, NAME)?;
        let Some(range) = span.byte_range() else {
            return invalid_arg(NAME, &format!("field {index} is not byte-aligned"));
        };
        Ok(match propagation {
            Propagation::Dependent => self.buffer.alias_range(range, endianness),
            Propagation::Independent => self.buffer.copy_range(range, endianness),
        })
    }

    /// Zero-copy view of field `index`, labelled with the buffer's endianness.
    pub fn get_field_by_reference(&self, index: usize) -> Result<RawBuffer<'_>> {
        self.get_field(index, Propagation::Dependent, self.endianness())
    }

    /// Scans the buffer under a transient layout built from `bit_widths` and
    /// returns the index of the first field, at or after `start`, that has at
    /// least one bit set.
    ///
    /// The attached layout is not consulted or modified.
    pub fn get_nonempty_field_index(
        &self,
        start: usize,
        bit_widths: &[usize],
    ) -> Result<Option<usize>> {
        let layout = FieldLayout::from_bits(bit_widths)?;
        first_nonempty_field(&self.buffer, &layout, start)
    }

    /// Renders every field with the default [`FormatOptions`].
    pub fn to_formatted_string(&self) -> Result<String> {
        self.to_formatted_string_with(&FormatOptions::default())
    }

    /// Renders every field, hex or binary per `options.field_radix`, joined by
    /// `options.field_separator`.
    pub fn to_formatted_string_with(&self, options: &FormatOptions) -> Result<String> {
        let layout = self.attached("StructuredBuffer.to_formatted_string")?;
        Ok(layout
            .spans()
            .enumerate()
            .map(|(index, span)| {
                let text = self.format_field(span, options);
                if options.show_field_index {
                    format!("[{index}] {text}")
                } else {
                    text
                }
            })
            .join(&options.field_separator))
    }

    fn format_field(&self, span: BitSpan, options: &FormatOptions) -> String {
        let bits = self.field_bits(span);
        let hex = match options.field_radix {
            FieldRadix::Auto => span.is_byte_aligned(),
            FieldRadix::Hex => true,
            FieldRadix::Binary => false,
        };
        if hex && span.is_byte_aligned() {
            let bytes = (0..span.len() / 8).map(|byte| bits.read(byte * 8, byte * 8 + 8) as u8);
            format::hex_string(bytes, options.uppercase, &options.byte_separator)
        } else if hex && span.len() <= 128 {
            format::hex_value(bits.read(0, span.len()), span.len().div_ceil(4), options.uppercase)
        } else {
            format::bit_string((0..span.len()).map(|k| bits.get(k)), &options.bit_group_separator)
        }
    }
}

/// Returns the index of the first field of `layout`, at or after `start`, that
/// has at least one bit set in `buffer`, or `None` if all remaining fields are
/// zero.
///
/// `layout` must cover `buffer` exactly. The scan does not depend on the
/// buffer's endianness.
pub fn first_nonempty_field(
    buffer: &RawBuffer<'_>,
    layout: &FieldLayout,
    start: usize,
) -> Result<Option<usize>> {
    const NAME: &str = "first_nonempty_field";
    verify_state!(NAME, !buffer.is_empty());
    layout.verify_covers(buffer.len_bits())?;
    verify_index!(NAME, start, layout.len());
    let cells = buffer.as_cells();
    Ok((start..layout.len()).find(|&index| {
        !BitCells::new(cells, layout.span_unchecked(index), buffer.endianness()).is_zero()
    }))
}
