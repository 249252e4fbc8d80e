//! Owned-or-referenced byte buffers with an endianness label.

use std::cell::Cell;
use std::ops::Range;

use bytemuck::Pod;
use protolyzer_common::{Result, verify_index, verify_state};

use crate::bit_view::{BitView, BitViewMut};
use crate::endian::{Endianness, Propagation, StorageMode};
use crate::format::{self, FormatOptions};

/// Turns caller memory into the aliasable form accepted by
/// [`RawBuffer::assign_reference`].
///
/// Every view created from the returned slice observes the writes of the
/// others. The borrow of `bytes` lasts as long as any such view.
#[inline]
pub fn share_bytes(bytes: &mut [u8]) -> &[Cell<u8>] {
    Cell::from_mut(bytes).as_slice_of_cells()
}

#[derive(Clone)]
enum Storage<'a> {
    Owned(Box<[Cell<u8>]>),
    Reference(&'a [Cell<u8>]),
}

impl Storage<'_> {
    fn empty() -> Storage<'static> {
        Storage::Owned(Box::default())
    }

    fn copy_of(bytes: impl IntoIterator<Item = u8>) -> Storage<'static> {
        Storage::Owned(bytes.into_iter().map(Cell::new).collect())
    }

    #[inline]
    fn cells(&self) -> &[Cell<u8>] {
        match self {
            Storage::Owned(cells) => cells,
            Storage::Reference(cells) => cells,
        }
    }
}

/// A contiguous byte sequence that either owns its bytes or aliases memory
/// owned by the caller, together with the endianness under which the bytes are
/// interpreted.
///
/// # Storage
///
/// - **Owned**: created by [`RawBuffer::assign_data`], [`RawBuffer::assign_bytes`],
///   [`RawBuffer::copy_from_slice`] or as the result of a boolean operation.
/// - **Reference**: created by [`RawBuffer::assign_reference`]. The buffer borrows
///   `'a` memory shared through [`Cell`]s, so the source cannot be released while
///   the view exists, and other views of the same memory see each other's
///   writes.
///
/// # Propagation
///
/// Writes through a reference buffer either land in the shared memory
/// ([`Propagation::Dependent`]) or first copy the bytes into private storage
/// ([`Propagation::Independent`], copy-on-write). Owned buffers are never
/// aliased while they are being written, so the mode makes no difference for
/// them.
///
/// # Bit order
///
/// Bit 0 is the most significant bit of the first *logical* byte; logical byte
/// `j` is physical byte `j` under big endian and physical byte `len - 1 - j`
/// under little endian. Changing the endianness is O(1) and never moves bytes.
#[derive(Clone)]
pub struct RawBuffer<'a> {
    storage: Storage<'a>,
    endianness: Endianness,
    default_endianness: Endianness,
    propagation: Propagation,
}

impl RawBuffer<'static> {
    /// Creates an owned buffer holding a copy of `bytes`.
    pub fn copy_from_slice(bytes: &[u8], endianness: Endianness) -> RawBuffer<'static> {
        RawBuffer {
            storage: Storage::copy_of(bytes.iter().copied()),
            endianness,
            default_endianness: endianness,
            propagation: Propagation::default(),
        }
    }

    /// Creates an owned buffer from bytes listed most-significant first.
    pub(crate) fn from_logical(logical: &[u8], endianness: Endianness) -> RawBuffer<'static> {
        let len = logical.len();
        let physical = (0..len).map(|p| logical[endianness.physical_index(p, len)]);
        RawBuffer {
            storage: Storage::copy_of(physical),
            endianness,
            default_endianness: endianness,
            propagation: Propagation::default(),
        }
    }
}

impl<'a> RawBuffer<'a> {
    /// Creates an empty buffer labelled with the host byte order.
    pub fn new() -> RawBuffer<'a> {
        Self::with_default_endianness(Endianness::native())
    }

    /// Creates an empty buffer whose assignments are labelled with `endianness`.
    pub fn with_default_endianness(endianness: Endianness) -> RawBuffer<'a> {
        RawBuffer {
            storage: Storage::empty(),
            endianness,
            default_endianness: endianness,
            propagation: Propagation::default(),
        }
    }

    /// Creates a buffer aliasing `cells`.
    pub fn reference(cells: &'a [Cell<u8>], endianness: Endianness) -> Result<RawBuffer<'a>> {
        let mut buffer = Self::with_default_endianness(endianness);
        buffer.assign_reference(cells)?;
        Ok(buffer)
    }

    /// Replaces the content with an owned copy of the bytes of `values`.
    ///
    /// The endianness is reset to the buffer's default.
    pub fn assign_data<T: Pod>(&mut self, values: &[T]) -> Result<()> {
        self.assign_bytes(bytemuck::cast_slice(values))
    }

    /// Replaces the content with an owned copy of `bytes`.
    ///
    /// The endianness is reset to the buffer's default.
    pub fn assign_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        verify_state!("RawBuffer.assign_data", !bytes.is_empty());
        self.storage = Storage::copy_of(bytes.iter().copied());
        self.endianness = self.default_endianness;
        Ok(())
    }

    /// Replaces the content with a reference to `cells`; no bytes are copied.
    ///
    /// The endianness is reset to the buffer's default.
    pub fn assign_reference(&mut self, cells: &'a [Cell<u8>]) -> Result<()> {
        verify_state!("RawBuffer.assign_reference", !cells.is_empty());
        self.storage = Storage::Reference(cells);
        self.endianness = self.default_endianness;
        Ok(())
    }

    /// Releases owned memory or drops the reference. Idempotent.
    pub fn clear(&mut self) {
        self.storage = Storage::empty();
        self.endianness = self.default_endianness;
    }

    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.storage.cells().len()
    }

    #[inline]
    pub fn len_bits(&self) -> usize {
        self.len_bytes() * 8
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len_bytes() == 0
    }

    pub fn mode(&self) -> StorageMode {
        match self.storage {
            Storage::Owned(_) => StorageMode::Owned,
            Storage::Reference(_) => StorageMode::Reference,
        }
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Relabels the byte order. The stored bytes are not touched.
    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    pub fn default_endianness(&self) -> Endianness {
        self.default_endianness
    }

    #[inline]
    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Sets the propagation used by writes that do not name one explicitly.
    pub fn set_propagation(&mut self, propagation: Propagation) {
        self.propagation = propagation;
    }

    /// The underlying cells, in physical order.
    ///
    /// Passing them to [`RawBuffer::reference`] creates a dependent view of this
    /// buffer's memory.
    #[inline]
    pub fn as_cells(&self) -> &[Cell<u8>] {
        self.storage.cells()
    }

    /// Returns logical byte `index` (0 is the most significant byte).
    pub fn byte(&self, index: usize) -> Result<u8> {
        verify_index!("RawBuffer.byte", index, self.len_bytes());
        let physical = self.endianness.physical_index(index, self.len_bytes());
        Ok(self.as_cells()[physical].get())
    }

    /// Overwrites logical byte `index`, honouring the buffer's propagation.
    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<()> {
        verify_index!("RawBuffer.set_byte", index, self.len_bytes());
        self.prepare_write(self.propagation);
        let physical = self.endianness.physical_index(index, self.len_bytes());
        self.as_cells()[physical].set(value);
        Ok(())
    }

    /// Copy of the bytes in physical (memory) order.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_cells().iter().map(Cell::get).collect()
    }

    /// Copy of the bytes in logical (most significant first) order.
    pub fn to_logical_vec(&self) -> Vec<u8> {
        self.bits().logical_bytes().collect()
    }

    /// Renders the bytes as upper-case two-digit hex groups in logical order.
    pub fn to_hex_string(&self) -> String {
        self.to_hex_string_with(&FormatOptions::default())
    }

    pub fn to_hex_string_with(&self, options: &FormatOptions) -> String {
        format::hex_string(
            self.bits().logical_bytes(),
            options.uppercase,
            &options.byte_separator,
        )
    }

    /// Renders the bytes in memory order as ASCII, replacing non-printable
    /// bytes with `symbol`.
    pub fn to_printable_string(&self, symbol: char) -> String {
        format::printable_string(self.as_cells().iter().map(Cell::get), symbol)
    }

    /// A read-only bit view over the whole buffer.
    #[inline]
    pub fn bits(&self) -> BitView<'_> {
        BitView::new(self.as_cells(), self.endianness)
    }

    /// A mutating bit view over the whole buffer.
    ///
    /// With [`Propagation::Independent`], a reference buffer is detached into
    /// private storage first.
    pub fn bits_mut(&mut self) -> BitViewMut<'_> {
        self.prepare_write(self.propagation);
        BitViewMut::new(self.as_cells(), self.endianness)
    }

    /// Replaces a reference with a private copy of the referenced bytes.
    /// No-op for owned buffers.
    pub fn detach(&mut self) {
        if let Storage::Reference(cells) = self.storage {
            log::debug!("RawBuffer: detaching {} referenced bytes", cells.len());
            self.storage = Storage::copy_of(cells.iter().map(Cell::get));
        }
    }

    /// A deep copy with owned storage and the same labels.
    pub fn to_owned_buffer(&self) -> RawBuffer<'static> {
        RawBuffer {
            storage: Storage::copy_of(self.as_cells().iter().map(Cell::get)),
            endianness: self.endianness,
            default_endianness: self.default_endianness,
            propagation: self.propagation,
        }
    }

    pub(crate) fn prepare_write(&mut self, propagation: Propagation) {
        if propagation == Propagation::Independent {
            self.detach();
        }
    }

    /// A dependent view of the physical byte `range`.
    pub(crate) fn alias_range(&self, range: Range<usize>, endianness: Endianness) -> RawBuffer<'_> {
        RawBuffer {
            storage: Storage::Reference(&self.as_cells()[range]),
            endianness,
            default_endianness: endianness,
            propagation: Propagation::Dependent,
        }
    }

    /// An owned copy of the physical byte `range`.
    pub(crate) fn copy_range(&self, range: Range<usize>, endianness: Endianness) -> RawBuffer<'static> {
        RawBuffer {
            storage: Storage::copy_of(self.as_cells()[range].iter().map(Cell::get)),
            endianness,
            default_endianness: endianness,
            propagation: Propagation::Independent,
        }
    }
}

impl Default for RawBuffer<'_> {
    fn default() -> Self {
        RawBuffer::new()
    }
}

impl PartialEq for RawBuffer<'_> {
    /// Two buffers are equal when they carry the same label and the same bytes,
    /// regardless of ownership.
    fn eq(&self, other: &Self) -> bool {
        self.endianness == other.endianness
            && self.len_bytes() == other.len_bytes()
            && self
                .as_cells()
                .iter()
                .zip(other.as_cells())
                .all(|(l, r)| l.get() == r.get())
    }
}

impl Eq for RawBuffer<'_> {}

impl std::fmt::Debug for RawBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("mode", &self.mode())
            .field("endianness", &self.endianness)
            .field("propagation", &self.propagation)
            .field("data", &self.to_hex_string())
            .finish()
    }
}
