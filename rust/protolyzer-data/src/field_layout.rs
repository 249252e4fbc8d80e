//! Field layouts: ordered bit widths describing how a buffer is partitioned.

use protolyzer_common::{
    Result,
    result::{invalid_arg, verify_arg},
    verify_index, verify_size, verify_state,
};

use crate::span::BitSpan;

/// An ordered, non-empty list of positive field widths in bits, with their
/// prefix sums.
///
/// Field `i` occupies the half-open bit range `[offset(i), offset(i + 1))`. A
/// layout is plain metadata: it can be built ad hoc and applied to any buffer
/// whose bit length equals [`total_bits`](Self::total_bits).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    widths: Vec<usize>,
    /// `offsets[i]` is the first bit of field `i`; `offsets[len]` is the total.
    offsets: Vec<usize>,
}

impl FieldLayout {
    /// Builds a layout from widths given in bits.
    ///
    /// Fails with `InvalidState` for an empty list and with `InvalidArgument`
    /// if any width is zero or the total, rounded up to whole bytes, does not
    /// fit in `usize`.
    pub fn from_bits(widths: &[usize]) -> Result<FieldLayout> {
        verify_state!("FieldLayout.widths", !widths.is_empty());
        verify_arg(
            widths.iter().all(|&width| width > 0),
            "FieldLayout.widths",
            "every width is positive",
        )?;
        let mut offsets = Vec::with_capacity(widths.len() + 1);
        let mut total = 0usize;
        offsets.push(total);
        for &width in widths {
            total = match total.checked_add(width) {
                Some(total) => total,
                None => return invalid_arg("FieldLayout.widths", "sum of widths overflows"),
            };
            offsets.push(total);
        }
        if total.checked_next_multiple_of(8).is_none() {
            return invalid_arg("FieldLayout.widths", "sum of widths overflows");
        }
        Ok(FieldLayout {
            widths: widths.to_vec(),
            offsets,
        })
    }

    /// Builds a layout from widths given in bytes.
    pub fn from_bytes(widths: &[usize]) -> Result<FieldLayout> {
        let bits = widths
            .iter()
            .map(|&width| match width.checked_mul(8) {
                Some(bits) => Ok(bits),
                None => invalid_arg("FieldLayout.widths", "width in bits overflows"),
            })
            .collect::<Result<Vec<usize>>>()?;
        Self::from_bits(&bits)
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Always `false`: a layout has at least one field.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    #[inline]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Sum of all widths.
    #[inline]
    pub fn total_bits(&self) -> usize {
        self.offsets[self.widths.len()]
    }

    /// Number of bytes covered, rounding up.
    pub fn total_bytes(&self) -> usize {
        self.total_bits().div_ceil(8)
    }

    /// Width of field `index` in bits.
    pub fn width(&self, index: usize) -> Result<usize> {
        verify_index!("FieldLayout.width", index, self.len());
        Ok(self.widths[index])
    }

    /// First bit of field `index`.
    pub fn offset(&self, index: usize) -> Result<usize> {
        verify_index!("FieldLayout.offset", index, self.len());
        Ok(self.offsets[index])
    }

    /// The bit span of field `index`.
    pub fn span(&self, index: usize) -> Result<BitSpan> {
        verify_index!("FieldLayout.span", index, self.len());
        Ok(self.span_unchecked(index))
    }

    #[inline]
    pub(crate) fn span_unchecked(&self, index: usize) -> BitSpan {
        BitSpan::new(self.offsets[index], self.widths[index])
    }

    /// Spans of all fields, in order.
    pub fn spans(&self) -> impl Iterator<Item = BitSpan> + '_ {
        (0..self.len()).map(|index| self.span_unchecked(index))
    }

    /// Returns `true` if every field starts and ends on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.spans().all(|span| span.is_byte_aligned())
    }

    /// Checks that the layout covers exactly `len_bits` bits.
    pub fn verify_covers(&self, len_bits: usize) -> Result<()> {
        verify_size!("FieldLayout.total_bits", len_bits, self.total_bits());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use protolyzer_common::error::{Error, ErrorKind};

    use super::*;

    #[test]
    fn test_from_bits() {
        let layout = FieldLayout::from_bits(&[4, 4, 8]).unwrap();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.total_bits(), 16);
        assert_eq!(layout.total_bytes(), 2);
        assert_eq!(layout.offset(2).unwrap(), 8);
        assert_eq!(layout.span(1).unwrap(), BitSpan::new(4, 4));
        assert!(!layout.is_byte_aligned());
    }

    #[test]
    fn test_from_bytes() {
        let layout = FieldLayout::from_bytes(&[4, 4, 1, 1, 2, 2, 2]).unwrap();
        assert_eq!(layout.total_bits(), 128);
        assert_eq!(layout.span(4).unwrap(), BitSpan::new(80, 16));
        assert!(layout.is_byte_aligned());
    }

    #[test]
    fn test_invalid_widths() {
        assert!(FieldLayout::from_bits(&[]).unwrap_err().is_invalid_state());
        let err = FieldLayout::from_bits(&[4, 0, 4]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(
            err.to_string(),
            "invalid argument FieldLayout.widths: every width is positive"
        );
        assert!(FieldLayout::from_bits(&[8]).unwrap().span(1).unwrap_err().is_invalid_index());
    }

    #[test]
    fn test_overflowing_widths() {
        let is_invalid_arg = |err: Error| matches!(err.kind(), ErrorKind::InvalidArgument { .. });
        assert!(is_invalid_arg(FieldLayout::from_bits(&[usize::MAX, 9]).unwrap_err()));
        assert!(is_invalid_arg(FieldLayout::from_bits(&[usize::MAX]).unwrap_err()));
        assert!(is_invalid_arg(FieldLayout::from_bytes(&[usize::MAX / 4]).unwrap_err()));
        assert!(is_invalid_arg(FieldLayout::from_bytes(&[usize::MAX / 8, 1]).unwrap_err()));

        let layout = FieldLayout::from_bits(&[usize::MAX - 7]).unwrap();
        assert_eq!(layout.total_bytes(), usize::MAX / 8);
        assert!(layout.verify_covers(8).unwrap_err().is_size_mismatch());
    }

    #[test]
    fn test_verify_covers() {
        let layout = FieldLayout::from_bits(&[32, 32, 4, 3, 3, 6, 9, 7, 16, 16]).unwrap();
        assert!(layout.verify_covers(128).is_ok());
        assert!(layout.verify_covers(120).unwrap_err().is_size_mismatch());
    }
}
