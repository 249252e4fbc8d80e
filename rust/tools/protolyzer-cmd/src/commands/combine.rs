//! Combine command implementation

use anyhow::{Context, Result};
use protolyzer_data::{Endianness, FormatOptions, RawBuffer};

use crate::utils::parse_buffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Op {
    Xor,
    And,
    Or,
}

pub fn run(
    left: &str,
    left_endian: Endianness,
    right: &str,
    right_endian: Endianness,
    op: Op,
    options: &FormatOptions,
) -> Result<()> {
    let left = parse_buffer(left, left_endian).context("Left operand")?;
    let right = parse_buffer(right, right_endian).context("Right operand")?;
    let result = combine(&left, &right, op)?;
    println!("Hex:      {}", result.to_hex_string_with(options));
    println!("Bits:     {}", result.bits().to_bit_string_with(options));
    println!("Popcount: {}", result.bits().count());
    Ok(())
}

pub fn combine(left: &RawBuffer<'_>, right: &RawBuffer<'_>, op: Op) -> Result<RawBuffer<'static>> {
    let (l, r) = (left.bits(), right.bits());
    let result = match op {
        Op::Xor => l ^ r,
        Op::And => l & r,
        Op::Or => l | r,
    };
    result.with_context(|| {
        format!(
            "Cannot combine {} bytes with {} bytes",
            left.len_bytes(),
            right.len_bytes()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine() {
        let left = parse_buffer("F00F", Endianness::Big).unwrap();
        let right = parse_buffer("FF00", Endianness::Big).unwrap();
        assert_eq!(combine(&left, &right, Op::Xor).unwrap().to_hex_string(), "0F0F");
        assert_eq!(combine(&left, &right, Op::And).unwrap().to_hex_string(), "F000");
        assert_eq!(combine(&left, &right, Op::Or).unwrap().to_hex_string(), "FF0F");
    }

    #[test]
    fn test_combine_mixed_endianness() {
        let left = parse_buffer("00FF", Endianness::Big).unwrap();
        let right = parse_buffer("00FF", Endianness::Little).unwrap();
        let result = combine(&left, &right, Op::Xor).unwrap();
        assert_eq!(result.to_hex_string(), "FFFF");
        assert_eq!(result.endianness(), Endianness::Big);
    }

    #[test]
    fn test_combine_length_mismatch() {
        let left = parse_buffer("00FF", Endianness::Big).unwrap();
        let right = parse_buffer("00", Endianness::Big).unwrap();
        let err = combine(&left, &right, Op::And).unwrap_err();
        assert!(err.to_string().contains("Cannot combine 2 bytes with 1 bytes"));
    }
}
