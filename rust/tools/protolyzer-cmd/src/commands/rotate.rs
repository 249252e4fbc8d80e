//! Rotate command implementation

use anyhow::Result;
use protolyzer_data::{Endianness, FormatOptions, RawBuffer};

use crate::utils::parse_buffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Left(usize),
    Right(usize),
}

pub fn run(
    hex: &str,
    endianness: Endianness,
    rotation: Rotation,
    options: &FormatOptions,
) -> Result<()> {
    let mut buffer = parse_buffer(hex, endianness)?;
    println!("Before: {}", buffer.bits().to_bit_string_with(options));
    rotate(&mut buffer, rotation)?;
    println!("After:  {}", buffer.bits().to_bit_string_with(options));
    println!("Hex:    {}", buffer.to_hex_string_with(options));
    Ok(())
}

pub fn rotate(buffer: &mut RawBuffer<'_>, rotation: Rotation) -> Result<()> {
    let mut bits = buffer.bits_mut();
    match rotation {
        Rotation::Left(n) => bits.round_shift_left(n)?,
        Rotation::Right(n) => bits.round_shift_right(n)?,
    }
    Ok(())
}
