//! Search command implementation

use anyhow::{Context, Result};
use protolyzer_data::{Endianness, FieldLayout, RawBuffer, first_nonempty_field};

use crate::utils::parse_buffer;

pub fn run(hex: &str, endianness: Endianness, widths: &[usize], start: usize) -> Result<()> {
    let buffer = parse_buffer(hex, endianness)?;
    match search(&buffer, widths, start)? {
        Some(index) => println!("First non-empty field: {index}"),
        None => println!("No non-empty field at or after {start}"),
    }
    Ok(())
}

pub fn search(buffer: &RawBuffer<'_>, widths: &[usize], start: usize) -> Result<Option<usize>> {
    let layout = FieldLayout::from_bits(widths).context("Invalid field widths")?;
    let found = first_nonempty_field(buffer, &layout, start)
        .with_context(|| format!("Failed to scan {} fields from {start}", layout.len()))?;
    log::debug!("search from field {start} over {} fields: {found:?}", layout.len());
    Ok(found)
}
