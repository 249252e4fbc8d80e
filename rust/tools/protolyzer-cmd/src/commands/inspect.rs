//! Inspect command implementation

use anyhow::{Context, Result};
use protolyzer_data::{
    Endianness, FieldLayout, FormatOptions, RawBuffer, StructuredBuffer, format,
};
use serde::Serialize;

use crate::utils::parse_buffer;

/// Field widths given on the command line.
pub enum Widths {
    Bits(Vec<usize>),
    Bytes(Vec<usize>),
}

#[derive(Serialize)]
pub struct InspectSummary {
    length_bytes: usize,
    length_bits: usize,
    endianness: String,
    hex: String,
    bits: String,
    popcount: usize,
    printable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutInfo>,
}

#[derive(Serialize)]
struct LayoutInfo {
    formatted: String,
    fields: Vec<FieldInfo>,
}

#[derive(Serialize)]
struct FieldInfo {
    index: usize,
    offset: usize,
    width: usize,
    popcount: usize,
    /// Hex value of fields up to 128 bits wide.
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

pub fn run(
    hex: &str,
    endianness: Endianness,
    widths: Option<Widths>,
    options: &FormatOptions,
    json: bool,
) -> Result<()> {
    let buffer = parse_buffer(hex, endianness)?;
    let summary = summarize(&buffer, widths.as_ref(), options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

pub fn summarize(
    buffer: &RawBuffer<'_>,
    widths: Option<&Widths>,
    options: &FormatOptions,
) -> Result<InspectSummary> {
    let bits = buffer.bits();
    let layout = widths
        .map(|widths| describe_layout(buffer, widths, options))
        .transpose()?;
    Ok(InspectSummary {
        length_bytes: buffer.len_bytes(),
        length_bits: buffer.len_bits(),
        endianness: buffer.endianness().to_string(),
        hex: buffer.to_hex_string_with(options),
        bits: bits.to_bit_string_with(options),
        popcount: bits.count(),
        printable: buffer.to_printable_string('.'),
        layout,
    })
}

fn describe_layout(
    buffer: &RawBuffer<'_>,
    widths: &Widths,
    options: &FormatOptions,
) -> Result<LayoutInfo> {
    let layout = match widths {
        Widths::Bits(bits) => FieldLayout::from_bits(bits),
        Widths::Bytes(bytes) => FieldLayout::from_bytes(bytes),
    }
    .context("Invalid field widths")?;

    let mut structured = StructuredBuffer::with_endianness(buffer.endianness());
    structured
        .assign_reference(buffer.as_cells(), layout.clone())
        .context("Layout does not cover the buffer")?;

    let fields = layout
        .spans()
        .enumerate()
        .map(|(index, span)| -> Result<FieldInfo> {
            let value = if span.len() <= 128 {
                let value = structured.get_field_value::<u128>(index)?;
                Some(format::hex_value(
                    value,
                    span.len().div_ceil(4),
                    options.uppercase,
                ))
            } else {
                None
            };
            Ok(FieldInfo {
                index,
                offset: span.start(),
                width: span.len(),
                popcount: structured.field_count_ones(index)?,
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LayoutInfo {
        formatted: structured.to_formatted_string_with(options)?,
        fields,
    })
}

fn print_summary(summary: &InspectSummary) {
    println!("Length:     {} bytes ({} bits)", summary.length_bytes, summary.length_bits);
    println!("Endianness: {}", summary.endianness);
    println!("Hex:        {}", summary.hex);
    println!("Bits:       {}", summary.bits);
    println!("Popcount:   {}", summary.popcount);
    println!("Printable:  {}", summary.printable);
    if let Some(layout) = &summary.layout {
        println!("Fields:     {}", layout.formatted);
        for field in &layout.fields {
            println!(
                "  [{}] offset {} width {} popcount {}{}",
                field.index,
                field.offset,
                field.width,
                field.popcount,
                field
                    .value
                    .as_ref()
                    .map(|value| format!(" value 0x{value}"))
                    .unwrap_or_default()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_without_layout() {
        let buffer = parse_buffer("B00F", Endianness::Big).unwrap();
        let summary = summarize(&buffer, None, &FormatOptions::default()).unwrap();
        assert_eq!(summary.length_bytes, 2);
        assert_eq!(summary.hex, "B00F");
        assert_eq!(summary.bits, "10110000 00001111");
        assert_eq!(summary.popcount, 7);
        assert!(summary.layout.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["endianness"], "big");
        assert!(json.get("layout").is_none());
    }

    #[test]
    fn test_summarize_with_layout() {
        let buffer = parse_buffer("B000", Endianness::Big).unwrap();
        let widths = Widths::Bits(vec![4, 4, 8]);
        let summary = summarize(&buffer, Some(&widths), &FormatOptions::default()).unwrap();
        let layout = summary.layout.unwrap();
        assert_eq!(layout.formatted, "1011 | 0000 | 00");
        assert_eq!(layout.fields.len(), 3);
        assert_eq!(layout.fields[0].value.as_deref(), Some("B"));
        assert_eq!(layout.fields[0].popcount, 3);
        assert_eq!(layout.fields[2].offset, 8);
        assert_eq!(layout.fields[2].value.as_deref(), Some("00"));
    }

    #[test]
    fn test_summarize_little_endian_bytes() {
        let buffer = parse_buffer("0C00FF00", Endianness::Little).unwrap();
        let widths = Widths::Bytes(vec![1, 1, 2]);
        let summary = summarize(&buffer, Some(&widths), &FormatOptions::default()).unwrap();
        assert_eq!(summary.hex, "00FF000C");
        let layout = summary.layout.unwrap();
        assert_eq!(layout.fields[2].value.as_deref(), Some("00FF"));
    }

    #[test]
    fn test_summarize_bad_layout() {
        let buffer = parse_buffer("B000", Endianness::Big).unwrap();
        let widths = Widths::Bits(vec![4, 4]);
        assert!(summarize(&buffer, Some(&widths), &FormatOptions::default()).is_err());
        let widths = Widths::Bytes(vec![]);
        assert!(summarize(&buffer, Some(&widths), &FormatOptions::default()).is_err());
    }
}
