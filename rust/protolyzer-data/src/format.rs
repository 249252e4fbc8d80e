//! Text renderings of binary data: hex, bit strings and printable ASCII.
//!
//! [`FormatOptions`] is the configuration value consumed by every renderer in
//! this crate. It is serializable so that tools can load it from a file.

use itertools::Itertools;
use protolyzer_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// How a single field is rendered by structured formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRadix {
    /// Hex for byte-aligned fields, binary for all others.
    #[default]
    Auto,
    Hex,
    Binary,
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Use upper-case hex digits.
    pub uppercase: bool,
    /// Inserted between the two-digit groups of a hex string.
    pub byte_separator: String,
    /// Inserted between the 8-bit groups of a bit string.
    pub bit_group_separator: String,
    /// Inserted between fields of a structured rendering.
    pub field_separator: String,
    pub field_radix: FieldRadix,
    /// Prefix every field with `[index]`.
    pub show_field_index: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            uppercase: true,
            byte_separator: String::new(),
            bit_group_separator: " ".to_string(),
            field_separator: " | ".to_string(),
            field_radix: FieldRadix::Auto,
            show_field_index: false,
        }
    }
}

/// Renders `value` as hex, zero-padded to `width` digits.
pub fn hex_value(value: u128, width: usize, uppercase: bool) -> String {
    if uppercase {
        format!("{value:0width$X}")
    } else {
        format!("{value:0width$x}")
    }
}

/// Renders bytes as two-digit hex groups, in iteration order.
pub fn hex_string(
    bytes: impl IntoIterator<Item = u8>,
    uppercase: bool,
    separator: &str,
) -> String {
    bytes
        .into_iter()
        .map(|byte| hex_value(byte as u128, 2, uppercase))
        .join(separator)
}

/// Renders bits as `0`/`1` characters in groups of 8.
pub fn bit_string(bits: impl IntoIterator<Item = bool>, group_separator: &str) -> String {
    bits.into_iter()
        .chunks(8)
        .into_iter()
        .map(|group| group.map(|bit| if bit { '1' } else { '0' }).collect::<String>())
        .join(group_separator)
}

#[inline]
pub fn is_printable(byte: u8) -> bool {
    (0x20..0x7f).contains(&byte)
}

/// Replaces every non-printable byte with `symbol`, in place.
pub fn replace_non_printable(bytes: &mut [u8], symbol: u8) {
    bytes
        .iter_mut()
        .filter(|byte| !is_printable(**byte))
        .for_each(|byte| *byte = symbol);
}

/// Renders bytes as ASCII text, with non-printable bytes shown as `symbol`.
pub fn printable_string(bytes: impl IntoIterator<Item = u8>, symbol: char) -> String {
    bytes
        .into_iter()
        .map(|byte| if is_printable(byte) { byte as char } else { symbol })
        .collect()
}

/// Parses hex text into bytes.
///
/// An optional `0x` prefix is accepted, and whitespace, `:`, `-` and `_` are
/// ignored between digits.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits = text
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(*c, ':' | '-' | '_')))
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| Error::invalid_format("hex", format!("unexpected character '{c}'")))
        })
        .collect::<Result<Vec<u8>>>()?;
    if digits.len() % 2 != 0 {
        return protolyzer_common::result::invalid_format("hex", "odd number of digits");
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_value() {
        assert_eq!(hex_value(0xAB, 2, true), "AB");
        assert_eq!(hex_value(0xAB, 4, false), "00ab");
        assert_eq!(hex_value(0, 2, true), "00");
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string([0x0C, 0xFF, 0x00], true, ""), "0CFF00");
        assert_eq!(hex_string([0x0C, 0xFF], false, " "), "0c ff");
        assert_eq!(hex_string([], true, " "), "");
    }

    #[test]
    fn test_bit_string() {
        let bits = [true, false, true, true, false, false, false, false, true];
        assert_eq!(bit_string(bits, " "), "10110000 1");
        assert_eq!(bit_string(bits, ""), "101100001");
    }

    #[test]
    fn test_printable() {
        let mut data = *b"GET\r\n\x00/";
        replace_non_printable(&mut data, b'.');
        assert_eq!(&data, b"GET.../");
        assert_eq!(printable_string(*b"a\x7fb", '?'), "a?b");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("B000").unwrap(), vec![0xB0, 0x00]);
        assert_eq!(parse_hex("0xde ad:be-ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("ABC").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_format_options_serde_defaults() {
        let options: FormatOptions =
            serde_json::from_str(r#"{ "uppercase": false, "field_radix": "binary" }"#).unwrap();
        assert!(!options.uppercase);
        assert_eq!(options.field_radix, FieldRadix::Binary);
        assert_eq!(options.field_separator, " | ");
        assert_eq!(options.bit_group_separator, " ");
    }
}
