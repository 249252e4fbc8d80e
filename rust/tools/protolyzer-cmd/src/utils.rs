//! Common utilities for protolyzer-cmd

use anyhow::{Context, Result};
use protolyzer_data::{Endianness, FormatOptions, RawBuffer, format};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Loads formatting options from a JSON file, or the defaults if no path is
/// given. Missing keys keep their default values.
pub fn load_format_options(path: Option<&str>) -> Result<FormatOptions> {
    let Some(path) = path else {
        return Ok(FormatOptions::default());
    };
    validate_file_exists(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {path}"))?;
    let options: FormatOptions = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {path}"))?;
    log::debug!("loaded format options from {path}: {options:?}");
    Ok(options)
}

/// Checks if a file exists and is readable
pub fn validate_file_exists(path: &str) -> Result<()> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    Ok(())
}

/// Parses a hex argument into an owned buffer labelled with `endianness`.
pub fn parse_buffer(hex: &str, endianness: Endianness) -> Result<RawBuffer<'static>> {
    let bytes = format::parse_hex(hex).with_context(|| format!("Invalid hex input: {hex}"))?;
    if bytes.is_empty() {
        anyhow::bail!("Empty hex input");
    }
    Ok(RawBuffer::copy_from_slice(&bytes, endianness))
}
