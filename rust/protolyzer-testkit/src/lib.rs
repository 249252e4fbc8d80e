//! Test utilities and fixtures for the Protolyzer crates.
//!
//! - [`data_gen`]: seeded random bytes, values and field layouts
//! - [`samples`]: captured protocol headers with their field widths

pub mod data_gen;
pub mod samples;
