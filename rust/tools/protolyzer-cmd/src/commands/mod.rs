//! Command implementations for protolyzer-cmd

pub mod combine;
pub mod inspect;
pub mod rotate;
pub mod search;
