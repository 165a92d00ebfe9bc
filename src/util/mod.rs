//! Shared utilities.

pub mod header;
pub mod varint;
