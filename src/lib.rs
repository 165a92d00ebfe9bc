//! # Sepindex
//!
//! A separate-file ("sep") postings codec for inverted indexes.
//!
//! Each per-term postings list is spread across independent files: document
//! deltas, term frequencies and position deltas each live in their own
//! integer stream, raw payload bytes and multi-level skip data in two plain
//! byte streams. A term dictionary above this crate stores the compact
//! per-term seek state produced by the writer and hands it back to the
//! reader to locate postings without any extra lookup.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Pluggable storage backends (file system, memory)
//! - Pluggable integer stream encodings with replayable bookmarks
//! - Multi-level skip lists for sub-linear `advance(target)`
//! - Soft-delete aware iteration via an external live-docs bitset

pub mod error;
pub mod int_stream;
pub mod postings;
pub mod schema;
pub mod storage;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
