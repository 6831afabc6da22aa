//! Core utilities for the typeport TypeScript generator.
//!
//! This crate provides the file-sink seam and string utilities used across
//! the typeport workspace.

mod sink;
mod utils;

// File output
pub use sink::{DiskSink, FileSink, MemorySink, WrittenFile, write_file};
// String utilities
pub use utils::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
