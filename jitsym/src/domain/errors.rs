//! Structured error types for jitsym
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! None of these ever reach a `resolve` caller; they describe why a line was
//! skipped or why a scan stopped early.

use std::path::PathBuf;
use thiserror::Error;

/// Why a map file line was not turned into a symbol range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerfMapLineError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid hex in {field} field: {value:?}")]
    InvalidHex { field: &'static str, value: String },

    #[error("start address is zero")]
    ZeroAddress,

    #[error("symbol size is zero")]
    ZeroSize,

    #[error("range 0x{start:x}+0x{size:x} overflows the address space")]
    RangeOverflow { start: u64, size: u64 },
}

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Failed to read symbol map {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove symbol map {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
