//! Report output
//!
//! Formats resolution results and symbol table dumps as plain text for
//! terminals or JSON for other tooling.

pub mod report;

pub use report::{demangle_symbol, ResolvedAddress, SymbolReport, TableEntry};
