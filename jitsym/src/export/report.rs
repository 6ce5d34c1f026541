use anyhow::{Context, Result};
use rustc_demangle::demangle;
use serde::Serialize;
use std::io::Write;

use crate::domain::SymbolName;
use crate::symbolization::SymbolTable;

/// Demangle a Rust symbol name, returning other names unchanged
#[must_use]
pub fn demangle_symbol(symbol: &str) -> String {
    format!("{:#}", demangle(symbol))
}

/// Outcome of resolving one address
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: u64,
    /// `None` when no published range covers the address
    pub symbol: Option<String>,
}

/// One range of a symbol table dump
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableEntry {
    pub start: u64,
    pub end: u64,
    pub symbol: String,
}

/// Collected output of one CLI run
#[derive(Debug, Default, Serialize)]
pub struct SymbolReport {
    #[serde(skip)]
    demangle: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resolved: Vec<ResolvedAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    table: Vec<TableEntry>,
}

impl SymbolReport {
    #[must_use]
    pub fn new(demangle: bool) -> Self {
        Self { demangle, ..Self::default() }
    }

    fn display_name(&self, name: &SymbolName) -> String {
        if self.demangle {
            demangle_symbol(name.as_str())
        } else {
            name.as_str().to_string()
        }
    }

    pub fn add_resolved(&mut self, address: u64, symbol: Option<&SymbolName>) {
        let symbol = symbol.map(|name| self.display_name(name));
        self.resolved.push(ResolvedAddress { address, symbol });
    }

    pub fn add_table(&mut self, table: &SymbolTable) {
        for range in table {
            let symbol = self.display_name(&range.name);
            self.table.push(TableEntry { start: range.start, end: range.end, symbol });
        }
    }

    #[must_use]
    pub fn resolved(&self) -> &[ResolvedAddress] {
        &self.resolved
    }

    #[must_use]
    pub fn table(&self) -> &[TableEntry] {
        &self.table
    }

    /// Write one line per entry
    ///
    /// # Errors
    /// Returns an error if writing to `out` fails
    pub fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        for entry in &self.table {
            writeln!(out, "{:016x}-{:016x} {}", entry.start, entry.end, entry.symbol)?;
        }
        for entry in &self.resolved {
            let symbol = entry.symbol.as_deref().unwrap_or("<unknown>");
            writeln!(out, "0x{:016x} {symbol}", entry.address)?;
        }
        Ok(())
    }

    /// Write the report as a JSON object
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self).context("Failed to serialize report")?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn name(text: &str) -> SymbolName {
        SymbolName::new(text, Arc::from(Path::new("[test]")))
    }

    #[test]
    fn test_demangle_symbol() {
        assert_eq!(demangle_symbol("_ZN4core3fmt5write17h0123456789abcdefE"), "core::fmt::write");
        assert_eq!(demangle_symbol("Program::Main()"), "Program::Main()");
    }

    #[test]
    fn test_text_output() {
        let mut report = SymbolReport::new(false);
        report.add_resolved(0x1050, Some(&name("A")));
        report.add_resolved(0x1900, None);

        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0x0000000000001050 A\n0x0000000000001900 <unknown>\n"
        );
    }

    #[test]
    fn test_json_output() {
        let mut report = SymbolReport::new(true);
        report.add_resolved(0x10, Some(&name("_ZN4core3fmt5write17h0123456789abcdefE")));

        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["resolved"][0]["address"], 16);
        assert_eq!(parsed["resolved"][0]["symbol"], "core::fmt::write");
        assert!(parsed.get("table").is_none());
        assert!(parsed.get("demangle").is_none());
    }
}
