//! `perf-<pid>.map` line format
//!
//! Each line describes one dynamically generated code region:
//!
//! ```text
//! address          size name(may contain spaces)
//! 00007F7DD9DB0480 2d   instance bool [System.Private.CoreLib] dynamicClass::IL_STUB_UnboxingStub()
//! ```
//!
//! Address and size are hexadecimal. The name is everything from the first
//! byte of the third field to the end of the line, taken verbatim.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::domain::{PerfMapLineError, Pid};

/// Directory runtimes publish their map files into
pub const DEFAULT_MAP_DIR: &str = "/tmp";

/// Number of fields in a map line; the last one swallows the remainder
const FIELD_COUNT: usize = 3;

/// Build the map file path for a process: `<dir>/perf-<pid>.map`
#[must_use]
pub fn perf_map_path(dir: &Path, pid: Pid) -> PathBuf {
    // "perf-" + u32 digits + ".map" fits without reallocating
    let mut file_name = String::with_capacity(24);
    let _ = write!(file_name, "perf-{}.map", pid.0);
    dir.join(file_name)
}

/// One accepted map line, borrowing the name from the line it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfMapEntry<'a> {
    pub start: u64,
    pub size: u64,
    pub name: &'a str,
}

impl PerfMapEntry<'_> {
    /// Exclusive end of the region. Never overflows for a parsed entry.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + self.size
    }
}

/// Iterator over separator-delimited fields of a line
///
/// Runs of spaces and tabs separate fields. Once `max_fields - 1` fields have
/// been produced, the next field is the rest of the line, verbatim.
pub struct Fields<'a> {
    rest: &'a str,
    remaining: usize,
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl<'a> Iterator for Fields<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        let rest = self.rest.trim_start_matches(is_separator);
        if rest.is_empty() {
            self.rest = rest;
            self.remaining = 0;
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.rest = "";
            return Some(rest);
        }
        let split = rest.find(is_separator).unwrap_or(rest.len());
        let (field, tail) = rest.split_at(split);
        self.rest = tail;
        Some(field)
    }
}

/// Split `line` into at most `max_fields` fields, the last taking the remainder
#[must_use]
pub fn split_fields(line: &str, max_fields: usize) -> Fields<'_> {
    Fields { rest: line, remaining: max_fields }
}

/// Parse a hexadecimal number, with or without a `0x` prefix
#[must_use]
pub fn parse_hex(field: &str) -> Option<u64> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

fn hex_field(field: Option<&str>, label: &'static str) -> Result<u64, PerfMapLineError> {
    let field = field.ok_or(PerfMapLineError::MissingField(label))?;
    parse_hex(field)
        .ok_or_else(|| PerfMapLineError::InvalidHex { field: label, value: field.to_string() })
}

/// Parse one map line (without its trailing newline)
///
/// # Errors
/// Returns the reason the line cannot become a symbol range: a missing or
/// non-hex field, a zero start address, a zero size, or a range whose end
/// does not fit in 64 bits.
pub fn parse_line(line: &str) -> Result<PerfMapEntry<'_>, PerfMapLineError> {
    let mut fields = split_fields(line, FIELD_COUNT);
    let start = hex_field(fields.next(), "address")?;
    let size = hex_field(fields.next(), "size")?;
    let name = fields.next().ok_or(PerfMapLineError::MissingField("name"))?;

    if start == 0 {
        return Err(PerfMapLineError::ZeroAddress);
    }
    if size == 0 {
        return Err(PerfMapLineError::ZeroSize);
    }
    if start.checked_add(size).is_none() {
        return Err(PerfMapLineError::RangeOverflow { start, size });
    }

    Ok(PerfMapEntry { start, size, name })
}
