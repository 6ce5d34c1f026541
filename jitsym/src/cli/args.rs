//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::symbolization::parse_hex;

#[derive(Parser, Debug)]
#[command(
    name = "jitsym",
    about = "Resolve addresses to symbols published in /tmp/perf-<pid>.map",
    after_help = "\
EXAMPLES:
    jitsym dotnet 0x7f7dd9db0490             Find PID by name, resolve one address
    jitsym --pid 1234 7f7dd9db0490 7f7dd9db1000
    jitsym --pid 1234 --dump --json          Print every published symbol as JSON
    jitsym --list                            List processes with a published map"
)]
pub struct Args {
    /// Process name to resolve symbols for (auto-detects PID)
    #[arg(value_name = "PROCESS", conflicts_with = "pid")]
    pub process: Option<String>,

    /// Process ID to resolve symbols for
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Addresses to resolve (hexadecimal, 0x prefix optional)
    #[arg(short, long = "addr", value_name = "ADDR", value_parser = parse_address)]
    pub addresses: Vec<u64>,

    /// Re-read the map file on every miss instead of throttling
    #[arg(short, long)]
    pub force: bool,

    /// Minimum milliseconds between two unforced map file scans
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub interval_ms: u64,

    /// Directory holding perf-<pid>.map files
    #[arg(long, value_name = "DIR", default_value = crate::symbolization::perf_map::DEFAULT_MAP_DIR)]
    pub map_dir: PathBuf,

    /// Print every symbol range currently in the map
    #[arg(long)]
    pub dump: bool,

    /// List processes that have published a map and exit
    #[arg(long, conflicts_with_all = ["process", "pid"])]
    pub list: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Demangle Rust symbol names
    #[arg(long)]
    pub demangle: bool,

    /// Delete the map file once done (only for processes that have exited)
    #[arg(long)]
    pub cleanup: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parse a hexadecimal address argument
///
/// # Errors
/// Returns a message naming the rejected input
pub fn parse_address(value: &str) -> Result<u64, String> {
    parse_hex(value).ok_or_else(|| format!("invalid hex address: {value}"))
}
