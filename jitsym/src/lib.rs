//! # jitsym - Symbols for JIT-Generated Code
//!
//! jitsym resolves instruction addresses sampled from a profiled process to
//! the names its JIT runtime publishes in `/tmp/perf-<pid>.map`. Code emitted
//! at runtime (.NET methods and IL stubs, JVM methods via perf-map-agent,
//! V8 and LuaJIT traces) has no ELF symbols, so this is the only place a
//! profiler can get a name for it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Profiled Process (JIT)                     │
//! │           appends "<start> <size> <name>" lines as it runs      │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ /tmp/perf-<pid>.map
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       jitsym (This Crate)                       │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │ ScanCursor   │──▶│ SymbolTable  │──▶│  Resolver    │◀── addr │
//! │  │ (new lines)  │   │ (sorted/end) │   │ (throttled)  │         │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘         │
//! │                                               │                 │
//! │  ┌──────────────┐   ┌──────────────┐          │                 │
//! │  │ ResolverPool │   │ NameAllocator│◀─────────┘                 │
//! │  │ (free list)  │   │ (Arc<Name>)  │                            │
//! │  └──────────────┘   └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`symbolization`]: perf map parsing, incremental scanning, the interval
//!   index and [`CustomSymbolResolver`](symbolization::CustomSymbolResolver)
//! - [`pool`]: shared name allocator and the resolver free list
//! - [`domain`]: core types ([`Pid`](domain::Pid),
//!   [`SymbolName`](domain::SymbolName)) and errors
//! - [`process_lookup`]: find target processes and published maps
//! - [`export`]: text and JSON output
//! - [`cli`]: command-line argument parsing
//!
//! ## Typical Usage
//!
//! ```bash
//! # Resolve addresses for a running .NET app
//! jitsym dotnet -a 0x7f7dd9db0490
//!
//! # Dump everything a process has published
//! jitsym --pid 1234 --dump --json
//! ```

pub mod cli;
pub mod domain;
pub mod export;
pub mod pool;
pub mod process_lookup;
pub mod symbolization;
