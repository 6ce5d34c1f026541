//! # Custom Symbol Resolution for JIT Code
//!
//! This module converts raw instruction pointers sampled from a profiled
//! process into names of **dynamically generated code**: methods compiled by
//! a JIT (.NET, the JVM with perf-map-agent, V8, LuaJIT, ...) or stubs emitted
//! at runtime. Such code has no entry in any ELF symbol table, so the runtime
//! publishes its own symbols.
//!
//! ## The Perf Map Convention
//!
//! A runtime that wants its generated code to be symbolized appends one line
//! per code region to `/tmp/perf-<pid>.map`:
//!
//! ```text
//! <hex start> <hex size> <name, may contain spaces>
//! 00007F7DD9DB0480 2d   instance bool [System.Private.CoreLib] dynamicClass::IL_STUB_UnboxingStub()
//! ```
//!
//! The file only grows, and it grows **while we read it**. The writer is not
//! coordinated with us, so the last line may be half written.
//!
//! ## Resolution Flow
//!
//! ```text
//! resolve(addr, force)
//!    │
//!    ├─▶ search SymbolTable (binary search on range end) ──▶ hit: return
//!    │
//!    ├─▶ miss: scan allowed? (force, or min interval elapsed)
//!    │        no  ──▶ return None
//!    │
//!    └─▶ ScanCursor: seek to last offset, read complete lines
//!             │
//!             ├─▶ parse_line: <start> <size> <name>
//!             ├─▶ SymbolNameAllocator: canonical Arc<SymbolName>
//!             ├─▶ SymbolTable: push, then stable sort by end
//!             └─▶ look up again ──▶ hit / None
//! ```
//!
//! ## Module Structure
//!
//! - **`perf_map`**: map file path and line format
//!   - Splits fields on runs of spaces/tabs, name is the verbatim remainder
//!   - Rejects zero addresses, zero sizes and overflowing ranges
//!
//! - **`scanner`**: incremental reader
//!   - Remembers the byte offset of the first unconsumed line
//!   - Leaves an unterminated trailing line for the next scan
//!
//! - **`symbol_table`**: interval index ordered by range end
//!
//! - **`resolver`**: [`CustomSymbolResolver`], the throttled refresh policy and
//!   the reset/free lifecycle used by [`ResolverPool`](crate::pool::ResolverPool)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use jitsym::domain::Pid;
//! use jitsym::pool::SymbolNameAllocator;
//! use jitsym::symbolization::{CustomSymbolResolver, ResolverConfig};
//!
//! let mut resolver = CustomSymbolResolver::new(ResolverConfig::default());
//! resolver.reset(
//!     Pid(4242),
//!     Arc::from(Path::new("/usr/bin/dotnet")),
//!     Arc::new(SymbolNameAllocator::new()),
//! );
//!
//! if let Some(name) = resolver.resolve(0x7f7d_d9db_0490, false) {
//!     println!("{name}");
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! - **Hits** cost one binary search and an `Arc` clone, no I/O
//! - **Misses** scan at most once per `min_update_interval` (100 ms by default)
//! - **Scans** read only bytes appended since the previous scan, then re-sort
//!   the whole table; tables are bounded by one process's JIT output
//!
//! ## References
//!
//! - [Linux perf JIT interface](https://github.com/torvalds/linux/blob/master/tools/perf/Documentation/jit-interface.txt)

pub mod perf_map;
pub mod resolver;
pub mod scanner;
pub mod symbol_table;

pub use perf_map::{parse_hex, parse_line, perf_map_path, split_fields, PerfMapEntry};
pub use resolver::{CustomSymbolResolver, ResolverConfig, DEFAULT_MIN_UPDATE_INTERVAL};
pub use scanner::{ScanCursor, ScanStats};
pub use symbol_table::{SymbolRange, SymbolTable};
