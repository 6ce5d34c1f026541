//! Domain types shared by the resolver, the allocator and the CLI

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Process ID
///
/// Identifies which `perf-<pid>.map` file a resolver reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

/// Canonical symbol name
///
/// Instances are handed out as `Arc<SymbolName>` by
/// [`SymbolNameAllocator`](crate::pool::SymbolNameAllocator), so every range
/// naming the same function in the same context shares one allocation.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SymbolName {
    name: Box<str>,
    context: Arc<Path>,
}

impl SymbolName {
    pub(crate) fn new(name: impl Into<Box<str>>, context: Arc<Path>) -> Self {
        Self { name: name.into(), context }
    }

    /// The function name as published in the map file
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Path of the module this name was resolved for
    #[must_use]
    pub fn context(&self) -> &Path {
        &self.context
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
