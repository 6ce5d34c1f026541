//! Custom symbol resolution for one profiled process
//!
//! JIT runtimes publish symbols for generated code to `/tmp/perf-<pid>.map`
//! while they run. The resolver keeps an in-memory [`SymbolTable`] built from
//! that file and only re-reads it when a lookup misses, at most once per
//! [`ResolverConfig::min_update_interval`] unless the caller forces it.

use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::perf_map::{parse_line, perf_map_path, DEFAULT_MAP_DIR};
use super::scanner::ScanCursor;
use super::symbol_table::{SymbolRange, SymbolTable};
use crate::domain::{Pid, ResolverError, SymbolName};
use crate::pool::SymbolNameAllocator;

/// Default minimum time between two map file scans
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Resolver settings, fixed for the lifetime of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Directory holding `perf-<pid>.map` files
    pub map_dir: PathBuf,
    /// Minimum time between scans triggered by unforced lookup misses
    pub min_update_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            map_dir: PathBuf::from(DEFAULT_MAP_DIR),
            min_update_interval: DEFAULT_MIN_UPDATE_INTERVAL,
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn with_map_dir(mut self, map_dir: impl Into<PathBuf>) -> Self {
        self.map_dir = map_dir.into();
        self
    }

    #[must_use]
    pub fn with_min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }
}

/// Resolves addresses to names published in a process's perf map
///
/// Instances are meant to be recycled through
/// [`ResolverPool`](crate::pool::ResolverPool): [`reset`](Self::reset) binds
/// one to a process and [`free_resources`](Self::free_resources) cleans up
/// after it. Not synchronized; callers serialize access.
pub struct CustomSymbolResolver {
    config: ResolverConfig,
    pid: Pid,
    context: Arc<Path>,
    allocator: Arc<SymbolNameAllocator>,
    table: SymbolTable,
    cursor: ScanCursor,
    last_updated: Option<Instant>,
    map_path: Option<PathBuf>,
}

impl Default for CustomSymbolResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl CustomSymbolResolver {
    /// Create an unbound resolver. Call [`reset`](Self::reset) before use.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            pid: Pid::default(),
            context: Arc::from(Path::new("")),
            allocator: Arc::new(SymbolNameAllocator::new()),
            table: SymbolTable::default(),
            cursor: ScanCursor::default(),
            last_updated: None,
            map_path: None,
        }
    }

    /// Bind this instance to `pid`, dropping everything from a previous process
    ///
    /// `context` is the module path names are canonicalized under, and
    /// `allocator` the name pool shared with other resolvers.
    pub fn reset(&mut self, pid: Pid, context: Arc<Path>, allocator: Arc<SymbolNameAllocator>) {
        self.pid = pid;
        self.context = context;
        self.allocator = allocator;
        self.table.clear();
        self.cursor.reset();
        self.last_updated = None;
        self.map_path = None;
    }

    /// Release held names and delete the map file if it was ever looked for
    pub fn free_resources(&mut self) {
        self.table.clear();
        let Some(path) = &self.map_path else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed symbol map {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                debug!("{}", ResolverError::RemoveFailed { path: path.clone(), source });
            }
        }
    }

    /// Resolve `address` to a custom symbol name
    ///
    /// A miss re-reads new lines from the map file when `force_update` is set
    /// or the minimum update interval has passed, then retries once. Forcing
    /// guarantees freshly published symbols are found at the cost of a scan
    /// on every miss.
    pub fn resolve(&mut self, address: u64, force_update: bool) -> Option<Arc<SymbolName>> {
        if let Some(name) = self.try_resolve(address) {
            return Some(name);
        }

        let now = Instant::now();
        if !force_update && !self.update_due(now) {
            trace!("0x{address:x} not found in {}, scan throttled", self.pid);
            return None;
        }

        self.update_symbol_names();
        self.last_updated = Some(now);
        self.try_resolve(address)
    }

    /// Scan the map file for new lines now, regardless of throttling
    pub fn refresh(&mut self) {
        self.update_symbol_names();
        self.last_updated = Some(Instant::now());
    }

    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Path of the map file, once the first scan has built it
    #[must_use]
    pub fn map_path(&self) -> Option<&Path> {
        self.map_path.as_deref()
    }

    /// Bytes of the map file consumed so far
    #[must_use]
    pub fn read_offset(&self) -> u64 {
        self.cursor.read_offset()
    }

    /// Known ranges in ascending end order
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn try_resolve(&self, address: u64) -> Option<Arc<SymbolName>> {
        self.table.lookup(address).map(|range| Arc::clone(&range.name))
    }

    fn update_due(&self, now: Instant) -> bool {
        match self.last_updated {
            None => true,
            Some(last) => now.duration_since(last) > self.config.min_update_interval,
        }
    }

    fn update_symbol_names(&mut self) {
        let path: &Path = self
            .map_path
            .get_or_insert_with(|| perf_map_path(&self.config.map_dir, self.pid));

        let table = &mut self.table;
        let allocator = &self.allocator;
        let context = &self.context;
        let mut accepted = 0usize;
        let result = self.cursor.advance(path, |line| match parse_line(line) {
            Ok(entry) => {
                let name = allocator.allocate(entry.name.to_owned(), context);
                table.push(SymbolRange { name, start: entry.start, end: entry.end() });
                accepted += 1;
            }
            Err(e) => trace!("Skipping map line {line:?}: {e}"),
        });
        self.table.sort_by_end();

        match result {
            Ok(Some(stats)) => debug!(
                "Scanned {}: {} new lines, {} accepted, {} symbols total, offset {}",
                path.display(),
                stats.lines,
                accepted,
                self.table.len(),
                self.cursor.read_offset()
            ),
            Ok(None) => trace!("Symbol map {} not available", path.display()),
            Err(source) => {
                debug!("{}", ResolverError::ReadFailed { path: path.to_path_buf(), source });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;

    fn resolver_in(dir: &Path, pid: u32, interval: Duration) -> CustomSymbolResolver {
        let config = ResolverConfig::default()
            .with_map_dir(dir)
            .with_min_update_interval(interval);
        let mut resolver = CustomSymbolResolver::new(config);
        resolver.reset(
            Pid(pid),
            Arc::from(Path::new("[jit]")),
            Arc::new(SymbolNameAllocator::new()),
        );
        resolver
    }

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    fn name(symbol: Option<Arc<SymbolName>>) -> Option<String> {
        symbol.map(|s| s.as_str().to_string())
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.map_dir, PathBuf::from("/tmp"));
        assert_eq!(config.min_update_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_resolve_from_map_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("perf-10.map"), "1000 100 A\n2000 50 B\n").unwrap();
        let mut resolver = resolver_in(dir.path(), 10, HOUR);

        assert_eq!(name(resolver.resolve(0x1050, false)).as_deref(), Some("A"));
        assert_eq!(name(resolver.resolve(0x2010, false)).as_deref(), Some("B"));
        assert_eq!(resolver.resolve(0x1900, false), None);
        assert_eq!(resolver.map_path(), Some(dir.path().join("perf-10.map").as_path()));
        assert!(resolver.symbols().is_sorted_by_end());
    }

    #[test]
    fn test_missing_map_file_resolves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver_in(dir.path(), 11, HOUR);
        assert_eq!(resolver.resolve(0x1000, true), None);
        assert!(resolver.is_empty());
        assert_eq!(resolver.read_offset(), 0);
    }

    #[test]
    fn test_unforced_miss_is_throttled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf-12.map");
        append(&path, "1000 10 Early\n");
        let mut resolver = resolver_in(dir.path(), 12, HOUR);

        // first miss always scans
        assert_eq!(resolver.resolve(0x5000, false), None);
        assert_eq!(resolver.len(), 1);

        append(&path, "5000 10 Late\n");
        assert_eq!(resolver.resolve(0x5000, false), None);
        assert_eq!(resolver.resolve(0x5000, false), None);
        assert_eq!(resolver.len(), 1);

        assert_eq!(name(resolver.resolve(0x5000, true)).as_deref(), Some("Late"));
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_unforced_miss_scans_after_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf-20.map");
        append(&path, "1000 10 Early\n");
        let interval = Duration::from_millis(200);
        let mut resolver = resolver_in(dir.path(), 20, interval);

        assert_eq!(resolver.resolve(0x5000, false), None);
        append(&path, "5000 10 Late\n");
        assert_eq!(resolver.resolve(0x5000, false), None);
        assert_eq!(resolver.len(), 1);

        std::thread::sleep(interval + Duration::from_millis(50));
        assert_eq!(name(resolver.resolve(0x5000, false)).as_deref(), Some("Late"));
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_hit_does_not_scan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf-13.map");
        append(&path, "1000 10 Known\n");
        let mut resolver = resolver_in(dir.path(), 13, Duration::ZERO);
        assert!(resolver.resolve(0x1000, false).is_some());
        let offset = resolver.read_offset();

        append(&path, "2000 10 Other\n");
        for _ in 0..3 {
            assert_eq!(name(resolver.resolve(0x1004, true)).as_deref(), Some("Known"));
        }
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.read_offset(), offset);
    }

    #[test]
    fn test_invalid_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("perf-14.map"),
            "0000000000000000 10 Foo\n1000 0 Bar\ngarbage\n\n3000 20 Good One\n",
        )
        .unwrap();
        let mut resolver = resolver_in(dir.path(), 14, HOUR);

        assert_eq!(name(resolver.resolve(0x3010, false)).as_deref(), Some("Good One"));
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_names_are_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("perf-15.map"), "1000 10 Stub\n2000 10 Stub\n").unwrap();
        let mut resolver = resolver_in(dir.path(), 15, HOUR);

        let first = resolver.resolve(0x1000, false).unwrap();
        let second = resolver.resolve(0x2000, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.context(), Path::new("[jit]"));
    }

    #[test]
    fn test_reset_clears_state() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("perf-16.map"), "1000 10 Old\n").unwrap();
        let mut resolver = resolver_in(dir.path(), 16, HOUR);
        assert!(resolver.resolve(0x1000, false).is_some());

        std::fs::write(dir.path().join("perf-17.map"), "1000 10 New\n").unwrap();
        resolver.reset(Pid(17), Arc::from(Path::new("[jit]")), Arc::new(SymbolNameAllocator::new()));
        assert!(resolver.is_empty());
        assert_eq!(resolver.read_offset(), 0);
        assert_eq!(resolver.map_path(), None);

        // fresh clock: unforced miss scans straight away
        assert_eq!(name(resolver.resolve(0x1000, false)).as_deref(), Some("New"));
        assert_eq!(resolver.pid(), Pid(17));
    }

    #[test]
    fn test_free_resources_deletes_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf-18.map");
        std::fs::write(&path, "1000 10 Gone\n").unwrap();
        let mut resolver = resolver_in(dir.path(), 18, HOUR);
        assert!(resolver.resolve(0x1000, false).is_some());

        resolver.free_resources();
        assert!(resolver.is_empty());
        assert!(!path.exists());

        // second free with the file already gone is harmless
        resolver.free_resources();
    }

    #[test]
    fn test_free_resources_without_scan_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf-19.map");
        std::fs::write(&path, "1000 10 Kept\n").unwrap();
        let mut resolver = resolver_in(dir.path(), 19, HOUR);

        resolver.free_resources();
        assert!(path.exists());
    }
}
