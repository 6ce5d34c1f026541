//! Interval index over published symbol ranges

use std::sync::Arc;

use crate::domain::SymbolName;

/// Half-open address range `[start, end)` owned by one symbol
#[derive(Debug, Clone)]
pub struct SymbolRange {
    pub name: Arc<SymbolName>,
    pub start: u64,
    pub end: u64,
}

impl SymbolRange {
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

/// Symbol ranges ordered by `end`
///
/// Lookups binary-search on `end`, so callers that [`push`](Self::push)
/// must call [`sort_by_end`](Self::sort_by_end) before the next lookup.
#[derive(Debug, Default)]
pub struct SymbolTable {
    ranges: Vec<SymbolRange>,
}

impl SymbolTable {
    /// Append a range without restoring the ordering
    pub fn push(&mut self, range: SymbolRange) {
        self.ranges.push(range);
    }

    /// Restore ascending `end` order. Stable, so equal ends keep scan order.
    pub fn sort_by_end(&mut self) {
        self.ranges.sort_by_key(|range| range.end);
    }

    /// Find the range covering `addr`
    ///
    /// Takes the first range whose end lies past `addr`. When several ranges
    /// share that end, the last pushed one that starts at or before `addr`
    /// wins.
    #[must_use]
    pub fn lookup(&self, addr: u64) -> Option<&SymbolRange> {
        let first = self.ranges.partition_point(|range| range.end <= addr);
        let end = self.ranges.get(first)?.end;
        let run = self.ranges[first..].partition_point(|range| range.end == end);
        self.ranges[first..first + run].iter().rev().find(|range| addr >= range.start)
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymbolRange> {
        self.ranges.iter()
    }

    #[must_use]
    pub fn is_sorted_by_end(&self) -> bool {
        self.ranges.windows(2).all(|pair| pair[0].end <= pair[1].end)
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a SymbolRange;
    type IntoIter = std::slice::Iter<'a, SymbolRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn range(name: &str, start: u64, size: u64) -> SymbolRange {
        let context: Arc<Path> = Arc::from(Path::new("[test]"));
        SymbolRange { name: Arc::new(SymbolName::new(name, context)), start, end: start + size }
    }

    fn table(ranges: Vec<SymbolRange>) -> SymbolTable {
        let mut table = SymbolTable::default();
        for r in ranges {
            table.push(r);
        }
        table.sort_by_end();
        table
    }

    fn name_at(table: &SymbolTable, addr: u64) -> Option<&str> {
        table.lookup(addr).map(|r| r.name.as_str())
    }

    #[test]
    fn test_lookup_hits_and_gaps() {
        let table = table(vec![range("B", 0x2000, 0x50), range("A", 0x1000, 0x100)]);
        assert!(table.is_sorted_by_end());

        assert_eq!(name_at(&table, 0x1000), Some("A"));
        assert_eq!(name_at(&table, 0x1050), Some("A"));
        assert_eq!(name_at(&table, 0x10ff), Some("A"));
        assert_eq!(name_at(&table, 0x1100), None);
        assert_eq!(name_at(&table, 0x1900), None);
        assert_eq!(name_at(&table, 0x2010), Some("B"));
        assert_eq!(name_at(&table, 0x2050), None);
        assert_eq!(name_at(&table, 0x0fff), None);
    }

    #[test]
    fn test_empty_table_misses() {
        let table = SymbolTable::default();
        assert!(table.lookup(0x1000).is_none());
        assert!(table.is_sorted_by_end());
    }

    #[test]
    fn test_range_contains_is_half_open() {
        let r = range("A", 0x1000, 0x10);
        assert!(r.contains(0x1000));
        assert!(r.contains(0x100f));
        assert!(!r.contains(0x1010));
        assert!(!r.contains(0x0fff));
    }

    // Equal-end tie-break: current behaviour, not a contract.
    #[test]
    fn test_equal_end_prefers_last_pushed() {
        let table = table(vec![range("Tier0", 0x1000, 0x40), range("Tier1", 0x1000, 0x40)]);
        assert_eq!(name_at(&table, 0x1010), Some("Tier1"));
    }

    #[test]
    fn test_equal_end_falls_back_to_covering_range() {
        let table = table(vec![range("Outer", 0x1000, 0x40), range("Tail", 0x1030, 0x10)]);
        assert_eq!(name_at(&table, 0x1010), Some("Outer"));
        assert_eq!(name_at(&table, 0x1034), Some("Tail"));
        assert_eq!(name_at(&table, 0x0fff), None);
    }

    #[test]
    fn test_nested_range_lands_on_smallest_end() {
        let table = table(vec![range("Outer", 0x1000, 0x100), range("Inner", 0x1010, 0x10)]);
        assert_eq!(name_at(&table, 0x1015), Some("Inner"));
        assert_eq!(name_at(&table, 0x1050), Some("Outer"));
        // Inner's end is the first past 0x1005 but its start is not
        assert_eq!(name_at(&table, 0x1005), None);
    }
}
