//! Incremental reader for a map file that is still being appended to

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Summary of one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Complete lines handed to the callback
    pub lines: usize,
    /// Bytes of a trailing unterminated line left for the next pass
    pub pending_bytes: usize,
}

/// How far into the map file has been consumed
///
/// The offset only moves forward, and only past lines that ended with `\n`.
#[derive(Debug, Default)]
pub struct ScanCursor {
    read_offset: u64,
    line: Vec<u8>,
}

impl ScanCursor {
    /// Byte offset of the first line not yet consumed
    #[must_use]
    pub fn read_offset(&self) -> u64 {
        self.read_offset
    }

    pub fn reset(&mut self) {
        self.read_offset = 0;
        self.line.clear();
    }

    /// Feed every complete line after the cursor to `on_line`, then advance
    ///
    /// Lines are passed without their terminator; invalid UTF-8 is replaced
    /// lossily. Returns `Ok(None)` if the file cannot be opened.
    ///
    /// # Errors
    /// Returns an error if seeking or reading fails after the file was opened.
    /// Lines consumed before the failure stay consumed.
    pub fn advance(
        &mut self,
        path: &Path,
        mut on_line: impl FnMut(&str),
    ) -> io::Result<Option<ScanStats>> {
        let Ok(file) = File::open(path) else {
            return Ok(None);
        };
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(self.read_offset))?;

        let mut stats = ScanStats::default();
        loop {
            self.line.clear();
            let read = reader.read_until(b'\n', &mut self.line)?;
            if read == 0 {
                break;
            }
            if self.line.last() != Some(&b'\n') {
                // writer has not finished this line yet
                stats.pending_bytes = read;
                break;
            }
            self.read_offset += read as u64;
            stats.lines += 1;
            let text = String::from_utf8_lossy(&self.line[..read - 1]);
            on_line(&*text);
        }
        Ok(Some(stats))
    }
}
