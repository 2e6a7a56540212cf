//! Line-oriented text input divided into byte-range splits.
//!
//! Both `FlowContext::text_file` and `DataFrameReader::text` read files
//! through this module so the two APIs see the same lines in the same
//! partitions. A line belongs to the split that contains its first byte.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;
use wisp_common::error::{CommonError, ErrorContext, Result};

/// A text file and the byte ranges it is split into.
#[derive(Debug, Clone)]
pub struct TextInput {
    path: PathBuf,
    len: u64,
    splits: Vec<Range<u64>>,
}

impl TextInput {
    /// Opens `path` and divides it into up to `min_splits` byte ranges.
    ///
    /// Fails with a not-found error when the file does not exist.
    pub fn open(path: impl AsRef<Path>, min_splits: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path)
            .with_io_context(|| format!("Cannot access input {}", path.display()))?;
        if !metadata.is_file() {
            return Err(CommonError::io_error(format!(
                "Input {} is not a regular file",
                path.display()
            )));
        }

        let len = metadata.len();
        let splits = compute_splits(len, min_splits);
        debug!(
            "Input {} ({} bytes) divided into {} splits",
            path.display(),
            len,
            splits.len()
        );
        Ok(Self { path, len, splits })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size when the input was opened
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_splits(&self) -> usize {
        self.splits.len()
    }

    pub fn splits(&self) -> &[Range<u64>] {
        &self.splits
    }

    /// Reads the lines of one split.
    ///
    /// Only the split's bytes are read, plus the tail of its last line and
    /// the partial line that precedes it.
    pub fn read_split(&self, index: usize) -> std::io::Result<Vec<String>> {
        let range = self.splits.get(index).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("split {} out of range ({} splits)", index, self.splits.len()),
            )
        })?;
        let open_ended = self.is_last(index);
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut raw = Vec::new();

        // A line starts at range.start only if the byte before it is a newline
        let mut pos = range.start;
        if range.start > 0 {
            reader.seek(SeekFrom::Start(range.start - 1))?;
            pos = range.start - 1 + reader.read_until(b'\n', &mut raw)? as u64;
        }

        let mut lines = Vec::new();
        while pos < range.end || open_ended {
            raw.clear();
            let read = reader.read_until(b'\n', &mut raw)?;
            if read == 0 {
                break;
            }
            pos += read as u64;
            lines.push(decode_line(&raw));
        }
        Ok(lines)
    }

    /// Reads every split with a single pass over the file.
    pub fn read_all(&self) -> std::io::Result<Vec<Vec<String>>> {
        let bytes = std::fs::read(&self.path)?;
        Ok(self
            .splits
            .iter()
            .enumerate()
            .map(|(i, range)| lines_in_range(&bytes, range, self.is_last(i)))
            .collect())
    }

    fn is_last(&self, index: usize) -> bool {
        index + 1 == self.splits.len()
    }
}

/// Divides `len` bytes into at most `min_splits.max(1)` contiguous ranges of equal size.
///
/// An empty file still has one (empty) split.
pub fn compute_splits(len: u64, min_splits: usize) -> Vec<Range<u64>> {
    if len == 0 {
        return vec![0..0];
    }
    let split_size = len.div_ceil(min_splits.max(1) as u64);
    let mut splits = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + split_size).min(len);
        splits.push(start..end);
        start = end;
    }
    splits
}

/// Returns the lines whose first byte falls in `range`, without terminators.
///
/// `\n` and `\r\n` both end a line, and a trailing newline does not start an
/// extra empty line. Invalid UTF-8 is replaced rather than rejected. The last
/// split also takes lines appended after the input was opened.
pub fn lines_in_range(bytes: &[u8], range: &Range<u64>, open_ended: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut offset = 0u64;
    for raw in bytes.split_inclusive(|b| *b == b'\n') {
        let start = offset;
        offset += raw.len() as u64;
        if start < range.start {
            continue;
        }
        if start >= range.end && !open_ended {
            break;
        }
        lines.push(decode_line(raw));
    }
    lines
}

fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
