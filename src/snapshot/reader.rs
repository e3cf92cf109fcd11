use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::RawSnapshot;

/// One parsed line of a snapshot log.
#[derive(Debug, Clone)]
pub struct SnapshotLine {
    pub line_no: usize,
    pub raw: String,
    pub snapshot: RawSnapshot,
}

/// Lazily parses a line-delimited snapshot log.
///
/// Iteration stops after the first error: a line that is not a snapshot
/// means the log is corrupt and the rest of the file is not trusted.
pub struct SnapshotReader<R> {
    path: PathBuf,
    reader: R,
    line_no: usize,
    bytes_consumed: u64,
    finished: bool,
}

impl SnapshotReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open snapshot log {}", path.display()))?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> SnapshotReader<R> {
    pub fn new(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            line_no: 0,
            bytes_consumed: 0,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes read so far, including line terminators.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    fn next_line(&mut self) -> Result<Option<SnapshotLine>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            let read = self.reader.read_line(&mut buf).with_context(|| {
                format!(
                    "failed to read line {} of {}",
                    self.line_no + 1,
                    self.path.display()
                )
            })?;
            if read == 0 {
                return Ok(None);
            }

            self.line_no += 1;
            self.bytes_consumed += read as u64;

            let raw = buf.trim_end_matches(['\n', '\r']);
            if raw.trim().is_empty() {
                log::debug!("{}:{}: skipping blank line", self.path.display(), self.line_no);
                continue;
            }

            let snapshot: RawSnapshot = serde_json::from_str(raw).with_context(|| {
                format!(
                    "malformed snapshot at {}:{}: {raw}",
                    self.path.display(),
                    self.line_no
                )
            })?;

            return Ok(Some(SnapshotLine {
                line_no: self.line_no,
                raw: raw.to_string(),
                snapshot,
            }));
        }
    }
}

impl<R: BufRead> Iterator for SnapshotReader<R> {
    type Item = Result<SnapshotLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
