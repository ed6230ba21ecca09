use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::SourceError;

/// Written over a log once it has been read; the writer treats it as "consumed".
pub const CONSUMED_MARKER: &str = "0";

/// A newline-delimited diagnostic log that is read in full and then reset.
#[derive(Debug, Clone)]
pub struct LogSource {
    name: &'static str,
    path: PathBuf,
    max_bytes: u64,
}

impl LogSource {
    pub fn new(name: &'static str, path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            name,
            path: path.into(),
            max_bytes,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole source and, if it holds unconsumed data, overwrites it with
    /// [`CONSUMED_MARKER`].
    ///
    /// - Returns `Ok(None)` when the source is empty or already consumed.
    /// - A failed clear is logged and the contents are still returned; the writer
    ///   may hand the same data back on the next invocation.
    /// - An oversized source is cleared and reported as [`SourceError::TooLarge`].
    pub fn consume(&self) -> Result<Option<String>, SourceError> {
        let contents = match self.read_contents() {
            Ok(contents) => contents,
            Err(err @ SourceError::TooLarge { .. }) => {
                self.clear_or_log();
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        if is_consumed(&contents) {
            debug!(source = self.name, "no unconsumed data");
            return Ok(None);
        }

        self.clear_or_log();
        Ok(Some(contents))
    }

    /// Like [`LogSource::consume`], but an unreadable source counts as absent.
    ///
    /// Used for the secondary logs, which many devices do not expose at all.
    pub fn consume_optional(&self) -> Option<String> {
        match self.consume() {
            Ok(contents) => contents,
            Err(SourceError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(source = self.name, path = %self.path.display(), "source not present");
                None
            }
            Err(err) => {
                error!(source = self.name, error = %err, "secondary source unavailable");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), SourceError> {
        fs::write(&self.path, CONSUMED_MARKER).map_err(|source| SourceError::Clear {
            source_name: self.name,
            path: self.path.clone(),
            source,
        })
    }

    fn clear_or_log(&self) {
        if let Err(err) = self.clear() {
            error!(source = self.name, error = %err, "couldn't clear source");
        }
    }

    fn read_contents(&self) -> Result<String, SourceError> {
        let read_err = |source| SourceError::Read {
            source_name: self.name,
            path: self.path.clone(),
            source,
        };

        let file = File::open(&self.path).map_err(read_err)?;
        let mut bytes = Vec::new();
        file.take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(read_err)?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(SourceError::TooLarge {
                source_name: self.name,
                path: self.path.clone(),
                max_bytes: self.max_bytes,
            });
        }
        // Firmware writes raw bytes; a corrupt byte spoils its line, not the log.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn is_consumed(contents: &str) -> bool {
    let trimmed = contents.trim_matches(|ch: char| ch.is_whitespace() || ch == '\0');
    trimmed.is_empty() || trimmed == CONSUMED_MARKER
}
