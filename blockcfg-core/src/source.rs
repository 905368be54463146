use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use thiserror::Error;

/// Errors raised while reading a configuration dump.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    /// A line could not be read (I/O failure or invalid UTF-8).
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// Forward-only sequence of lines from a configuration dump.
///
/// Each scan pass opens its own source; nothing is shared between passes.
pub struct LineSource<R> {
    label: String,
    lines: Lines<R>,
}

impl LineSource<BufReader<File>> {
    /// Open `path` for a single forward pass.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    /// Wrap an already-open reader. `label` is used in error messages.
    pub fn from_reader(label: impl Into<String>, reader: R) -> Self {
        Self {
            label: label.into(),
            lines: reader.lines(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(line.map_err(|source| SourceError::Read {
            path: self.label.clone(),
            source,
        }))
    }
}
