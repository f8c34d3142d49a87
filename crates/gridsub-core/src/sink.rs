//! Destination sinks for emitted blocks
//!
//! A destination is created (truncated) once and then only appended to.
//! [`FileSink`] opens the file for every append and releases it before
//! returning, so a run that is killed between blocks leaves a file holding
//! only complete blocks.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named, appendable byte sink
pub trait BlockSink {
    /// Create the destination empty, truncating anything already there
    fn create(&mut self, name: &str) -> Result<()>;

    /// Append bytes to the destination and flush them
    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes destinations as files, optionally under a base directory
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    base_dir: Option<PathBuf>,
}

impl FileSink {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Path a destination name resolves to
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) if Path::new(name).is_relative() => dir.join(name),
            _ => PathBuf::from(name),
        }
    }
}

impl BlockSink for FileSink {
    fn create(&mut self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::sink(name, e))?;
        }
        File::create(&path).map_err(|e| Error::sink(name, e))?;
        debug!(path = %path.display(), "Destination created");
        Ok(())
    }

    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(name);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| Error::sink(name, e))?;
        file.write_all(bytes).map_err(|e| Error::sink(name, e))?;
        file.flush().map_err(|e| Error::sink(name, e))?;
        Ok(())
    }
}

/// Keeps destinations in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Destination contents as text (lossy)
    pub fn text(&self, name: &str) -> Option<String> {
        self.contents(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of successful appends
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BlockSink for MemorySink {
    fn create(&mut self, name: &str) -> Result<()> {
        self.files.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let file = self.files.get_mut(name).ok_or_else(|| {
            Error::sink(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "destination was never created"),
            )
        })?;
        file.extend_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_truncates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(Some(dir.path().to_path_buf()));
        let path = sink.resolve("out.srt");
        std::fs::write(&path, "stale").unwrap();

        sink.create("out.srt").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        sink.append("out.srt", b"one\n").unwrap();
        sink.append("out.srt", b"two\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(Some(dir.path().to_path_buf()));
        sink.create("nested/show.srt").unwrap();
        assert!(dir.path().join("nested/show.srt").exists());
    }

    #[test]
    fn test_file_sink_absolute_names_ignore_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("abs.srt");
        let sink = FileSink::new(Some(PathBuf::from("/nonexistent")));
        assert_eq!(sink.resolve(absolute.to_str().unwrap()), absolute);
    }

    #[test]
    fn test_file_sink_append_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(Some(dir.path().to_path_buf()));
        let err = sink.append("missing.srt", b"x").unwrap_err();
        assert!(matches!(err, Error::SinkUnavailable { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.append("a.srt", b"x").is_err());

        sink.create("a.srt").unwrap();
        sink.append("a.srt", b"hello").unwrap();
        assert_eq!(sink.text("a.srt").as_deref(), Some("hello"));
        assert_eq!(sink.writes(), 1);

        sink.create("a.srt").unwrap();
        assert_eq!(sink.contents("a.srt"), Some(&b""[..]));
        assert_eq!(sink.names().collect::<Vec<_>>(), vec!["a.srt"]);
    }
}
