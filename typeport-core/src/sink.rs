use std::path::{Path, PathBuf};
use std::sync::Mutex;

use eyre::Result;

/// Destination for generated file content.
///
/// The generator never touches the filesystem directly; every rendered file
/// is handed to one or more sinks. The default sink persists to disk, while
/// tests substitute [`MemorySink`] to capture output without I/O.
pub trait FileSink: Send + Sync {
    /// Receive the content for one generated file.
    ///
    /// `source` is the name of the type that produced the file, if any
    /// (barrel files carry no source type).
    fn write(&self, source: Option<&str>, path: &Path, content: &str) -> Result<()>;
}

/// Write content to a path, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Sink that persists files to disk.
#[derive(Debug, Default)]
pub struct DiskSink;

impl FileSink for DiskSink {
    fn write(&self, _source: Option<&str>, path: &Path, content: &str) -> Result<()> {
        write_file(path, content)
    }
}

/// A file captured by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub source: Option<String>,
    pub path: PathBuf,
    pub content: String,
}

/// Sink that captures files in memory, for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<WrittenFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of everything written so far, sorted by path.
    pub fn files(&self) -> Vec<WrittenFile> {
        let mut files = self.files.lock().expect("memory sink poisoned").clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Look up the content written for a path.
    pub fn content(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .expect("memory sink poisoned")
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.clone())
    }
}

impl FileSink for MemorySink {
    fn write(&self, source: Option<&str>, path: &Path, content: &str) -> Result<()> {
        self.files
            .lock()
            .expect("memory sink poisoned")
            .push(WrittenFile {
                source: source.map(str::to_string),
                path: path.to_path_buf(),
                content: content.to_string(),
            });
        Ok(())
    }
}
