//! File metadata snapshots and async search helpers.

mod snapshot;

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{Error, Result};

pub use snapshot::{FileKind, FileSnapshot};

/// Async wrapper over a [`FileSnapshot`].
///
/// Missing paths are not errors: searches return `false` or an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncFile {
    snapshot: FileSnapshot,
}

impl AsyncFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        AsyncFile {
            snapshot: FileSnapshot::new(path),
        }
    }

    pub fn from_snapshot(snapshot: FileSnapshot) -> Self {
        AsyncFile { snapshot }
    }

    pub fn snapshot(&self) -> &FileSnapshot {
        &self.snapshot
    }

    /// Size captured at construction.
    pub fn size(&self) -> u64 {
        self.snapshot.len()
    }

    /// Snapshot `path` on the blocking pool.
    pub async fn open(path: impl AsRef<Path>) -> Result<FileSnapshot> {
        let path = path.as_ref().to_path_buf();
        Ok(tokio::task::spawn_blocking(move || FileSnapshot::new(path)).await?)
    }

    /// Snapshot several paths concurrently, preserving input order.
    pub async fn open_all<I>(paths: I) -> Result<Vec<FileSnapshot>>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        futures::future::try_join_all(paths.into_iter().map(Self::open)).await
    }

    pub async fn parent(&self) -> Result<Option<FileSnapshot>> {
        let snapshot = self.snapshot.clone();
        Ok(tokio::task::spawn_blocking(move || snapshot.parent()).await?)
    }

    /// Whether any line matches the regular expression `pattern`.
    pub async fn contains(&self, pattern: &str) -> Result<bool> {
        let re = Regex::new(pattern)?;
        self.any_line(|line| re.is_match(line)).await
    }

    /// Whether any line contains `needle` verbatim.
    pub async fn contains_text(&self, needle: &str) -> Result<bool> {
        self.any_line(|line| line.contains(needle)).await
    }

    async fn any_line<P>(&self, predicate: P) -> Result<bool>
    where
        P: Fn(&str) -> bool,
    {
        if !self.snapshot.is_file() {
            log::debug!("{} is not a file, nothing to search", self.snapshot.input().display());
            return Ok(false);
        }
        let file = match tokio::fs::File::open(self.snapshot.full_path()).await {
            Ok(file) => file,
            // Removed since the snapshot was taken.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        // Lines are decoded lossily so non-UTF-8 text is still searchable.
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(false);
            }
            let line = String::from_utf8_lossy(&buf);
            if predicate(line.trim_end_matches(['\n', '\r'])) {
                return Ok(true);
            }
        }
    }

    /// Sub-directories of this directory whose names match `pattern` (glob).
    pub async fn search_directories(&self, pattern: &str) -> Result<Vec<FileSnapshot>> {
        self.search(pattern, FileKind::Directory).await
    }

    /// Files under this directory matching `pattern` (glob).
    pub async fn search_files(&self, pattern: &str) -> Result<Vec<FileSnapshot>> {
        self.search(pattern, FileKind::File).await
    }

    async fn search(&self, pattern: &str, kind: FileKind) -> Result<Vec<FileSnapshot>> {
        glob::Pattern::new(pattern)?;
        if !self.snapshot.is_dir() {
            return Ok(Vec::new());
        }
        let base = self.snapshot.full_path().to_path_buf();
        let pattern = pattern.to_string();
        tokio::task::spawn_blocking(move || glob_entries(&base, &pattern, kind)).await?
    }
}

impl fmt::Display for AsyncFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot, f)
    }
}

fn glob_entries(base: &Path, pattern: &str, kind: FileKind) -> Result<Vec<FileSnapshot>> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&base.to_string_lossy()),
        pattern
    );
    let mut found = Vec::new();
    for entry in glob::glob(&full)? {
        let path: PathBuf = entry.map_err(|e| Error::Io(e.into_error()))?;
        let snapshot = FileSnapshot::new(&path);
        if snapshot.kind() == kind {
            found.push(snapshot);
        }
    }
    log::debug!("{} entries matched {full}", found.len());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("log.txt"),
            "first line\n\nERROR 42: disk full\ntrailing\n",
        )
        .unwrap();
        fs::create_dir(tmp.path().join("reports-2024")).unwrap();
        fs::create_dir(tmp.path().join("reports-2025")).unwrap();
        fs::create_dir(tmp.path().join("scratch")).unwrap();
        fs::write(tmp.path().join("reports-2023.txt"), "file, not dir").unwrap();
        tmp
    }

    #[tokio::test]
    async fn regex_search_scans_past_blank_lines() {
        let tmp = fixture();
        let file = AsyncFile::new(tmp.path().join("log.txt"));
        assert!(file.contains(r"ERROR \d+").await.unwrap());
        assert!(!file.contains(r"^WARN").await.unwrap());
    }

    #[tokio::test]
    async fn literal_search_does_not_interpret_regex() {
        let tmp = fixture();
        let file = AsyncFile::new(tmp.path().join("log.txt"));
        assert!(file.contains_text("42: disk").await.unwrap());
        assert!(!file.contains_text("4.: disk").await.unwrap());
    }

    #[tokio::test]
    async fn non_utf8_lines_are_searched() {
        let tmp = fixture();
        let path = tmp.path().join("latin1.log");
        fs::write(&path, b"caf\xe9 menu\r\nERROR 42\n").unwrap();
        let file = AsyncFile::new(&path);
        assert!(file.contains("ERROR").await.unwrap());
        assert!(file.contains(r"^ERROR 42$").await.unwrap());
        assert!(file.contains_text("caf").await.unwrap());
        assert!(!file.contains_text("WARN").await.unwrap());
    }

    #[tokio::test]
    async fn missing_file_yields_false() {
        let tmp = fixture();
        let file = AsyncFile::new(tmp.path().join("nope.txt"));
        assert!(!file.contains("anything").await.unwrap());
        assert_eq!(file.size(), 0);
    }

    #[tokio::test]
    async fn invalid_regex_is_an_error() {
        let tmp = fixture();
        let file = AsyncFile::new(tmp.path().join("log.txt"));
        assert!(matches!(file.contains("(unclosed").await, Err(Error::Pattern(_))));
    }

    #[tokio::test]
    async fn file_deleted_after_snapshot_yields_false() {
        let tmp = fixture();
        let path = tmp.path().join("log.txt");
        let file = AsyncFile::new(&path);
        fs::remove_file(&path).unwrap();
        assert!(!file.contains_text("ERROR").await.unwrap());
    }

    #[tokio::test]
    async fn directory_search_returns_only_directories() {
        let tmp = fixture();
        let dir = AsyncFile::new(tmp.path());
        let found = dir.search_directories("reports-*").await.unwrap();
        let names: Vec<String> = found.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["reports-2024", "reports-2025"]);
    }

    #[tokio::test]
    async fn file_search_returns_only_files() {
        let tmp = fixture();
        let dir = AsyncFile::new(tmp.path());
        let found = dir.search_files("*.txt").await.unwrap();
        let names: Vec<String> = found.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["log.txt", "reports-2023.txt"]);
    }

    #[tokio::test]
    async fn search_on_missing_dir_is_empty() {
        let tmp = fixture();
        let dir = AsyncFile::new(tmp.path().join("gone"));
        assert!(dir.search_directories("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_glob_is_an_error() {
        let tmp = fixture();
        let dir = AsyncFile::new(tmp.path());
        assert!(matches!(dir.search_files("[").await, Err(Error::Glob(_))));
    }

    #[tokio::test]
    async fn open_all_preserves_order() {
        let tmp = fixture();
        let snaps = AsyncFile::open_all([tmp.path().join("scratch"), tmp.path().join("log.txt")])
            .await
            .unwrap();
        assert!(snaps[0].is_dir());
        assert!(snaps[1].is_file());
    }

    #[tokio::test]
    async fn parent_of_file_is_its_directory() {
        let tmp = fixture();
        let file = AsyncFile::new(tmp.path().join("log.txt"));
        let parent = file.parent().await.unwrap().unwrap();
        assert!(parent.is_dir());
        assert_eq!(parent.full_path(), AsyncFile::new(tmp.path()).snapshot().full_path());
    }
}
