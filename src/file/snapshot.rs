use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What the path pointed at when the snapshot was taken (symlinks followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Directory,
    Other,
    Missing,
}

/// Metadata captured once at construction.
///
/// Nothing is re-read afterwards; call [`FileSnapshot::refresh`] for a new
/// view of the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    input: PathBuf,
    full_path: PathBuf,
    kind: FileKind,
    symlink: bool,
    read_only: bool,
    hidden: bool,
    len: u64,
    created: Option<DateTime<Local>>,
    modified: Option<DateTime<Local>>,
    has_parent: bool,
}

impl FileSnapshot {
    /// Snapshot `path`. Never fails: unreadable or missing paths yield
    /// [`FileKind::Missing`] with zero size and no timestamps.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let input = path.as_ref().to_path_buf();
        let full_path = std::path::absolute(&input).unwrap_or_else(|_| input.clone());
        let has_parent = full_path
            .parent()
            .is_some_and(|p| !p.as_os_str().is_empty());
        let hidden = full_path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        let symlink = fs::symlink_metadata(&input)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        let mut snapshot = FileSnapshot {
            input,
            full_path,
            kind: FileKind::Missing,
            symlink,
            read_only: false,
            hidden,
            len: 0,
            created: None,
            modified: None,
            has_parent,
        };

        let meta = match fs::metadata(&snapshot.input) {
            Ok(meta) => meta,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::debug!("metadata for {} unavailable: {e}", snapshot.input.display());
                }
                return snapshot;
            }
        };

        snapshot.kind = if meta.is_file() {
            FileKind::File
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        snapshot.read_only = meta.permissions().readonly();
        snapshot.len = if meta.is_file() { meta.len() } else { 0 };
        snapshot.created = meta.created().ok().map(DateTime::<Local>::from);
        snapshot.modified = meta.modified().ok().map(DateTime::<Local>::from);
        snapshot
    }

    /// Take a fresh snapshot of the same input path.
    pub fn refresh(&self) -> Self {
        Self::new(&self.input)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn exists(&self) -> bool {
        self.kind != FileKind::Missing
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.symlink
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Size in bytes; 0 for directories and missing paths.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn created(&self) -> Option<DateTime<Local>> {
        self.created
    }

    pub fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }

    pub fn has_parent(&self) -> bool {
        self.has_parent
    }

    pub fn name(&self) -> String {
        self.full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.full_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension without the leading dot, or `""`.
    pub fn extension(&self) -> String {
        self.full_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn has_extension(&self) -> bool {
        self.full_path.extension().is_some()
    }

    /// Prefix and root of the absolute path (`/`, `C:\`).
    pub fn root(&self) -> String {
        let mut root = PathBuf::new();
        for component in self.full_path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => root.push(component.as_os_str()),
                _ => break,
            }
        }
        root.to_string_lossy().into_owned()
    }

    /// Separator between entries of a path list (`PATH`).
    pub fn path_separator(&self) -> char {
        if cfg!(windows) {
            ';'
        } else {
            ':'
        }
    }

    pub fn drive_separator(&self) -> char {
        if cfg!(windows) {
            ':'
        } else {
            '/'
        }
    }

    pub fn folder_separator(&self) -> char {
        std::path::MAIN_SEPARATOR
    }

    pub fn parent(&self) -> Option<FileSnapshot> {
        self.full_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(FileSnapshot::new)
    }

    /// Comma-separated attribute names, `Normal` when none apply.
    pub fn attributes(&self) -> String {
        if !self.exists() {
            return "None".into();
        }
        let mut attrs = Vec::new();
        if self.is_dir() {
            attrs.push("Directory");
        }
        if self.read_only {
            attrs.push("ReadOnly");
        }
        if self.hidden {
            attrs.push("Hidden");
        }
        if self.symlink {
            attrs.push("ReparsePoint");
        }
        if attrs.is_empty() {
            "Normal".into()
        } else {
            attrs.join(", ")
        }
    }

    /// Multi-line, tab-indented description of every captured field.
    pub fn describe(&self) -> String {
        let fields = [
            ("File Name", self.name()),
            ("File Path", self.full_path.display().to_string()),
            ("File Attributes", self.attributes()),
            ("Extension", self.extension()),
            ("Path Root", self.root()),
            ("Path Separator", self.path_separator().to_string()),
            ("Drive Separator", self.drive_separator().to_string()),
            ("Folder Separator", self.folder_separator().to_string()),
            ("Length", group_thousands(self.len)),
            ("Created", short_date(self.created)),
            ("Modified", short_date(self.modified)),
        ];
        let mut text = String::from("\n");
        for (label, value) in fields {
            text.push_str(&format!("\t{label}: \t{value}\n\n"));
        }
        text
    }
}

impl fmt::Display for FileSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn short_date(ts: Option<DateTime<Local>>) -> String {
    ts.map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let snap = FileSnapshot::new(tmp.path().join("missing.txt"));
        assert!(!snap.exists());
        assert_eq!(snap.kind(), FileKind::Missing);
        assert_eq!(snap.len(), 0);
        assert!(snap.created().is_none());
        assert!(snap.modified().is_none());
        assert_eq!(snap.extension(), "txt");
        assert_eq!(snap.attributes(), "None");
    }

    #[test]
    fn no_extension_is_empty() {
        let snap = FileSnapshot::new("/tmp/README");
        assert_eq!(snap.extension(), "");
        assert!(!snap.has_extension());
        assert_eq!(snap.stem(), "README");
    }

    #[test]
    fn dotfile_is_hidden_without_extension() {
        let snap = FileSnapshot::new("/home/me/.bashrc");
        assert!(snap.is_hidden());
        assert_eq!(snap.extension(), "");
        assert_eq!(snap.name(), ".bashrc");
    }

    #[test]
    fn existing_file_captures_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.final.csv");
        fs::write(&path, vec![b'x'; 1234]).unwrap();

        let snap = FileSnapshot::new(&path);
        assert!(snap.exists());
        assert!(snap.is_file());
        assert_eq!(snap.len(), 1234);
        assert_eq!(snap.name(), "report.final.csv");
        assert_eq!(snap.stem(), "report.final");
        assert_eq!(snap.extension(), "csv");
        assert!(snap.modified().is_some());
        assert!(snap.has_parent());
        assert!(snap.parent().unwrap().is_dir());
    }

    #[test]
    fn relative_input_resolves_to_absolute() {
        let snap = FileSnapshot::new("some/relative/file.txt");
        assert!(snap.full_path().is_absolute());
        assert_eq!(snap.input(), Path::new("some/relative/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn unix_separators_and_root() {
        let snap = FileSnapshot::new("/var/log/syslog");
        assert_eq!(snap.root(), "/");
        assert_eq!(snap.folder_separator(), '/');
        assert_eq!(snap.path_separator(), ':');
        assert_eq!(snap.drive_separator(), '/');
    }

    #[test]
    fn snapshot_goes_stale_until_refreshed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("grow.log");
        fs::write(&path, "abc").unwrap();
        let snap = FileSnapshot::new(&path);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"defgh").unwrap();
        drop(file);

        assert_eq!(snap.len(), 3);
        assert_eq!(snap.refresh().len(), 8);
    }

    #[test]
    fn describe_lists_every_field() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("big.bin");
        fs::write(&path, vec![0u8; 1_234_567]).unwrap();
        let text = FileSnapshot::new(&path).to_string();

        for label in [
            "File Name",
            "File Path",
            "File Attributes",
            "Extension",
            "Path Root",
            "Path Separator",
            "Drive Separator",
            "Folder Separator",
            "Length",
            "Created",
            "Modified",
        ] {
            assert!(text.contains(&format!("\t{label}: \t")), "missing {label}");
        }
        assert!(text.contains("\tLength: \t1,234,567\n"));
        assert!(text.contains("\tExtension: \tbin\n"));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn directory_attributes() {
        let tmp = tempfile::tempdir().unwrap();
        let snap = FileSnapshot::new(tmp.path());
        assert!(snap.is_dir());
        assert_eq!(snap.len(), 0);
        assert!(snap.attributes().contains("Directory"));
    }
}
