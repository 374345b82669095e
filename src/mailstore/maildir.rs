use std::fs;
use std::path::{Path, PathBuf};

use super::{MailFolder, MailMessage};
use crate::error::{Error, Result};
use crate::mime;

/// Maildir subdirectories that hold messages, in scan order.
const MESSAGE_DIRS: &[&str] = &["new", "cur"];
const RESERVED_DIRS: &[&str] = &["new", "cur", "tmp"];

/// A folder in a Maildir tree on disk.
///
/// Subfolders are nested directories (`Mail/Inbox/Work`). A directory with no
/// `cur`/`new` is treated as a container with no messages of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaildirFolder {
    dir: PathBuf,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaildirMessage {
    file: PathBuf,
    folder_path: String,
}

impl MaildirFolder {
    /// Open the tree rooted at `dir`. Its folder path is the directory name.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::NotFound(dir.display().to_string()));
        }
        let path = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        log::debug!("Opened maildir tree {} as '{}'", dir.display(), path);
        Ok(MaildirFolder { dir, path })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether this directory holds messages directly.
    pub fn is_maildir(&self) -> bool {
        MESSAGE_DIRS.iter().any(|d| self.dir.join(d).is_dir())
    }

    fn sorted_entries(&self, dir: &Path) -> Result<Vec<fs::DirEntry>> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| Error::traversal(self.path.clone(), e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::traversal(self.path.clone(), e))?;
        entries.sort_by_key(|e| e.file_name());
        Ok(entries)
    }
}

impl MailFolder for MaildirFolder {
    type Message = MaildirMessage;

    fn path(&self) -> &str {
        &self.path
    }

    fn children(&self) -> Result<Vec<Self>> {
        let mut children = Vec::new();
        for entry in self.sorted_entries(&self.dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if RESERVED_DIRS.contains(&name.as_str()) || !entry.path().is_dir() {
                continue;
            }
            children.push(MaildirFolder {
                dir: entry.path(),
                path: format!("{}/{}", self.path, name),
            });
        }
        Ok(children)
    }

    fn messages(&self) -> Result<Vec<MaildirMessage>> {
        let mut messages = Vec::new();
        for sub in MESSAGE_DIRS {
            let dir = self.dir.join(sub);
            if !dir.is_dir() {
                continue;
            }
            for entry in self.sorted_entries(&dir)? {
                if entry.path().is_file() {
                    messages.push(MaildirMessage {
                        file: entry.path(),
                        folder_path: self.path.clone(),
                    });
                }
            }
        }
        Ok(messages)
    }
}

impl MaildirMessage {
    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl MailMessage for MaildirMessage {
    /// The unique part of the file name, without the `:2,FLAGS` info suffix.
    fn id(&self) -> String {
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.split_once(':') {
            Some((unique, _)) => unique.to_string(),
            None => name,
        }
    }

    fn folder_path(&self) -> &str {
        &self.folder_path
    }

    fn body(&self) -> Result<String> {
        let raw = fs::read(&self.file).map_err(|e| {
            Error::traversal(self.folder_path.clone(), format!("{}: {e}", self.file.display()))
        })?;
        mime::body_text(raw)
    }
}
