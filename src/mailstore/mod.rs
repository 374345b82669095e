//! Mail folder traversal and body search.
//!
//! The mail store is reached only through [`MailFolder`] and [`MailMessage`],
//! so the walk in [`search_folders`] runs the same way over a Maildir tree on
//! disk or an in-memory tree built by a host.

mod maildir;
mod memory;
mod search;

use serde::{Deserialize, Serialize};

use crate::config::{Config, DEFAULT_FOLDER_FILTERS};
use crate::error::{Error, Result};

pub use maildir::{MaildirFolder, MaildirMessage};
pub use memory::{MemoryFolder, MemoryMessage};
pub use search::{search_folders, search_folders_async, search_messages};

/// A single email item inside exactly one folder.
pub trait MailMessage {
    /// Store-local identifier.
    fn id(&self) -> String;
    /// Path of the containing folder.
    fn folder_path(&self) -> &str;
    /// Searchable body text.
    fn body(&self) -> Result<String>;
}

/// A node in the mail-store hierarchy.
pub trait MailFolder: Sized {
    type Message: MailMessage;

    /// Full folder path; filter markers are matched against it.
    fn path(&self) -> &str;
    /// Direct subfolders, in store order.
    fn children(&self) -> Result<Vec<Self>>;
    /// Messages directly inside this folder, in store order.
    fn messages(&self) -> Result<Vec<Self::Message>>;
}

/// Case-sensitive path markers that decide which subfolders are descended into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFilter {
    markers: Vec<String>,
}

impl FolderFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FolderFilter {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// True when any marker occurs in `path`.
    pub fn accepts(&self, path: &str) -> bool {
        self.markers.iter().any(|m| path.contains(m.as_str()))
    }
}

impl Default for FolderFilter {
    fn default() -> Self {
        FolderFilter::new(DEFAULT_FOLDER_FILTERS.iter().copied())
    }
}

/// A message whose body contained the search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMatch {
    pub folder_path: String,
    pub message_id: String,
    /// First body line containing the term, trimmed and shortened.
    pub snippet: String,
}

/// Outcome of a folder walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Folder paths in the order they were scanned.
    pub visited: Vec<String>,
    pub messages_scanned: usize,
    pub matches: Vec<MessageMatch>,
}

/// Search the Maildir tree at `config.mail_root` with the configured filters.
pub async fn search_configured(config: &Config, term: &str) -> Result<SearchReport> {
    let root = config
        .mail_root
        .clone()
        .ok_or_else(|| Error::Config("mail_root is not set".into()))?;
    let folder = MaildirFolder::open(root)?;
    search_folders_async(folder, term.to_string(), config.folder_filter()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_accepts_inbox_and_deleted() {
        let filter = FolderFilter::default();
        assert!(filter.accepts("\\\\me@example.com\\Inbox"));
        assert!(filter.accepts("Mail/Deleted Items"));
        assert!(!filter.accepts("Mail/Sent"));
    }

    #[test]
    fn filter_is_case_sensitive() {
        let filter = FolderFilter::default();
        assert!(!filter.accepts("Mail/inbox"));
        assert!(!filter.accepts("Mail/DELETED"));
    }

    #[tokio::test]
    async fn search_configured_requires_mail_root() {
        let err = search_configured(&Config::default(), "x").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_filter_accepts_nothing() {
        let filter = FolderFilter::new(Vec::<String>::new());
        assert!(!filter.accepts("Inbox"));
    }
}
