pub mod config;
pub mod directory;
pub mod error;
pub mod file;
pub mod mailstore;
pub mod mime;
pub mod models;

pub use config::Config;
pub use directory::{AccessControl, Directory, DirectoryOps};
pub use error::{Error, Result};
pub use file::{AsyncFile, FileKind, FileSnapshot};
pub use mailstore::{
    search_configured, search_folders, search_folders_async, search_messages, FolderFilter,
    MailFolder, MailMessage, MaildirFolder, MemoryFolder, MessageMatch, SearchReport,
};
pub use models::{ContentField, EmailContent, SubscriptionId};
