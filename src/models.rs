use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which field of an [`EmailContent`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    Subject,
    Message,
    IsHtml,
    Attachments,
}

/// Handle returned by [`EmailContent::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

type Observer = Box<dyn Fn(ContentField) + Send + Sync>;

/// Subject, body and attachment paths of an email being prepared.
///
/// Setters return whether the value changed and notify observers only then.
/// Observers are not cloned or serialized.
#[derive(Default, Serialize, Deserialize)]
pub struct EmailContent {
    subject: String,
    message: String,
    #[serde(default)]
    is_html: bool,
    #[serde(default)]
    attachments: Vec<PathBuf>,
    #[serde(skip)]
    observers: Vec<(SubscriptionId, Observer)>,
}

impl EmailContent {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        EmailContent {
            subject: subject.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, is_html: bool) -> Self {
        self.is_html = is_html;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<PathBuf>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_html(&self) -> bool {
        self.is_html
    }

    pub fn attachments(&self) -> &[PathBuf] {
        &self.attachments
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> bool {
        let subject = subject.into();
        if self.subject == subject {
            return false;
        }
        self.subject = subject;
        self.notify(ContentField::Subject);
        true
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.message == message {
            return false;
        }
        self.message = message;
        self.notify(ContentField::Message);
        true
    }

    pub fn set_html(&mut self, is_html: bool) -> bool {
        if self.is_html == is_html {
            return false;
        }
        self.is_html = is_html;
        self.notify(ContentField::IsHtml);
        true
    }

    pub fn set_attachments(&mut self, attachments: Vec<PathBuf>) -> bool {
        if self.attachments == attachments {
            return false;
        }
        self.attachments = attachments;
        self.notify(ContentField::Attachments);
        true
    }

    /// Attach an existing file.
    pub fn add_attachment(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        self.attachments.push(path.to_path_buf());
        self.notify(ContentField::Attachments);
        Ok(())
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(ContentField) + Send + Sync + 'static,
    {
        let id = SubscriptionId(uuid::Uuid::new_v4());
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn into_parts(self) -> (String, String, Vec<PathBuf>) {
        (self.subject, self.message, self.attachments)
    }

    fn notify(&self, field: ContentField) {
        log::debug!("EmailContent {:?} changed ({} observers)", field, self.observers.len());
        for (_, observer) in &self.observers {
            observer(field);
        }
    }
}

impl Clone for EmailContent {
    fn clone(&self) -> Self {
        EmailContent {
            subject: self.subject.clone(),
            message: self.message.clone(),
            is_html: self.is_html,
            attachments: self.attachments.clone(),
            observers: Vec::new(),
        }
    }
}

impl PartialEq for EmailContent {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.message == other.message
            && self.is_html == other.is_html
            && self.attachments == other.attachments
    }
}

impl fmt::Debug for EmailContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailContent")
            .field("subject", &self.subject)
            .field("message", &self.message)
            .field("is_html", &self.is_html)
            .field("attachments", &self.attachments)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl fmt::Display for EmailContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
