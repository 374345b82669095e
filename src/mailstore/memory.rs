use super::{MailFolder, MailMessage};
use crate::error::Result;

/// Owned in-memory folder tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFolder {
    path: String,
    children: Vec<MemoryFolder>,
    messages: Vec<MemoryMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMessage {
    id: String,
    folder_path: String,
    body: String,
}

impl MemoryFolder {
    pub fn new(path: impl Into<String>) -> Self {
        MemoryFolder {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: MemoryFolder) -> Self {
        self.add_child(child);
        self
    }

    pub fn with_message(mut self, id: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_message(id, body);
        self
    }

    pub fn add_child(&mut self, child: MemoryFolder) {
        self.children.push(child);
    }

    pub fn add_message(&mut self, id: impl Into<String>, body: impl Into<String>) {
        self.messages.push(MemoryMessage {
            id: id.into(),
            folder_path: self.path.clone(),
            body: body.into(),
        });
    }
}

impl MailFolder for MemoryFolder {
    type Message = MemoryMessage;

    fn path(&self) -> &str {
        &self.path
    }

    fn children(&self) -> Result<Vec<Self>> {
        Ok(self.children.clone())
    }

    fn messages(&self) -> Result<Vec<MemoryMessage>> {
        Ok(self.messages.clone())
    }
}

impl MailMessage for MemoryMessage {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn folder_path(&self) -> &str {
        &self.folder_path
    }

    fn body(&self) -> Result<String> {
        Ok(self.body.clone())
    }
}
