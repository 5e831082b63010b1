//! The text clipboard range operations read from and write to

use crate::{Error, Result};

/// A system clipboard or any other text buffer
///
/// Copy and paste only exchange the tab/newline text block; how the text
/// reaches the operating system is up to the implementation.
pub trait Clipboard {
    /// Current clipboard text
    fn read_text(&mut self) -> Result<String>;

    /// Replace the clipboard text
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// In-process clipboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// The last text written, if any
    pub fn contents(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.text
            .clone()
            .ok_or_else(|| Error::Clipboard("nothing has been copied".into()))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }
}
