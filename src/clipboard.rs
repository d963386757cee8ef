//! Clipboard access.
//!
//! The monitor only needs plain text in and out, so the system clipboard is
//! hidden behind [`ClipboardAccess`] and tests swap in an in-memory fake.

use anyhow::{Context, Result};
use arboard::Clipboard;

pub trait ClipboardAccess {
    /// Current clipboard text. Empty when the clipboard holds no text.
    fn read_text(&mut self) -> Result<String>;

    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard backed by arboard
pub struct SystemClipboard {
    inner: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { inner })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&mut self) -> Result<String> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            // Empty clipboard, or an image/file list: nothing to match
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(e).context("Failed to read clipboard text"),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .context("Failed to set clipboard text")
    }
}
