//! Sharing the current page: the link goes to the terminal clipboard via OSC 52.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::error::Result;

pub fn share_text(title: &str, url: &str) -> String {
    format!("{} - {}", title, url)
}

/// OSC 52 "set clipboard" escape carrying `text`
pub fn clipboard_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Copy the share text for `title` and `url` to the clipboard and return it
pub fn share(out: &mut impl Write, title: &str, url: &str) -> Result<String> {
    let text = share_text(title, url);
    out.write_all(clipboard_sequence(&text).as_bytes())?;
    out.flush()?;
    info!(url = %url, "Shared link");
    Ok(text)
}
