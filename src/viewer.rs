//! Where an article's URL goes when the user opens or shares it.
//!
//! Both collaborators are thin pass-throughs; the presenter only hands them a
//! URL and reports the result.  Tests substitute recording fakes.

use std::io::{self, Write};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Displays the page behind an article URL.
pub trait DetailViewer {
    fn render(&self, url: &str) -> Result<()>;
}

/// Hands an article URL to the user's environment.
pub trait ShareTarget {
    fn share(&self, url: &str) -> Result<()>;
}

/// Opens articles in the system web browser.
pub struct BrowserViewer;

impl DetailViewer for BrowserViewer {
    fn render(&self, url: &str) -> Result<()> {
        webbrowser::open(url).with_context(|| format!("failed to open browser for {url}"))
    }
}

/// Copies the URL to the clipboard with an OSC 52 escape.  Works over SSH in
/// terminals that honour it; others ignore the sequence.
pub struct ClipboardShare;

impl ShareTarget for ClipboardShare {
    fn share(&self, url: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout
            .write_all(osc52_sequence(url).as_bytes())
            .and_then(|_| stdout.flush())
            .context("failed to write clipboard sequence")
    }
}

fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
