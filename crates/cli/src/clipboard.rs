//! Terminal clipboard over the OSC 52 escape sequence.

use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use storefront_core::share::{Clipboard, ShareError};

/// Asks the attached terminal emulator to place text on the system clipboard.
///
/// The sequence goes to stderr so stdout stays parseable. Copying fails when stderr is
/// not a terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct Osc52Clipboard;

pub fn osc52_sequence(text: &str) -> String {
    format!("\u{1b}]52;c;{}\u{7}", STANDARD.encode(text))
}

fn write_sequence(text: &str) -> anyhow::Result<()> {
    let mut stderr = io::stderr().lock();
    if !stderr.is_terminal() {
        bail!("stderr is not attached to a terminal");
    }
    stderr
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|()| stderr.flush())
        .context("failed to write clipboard escape sequence")
}

#[async_trait]
impl Clipboard for Osc52Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ShareError> {
        write_sequence(text).map_err(|error| ShareError::Failed(format!("{error:#}")))
    }
}
