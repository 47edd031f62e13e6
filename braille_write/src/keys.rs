//! Keystroke sinks: where written text ends up.

use std::io::{self, Write};

use tracing::debug;

/// Receives the text produced by a write handler.
pub trait KeySink {
    fn send(&mut self, text: &str) -> io::Result<()>;
}

/// Types into the process's standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutKeys;

impl KeySink for StdoutKeys {
    fn send(&mut self, text: &str) -> io::Result<()> {
        debug!(text, "keystroke");
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullKeys;

impl KeySink for NullKeys {
    fn send(&mut self, _text: &str) -> io::Result<()> { Ok(()) }
}

/// Records each call; handy for tests and transcripts.
impl KeySink for Vec<String> {
    fn send(&mut self, text: &str) -> io::Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

impl<K: KeySink + ?Sized> KeySink for Box<K> {
    fn send(&mut self, text: &str) -> io::Result<()> { (**self).send(text) }
}
