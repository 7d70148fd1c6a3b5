//! Console trait — the operator I/O transport.
//!
//! The decision prompt writes a banner and then blocks on exactly one line of
//! operator input. Implementations decide where those lines come from.

use async_trait::async_trait;

use crate::error::ConsoleError;

/// Line-oriented operator console.
#[async_trait]
pub trait Console: Send {
    /// Write text to the operator. No newline is appended.
    fn write(&mut self, text: &str) -> Result<(), ConsoleError>;

    /// Block until the operator supplies one line.
    ///
    /// Returns `Ok(None)` when the input stream is closed.
    async fn read_line(&mut self) -> Result<Option<String>, ConsoleError>;

    /// Write text followed by a newline.
    fn write_line(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.write(text)?;
        self.write("\n")
    }
}
