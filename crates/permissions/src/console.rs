//! Console implementations — terminal and scripted.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use toolgate_core::{Console, ConsoleError};

/// Reads operator answers from stdin and writes banners to stdout.
pub struct StdioConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdioConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdioConsole {
    fn write(&mut self, text: &str) -> Result<(), ConsoleError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .map_err(|e| ConsoleError::WriteFailed(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ConsoleError::WriteFailed(e.to_string()))
    }

    async fn read_line(&mut self) -> Result<Option<String>, ConsoleError> {
        self.lines
            .next_line()
            .await
            .map_err(|e| ConsoleError::ReadFailed(e.to_string()))
    }
}

/// A console fed from a fixed list of answers, capturing everything written.
///
/// Once the answers run out, reads report a closed stream.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: String,
    reads: usize,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: String::new(),
            reads: 0,
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// How many times a line was requested.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output.push_str(text);
        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>, ConsoleError> {
        self.reads += 1;
        Ok(self.inputs.pop_front())
    }
}
