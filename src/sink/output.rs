//! Text-output primitives the sink writes through.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::severity::LogLevel;

/// Destination for emitted diagnostic lines.
///
/// Implementations receive one fully formatted line at a time (no trailing
/// newline) along with the level it was emitted at.
pub trait LogOutput: Send {
    /// Write one line
    fn write_line(&mut self, level: LogLevel, line: &str) -> io::Result<()>;
}

/// Output over any `io::Write`, one newline-terminated line per emission.
pub struct WriterOutput<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterOutput<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterOutput<io::Stderr> {
    /// Write to standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl WriterOutput<io::Stdout> {
    /// Write to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogOutput for WriterOutput<W> {
    fn write_line(&mut self, _level: LogLevel, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write + Send> fmt::Debug for WriterOutput<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterOutput").finish_non_exhaustive()
    }
}

/// In-memory capture of emitted lines.
///
/// Clones share the same storage, so one handle can be given to the sink
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryOutput {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every captured line
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured lines joined with newlines
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// Discard everything captured so far
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogOutput for MemoryOutput {
    fn write_line(&mut self, _level: LogLevel, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_output_appends_newline() {
        let mut output = WriterOutput::new(Vec::new());
        output.write_line(LogLevel::Info, "[INFO] one").unwrap();
        output.write_line(LogLevel::Info, "[INFO] two").unwrap();
        assert_eq!(
            String::from_utf8(output.into_inner()).unwrap(),
            "[INFO] one\n[INFO] two\n"
        );
    }

    #[test]
    fn test_memory_output_clones_share_storage() {
        let capture = MemoryOutput::new();
        let mut handle = capture.clone();
        handle.write_line(LogLevel::Warn, "shared").unwrap();
        assert_eq!(capture.lines(), vec!["shared".to_string()]);

        capture.clear();
        assert!(handle.lines().is_empty());
    }

    #[test]
    fn test_outputs_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<MemoryOutput>();
        assert_send::<WriterOutput<Vec<u8>>>();
    }
}
