//! Line-oriented output stream contract.

use fanlog_shared::Result;

/// A byte stream receiving fully rendered lines.
pub trait LineSink: Send + Sync {
    /// Write `line` followed by a newline.
    fn write_line(&self, line: &str) -> Result<()>;

    /// Flush buffered bytes.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
