use crate::error::FormatMismatch;

/// A stateful parser fed one log line at a time.
pub trait LineParser {
    type Record;

    /// `Ok(None)` means the line carries no record and is not an error.
    fn parse_line(&mut self, line: &str) -> Result<Option<Self::Record>, FormatMismatch>;
}
