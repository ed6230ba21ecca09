use std::iter::Enumerate;
use std::str::Lines;

use crate::error::LineRecord;
use crate::line_parser::LineParser;
use crate::source::CONSUMED_MARKER;

/// Feeds the lines of an already-consumed log through a [`LineParser`].
///
/// Blank lines and the consumed marker are skipped; every other line yields a
/// [`LineRecord`] carrying either the parsed record or the format mismatch.
pub struct LineIngestor<'a, P: LineParser> {
    lines: Enumerate<Lines<'a>>,
    first_line_number: usize,
    parser: P,
}

impl<'a, P: LineParser> LineIngestor<'a, P> {
    pub fn new(text: &'a str, parser: P) -> Self {
        Self {
            lines: text.lines().enumerate(),
            first_line_number: 1,
            parser,
        }
    }

    /// Numbers records as if `text` started at `line_number` of its source.
    pub fn starting_at(mut self, line_number: usize) -> Self {
        self.first_line_number = line_number;
        self
    }

    fn normalize_line(line: &str) -> &str {
        line.strip_suffix('\r').unwrap_or(line)
    }

    fn line_is_blank(line: &str) -> bool {
        line.chars().all(|ch| ch.is_whitespace() || ch == '\0')
    }
}

impl<P: LineParser> Iterator for LineIngestor<'_, P> {
    type Item = LineRecord<P::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, raw) = self.lines.next()?;
            let line = Self::normalize_line(raw);
            if Self::line_is_blank(line) || line.trim() == CONSUMED_MARKER {
                continue;
            }

            let line_number = self.first_line_number + idx;
            match self.parser.parse_line(line) {
                Ok(None) => continue,
                Ok(Some(record)) => {
                    return Some(LineRecord {
                        line_number,
                        outcome: Ok(record),
                    });
                }
                Err(err) => {
                    return Some(LineRecord {
                        line_number,
                        outcome: Err(err),
                    });
                }
            }
        }
    }
}
