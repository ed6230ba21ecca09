//! USB Power-Delivery negotiation summaries for wired fast-charge sessions.

use crate::error::{FormatMismatch, RecordKind};
use crate::scan::LineFormat;

const SUMMARY_FORMAT: LineFormat = LineFormat::new(
    "pca_summary",
    "D:%x,%x %x,%x,%x,%x,%x",
    &["ac0", "ac1", "rs0", "rs1", "rs2", "rs3", "rs4"],
);

// Charger metrics carry the same words comma-joined.
const PDO_FORMAT: LineFormat = LineFormat::new(
    "charger_metrics_pdo",
    "D:%x,%x,%x,%x,%x,%x,%x",
    &["ac0", "apdo", "rs0", "rs1", "rs2", "rs3", "pdo"],
);

/// Adapter capability and receiver state words from the PD/PCA log.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct PcaSummary {
    pub adapter_capabilities: [u32; 2],
    pub receiver_state: [u32; 5],
}

impl PcaSummary {
    pub fn parse(line: &str) -> Result<Self, FormatMismatch> {
        let mismatch = || FormatMismatch::new(RecordKind::PcaSummary, line);
        let fields = SUMMARY_FORMAT.scan(line).ok_or_else(mismatch)?;
        let word = |name| fields.hex(name).ok_or_else(mismatch);

        Ok(Self {
            adapter_capabilities: [word("ac0")?, word("ac1")?],
            receiver_state: [
                word("rs0")?,
                word("rs1")?,
                word("rs2")?,
                word("rs3")?,
                word("rs4")?,
            ],
        })
    }
}

/// Summary line of a freshly consumed PD/PCA log, if it has one.
pub fn summary_line(contents: &str) -> Option<&str> {
    let line = contents.lines().next()?.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    Some(line)
}

/// APDO and PDO words reported by the charger metrics log.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PdoOverride {
    pub apdo: u32,
    pub pdo: u32,
}

/// First `D:` line in the charger metrics log that carries PDO words.
pub fn first_pdo_override(charger_metrics: &str) -> Option<PdoOverride> {
    charger_metrics
        .lines()
        .filter_map(|line| PDO_FORMAT.scan(line.trim_end_matches('\r')))
        .find_map(|fields| {
            Some(PdoOverride {
                apdo: fields.hex("apdo")?,
                pdo: fields.hex("pdo")?,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_words() {
        let summary = PcaSummary::parse("D:11,22 a,b,c,d,e").unwrap();
        assert_eq!(summary.adapter_capabilities, [0x11, 0x22]);
        assert_eq!(summary.receiver_state, [0xa, 0xb, 0xc, 0xd, 0xe]);
    }

    #[test]
    fn comma_joined_words_are_not_a_summary() {
        let err = PcaSummary::parse("D:11,22,a,b,c,d,e").unwrap_err();
        assert_eq!(err.kind, RecordKind::PcaSummary);
        assert!(PcaSummary::parse("").is_err());
    }

    #[test]
    fn summary_line_skips_blank_logs() {
        assert_eq!(summary_line("D:1,2 3,4,5,6,7\r\nextra"), Some("D:1,2 3,4,5,6,7"));
        assert_eq!(summary_line("\n"), None);
        assert_eq!(summary_line(""), None);
    }

    #[test]
    fn first_matching_pdo_line_wins() {
        let metrics = "0, 50.0,1,2, 3,4,5, 6,7,8, 9,10,11, 12,13,14\n\
            D:1,2 3,4,5,6,7\n\
            D:1,aa,3,4,5,6,bb\n\
            D:1,cc,3,4,5,6,dd\n";
        assert_eq!(
            first_pdo_override(metrics),
            Some(PdoOverride {
                apdo: 0xaa,
                pdo: 0xbb
            })
        );
        assert_eq!(first_pdo_override("1,2,3\n"), None);
    }
}
