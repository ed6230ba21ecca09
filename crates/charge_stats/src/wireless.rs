//! Wireless charging log: adapter mode, negotiated capabilities, and per-soc power samples.
//!
//! The log opens with two head lines, `A:<mode>` and `D:<7 hex words>`, followed by
//! power samples of the form `<soc>:<alignment>, <vrect>,<iout>, <pout>, <of_freq>`.

use crate::error::{FormatMismatch, RecordKind};
use crate::model::{AdapterExtension, AdapterType, WirelessPowerStats};
use crate::scan::LineFormat;

const ADAPTER_TYPE_FORMAT: LineFormat =
    LineFormat::new("wireless_adapter_type", "A:%d", &["sys_mode"]);

const CAPABILITIES_FORMAT: LineFormat = LineFormat::new(
    "wireless_capabilities",
    "D:%x,%x,%x,%x,%x, %x,%x",
    &["cap0", "cap1", "cap2", "cap3", "cap4", "rs0", "rs1"],
);

const POWER_SAMPLE_FORMAT: LineFormat = LineFormat::new(
    "wireless_power_sample",
    "%d:%d, %d,%d, %d, %d",
    &["soc", "alignment", "vrect", "iout", "pout", "of_freq"],
);

/// Maps the wireless receiver's system mode to the adapter type reported upstream.
pub fn translate_sys_mode(sys_mode: i32) -> AdapterType {
    match sys_mode {
        1 => AdapterType::WpcBpp,
        2 => AdapterType::WpcEpp,
        3 => AdapterType::WpcGpp,
        4 => AdapterType::Wpc10W,
        5 => AdapterType::WpcL7,
        0xe0 => AdapterType::Dl,
        _ => AdapterType::WlcUnknown,
    }
}

/// The first two lines of a wireless log.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WirelessHead<'a> {
    pub adapter_type_line: &'a str,
    pub capabilities_line: &'a str,
}

impl<'a> WirelessHead<'a> {
    pub fn from_contents(contents: &'a str) -> Self {
        let mut lines = contents.lines().map(|line| line.trim_end_matches('\r'));
        Self {
            adapter_type_line: lines.next().unwrap_or_default(),
            capabilities_line: lines.next().unwrap_or_default(),
        }
    }

    pub fn adapter_type(&self) -> Result<AdapterType, FormatMismatch> {
        ADAPTER_TYPE_FORMAT
            .scan(self.adapter_type_line)
            .and_then(|fields| fields.int("sys_mode"))
            .map(translate_sys_mode)
            .ok_or_else(|| {
                FormatMismatch::new(RecordKind::WirelessAdapterType, self.adapter_type_line)
            })
    }

    pub fn capabilities(&self) -> Result<AdapterExtension, FormatMismatch> {
        let mismatch =
            || FormatMismatch::new(RecordKind::WirelessCapabilities, self.capabilities_line);
        let fields = CAPABILITIES_FORMAT
            .scan(self.capabilities_line)
            .ok_or_else(mismatch)?;
        let word = |name| fields.hex(name).ok_or_else(mismatch);

        Ok(AdapterExtension {
            capabilities: [
                word("cap0")?,
                word("cap1")?,
                word("cap2")?,
                word("cap3")?,
                word("cap4")?,
            ],
            receiver_state: [word("rs0")?, word("rs1")?],
        })
    }
}

/// Remembers where the previous tier ended so each tier aggregates only its own
/// power samples.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TierSocTracker {
    tier_soc: i32,
}

impl TierSocTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates power samples with soc in `(previous tier soc, soc]`, then
    /// advances the tracker to `soc`. Unparseable samples are skipped; an empty
    /// window yields all-zero stats.
    pub fn power_stats(&mut self, soc: i32, payload: &str) -> WirelessPowerStats {
        let low = self.tier_soc;
        self.tier_soc = soc;

        let mut count: i64 = 0;
        let mut sum: i64 = 0;
        let mut stats = WirelessPowerStats::default();

        let samples = payload
            .lines()
            .filter_map(|line| POWER_SAMPLE_FORMAT.scan(line.trim_end_matches('\r')));
        for sample in samples {
            let (Some(sample_soc), Some(pout), Some(of_freq)) = (
                sample.int("soc"),
                sample.int("pout"),
                sample.int("of_freq"),
            ) else {
                continue;
            };
            if sample_soc <= low || sample_soc > soc {
                continue;
            }

            if count == 0 {
                stats.pout_min = pout;
                stats.pout_max = pout;
            } else {
                stats.pout_min = stats.pout_min.min(pout);
                stats.pout_max = stats.pout_max.max(pout);
            }
            stats.of_freq = of_freq;
            sum += i64::from(pout);
            count += 1;
        }

        if count > 0 {
            stats.pout_avg = i32::try_from(sum / count).unwrap_or_default();
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "A:2\n\
        D:1,2,3,4,5, a0,b1\n\
        10:1, 9000,500, 4500, 140\n\
        20:1, 9000,700, 6300, 141\n\
        30:1, 9000,800, 7200, 142\n\
        garbage\n\
        40:1, 9000,600, 5400, 143\n";

    #[test]
    fn sys_mode_translation() {
        assert_eq!(translate_sys_mode(2), AdapterType::WpcEpp);
        assert_eq!(translate_sys_mode(0xe0), AdapterType::Dl);
        assert_eq!(translate_sys_mode(99), AdapterType::WlcUnknown);
    }

    #[test]
    fn head_lines_parse_into_adapter_and_extension() {
        let head = WirelessHead::from_contents(PAYLOAD);
        assert_eq!(head.adapter_type().unwrap(), AdapterType::WpcEpp);
        let ext = head.capabilities().unwrap();
        assert_eq!(ext.capabilities, [1, 2, 3, 4, 5]);
        assert_eq!(ext.receiver_state, [0xa0, 0xb1]);
    }

    #[test]
    fn malformed_head_lines_are_mismatches() {
        let head = WirelessHead::from_contents("B:2\nD:1,2\n");
        assert_eq!(
            head.adapter_type().unwrap_err().kind,
            RecordKind::WirelessAdapterType
        );
        assert_eq!(
            head.capabilities().unwrap_err().kind,
            RecordKind::WirelessCapabilities
        );

        let head = WirelessHead::from_contents("A:1");
        assert_eq!(head.capabilities_line, "");
        assert!(head.capabilities().is_err());
    }

    #[test]
    fn stats_cover_only_the_current_tier_window() {
        let mut tracker = TierSocTracker::new();

        let first = tracker.power_stats(20, PAYLOAD);
        assert_eq!(
            first,
            WirelessPowerStats {
                pout_min: 4500,
                pout_avg: 5400,
                pout_max: 6300,
                of_freq: 141,
            }
        );

        let second = tracker.power_stats(40, PAYLOAD);
        assert_eq!(second.pout_min, 5400);
        assert_eq!(second.pout_max, 7200);
        assert_eq!(second.pout_avg, 6300);
        assert_eq!(second.of_freq, 143);
    }

    #[test]
    fn empty_window_and_bad_payload_default_to_zero() {
        let mut tracker = TierSocTracker::new();
        assert_eq!(tracker.power_stats(5, PAYLOAD), WirelessPowerStats::default());
        assert_eq!(
            tracker.power_stats(50, "not a log"),
            WirelessPowerStats::default()
        );
    }
}
