use crate::error::{FormatMismatch, RecordKind};
use crate::line_parser::LineParser;
use crate::model::VoltageTierSample;
use crate::scan::{LineFormat, ScannedFields};
use crate::wireless::TierSocTracker;

const TIER_FORMAT: LineFormat = LineFormat::new(
    "voltage_tier",
    "%d, %f,%d,%d, %d,%d,%d, %d,%d,%d, %d,%d,%d, %d,%d,%d",
    &[
        "voltage_tier",
        "soc_in",
        "cc_in",
        "temp_in",
        "time_fast_secs",
        "time_taper_secs",
        "time_other_secs",
        "temp_min",
        "temp_avg",
        "temp_max",
        "ibatt_min",
        "ibatt_avg",
        "ibatt_max",
        "icl_min",
        "icl_avg",
        "icl_max",
    ],
);

/// Parses one tier line without wireless enrichment.
pub fn parse_tier_line(line: &str) -> Result<VoltageTierSample, FormatMismatch> {
    TIER_FORMAT
        .scan(line)
        .as_ref()
        .and_then(sample_from_fields)
        .ok_or_else(|| FormatMismatch::new(RecordKind::VoltageTier, line))
}

fn sample_from_fields(fields: &ScannedFields) -> Option<VoltageTierSample> {
    Some(VoltageTierSample {
        voltage_tier: fields.int("voltage_tier")?,
        soc_in: fields.float("soc_in")?,
        cc_in: fields.int("cc_in")?,
        temp_in: fields.int("temp_in")?,
        time_fast_secs: fields.int("time_fast_secs")?,
        time_taper_secs: fields.int("time_taper_secs")?,
        time_other_secs: fields.int("time_other_secs")?,
        temp_min: fields.int("temp_min")?,
        temp_avg: fields.int("temp_avg")?,
        temp_max: fields.int("temp_max")?,
        ibatt_min: fields.int("ibatt_min")?,
        ibatt_avg: fields.int("ibatt_avg")?,
        ibatt_max: fields.int("ibatt_max")?,
        icl_min: fields.int("icl_min")?,
        icl_avg: fields.int("icl_avg")?,
        icl_max: fields.int("icl_max")?,
        wireless: None,
    })
}

#[derive(Debug, Clone)]
struct WirelessContext<'a> {
    payload: &'a str,
    tracker: TierSocTracker,
}

/// Turns tier lines into [`VoltageTierSample`]s, adding wireless power stats
/// when the invocation carried a wireless log.
#[derive(Debug, Clone, Default)]
pub struct TierParser<'a> {
    wireless: Option<WirelessContext<'a>>,
}

impl<'a> TierParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wireless(payload: &'a str) -> Self {
        Self {
            wireless: Some(WirelessContext {
                payload,
                tracker: TierSocTracker::new(),
            }),
        }
    }
}

impl LineParser for TierParser<'_> {
    type Record = VoltageTierSample;

    fn parse_line(&mut self, line: &str) -> Result<Option<Self::Record>, FormatMismatch> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let mut sample = parse_tier_line(line)?;
        if let Some(wireless) = self.wireless.as_mut() {
            // Samples are keyed by whole soc.
            let soc = sample.soc_in as i32;
            sample.wireless = Some(wireless.tracker.power_stats(soc, wireless.payload));
        }
        Ok(Some(sample))
    }
}
