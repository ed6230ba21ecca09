use tracing::{debug, error, warn};

use crate::clock::{BootClock, ProcUptimeClock};
use crate::config::ReporterConfig;
use crate::error::ChargeStatsError;
use crate::ingest::LineIngestor;
use crate::line_parser::LineParser;
use crate::model::VoltageTierSample;
use crate::pca::summary_line;
use crate::report::{charge_session_atom, emit, voltage_tier_atom, StatsCollector};
use crate::session::{parse_session, SessionInputs};
use crate::source::LogSource;
use crate::throttle::{EmissionThrottle, ThrottleDecision, ThrottleState};
use crate::tier::TierParser;
use crate::wireless::WirelessHead;

/// What one invocation did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InvocationOutcome {
    /// The charge log held nothing new.
    NoData,
    /// The charge log was consumed but the throttle discarded it.
    Throttled(ThrottleDecision),
    Reported(ReportSummary),
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ReportSummary {
    pub sessions: usize,
    pub tier_samples: usize,
    /// Lines that matched no accepted format.
    pub dropped_lines: usize,
    pub delivery_failures: usize,
}

#[derive(Debug, Clone)]
struct PipelineSources {
    charge_stats: LogSource,
    wireless: LogSource,
    pca: LogSource,
    thermal: LogSource,
    charger_metrics: LogSource,
    dual_battery: LogSource,
}

impl PipelineSources {
    fn from_config(config: &ReporterConfig) -> Self {
        let paths = &config.sources;
        let max = config.limits.max_source_bytes;
        Self {
            charge_stats: LogSource::new("charge_stats", &paths.charge_stats, max),
            wireless: LogSource::new("wireless", &paths.wireless, max),
            pca: LogSource::new("pca", &paths.pca, max),
            thermal: LogSource::new("thermal", &paths.thermal, max),
            charger_metrics: LogSource::new("charger_metrics", &paths.charger_metrics, max),
            dual_battery: LogSource::new("dual_battery", &paths.dual_battery, max),
        }
    }
}

/// Runs the ingestion pipeline once per trigger.
///
/// Invocations must not overlap; the throttle state lives here and is threaded
/// through every call.
#[derive(Debug)]
pub struct ChargeStatsReporter<K: BootClock = ProcUptimeClock> {
    sources: PipelineSources,
    throttle: EmissionThrottle,
    throttle_state: ThrottleState,
    clock: K,
}

impl ChargeStatsReporter<ProcUptimeClock> {
    pub fn new(config: &ReporterConfig) -> Self {
        Self::with_clock(config, ProcUptimeClock::new())
    }
}

impl<K: BootClock> ChargeStatsReporter<K> {
    pub fn with_clock(config: &ReporterConfig, clock: K) -> Self {
        Self {
            sources: PipelineSources::from_config(config),
            throttle: EmissionThrottle::new(config.throttle_window()),
            throttle_state: ThrottleState::Idle,
            clock,
        }
    }

    /// Consumes the charge log and, if the throttle allows, the secondary logs,
    /// reporting one session atom and one atom per tier line.
    ///
    /// Only an unreadable charge log is returned as an error. Everything else is
    /// logged and skipped.
    pub fn check_and_report<C: StatsCollector + ?Sized>(
        &mut self,
        collector: &mut C,
    ) -> Result<InvocationOutcome, ChargeStatsError> {
        let contents = match self.sources.charge_stats.consume() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Ok(InvocationOutcome::NoData),
            Err(err) => {
                error!(error = %err, "unable to read charge stats");
                return Err(err.into());
            }
        };
        let (head_line, tier_lines) = split_head(&contents);

        let (decision, state) = self
            .throttle
            .evaluate(self.throttle_state, self.clock.now_secs());
        self.throttle_state = state;
        match decision {
            ThrottleDecision::Accept => {}
            ThrottleDecision::Reject => {
                warn!("too many log events; event ignored");
                return Ok(InvocationOutcome::Throttled(decision));
            }
            ThrottleDecision::ClockUnavailable => {
                error!("current boot time is zero; event ignored");
                return Ok(InvocationOutcome::Throttled(decision));
            }
        }

        let pca = self.sources.pca.consume_optional();
        let wireless = self.sources.wireless.consume_optional();
        let thermal = self.sources.thermal.consume_optional();
        let charger_metrics = self.sources.charger_metrics.consume_optional();
        let dual_battery = self.sources.dual_battery.consume_optional();

        let mut summary = ReportSummary::default();

        let inputs = SessionInputs {
            head_line,
            wireless: wireless
                .as_deref()
                .map(WirelessHead::from_contents)
                .filter(|head| !head.adapter_type_line.trim().is_empty()),
            pca_line: pca.as_deref().and_then(summary_line),
            charger_metrics: charger_metrics.as_deref(),
        };
        match parse_session(&inputs) {
            Ok(session) => {
                if emit(collector, &charge_session_atom(&session), "charge_session") {
                    summary.sessions += 1;
                } else {
                    summary.delivery_failures += 1;
                }
            }
            Err(_) => summary.dropped_lines += 1,
        }

        let primary = match wireless.as_deref() {
            Some(payload) => TierParser::with_wireless(payload),
            None => TierParser::new(),
        };
        report_tiers(
            collector,
            LineIngestor::new(tier_lines, primary).starting_at(2),
            self.sources.charge_stats.name(),
            &mut summary,
        );

        // None of the per-tier auxiliary logs carry wireless data.
        let auxiliary = [
            (&self.sources.thermal, thermal),
            (&self.sources.charger_metrics, charger_metrics),
            (&self.sources.dual_battery, dual_battery),
        ];
        for (source, contents) in auxiliary {
            if let Some(text) = contents.as_deref() {
                report_tiers(
                    collector,
                    LineIngestor::new(text, TierParser::new()),
                    source.name(),
                    &mut summary,
                );
            }
        }

        debug!(
            sessions = summary.sessions,
            tier_samples = summary.tier_samples,
            dropped_lines = summary.dropped_lines,
            delivery_failures = summary.delivery_failures,
            "invocation complete"
        );
        Ok(InvocationOutcome::Reported(summary))
    }
}

fn split_head(contents: &str) -> (&str, &str) {
    let (head, rest) = contents.split_once('\n').unwrap_or((contents, ""));
    (head.trim_end_matches('\r'), rest)
}

fn report_tiers<C, P>(
    collector: &mut C,
    records: LineIngestor<'_, P>,
    source: &str,
    summary: &mut ReportSummary,
) where
    C: StatsCollector + ?Sized,
    P: LineParser<Record = VoltageTierSample>,
{
    for record in records {
        match record.outcome {
            Ok(sample) => {
                debug!(source, line_number = record.line_number, "voltage tier processed");
                if emit(collector, &voltage_tier_atom(&sample), "voltage_tier") {
                    summary.tier_samples += 1;
                } else {
                    summary.delivery_failures += 1;
                }
            }
            Err(_) => {
                debug!(source, line_number = record.line_number, "voltage tier line ignored");
                summary.dropped_lines += 1;
            }
        }
    }
}
