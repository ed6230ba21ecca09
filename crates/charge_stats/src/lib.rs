#![forbid(unsafe_code)]
//! Ingestion of charging-subsystem diagnostic logs into rate-limited charge telemetry.
//!
//! Each invocation of [`ChargeStatsReporter::check_and_report`]:
//! - consumes the charge log (read, then overwrite with the consumed marker);
//! - asks the rolling-window throttle whether this session may be reported;
//! - consumes the wireless, PD/PCA, thermal, charger-metrics and dual-battery logs;
//! - reports one charge session atom and one voltage tier atom per tier line.
//!
//! Log formats drift across firmware revisions. Head lines are matched against
//! an ordered list of layouts, richest first, so older layouts stay parseable.
//! Nothing here is fatal to the host: malformed lines are dropped and delivery
//! failures are logged.

mod clock;
mod config;
mod error;
mod ingest;
mod line_parser;
mod model;
mod pca;
mod pipeline;
mod report;
pub mod scan;
pub mod schema;
mod session;
mod source;
mod throttle;
mod tier;
mod wireless;

pub use clock::{BootClock, ProcUptimeClock};
pub use config::{ReporterConfig, SourceLimits, SourcePaths};
pub use error::{
    ChargeStatsError, CollectorError, ConfigError, FormatMismatch, LineRecord, RecordKind,
    SourceError,
};
pub use ingest::LineIngestor;
pub use line_parser::LineParser;
pub use model::{
    AdapterExtension, AdapterType, ChargeSession, CsiAggregate, HeadFormat, VoltageTierSample,
    WirelessPowerStats,
};
pub use pca::{first_pdo_override, summary_line, PcaSummary, PdoOverride};
pub use pipeline::{ChargeStatsReporter, InvocationOutcome, ReportSummary};
pub use report::{
    charge_session_atom, emit, voltage_tier_atom, JsonLinesCollector, NullCollector,
    StatsCollector,
};
pub use schema::{AtomValue, VendorAtom};
pub use session::{parse_head_line, parse_session, SessionInputs, HEAD_FORMATS};
pub use source::{LogSource, CONSUMED_MARKER};
pub use throttle::{EmissionThrottle, ThrottleDecision, ThrottleState};
pub use tier::{parse_tier_line, TierParser};
pub use wireless::{translate_sys_mode, TierSocTracker, WirelessHead};
