use std::path::PathBuf;

use thiserror::Error;

/// Which record a rejected line was meant to produce.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordKind {
    ChargeSession,
    VoltageTier,
    WirelessAdapterType,
    WirelessCapabilities,
    PcaSummary,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChargeSession => "charge_session",
            Self::VoltageTier => "voltage_tier",
            Self::WirelessAdapterType => "wireless_adapter_type",
            Self::WirelessCapabilities => "wireless_capabilities",
            Self::PcaSummary => "pca_summary",
        }
    }
}

/// A line matched none of the formats accepted for its record kind.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("no accepted {} format matches line `{line}`", kind.as_str())]
pub struct FormatMismatch {
    pub kind: RecordKind,
    pub line: String,
}

impl FormatMismatch {
    pub fn new(kind: RecordKind, line: &str) -> Self {
        Self {
            kind,
            line: line.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {source_name} log `{path}`: {source}")]
    Read {
        source_name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to clear {source_name} log `{path}`: {source}")]
    Clear {
        source_name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{source_name} log `{path}` exceeds {max_bytes} bytes")]
    TooLarge {
        source_name: &'static str,
        path: PathBuf,
        max_bytes: u64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read reporter config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode reporter config from TOML: {source}")]
    TomlDecode {
        #[source]
        source: toml::de::Error,
    },
    #[error("throttle window must be at least one second")]
    ZeroThrottleWindow,
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector rejected atom {atom_id}: {reason}")]
    Rejected { atom_id: i32, reason: String },
    #[error("failed to serialize atom {atom_id}: {source}")]
    Serialize {
        atom_id: i32,
        #[source]
        source: serde_json::Error,
    },
    #[error("collector I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to the caller of an invocation.
///
/// Only an unreadable primary log aborts an invocation; every other failure is
/// logged and degraded in place.
#[derive(Debug, Error)]
pub enum ChargeStatsError {
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Outcome of parsing one line of a per-line log.
#[derive(Debug, Clone)]
pub struct LineRecord<T> {
    /// 1-based line number within the source contents.
    pub line_number: usize,
    pub outcome: Result<T, FormatMismatch>,
}
