//! Charge session parsing: the head line of the charge log, extended by the
//! wireless and PD/PCA logs when they carried data this invocation.

use tracing::{debug, error, warn};

use crate::error::{FormatMismatch, RecordKind};
use crate::model::{AdapterExtension, AdapterType, ChargeSession, CsiAggregate, HeadFormat};
use crate::pca::{first_pdo_override, PcaSummary};
use crate::scan::{FormatSet, LineFormat, ScannedFields};
use crate::wireless::WirelessHead;

const CSI_FORMAT: LineFormat = LineFormat::new(
    "csi",
    "%d,%d,%d, %d,%d,%d,%d %d %d,%d",
    &[
        "adapter_type",
        "adapter_voltage",
        "adapter_amperage",
        "ssoc_in",
        "voltage_in",
        "ssoc_out",
        "voltage_out",
        "charge_capacity",
        "csi_status",
        "csi_type",
    ],
);

const AACR_FORMAT: LineFormat = LineFormat::new(
    "aacr",
    "%d,%d,%d, %d,%d,%d,%d %d",
    &[
        "adapter_type",
        "adapter_voltage",
        "adapter_amperage",
        "ssoc_in",
        "voltage_in",
        "ssoc_out",
        "voltage_out",
        "charge_capacity",
    ],
);

const BASELINE_FORMAT: LineFormat = LineFormat::new(
    "baseline",
    "%d,%d,%d, %d,%d,%d,%d",
    &[
        "adapter_type",
        "adapter_voltage",
        "adapter_amperage",
        "ssoc_in",
        "voltage_in",
        "ssoc_out",
        "voltage_out",
    ],
);

/// Head-line layouts, richest first. Each is a strict superset of the next and
/// trailing text is ignored, so a looser layout listed earlier would swallow the
/// extra fields of a richer line.
pub const HEAD_FORMATS: FormatSet = FormatSet::new(&[CSI_FORMAT, AACR_FORMAT, BASELINE_FORMAT]);

/// Everything one invocation knows about the session being closed out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionInputs<'a> {
    pub head_line: &'a str,
    pub wireless: Option<WirelessHead<'a>>,
    pub pca_line: Option<&'a str>,
    pub charger_metrics: Option<&'a str>,
}

/// Parses the charge-log head line alone.
pub fn parse_head_line(line: &str) -> Result<ChargeSession, FormatMismatch> {
    let mismatch = || FormatMismatch::new(RecordKind::ChargeSession, line);
    let fields = HEAD_FORMATS.match_first(line).ok_or_else(mismatch)?;
    session_from_fields(&fields).ok_or_else(mismatch)
}

fn session_from_fields(fields: &ScannedFields) -> Option<ChargeSession> {
    let head_format = match fields.format_id() {
        "csi" => HeadFormat::Csi,
        "aacr" => HeadFormat::Aacr,
        _ => HeadFormat::Baseline,
    };

    let csi = match head_format {
        HeadFormat::Csi => Some(CsiAggregate {
            status: fields.int("csi_status")?,
            kind: fields.int("csi_type")?,
        }),
        _ => None,
    };

    Some(ChargeSession {
        head_format,
        adapter_type: AdapterType::from_code(fields.int("adapter_type")?),
        adapter_voltage: fields.int("adapter_voltage")?,
        adapter_amperage: fields.int("adapter_amperage")?,
        ssoc_in: fields.int("ssoc_in")?,
        voltage_in: fields.int("voltage_in")?,
        ssoc_out: fields.int("ssoc_out")?,
        voltage_out: fields.int("voltage_out")?,
        charge_capacity: fields.int("charge_capacity"),
        csi,
        extension: None,
    })
}

/// Builds the session record for one invocation.
///
/// Only a head line matching no known layout fails; malformed secondary lines
/// are logged and leave the session as the head line described it.
pub fn parse_session(inputs: &SessionInputs<'_>) -> Result<ChargeSession, FormatMismatch> {
    debug!(line = inputs.head_line, "processing charge session");
    let mut session = parse_head_line(inputs.head_line).inspect_err(|err| {
        error!(error = %err, "couldn't process charge session");
    })?;

    if let Some(head) = inputs.wireless.as_ref() {
        apply_wireless(&mut session, head);
    }

    if let Some(line) = inputs.pca_line {
        apply_pca(&mut session, line, inputs.wireless.is_some());
    }

    if let (Some(extension), Some(metrics)) = (session.extension.as_mut(), inputs.charger_metrics)
    {
        if let Some(pdo) = first_pdo_override(metrics) {
            debug!(apdo = pdo.apdo, pdo = pdo.pdo, "charger metrics override");
            extension.receiver_state = [pdo.apdo, pdo.pdo];
        }
    }

    Ok(session)
}

fn apply_wireless(session: &mut ChargeSession, head: &WirelessHead<'_>) {
    debug!(line = head.adapter_type_line, "wlc: processing adapter type");
    let adapter_type = match head.adapter_type() {
        Ok(adapter_type) => adapter_type,
        Err(err) => {
            error!(error = %err, "wlc: couldn't process adapter type");
            return;
        }
    };
    session.adapter_type = adapter_type;

    debug!(line = head.capabilities_line, "wlc: processing capabilities");
    match head.capabilities() {
        Ok(extension) => session.extension = Some(extension),
        Err(err) => warn!(error = %err, "wlc: couldn't process capabilities"),
    }
}

fn apply_pca(session: &mut ChargeSession, line: &str, has_wireless: bool) {
    debug!(line, "pca: processing summary");
    let summary = match PcaSummary::parse(line) {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %err, "pca: couldn't process summary");
            return;
        }
    };

    let rs = summary.receiver_state;
    let extension = session
        .extension
        .get_or_insert_with(AdapterExtension::default);
    extension.capabilities[2..5].copy_from_slice(&rs[2..5]);
    extension.receiver_state[1] = rs[1];

    if !has_wireless {
        session.adapter_type = AdapterType::UsbPdPps;
        extension.capabilities[..2].copy_from_slice(&summary.adapter_capabilities);
        extension.receiver_state[0] = rs[0];
    }
}
