//! Parsed records produced by one invocation of the pipeline.

use serde::Serialize;

/// Charger adapter classification, numbered as the collector schema numbers it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum AdapterType {
    Unknown,
    Usb,
    UsbSdp,
    UsbDcp,
    UsbCdp,
    UsbAca,
    UsbC,
    UsbPd,
    UsbPdDrp,
    UsbPdPps,
    UsbBrickId,
    UsbHvdcp,
    UsbHvdcp3,
    Float,
    Wlc,
    WlcEpp,
    WlcSpp,
    Gpp,
    TenWatt,
    L7,
    Dl,
    WpcEpp,
    WpcGpp,
    Wpc10W,
    WpcBpp,
    WpcL7,
    Ext,
    Ext1,
    Ext2,
    ExtUnknown,
    UsbUnknown,
    WlcUnknown,
    /// A code newer firmware reports that this build does not name.
    Unrecognized(i32),
}

const NAMED_ADAPTER_TYPES: [AdapterType; 32] = [
    AdapterType::Unknown,
    AdapterType::Usb,
    AdapterType::UsbSdp,
    AdapterType::UsbDcp,
    AdapterType::UsbCdp,
    AdapterType::UsbAca,
    AdapterType::UsbC,
    AdapterType::UsbPd,
    AdapterType::UsbPdDrp,
    AdapterType::UsbPdPps,
    AdapterType::UsbBrickId,
    AdapterType::UsbHvdcp,
    AdapterType::UsbHvdcp3,
    AdapterType::Float,
    AdapterType::Wlc,
    AdapterType::WlcEpp,
    AdapterType::WlcSpp,
    AdapterType::Gpp,
    AdapterType::TenWatt,
    AdapterType::L7,
    AdapterType::Dl,
    AdapterType::WpcEpp,
    AdapterType::WpcGpp,
    AdapterType::Wpc10W,
    AdapterType::WpcBpp,
    AdapterType::WpcL7,
    AdapterType::Ext,
    AdapterType::Ext1,
    AdapterType::Ext2,
    AdapterType::ExtUnknown,
    AdapterType::UsbUnknown,
    AdapterType::WlcUnknown,
];

impl AdapterType {
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|idx| NAMED_ADAPTER_TYPES.get(idx).copied())
            .unwrap_or(Self::Unrecognized(code))
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unrecognized(code) => code,
            named => NAMED_ADAPTER_TYPES
                .iter()
                .position(|candidate| *candidate == named)
                .and_then(|idx| i32::try_from(idx).ok())
                .unwrap_or_default(),
        }
    }
}

/// Which head-line layout a session was parsed from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum HeadFormat {
    Baseline,
    Aacr,
    Csi,
}

/// Charging Speed Indicator: what limited charge speed during the session.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct CsiAggregate {
    pub status: i32,
    pub kind: i32,
}

/// Adapter negotiation words contributed by the wireless or PD/PCA logs.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct AdapterExtension {
    pub capabilities: [u32; 5],
    pub receiver_state: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeSession {
    pub head_format: HeadFormat,
    pub adapter_type: AdapterType,
    pub adapter_voltage: i32,
    pub adapter_amperage: i32,
    pub ssoc_in: i32,
    pub voltage_in: i32,
    pub ssoc_out: i32,
    pub voltage_out: i32,
    /// Age-adjusted charge rate capacity; absent on baseline lines.
    pub charge_capacity: Option<i32>,
    pub csi: Option<CsiAggregate>,
    /// Present only when a wireless or PD/PCA source extended the session.
    pub extension: Option<AdapterExtension>,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct WirelessPowerStats {
    pub pout_min: i32,
    pub pout_avg: i32,
    pub pout_max: i32,
    pub of_freq: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoltageTierSample {
    pub voltage_tier: i32,
    pub soc_in: f32,
    pub cc_in: i32,
    pub temp_in: i32,
    pub time_fast_secs: i32,
    pub time_taper_secs: i32,
    pub time_other_secs: i32,
    pub temp_min: i32,
    pub temp_avg: i32,
    pub temp_max: i32,
    pub ibatt_min: i32,
    pub ibatt_avg: i32,
    pub ibatt_max: i32,
    pub icl_min: i32,
    pub icl_avg: i32,
    pub icl_max: i32,
    /// Only computed while the invocation carries wireless data.
    pub wireless: Option<WirelessPowerStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_codes_round_trip_including_unrecognized() {
        assert_eq!(AdapterType::from_code(0), AdapterType::Unknown);
        assert_eq!(AdapterType::from_code(9), AdapterType::UsbPdPps);
        assert_eq!(AdapterType::UsbPdPps.code(), 9);
        assert_eq!(AdapterType::WlcUnknown.code(), 31);
        assert_eq!(AdapterType::from_code(77), AdapterType::Unrecognized(77));
        assert_eq!(AdapterType::from_code(-1).code(), -1);
        for (idx, named) in NAMED_ADAPTER_TYPES.iter().enumerate() {
            assert_eq!(named.code() as usize, idx);
        }
    }
}
