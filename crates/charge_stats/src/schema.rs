//! Collector schema: named fields, their declared identifiers, and the dense
//! value layout they map to.
//!
//! A field's slot in an atom's value array is its identifier minus
//! [`SCHEMA_OFFSET`]; identifier 1 is reserved by the collector.

use std::marker::PhantomData;

use serde::Serialize;

pub const SCHEMA_OFFSET: i32 = 2;

pub const CHARGE_STATS_ATOM_ID: i32 = 105_000;
pub const VOLTAGE_TIER_STATS_ATOM_ID: i32 = 105_001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomValue {
    Int(i32),
    Float(f32),
}

impl Default for AtomValue {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<i32> for AtomValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for AtomValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<u32> for AtomValue {
    /// Hex words travel bit-for-bit in a signed slot.
    fn from(value: u32) -> Self {
        Self::Int(i32::from_ne_bytes(value.to_ne_bytes()))
    }
}

/// One event submitted to the collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorAtom {
    pub atom_id: i32,
    pub values: Vec<AtomValue>,
}

pub trait AtomField: Copy + Eq + 'static {
    const ATOM_ID: i32;
    /// Every field of the atom, in declared order.
    const ALL: &'static [Self];

    fn field_id(self) -> i32;

    fn position(self) -> usize {
        usize::try_from(self.field_id() - SCHEMA_OFFSET).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChargeStatsField {
    AdapterType = 2,
    AdapterVoltage = 3,
    AdapterAmperage = 4,
    SsocIn = 5,
    VoltageIn = 6,
    SsocOut = 7,
    VoltageOut = 8,
    ChargeCapacity = 9,
    CsiAggregateStatus = 10,
    CsiAggregateType = 11,
    AdapterCapabilities0 = 12,
    AdapterCapabilities1 = 13,
    AdapterCapabilities2 = 14,
    AdapterCapabilities3 = 15,
    AdapterCapabilities4 = 16,
    ReceiverState0 = 17,
    ReceiverState1 = 18,
}

impl ChargeStatsField {
    pub const CAPABILITIES: [Self; 5] = [
        Self::AdapterCapabilities0,
        Self::AdapterCapabilities1,
        Self::AdapterCapabilities2,
        Self::AdapterCapabilities3,
        Self::AdapterCapabilities4,
    ];

    pub const RECEIVER_STATE: [Self; 2] = [Self::ReceiverState0, Self::ReceiverState1];
}

impl AtomField for ChargeStatsField {
    const ATOM_ID: i32 = CHARGE_STATS_ATOM_ID;
    const ALL: &'static [Self] = &[
        Self::AdapterType,
        Self::AdapterVoltage,
        Self::AdapterAmperage,
        Self::SsocIn,
        Self::VoltageIn,
        Self::SsocOut,
        Self::VoltageOut,
        Self::ChargeCapacity,
        Self::CsiAggregateStatus,
        Self::CsiAggregateType,
        Self::AdapterCapabilities0,
        Self::AdapterCapabilities1,
        Self::AdapterCapabilities2,
        Self::AdapterCapabilities3,
        Self::AdapterCapabilities4,
        Self::ReceiverState0,
        Self::ReceiverState1,
    ];

    fn field_id(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum VoltageTierField {
    VoltageTier = 2,
    SocIn = 3,
    CcIn = 4,
    TempIn = 5,
    TimeFastSecs = 6,
    TimeTaperSecs = 7,
    TimeOtherSecs = 8,
    TempMin = 9,
    TempAvg = 10,
    TempMax = 11,
    IbattMin = 12,
    IbattAvg = 13,
    IbattMax = 14,
    IclMin = 15,
    IclAvg = 16,
    IclMax = 17,
    MinAdapterPowerOut = 18,
    TimeAvgAdapterPowerOut = 19,
    MaxAdapterPowerOut = 20,
    ChargingOperatingPoint = 21,
}

impl AtomField for VoltageTierField {
    const ATOM_ID: i32 = VOLTAGE_TIER_STATS_ATOM_ID;
    const ALL: &'static [Self] = &[
        Self::VoltageTier,
        Self::SocIn,
        Self::CcIn,
        Self::TempIn,
        Self::TimeFastSecs,
        Self::TimeTaperSecs,
        Self::TimeOtherSecs,
        Self::TempMin,
        Self::TempAvg,
        Self::TempMax,
        Self::IbattMin,
        Self::IbattAvg,
        Self::IbattMax,
        Self::IclMin,
        Self::IclAvg,
        Self::IclMax,
        Self::MinAdapterPowerOut,
        Self::TimeAvgAdapterPowerOut,
        Self::MaxAdapterPowerOut,
        Self::ChargingOperatingPoint,
    ];

    fn field_id(self) -> i32 {
        self as i32
    }
}

/// Dense value array for one atom kind; unset slots stay at the default value.
#[derive(Debug, Clone)]
pub struct AtomBuilder<F: AtomField> {
    values: Vec<AtomValue>,
    _field: PhantomData<F>,
}

impl<F: AtomField> AtomBuilder<F> {
    pub fn new() -> Self {
        Self {
            values: vec![AtomValue::default(); F::ALL.len()],
            _field: PhantomData,
        }
    }

    pub fn set(&mut self, field: F, value: impl Into<AtomValue>) -> &mut Self {
        if let Some(slot) = self.values.get_mut(field.position()) {
            *slot = value.into();
        }
        self
    }

    pub fn build(self) -> VendorAtom {
        VendorAtom {
            atom_id: F::ATOM_ID,
            values: self.values,
        }
    }
}

impl<F: AtomField> Default for AtomBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}
