//! Record-to-atom mapping and best-effort delivery to the stats collector.

use std::io::Write;

use tracing::{debug, error};

use crate::error::CollectorError;
use crate::model::{ChargeSession, VoltageTierSample};
use crate::schema::{AtomBuilder, ChargeStatsField, VendorAtom, VoltageTierField};

/// The external stats service. Success or failure is all it reports back.
pub trait StatsCollector {
    fn report_vendor_atom(&mut self, atom: &VendorAtom) -> Result<(), CollectorError>;
}

impl<C: StatsCollector + ?Sized> StatsCollector for &mut C {
    fn report_vendor_atom(&mut self, atom: &VendorAtom) -> Result<(), CollectorError> {
        (**self).report_vendor_atom(atom)
    }
}

impl<C: StatsCollector + ?Sized> StatsCollector for Box<C> {
    fn report_vendor_atom(&mut self, atom: &VendorAtom) -> Result<(), CollectorError> {
        (**self).report_vendor_atom(atom)
    }
}

/// Discards every atom.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCollector;

impl StatsCollector for NullCollector {
    fn report_vendor_atom(&mut self, _atom: &VendorAtom) -> Result<(), CollectorError> {
        Ok(())
    }
}

/// Writes one JSON object per atom, newline-terminated and flushed.
#[derive(Debug)]
pub struct JsonLinesCollector<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesCollector<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StatsCollector for JsonLinesCollector<W> {
    fn report_vendor_atom(&mut self, atom: &VendorAtom) -> Result<(), CollectorError> {
        let line = serde_json::to_string(atom).map_err(|source| CollectorError::Serialize {
            atom_id: atom.atom_id,
            source,
        })?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn charge_session_atom(session: &ChargeSession) -> VendorAtom {
    use ChargeStatsField as F;

    let mut atom = AtomBuilder::<ChargeStatsField>::new();
    atom.set(F::AdapterType, session.adapter_type.code())
        .set(F::AdapterVoltage, session.adapter_voltage)
        .set(F::AdapterAmperage, session.adapter_amperage)
        .set(F::SsocIn, session.ssoc_in)
        .set(F::VoltageIn, session.voltage_in)
        .set(F::SsocOut, session.ssoc_out)
        .set(F::VoltageOut, session.voltage_out);

    if let Some(capacity) = session.charge_capacity {
        atom.set(F::ChargeCapacity, capacity);
    }
    if let Some(csi) = session.csi {
        atom.set(F::CsiAggregateStatus, csi.status)
            .set(F::CsiAggregateType, csi.kind);
    }
    if let Some(extension) = session.extension {
        for (field, word) in F::CAPABILITIES.into_iter().zip(extension.capabilities) {
            atom.set(field, word);
        }
        for (field, word) in F::RECEIVER_STATE.into_iter().zip(extension.receiver_state) {
            atom.set(field, word);
        }
    }
    atom.build()
}

pub fn voltage_tier_atom(sample: &VoltageTierSample) -> VendorAtom {
    use VoltageTierField as F;

    let mut atom = AtomBuilder::<VoltageTierField>::new();
    atom.set(F::VoltageTier, sample.voltage_tier)
        .set(F::SocIn, sample.soc_in)
        .set(F::CcIn, sample.cc_in)
        .set(F::TempIn, sample.temp_in)
        .set(F::TimeFastSecs, sample.time_fast_secs)
        .set(F::TimeTaperSecs, sample.time_taper_secs)
        .set(F::TimeOtherSecs, sample.time_other_secs)
        .set(F::TempMin, sample.temp_min)
        .set(F::TempAvg, sample.temp_avg)
        .set(F::TempMax, sample.temp_max)
        .set(F::IbattMin, sample.ibatt_min)
        .set(F::IbattAvg, sample.ibatt_avg)
        .set(F::IbattMax, sample.ibatt_max)
        .set(F::IclMin, sample.icl_min)
        .set(F::IclAvg, sample.icl_avg)
        .set(F::IclMax, sample.icl_max);

    if let Some(wireless) = sample.wireless {
        atom.set(F::MinAdapterPowerOut, wireless.pout_min)
            .set(F::TimeAvgAdapterPowerOut, wireless.pout_avg)
            .set(F::MaxAdapterPowerOut, wireless.pout_max)
            .set(F::ChargingOperatingPoint, wireless.of_freq);
    }
    atom.build()
}

/// Submits `atom` once. Failures are logged and reported as `false`; there is
/// no retry.
pub fn emit<C: StatsCollector + ?Sized>(collector: &mut C, atom: &VendorAtom, what: &str) -> bool {
    match collector.report_vendor_atom(atom) {
        Ok(()) => {
            debug!(atom_id = atom.atom_id, what, "reported");
            true
        }
        Err(err) => {
            error!(atom_id = atom.atom_id, what, error = %err, "unable to report to stats service");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdapterExtension, AdapterType, CsiAggregate, HeadFormat, WirelessPowerStats};
    use crate::schema::{AtomValue, CHARGE_STATS_ATOM_ID};

    fn session() -> ChargeSession {
        ChargeSession {
            head_format: HeadFormat::Baseline,
            adapter_type: AdapterType::Usb,
            adapter_voltage: 5000,
            adapter_amperage: 1500,
            ssoc_in: 50,
            voltage_in: 4000,
            ssoc_out: 80,
            voltage_out: 4100,
            charge_capacity: None,
            csi: None,
            extension: None,
        }
    }

    fn ints(atom: &VendorAtom) -> Vec<i32> {
        atom.values
            .iter()
            .map(|value| match value {
                AtomValue::Int(v) => *v,
                AtomValue::Float(v) => *v as i32,
            })
            .collect()
    }

    #[test]
    fn baseline_session_leaves_optional_slots_zero() {
        let atom = charge_session_atom(&session());
        assert_eq!(atom.atom_id, CHARGE_STATS_ATOM_ID);
        assert_eq!(
            ints(&atom),
            vec![1, 5000, 1500, 50, 4000, 80, 4100, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn extended_session_fills_every_slot() {
        let mut s = session();
        s.charge_capacity = Some(3900);
        s.csi = Some(CsiAggregate { status: 4, kind: 2 });
        s.extension = Some(AdapterExtension {
            capabilities: [1, 2, 3, 4, 5],
            receiver_state: [6, 0xffff_ffff],
        });
        assert_eq!(
            ints(&charge_session_atom(&s)),
            vec![1, 5000, 1500, 50, 4000, 80, 4100, 3900, 4, 2, 1, 2, 3, 4, 5, 6, -1]
        );
    }

    fn tier_sample() -> VoltageTierSample {
        VoltageTierSample {
            voltage_tier: 1,
            soc_in: 12.5,
            cc_in: 2,
            temp_in: 3,
            time_fast_secs: 4,
            time_taper_secs: 5,
            time_other_secs: 6,
            temp_min: 7,
            temp_avg: 8,
            temp_max: 9,
            ibatt_min: 10,
            ibatt_avg: 11,
            ibatt_max: 12,
            icl_min: 13,
            icl_avg: 14,
            icl_max: 15,
            wireless: None,
        }
    }

    #[test]
    fn mapping_is_idempotent() {
        let s = session();
        assert_eq!(charge_session_atom(&s), charge_session_atom(&s));

        let mut sample = tier_sample();
        sample.wireless = Some(WirelessPowerStats {
            pout_min: 100,
            pout_avg: 200,
            pout_max: 300,
            of_freq: 140,
        });
        let first = voltage_tier_atom(&sample);
        assert_eq!(first, voltage_tier_atom(&sample));
        assert_eq!(&ints(&first)[16..], &[100, 200, 300, 140]);
    }

    #[test]
    fn tier_atom_keeps_soc_as_float_and_wireless_tail() {
        let mut sample = tier_sample();
        let atom = voltage_tier_atom(&sample);
        assert_eq!(atom.values.len(), 20);
        assert_eq!(atom.values[1], AtomValue::Float(12.5));
        assert_eq!(&ints(&atom)[16..], &[0, 0, 0, 0]);

        sample.wireless = Some(WirelessPowerStats {
            pout_min: 100,
            pout_avg: 200,
            pout_max: 300,
            of_freq: 140,
        });
        assert_eq!(&ints(&voltage_tier_atom(&sample))[16..], &[100, 200, 300, 140]);
    }

    #[test]
    fn json_lines_collector_writes_one_line_per_atom() {
        let mut collector = JsonLinesCollector::new(Vec::new());
        let atom = charge_session_atom(&session());
        assert!(emit(&mut collector, &atom, "charge_session"));
        assert!(emit(&mut collector, &atom, "charge_session"));

        let text = String::from_utf8(collector.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["atom_id"], CHARGE_STATS_ATOM_ID);
        assert_eq!(value["values"][1]["int"], 5000);
    }

    struct Failing;

    impl StatsCollector for Failing {
        fn report_vendor_atom(&mut self, atom: &VendorAtom) -> Result<(), CollectorError> {
            Err(CollectorError::Rejected {
                atom_id: atom.atom_id,
                reason: "service down".to_string(),
            })
        }
    }

    #[test]
    fn delivery_failure_is_reported_not_raised() {
        let atom = charge_session_atom(&session());
        assert!(!emit(&mut Failing, &atom, "charge_session"));
        assert!(emit(&mut NullCollector, &atom, "charge_session"));
    }
}
