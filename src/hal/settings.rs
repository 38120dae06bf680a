//! Register values for the analog block and transceiver
//!
//! Plain encodings with no register access, shared by the drivers and the
//! board's translation of runtime requests.

use crate::framework::{AdcClock, AdcReference as Reference, AdcSource, InputRange, SampleCount};

/// MUX5..0 values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcChannel {
    Adc0 = 0x00,
    Adc1 = 0x01,
    Adc2 = 0x02,
    Adc3 = 0x03,
    Bandgap = 0x1E,
    Temperature = 0x29,
}

/// REFS1..0 values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcReference {
    Aref = 0,
    Avdd = 1,
    Internal1V5 = 2,
    Internal1V6 = 3,
}

/// ADPS2..0 values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

/// Divider for the requested ADC clock off the 16 MHz core clock
pub const fn prescaler_for(clock: AdcClock) -> AdcPrescaler {
    match clock {
        AdcClock::Khz250 => AdcPrescaler::Div64,
        AdcClock::Khz500 => AdcPrescaler::Div32,
        AdcClock::Mhz1 => AdcPrescaler::Div16,
        AdcClock::Mhz2 => AdcPrescaler::Div8,
    }
}

/// ADTHT tracking time steps
pub const fn tracking_steps(samples: SampleCount) -> u8 {
    match samples {
        SampleCount::Two => 0,
        SampleCount::Four => 1,
        SampleCount::Six => 2,
        SampleCount::Eight => 3,
    }
}

/// Input channel and reference for a conversion source.
///
/// The supply is measured as the fixed bandgap against AVDD, so the result
/// falls as the supply rises.
pub const fn adc_input(
    source: AdcSource,
    reference: Reference,
    range: InputRange,
) -> (AdcChannel, AdcReference) {
    let reference = match (reference, range) {
        (Reference::External, _) => AdcReference::Aref,
        (Reference::Internal, InputRange::Range1) => AdcReference::Internal1V5,
        (Reference::Internal, InputRange::Range2) => AdcReference::Internal1V6,
    };
    match source {
        AdcSource::Adc1 => (AdcChannel::Adc0, reference),
        AdcSource::Adc2 => (AdcChannel::Adc1, reference),
        AdcSource::Adc3 => (AdcChannel::Adc2, reference),
        AdcSource::Adc4 => (AdcChannel::Adc3, reference),
        AdcSource::Temperature => (AdcChannel::Temperature, reference),
        AdcSource::SupplyVoltage => (AdcChannel::Bandgap, AdcReference::Avdd),
    }
}

/// PHY_TX_PWR setting for levels 0..=3; 0x0 is +3.5 dBm, 0xF is -16.5 dBm
const TX_POWER_TABLE: [u8; 4] = [0x0F, 0x0A, 0x06, 0x00];

pub const TX_POWER_MASK: u8 = 0x0F;

/// Levels above 3 are clamped
pub const fn tx_power_setting(level: u8) -> u8 {
    let index = if level > 3 { 3 } else { level };
    TX_POWER_TABLE[index as usize]
}

const BATMON_VTH_MASK: u8 = 0x0F;
const BATMON_HR: u8 = 1 << 4;
const BAT_LOW_EN: u8 = 1 << 6;

/// BATMON with the threshold set in the low range (1.70 V + 50 mV steps)
/// and the BAT_LOW interrupt masked; other bits are kept
pub const fn batmon_value(current: u8, threshold_mv: u16) -> u8 {
    let steps = threshold_mv.saturating_sub(1700) / 50;
    let steps = if steps > 15 { 15 } else { steps as u8 };
    (current & !(BATMON_VTH_MASK | BATMON_HR | BAT_LOW_EN)) | steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supply_voltage_reads_bandgap_against_avdd() {
        for reference in [Reference::Internal, Reference::External] {
            for range in [InputRange::Range1, InputRange::Range2] {
                assert_eq!(
                    adc_input(AdcSource::SupplyVoltage, reference, range),
                    (AdcChannel::Bandgap, AdcReference::Avdd)
                );
            }
        }
    }

    #[test]
    fn external_inputs_follow_requested_reference() {
        assert_eq!(
            adc_input(AdcSource::Adc1, Reference::Internal, InputRange::Range2),
            (AdcChannel::Adc0, AdcReference::Internal1V6)
        );
        assert_eq!(
            adc_input(AdcSource::Adc4, Reference::External, InputRange::Range1),
            (AdcChannel::Adc3, AdcReference::Aref)
        );
    }

    #[test]
    fn bench_analog_setup_runs_at_500khz() {
        assert_eq!(prescaler_for(AdcClock::Khz500), AdcPrescaler::Div32);
        assert_eq!(tracking_steps(SampleCount::Four), 1);
    }

    #[test]
    fn batmon_selects_low_range() {
        // High range and interrupt enable set, threshold bits dirty
        let value = batmon_value(0xFF, 2_000);
        assert_eq!(value & BATMON_HR, 0);
        assert_eq!(value & BAT_LOW_EN, 0);
        assert_eq!(value & BATMON_VTH_MASK, 6);
        // Status bits above are untouched
        assert_eq!(value & 0xA0, 0xA0);
    }

    #[test]
    fn batmon_threshold_clamps() {
        assert_eq!(batmon_value(0, 1_000) & BATMON_VTH_MASK, 0);
        assert_eq!(batmon_value(0, 3_600) & BATMON_VTH_MASK, 15);
    }

    #[test]
    fn tx_power_levels_get_stronger() {
        assert_eq!(tx_power_setting(0), 0x0F);
        assert_eq!(tx_power_setting(3), 0x00);
        assert_eq!(tx_power_setting(9), 0x00);
    }
}
