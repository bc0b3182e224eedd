//! Analog to Digital Converter
//!
//! A single 10-bit converter sampling one of the analog pads, the temperature
//! sensor or the battery monitor, against the internal band gap or an
//! external reference.

use tock_registers::interfaces::{Readable, Writeable};

use crate::gpio::{Analog, Dio};
use crate::pac::adc::{AdcRegisters, CONTROL, DATA, STATUS};
use crate::pac::{StaticRef, ADC};

/// Internal band gap reference in millivolts.
pub const INTERNAL_REFERENCE_MV: u32 = 1_200;

/// Full scale code of the 10-bit converter.
const FULL_SCALE: u32 = 0x3FF;

/// The input the ADC converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    A0,
    A1,
    A2,
    A3,
    TemperatureSensor,
    Battery,
}

/// The reference voltage used for the conversion in the ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefVoltage {
    #[default]
    Internal,
    /// External reference, value in millivolts.
    External(u32),
}

impl RefVoltage {
    pub const fn millivolts(&self) -> u32 {
        match self {
            RefVoltage::Internal => INTERNAL_REFERENCE_MV,
            RefVoltage::External(mv) => *mv,
        }
    }
}

/// Attenuation of the input before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Unity = 1,
    Half = 2,
    Third = 3,
    Quarter = 4,
}

/// Pads that can be sampled by the ADC.
pub trait AnalogPin {
    const CHANNEL: AdcChannel;
}

impl AnalogPin for Dio<0, Analog> {
    const CHANNEL: AdcChannel = AdcChannel::A0;
}
impl AnalogPin for Dio<1, Analog> {
    const CHANNEL: AdcChannel = AdcChannel::A1;
}
impl AnalogPin for Dio<2, Analog> {
    const CHANNEL: AdcChannel = AdcChannel::A2;
}
impl AnalogPin for Dio<3, Analog> {
    const CHANNEL: AdcChannel = AdcChannel::A3;
}

/// Widen a 10-bit sample to the full 16-bit range.
pub const fn to_u16(raw: u16) -> u16 {
    let raw = raw & FULL_SCALE as u16;
    (raw << 6) | (raw >> 4)
}

pub struct Adc {
    regs: StaticRef<AdcRegisters>,
    reference: RefVoltage,
    scale: Scale,
}

impl Adc {
    /// Create a new ADC.
    pub fn new(_adc: ADC) -> Self {
        Self::with_registers(ADC::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<AdcRegisters>) -> Self {
        Self {
            regs,
            reference: Default::default(),
            scale: Default::default(),
        }
    }

    pub fn set_reference(&mut self, reference: RefVoltage) {
        self.reference = reference;
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    /// Run one conversion and return the raw 10-bit code.
    pub fn read(&mut self, channel: AdcChannel) -> u16 {
        let input = match channel {
            AdcChannel::A0 => CONTROL::INPUT::A0,
            AdcChannel::A1 => CONTROL::INPUT::A1,
            AdcChannel::A2 => CONTROL::INPUT::A2,
            AdcChannel::A3 => CONTROL::INPUT::A3,
            AdcChannel::TemperatureSensor => CONTROL::INPUT::Temperature,
            AdcChannel::Battery => CONTROL::INPUT::Battery,
        };
        let reference = match self.reference {
            RefVoltage::Internal => CONTROL::REFERENCE::Internal,
            RefVoltage::External(_) => CONTROL::REFERENCE::External,
        };
        let scale = match self.scale {
            Scale::Unity => CONTROL::SCALE::Unity,
            Scale::Half => CONTROL::SCALE::Half,
            Scale::Third => CONTROL::SCALE::Third,
            Scale::Quarter => CONTROL::SCALE::Quarter,
        };

        let config = CONTROL::ENABLE::SET + CONTROL::MODE::Single + input + reference + scale;
        self.regs.control.write(config);
        self.regs.control.write(config + CONTROL::START::SET);

        // Wait for the conversion to complete.
        while !self.regs.status.is_set(STATUS::EOC) {}

        self.regs.data.read(DATA::VALUE) as u16
    }

    /// Run one conversion and scale the result to `0..=0xFFFF`.
    pub fn read_u16(&mut self, channel: AdcChannel) -> u16 {
        to_u16(self.read(channel))
    }

    /// Run one conversion and return the input voltage in millivolts.
    pub fn read_millivolts(&mut self, channel: AdcChannel) -> u32 {
        let raw = self.read(channel) as u32;
        raw * self.reference.millivolts() * self.scale as u32 / FULL_SCALE
    }

    /// Sample an analog pad.
    pub fn read_pin<PIN: AnalogPin>(&mut self, _pin: &PIN) -> u16 {
        self.read(PIN::CHANNEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    fn adc() -> (StaticRef<AdcRegisters>, Adc) {
        let regs = fake_regs::<AdcRegisters>();
        poke(regs, 0x04, 1);
        (regs, Adc::with_registers(regs))
    }

    #[test]
    fn widening_covers_the_full_range() {
        assert_eq!(to_u16(0), 0);
        assert_eq!(to_u16(0x3FF), 0xFFFF);
        assert_eq!(to_u16(0x200), 0x8020);
    }

    #[test]
    fn read_selects_the_input() {
        let (regs, mut adc) = adc();
        poke(regs, 0x08, 0x1_0123);

        assert_eq!(adc.read(AdcChannel::Battery), 0x123);
        // START, single, battery input, internal reference, unity, enabled.
        assert_eq!(peek(regs, 0x00), (1 << 8) | (5 << 2) | 1);
    }

    #[test]
    fn millivolts_account_for_reference_and_scale() {
        let (regs, mut adc) = adc();
        poke(regs, 0x08, 0x3FF);

        assert_eq!(adc.read_millivolts(AdcChannel::A1), 1_200);

        adc.set_reference(RefVoltage::External(3_000));
        adc.set_scale(Scale::Half);
        assert_eq!(adc.read_millivolts(AdcChannel::A1), 6_000);
        assert_eq!(peek(regs, 0x00) & (0b111 << 5), (1 << 5) | (1 << 6));
    }
}
