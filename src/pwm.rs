//! Pulse width modulation
//!
//! One output with an 8-bit duty cycle clocked from the 32.768 kHz clock,
//! optionally divided by 4096 for very slow blinking.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use tock_registers::interfaces::{Readable, Writeable};

use crate::clock::RTC_FREQ;
use crate::gpio::{Alternate, Dio};
use crate::pac::pwm::{PwmRegisters, DUTY, STATUS};
use crate::pac::{StaticRef, PWM};

/// Steps in one PWM period.
const STEPS: u32 = 256;

const PRESCALER: u32 = 4096;

pub trait PwmPin {}

impl PwmPin for Dio<0, Alternate<1>> {}
impl PwmPin for Dio<16, Alternate<1>> {}

/// Duty register value for a duty fraction, clamped to `[0, 1]`.
pub fn duty_from_fraction(value: f32) -> u8 {
    if !(value > 0.0) {
        0
    } else if value >= 1.0 {
        0xFF
    } else {
        (value * 255.0 + 0.5) as u8
    }
}

pub struct Pwm<PIN> {
    regs: StaticRef<PwmRegisters>,
    pin: PIN,
}

impl<PIN: PwmPin> Pwm<PIN> {
    pub fn new(_pwm: PWM, pin: PIN) -> Self {
        Self::with_registers(PWM::regs(), pin)
    }
}

impl<PIN> Pwm<PIN> {
    pub(crate) fn with_registers(regs: StaticRef<PwmRegisters>, pin: PIN) -> Self {
        regs.disable.set(1);
        regs.prescale_disable.set(1);
        regs.duty_cycle.write(DUTY::VALUE.val(0));
        Self { regs, pin }
    }

    pub fn enable(&mut self) {
        self.regs.enable.set(1);
    }

    pub fn disable(&mut self) {
        self.regs.disable.set(1);
    }

    pub fn is_enabled(&self) -> bool {
        self.regs.status.is_set(STATUS::ENABLED)
    }

    /// Divide the PWM clock by 4096.
    pub fn set_prescaler(&mut self, enable: bool) {
        if enable {
            self.regs.prescale_enable.set(1);
        } else {
            self.regs.prescale_disable.set(1);
        }
    }

    /// Period of the output in microseconds.
    pub fn period_us(&self) -> u32 {
        let prescale = if self.regs.status.is_set(STATUS::PRESCALED) {
            PRESCALER
        } else {
            1
        };
        (STEPS as u64 * prescale as u64 * 1_000_000 / RTC_FREQ as u64) as u32
    }

    /// Set the duty cycle as a fraction of the period, clamped to `[0, 1]`.
    pub fn write(&mut self, value: f32) {
        let duty = duty_from_fraction(value);
        self.regs.duty_cycle.write(DUTY::VALUE.val(duty as u32));
    }

    /// Current duty cycle as a fraction of the period.
    pub fn read(&self) -> f32 {
        self.regs.duty_cycle.read(DUTY::VALUE) as f32 / 255.0
    }

    /// Release the pin.
    pub fn free(mut self) -> PIN {
        self.disable();
        self.pin
    }
}

impl<PIN> ErrorType for Pwm<PIN> {
    type Error = Infallible;
}

impl<PIN> SetDutyCycle for Pwm<PIN> {
    fn max_duty_cycle(&self) -> u16 {
        0xFF
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(0xFF);
        self.regs.duty_cycle.write(DUTY::VALUE.val(duty as u32));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(duty_from_fraction(-0.5), 0);
        assert_eq!(duty_from_fraction(f32::NAN), 0);
        assert_eq!(duty_from_fraction(0.5), 128);
        assert_eq!(duty_from_fraction(1.0), 255);
        assert_eq!(duty_from_fraction(7.0), 255);
    }

    #[test]
    fn write_and_read_back() {
        let regs = fake_regs::<PwmRegisters>();
        let mut pwm = Pwm::with_registers(regs, ());

        pwm.write(0.25);
        assert_eq!(peek(regs, 0x00), 64);
        assert!((pwm.read() - 64.0 / 255.0).abs() < f32::EPSILON);

        pwm.set_duty_cycle_percent(100).unwrap();
        assert_eq!(peek(regs, 0x00), 255);
        pwm.set_duty_cycle(1000).unwrap();
        assert_eq!(peek(regs, 0x00), 255);
    }

    #[test]
    fn period_follows_prescaler() {
        let regs = fake_regs::<PwmRegisters>();
        let pwm = Pwm::with_registers(regs, ());

        assert_eq!(pwm.period_us(), 7_812);
        poke(regs, 0x14, 0b11);
        assert_eq!(pwm.period_us(), 32_000_000);
    }
}
