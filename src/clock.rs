//! Clock control

use paste::paste;

use core::marker::PhantomData;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac::clock::{ClockRegisters, CCR, DIV, PDIS, STATUS};
use crate::pac::{StaticRef, CLOCK};

/// Frequency of the main oscillator, whichever source is selected.
pub const OSC_FREQ: u32 = 32_000_000;

/// Frequency of the low power clock feeding the RTC, watchdog and PWM.
pub const RTC_FREQ: u32 = 32_768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Osc {
    /// External 32 MHz crystal, required by the radio.
    External32Mhz,
    /// Internal 32 MHz RC oscillator.
    InternalRc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDiv {
    Clock32Mhz = 0b000,
    Clock16Mhz = 0b001,
    Clock8Mhz = 0b010,
    Clock4Mhz = 0b011,
    Clock2Mhz = 0b100,
    Clock1Mhz = 0b101,
    Clock500Khz = 0b110,
    Clock250Khz = 0b111,
}

impl ClockDiv {
    pub const fn as_freq(&self) -> u32 {
        OSC_FREQ >> (*self as u32)
    }
}

pub struct Unconfigured;
pub struct Frozen;

pub struct ClockCtrl<STATE> {
    regs: StaticRef<ClockRegisters>,
    config: ClockConfig,
    _state: PhantomData<STATE>,
}

#[derive(Debug, Copy, Clone)]
pub struct ClockConfig {
    pub use_crystal_osc32k: bool,
    pub osc: Osc,
    pub periph_div: ClockDiv,
    pub timer_div: ClockDiv,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            use_crystal_osc32k: true,
            osc: Osc::External32Mhz,
            periph_div: ClockDiv::Clock16Mhz,
            timer_div: ClockDiv::Clock1Mhz,
        }
    }
}

impl ClockConfig {
    pub const fn sys_freq(&self) -> u32 {
        OSC_FREQ
    }

    pub const fn periph_freq(&self) -> u32 {
        self.periph_div.as_freq()
    }

    pub const fn timer_freq(&self) -> u32 {
        self.timer_div.as_freq()
    }

    pub const fn rtc_freq(&self) -> u32 {
        RTC_FREQ
    }
}

pub trait ClockExt {
    type Parts;
    fn constrain(self) -> Self::Parts;
}

impl ClockExt for CLOCK {
    type Parts = ClockCtrl<Unconfigured>;

    fn constrain(self) -> Self::Parts {
        ClockCtrl::new(CLOCK::regs())
    }
}

impl ClockCtrl<Unconfigured> {
    pub(crate) fn new(regs: StaticRef<ClockRegisters>) -> Self {
        ClockCtrl {
            regs,
            config: Default::default(),
            _state: PhantomData,
        }
    }

    pub fn disable_crystal_osc32k(&mut self) {
        self.config.use_crystal_osc32k = false;
    }

    pub fn set_osc(&mut self, osc: Osc) {
        self.config.osc = osc;
    }

    pub fn set_periph_div(&mut self, div: ClockDiv) {
        self.config.periph_div = div;
    }

    pub fn set_timer_div(&mut self, div: ClockDiv) {
        self.config.timer_div = div;
    }

    pub fn freeze(self) -> ClockCtrl<Frozen> {
        if self.config.use_crystal_osc32k {
            self.regs.ccr.modify(CCR::XTAL32K_EN::SET);
            while !self.regs.status.is_set(STATUS::XTAL32K_READY) {}
        } else {
            self.regs.ccr.modify(CCR::XTAL32K_EN::CLEAR);
        }

        match self.config.osc {
            Osc::External32Mhz => {
                self.regs.ccr.modify(CCR::OSC_SEL::External32Mhz);
                while !self.regs.status.is_set(STATUS::XTAL32M_READY) {}
            }
            Osc::InternalRc => {
                self.regs.ccr.modify(CCR::OSC_SEL::InternalRc);
                while !self.regs.status.is_set(STATUS::RC32M_READY) {}
            }
        }

        self.regs
            .fdiv
            .write(DIV::DIV.val(self.config.periph_div as u32));
        self.regs
            .tdiv
            .write(DIV::DIV.val(self.config.timer_div as u32));

        trace!(
            "clock: osc {:?}, periph {} Hz, timer {} Hz",
            self.config.osc,
            self.config.periph_freq(),
            self.config.timer_freq()
        );

        ClockCtrl {
            regs: self.regs,
            config: self.config,
            _state: PhantomData,
        }
    }
}

impl ClockCtrl<Frozen> {
    pub const fn config(&self) -> ClockConfig {
        self.config
    }

    /// Start a calibration of both RC oscillators against the crystals.
    pub fn calibrate_rc(&mut self) {
        self.regs.ccr.modify(CCR::CAL32K::SET + CCR::CAL32M::SET);
        while !self.regs.status.is_set(STATUS::CAL_DONE) {}
        self.regs.ccr.modify(CCR::CAL32K::CLEAR + CCR::CAL32M::CLEAR);
    }
}

macro_rules! impl_clock_gates {
    ([$(($field:ident = $name:ident)),+ $(,)?]) => {
        paste! {
        impl<STATE> ClockCtrl<STATE> {
            $(
            pub fn [<enable_ $name>](&mut self) {
                self.regs.pdis.modify(PDIS::$field::CLEAR);
            }

            pub fn [<disable_ $name>](&mut self) {
                self.regs.pdis.modify(PDIS::$field::SET);
            }

            pub fn [<is_ $name _enabled>](&self) -> bool {
                !self.regs.pdis.is_set(PDIS::$field)
            }
            )+
        }
        }
    };
}

impl_clock_gates!([
    (TIM0 = tim0),
    (TIM1 = tim1),
    (TIM2 = tim2),
    (UART1 = uart1),
    (SPI1 = spi1),
    (I2C1 = i2c1),
    (UART2 = uart2),
    (SPI2 = spi2),
    (WDT = watchdog),
    (PWM = pwm),
    (GPIO = gpio),
    (I2C2 = i2c2),
    (RTC = rtc),
    (TRNG = trng),
    (MACHW = radio),
    (ADC = adc),
    (AES = aes),
    (DMA = dma),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    #[test]
    fn dividers_shift_the_oscillator() {
        assert_eq!(ClockDiv::Clock32Mhz.as_freq(), 32_000_000);
        assert_eq!(ClockDiv::Clock4Mhz.as_freq(), 4_000_000);
        assert_eq!(ClockDiv::Clock250Khz.as_freq(), 250_000);
    }

    #[test]
    fn freeze_programs_source_and_dividers() {
        let regs = fake_regs::<ClockRegisters>();
        // All oscillators report ready.
        poke(regs, 0x10, 0b0111);

        let mut clocks = ClockCtrl::new(regs);
        clocks.set_periph_div(ClockDiv::Clock8Mhz);
        clocks.set_timer_div(ClockDiv::Clock2Mhz);
        let clocks = clocks.freeze();

        assert_eq!(peek(regs, 0x00) & 0b1001, 0b1001);
        assert_eq!(peek(regs, 0x08), 2);
        assert_eq!(peek(regs, 0x0C), 4);

        let config = clocks.config();
        assert_eq!(config.sys_freq(), 32_000_000);
        assert_eq!(config.periph_freq(), 8_000_000);
        assert_eq!(config.timer_freq(), 2_000_000);
        assert_eq!(config.rtc_freq(), 32_768);
    }

    #[test]
    fn internal_rc_without_32k_crystal() {
        let regs = fake_regs::<ClockRegisters>();
        poke(regs, 0x00, 0b1001);
        poke(regs, 0x10, 0b0001);

        let mut clocks = ClockCtrl::new(regs);
        clocks.set_osc(Osc::InternalRc);
        clocks.disable_crystal_osc32k();
        clocks.freeze();

        assert_eq!(peek(regs, 0x00) & 0b1001, 0);
    }

    #[test]
    fn gates_are_active_low() {
        let regs = fake_regs::<ClockRegisters>();
        poke(regs, 0x04, 0xFFFF_FFFF);

        let mut clocks = ClockCtrl::new(regs);
        clocks.enable_uart1();
        clocks.enable_radio();
        assert!(clocks.is_uart1_enabled());
        assert!(clocks.is_radio_enabled());
        assert!(!clocks.is_spi1_enabled());
        assert_eq!(peek(regs, 0x04), 0xFFFF_FFFF & !(1 << 3) & !(1 << 14));

        clocks.disable_uart1();
        assert!(!clocks.is_uart1_enabled());
    }
}
