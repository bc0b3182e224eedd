//! Power management
//!
//! `sleep` only stops the core clock. `deep_sleep` and `coma` hand the chip to
//! the PMU on the next `WFI`; in coma only the selected RAM banks keep their
//! content and the chip restarts through reset when woken.

use cortex_m::peripheral::SCB;
use tock_registers::interfaces::{ReadWriteable, Readable};

use crate::pac::pmu::{PmuRegisters, CONTROL, STATUS};
use crate::pac::{StaticRef, PMU};

/// Sources allowed to end a coma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeSources {
    pub gpio: bool,
    pub rtc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Run,
    Sleep,
    DeepSleep,
    Coma,
}

pub struct Power {
    regs: StaticRef<PmuRegisters>,
}

impl Power {
    pub fn new(_pmu: PMU) -> Self {
        Self::with_registers(PMU::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<PmuRegisters>) -> Self {
        Self { regs }
    }

    fn select(&mut self, mode: Mode) {
        let mode = match mode {
            Mode::Run => CONTROL::MODE::Run,
            Mode::Sleep => CONTROL::MODE::Sleep,
            Mode::DeepSleep => CONTROL::MODE::DeepSleep,
            Mode::Coma => CONTROL::MODE::Coma,
        };
        self.regs.control.modify(mode);
    }

    fn prepare_coma(&mut self, retain: u8, wake: WakeSources) {
        let wake_gpio = if wake.gpio {
            CONTROL::WAKE_GPIO::SET
        } else {
            CONTROL::WAKE_GPIO::CLEAR
        };
        let wake_rtc = if wake.rtc {
            CONTROL::WAKE_RTC::SET
        } else {
            CONTROL::WAKE_RTC::CLEAR
        };
        self.regs
            .control
            .modify(CONTROL::RETAIN.val((retain & 0x0F) as u32) + wake_gpio + wake_rtc);
        self.select(Mode::Coma);
    }

    /// Run `wait` with the PMU in `mode` and go back to run mode afterwards.
    fn suspend<F: FnOnce()>(&mut self, mode: Mode, wait: F) {
        self.select(mode);
        wait();
        self.select(Mode::Run);
    }

    /// Stop the core clock until the next interrupt.
    pub fn sleep(&mut self, scb: &mut SCB) {
        scb.clear_sleepdeep();
        self.suspend(Mode::Sleep, cortex_m::asm::wfi);
    }

    /// Stop the fast clocks until the next interrupt.
    pub fn deep_sleep(&mut self, scb: &mut SCB) {
        scb.set_sleepdeep();
        self.suspend(Mode::DeepSleep, cortex_m::asm::wfi);
        scb.clear_sleepdeep();
    }

    /// Power down everything but the always-on domain and the RAM banks set in
    /// `retain` (one bit per 12K bank).
    pub fn coma(&mut self, scb: &mut SCB, retain: u8, wake: WakeSources) {
        self.prepare_coma(retain, wake);
        scb.set_sleepdeep();
        cortex_m::asm::wfi();
        scb.clear_sleepdeep();
        self.select(Mode::Run);
    }

    /// The last reset was a wake up from coma.
    pub fn woke_from_coma(&self) -> bool {
        self.regs.status.is_set(STATUS::WOKE_FROM_COMA)
    }

    /// The last reset was caused by the watchdog.
    pub fn watchdog_reset(&self) -> bool {
        self.regs.status.is_set(STATUS::WDT_RESET)
    }
}
