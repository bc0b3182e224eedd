//! Delays

pub use embedded_hal::delay::DelayNs;

use crate::clock::ClockConfig;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

/// SysTick reload values are 24 bits wide.
const MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Core clock cycles needed to wait `ns` nanoseconds, rounded up.
pub const fn cycles_for(sys_freq: u32, ns: u32) -> u64 {
    (ns as u64 * sys_freq as u64 + 999_999_999) / 1_000_000_000
}

pub struct Delay {
    clocks: ClockConfig,
    syst: SYST,
}

impl Delay {
    pub fn new(mut syst: SYST, clocks: ClockConfig) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        Self { clocks, syst }
    }

    pub fn free(self) -> SYST {
        self.syst
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let mut cycles = cycles_for(self.clocks.sys_freq(), ns);

        while cycles > 0 {
            let rvr = cycles.min(MAX_RELOAD as u64) as u32;

            self.syst.set_reload(rvr);
            self.syst.clear_current();
            self.syst.enable_counter();

            while !self.syst.has_wrapped() {}

            self.syst.disable_counter();
            cycles -= rvr as u64;
        }
    }
}
