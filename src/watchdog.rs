//! Watchdog
//!
//! The watchdog counts down on the 32.768 kHz clock. The first timeout raises
//! an interrupt, a second one without a feed resets the chip, so the counter
//! is loaded with half the requested timeout.

use tock_registers::interfaces::{Readable, Writeable};

use crate::clock::RTC_FREQ;
use crate::pac::wdt::{WdtRegisters, CONTROL};
use crate::pac::{StaticRef, WDT};

/// Writing this value to the lock register enables register writes.
const UNLOCK_KEY: u32 = 0x1ACC_E551;

/// Counter load value for a reset after `timeout_ms`.
pub const fn load_for(timeout_ms: u32) -> u32 {
    let ticks = timeout_ms as u64 * RTC_FREQ as u64 / 1_000 / 2;
    if ticks == 0 {
        1
    } else if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

pub struct Watchdog {
    regs: StaticRef<WdtRegisters>,
}

impl Watchdog {
    pub fn new(_wdt: WDT) -> Self {
        Self::with_registers(WDT::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<WdtRegisters>) -> Self {
        Self { regs }
    }

    fn unlocked<F: FnOnce(&WdtRegisters)>(&mut self, f: F) {
        self.regs.lock.set(UNLOCK_KEY);
        f(&self.regs);
        // Any other value locks the registers again.
        self.regs.lock.set(0);
    }

    /// Start the watchdog, the chip resets if it is not fed within `timeout_ms`.
    pub fn start(&mut self, timeout_ms: u32) {
        let load = load_for(timeout_ms);
        self.unlocked(|regs| {
            regs.load.set(load);
            regs.control.write(CONTROL::INT_EN::SET + CONTROL::RESET_EN::SET);
        });
        trace!("watchdog: started, load {}", load);
    }

    /// Reload the counter.
    pub fn feed(&mut self) {
        self.unlocked(|regs| regs.kick.set(1));
    }

    pub fn stop(&mut self) {
        self.unlocked(|regs| regs.control.write(CONTROL::INT_EN::CLEAR + CONTROL::RESET_EN::CLEAR));
    }

    pub fn is_running(&self) -> bool {
        self.regs.control.is_set(CONTROL::RESET_EN)
    }

    /// Remaining ticks of the current period.
    pub fn value(&self) -> u32 {
        self.regs.value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek};

    #[test]
    fn load_is_half_the_timeout() {
        assert_eq!(load_for(1_000), 16_384);
        assert_eq!(load_for(0), 1);
        assert_eq!(load_for(u32::MAX), u32::MAX);
    }

    #[test]
    fn start_feed_stop_relock() {
        let regs = fake_regs::<WdtRegisters>();
        let mut wdt = Watchdog::with_registers(regs);

        wdt.start(2_000);
        assert_eq!(peek(regs, 0x000), 32_768);
        assert_eq!(peek(regs, 0x008), 0b11);
        assert_eq!(peek(regs, 0xC00), 0);
        assert!(wdt.is_running());

        wdt.feed();
        assert_eq!(peek(regs, 0x00C), 1);

        wdt.stop();
        assert!(!wdt.is_running());
        assert_eq!(peek(regs, 0xC00), 0);
    }
}
