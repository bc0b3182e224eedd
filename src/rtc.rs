//! Real time clock
//!
//! A seconds counter and a sub-second counter running from the 32.768 kHz
//! clock. The registers live in the always-on domain, every write completes
//! asynchronously and is tracked by a busy bit in `status`.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::fields::Field;

use crate::clock::RTC_FREQ;
use crate::pac::rtc::{RtcRegisters, CONTROL, INT, STATUS};
use crate::pac::{StaticRef, RTC};

/// Convert RTC ticks to microseconds, saturating at `u64::MAX`.
pub const fn ticks_to_us(ticks: u64) -> u64 {
    (ticks / RTC_FREQ as u64)
        .saturating_mul(1_000_000)
        .saturating_add((ticks % RTC_FREQ as u64) * 1_000_000 / RTC_FREQ as u64)
}

/// Convert microseconds to RTC ticks, rounding down and saturating at
/// `u64::MAX`.
pub const fn us_to_ticks(us: u64) -> u64 {
    (us / 1_000_000)
        .saturating_mul(RTC_FREQ as u64)
        .saturating_add((us % 1_000_000) * RTC_FREQ as u64 / 1_000_000)
}

/// Split `ticks` into the seconds and sub-second alarm values. Times past the
/// range of the seconds counter give its last tick.
fn alarm_values(ticks: u64) -> (u32, u32) {
    match u32::try_from(ticks / RTC_FREQ as u64) {
        Ok(seconds) => (seconds, (ticks % RTC_FREQ as u64) as u32),
        Err(_) => (u32::MAX, RTC_FREQ - 1),
    }
}

pub struct Rtc {
    regs: StaticRef<RtcRegisters>,
}

impl Rtc {
    /// Start both counters.
    pub fn new(_rtc: RTC) -> Self {
        Self::with_registers(RTC::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<RtcRegisters>) -> Self {
        let rtc = Self { regs };
        rtc.wait(STATUS::BSY_CTRL);
        rtc.regs
            .control
            .modify(CONTROL::SUB_SEC_COUNTER_EN::SET + CONTROL::SEC_COUNTER_EN::SET);
        rtc.wait(STATUS::BSY_CTRL);
        rtc
    }

    fn wait(&self, busy: Field<u32, STATUS::Register>) {
        while self.regs.status.is_set(busy) {}
    }

    pub fn is_enabled(&self) -> bool {
        self.regs.control.is_set(CONTROL::SEC_COUNTER_EN)
    }

    /// Seconds elapsed since the counter was last written.
    pub fn read(&self) -> u32 {
        self.regs.second_counter.get()
    }

    /// Set the seconds counter and restart the current second.
    pub fn write(&mut self, seconds: u32) {
        self.wait(STATUS::BSY_CTRL);
        self.regs
            .control
            .modify(CONTROL::SUB_SEC_COUNTER_EN::CLEAR + CONTROL::SEC_COUNTER_EN::CLEAR);
        self.wait(STATUS::BSY_CTRL);

        self.regs.second_counter.set(seconds);
        self.wait(STATUS::BSY_SEC);
        self.regs.sub_second_counter.set(0);
        self.wait(STATUS::BSY_SUB_SEC);

        self.regs
            .control
            .modify(CONTROL::SUB_SEC_COUNTER_EN::SET + CONTROL::SEC_COUNTER_EN::SET);
        self.wait(STATUS::BSY_CTRL);
    }

    /// Ticks of the 32.768 kHz clock since the counter was last written.
    pub fn ticks(&self) -> u64 {
        // The sub-second counter may wrap between the two reads.
        loop {
            let seconds = self.regs.second_counter.get();
            let sub = self.regs.sub_second_counter.get();
            if self.regs.second_counter.get() == seconds {
                return seconds as u64 * RTC_FREQ as u64 + sub as u64;
            }
        }
    }

    pub fn now_us(&self) -> u64 {
        ticks_to_us(self.ticks())
    }

    /// Raise the alarm interrupt when the counters reach `ticks`.
    pub fn set_alarm(&mut self, ticks: u64) {
        let (seconds, sub) = alarm_values(ticks);

        self.regs.second_alarm.set(seconds);
        self.wait(STATUS::BSY_SEC_ALARM);
        self.regs.sub_second_alarm.set(sub);
        self.wait(STATUS::BSY_SUB_SEC_ALARM);

        self.clear_alarm();
        self.regs
            .control
            .modify(CONTROL::SUB_SEC_ALARM_INT_EN::SET + CONTROL::SEC_ALARM_INT_EN::SET);
        self.wait(STATUS::BSY_CTRL);
    }

    /// Raise the alarm interrupt `delay_us` from now.
    pub fn set_alarm_in(&mut self, delay_us: u64) {
        let at = self.ticks().saturating_add(us_to_ticks(delay_us));
        self.set_alarm(at);
    }

    pub fn disable_alarm(&mut self) {
        self.regs
            .control
            .modify(CONTROL::SUB_SEC_ALARM_INT_EN::CLEAR + CONTROL::SEC_ALARM_INT_EN::CLEAR);
        self.wait(STATUS::BSY_CTRL);
    }

    pub fn is_alarm_pending(&self) -> bool {
        let status = self.regs.int_status.extract();
        status.is_set(INT::SEC) && status.is_set(INT::SUB_SEC)
    }

    pub fn clear_alarm(&mut self) {
        self.regs.int_clear.write(INT::SEC::SET + INT::SUB_SEC::SET);
        self.wait(STATUS::BSY_INT_CLR);
    }
}
