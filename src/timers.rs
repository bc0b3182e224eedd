//! General Purpose Timers
//!
//! Three 16-bit down counters clocked from the timer clock divider, each with a
//! prescaler of 1, 16 or 256.

use core::convert::Infallible;
use core::sync::atomic::{compiler_fence, Ordering};

use embedded_hal::delay::DelayNs;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::ClockConfig;
use crate::pac::timer::{TimerRegisters, CONTROL, INT};
use crate::pac::{StaticRef, TIM0, TIM1, TIM2};

/// Largest value of the 16-bit counter.
const MAX_COUNT: u64 = 0xFFFF;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// Specifies the mode of operation of a timer.
pub enum Mode {
    /// Count down from 0xFFFF and wrap
    FreeRunning,
    /// Count down from the load value and reload
    Periodic,
    /// Count down from the load value once
    OneShot,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Prescaler {
    Div1,
    Div16,
    Div256,
}

impl Prescaler {
    pub const fn factor(&self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div16 => 16,
            Prescaler::Div256 => 256,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The duration does not fit the counter even with the largest prescaler.
    DurationTooLong,
}

/// Smallest prescaler and load value for a duration of `us` microseconds.
pub fn compute_reload(timer_freq: u32, us: u32) -> Result<(Prescaler, u16), Error> {
    let ticks = (us as u64 * timer_freq as u64 + 999_999) / 1_000_000;

    for prescaler in [Prescaler::Div1, Prescaler::Div16, Prescaler::Div256] {
        let factor = prescaler.factor() as u64;
        let count = (ticks + factor - 1) / factor;
        if count <= MAX_COUNT {
            return Ok((prescaler, count.max(1) as u16));
        }
    }

    Err(Error::DurationTooLong)
}

/// Extension trait used on timers.
pub trait TimerExt: Sized {
    fn timer(self, clocks: ClockConfig) -> Timer<Self>;
}

macro_rules! timer {
    ($($TIMX:ident,)+) => {
        $(
            impl TimerExt for $TIMX {
                fn timer(self, clocks: ClockConfig) -> Timer<Self> {
                    Timer::new(self, $TIMX::regs(), clocks.timer_freq())
                }
            }
        )+
    };
}

timer!(TIM0, TIM1, TIM2,);

pub struct Timer<TIM> {
    tim: TIM,
    regs: StaticRef<TimerRegisters>,
    freq: u32,
}

impl<TIM> Timer<TIM> {
    pub(crate) fn new(tim: TIM, regs: StaticRef<TimerRegisters>, freq: u32) -> Self {
        regs.control.write(CONTROL::ENABLE::CLEAR);
        regs.clear.set(1);
        Self { tim, regs, freq }
    }

    /// Start counting `count` ticks of the prescaled timer clock.
    pub fn start(&mut self, mode: Mode, prescaler: Prescaler, count: u16) {
        self.regs.control.modify(CONTROL::ENABLE::CLEAR);
        self.regs.clear.set(1);

        let prescale = match prescaler {
            Prescaler::Div1 => CONTROL::PRESCALE::Div1,
            Prescaler::Div16 => CONTROL::PRESCALE::Div16,
            Prescaler::Div256 => CONTROL::PRESCALE::Div256,
        };
        let mode = match mode {
            Mode::FreeRunning => CONTROL::PERIODIC::CLEAR + CONTROL::ONESHOT::CLEAR,
            Mode::Periodic => CONTROL::PERIODIC::SET + CONTROL::ONESHOT::CLEAR,
            Mode::OneShot => CONTROL::PERIODIC::SET + CONTROL::ONESHOT::SET,
        };
        let int_en = if self.regs.control.is_set(CONTROL::INT_EN) {
            CONTROL::INT_EN::SET
        } else {
            CONTROL::INT_EN::CLEAR
        };

        self.regs.load.set(count as u32);
        compiler_fence(Ordering::SeqCst);
        self.regs
            .control
            .write(prescale + mode + int_en + CONTROL::ENABLE::SET);
    }

    /// Start a timeout of `us` microseconds.
    pub fn start_us(&mut self, mode: Mode, us: u32) -> Result<(), Error> {
        let (prescaler, count) = compute_reload(self.freq, us)?;
        self.start(mode, prescaler, count);
        Ok(())
    }

    /// Wait for the timer to expire.
    pub fn wait(&mut self) -> nb::Result<(), Infallible> {
        if self.regs.int_status.is_set(INT::EXPIRED) {
            self.regs.clear.set(1);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    pub fn cancel(&mut self) {
        self.regs.control.modify(CONTROL::ENABLE::CLEAR);
        self.regs.clear.set(1);
    }

    pub fn is_running(&self) -> bool {
        self.regs.control.is_set(CONTROL::ENABLE)
    }

    /// Current counter value.
    pub fn value(&self) -> u16 {
        self.regs.value.get() as u16
    }

    /// Start listening for the expiry interrupt.
    pub fn listen(&mut self) {
        self.regs.control.modify(CONTROL::INT_EN::SET);
    }

    /// Stop listening for the expiry interrupt.
    pub fn unlisten(&mut self) {
        self.regs.control.modify(CONTROL::INT_EN::CLEAR);
    }

    pub fn clear_interrupt(&mut self) {
        self.regs.clear.set(1);
    }

    pub fn release(mut self) -> TIM {
        self.cancel();
        self.tim
    }
}

impl<TIM> DelayNs for Timer<TIM> {
    fn delay_ns(&mut self, ns: u32) {
        let mut us = ns.div_ceil(1_000);
        // Longest delay a single one-shot run can cover.
        let chunk = (MAX_COUNT * 256 * 1_000_000 / self.freq.max(1) as u64).min(u32::MAX as u64) as u32;

        while us > 0 {
            let step = us.min(chunk);
            if self.start_us(Mode::OneShot, step).is_err() {
                return;
            }
            let _ = nb::block!(self.wait());
            us -= step;
        }
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    #[test]
    fn reload_picks_smallest_prescaler() {
        assert_eq!(compute_reload(1_000_000, 1_000), Ok((Prescaler::Div1, 1_000)));
        assert_eq!(compute_reload(1_000_000, 100_000), Ok((Prescaler::Div16, 6_250)));
        assert_eq!(compute_reload(1_000_000, 10_000_000), Ok((Prescaler::Div256, 39_063)));
        assert_eq!(compute_reload(1_000_000, 0), Ok((Prescaler::Div1, 1)));
        assert_eq!(
            compute_reload(32_000_000, 1_000_000),
            Err(Error::DurationTooLong)
        );
    }

    #[test]
    fn one_shot_programming() {
        let regs = fake_regs::<TimerRegisters>();
        let mut timer = Timer::new((), regs, 1_000_000);

        timer.listen();
        timer.start_us(Mode::OneShot, 100_000).unwrap();

        assert_eq!(peek(regs, 0x00), 6_250);
        // Enabled, periodic, interrupt, prescale 16, one shot.
        assert_eq!(peek(regs, 0x08), (1 << 7) | (1 << 6) | (1 << 5) | (1 << 2) | 1);
        assert!(timer.is_running());
    }

    #[test]
    fn wait_clears_expiry() {
        let regs = fake_regs::<TimerRegisters>();
        let mut timer = Timer::new((), regs, 1_000_000);

        timer.start(Mode::Periodic, Prescaler::Div1, 10);
        assert_eq!(timer.wait(), Err(nb::Error::WouldBlock));

        poke(regs, 0x10, 1);
        poke(regs, 0x0C, 0);
        assert_eq!(timer.wait(), Ok(()));
        assert_eq!(peek(regs, 0x0C), 1);

        timer.cancel();
        assert!(!timer.is_running());
    }

    #[test]
    fn delay_returns_once_expired() {
        let regs = fake_regs::<TimerRegisters>();
        let mut timer = Timer::new((), regs, 1_000_000);
        poke(regs, 0x10, 1);

        timer.delay_us(250);
        assert_eq!(peek(regs, 0x00), 250);
        assert!(!timer.is_running());
    }
}
