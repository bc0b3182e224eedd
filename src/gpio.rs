//! General Purpose Input / Output
//!
//! The NCS36510 has a single GPIO port with 18 digital IOs. The GPIO block only
//! holds direction, data and interrupt bits, pull resistors and drive strength
//! live in the pad block and the pin function in the crossbar, so every mode
//! change takes the [`Pads`] and [`Crossbar`] owners as arguments.

use core::convert::Infallible;
use core::marker::PhantomData;

pub use embedded_hal::digital::*;
use tock_registers::interfaces::{Readable, Writeable};

use crate::pac::gpio::GpioRegisters;
use crate::pac::{StaticRef, GPIO};
use crate::pad::{Crossbar, OutputType, PadConfig, Pads, Pull};

/// Extension trait to split the GPIO peripheral in independent pins
pub trait GpioExt {
    /// The type to split the GPIO into
    type Parts;

    /// Splits the GPIO block into independent pins
    fn split(self) -> Self::Parts;
}

/// Output type state
#[derive(Debug, Clone, Copy)]
pub struct Output<MODE> {
    _mode: PhantomData<MODE>,
}

/// Push pull output mode type state
#[derive(Debug, Clone, Copy)]
pub struct PushPull;
/// Open drain output mode type state
#[derive(Debug, Clone, Copy)]
pub struct OpenDrain;

/// Input type state
#[derive(Debug, Clone, Copy)]
pub struct Input<MODE> {
    _mode: PhantomData<MODE>,
}

/// Floating input mode type state
#[derive(Debug, Clone, Copy)]
pub struct Floating;
/// Input pull up mode type state
#[derive(Debug, Clone, Copy)]
pub struct PullUp;
/// Input pull down mode type state
#[derive(Debug, Clone, Copy)]
pub struct PullDown;

/// Pin routed to crossbar function `F`
///
/// Only functions 1 to 7 exist, other values are rejected at compile time:
///
/// ```compile_fail
/// use ncs36510_hal::gpio::{Alternate, Dio9, GpioExt};
/// use ncs36510_hal::pac::Peripherals;
/// use ncs36510_hal::pad::PadExt;
///
/// let p = Peripherals::take().unwrap();
/// let mut pads = p.PAD.split();
/// let mut crossbar = p.CROSSBAR.split();
/// let gpio = p.GPIO.split();
/// let _: Dio9<Alternate<9>> = gpio.dio9.into_alternate(&mut pads, &mut crossbar);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Alternate<const F: u8>;

impl<const F: u8> Alternate<F> {
    const FUNCTION: u8 = {
        assert!(F >= 1 && F <= 7, "crossbar functions are 1..=7");
        F
    };
}

/// Pin used as an ADC input
#[derive(Debug, Clone, Copy)]
pub struct Analog;

/// Condition raising a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RisingEdge,
    FallingEdge,
    HighLevel,
    LowLevel,
}

/// Bit level access to one pin of the GPIO block.
#[derive(Clone, Copy)]
struct PinBits {
    regs: StaticRef<GpioRegisters>,
    pin: u8,
}

impl PinBits {
    fn mask(&self) -> u32 {
        1 << self.pin
    }

    fn set_direction(&self, output: bool) {
        let mask = self.mask();
        critical_section::with(|_| {
            let dir = self.regs.dir.get();
            self.regs
                .dir
                .set(if output { dir | mask } else { dir & !mask });
        });
    }

    fn set_output(&self, high: bool) {
        let mask = self.mask();
        critical_section::with(|_| {
            let out = self.regs.data_out.get();
            self.regs
                .data_out
                .set(if high { out | mask } else { out & !mask });
        });
    }

    fn output_is_high(&self) -> bool {
        self.regs.data_out.get() & self.mask() != 0
    }

    fn input_is_high(&self) -> bool {
        self.regs.data_in.get() & self.mask() != 0
    }

    fn enable_interrupt(&self, trigger: Trigger) {
        let mask = self.mask();
        let (edge, polarity) = match trigger {
            Trigger::RisingEdge => (true, true),
            Trigger::FallingEdge => (true, false),
            Trigger::HighLevel => (false, true),
            Trigger::LowLevel => (false, false),
        };

        critical_section::with(|_| {
            let en = self.regs.irq_enable.get();
            self.regs.irq_enable.set(en & !mask);

            let e = self.regs.irq_edge.get();
            self.regs
                .irq_edge
                .set(if edge { e | mask } else { e & !mask });
            let p = self.regs.irq_polarity.get();
            self.regs
                .irq_polarity
                .set(if polarity { p | mask } else { p & !mask });

            self.regs.irq_clear.set(mask);
            self.regs.irq_enable.set(en | mask);
        });
    }

    fn disable_interrupt(&self) {
        let mask = self.mask();
        critical_section::with(|_| {
            let en = self.regs.irq_enable.get();
            self.regs.irq_enable.set(en & !mask);
        });
    }

    fn is_interrupt_pending(&self) -> bool {
        self.regs.irq_status.get() & self.mask() != 0
    }

    fn clear_interrupt_pending_bit(&self) {
        self.regs.irq_clear.set(self.mask());
    }
}

/// Digital IO `N` in mode `MODE`
pub struct Dio<const N: u8, MODE> {
    regs: StaticRef<GpioRegisters>,
    _mode: PhantomData<MODE>,
}

/// Fully erased pin
pub struct Pin<MODE> {
    bits: PinBits,
    _mode: PhantomData<MODE>,
}

impl<const N: u8, MODE> Dio<N, MODE> {
    fn new(regs: StaticRef<GpioRegisters>) -> Self {
        Dio {
            regs,
            _mode: PhantomData,
        }
    }

    fn bits(&self) -> PinBits {
        PinBits {
            regs: self.regs,
            pin: N,
        }
    }

    fn into_mode<NEW>(self) -> Dio<N, NEW> {
        Dio::new(self.regs)
    }

    /// Pin number of this IO
    pub const fn pin(&self) -> u8 {
        N
    }

    /// Erase the pin number
    pub fn downgrade(self) -> Pin<MODE> {
        Pin {
            bits: self.bits(),
            _mode: PhantomData,
        }
    }

    fn into_gpio_input(
        self,
        pull: Pull,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Input<()>> {
        // N always names one of the 18 pads, the pad and crossbar calls cannot fail.
        let _ = crossbar.select(N, 0);
        let _ = pads.configure(
            N,
            PadConfig {
                pull,
                ..Default::default()
            },
        );
        self.bits().set_direction(false);
        self.into_mode()
    }

    fn into_gpio_output(
        self,
        output_type: OutputType,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Output<()>> {
        let _ = crossbar.select(N, 0);
        let _ = pads.configure(
            N,
            PadConfig {
                pull: Pull::None,
                output_type,
                ..Default::default()
            },
        );
        self.bits().set_direction(true);
        self.into_mode()
    }

    /// Configure the pin to operate as a floating input pin
    pub fn into_floating_input(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Input<Floating>> {
        self.into_gpio_input(Pull::None, pads, crossbar)
            .into_mode()
    }

    /// Configure the pin to operate as a pull up input pin
    pub fn into_pull_up_input(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Input<PullUp>> {
        self.into_gpio_input(Pull::Up, pads, crossbar).into_mode()
    }

    /// Configure the pin to operate as a pull down input pin
    pub fn into_pull_down_input(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Input<PullDown>> {
        self.into_gpio_input(Pull::Down, pads, crossbar)
            .into_mode()
    }

    /// Configure the pin to operate as a push pull output pin
    pub fn into_push_pull_output(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Output<PushPull>> {
        self.into_gpio_output(OutputType::PushPull, pads, crossbar)
            .into_mode()
    }

    /// Configure the pin to operate as an open drain output pin
    pub fn into_open_drain_output(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Output<OpenDrain>> {
        self.into_gpio_output(OutputType::OpenDrain, pads, crossbar)
            .into_mode()
    }

    /// Hand the pin to crossbar function `F`
    pub fn into_alternate<const F: u8>(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Alternate<F>> {
        let func = Alternate::<F>::FUNCTION;
        let _ = pads.configure(
            N,
            PadConfig {
                pull: Pull::None,
                ..Default::default()
            },
        );
        let _ = crossbar.select(N, func);
        self.into_mode()
    }

    /// Hand the pin to crossbar function `F` with an open drain driver and the
    /// internal pull up, as I2C lines need.
    pub fn into_alternate_open_drain<const F: u8>(
        self,
        pads: &mut Pads,
        crossbar: &mut Crossbar,
    ) -> Dio<N, Alternate<F>> {
        let func = Alternate::<F>::FUNCTION;
        let _ = pads.configure(
            N,
            PadConfig {
                pull: Pull::Up,
                output_type: OutputType::OpenDrain,
                ..Default::default()
            },
        );
        let _ = crossbar.select(N, func);
        self.into_mode()
    }

    /// Disconnect the digital input so the pad can be sampled by the ADC
    pub fn into_analog(self, pads: &mut Pads, crossbar: &mut Crossbar) -> Dio<N, Analog> {
        let _ = crossbar.select(N, 0);
        self.bits().set_direction(false);
        let _ = pads.set_analog(N, true);
        self.into_mode()
    }
}

impl<const N: u8, MODE> Dio<N, Input<MODE>> {
    pub fn enable_interrupt(&mut self, trigger: Trigger) {
        self.bits().enable_interrupt(trigger);
    }

    pub fn disable_interrupt(&mut self) {
        self.bits().disable_interrupt();
    }

    pub fn is_interrupt_pending(&self) -> bool {
        self.bits().is_interrupt_pending()
    }

    pub fn clear_interrupt_pending_bit(&mut self) {
        self.bits().clear_interrupt_pending_bit();
    }
}

impl<MODE> Pin<MODE> {
    /// Pin number of this IO
    pub fn pin(&self) -> u8 {
        self.bits.pin
    }
}

impl<MODE> Pin<Input<MODE>> {
    pub fn enable_interrupt(&mut self, trigger: Trigger) {
        self.bits.enable_interrupt(trigger);
    }

    pub fn disable_interrupt(&mut self) {
        self.bits.disable_interrupt();
    }

    pub fn is_interrupt_pending(&self) -> bool {
        self.bits.is_interrupt_pending()
    }

    pub fn clear_interrupt_pending_bit(&mut self) {
        self.bits.clear_interrupt_pending_bit();
    }
}

impl<const N: u8, MODE> ErrorType for Dio<N, Output<MODE>> {
    type Error = Infallible;
}

impl<const N: u8, MODE> OutputPin for Dio<N, Output<MODE>> {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bits().set_output(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bits().set_output(false);
        Ok(())
    }
}

impl<const N: u8, MODE> StatefulOutputPin for Dio<N, Output<MODE>> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bits().output_is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bits().output_is_high())
    }
}

// An open drain output can be read back to see whether another device holds
// the line low.
impl<const N: u8> InputPin for Dio<N, Output<OpenDrain>> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bits().input_is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bits().input_is_high())
    }
}

impl<const N: u8, MODE> ErrorType for Dio<N, Input<MODE>> {
    type Error = Infallible;
}

impl<const N: u8, MODE> InputPin for Dio<N, Input<MODE>> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bits().input_is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bits().input_is_high())
    }
}

impl<MODE> ErrorType for Pin<Output<MODE>> {
    type Error = Infallible;
}

impl<MODE> OutputPin for Pin<Output<MODE>> {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bits.set_output(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bits.set_output(false);
        Ok(())
    }
}

impl<MODE> StatefulOutputPin for Pin<Output<MODE>> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bits.output_is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bits.output_is_high())
    }
}

impl<MODE> ErrorType for Pin<Input<MODE>> {
    type Error = Infallible;
}

impl<MODE> InputPin for Pin<Input<MODE>> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bits.input_is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bits.input_is_high())
    }
}

macro_rules! gpio {
    ($($Dio:ident: ($dio:ident, $n:expr),)+) => {
        $(
            #[doc = concat!("Digital IO ", stringify!($n))]
            pub type $Dio<MODE> = Dio<$n, MODE>;
        )+

        /// GPIO parts, all pins start as pull up inputs
        pub struct Parts {
            $(
                pub $dio: $Dio<Input<PullUp>>,
            )+
        }

        impl Parts {
            pub(crate) fn new(regs: StaticRef<GpioRegisters>) -> Self {
                Parts {
                    $(
                        $dio: Dio::new(regs),
                    )+
                }
            }
        }

        impl GpioExt for GPIO {
            type Parts = Parts;

            fn split(self) -> Parts {
                Parts::new(GPIO::regs())
            }
        }
    };
}

gpio!(
    Dio0: (dio0, 0),
    Dio1: (dio1, 1),
    Dio2: (dio2, 2),
    Dio3: (dio3, 3),
    Dio4: (dio4, 4),
    Dio5: (dio5, 5),
    Dio6: (dio6, 6),
    Dio7: (dio7, 7),
    Dio8: (dio8, 8),
    Dio9: (dio9, 9),
    Dio10: (dio10, 10),
    Dio11: (dio11, 11),
    Dio12: (dio12, 12),
    Dio13: (dio13, 13),
    Dio14: (dio14, 14),
    Dio15: (dio15, 15),
    Dio16: (dio16, 16),
    Dio17: (dio17, 17),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::crossbar::CrossbarRegisters;
    use crate::pac::pad::PadRegisters;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    struct Board {
        gpio: StaticRef<GpioRegisters>,
        pad: StaticRef<PadRegisters>,
        crossbar: StaticRef<CrossbarRegisters>,
        pads: Pads,
        xbar: Crossbar,
    }

    fn board() -> (Board, Parts) {
        let gpio = fake_regs::<GpioRegisters>();
        let pad = fake_regs::<PadRegisters>();
        let crossbar = fake_regs::<CrossbarRegisters>();
        (
            Board {
                gpio,
                pad,
                crossbar,
                pads: Pads::new(pad),
                xbar: Crossbar::new(crossbar),
            },
            Parts::new(gpio),
        )
    }

    #[test]
    fn push_pull_output_drives_the_latch() {
        let (mut b, parts) = board();
        let mut led = parts.dio6.into_push_pull_output(&mut b.pads, &mut b.xbar);

        assert_eq!(peek(b.gpio, 0x08), 1 << 6);

        led.set_high().unwrap();
        assert_eq!(peek(b.gpio, 0x04), 1 << 6);
        assert!(led.is_set_high().unwrap());

        led.set_low().unwrap();
        assert_eq!(peek(b.gpio, 0x04), 0);
        assert!(led.is_set_low().unwrap());
    }

    #[test]
    fn outputs_do_not_disturb_each_other() {
        let (mut b, parts) = board();
        let mut a = parts.dio0.into_push_pull_output(&mut b.pads, &mut b.xbar);
        let mut c = parts.dio17.into_push_pull_output(&mut b.pads, &mut b.xbar);

        a.set_high().unwrap();
        c.set_high().unwrap();
        a.set_low().unwrap();

        assert_eq!(peek(b.gpio, 0x04), 1 << 17);
        assert_eq!(peek(b.gpio, 0x08), (1 << 17) | 1);
    }

    #[test]
    fn input_reads_data_in_and_sets_pull() {
        let (mut b, parts) = board();
        let mut button = parts.dio3.into_pull_down_input(&mut b.pads, &mut b.xbar);

        assert_eq!((peek(b.pad, 3 * 4) >> 2) & 0b11, 2);
        assert!(button.is_low().unwrap());

        poke(b.gpio, 0x00, 1 << 3);
        assert!(button.is_high().unwrap());
    }

    #[test]
    fn alternate_selects_crossbar_function() {
        let (mut b, parts) = board();
        let _tx: Dio9<Alternate<1>> = parts.dio9.into_alternate(&mut b.pads, &mut b.xbar);
        let _sda: Dio2<Alternate<1>> = parts
            .dio2
            .into_alternate_open_drain(&mut b.pads, &mut b.xbar);

        assert_eq!(peek(b.crossbar, 9 * 4), 1);
        assert_eq!(peek(b.crossbar, 2 * 4), 1);
        assert_eq!(peek(b.pad, 2 * 4) & (1 << 4), 1 << 4);
    }

    #[test]
    fn highest_alternate_function() {
        let (mut b, parts) = board();
        let _pin: Dio9<Alternate<7>> = parts.dio9.into_alternate(&mut b.pads, &mut b.xbar);
        let _od: Dio4<Alternate<7>> = parts
            .dio4
            .into_alternate_open_drain(&mut b.pads, &mut b.xbar);

        assert_eq!(peek(b.crossbar, 9 * 4), 7);
        assert_eq!(peek(b.crossbar, 4 * 4), 7);
    }

    #[test]
    fn erased_pins_keep_their_number() {
        let (mut b, parts) = board();
        let mut pin = parts
            .dio12
            .into_push_pull_output(&mut b.pads, &mut b.xbar)
            .downgrade();

        assert_eq!(pin.pin(), 12);
        pin.set_high().unwrap();
        assert_eq!(peek(b.gpio, 0x04), 1 << 12);
    }

    #[test]
    fn rising_edge_interrupt() {
        let (mut b, parts) = board();
        let mut button = parts.dio5.into_pull_up_input(&mut b.pads, &mut b.xbar);

        button.enable_interrupt(Trigger::RisingEdge);
        assert_eq!(peek(b.gpio, 0x0C), 1 << 5);
        assert_eq!(peek(b.gpio, 0x10), 1 << 5);
        assert_eq!(peek(b.gpio, 0x14), 1 << 5);

        assert!(!button.is_interrupt_pending());
        poke(b.gpio, 0x18, 1 << 5);
        assert!(button.is_interrupt_pending());

        button.clear_interrupt_pending_bit();
        assert_eq!(peek(b.gpio, 0x1C), 1 << 5);

        button.enable_interrupt(Trigger::LowLevel);
        assert_eq!(peek(b.gpio, 0x10), 0);
        assert_eq!(peek(b.gpio, 0x14), 0);

        button.disable_interrupt();
        assert_eq!(peek(b.gpio, 0x0C), 0);
    }
}
