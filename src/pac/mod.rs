//! Peripheral access for the NCS36510
//!
//! Register overlays for every on-chip block, the memory map, and the interrupt
//! table. Each block is handed out once through [`Peripherals::take`] as a
//! zero-sized token; drivers turn the token into a [`StaticRef`] to the
//! register block.

use core::marker::PhantomData;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

pub mod adc;
pub mod aes;
pub mod clock;
pub mod crossbar;
pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod machw;
pub mod pad;
pub mod pmu;
pub mod pwm;
pub mod rtc;
pub mod spi;
pub mod timer;
pub mod trim;
pub mod trng;
pub mod uart;
pub mod wdt;

pub use cortex_m_rt::interrupt;

pub use self::Interrupt as interrupt;

/// Number of bits available in the NVIC priority registers.
pub const NVIC_PRIO_BITS: u8 = 3;

/// Number of digital IO pins.
pub const NUM_DIO: usize = 18;

/// A pointer to a statically allocated register block.
///
/// The pointer is only dereferenced through `Deref`, the caller of [`StaticRef::new`]
/// guarantees that it is valid for the lifetime of the program.
pub struct StaticRef<T> {
    ptr: *const T,
}

impl<T> StaticRef<T> {
    /// Create a new `StaticRef` from a raw pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be aligned, non-null and point to memory that stays valid
    /// (and is only accessed through volatile register types) forever.
    pub const unsafe fn new(ptr: *const T) -> StaticRef<T> {
        StaticRef { ptr }
    }

    /// Return the raw pointer.
    pub const fn as_ptr(&self) -> *const T {
        self.ptr
    }
}

impl<T> Clone for StaticRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StaticRef<T> {}

unsafe impl<T> Send for StaticRef<T> {}
unsafe impl<T> Sync for StaticRef<T> {}

impl<T> Deref for StaticRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.ptr }
    }
}

impl<T> core::fmt::Debug for StaticRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "StaticRef({:p})", self.ptr)
    }
}

/// Interrupt lines of the NCS36510.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum Interrupt {
    TIM0 = 0,
    TIM1 = 1,
    TIM2 = 2,
    UART1 = 3,
    SPI1 = 4,
    I2C1 = 5,
    GPIO = 6,
    RTC = 7,
    FLASH = 8,
    MACHW = 9,
    AES = 10,
    ADC = 11,
    CLOCKCAL = 12,
    UART2 = 13,
    UVI = 14,
    DMA = 15,
    DBGPWRUP = 16,
    SPI2 = 17,
    I2C2 = 18,
    FVDDHCOMP = 19,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

#[cfg(target_os = "none")]
mod vectors {
    extern "C" {
        fn TIM0();
        fn TIM1();
        fn TIM2();
        fn UART1();
        fn SPI1();
        fn I2C1();
        fn GPIO();
        fn RTC();
        fn FLASH();
        fn MACHW();
        fn AES();
        fn ADC();
        fn CLOCKCAL();
        fn UART2();
        fn UVI();
        fn DMA();
        fn DBGPWRUP();
        fn SPI2();
        fn I2C2();
        fn FVDDHCOMP();
    }

    #[doc(hidden)]
    pub union Vector {
        _handler: unsafe extern "C" fn(),
        _reserved: u32,
    }

    #[doc(hidden)]
    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    pub static __INTERRUPTS: [Vector; 20] = [
        Vector { _handler: TIM0 },
        Vector { _handler: TIM1 },
        Vector { _handler: TIM2 },
        Vector { _handler: UART1 },
        Vector { _handler: SPI1 },
        Vector { _handler: I2C1 },
        Vector { _handler: GPIO },
        Vector { _handler: RTC },
        Vector { _handler: FLASH },
        Vector { _handler: MACHW },
        Vector { _handler: AES },
        Vector { _handler: ADC },
        Vector { _handler: CLOCKCAL },
        Vector { _handler: UART2 },
        Vector { _handler: UVI },
        Vector { _handler: DMA },
        Vector { _handler: DBGPWRUP },
        Vector { _handler: SPI2 },
        Vector { _handler: I2C2 },
        Vector { _handler: FVDDHCOMP },
    ];
}

macro_rules! peripherals {
    ($(
        $(#[$attr:meta])*
        $NAME:ident: $module:ident::$Regs:ident @ $base:expr,
    )+) => {
        $(
            $(#[$attr])*
            pub struct $NAME {
                _marker: PhantomData<*const ()>,
            }

            unsafe impl Send for $NAME {}

            impl $NAME {
                /// Base address of the register block.
                pub const PTR: *const $module::$Regs = $base as *const $module::$Regs;

                /// Return a pointer to the register block.
                #[inline(always)]
                pub const fn ptr() -> *const $module::$Regs {
                    Self::PTR
                }

                /// Return a static reference to the register block.
                #[inline(always)]
                pub fn regs() -> StaticRef<$module::$Regs> {
                    unsafe { StaticRef::new(Self::PTR) }
                }
            }

            impl Deref for $NAME {
                type Target = $module::$Regs;

                #[inline(always)]
                fn deref(&self) -> &Self::Target {
                    unsafe { &*Self::PTR }
                }
            }

            impl core::fmt::Debug for $NAME {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    f.write_str(stringify!($NAME))
                }
            }
        )+

        /// All the peripherals of the NCS36510.
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(
                pub $NAME: $NAME,
            )+
        }

        static TAKEN: AtomicBool = AtomicBool::new(false);

        impl Peripherals {
            /// Returns all the peripherals once.
            #[inline]
            pub fn take() -> Option<Self> {
                if TAKEN.swap(true, Ordering::AcqRel) {
                    None
                } else {
                    Some(unsafe { Self::steal() })
                }
            }

            /// Unchecked version of [`Peripherals::take`].
            ///
            /// # Safety
            ///
            /// Each returned token must be used at most once.
            #[inline]
            pub unsafe fn steal() -> Self {
                TAKEN.store(true, Ordering::Release);
                Peripherals {
                    $(
                        $NAME: $NAME { _marker: PhantomData },
                    )+
                }
            }
        }
    };
}

peripherals! {
    /// General purpose timer 0
    TIM0: timer::TimerRegisters @ 0x4000_0000,
    /// General purpose timer 1
    TIM1: timer::TimerRegisters @ 0x4000_1000,
    /// General purpose timer 2
    TIM2: timer::TimerRegisters @ 0x4000_2000,
    /// UART 1
    UART1: uart::UartRegisters @ 0x4000_3000,
    /// UART 2
    UART2: uart::UartRegisters @ 0x4000_4000,
    /// I2C controller 1
    I2C1: i2c::I2cRegisters @ 0x4000_5000,
    /// SPI controller 1
    SPI1: spi::SpiRegisters @ 0x4000_6000,
    /// Watchdog
    WDT: wdt::WdtRegisters @ 0x4000_7000,
    /// Real time clock
    RTC: rtc::RtcRegisters @ 0x4000_8000,
    /// SPI controller 2
    SPI2: spi::SpiRegisters @ 0x4000_9000,
    /// I2C controller 2
    I2C2: i2c::I2cRegisters @ 0x4000_A000,
    /// Pulse width modulation
    PWM: pwm::PwmRegisters @ 0x4000_B000,
    /// General purpose IO
    GPIO: gpio::GpioRegisters @ 0x4000_C000,
    /// Analog to digital converter
    ADC: adc::AdcRegisters @ 0x4000_E000,
    /// True random number generator
    TRNG: trng::TrngRegisters @ 0x4001_1000,
    /// IEEE 802.15.4 MAC hardware
    MACHW: machw::MacRegisters @ 0x4001_4000,
    /// AES-128 engine
    AES: aes::AesRegisters @ 0x4001_6000,
    /// Clock control
    CLOCK: clock::ClockRegisters @ 0x4001_B000,
    /// Crossbar pin multiplexer
    CROSSBAR: crossbar::CrossbarRegisters @ 0x4001_C000,
    /// Power management unit
    PMU: pmu::PmuRegisters @ 0x4001_D000,
    /// Pad configuration
    PAD: pad::PadRegisters @ 0x4001_E000,
    /// DMA engine
    DMA: dma::DmaRegisters @ 0x2400_0400,
    /// Factory trim values in flash information block
    TRIM: trim::TrimRegisters @ 0x0000_1FA0,
}

#[cfg(test)]
pub(crate) mod test_utils {
    extern crate std;

    use super::StaticRef;
    use std::boxed::Box;

    /// Leak a zeroed register block in RAM and return a reference to it.
    pub fn fake_regs<T>() -> StaticRef<T> {
        let block: Box<T> = Box::new(unsafe { core::mem::zeroed() });
        unsafe { StaticRef::new(Box::leak(block) as *const T) }
    }

    /// Read the raw word at a byte offset of a register block.
    pub fn peek<T>(regs: StaticRef<T>, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((regs.as_ptr() as *const u8).add(offset) as *const u32) }
    }

    /// Write the raw word at a byte offset of a register block.
    pub fn poke<T>(regs: StaticRef<T>, offset: usize, value: u32) {
        unsafe {
            core::ptr::write_volatile((regs.as_ptr() as *mut u8).add(offset) as *mut u32, value)
        }
    }

    /// Write a raw byte at a byte offset of a register block.
    pub fn poke_u8<T>(regs: StaticRef<T>, offset: usize, value: u8) {
        unsafe { core::ptr::write_volatile((regs.as_ptr() as *mut u8).add(offset), value) }
    }
}
