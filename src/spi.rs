//! Serial Peripheral Interface masters
//!
//! Both SPI blocks run as master with 8-bit frames. Slave select is either
//! driven per word by the controller or, in manual mode, by [`Spi::select`].

use core::marker::PhantomData;

use embedded_hal::spi::{self, Mode, Phase, Polarity};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::ClockConfig;
use crate::pac::spi::{SpiRegisters, CONTROL, FDIV, STATUS};
use crate::pac::{StaticRef, SPI1, SPI2};

pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The receive FIFO overflowed, at least one word was lost.
    Overrun,
    /// There is no slave select line with this number.
    InvalidSlaveSelect,
}

impl spi::Error for Error {
    fn kind(&self) -> spi::ErrorKind {
        match self {
            Error::Overrun => spi::ErrorKind::Overrun,
            Error::InvalidSlaveSelect => spi::ErrorKind::Other,
        }
    }
}

/// Number of slave select outputs of each controller.
pub const NUM_SLAVE_SELECT: u8 = 8;

/// FDIV value giving the fastest clock not above `bit_rate`.
pub const fn clock_divider(periph_freq: u32, bit_rate: u32) -> u8 {
    let div = 2 * if bit_rate == 0 { 1 } else { bit_rate as u64 };
    let scale = (periph_freq as u64 + div - 1) / div;
    let scale = if scale < 1 {
        1
    } else if scale > 256 {
        256
    } else {
        scale
    };
    (scale - 1) as u8
}

pub struct Disabled;
pub struct Enabled;

pub trait SpiExt {
    type Parts;
    fn take(self) -> Self::Parts;
}

pub struct Spi<SPI, STATE> {
    spi: SPI,
    regs: StaticRef<SpiRegisters>,
    _state: PhantomData<STATE>,
}

macro_rules! spi {
    ($($SPIX:ident,)+) => {
        $(
            impl SpiExt for $SPIX {
                type Parts = Spi<Self, Disabled>;

                fn take(self) -> Self::Parts {
                    Spi::new(self, $SPIX::regs())
                }
            }
        )+
    };
}

spi!(SPI1, SPI2,);

impl<SPI> Spi<SPI, Disabled> {
    pub(crate) fn new(spi: SPI, regs: StaticRef<SpiRegisters>) -> Self {
        // Disable the controller
        regs.control.modify(CONTROL::ENABLE::CLEAR);

        Spi {
            spi,
            regs,
            _state: PhantomData,
        }
    }

    pub fn as_master(self) -> Self {
        self.regs.control.write(CONTROL::MASTER::SET);
        self
    }

    pub fn set_mode(self, mode: Mode) -> Self {
        let cpol = match mode.polarity {
            Polarity::IdleLow => CONTROL::CPOL::CLEAR,
            Polarity::IdleHigh => CONTROL::CPOL::SET,
        };
        let cpha = match mode.phase {
            Phase::CaptureOnFirstTransition => CONTROL::CPHA::CLEAR,
            Phase::CaptureOnSecondTransition => CONTROL::CPHA::SET,
        };
        self.regs.control.modify(cpol + cpha);
        self
    }

    pub fn set_bit_order(self, order: BitOrder) -> Self {
        match order {
            BitOrder::MsbFirst => self.regs.control.modify(CONTROL::LSB_FIRST::CLEAR),
            BitOrder::LsbFirst => self.regs.control.modify(CONTROL::LSB_FIRST::SET),
        }
        self
    }

    pub fn set_bit_rate(self, bit_rate: u32, clock_config: ClockConfig) -> Self {
        let div = clock_divider(clock_config.periph_freq(), bit_rate);
        self.regs.fdiv.write(FDIV::DIV.val(div as u32));
        self
    }

    /// Let the application drive slave select through [`Spi::select`].
    pub fn manual_slave_select(self) -> Self {
        self.regs.control.modify(CONTROL::MANUAL_SS::SET);
        self
    }

    pub fn enable(self) -> Spi<SPI, Enabled> {
        // 8-bit data transfer
        self.regs
            .control
            .modify(CONTROL::WORD_WIDTH::Bits8 + CONTROL::ENABLE::SET);
        Spi {
            spi: self.spi,
            regs: self.regs,
            _state: PhantomData,
        }
    }

    /// Release the SPI peripheral.
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl<SPI> Spi<SPI, Enabled> {
    pub fn is_busy(&self) -> bool {
        self.regs.status.is_set(STATUS::BUSY)
    }

    pub fn is_receive_fifo_full(&self) -> bool {
        self.regs.status.is_set(STATUS::RX_FULL)
    }

    pub fn is_receive_fifo_empty(&self) -> bool {
        self.regs.status.is_set(STATUS::RX_EMPTY)
    }

    pub fn is_send_fifo_full(&self) -> bool {
        self.regs.status.is_set(STATUS::TX_FULL)
    }

    pub fn is_send_fifo_empty(&self) -> bool {
        self.regs.status.is_set(STATUS::TX_EMPTY)
    }

    /// Assert slave select line `line` (manual mode only).
    pub fn select(&mut self, line: u8) -> Result<(), Error> {
        if line >= NUM_SLAVE_SELECT {
            return Err(Error::InvalidSlaveSelect);
        }
        self.regs.slave_select.set(1 << line);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.regs.slave_select.set(0);
    }

    /// Exchange one byte.
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8, Error> {
        while self.is_send_fifo_full() {}
        self.regs.tx_data.set(byte as u32);

        while self.is_receive_fifo_empty() {}
        let read = (self.regs.rx_data.get() & 0xFF) as u8;

        if self.regs.status.is_set(STATUS::RX_OVERFLOW) {
            return Err(Error::Overrun);
        }
        Ok(read)
    }

    pub fn disable(self) -> Spi<SPI, Disabled> {
        while self.is_busy() {}
        Spi::new(self.spi, self.regs)
    }
}

impl<SPI> spi::ErrorType for Spi<SPI, Enabled> {
    type Error = Error;
}

impl<SPI> spi::SpiBus<u8> for Spi<SPI, Enabled> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(0x00)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for word in words {
            self.transfer_byte(*word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let out = write.get(i).copied().unwrap_or(0x00);
            let received = self.transfer_byte(out)?;
            if let Some(slot) = read.get_mut(i) {
                *slot = received;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.is_busy() {}
        Ok(())
    }
}
