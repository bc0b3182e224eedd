//! Direct memory access (DMA) engine
//!
//! A single channel engine copying between RAM buffers or between RAM and a
//! peripheral data register.

use core::marker::PhantomData;
use core::sync::atomic::{compiler_fence, Ordering};

use tock_registers::interfaces::{Readable, Writeable};

use crate::pac::dma::{DmaRegisters, CONTROL, STATUS};
use crate::pac::{StaticRef, DMA};

/// Largest transfer in bytes.
pub const MAX_TRANSFER: usize = 0xFFFF;

pub struct Disabled;
pub struct Enabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Source and destination have different lengths.
    SizeMismatch,
    /// The transfer is longer than [`MAX_TRANSFER`].
    TooLarge,
    /// The engine reported a bus error.
    Transfer,
}

/// Extension trait to take the DMA engine
pub trait DmaExt {
    type Part;

    fn constrain(self) -> Self::Part;
}

impl DmaExt for DMA {
    type Part = Dma<Disabled>;

    fn constrain(self) -> Self::Part {
        Dma::new(DMA::regs())
    }
}

pub struct Dma<STATE> {
    regs: StaticRef<DmaRegisters>,
    _state: PhantomData<STATE>,
}

impl<STATE> Dma<STATE> {
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.regs.status.is_set(STATUS::BUSY)
    }
}

impl Dma<Disabled> {
    pub(crate) fn new(regs: StaticRef<DmaRegisters>) -> Self {
        regs.control.write(CONTROL::ENABLE::CLEAR);
        Dma {
            regs,
            _state: PhantomData,
        }
    }

    #[inline]
    pub fn enable(self) -> Dma<Enabled> {
        self.regs.int_enable.set(0);
        self.regs
            .int_clear
            .write(STATUS::DONE::SET + STATUS::ERROR::SET);
        Dma {
            regs: self.regs,
            _state: PhantomData,
        }
    }
}

impl Dma<Enabled> {
    fn run(&mut self, source: u32, destination: u32, len: usize, mode: CONTROL::MODE::Value) -> Result<(), Error> {
        if len > MAX_TRANSFER {
            return Err(Error::TooLarge);
        }
        if len == 0 {
            return Ok(());
        }

        let (src_inc, dst_inc) = match mode {
            CONTROL::MODE::Value::MemToMem => (CONTROL::SRC_INC::SET, CONTROL::DST_INC::SET),
            CONTROL::MODE::Value::MemToPeriph => (CONTROL::SRC_INC::SET, CONTROL::DST_INC::CLEAR),
            CONTROL::MODE::Value::PeriphToMem => (CONTROL::SRC_INC::CLEAR, CONTROL::DST_INC::SET),
        };

        self.regs.source.set(source);
        self.regs.destination.set(destination);
        self.regs.size.set(len as u32);

        // The buffers must be written out before the engine reads them.
        compiler_fence(Ordering::SeqCst);

        self.regs.control.write(
            CONTROL::MODE.val(mode as u32)
                + src_inc
                + dst_inc
                + CONTROL::WIDTH::Byte
                + CONTROL::ENABLE::SET,
        );

        let status = loop {
            let status = self.regs.status.extract();
            if status.is_set(STATUS::DONE) || status.is_set(STATUS::ERROR) {
                break status;
            }
        };

        compiler_fence(Ordering::SeqCst);

        self.regs
            .int_clear
            .write(STATUS::DONE::SET + STATUS::ERROR::SET);
        self.regs.control.write(CONTROL::ENABLE::CLEAR);

        if status.is_set(STATUS::ERROR) {
            trace!("dma: transfer of {} bytes failed", len);
            Err(Error::Transfer)
        } else {
            Ok(())
        }
    }

    /// Copy `src` into `dst`, blocking until the engine is done.
    pub fn transfer(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(), Error> {
        if src.len() != dst.len() {
            return Err(Error::SizeMismatch);
        }
        self.run(
            src.as_ptr() as u32,
            dst.as_mut_ptr() as u32,
            src.len(),
            CONTROL::MODE::Value::MemToMem,
        )
    }

    /// Write `src` to the peripheral data register at `address`.
    pub fn to_peripheral(&mut self, src: &[u8], address: u32) -> Result<(), Error> {
        self.run(
            src.as_ptr() as u32,
            address,
            src.len(),
            CONTROL::MODE::Value::MemToPeriph,
        )
    }

    /// Fill `dst` from the peripheral data register at `address`.
    pub fn from_peripheral(&mut self, address: u32, dst: &mut [u8]) -> Result<(), Error> {
        self.run(
            address,
            dst.as_mut_ptr() as u32,
            dst.len(),
            CONTROL::MODE::Value::PeriphToMem,
        )
    }

    pub fn disable(self) -> Dma<Disabled> {
        Dma::new(self.regs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    fn dma() -> (StaticRef<DmaRegisters>, Dma<Enabled>) {
        let regs = fake_regs::<DmaRegisters>();
        (regs, Dma::new(regs).enable())
    }

    #[test]
    fn size_checks() {
        let (_, mut dma) = dma();
        let src = [0u8; 4];
        let mut dst = [0u8; 3];
        assert_eq!(dma.transfer(&src, &mut dst), Err(Error::SizeMismatch));

        let mut empty: [u8; 0] = [];
        assert_eq!(dma.transfer(&[], &mut empty), Ok(()));
    }

    #[test]
    fn too_large() {
        let (_, mut dma) = dma();
        let src = [0u8; MAX_TRANSFER + 1];
        assert_eq!(dma.to_peripheral(&src, 0x4000_3000), Err(Error::TooLarge));
    }

    #[test]
    fn memory_to_peripheral_keeps_destination() {
        let (regs, mut dma) = dma();
        poke(regs, 0x10, 1);

        dma.to_peripheral(&[1, 2, 3], 0x4000_3000).unwrap();
        assert_eq!(peek(regs, 0x08), 0x4000_3000);
        assert_eq!(peek(regs, 0x0C), 3);
        assert_eq!(peek(regs, 0x18), 0b101);
        // The engine is switched off again once done.
        assert_eq!(peek(regs, 0x00), 0);
    }

    #[test]
    fn error_status_fails_the_transfer() {
        let (regs, mut dma) = dma();
        poke(regs, 0x10, 1 << 2);

        let mut dst = [0u8; 2];
        assert_eq!(dma.from_peripheral(0x4000_3000, &mut dst), Err(Error::Transfer));
        assert_eq!(peek(regs, 0x04), 0x4000_3000);
    }
}
