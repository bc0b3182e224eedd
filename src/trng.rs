//! True Random Number Generator

use tock_registers::interfaces::{ReadWriteable, Readable};

use crate::pac::trng::{TrngRegisters, CONTROL, STATUS};
use crate::pac::{StaticRef, TRNG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The continuous health test of the entropy source failed.
    HealthTest,
}

pub struct Trng {
    regs: StaticRef<TrngRegisters>,
}

impl Trng {
    /// Enable the random number generator.
    pub fn new(_trng: TRNG) -> Self {
        Self::with_registers(TRNG::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<TrngRegisters>) -> Self {
        regs.control.modify(CONTROL::ENABLE::SET);
        Self { regs }
    }

    /// Wait for and return the next 32 random bits.
    pub fn next_u32(&mut self) -> Result<u32, Error> {
        loop {
            let status = self.regs.status.extract();
            if status.is_set(STATUS::ERROR) {
                trace!("trng: health test failure");
                return Err(Error::HealthTest);
            }
            if status.is_set(STATUS::READY) {
                return Ok(self.regs.data.get());
            }
        }
    }

    /// Fill `buf` with random bytes.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        for chunk in buf.chunks_mut(4) {
            let word = self.next_u32()?.to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }
}

impl Drop for Trng {
    fn drop(&mut self) {
        // Disable the random number generator.
        self.regs.control.modify(CONTROL::ENABLE::CLEAR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    #[test]
    fn enabled_while_alive() {
        let regs = fake_regs::<TrngRegisters>();
        let trng = Trng::with_registers(regs);
        assert_eq!(peek(regs, 0x00), 1);
        drop(trng);
        assert_eq!(peek(regs, 0x00), 0);
    }

    #[test]
    fn fill_handles_partial_words() {
        let regs = fake_regs::<TrngRegisters>();
        let mut trng = Trng::with_registers(regs);
        poke(regs, 0x04, 1);
        poke(regs, 0x08, 0x4433_2211);

        let mut buf = [0u8; 6];
        trng.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x11, 0x22, 0x33, 0x44, 0x11, 0x22]);
    }

    #[test]
    fn health_failure_is_reported() {
        let regs = fake_regs::<TrngRegisters>();
        let mut trng = Trng::with_registers(regs);
        poke(regs, 0x04, 0b11);

        assert_eq!(trng.next_u32(), Err(Error::HealthTest));
    }
}
