//! I2C master on the command FIFO controllers
//!
//! The controller does not generate bus sequences by itself: every START,
//! byte, acknowledge check and STOP is a command pushed into a FIFO and
//! executed in order. Read bytes show up in a separate read FIFO.

use core::marker::PhantomData;

use embedded_hal::i2c::{self, NoAcknowledgeSource, Operation};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::ClockConfig;
use crate::gpio::{Alternate, Dio};
use crate::pac::i2c::{I2cRegisters, CLOCK, CONTROL, STATUS};
use crate::pac::{StaticRef, I2C1, I2C2};

pub trait SclPin<I2C> {}
pub trait SdaPin<I2C> {}

impl SclPin<I2C1> for Dio<3, Alternate<1>> {}
impl SdaPin<I2C1> for Dio<2, Alternate<1>> {}
impl SclPin<I2C2> for Dio<13, Alternate<1>> {}
impl SdaPin<I2C2> for Dio<12, Alternate<1>> {}

#[derive(Debug)]
pub struct Disabled;
#[derive(Debug)]
pub struct Enabled;

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
enum Command {
    /// Drive a 0 bit, used to acknowledge a read byte
    WriteBit0 = 0x10,
    /// Drive a 1 bit, used to not-acknowledge the last read byte
    WriteBit1 = 0x11,
    /// Shift out the next byte of the command FIFO
    WriteByte = 0x12,
    ReadByte = 0x13,
    Stop = 0x14,
    Start = 0x15,
    /// Sample the acknowledge bit, a NACK stops the controller
    VerifyAck = 0x16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Nack(NoAcknowledgeSource),
    Bus,
    ArbitrationLoss,
}

impl i2c::Error for Error {
    fn kind(&self) -> i2c::ErrorKind {
        match *self {
            Error::Nack(source) => i2c::ErrorKind::NoAcknowledge(source),
            Error::Bus => i2c::ErrorKind::Bus,
            Error::ArbitrationLoss => i2c::ErrorKind::ArbitrationLoss,
        }
    }
}

/// Clock divider giving the fastest SCL not above `speed`.
pub const fn clock_divider(periph_freq: u32, speed: u32) -> u8 {
    let div = 4 * if speed == 0 { 1 } else { speed as u64 };
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

/// I2C master extension trait.
pub trait I2cExt {
    type Parts;
    fn take(self) -> Self::Parts;
}

macro_rules! i2c {
    ($($I2CX:ident,)+) => {
        $(
            impl I2cExt for $I2CX {
                type Parts = I2cMaster<$I2CX, Disabled>;

                fn take(self) -> Self::Parts {
                    I2cMaster::new(self, $I2CX::regs())
                }
            }
        )+
    };
}

i2c!(I2C1, I2C2,);

#[derive(Debug)]
pub struct I2cMaster<I2C, STATE> {
    i2c: I2C,
    regs: StaticRef<I2cRegisters>,
    _state: PhantomData<STATE>,
}

impl<I2C> I2cMaster<I2C, Disabled> {
    pub(crate) fn new(i2c: I2C, regs: StaticRef<I2cRegisters>) -> Self {
        regs.control.modify(CONTROL::ENABLE::CLEAR);
        I2cMaster {
            i2c,
            regs,
            _state: PhantomData,
        }
    }

    /// Set the SCL frequency.
    pub fn set_bus_speed(self, speed: u32, clock_config: ClockConfig) -> Self {
        let div = clock_divider(clock_config.periph_freq(), speed);
        self.regs.clock.write(CLOCK::DIV.val(div as u32));
        self
    }

    /// Enable the I2C master module.
    pub fn enable(self) -> I2cMaster<I2C, Enabled> {
        self.regs
            .control
            .write(CONTROL::RESET::SET + CONTROL::ENABLE::CLEAR);
        self.regs.control.write(CONTROL::ENABLE::SET);

        I2cMaster {
            i2c: self.i2c,
            regs: self.regs,
            _state: PhantomData,
        }
    }

    /// Release the I2C peripheral.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C> I2cMaster<I2C, Enabled> {
    /// Disable the I2C master module.
    pub fn disable(self) -> I2cMaster<I2C, Disabled> {
        I2cMaster::new(self.i2c, self.regs)
    }

    pub fn is_busy(&self) -> bool {
        self.regs.status.is_set(STATUS::BUSY)
    }

    fn check_errors(&self, source: NoAcknowledgeSource) -> Result<(), Error> {
        let status = self.regs.status.extract();
        if status.is_set(STATUS::ARB_LOST) {
            Err(Error::ArbitrationLoss)
        } else if status.is_set(STATUS::BUS_ERROR) {
            Err(Error::Bus)
        } else if status.is_set(STATUS::NACK) {
            Err(Error::Nack(source))
        } else {
            Ok(())
        }
    }

    fn push(&mut self, word: u8, source: NoAcknowledgeSource) -> Result<(), Error> {
        while self.regs.status.is_set(STATUS::CMD_FIFO_FULL) {
            self.check_errors(source)?;
        }
        self.regs.cmd.set(word as u32);
        Ok(())
    }

    fn command(&mut self, command: Command, source: NoAcknowledgeSource) -> Result<(), Error> {
        self.push(command as u8, source)
    }

    /// Wait until every queued command has been executed.
    fn wait_idle(&mut self, source: NoAcknowledgeSource) -> Result<(), Error> {
        loop {
            self.check_errors(source)?;
            let status = self.regs.status.extract();
            if status.is_set(STATUS::CMD_FIFO_EMPTY) && !status.is_set(STATUS::BUSY) {
                return Ok(());
            }
        }
    }

    fn start(&mut self, address: u8, read: bool) -> Result<(), Error> {
        let source = NoAcknowledgeSource::Address;
        self.command(Command::Start, source)?;
        self.command(Command::WriteByte, source)?;
        self.push((address << 1) | read as u8, source)?;
        self.command(Command::VerifyAck, source)?;
        self.wait_idle(source)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let source = NoAcknowledgeSource::Data;
        for b in bytes {
            self.command(Command::WriteByte, source)?;
            self.push(*b, source)?;
            self.command(Command::VerifyAck, source)?;
        }
        self.wait_idle(source)
    }

    fn read_bytes(&mut self, buffer: &mut [u8], nack_last: bool) -> Result<(), Error> {
        let source = NoAcknowledgeSource::Unknown;
        let len = buffer.len();
        for (i, slot) in buffer.iter_mut().enumerate() {
            self.command(Command::ReadByte, source)?;
            if nack_last && i + 1 == len {
                self.command(Command::WriteBit1, source)?;
            } else {
                self.command(Command::WriteBit0, source)?;
            }

            while !self.regs.status.is_set(STATUS::RD_DATA_READY) {
                self.check_errors(source)?;
            }
            *slot = (self.regs.rd_fifo.get() & 0xFF) as u8;
        }
        Ok(())
    }

    /// Abort after an error: flush the FIFOs, clear the flags and release the bus.
    fn recover(&mut self) {
        self.regs
            .clear
            .write(STATUS::NACK::SET + STATUS::BUS_ERROR::SET + STATUS::ARB_LOST::SET);
        self.regs.control.modify(CONTROL::RESET::SET);
        self.regs.control.modify(CONTROL::RESET::CLEAR);
        self.regs.cmd.set(Command::Stop as u32);
    }

    fn run(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        let mut previous_read = None;

        for i in 0..operations.len() {
            let next_is_read = matches!(operations.get(i + 1), Some(Operation::Read(_)));

            match &mut operations[i] {
                Operation::Write(bytes) => {
                    if previous_read != Some(false) {
                        self.start(address, false)?;
                    }
                    self.write_bytes(bytes)?;
                    previous_read = Some(false);
                }
                Operation::Read(buffer) => {
                    if previous_read != Some(true) {
                        self.start(address, true)?;
                    }
                    self.read_bytes(buffer, !next_is_read)?;
                    previous_read = Some(true);
                }
            }
        }

        self.command(Command::Stop, NoAcknowledgeSource::Unknown)?;
        self.wait_idle(NoAcknowledgeSource::Unknown)
    }
}

impl<I2C> i2c::ErrorType for I2cMaster<I2C, Enabled> {
    type Error = Error;
}

impl<I2C> i2c::I2c for I2cMaster<I2C, Enabled> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.run(address, operations);
        if let Err(e) = result {
            trace!("i2c: transaction with {:#04x} failed: {:?}", address, e);
            self.recover();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};
    use embedded_hal::i2c::I2c;

    const STATUS_OFFSET: usize = 0x0C;
    const CMD_FIFO_EMPTY: u32 = 1 << 0;
    const RD_DATA_READY: u32 = 1 << 2;
    const NACK: u32 = 1 << 4;

    fn master() -> (StaticRef<I2cRegisters>, I2cMaster<(), Enabled>) {
        let regs = fake_regs::<I2cRegisters>();
        (regs, I2cMaster::new((), regs).enable())
    }

    #[test]
    fn bus_speed_divider() {
        assert_eq!(clock_divider(16_000_000, 100_000), 39);
        assert_eq!(clock_divider(16_000_000, 400_000), 9);
        assert_eq!(clock_divider(32_000_000, 1_000), 255);
    }

    #[test]
    fn enable_sets_control() {
        let (regs, _i2c) = master();
        assert_eq!(peek(regs, 0x14), 1);
    }

    #[test]
    fn write_ends_with_stop() {
        let (regs, mut i2c) = master();
        poke(regs, STATUS_OFFSET, CMD_FIFO_EMPTY);

        i2c.write(0x48, &[0x01, 0x60]).unwrap();
        assert_eq!(peek(regs, 0x04), Command::Stop as u32);
    }

    #[test]
    fn read_collects_the_read_fifo() {
        let (regs, mut i2c) = master();
        poke(regs, STATUS_OFFSET, CMD_FIFO_EMPTY | RD_DATA_READY);
        poke(regs, 0x08, 0x5A);

        let mut buf = [0u8; 2];
        i2c.write_read(0x48, &[0x00], &mut buf).unwrap();
        assert_eq!(buf, [0x5A, 0x5A]);
    }

    #[test]
    fn nack_on_address_recovers() {
        let (regs, mut i2c) = master();
        poke(regs, STATUS_OFFSET, CMD_FIFO_EMPTY | NACK);

        assert_eq!(
            i2c.write(0x10, &[1]),
            Err(Error::Nack(NoAcknowledgeSource::Address))
        );
        // The flags were cleared and a STOP queued.
        assert_eq!(peek(regs, 0x18) & NACK, NACK);
        assert_eq!(peek(regs, 0x04), Command::Stop as u32);
    }

    #[test]
    fn error_kinds() {
        use embedded_hal::i2c::Error as _;

        assert_eq!(Error::Bus.kind(), i2c::ErrorKind::Bus);
        assert_eq!(
            Error::Nack(NoAcknowledgeSource::Data).kind(),
            i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
    }
}
