//! Pad configuration and crossbar function select
//!
//! Every digital IO has one pad word (pull, drive strength, output type) and one
//! crossbar word selecting whether the pad is driven by the GPIO block or by one
//! of up to seven peripheral functions.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac::crossbar::{CrossbarRegisters, DIOCTRL};
use crate::pac::pad::{PadRegisters, PADIO};
use crate::pac::{StaticRef, CROSSBAR, NUM_DIO, PAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pin number is not one of DIO0..DIO17.
    InvalidPin,
    /// The crossbar function is not in 0..=7.
    InvalidFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    None,
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drive {
    Low,
    #[default]
    Medium,
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    PushPull,
    OpenDrain,
}

/// Full configuration of one pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadConfig {
    pub pull: Pull,
    pub drive: Drive,
    pub output_type: OutputType,
}

pub trait PadExt {
    type Parts;

    fn split(self) -> Self::Parts;
}

impl PadExt for PAD {
    type Parts = Pads;

    fn split(self) -> Pads {
        Pads::new(PAD::regs())
    }
}

impl PadExt for CROSSBAR {
    type Parts = Crossbar;

    fn split(self) -> Crossbar {
        Crossbar::new(CROSSBAR::regs())
    }
}

fn check_pin(pin: u8) -> Result<usize, Error> {
    let pin = pin as usize;
    if pin < NUM_DIO {
        Ok(pin)
    } else {
        Err(Error::InvalidPin)
    }
}

/// Owner of the pad configuration block.
pub struct Pads {
    regs: StaticRef<PadRegisters>,
}

impl Pads {
    pub(crate) fn new(regs: StaticRef<PadRegisters>) -> Self {
        Self { regs }
    }

    pub fn configure(&mut self, pin: u8, config: PadConfig) -> Result<(), Error> {
        let pin = check_pin(pin)?;

        let pull = match config.pull {
            Pull::None => PADIO::PULL::None,
            Pull::Up => PADIO::PULL::PullUp,
            Pull::Down => PADIO::PULL::PullDown,
        };
        let drive = match config.drive {
            Drive::Low => PADIO::DRIVE::Low,
            Drive::Medium => PADIO::DRIVE::Medium,
            Drive::High => PADIO::DRIVE::High,
            Drive::Max => PADIO::DRIVE::Max,
        };
        let output_type = match config.output_type {
            OutputType::PushPull => PADIO::TYPE::PushPull,
            OutputType::OpenDrain => PADIO::TYPE::OpenDrain,
        };

        self.regs.padio[pin].write(pull + drive + output_type);
        Ok(())
    }

    pub fn set_pull(&mut self, pin: u8, pull: Pull) -> Result<(), Error> {
        let pin = check_pin(pin)?;
        let field = match pull {
            Pull::None => PADIO::PULL::None,
            Pull::Up => PADIO::PULL::PullUp,
            Pull::Down => PADIO::PULL::PullDown,
        };
        self.regs.padio[pin].modify(field);
        Ok(())
    }

    pub fn pull(&self, pin: u8) -> Result<Pull, Error> {
        let pin = check_pin(pin)?;
        Ok(match self.regs.padio[pin].read_as_enum(PADIO::PULL) {
            Some(PADIO::PULL::Value::PullUp) => Pull::Up,
            Some(PADIO::PULL::Value::PullDown) => Pull::Down,
            _ => Pull::None,
        })
    }

    pub fn set_drive(&mut self, pin: u8, drive: Drive) -> Result<(), Error> {
        let pin = check_pin(pin)?;
        self.regs.padio[pin].modify(PADIO::DRIVE.val(drive as u32));
        Ok(())
    }

    pub fn set_output_type(&mut self, pin: u8, output_type: OutputType) -> Result<(), Error> {
        let pin = check_pin(pin)?;
        let field = match output_type {
            OutputType::PushPull => PADIO::TYPE::PushPull,
            OutputType::OpenDrain => PADIO::TYPE::OpenDrain,
        };
        self.regs.padio[pin].modify(field);
        Ok(())
    }

    /// Disconnect the digital input buffer so the pad can feed the ADC.
    pub fn set_analog(&mut self, pin: u8, analog: bool) -> Result<(), Error> {
        let pin = check_pin(pin)?;
        if analog {
            self.regs.padio[pin].modify(PADIO::ANALOG::SET + PADIO::PULL::None);
        } else {
            self.regs.padio[pin].modify(PADIO::ANALOG::CLEAR);
        }
        Ok(())
    }
}

/// Owner of the crossbar.
pub struct Crossbar {
    regs: StaticRef<CrossbarRegisters>,
}

impl Crossbar {
    pub(crate) fn new(regs: StaticRef<CrossbarRegisters>) -> Self {
        Self { regs }
    }

    /// Route `pin` to peripheral function `func`, 0 selects the GPIO block.
    pub fn select(&mut self, pin: u8, func: u8) -> Result<(), Error> {
        let pin = check_pin(pin)?;
        if func > 7 {
            return Err(Error::InvalidFunction);
        }
        self.regs.dioctrl[pin].write(DIOCTRL::FUNC.val(func as u32));
        Ok(())
    }

    pub fn function(&self, pin: u8) -> Result<u8, Error> {
        let pin = check_pin(pin)?;
        Ok(self.regs.dioctrl[pin].read(DIOCTRL::FUNC) as u8)
    }
}
