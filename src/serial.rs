//! Serial communication over the two 16550 compatible UARTs

use crate::pac::uart::{UartRegisters, FCR, IER, LCR, LSR, MCR};
use crate::pac::{StaticRef, UART1, UART2};

use core::convert::Infallible;
use core::fmt::Write;
use core::marker::PhantomData;

use embedded_hal_nb::serial;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::ClockConfig;
use crate::gpio::{Alternate, Dio};

pub trait TxPin<UART> {}
pub trait RxPin<UART> {}

impl TxPin<UART1> for Dio<9, Alternate<1>> {}
impl RxPin<UART1> for Dio<8, Alternate<1>> {}

impl TxPin<UART2> for Dio<4, Alternate<2>> {}
impl RxPin<UART2> for Dio<5, Alternate<2>> {}
impl TxPin<UART2> for Dio<14, Alternate<2>> {}
impl RxPin<UART2> for Dio<15, Alternate<2>> {}

pub enum Event {
    /// Received data available
    Rxne,
    /// Transmit holding register empty
    Txe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Framing,
    Overrun,
    Parity,
    Break,
}

impl serial::Error for Error {
    fn kind(&self) -> serial::ErrorKind {
        match self {
            Error::Framing => serial::ErrorKind::FrameFormat,
            Error::Overrun => serial::ErrorKind::Overrun,
            Error::Parity => serial::ErrorKind::Parity,
            Error::Break => serial::ErrorKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordLength {
    DataBits5,
    DataBits6,
    DataBits7,
    DataBits8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    ParityNone,
    ParityEven,
    ParityOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    Stop1,
    Stop2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Automatic RTS/CTS flow control
    pub flow_control: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            baud_rate: 9_600,
            word_length: WordLength::DataBits8,
            parity: Parity::ParityNone,
            stop_bits: StopBits::Stop1,
            flow_control: false,
        }
    }
}

impl Config {
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn word_length(mut self, word_length: WordLength) -> Self {
        self.word_length = word_length;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub fn flow_control(mut self, flow_control: bool) -> Self {
        self.flow_control = flow_control;
        self
    }
}

/// Divisor latch value for `baud_rate` with a 16x oversampling receiver.
pub const fn divisor(clk: u32, baud_rate: u32) -> u16 {
    let baud_rate = if baud_rate == 0 { 1 } else { baud_rate };
    let div = (clk as u64 + 8 * baud_rate as u64) / (16 * baud_rate as u64);
    if div == 0 {
        1
    } else if div > 0xFFFF {
        0xFFFF
    } else {
        div as u16
    }
}

fn configure(regs: &UartRegisters, config: &Config, clk: u32) {
    let div = divisor(clk, config.baud_rate);

    regs.ier.set(0);

    // Program the divisor latch.
    regs.lcr.write(LCR::DLAB::SET);
    regs.data.set((div & 0xFF) as u32);
    regs.ier.set((div >> 8) as u32);

    let word_length = match config.word_length {
        WordLength::DataBits5 => LCR::WLS::Bits5,
        WordLength::DataBits6 => LCR::WLS::Bits6,
        WordLength::DataBits7 => LCR::WLS::Bits7,
        WordLength::DataBits8 => LCR::WLS::Bits8,
    };
    let parity = match config.parity {
        Parity::ParityNone => LCR::PEN::CLEAR,
        Parity::ParityEven => LCR::PEN::SET + LCR::EPS::SET,
        Parity::ParityOdd => LCR::PEN::SET + LCR::EPS::CLEAR,
    };
    let stop_bits = match config.stop_bits {
        StopBits::Stop1 => LCR::STB::CLEAR,
        StopBits::Stop2 => LCR::STB::SET,
    };
    regs.lcr.write(word_length + parity + stop_bits + LCR::DLAB::CLEAR);

    // Enable and reset both FIFOs.
    regs.iir_fcr.write(
        FCR::FIFO_EN::SET + FCR::RX_RESET::SET + FCR::TX_RESET::SET + FCR::RX_TRIGGER::Bytes1,
    );

    if config.flow_control {
        regs.mcr.write(MCR::AFE::SET + MCR::RTS::SET);
    } else {
        regs.mcr.write(MCR::RTS::SET + MCR::DTR::SET);
    }
}

fn read_byte(regs: &UartRegisters) -> nb::Result<u8, Error> {
    // Reading the line status clears the error bits.
    let lsr = regs.lsr.extract();

    let error = if lsr.is_set(LSR::OE) {
        Some(Error::Overrun)
    } else if lsr.is_set(LSR::BI) {
        Some(Error::Break)
    } else if lsr.is_set(LSR::PE) {
        Some(Error::Parity)
    } else if lsr.is_set(LSR::FE) {
        Some(Error::Framing)
    } else {
        None
    };

    if let Some(error) = error {
        if lsr.is_set(LSR::DR) {
            // Drop the faulty character.
            let _ = regs.data.get();
        }
        return Err(nb::Error::Other(error));
    }

    if lsr.is_set(LSR::DR) {
        Ok(regs.data.get() as u8)
    } else {
        Err(nb::Error::WouldBlock)
    }
}

fn write_byte(regs: &UartRegisters, byte: u8) -> nb::Result<(), Error> {
    if regs.lsr.is_set(LSR::THRE) {
        regs.data.set(byte as u32);
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

fn flush(regs: &UartRegisters) -> nb::Result<(), Error> {
    if regs.lsr.is_set(LSR::TEMT) {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

pub struct Rx<UART> {
    regs: StaticRef<UartRegisters>,
    _uart: PhantomData<UART>,
}

pub struct Tx<UART> {
    regs: StaticRef<UartRegisters>,
    _uart: PhantomData<UART>,
}

pub struct Serial<UART, PINS> {
    uart: UART,
    regs: StaticRef<UartRegisters>,
    pins: PINS,
}

macro_rules! uart {
    ($(
        $UARTX:ident: ($uartX:ident),
    )+) => {
        $(
            impl<TX, RX> Serial<$UARTX, (TX, RX)> {
                /// Configures a UART peripheral to provide serial communication.
                pub fn $uartX(uart: $UARTX, pins: (TX, RX), config: Config, clocks: ClockConfig)
                    -> Self
                where
                    TX: TxPin<$UARTX>,
                    RX: RxPin<$UARTX>,
                {
                    let regs = $UARTX::regs();
                    configure(&regs, &config, clocks.periph_freq());

                    trace!(
                        "{}: {} baud, divisor {}",
                        stringify!($uartX),
                        config.baud_rate,
                        divisor(clocks.periph_freq(), config.baud_rate)
                    );

                    Self { uart, regs, pins }
                }

                /// Release the UART peripheral and associated pins.
                pub fn free(self) -> ($UARTX, (TX, RX)) {
                    self.regs.ier.set(0);
                    (self.uart, self.pins)
                }
            }
        )+
    };
}

uart! {
    UART1: (uart1),
    UART2: (uart2),
}

impl<UART, PINS> Serial<UART, PINS> {
    /// Start listening for an interrupt event.
    pub fn listen(&mut self, event: Event) {
        match event {
            Event::Rxne => self.regs.ier.modify(IER::RX_DATA::SET + IER::LINE_STATUS::SET),
            Event::Txe => self.regs.ier.modify(IER::TX_EMPTY::SET),
        }
    }

    /// Stop listening for an interrupt event.
    pub fn unlisten(&mut self, event: Event) {
        match event {
            Event::Rxne => self
                .regs
                .ier
                .modify(IER::RX_DATA::CLEAR + IER::LINE_STATUS::CLEAR),
            Event::Txe => self.regs.ier.modify(IER::TX_EMPTY::CLEAR),
        }
    }

    /// Loop transmitted data back into the receiver.
    pub fn set_loopback(&mut self, enable: bool) {
        if enable {
            self.regs.mcr.modify(MCR::LOOPBACK::SET);
        } else {
            self.regs.mcr.modify(MCR::LOOPBACK::CLEAR);
        }
    }

    /// Splits the `Serial` abstraction into a transmitter and a receiver half.
    pub fn split(self) -> (Tx<UART>, Rx<UART>) {
        (
            Tx {
                regs: self.regs,
                _uart: PhantomData,
            },
            Rx {
                regs: self.regs,
                _uart: PhantomData,
            },
        )
    }
}

impl<UART> Tx<UART> {
    /// Blocking write of a whole buffer.
    pub fn write_all(&mut self, buffer: &[u8]) -> Result<(), Infallible> {
        for b in buffer {
            // A full holding register is the only way writing can fail.
            let _ = nb::block!(write_byte(&self.regs, *b));
        }
        Ok(())
    }
}

impl<UART, PINS> serial::ErrorType for Serial<UART, PINS> {
    type Error = Error;
}

impl<UART, PINS> serial::Read<u8> for Serial<UART, PINS> {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        read_byte(&self.regs)
    }
}

impl<UART, PINS> serial::Write<u8> for Serial<UART, PINS> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        write_byte(&self.regs, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&self.regs)
    }
}

impl<UART> serial::ErrorType for Rx<UART> {
    type Error = Error;
}

impl<UART> serial::Read<u8> for Rx<UART> {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        read_byte(&self.regs)
    }
}

impl<UART> serial::ErrorType for Tx<UART> {
    type Error = Error;
}

impl<UART> serial::Write<u8> for Tx<UART> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        write_byte(&self.regs, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&self.regs)
    }
}

impl<UART> Write for Tx<UART> {
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        self.write_all(s.as_bytes())
            .map_err(|_| core::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};
    use embedded_hal_nb::serial::{Read, Write as _};

    const LSR: usize = 0x14;

    fn tx(regs: StaticRef<UartRegisters>) -> Tx<UART1> {
        Tx {
            regs,
            _uart: PhantomData,
        }
    }

    fn rx(regs: StaticRef<UartRegisters>) -> Rx<UART1> {
        Rx {
            regs,
            _uart: PhantomData,
        }
    }

    #[test]
    fn divisor_rounds_to_nearest() {
        assert_eq!(divisor(16_000_000, 9_600), 104);
        assert_eq!(divisor(16_000_000, 115_200), 9);
        assert_eq!(divisor(32_000_000, 115_200), 17);
        assert_eq!(divisor(1_000_000, 4_000_000), 1);
        assert_eq!(divisor(16_000_000, 0), 0xFFFF);
    }

    #[test]
    fn configure_line_control() {
        let regs = fake_regs::<UartRegisters>();
        let config = Config::default()
            .baud_rate(9_600)
            .word_length(WordLength::DataBits7)
            .parity(Parity::ParityEven)
            .stop_bits(StopBits::Stop2);

        configure(&regs, &config, 16_000_000);

        // DLAB cleared, even parity, two stop bits, 7 bits.
        assert_eq!(peek(regs, 0x0C), 0b0001_1110);
        // The divisor low byte stays in the shared data register.
        assert_eq!(peek(regs, 0x00), 104);
        assert_eq!(peek(regs, 0x08), 0b0000_0111);
        assert_eq!(peek(regs, 0x10) & (1 << 5), 0);
    }

    #[test]
    fn flow_control_enables_auto_rts_cts() {
        let regs = fake_regs::<UartRegisters>();
        configure(&regs, &Config::default().flow_control(true), 16_000_000);
        assert_eq!(peek(regs, 0x10), (1 << 5) | (1 << 1));
    }

    #[test]
    fn read_reports_data_and_errors() {
        let regs = fake_regs::<UartRegisters>();
        let mut rx = rx(regs);

        assert_eq!(rx.read(), Err(nb::Error::WouldBlock));

        poke(regs, 0x00, b'x' as u32);
        poke(regs, LSR, 1);
        assert_eq!(rx.read(), Ok(b'x'));

        poke(regs, LSR, 1 | (1 << 1));
        assert_eq!(rx.read(), Err(nb::Error::Other(Error::Overrun)));

        poke(regs, LSR, 1 | (1 << 3));
        assert_eq!(rx.read(), Err(nb::Error::Other(Error::Framing)));

        poke(regs, LSR, 1 << 4);
        assert_eq!(rx.read(), Err(nb::Error::Other(Error::Break)));
    }

    #[test]
    fn write_waits_for_holding_register() {
        let regs = fake_regs::<UartRegisters>();
        let mut tx = tx(regs);

        assert_eq!(tx.write(b'a'), Err(nb::Error::WouldBlock));
        assert_eq!(tx.flush(), Err(nb::Error::WouldBlock));

        poke(regs, LSR, (1 << 5) | (1 << 6));
        assert_eq!(tx.write(b'a'), Ok(()));
        assert_eq!(peek(regs, 0x00), b'a' as u32);
        assert_eq!(tx.flush(), Ok(()));

        write!(tx, "ok").unwrap();
        assert_eq!(peek(regs, 0x00), b'k' as u32);
    }

    #[test]
    fn error_kinds() {
        use embedded_hal_nb::serial::Error as _;

        assert_eq!(Error::Overrun.kind(), serial::ErrorKind::Overrun);
        assert_eq!(Error::Framing.kind(), serial::ErrorKind::FrameFormat);
        assert_eq!(Error::Parity.kind(), serial::ErrorKind::Parity);
    }
}
