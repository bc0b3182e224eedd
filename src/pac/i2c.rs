//! I2C registers
//!
//! The controller executes commands pushed into a command FIFO. Read data is
//! collected in a separate read FIFO.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub I2cRegisters {
        /// SCL = PCLK / (4 * (DIV + 1))
        (0x00 => pub clock: ReadWrite<u32, CLOCK::Register>),
        /// Command FIFO
        (0x04 => pub cmd: WriteOnly<u32>),
        /// Read data FIFO
        (0x08 => pub rd_fifo: ReadOnly<u32>),
        (0x0C => pub status: ReadOnly<u32, STATUS::Register>),
        (0x10 => pub int_enable: ReadWrite<u32, STATUS::Register>),
        (0x14 => pub control: ReadWrite<u32, CONTROL::Register>),
        /// Write one to clear an error flag
        (0x18 => pub clear: WriteOnly<u32, STATUS::Register>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CLOCK [
        DIV OFFSET(0) NUMBITS(8) []
    ],
    pub STATUS [
        CMD_FIFO_EMPTY OFFSET(0) NUMBITS(1) [],
        CMD_FIFO_FULL OFFSET(1) NUMBITS(1) [],
        RD_DATA_READY OFFSET(2) NUMBITS(1) [],
        BUS_ERROR OFFSET(3) NUMBITS(1) [],
        /// A verify-ACK command found a NACK
        NACK OFFSET(4) NUMBITS(1) [],
        ARB_LOST OFFSET(5) NUMBITS(1) [],
        BUSY OFFSET(6) NUMBITS(1) [],
        RD_FIFO_FULL OFFSET(7) NUMBITS(1) []
    ],
    pub CONTROL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        /// Flush both FIFOs and return the bus state machine to idle
        RESET OFFSET(1) NUMBITS(1) []
    ]
];
