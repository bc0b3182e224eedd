//! SPI registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub SpiRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub int_enable: ReadWrite<u32, STATUS::Register>),
        (0x08 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x0C => pub tx_data: WriteOnly<u32>),
        (0x10 => pub rx_data: ReadOnly<u32>),
        /// SCLK = PCLK / (2 * (FDIV + 1))
        (0x14 => pub fdiv: ReadWrite<u32, FDIV::Register>),
        /// Slave select output, a set bit asserts the line
        (0x18 => pub slave_select: ReadWrite<u32>),
        /// Slave select polarity, a set bit makes the line active high
        (0x1C => pub slave_select_polarity: ReadWrite<u32>),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        MASTER OFFSET(1) NUMBITS(1) [],
        CPOL OFFSET(2) NUMBITS(1) [],
        CPHA OFFSET(3) NUMBITS(1) [],
        /// Shift out the least significant bit first
        LSB_FIRST OFFSET(4) NUMBITS(1) [],
        WORD_WIDTH OFFSET(5) NUMBITS(2) [
            Bits8 = 0,
            Bits16 = 1,
            Bits32 = 2
        ],
        /// Drive slave select from `slave_select` instead of per word
        MANUAL_SS OFFSET(7) NUMBITS(1) []
    ],
    pub STATUS [
        TX_EMPTY OFFSET(0) NUMBITS(1) [],
        TX_FULL OFFSET(1) NUMBITS(1) [],
        RX_EMPTY OFFSET(2) NUMBITS(1) [],
        RX_FULL OFFSET(3) NUMBITS(1) [],
        BUSY OFFSET(4) NUMBITS(1) [],
        RX_OVERFLOW OFFSET(5) NUMBITS(1) [],
        TX_UNDERFLOW OFFSET(6) NUMBITS(1) []
    ],
    pub FDIV [
        DIV OFFSET(0) NUMBITS(8) []
    ]
];
