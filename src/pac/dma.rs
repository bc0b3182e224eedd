//! DMA engine registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub DmaRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub source: ReadWrite<u32>),
        (0x08 => pub destination: ReadWrite<u32>),
        /// Transfer size in bytes
        (0x0C => pub size: ReadWrite<u32>),
        (0x10 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x14 => pub int_enable: ReadWrite<u32, STATUS::Register>),
        (0x18 => pub int_clear: WriteOnly<u32, STATUS::Register>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(1) NUMBITS(2) [
            MemToMem = 0,
            MemToPeriph = 1,
            PeriphToMem = 2
        ],
        SRC_INC OFFSET(3) NUMBITS(1) [],
        DST_INC OFFSET(4) NUMBITS(1) [],
        WIDTH OFFSET(5) NUMBITS(2) [
            Byte = 0,
            HalfWord = 1,
            Word = 2
        ]
    ],
    pub STATUS [
        DONE OFFSET(0) NUMBITS(1) [],
        BUSY OFFSET(1) NUMBITS(1) [],
        ERROR OFFSET(2) NUMBITS(1) []
    ]
];
