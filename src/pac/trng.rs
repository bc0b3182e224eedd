//! True random number generator registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub TrngRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub status: ReadOnly<u32, STATUS::Register>),
        /// Reading pops one 32-bit word
        (0x08 => pub data: ReadOnly<u32>),
        (0x0C => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        INT_EN OFFSET(1) NUMBITS(1) []
    ],
    pub STATUS [
        READY OFFSET(0) NUMBITS(1) [],
        /// The continuous health test failed
        ERROR OFFSET(1) NUMBITS(1) []
    ]
];
