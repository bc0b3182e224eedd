//! AES-128 engine registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub AesRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub status: ReadOnly<u32, STATUS::Register>),
        /// Key words, word 0 holds bytes 0..4 of the key
        (0x08 => pub key: [WriteOnly<u32>; 4]),
        (0x18 => pub data_in: [WriteOnly<u32>; 4]),
        (0x28 => pub data_out: [ReadOnly<u32>; 4]),
        (0x38 => pub int_clear: WriteOnly<u32, STATUS::Register>),
        (0x3C => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        START OFFSET(0) NUMBITS(1) [],
        DECRYPT OFFSET(1) NUMBITS(1) [],
        /// Expand the key written to `key`
        KEY_LOAD OFFSET(2) NUMBITS(1) [],
        INT_EN OFFSET(3) NUMBITS(1) []
    ],
    pub STATUS [
        BUSY OFFSET(0) NUMBITS(1) [],
        DONE OFFSET(1) NUMBITS(1) [],
        KEY_LOADED OFFSET(2) NUMBITS(1) []
    ]
];
