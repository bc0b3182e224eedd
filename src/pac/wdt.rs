//! Watchdog registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub WdtRegisters {
        (0x000 => pub load: ReadWrite<u32>),
        (0x004 => pub value: ReadOnly<u32>),
        (0x008 => pub control: ReadWrite<u32, CONTROL::Register>),
        /// Any write reloads the counter and clears the interrupt
        (0x00C => pub kick: WriteOnly<u32>),
        (0x010 => pub raw_status: ReadOnly<u32>),
        (0x014 => pub status: ReadOnly<u32>),
        (0x018 => _reserved0),
        /// Writing the unlock key enables writes to the other registers
        (0xC00 => pub lock: ReadWrite<u32>),
        (0xC04 => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        INT_EN OFFSET(0) NUMBITS(1) [],
        RESET_EN OFFSET(1) NUMBITS(1) []
    ]
];
