//! General purpose timer registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub TimerRegisters {
        (0x00 => pub load: ReadWrite<u32>),
        (0x04 => pub value: ReadOnly<u32>),
        (0x08 => pub control: ReadWrite<u32, CONTROL::Register>),
        /// Any write clears the interrupt
        (0x0C => pub clear: WriteOnly<u32>),
        (0x10 => pub int_status: ReadOnly<u32, INT::Register>),
        (0x14 => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        ONESHOT OFFSET(0) NUMBITS(1) [],
        PRESCALE OFFSET(2) NUMBITS(2) [
            Div1 = 0,
            Div16 = 1,
            Div256 = 2
        ],
        INT_EN OFFSET(5) NUMBITS(1) [],
        /// Reload from `load` on wrap, otherwise free-run from 0xFFFF
        PERIODIC OFFSET(6) NUMBITS(1) [],
        ENABLE OFFSET(7) NUMBITS(1) []
    ],
    pub INT [
        EXPIRED OFFSET(0) NUMBITS(1) []
    ]
];
