//! PWM registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub PwmRegisters {
        /// High time of the output in 1/256 of the period
        (0x00 => pub duty_cycle: ReadWrite<u32, DUTY::Register>),
        (0x04 => pub enable: WriteOnly<u32>),
        (0x08 => pub disable: WriteOnly<u32>),
        /// Divide the PWM clock by 4096
        (0x0C => pub prescale_enable: WriteOnly<u32>),
        (0x10 => pub prescale_disable: WriteOnly<u32>),
        (0x14 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    pub DUTY [
        VALUE OFFSET(0) NUMBITS(8) []
    ],
    pub STATUS [
        ENABLED OFFSET(0) NUMBITS(1) [],
        PRESCALED OFFSET(1) NUMBITS(1) []
    ]
];
