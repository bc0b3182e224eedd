//! Real time clock registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RtcRegisters {
        /// Ticks of the 32.768 kHz clock within the current second
        (0x00 => pub sub_second_counter: ReadWrite<u32>),
        (0x04 => pub second_counter: ReadWrite<u32>),
        (0x08 => pub sub_second_alarm: ReadWrite<u32>),
        (0x0C => pub second_alarm: ReadWrite<u32>),
        (0x10 => pub control: ReadWrite<u32, CONTROL::Register>),
        /// A write to a register is in progress while its busy bit is set
        (0x14 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x18 => pub int_status: ReadOnly<u32, INT::Register>),
        (0x1C => pub int_clear: WriteOnly<u32, INT::Register>),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        SUB_SEC_COUNTER_EN OFFSET(0) NUMBITS(1) [],
        SEC_COUNTER_EN OFFSET(1) NUMBITS(1) [],
        SUB_SEC_ALARM_INT_EN OFFSET(2) NUMBITS(1) [],
        SEC_ALARM_INT_EN OFFSET(3) NUMBITS(1) []
    ],
    pub STATUS [
        BSY_CTRL OFFSET(0) NUMBITS(1) [],
        BSY_SEC OFFSET(1) NUMBITS(1) [],
        BSY_SUB_SEC OFFSET(2) NUMBITS(1) [],
        BSY_SEC_ALARM OFFSET(3) NUMBITS(1) [],
        BSY_SUB_SEC_ALARM OFFSET(4) NUMBITS(1) [],
        BSY_INT_CLR OFFSET(5) NUMBITS(1) []
    ],
    pub INT [
        SUB_SEC OFFSET(0) NUMBITS(1) [],
        SEC OFFSET(1) NUMBITS(1) []
    ]
];
