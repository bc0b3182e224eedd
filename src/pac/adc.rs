//! ADC registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub AdcRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x08 => pub data: ReadOnly<u32, DATA::Register>),
        (0x0C => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        START OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(1) NUMBITS(1) [
            Single = 0,
            Continuous = 1
        ],
        INPUT OFFSET(2) NUMBITS(3) [
            A0 = 0,
            A1 = 1,
            A2 = 2,
            A3 = 3,
            Temperature = 4,
            Battery = 5
        ],
        REFERENCE OFFSET(5) NUMBITS(1) [
            Internal = 0,
            External = 1
        ],
        SCALE OFFSET(6) NUMBITS(2) [
            Unity = 0,
            Half = 1,
            Third = 2,
            Quarter = 3
        ],
        ENABLE OFFSET(8) NUMBITS(1) []
    ],
    pub STATUS [
        /// End of conversion
        EOC OFFSET(0) NUMBITS(1) [],
        BUSY OFFSET(1) NUMBITS(1) []
    ],
    pub DATA [
        VALUE OFFSET(0) NUMBITS(10) []
    ]
];
