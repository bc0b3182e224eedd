//! Pad configuration registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub PadRegisters {
        /// One configuration word per digital IO
        (0x00 => pub padio: [ReadWrite<u32, PADIO::Register>; 18]),
        (0x48 => @END),
    }
}

register_bitfields![u32,
    pub PADIO [
        /// Output drive strength
        DRIVE OFFSET(0) NUMBITS(2) [
            Low = 0,
            Medium = 1,
            High = 2,
            Max = 3
        ],
        /// Pull resistor
        PULL OFFSET(2) NUMBITS(2) [
            None = 0,
            PullUp = 1,
            PullDown = 2
        ],
        /// Output driver type
        TYPE OFFSET(4) NUMBITS(1) [
            PushPull = 0,
            OpenDrain = 1
        ],
        /// Disable the digital input buffer (analog use)
        ANALOG OFFSET(5) NUMBITS(1) []
    ]
];
