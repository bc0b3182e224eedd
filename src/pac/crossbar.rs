//! Crossbar pin multiplexer registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub CrossbarRegisters {
        /// Function select, one word per digital IO
        (0x00 => pub dioctrl: [ReadWrite<u32, DIOCTRL::Register>; 18]),
        (0x48 => @END),
    }
}

register_bitfields![u32,
    pub DIOCTRL [
        /// 0 routes the pad to the GPIO block, 1..=7 to a peripheral
        FUNC OFFSET(0) NUMBITS(3) [
            Gpio = 0
        ]
    ]
];
