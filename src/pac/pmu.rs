//! Power management unit registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub PmuRegisters {
        (0x00 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x04 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x08 => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        /// Mode entered on the next `WFI` with `SLEEPDEEP` set
        MODE OFFSET(0) NUMBITS(2) [
            Run = 0,
            Sleep = 1,
            DeepSleep = 2,
            Coma = 3
        ],
        /// RAM banks kept powered in coma, one bit per 12K bank
        RETAIN OFFSET(2) NUMBITS(4) [],
        WAKE_GPIO OFFSET(6) NUMBITS(1) [],
        WAKE_RTC OFFSET(7) NUMBITS(1) []
    ],
    pub STATUS [
        WOKE_FROM_COMA OFFSET(0) NUMBITS(1) [],
        WDT_RESET OFFSET(1) NUMBITS(1) []
    ]
];
