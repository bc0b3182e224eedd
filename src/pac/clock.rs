//! Clock control registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub ClockRegisters {
        /// Clock control
        (0x00 => pub ccr: ReadWrite<u32, CCR::Register>),
        /// Peripheral clock disable, a set bit gates the clock off
        (0x04 => pub pdis: ReadWrite<u32, PDIS::Register>),
        /// Fast peripheral clock divider
        (0x08 => pub fdiv: ReadWrite<u32, DIV::Register>),
        /// Timer clock divider
        (0x0C => pub tdiv: ReadWrite<u32, DIV::Register>),
        /// Oscillator status
        (0x10 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x14 => @END),
    }
}

register_bitfields![u32,
    pub CCR [
        /// Source of the 32 MHz system clock
        OSC_SEL OFFSET(0) NUMBITS(1) [
            InternalRc = 0,
            External32Mhz = 1
        ],
        /// Start calibration of the 32 kHz RC oscillator
        CAL32K OFFSET(1) NUMBITS(1) [],
        /// Start calibration of the 32 MHz RC oscillator
        CAL32M OFFSET(2) NUMBITS(1) [],
        /// Use the 32.768 kHz crystal for the RTC domain
        XTAL32K_EN OFFSET(3) NUMBITS(1) []
    ],
    pub PDIS [
        TIM0 OFFSET(0) NUMBITS(1) [],
        TIM1 OFFSET(1) NUMBITS(1) [],
        TIM2 OFFSET(2) NUMBITS(1) [],
        UART1 OFFSET(3) NUMBITS(1) [],
        SPI1 OFFSET(4) NUMBITS(1) [],
        I2C1 OFFSET(5) NUMBITS(1) [],
        UART2 OFFSET(6) NUMBITS(1) [],
        SPI2 OFFSET(7) NUMBITS(1) [],
        WDT OFFSET(8) NUMBITS(1) [],
        PWM OFFSET(9) NUMBITS(1) [],
        GPIO OFFSET(10) NUMBITS(1) [],
        I2C2 OFFSET(11) NUMBITS(1) [],
        RTC OFFSET(12) NUMBITS(1) [],
        TRNG OFFSET(13) NUMBITS(1) [],
        MACHW OFFSET(14) NUMBITS(1) [],
        ADC OFFSET(15) NUMBITS(1) [],
        AES OFFSET(16) NUMBITS(1) [],
        DMA OFFSET(17) NUMBITS(1) []
    ],
    pub DIV [
        /// The clock is divided by 2^DIV
        DIV OFFSET(0) NUMBITS(3) []
    ],
    pub STATUS [
        RC32M_READY OFFSET(0) NUMBITS(1) [],
        XTAL32M_READY OFFSET(1) NUMBITS(1) [],
        XTAL32K_READY OFFSET(2) NUMBITS(1) [],
        CAL_DONE OFFSET(3) NUMBITS(1) []
    ]
];
