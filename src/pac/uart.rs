//! UART registers (16550 compatible, 32-bit spaced)

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub UartRegisters {
        /// Receive buffer / transmit holding / divisor latch LSB when `LCR.DLAB` is set
        (0x00 => pub data: ReadWrite<u32>),
        /// Interrupt enable / divisor latch MSB when `LCR.DLAB` is set
        (0x04 => pub ier: ReadWrite<u32, IER::Register>),
        /// Interrupt identification on read, FIFO control on write
        (0x08 => pub iir_fcr: ReadWrite<u32, FCR::Register>),
        /// Line control
        (0x0C => pub lcr: ReadWrite<u32, LCR::Register>),
        /// Modem control
        (0x10 => pub mcr: ReadWrite<u32, MCR::Register>),
        /// Line status
        (0x14 => pub lsr: ReadOnly<u32, LSR::Register>),
        /// Modem status
        (0x18 => pub msr: ReadOnly<u32>),
        /// Scratch
        (0x1C => pub scr: ReadWrite<u32>),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    pub IER [
        /// Received data available
        RX_DATA OFFSET(0) NUMBITS(1) [],
        /// Transmit holding register empty
        TX_EMPTY OFFSET(1) NUMBITS(1) [],
        /// Receiver line status
        LINE_STATUS OFFSET(2) NUMBITS(1) [],
        /// Modem status
        MODEM_STATUS OFFSET(3) NUMBITS(1) []
    ],
    pub FCR [
        FIFO_EN OFFSET(0) NUMBITS(1) [],
        RX_RESET OFFSET(1) NUMBITS(1) [],
        TX_RESET OFFSET(2) NUMBITS(1) [],
        RX_TRIGGER OFFSET(6) NUMBITS(2) [
            Bytes1 = 0,
            Bytes4 = 1,
            Bytes8 = 2,
            Bytes14 = 3
        ]
    ],
    pub LCR [
        /// Word length select
        WLS OFFSET(0) NUMBITS(2) [
            Bits5 = 0,
            Bits6 = 1,
            Bits7 = 2,
            Bits8 = 3
        ],
        /// Two stop bits when set
        STB OFFSET(2) NUMBITS(1) [],
        /// Parity enable
        PEN OFFSET(3) NUMBITS(1) [],
        /// Even parity select
        EPS OFFSET(4) NUMBITS(1) [],
        /// Stick parity
        SP OFFSET(5) NUMBITS(1) [],
        /// Break control
        BC OFFSET(6) NUMBITS(1) [],
        /// Divisor latch access
        DLAB OFFSET(7) NUMBITS(1) []
    ],
    pub MCR [
        DTR OFFSET(0) NUMBITS(1) [],
        RTS OFFSET(1) NUMBITS(1) [],
        LOOPBACK OFFSET(4) NUMBITS(1) [],
        /// Automatic RTS/CTS flow control
        AFE OFFSET(5) NUMBITS(1) []
    ],
    pub LSR [
        /// Data ready
        DR OFFSET(0) NUMBITS(1) [],
        /// Overrun error
        OE OFFSET(1) NUMBITS(1) [],
        /// Parity error
        PE OFFSET(2) NUMBITS(1) [],
        /// Framing error
        FE OFFSET(3) NUMBITS(1) [],
        /// Break interrupt
        BI OFFSET(4) NUMBITS(1) [],
        /// Transmit holding register empty
        THRE OFFSET(5) NUMBITS(1) [],
        /// Transmitter empty
        TEMT OFFSET(6) NUMBITS(1) [],
        /// Error in receive FIFO
        RXFE OFFSET(7) NUMBITS(1) []
    ]
];
