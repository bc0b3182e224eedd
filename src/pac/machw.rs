//! IEEE 802.15.4 MAC hardware registers
//!
//! The MAC hardware runs one sequence at a time (RX, TX, ED, CCA). A sequence
//! is started by writing its command to `sequencer` and signals completion with
//! the `SEQ_DONE` interrupt; the outcome is then found in `seq_status`.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub MacRegisters {
        (0x000 => pub sequencer: ReadWrite<u32, SEQUENCER::Register>),
        (0x004 => pub seq_options: ReadWrite<u32, SEQ_OPTIONS::Register>),
        (0x008 => pub irq_mask: ReadWrite<u32, IRQ::Register>),
        (0x00C => pub irq_status: ReadOnly<u32, IRQ::Register>),
        (0x010 => pub irq_clear: WriteOnly<u32, IRQ::Register>),
        (0x014 => pub seq_status: ReadOnly<u32, SEQ_STATUS::Register>),
        (0x018 => pub channel: ReadWrite<u32, CHANNEL::Register>),
        /// PHY payload length including the FCS
        (0x01C => pub tx_length: ReadWrite<u32, LENGTH::Register>),
        /// PHY payload length of the last frame including the FCS
        (0x020 => pub rx_length: ReadOnly<u32, LENGTH::Register>),
        /// Attenuation of the last frame in dB below 0 dBm
        (0x024 => pub rssi: ReadOnly<u32, RSSI::Register>),
        /// Peak of the last energy detection in the same unit as `rssi`
        (0x028 => pub ed_value: ReadOnly<u32, RSSI::Register>),
        /// CCA reports busy when the attenuation is below this value
        (0x02C => pub cca_threshold: ReadWrite<u32, RSSI::Register>),
        (0x030 => pub pan_id: ReadWrite<u32>),
        (0x034 => pub short_address: ReadWrite<u32>),
        (0x038 => pub long_address_low: ReadWrite<u32>),
        (0x03C => pub long_address_high: ReadWrite<u32>),
        /// Time to wait for an ACK, in symbols
        (0x040 => pub ack_timeout: ReadWrite<u32>),
        (0x044 => pub tx_power: ReadWrite<u32, TX_POWER::Register>),
        (0x048 => pub flush: WriteOnly<u32, FLUSH::Register>),
        /// Length of an energy detection, in symbols
        (0x04C => pub ed_duration: ReadWrite<u32>),
        /// Noise sampled from the receive chain
        (0x050 => pub random: ReadOnly<u32>),
        /// Symbol counter value latched at the last SFD
        (0x054 => pub timestamp: ReadOnly<u32>),
        (0x058 => _reserved0),
        (0x100 => pub tx_fifo: [ReadWrite<u8>; 128]),
        (0x180 => pub rx_fifo: [ReadOnly<u8>; 128]),
        (0x200 => @END),
    }
}

register_bitfields![u32,
    pub SEQUENCER [
        CMD OFFSET(0) NUMBITS(4) [
            Nop = 0,
            Rx = 1,
            Tx = 2,
            Ed = 3,
            Cca = 4
        ]
    ],
    pub SEQ_OPTIONS [
        /// Wait for an ACK after the transmission
        ACK_REQ OFFSET(0) NUMBITS(1) [],
        /// Run a CCA before the transmission
        CCA_BEFORE_TX OFFSET(1) NUMBITS(1) [],
        /// Disable address filtering
        PROMISCUOUS OFFSET(2) NUMBITS(1) [],
        /// Frame pending bit of automatically sent ACKs
        ACK_PENDING OFFSET(3) NUMBITS(1) [],
        /// Acknowledge received frames that request it
        AUTO_ACK OFFSET(4) NUMBITS(1) []
    ],
    pub IRQ [
        SEQ_DONE OFFSET(0) NUMBITS(1) [],
        /// A start of frame delimiter was received
        RX_START OFFSET(1) NUMBITS(1) [],
        RX_OVERFLOW OFFSET(2) NUMBITS(1) []
    ],
    pub SEQ_STATUS [
        RESULT OFFSET(0) NUMBITS(3) [
            Success = 0,
            CcaFail = 1,
            NoAck = 2,
            CrcError = 3,
            Aborted = 4
        ],
        /// The ACK of the last transmission had its frame pending bit set
        ACK_FRAME_PENDING OFFSET(3) NUMBITS(1) [],
        BUSY OFFSET(4) NUMBITS(1) []
    ],
    pub CHANNEL [
        NUMBER OFFSET(0) NUMBITS(5) []
    ],
    pub LENGTH [
        LENGTH OFFSET(0) NUMBITS(7) []
    ],
    pub RSSI [
        VALUE OFFSET(0) NUMBITS(8) [],
        VALID OFFSET(8) NUMBITS(1) []
    ],
    pub TX_POWER [
        LEVEL OFFSET(0) NUMBITS(6) []
    ],
    pub FLUSH [
        RX OFFSET(0) NUMBITS(1) [],
        TX OFFSET(1) NUMBITS(1) []
    ]
];
