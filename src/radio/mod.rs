//! IEEE 802.15.4 radio
//!
//! The MAC hardware runs one sequence at a time: receive, transmit or energy
//! detection. The driver keeps track of which sequence is running and, when
//! the sequence-done interrupt fires, reports the outcome to a [`PhyClient`]
//! and puts the radio back in the state it was in before.
//!
//! Frames handed to and received from the driver do not contain the 2-byte
//! FCS, the hardware appends and checks it.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac::machw::{
    MacRegisters, CHANNEL, FLUSH, IRQ, LENGTH, RSSI, SEQUENCER, SEQ_OPTIONS, SEQ_STATUS, TX_POWER,
};
use crate::pac::trim::TrimRegisters;
use crate::pac::{StaticRef, MACHW, TRIM};

mod link;

pub use link::{
    dbm_to_ed, dbm_to_lqi, dbm_to_rssi, rssi_to_dbm, tx_power_dbm, tx_power_level, LinkQuality,
};

const CHECKSUM_LEN: usize = 2;
const MAX_PACKET_LEN: usize = 127;
pub const MAX_PAYLOAD_LEN: usize = MAX_PACKET_LEN - CHECKSUM_LEN;

/// Frame control field bit asking the receiver for an acknowledgement.
const FCF_ACK_REQUEST: u8 = 1 << 5;

/// `macAckWaitDuration` in symbols.
const ACK_WAIT_SYMBOLS: u32 = 54;

/// `aBaseSuperframeDuration` in symbols, used for a single ED measurement.
const ED_SYMBOLS: u32 = 960;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The frame is empty or does not fit a PHY payload.
    InvalidLength,
    /// A transmission or an energy detection is still running.
    Busy,
    /// A frame is coming in.
    ReceiveInProgress,
    InvalidChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Channel {
    Channel11 = 11,
    Channel12,
    Channel13,
    Channel14,
    Channel15,
    Channel16,
    Channel17,
    Channel18,
    Channel19,
    Channel20,
    Channel21,
    Channel22,
    Channel23,
    Channel24,
    Channel25,
    Channel26,
}

impl Channel {
    pub const fn number(&self) -> u8 {
        *self as u8
    }

    /// Centre frequency in MHz.
    pub const fn frequency(&self) -> u32 {
        2405 + 5 * (self.number() as u32 - 11)
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Channel::*;
        const CHANNELS: [Channel; 16] = [
            Channel11, Channel12, Channel13, Channel14, Channel15, Channel16, Channel17,
            Channel18, Channel19, Channel20, Channel21, Channel22, Channel23, Channel24,
            Channel25, Channel26,
        ];

        match value {
            11..=26 => Ok(CHANNELS[(value - 11) as usize]),
            _ => Err(Error::InvalidChannel),
        }
    }
}

/// The sequence the MAC hardware is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacState {
    TrxOff,
    RxOn,
    TxOn,
    EdScan,
}

/// Outcome of a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    /// Acknowledged with the frame pending bit set.
    SuccessFramePending,
    /// CCA failed, nothing was sent.
    ChannelBusy,
    NoAck,
}

/// Interface states requested by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    /// Re-initialise the radio from its configuration.
    Reset,
    Down,
    /// Normal operation on a channel.
    Up(Channel),
    /// Energy detection on a channel.
    RxEnergy(Channel),
    /// Receive every frame on a channel, unfiltered and unacknowledged.
    Sniffer(Channel),
}

/// Radio configuration
#[derive(Debug, Copy, Clone)]
pub struct RadioConfig {
    pub channel: Channel,
    pub pan_id: u16,
    pub short_address: u16,
    /// Most significant byte first
    pub extended_address: [u8; 8],
    pub tx_power: i8,
    /// CCA reports busy above this input power, in dBm.
    pub cca_threshold: i8,
    pub auto_ack: bool,
    pub promiscuous: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Channel26,
            pan_id: 0xFFFF,
            short_address: 0xFFFF,
            extended_address: [0; 8],
            tx_power: 0,
            cca_threshold: -75,
            auto_ack: true,
            promiscuous: false,
        }
    }
}

/// Receiver of the radio events.
pub trait PhyClient {
    fn tx_done(&mut self, status: TxStatus);

    /// `frame` is the PHY payload without the FCS.
    fn rx_done(&mut self, frame: &[u8], link: LinkQuality);

    fn ed_done(&mut self, channel: Channel, energy: u8);
}

pub struct RfPhy {
    regs: StaticRef<MacRegisters>,
    trim: StaticRef<TrimRegisters>,
    config: RadioConfig,
    state: MacState,
    /// State to return to once a TX or ED sequence is done.
    resume: MacState,
    ed_channel: Channel,
}

impl RfPhy {
    pub fn new(_machw: MACHW, config: RadioConfig) -> Self {
        Self::with_registers(MACHW::regs(), TRIM::regs(), config)
    }

    pub(crate) fn with_registers(
        regs: StaticRef<MacRegisters>,
        trim: StaticRef<TrimRegisters>,
        config: RadioConfig,
    ) -> Self {
        let mut phy = Self {
            regs,
            trim,
            config,
            state: MacState::TrxOff,
            resume: MacState::TrxOff,
            ed_channel: config.channel,
        };
        phy.init();
        phy
    }

    /// Program the hardware from the configuration and turn the transceiver off.
    pub fn init(&mut self) {
        self.abort();
        self.state = MacState::TrxOff;
        self.resume = MacState::TrxOff;
        self.regs.irq_mask.set(0);
        self.regs
            .irq_clear
            .write(IRQ::SEQ_DONE::SET + IRQ::RX_START::SET + IRQ::RX_OVERFLOW::SET);

        let config = self.config;
        self.set_channel(config.channel);
        self.set_pan_id(config.pan_id);
        self.set_short_address(config.short_address);
        self.set_extended_address(config.extended_address);
        self.set_cca_threshold(config.cca_threshold);
        self.set_tx_power(config.tx_power);

        self.regs.ack_timeout.set(ACK_WAIT_SYMBOLS);
        self.regs.ed_duration.set(ED_SYMBOLS);

        let auto_ack = if config.auto_ack {
            SEQ_OPTIONS::AUTO_ACK::SET
        } else {
            SEQ_OPTIONS::AUTO_ACK::CLEAR
        };
        let promiscuous = if config.promiscuous {
            SEQ_OPTIONS::PROMISCUOUS::SET
        } else {
            SEQ_OPTIONS::PROMISCUOUS::CLEAR
        };
        self.regs.seq_options.write(auto_ack + promiscuous);

        self.regs.irq_mask.write(IRQ::SEQ_DONE::SET + IRQ::RX_OVERFLOW::SET);
        trace!("radio: init on channel {}", config.channel.number());
    }

    /// Stop the running sequence and flush both FIFOs.
    fn abort(&mut self) {
        self.regs.sequencer.write(SEQUENCER::CMD::Nop);
        self.regs.flush.write(FLUSH::RX::SET + FLUSH::TX::SET);
    }

    pub fn state(&self) -> MacState {
        self.state
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn channel(&self) -> Channel {
        self.config.channel
    }

    /// Set the channel, a running receive sequence is restarted on it.
    ///
    /// A running TX or ED sequence stays on its channel, the new one is
    /// programmed when the sequence completes.
    pub fn set_channel(&mut self, channel: Channel) {
        self.config.channel = channel;
        if matches!(self.state, MacState::TxOn | MacState::EdScan) {
            return;
        }
        self.program_channel();

        if self.state == MacState::RxOn {
            self.regs.sequencer.write(SEQUENCER::CMD::Nop);
            self.regs.sequencer.write(SEQUENCER::CMD::Rx);
        }
    }

    fn program_channel(&self) {
        self.regs
            .channel
            .write(CHANNEL::NUMBER.val(self.config.channel.number() as u32));
    }

    /// Set the PAN ID to use by the radio
    pub fn set_pan_id(&mut self, id: u16) {
        self.config.pan_id = id;
        self.regs.pan_id.set(id as u32);
    }

    /// Return the PAN ID that is currently used
    pub fn pan_id(&self) -> u16 {
        self.regs.pan_id.get() as u16
    }

    pub fn set_short_address(&mut self, addr: u16) {
        self.config.short_address = addr;
        self.regs.short_address.set(addr as u32);
    }

    pub fn short_address(&self) -> u16 {
        self.regs.short_address.get() as u16
    }

    /// Set the extended address, most significant byte first.
    pub fn set_extended_address(&mut self, addr: [u8; 8]) {
        self.config.extended_address = addr;
        self.regs
            .long_address_high
            .set(u32::from_be_bytes([addr[0], addr[1], addr[2], addr[3]]));
        self.regs
            .long_address_low
            .set(u32::from_be_bytes([addr[4], addr[5], addr[6], addr[7]]));
    }

    pub fn extended_address(&self) -> [u8; 8] {
        let mut addr = [0u8; 8];
        addr[..4].copy_from_slice(&self.regs.long_address_high.get().to_be_bytes());
        addr[4..].copy_from_slice(&self.regs.long_address_low.get().to_be_bytes());
        addr
    }

    /// Factory programmed EUI-64, most significant byte first.
    pub fn ieee_address(&self) -> Option<[u8; 8]> {
        crate::ieee_address_from_trim(self.trim)
    }

    /// Set the TX power in dBm, clamped to the range of the PA.
    pub fn set_tx_power(&mut self, dbm: i8) {
        let level = tx_power_level(dbm);
        self.config.tx_power = tx_power_dbm(level);
        self.regs
            .tx_power
            .write(TX_POWER::LEVEL.val(level as u32));
    }

    /// Return the TX power in dBm
    pub fn tx_power(&self) -> i8 {
        tx_power_dbm(self.regs.tx_power.read(TX_POWER::LEVEL) as u8)
    }

    /// Set the CCA threshold in dBm
    pub fn set_cca_threshold(&mut self, dbm: i8) {
        self.config.cca_threshold = dbm;
        self.regs
            .cca_threshold
            .write(RSSI::VALUE.val(dbm_to_rssi(dbm) as u32));
    }

    /// Return the CCA threshold in dBm
    pub fn cca_threshold(&self) -> i8 {
        rssi_to_dbm(self.regs.cca_threshold.read(RSSI::VALUE) as u8)
    }

    /// Accept every frame regardless of its destination.
    pub fn set_promiscuous(&mut self, enable: bool) {
        self.config.promiscuous = enable;
        if enable {
            self.regs.seq_options.modify(SEQ_OPTIONS::PROMISCUOUS::SET);
        } else {
            self.regs.seq_options.modify(SEQ_OPTIONS::PROMISCUOUS::CLEAR);
        }
    }

    fn set_auto_ack(&mut self, enable: bool) {
        self.config.auto_ack = enable;
        if enable {
            self.regs.seq_options.modify(SEQ_OPTIONS::AUTO_ACK::SET);
        } else {
            self.regs.seq_options.modify(SEQ_OPTIONS::AUTO_ACK::CLEAR);
        }
    }

    /// Frame pending bit of the ACKs sent by the hardware.
    pub fn set_ack_pending(&mut self, pending: bool) {
        if pending {
            self.regs.seq_options.modify(SEQ_OPTIONS::ACK_PENDING::SET);
        } else {
            self.regs.seq_options.modify(SEQ_OPTIONS::ACK_PENDING::CLEAR);
        }
    }

    /// Check if the radio is currently receiving a frame
    pub fn receiving_frame(&self) -> bool {
        self.state == MacState::RxOn
            && (self.regs.seq_status.is_set(SEQ_STATUS::BUSY)
                || self.regs.irq_status.is_set(IRQ::RX_START))
    }

    /// Turn the receiver on.
    pub fn receive(&mut self) -> Result<(), Error> {
        match self.state {
            MacState::TxOn | MacState::EdScan => return Err(Error::Busy),
            MacState::RxOn => return Ok(()),
            MacState::TrxOff => {}
        }

        self.start_rx();
        Ok(())
    }

    fn start_rx(&mut self) {
        self.regs.irq_clear.write(IRQ::RX_START::SET);
        self.regs.sequencer.write(SEQUENCER::CMD::Rx);
        self.state = MacState::RxOn;
    }

    /// Send a frame, `frame` does not include the FCS.
    ///
    /// With `cca` set the hardware checks the channel first and reports
    /// [`TxStatus::ChannelBusy`] instead of sending.
    pub fn transmit(&mut self, frame: &[u8], cca: bool) -> Result<(), Error> {
        if frame.is_empty() || frame.len() > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidLength);
        }

        match self.state {
            MacState::TxOn | MacState::EdScan => return Err(Error::Busy),
            MacState::RxOn if self.receiving_frame() => return Err(Error::ReceiveInProgress),
            _ => {}
        }

        self.resume = self.state;
        self.regs.sequencer.write(SEQUENCER::CMD::Nop);
        self.regs.flush.write(FLUSH::TX::SET);

        for (slot, b) in self.regs.tx_fifo.iter().zip(frame) {
            slot.set(*b);
        }
        self.regs
            .tx_length
            .write(LENGTH::LENGTH.val((frame.len() + CHECKSUM_LEN) as u32));

        let ack = if frame[0] & FCF_ACK_REQUEST != 0 {
            SEQ_OPTIONS::ACK_REQ::SET
        } else {
            SEQ_OPTIONS::ACK_REQ::CLEAR
        };
        let cca = if cca {
            SEQ_OPTIONS::CCA_BEFORE_TX::SET
        } else {
            SEQ_OPTIONS::CCA_BEFORE_TX::CLEAR
        };
        self.regs.seq_options.modify(ack + cca);

        self.regs.sequencer.write(SEQUENCER::CMD::Tx);
        self.state = MacState::TxOn;
        Ok(())
    }

    /// Measure the energy on `channel`, the result is reported through
    /// [`PhyClient::ed_done`].
    pub fn energy_detect(&mut self, channel: Channel) -> Result<(), Error> {
        if matches!(self.state, MacState::TxOn | MacState::EdScan) {
            return Err(Error::Busy);
        }

        self.resume = self.state;
        self.ed_channel = channel;
        self.regs.sequencer.write(SEQUENCER::CMD::Nop);
        self.regs
            .channel
            .write(CHANNEL::NUMBER.val(channel.number() as u32));
        self.regs.sequencer.write(SEQUENCER::CMD::Ed);
        self.state = MacState::EdScan;
        Ok(())
    }

    /// Return the RSSI value in dBm
    ///
    /// # Important
    /// The receiver must be on.
    pub fn rssi(&self) -> i8 {
        // Wait for a valid RSSI reading
        while !self.regs.rssi.is_set(RSSI::VALID) {}
        rssi_to_dbm(self.regs.rssi.read(RSSI::VALUE) as u8)
    }

    /// Perform a clear channel assessment from the current RSSI.
    pub fn channel_clear(&self) -> bool {
        self.rssi() <= self.cca_threshold()
    }

    /// Abort whatever the radio is doing and turn it off.
    pub fn stop(&mut self) {
        self.abort();
        self.regs
            .irq_clear
            .write(IRQ::SEQ_DONE::SET + IRQ::RX_START::SET + IRQ::RX_OVERFLOW::SET);
        // An ED scan or a deferred channel change leaves another channel in
        // the register.
        self.program_channel();
        self.state = MacState::TrxOff;
        self.resume = MacState::TrxOff;
    }

    pub fn set_interface_state(&mut self, state: InterfaceState) -> Result<(), Error> {
        match state {
            InterfaceState::Reset => {
                self.init();
                Ok(())
            }
            InterfaceState::Down => {
                self.stop();
                Ok(())
            }
            InterfaceState::Up(channel) => {
                self.stop();
                self.set_promiscuous(false);
                self.set_auto_ack(true);
                self.set_channel(channel);
                self.receive()
            }
            InterfaceState::RxEnergy(channel) => {
                self.stop();
                self.energy_detect(channel)
            }
            InterfaceState::Sniffer(channel) => {
                self.stop();
                self.set_promiscuous(true);
                self.set_auto_ack(false);
                self.set_channel(channel);
                self.receive()
            }
        }
    }

    /// Fill `buf` with noise sampled from the receiver.
    ///
    /// The bytes are not conditioned, use them to seed a generator.
    pub fn read_random(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self
                .regs
                .random
                .get()
                .to_le_bytes()
                .iter()
                .fold(0, |acc, x| acc ^ x);
        }
    }

    /// Symbol counter value latched at the start of the last frame.
    pub fn timestamp(&self) -> u32 {
        self.regs.timestamp.get()
    }

    /// Handle the MACHW interrupt.
    pub fn handle_interrupt<C: PhyClient>(&mut self, client: &mut C) {
        let irq = self.regs.irq_status.extract();
        self.regs
            .irq_clear
            .write(IRQ::SEQ_DONE::SET + IRQ::RX_OVERFLOW::SET);

        if irq.is_set(IRQ::RX_OVERFLOW) {
            trace!("radio: rx overflow");
            self.regs.flush.write(FLUSH::RX::SET);
        }

        if !irq.is_set(IRQ::SEQ_DONE) {
            return;
        }

        let status = self.regs.seq_status.extract();
        let result = status.read_as_enum(SEQ_STATUS::RESULT);

        match self.state {
            MacState::RxOn => {
                match result {
                    Some(SEQ_STATUS::RESULT::Value::Success) => self.deliver(client),
                    Some(SEQ_STATUS::RESULT::Value::CrcError) => {
                        // The hardware leaves corrupted frames in the FIFO.
                        self.regs.flush.write(FLUSH::RX::SET);
                    }
                    _ => {}
                }
                self.start_rx();
            }
            MacState::TxOn => {
                let tx_status = match result {
                    Some(SEQ_STATUS::RESULT::Value::Success) => {
                        if status.is_set(SEQ_STATUS::ACK_FRAME_PENDING) {
                            TxStatus::SuccessFramePending
                        } else {
                            TxStatus::Success
                        }
                    }
                    Some(SEQ_STATUS::RESULT::Value::CcaFail)
                    | Some(SEQ_STATUS::RESULT::Value::Aborted) => TxStatus::ChannelBusy,
                    _ => TxStatus::NoAck,
                };
                self.restore();
                client.tx_done(tx_status);
            }
            MacState::EdScan => {
                let code = self.regs.ed_value.read(RSSI::VALUE) as u8;
                let energy = dbm_to_ed(rssi_to_dbm(code));
                let channel = self.ed_channel;

                self.restore();
                client.ed_done(channel, energy);
            }
            MacState::TrxOff => {
                trace!("radio: spurious sequence done");
            }
        }
    }

    /// Go back to the state the radio was in before a TX or ED sequence.
    fn restore(&mut self) {
        self.program_channel();
        if self.resume == MacState::RxOn {
            self.start_rx();
        } else {
            self.state = MacState::TrxOff;
        }
        self.resume = MacState::TrxOff;
    }

    /// Pass the received frame to the client.
    fn deliver<C: PhyClient>(&mut self, client: &mut C) {
        let len = self.regs.rx_length.read(LENGTH::LENGTH) as usize;
        if len <= CHECKSUM_LEN || len > MAX_PACKET_LEN {
            trace!("radio: dropping frame of length {}", len);
            self.regs.flush.write(FLUSH::RX::SET);
            return;
        }

        let mut frame = [0u8; MAX_PAYLOAD_LEN];
        let len = len - CHECKSUM_LEN;
        for (b, slot) in frame[..len].iter_mut().zip(self.regs.rx_fifo.iter()) {
            *b = slot.get();
        }

        let link = LinkQuality::from_rssi_code(self.regs.rssi.read(RSSI::VALUE) as u8);
        client.rx_done(&frame[..len], link);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke, poke_u8};
    use std::vec::Vec;

    const SEQUENCER_OFFSET: usize = 0x000;
    const SEQ_OPTIONS_OFFSET: usize = 0x004;
    const IRQ_STATUS: usize = 0x00C;
    const SEQ_STATUS_OFFSET: usize = 0x014;
    const CHANNEL_OFFSET: usize = 0x018;
    const RX_LENGTH: usize = 0x020;
    const RSSI_OFFSET: usize = 0x024;
    const ED_VALUE: usize = 0x028;
    const FLUSH_OFFSET: usize = 0x048;
    const RX_FIFO: usize = 0x180;

    const IRQ_MASK: usize = 0x008;

    const SEQ_DONE: u32 = 1 << 0;
    const RX_START: u32 = 1 << 1;
    const RX_OVERFLOW: u32 = 1 << 2;

    #[derive(Default)]
    struct Recorder {
        tx: Vec<TxStatus>,
        rx: Vec<(Vec<u8>, LinkQuality)>,
        ed: Vec<(Channel, u8)>,
    }

    impl PhyClient for Recorder {
        fn tx_done(&mut self, status: TxStatus) {
            self.tx.push(status);
        }

        fn rx_done(&mut self, frame: &[u8], link: LinkQuality) {
            self.rx.push((frame.to_vec(), link));
        }

        fn ed_done(&mut self, channel: Channel, energy: u8) {
            self.ed.push((channel, energy));
        }
    }

    fn phy() -> (StaticRef<MacRegisters>, RfPhy) {
        let regs = fake_regs::<MacRegisters>();
        let trim = fake_regs::<TrimRegisters>();
        (regs, RfPhy::with_registers(regs, trim, RadioConfig::default()))
    }

    #[test]
    fn channels() {
        assert_eq!(Channel::try_from(11), Ok(Channel::Channel11));
        assert_eq!(Channel::try_from(26), Ok(Channel::Channel26));
        assert_eq!(Channel::try_from(10), Err(Error::InvalidChannel));
        assert_eq!(Channel::try_from(27), Err(Error::InvalidChannel));
        assert_eq!(Channel::Channel15.frequency(), 2425);
    }

    #[test]
    fn init_programs_the_configuration() {
        let regs = fake_regs::<MacRegisters>();
        let trim = fake_regs::<TrimRegisters>();
        let config = RadioConfig {
            channel: Channel::Channel15,
            pan_id: 0xABCD,
            short_address: 0x1234,
            extended_address: [1, 2, 3, 4, 5, 6, 7, 8],
            ..Default::default()
        };
        let phy = RfPhy::with_registers(regs, trim, config);

        assert_eq!(phy.state(), MacState::TrxOff);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 15);
        assert_eq!(phy.pan_id(), 0xABCD);
        assert_eq!(phy.short_address(), 0x1234);
        assert_eq!(peek(regs, 0x03C), 0x0102_0304);
        assert_eq!(phy.extended_address(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(phy.cca_threshold(), -75);
        assert_eq!(phy.tx_power(), 0);
        assert_eq!(peek(regs, 0x040), ACK_WAIT_SYMBOLS);
        // Auto ACK on, filtering on.
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET), 1 << 4);
        assert_eq!(peek(regs, 0x008) & SEQ_DONE, SEQ_DONE);
        assert_eq!(peek(regs, FLUSH_OFFSET), 0b11);
    }

    #[test]
    fn transmit_loads_the_fifo() {
        let (regs, mut phy) = phy();
        let frame = [0x61, 0x88, 0x01, 0xCD, 0xAB];

        phy.transmit(&frame, true).unwrap();

        assert_eq!(phy.state(), MacState::TxOn);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 2);
        assert_eq!(peek(regs, 0x01C), 7);
        assert_eq!(peek(regs, 0x100) & 0xFF, 0x61);
        // ACK request from the frame control field, CCA before TX.
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET) & 0b11, 0b11);

        assert_eq!(phy.transmit(&frame, false), Err(Error::Busy));
    }

    #[test]
    fn transmit_checks_length() {
        let (regs, mut phy) = phy();
        assert_eq!(phy.transmit(&[], false), Err(Error::InvalidLength));
        assert_eq!(
            phy.transmit(&[0u8; MAX_PAYLOAD_LEN + 1], false),
            Err(Error::InvalidLength)
        );
        assert_eq!(phy.transmit(&[0u8; MAX_PAYLOAD_LEN], false), Ok(()));
        // No ACK request in the frame control field.
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET) & 0b11, 0);
    }

    #[test]
    fn transmit_refused_while_receiving() {
        let (regs, mut phy) = phy();
        phy.receive().unwrap();
        poke(regs, IRQ_STATUS, RX_START);

        assert_eq!(phy.transmit(&[0x41], false), Err(Error::ReceiveInProgress));
        assert_eq!(phy.state(), MacState::RxOn);
    }

    #[test]
    fn tx_done_returns_to_receive() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();
        phy.transmit(&[0x61, 0x88], false).unwrap();

        poke(regs, IRQ_STATUS, SEQ_DONE);
        poke(regs, SEQ_STATUS_OFFSET, 1 << 3);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.tx, [TxStatus::SuccessFramePending]);
        assert_eq!(phy.state(), MacState::RxOn);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 1);
    }

    #[test]
    fn tx_failures_from_off() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();

        phy.transmit(&[0x61], true).unwrap();
        poke(regs, IRQ_STATUS, SEQ_DONE);
        poke(regs, SEQ_STATUS_OFFSET, 1);
        phy.handle_interrupt(&mut client);
        assert_eq!(phy.state(), MacState::TrxOff);

        phy.transmit(&[0x61], false).unwrap();
        poke(regs, SEQ_STATUS_OFFSET, 2);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.tx, [TxStatus::ChannelBusy, TxStatus::NoAck]);
    }

    #[test]
    fn rx_strips_the_fcs() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();

        for (i, b) in [0x41u8, 0x88, 0x07, 0xAA, 0xBB].iter().enumerate() {
            poke_u8(regs, RX_FIFO + i, *b);
        }
        poke(regs, RX_LENGTH, 5);
        poke(regs, RSSI_OFFSET, (1 << 8) | 60);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        poke(regs, SEQ_STATUS_OFFSET, 0);
        phy.handle_interrupt(&mut client);

        assert_eq!(
            client.rx,
            [(
                std::vec![0x41, 0x88, 0x07],
                LinkQuality { rssi: -60, lqi: 127 }
            )]
        );
        assert_eq!(phy.state(), MacState::RxOn);
    }

    #[test]
    fn crc_error_flushes() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();
        poke(regs, FLUSH_OFFSET, 0);

        poke(regs, RX_LENGTH, 10);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        poke(regs, SEQ_STATUS_OFFSET, 3);
        phy.handle_interrupt(&mut client);

        assert!(client.rx.is_empty());
        assert_eq!(peek(regs, FLUSH_OFFSET), 1);
        assert_eq!(phy.state(), MacState::RxOn);
    }

    #[test]
    fn energy_detect_restores_the_channel() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();

        phy.energy_detect(Channel::Channel11).unwrap();
        assert_eq!(phy.state(), MacState::EdScan);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 11);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 3);

        poke(regs, ED_VALUE, 70);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.ed, [(Channel::Channel11, 127)]);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
        assert_eq!(phy.state(), MacState::TrxOff);
    }

    #[test]
    fn channel_change_waits_for_energy_detect() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();

        phy.energy_detect(Channel::Channel11).unwrap();
        phy.set_channel(Channel::Channel20);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 11);
        assert_eq!(phy.channel(), Channel::Channel20);

        poke(regs, ED_VALUE, 70);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.ed, [(Channel::Channel11, 127)]);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 20);
    }

    #[test]
    fn channel_change_waits_for_transmit() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();

        phy.transmit(&[0x41, 0x88], false).unwrap();
        phy.set_channel(Channel::Channel15);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 2);

        poke(regs, IRQ_STATUS, SEQ_DONE);
        poke(regs, SEQ_STATUS_OFFSET, 0);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.tx, [TxStatus::Success]);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 15);
    }

    #[test]
    fn channel_change_restarts_receive() {
        let (regs, mut phy) = phy();
        phy.receive().unwrap();
        poke(regs, SEQUENCER_OFFSET, 0);

        phy.set_channel(Channel::Channel18);

        assert_eq!(peek(regs, CHANNEL_OFFSET), 18);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 1);
        assert_eq!(phy.state(), MacState::RxOn);
    }

    #[test]
    fn energy_detect_resumes_receive() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();

        phy.energy_detect(Channel::Channel11).unwrap();
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 3);

        poke(regs, ED_VALUE, 100);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.ed, [(Channel::Channel11, 0)]);
        assert_eq!(phy.state(), MacState::RxOn);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 1);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
    }

    #[test]
    fn stop_during_energy_detect() {
        let (regs, mut phy) = phy();

        phy.energy_detect(Channel::Channel11).unwrap();
        phy.stop();

        assert_eq!(phy.state(), MacState::TrxOff);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 0);
    }

    #[test]
    fn rx_energy_runs_a_single_scan() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();

        phy.set_interface_state(InterfaceState::RxEnergy(Channel::Channel13))
            .unwrap();
        assert_eq!(phy.state(), MacState::EdScan);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 13);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 3);

        poke(regs, SEQUENCER_OFFSET, 0);
        poke(regs, ED_VALUE, 40);
        poke(regs, IRQ_STATUS, SEQ_DONE);
        phy.handle_interrupt(&mut client);

        assert_eq!(client.ed, [(Channel::Channel13, 255)]);
        assert_eq!(phy.state(), MacState::TrxOff);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 0);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
    }

    #[test]
    fn reset_runs_init_again() {
        let (regs, mut phy) = phy();
        phy.receive().unwrap();
        poke(regs, IRQ_MASK, 0);
        poke(regs, FLUSH_OFFSET, 0);
        poke(regs, CHANNEL_OFFSET, 0);

        phy.set_interface_state(InterfaceState::Reset).unwrap();

        assert_eq!(phy.state(), MacState::TrxOff);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 0);
        assert_eq!(peek(regs, FLUSH_OFFSET), 0b11);
        assert_eq!(peek(regs, IRQ_MASK), SEQ_DONE | RX_OVERFLOW);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 26);
    }

    #[test]
    fn runt_frames_are_dropped() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();

        for len in [0, 1, 2] {
            poke(regs, FLUSH_OFFSET, 0);
            poke(regs, RX_LENGTH, len);
            poke(regs, IRQ_STATUS, SEQ_DONE);
            poke(regs, SEQ_STATUS_OFFSET, 0);
            phy.handle_interrupt(&mut client);

            assert_eq!(peek(regs, FLUSH_OFFSET), 1);
            assert_eq!(phy.state(), MacState::RxOn);
        }
        assert!(client.rx.is_empty());
    }

    #[test]
    fn rx_overflow_flushes() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        phy.receive().unwrap();
        poke(regs, FLUSH_OFFSET, 0);

        poke(regs, IRQ_STATUS, RX_OVERFLOW);
        phy.handle_interrupt(&mut client);

        assert_eq!(peek(regs, FLUSH_OFFSET), 1);
        assert!(client.rx.is_empty());
        assert_eq!(phy.state(), MacState::RxOn);
    }

    #[test]
    fn spurious_interrupt_is_ignored() {
        let (regs, mut phy) = phy();
        let mut client = Recorder::default();
        poke(regs, IRQ_STATUS, SEQ_DONE);

        phy.handle_interrupt(&mut client);
        assert!(client.tx.is_empty() && client.rx.is_empty() && client.ed.is_empty());
        assert_eq!(phy.state(), MacState::TrxOff);
    }

    #[test]
    fn channel_clear_compares_with_threshold() {
        let (regs, phy) = phy();
        poke(regs, RSSI_OFFSET, (1 << 8) | 90);
        assert!(phy.channel_clear());
        poke(regs, RSSI_OFFSET, (1 << 8) | 50);
        assert!(!phy.channel_clear());
    }

    #[test]
    fn interface_states() {
        let (regs, mut phy) = phy();

        phy.set_interface_state(InterfaceState::Sniffer(Channel::Channel20))
            .unwrap();
        assert_eq!(phy.state(), MacState::RxOn);
        assert_eq!(peek(regs, CHANNEL_OFFSET), 20);
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET) & 0b1_0100, 0b0_0100);

        phy.set_interface_state(InterfaceState::Up(Channel::Channel12))
            .unwrap();
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET) & 0b1_0100, 0b1_0000);
        assert_eq!(phy.channel(), Channel::Channel12);

        phy.set_interface_state(InterfaceState::Down).unwrap();
        assert_eq!(phy.state(), MacState::TrxOff);
        assert_eq!(peek(regs, SEQUENCER_OFFSET), 0);
    }

    #[test]
    fn tx_power_and_ack_pending() {
        let (regs, mut phy) = phy();

        phy.set_tx_power(20);
        assert_eq!(phy.tx_power(), 8);
        assert_eq!(peek(regs, 0x044), 40);

        phy.set_ack_pending(true);
        assert_eq!(peek(regs, SEQ_OPTIONS_OFFSET) & (1 << 3), 1 << 3);
    }

    #[test]
    fn random_folds_the_noise_register() {
        let (regs, phy) = phy();
        poke(regs, 0x050, 0x0102_0408);

        let mut buf = [0u8; 4];
        phy.read_random(&mut buf);
        assert_eq!(buf, [0x0F; 4]);
    }
}
