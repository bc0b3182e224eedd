//! This crate defines the HAL for the NCS36510.

#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]

use tock_registers::interfaces::Readable;

/// Log through RTT when the `rtt` feature is enabled.
macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "rtt")]
        rtt_target::rprintln!($($arg)*);
    }};
}

pub mod pac;

pub mod adc;
pub mod aes;
pub mod boot;
pub mod clock;
pub mod delay;
pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod pad;
pub mod power;
pub mod pwm;
pub mod radio;
pub mod rtc;
pub mod serial;
pub mod spi;
pub mod timers;
pub mod trng;
pub mod watchdog;

/// Get the IEEE EUI-64 address from the factory trim area.
///
/// The address is returned most significant byte first, the way it is written in
/// 802.15.4 frames read by humans. An unprogrammed trim area (all ones) yields
/// `None`.
pub fn get_ieee_address(_trim: &pac::TRIM) -> Option<[u8; 8]> {
    ieee_address_from_trim(pac::TRIM::regs())
}

pub(crate) fn ieee_address_from_trim(trim: pac::StaticRef<pac::trim::TrimRegisters>) -> Option<[u8; 8]> {
    let low = trim.mac_address_low.get();
    let high = trim.mac_address_high.get();

    if low == 0xFFFF_FFFF && high == 0xFFFF_FFFF {
        return None;
    }

    let mut addr = [0u8; 8];
    addr[..4].copy_from_slice(&high.to_be_bytes());
    addr[4..].copy_from_slice(&low.to_be_bytes());
    Some(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, poke};

    #[test]
    fn ieee_address_is_most_significant_byte_first() {
        let trim = fake_regs::<pac::trim::TrimRegisters>();
        poke(trim, 0x0C, 0x4455_6677);
        poke(trim, 0x10, 0x0011_2233);

        assert_eq!(
            ieee_address_from_trim(trim),
            Some([0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77])
        );
    }

    #[test]
    fn blank_trim_has_no_address() {
        let trim = fake_regs::<pac::trim::TrimRegisters>();
        poke(trim, 0x0C, 0xFFFF_FFFF);
        poke(trim, 0x10, 0xFFFF_FFFF);

        assert_eq!(ieee_address_from_trim(trim), None);
    }
}
