//! Factory trim values in the flash information block

use tock_registers::registers::ReadOnly;
use tock_registers::register_structs;

register_structs! {
    pub TrimRegisters {
        (0x00 => pub rf_trim: ReadOnly<u32>),
        (0x04 => pub clock_trim_32m: ReadOnly<u32>),
        (0x08 => pub clock_trim_32k: ReadOnly<u32>),
        /// Lower four bytes of the EUI-64, least significant byte first
        (0x0C => pub mac_address_low: ReadOnly<u32>),
        /// Upper four bytes of the EUI-64
        (0x10 => pub mac_address_high: ReadOnly<u32>),
        (0x14 => pub tx_power_trim: ReadOnly<u32>),
        (0x18 => @END),
    }
}
