//! GPIO registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::register_structs;

register_structs! {
    pub GpioRegisters {
        /// Input level of every pin
        (0x00 => pub data_in: ReadOnly<u32>),
        /// Output latch
        (0x04 => pub data_out: ReadWrite<u32>),
        /// Direction, a set bit makes the pin an output
        (0x08 => pub dir: ReadWrite<u32>),
        /// Interrupt enable
        (0x0C => pub irq_enable: ReadWrite<u32>),
        /// Interrupt polarity, a set bit selects rising edge or high level
        (0x10 => pub irq_polarity: ReadWrite<u32>),
        /// Interrupt type, a set bit selects edge, a cleared bit level
        (0x14 => pub irq_edge: ReadWrite<u32>),
        /// Pending interrupts
        (0x18 => pub irq_status: ReadOnly<u32>),
        /// Write one to clear a pending edge interrupt
        (0x1C => pub irq_clear: WriteOnly<u32>),
        (0x20 => @END),
    }
}
