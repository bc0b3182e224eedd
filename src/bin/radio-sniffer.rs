#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::asm;
use cortex_m::interrupt::{free, Mutex};
use cortex_m::peripheral::NVIC;
use cortex_m_rt as rt;
use rt::entry;

use panic_rtt_target as _;

extern crate alloc;
use alloc::vec::Vec;
use alloc_cortex_m::CortexMHeap;

#[global_allocator]
static ALLOCATOR: CortexMHeap = CortexMHeap::empty();

use circular_queue::CircularQueue;
use rtt_target::{rprintln, rtt_init_print};

use ncs36510_hal::clock::*;
use ncs36510_hal::pac::{self, interrupt, Interrupt};
use ncs36510_hal::radio::*;

/// Frames kept while the main loop is printing.
const QUEUE_LEN: usize = 16;

struct Frame {
    data: Vec<u8>,
    link: LinkQuality,
}

struct Sniffer {
    frames: CircularQueue<Frame>,
    dropped: u32,
}

impl PhyClient for Sniffer {
    fn tx_done(&mut self, _status: TxStatus) {}

    fn rx_done(&mut self, frame: &[u8], link: LinkQuality) {
        if self.frames.is_full() {
            self.dropped += 1;
        }
        self.frames.push(Frame {
            data: frame.to_vec(),
            link,
        });
    }

    fn ed_done(&mut self, channel: Channel, energy: u8) {
        rprintln!("channel {}: energy {}", channel.number(), energy);
    }
}

static RADIO: Mutex<RefCell<Option<RfPhy>>> = Mutex::new(RefCell::new(None));
static SNIFFER: Mutex<RefCell<Option<Sniffer>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    rtt_init_print!();

    // Setup the allocator
    let start = cortex_m_rt::heap_start() as usize;
    let size = 4096;
    unsafe { ALLOCATOR.init(start, size) };

    match inner_main() {
        Ok(()) => cortex_m::peripheral::SCB::sys_reset(),
        Err(e) => panic!("{}", e),
    }
}

fn inner_main() -> Result<(), &'static str> {
    let periph = pac::Peripherals::take().ok_or("unable to get peripherals")?;

    // Setup the clock, the radio needs the 32 MHz crystal
    let mut clock = periph.CLOCK.constrain();
    clock.set_osc(Osc::External32Mhz);
    clock.enable_radio();
    let _clock = clock.freeze();

    let mut radio = RfPhy::new(periph.MACHW, RadioConfig::default());
    if let Some(addr) = radio.ieee_address() {
        radio.set_extended_address(addr);
        rprintln!("eui-64 {:02x?}", addr);
    }

    let channel = Channel::Channel11;
    radio
        .set_interface_state(InterfaceState::Sniffer(channel))
        .map_err(|_| "unable to start the receiver")?;
    rprintln!("sniffing on channel {} ({} MHz)", channel.number(), channel.frequency());

    free(|cs| {
        RADIO.borrow(cs).replace(Some(radio));
        SNIFFER.borrow(cs).replace(Some(Sniffer {
            frames: CircularQueue::with_capacity(QUEUE_LEN),
            dropped: 0,
        }));
    });

    unsafe { NVIC::unmask(Interrupt::MACHW) };

    let mut batch: Vec<Frame> = Vec::with_capacity(QUEUE_LEN);
    loop {
        free(|cs| {
            if let Some(sniffer) = SNIFFER.borrow(cs).borrow_mut().as_mut() {
                for frame in sniffer.frames.asc_iter() {
                    batch.push(Frame {
                        data: frame.data.clone(),
                        link: frame.link,
                    });
                }
                sniffer.frames.clear();
                if sniffer.dropped > 0 {
                    rprintln!("{} frames dropped", sniffer.dropped);
                    sniffer.dropped = 0;
                }
            }
        });

        for frame in batch.drain(..) {
            rprintln!(
                "[{} dBm, lqi {}] {:02x?}",
                frame.link.rssi,
                frame.link.lqi,
                frame.data
            );
        }

        asm::wfi();
    }
}

#[interrupt]
fn MACHW() {
    free(|cs| {
        let mut radio = RADIO.borrow(cs).borrow_mut();
        let mut sniffer = SNIFFER.borrow(cs).borrow_mut();
        if let (Some(radio), Some(sniffer)) = (radio.as_mut(), sniffer.as_mut()) {
            radio.handle_interrupt(sniffer);
        }
    });
}
