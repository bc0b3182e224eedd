#![no_main]
#![no_std]

use core::fmt::Write;

use cortex_m_rt as rt;
use rt::entry;

use panic_rtt_target as _;

use rtt_target::{rprintln, rtt_init_print};

use embedded_hal_nb::serial::{Read, Write as _};

use ncs36510_hal::{
    clock::*,
    gpio::GpioExt,
    pac,
    pad::PadExt,
    serial::{self, Serial},
};

#[entry]
fn main() -> ! {
    rtt_init_print!();

    match inner_main() {
        Ok(()) => cortex_m::peripheral::SCB::sys_reset(),
        Err(e) => panic!("{}", e),
    }
}

fn inner_main() -> Result<(), &'static str> {
    let periph = pac::Peripherals::take().ok_or("unable to get peripherals")?;

    // Setup the clock
    let mut clock = periph.CLOCK.constrain();
    clock.enable_gpio();
    clock.enable_uart1();
    let clocks = clock.freeze().config();

    let mut pads = periph.PAD.split();
    let mut crossbar = periph.CROSSBAR.split();
    let gpio = periph.GPIO.split();

    let tx = gpio.dio9.into_alternate::<1>(&mut pads, &mut crossbar);
    let rx = gpio.dio8.into_alternate::<1>(&mut pads, &mut crossbar);

    let config = serial::Config::default().baud_rate(115_200);
    let serial = Serial::uart1(periph.UART1, (tx, rx), config, clocks);
    let (mut tx, mut rx) = serial.split();

    writeln!(tx, "ncs36510 uart echo").map_err(|_| "unable to write")?;

    loop {
        match nb::block!(rx.read()) {
            Ok(b) => {
                nb::block!(tx.write(b)).map_err(|_| "unable to echo")?;
                if b == b'\r' {
                    nb::block!(tx.write(b'\n')).map_err(|_| "unable to echo")?;
                }
            }
            Err(e) => rprintln!("uart error: {:?}", e),
        }
    }
}
