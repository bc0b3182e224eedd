#![no_main]
#![no_std]

use cortex_m_rt as rt;
use rt::entry;

use panic_rtt_target as _;

use rtt_target::{rprintln, rtt_init_print};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;

use ncs36510_hal::{clock::*, delay::Delay, gpio::GpioExt, pac, pad::PadExt};

#[entry]
fn main() -> ! {
    rtt_init_print!();

    match inner_main() {
        Ok(()) => cortex_m::peripheral::SCB::sys_reset(),
        Err(e) => panic!("{}", e),
    }
}

fn inner_main() -> Result<(), &'static str> {
    let core_periph = cortex_m::Peripherals::take().ok_or("unable to get core peripherals")?;
    let periph = pac::Peripherals::take().ok_or("unable to get peripherals")?;

    // Setup the clock
    let mut clock = periph.CLOCK.constrain();
    clock.set_periph_div(ClockDiv::Clock16Mhz);
    clock.enable_gpio();
    let clock = clock.freeze();

    let mut pads = periph.PAD.split();
    let mut crossbar = periph.CROSSBAR.split();
    let gpio = periph.GPIO.split();

    let mut led = gpio.dio6.into_push_pull_output(&mut pads, &mut crossbar);
    let mut delay = Delay::new(core_periph.SYST, clock.config());

    let mut count = 0u32;
    loop {
        led.toggle().map_err(|_| "unable to toggle the led")?;
        if led.is_set_high().unwrap_or(false) {
            count += 1;
            rprintln!("blink {}", count);
        }
        delay.delay_ms(500);
    }
}
