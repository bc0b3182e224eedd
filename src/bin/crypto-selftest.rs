#![no_main]
#![no_std]

use cortex_m::asm;
use cortex_m_rt as rt;
use rt::entry;

use panic_rtt_target as _;

use rtt_target::{rprintln, rtt_init_print};

use ncs36510_hal::{aes::*, boot::MeasurementHeader, clock::*, pac, trng::Trng};

// FIPS-197 appendix C.1
const KEY: Block = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];
const PLAINTEXT: Block = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];
const CIPHERTEXT: Block = [
    0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
];

#[entry]
fn main() -> ! {
    rtt_init_print!(BlockIfFull);

    match inner_main() {
        Ok(()) => rprintln!("all tests passed"),
        Err(e) => rprintln!("FAILED: {}", e),
    }

    loop {
        asm::bkpt();
    }
}

fn inner_main() -> Result<(), &'static str> {
    let periph = pac::Peripherals::take().ok_or("unable to get peripherals")?;

    // Setup the clock
    let mut clock = periph.CLOCK.constrain();
    clock.enable_aes();
    clock.enable_trng();
    let _clock = clock.freeze();

    let mut aes = Aes::new(periph.AES);
    aes.load_key(&KEY).map_err(|_| "unable to load the key")?;

    let mut block = PLAINTEXT;
    aes.encrypt_block(&mut block).map_err(|_| "encryption failed")?;
    if block != CIPHERTEXT {
        return Err("wrong ciphertext");
    }
    aes.decrypt_block(&mut block).map_err(|_| "decryption failed")?;
    if block != PLAINTEXT {
        return Err("wrong plaintext");
    }
    rprintln!("aes ecb ok");

    let mut trng = Trng::new(periph.TRNG);
    let mut counter = [0u8; BLOCK_SIZE];
    trng.fill_bytes(&mut counter)
        .map_err(|_| "trng health test failed")?;

    let mut message = *b"The quick brown fox jumps over the lazy dog";
    let mut start = counter;
    aes.ctr_crypt(&mut start, &mut message)
        .map_err(|_| "ctr encryption failed")?;
    let mut start = counter;
    aes.ctr_crypt(&mut start, &mut message)
        .map_err(|_| "ctr decryption failed")?;
    if &message != b"The quick brown fox jumps over the lazy dog" {
        return Err("ctr round trip failed");
    }
    rprintln!("aes ctr ok, counter {:02x?}", counter);

    let header = MeasurementHeader::measure(&message).map_err(|_| "unable to measure")?;
    header.verify(&message).map_err(|_| "measurement mismatch")?;
    rprintln!("sha-256 {:02x?}", header.digest);

    Ok(())
}
