//! AES-128 engine
//!
//! The engine encrypts or decrypts one 16-byte block at a time with a key held
//! in the engine. Block chaining is done in software on top of it.

use tock_registers::interfaces::{Readable, Writeable};

use crate::pac::aes::{AesRegisters, CONTROL, STATUS};
use crate::pac::{StaticRef, AES};

pub const BLOCK_SIZE: usize = 16;

pub type Block = [u8; BLOCK_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesError {
    /// A block operation is still running.
    AesBusy,
    /// No key has been loaded.
    NoKey,
}

/// Increment a big endian counter block by one, wrapping around.
pub fn increment_counter(counter: &mut Block) {
    for byte in counter.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}

pub struct Aes {
    regs: StaticRef<AesRegisters>,
    key_loaded: bool,
}

impl Aes {
    pub fn new(_aes: AES) -> Self {
        Self::with_registers(AES::regs())
    }

    pub(crate) fn with_registers(regs: StaticRef<AesRegisters>) -> Self {
        Self {
            regs,
            key_loaded: false,
        }
    }

    /// Check if a block operation is in progress.
    pub fn is_aes_in_use(&self) -> bool {
        self.regs.status.is_set(STATUS::BUSY)
    }

    /// Load a 128-bit key into the engine.
    pub fn load_key(&mut self, key: &Block) -> Result<(), AesError> {
        if self.is_aes_in_use() {
            return Err(AesError::AesBusy);
        }

        for (reg, word) in self.regs.key.iter().zip(key.chunks_exact(4)) {
            reg.set(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }
        self.regs.control.write(CONTROL::KEY_LOAD::SET);
        while !self.regs.status.is_set(STATUS::KEY_LOADED) {}

        self.key_loaded = true;
        Ok(())
    }

    fn process(&mut self, block: &mut Block, decrypt: bool) -> Result<(), AesError> {
        if !self.key_loaded {
            return Err(AesError::NoKey);
        }
        if self.is_aes_in_use() {
            return Err(AesError::AesBusy);
        }

        for (reg, word) in self.regs.data_in.iter().zip(block.chunks_exact(4)) {
            reg.set(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }

        let direction = if decrypt {
            CONTROL::DECRYPT::SET
        } else {
            CONTROL::DECRYPT::CLEAR
        };
        self.regs.control.write(direction + CONTROL::START::SET);
        while !self.regs.status.is_set(STATUS::DONE) {}

        for (reg, out) in self.regs.data_out.iter().zip(block.chunks_exact_mut(4)) {
            out.copy_from_slice(&reg.get().to_le_bytes());
        }
        self.regs.int_clear.write(STATUS::DONE::SET);
        Ok(())
    }

    /// Encrypt one block in place (ECB).
    pub fn encrypt_block(&mut self, block: &mut Block) -> Result<(), AesError> {
        self.process(block, false)
    }

    /// Decrypt one block in place (ECB).
    pub fn decrypt_block(&mut self, block: &mut Block) -> Result<(), AesError> {
        self.process(block, true)
    }

    /// Encrypt or decrypt `data` in place in counter mode.
    ///
    /// `counter` holds the initial counter block and is left at the next
    /// unused counter value, so a stream can be processed in pieces as long
    /// as every piece but the last is a multiple of the block size.
    pub fn ctr_crypt(&mut self, counter: &mut Block, data: &mut [u8]) -> Result<(), AesError> {
        for chunk in data.chunks_mut(BLOCK_SIZE) {
            let mut keystream = *counter;
            self.encrypt_block(&mut keystream)?;
            for (d, k) in chunk.iter_mut().zip(keystream.iter()) {
                *d ^= k;
            }
            increment_counter(counter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::test_utils::{fake_regs, peek, poke};

    const STATUS_DONE_KEY: u32 = 0b110;

    fn aes() -> (StaticRef<AesRegisters>, Aes) {
        let regs = fake_regs::<AesRegisters>();
        poke(regs, 0x04, STATUS_DONE_KEY);
        (regs, Aes::with_registers(regs))
    }

    #[test]
    fn counter_carries() {
        let mut counter = [0u8; 16];
        counter[15] = 0xFF;
        counter[14] = 0xFF;
        increment_counter(&mut counter);
        assert_eq!(counter[13..], [1, 0, 0]);

        let mut counter = [0xFF; 16];
        increment_counter(&mut counter);
        assert_eq!(counter, [0; 16]);
    }

    #[test]
    fn block_needs_a_key() {
        let (_, mut aes) = aes();
        let mut block = [0u8; 16];
        assert_eq!(aes.encrypt_block(&mut block), Err(AesError::NoKey));
    }

    #[test]
    fn key_and_data_are_little_endian_words() {
        let (regs, mut aes) = aes();
        let key: Block = core::array::from_fn(|i| i as u8);
        aes.load_key(&key).unwrap();
        assert_eq!(peek(regs, 0x08), 0x0302_0100);
        assert_eq!(peek(regs, 0x14), 0x0F0E_0D0C);

        poke(regs, 0x28, 0xDDCC_BBAA);
        let mut block = [0x11u8; 16];
        aes.decrypt_block(&mut block).unwrap();

        assert_eq!(peek(regs, 0x18), 0x1111_1111);
        assert_eq!(block[..4], [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(block[4..], [0; 12]);
        assert_eq!(peek(regs, 0x00), 0b11);
    }

    #[test]
    fn busy_engine_is_refused() {
        let (regs, mut aes) = aes();
        poke(regs, 0x04, 1);
        assert_eq!(aes.load_key(&[0; 16]), Err(AesError::AesBusy));
    }

    #[test]
    fn ctr_xors_keystream_and_advances() {
        let (regs, mut aes) = aes();
        aes.load_key(&[0; 16]).unwrap();
        for offset in [0x28, 0x2C, 0x30, 0x34] {
            poke(regs, offset, 0xFFFF_FFFF);
        }

        let mut counter = [0u8; 16];
        let mut data = [0x0Fu8; 20];
        aes.ctr_crypt(&mut counter, &mut data).unwrap();

        assert_eq!(data, [0xF0; 20]);
        assert_eq!(counter[15], 2);
        // The engine was last fed the second counter block.
        assert_eq!(peek(regs, 0x24), 0x0100_0000);
    }
}
