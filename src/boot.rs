//! Secure boot measurement header
//!
//! A fixed-layout header placed in front of a firmware image. It records the
//! size of the image and its SHA-256 digest so the boot ROM, or a second stage
//! loader, can check the image before jumping to it.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "NCSB" (0x4E43_5342)
//!      4     2  header version
//!      6     2  header size
//!      8     4  image size
//!     12    32  SHA-256 of the image
//! ```
//!
//! All fields are little-endian. The image starts `header size` bytes after
//! the start of the header.

use sha2::{Digest, Sha256};

pub const MAGIC: u32 = 0x4E43_5342;
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 44;
pub const DIGEST_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    TooShort,
    BadMagic,
    UnsupportedVersion,
    /// The image length does not match the header.
    SizeMismatch,
    DigestMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementHeader {
    pub version: u16,
    pub header_size: u16,
    pub image_size: u32,
    pub digest: [u8; DIGEST_LEN],
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl MeasurementHeader {
    /// Build the header of `image`.
    pub fn measure(image: &[u8]) -> Result<Self, BootError> {
        let image_size = u32::try_from(image.len()).map_err(|_| BootError::SizeMismatch)?;
        Ok(Self {
            version: VERSION,
            header_size: HEADER_LEN as u16,
            image_size,
            digest: Sha256::digest(image).into(),
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, BootError> {
        if bytes.len() < HEADER_LEN {
            return Err(BootError::TooShort);
        }
        if u32_at(bytes, 0) != MAGIC {
            return Err(BootError::BadMagic);
        }

        let version = u16_at(bytes, 4);
        if version != VERSION {
            return Err(BootError::UnsupportedVersion);
        }

        let header_size = u16_at(bytes, 6);
        if (header_size as usize) < HEADER_LEN {
            return Err(BootError::TooShort);
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[12..12 + DIGEST_LEN]);

        Ok(Self {
            version,
            header_size,
            image_size: u32_at(bytes, 8),
            digest,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..8].copy_from_slice(&self.header_size.to_le_bytes());
        out[8..12].copy_from_slice(&self.image_size.to_le_bytes());
        out[12..].copy_from_slice(&self.digest);
        out
    }

    /// Check `image` against the recorded size and digest.
    pub fn verify(&self, image: &[u8]) -> Result<(), BootError> {
        if image.len() != self.image_size as usize {
            return Err(BootError::SizeMismatch);
        }

        let digest: [u8; DIGEST_LEN] = Sha256::digest(image).into();
        if digest != self.digest {
            trace!("boot: image digest mismatch");
            return Err(BootError::DigestMismatch);
        }
        Ok(())
    }
}

/// Parse the header at the start of `blob` and verify the image behind it.
///
/// Trailing bytes after the image (flash padding) are ignored.
pub fn verify_image(blob: &[u8]) -> Result<(MeasurementHeader, &[u8]), BootError> {
    let header = MeasurementHeader::parse(blob)?;
    let start = header.header_size as usize;
    let image = start
        .checked_add(header.image_size as usize)
        .and_then(|end| blob.get(start..end))
        .ok_or(BootError::SizeMismatch)?;

    header.verify(image)?;
    Ok((header, image))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    // SHA-256("abc")
    const ABC_DIGEST: [u8; 32] = [
        0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22,
        0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00,
        0x15, 0xad,
    ];

    #[test]
    fn measure_known_image() {
        let header = MeasurementHeader::measure(b"abc").unwrap();
        assert_eq!(header.image_size, 3);
        assert_eq!(header.digest, ABC_DIGEST);
        assert_eq!(header.header_size as usize, HEADER_LEN);
    }

    #[test]
    fn layout_is_little_endian() {
        let bytes = MeasurementHeader::measure(b"abc").unwrap().to_bytes();
        assert_eq!(&bytes[..4], b"BSCN");
        assert_eq!(&bytes[4..12], &[1, 0, 44, 0, 3, 0, 0, 0]);
        assert_eq!(&bytes[12..], &ABC_DIGEST);
        assert_eq!(
            MeasurementHeader::parse(&bytes),
            MeasurementHeader::measure(b"abc")
        );
    }

    #[test]
    fn parse_errors() {
        let good = MeasurementHeader::measure(b"abc").unwrap().to_bytes();

        assert_eq!(
            MeasurementHeader::parse(&good[..HEADER_LEN - 1]),
            Err(BootError::TooShort)
        );

        let mut bad = good;
        bad[0] ^= 1;
        assert_eq!(MeasurementHeader::parse(&bad), Err(BootError::BadMagic));

        let mut bad = good;
        bad[4] = 2;
        assert_eq!(
            MeasurementHeader::parse(&bad),
            Err(BootError::UnsupportedVersion)
        );

        let mut bad = good;
        bad[6] = 8;
        assert_eq!(MeasurementHeader::parse(&bad), Err(BootError::TooShort));
    }

    #[test]
    fn verify_detects_tampering() {
        let header = MeasurementHeader::measure(b"firmware").unwrap();
        assert_eq!(header.verify(b"firmware"), Ok(()));
        assert_eq!(header.verify(b"firmwar"), Err(BootError::SizeMismatch));
        assert_eq!(header.verify(b"Firmware"), Err(BootError::DigestMismatch));
    }

    #[test]
    fn verify_image_behind_header() {
        let image = b"application";
        let mut blob: Vec<u8> = MeasurementHeader::measure(image).unwrap().to_bytes().to_vec();
        blob.extend_from_slice(image);
        blob.extend_from_slice(&[0xFF; 5]);

        let (header, body) = verify_image(&blob).unwrap();
        assert_eq!(body, image);
        assert_eq!(header.image_size, 11);

        blob.truncate(HEADER_LEN + 4);
        assert_eq!(verify_image(&blob), Err(BootError::SizeMismatch));
    }
}
