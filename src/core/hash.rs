use image::imageops::{self, FilterType};
use image::DynamicImage;
use std::fmt;
use thiserror::Error;

/// Rows (and compared columns) sampled by [`encode`]; yields 64-bit fingerprints.
pub const DEFAULT_HASH_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Hash size must be at least 1, got {size}")]
    InvalidHashSize { size: u32 },
}

/// Fixed-length bit string produced by the gradient hash.
///
/// Bits are packed most-significant first, so the hex form keeps the
/// byte boundaries of the row-major bit order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bytes: Vec<u8>,
    len: usize,
}

impl Fingerprint {
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bytes = Vec::new();
        let mut len = 0;

        for bit in bits {
            if len % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                let last = bytes.len() - 1;
                bytes[last] |= 0x80 >> (len % 8);
            }
            len += 1;
        }

        Self { bytes, len }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the difference hash of `image`.
///
/// The image is reduced to luminance, resampled to `hash_size + 1` columns by
/// `hash_size` rows with an antialiasing tent filter, and each pixel is
/// compared with its right-hand neighbour: a bit is set when the left pixel
/// is strictly brighter.
pub fn encode(image: &DynamicImage, hash_size: u32) -> Result<Fingerprint, HashError> {
    if hash_size == 0 {
        return Err(HashError::InvalidHashSize { size: hash_size });
    }

    let gray = image.to_luma8();
    let small = imageops::resize(&gray, hash_size + 1, hash_size, FilterType::Triangle);
    let small = &small;

    let bits = (0..hash_size).flat_map(|row| {
        (0..hash_size).map(move |col| {
            let left = small.get_pixel(col, row)[0];
            let right = small.get_pixel(col + 1, row)[0];
            left > right
        })
    });

    Ok(Fingerprint::from_bits(bits))
}
