// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-day presence bitmap.
//!
//! One bit per minute of the day, 1440 bits packed into 180 bytes. Minute `m`
//! lives in byte `m / 8` at bit value `2^(7 - m % 8)`, i.e. the most
//! significant bit of each byte is the earliest minute. This packing is the
//! storage and export format and must not change.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of minutes in a day (one bit each).
pub const MINUTES_PER_DAY: usize = 1440;
/// Bitmap length in bytes.
pub const BITMAP_LEN: usize = MINUTES_PER_DAY / 8;

/// Errors from bitmap operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    #[error("Minute index {0} out of range (expected 0..1440)")]
    InvalidMinute(usize),

    #[error("Invalid bitmap length {0} (expected 180 bytes)")]
    InvalidLength(usize),

    #[error("Invalid bitmap encoding: {0}")]
    InvalidEncoding(String),
}

/// Fixed-size presence bitmap for one character on one day.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ActivityBitmap([u8; BITMAP_LEN]);

impl Default for ActivityBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivityBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityBitmap")
            .field("minutes", &self.pop_count())
            .finish()
    }
}

impl ActivityBitmap {
    /// All-zero bitmap.
    pub fn new() -> Self {
        Self([0; BITMAP_LEN])
    }

    /// Decode from raw bytes. Anything but exactly 180 bytes is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BitmapError> {
        let buf: [u8; BITMAP_LEN] = bytes
            .try_into()
            .map_err(|_| BitmapError::InvalidLength(bytes.len()))?;
        Ok(Self(buf))
    }

    /// Raw bytes, byte-exact with the stored form.
    pub fn as_bytes(&self) -> &[u8; BITMAP_LEN] {
        &self.0
    }

    /// Mark minute `minute` as active. Idempotent.
    pub fn set_minute(&mut self, minute: usize) -> Result<(), BitmapError> {
        let (byte, mask) = locate(minute)?;
        self.0[byte] |= mask;
        Ok(())
    }

    /// Whether minute `minute` is active.
    pub fn is_set(&self, minute: usize) -> Result<bool, BitmapError> {
        let (byte, mask) = locate(minute)?;
        Ok(self.0[byte] & mask != 0)
    }

    /// Number of active minutes.
    pub fn pop_count(&self) -> u32 {
        self.0.iter().map(|b| b.count_ones()).sum()
    }

    /// OR another day's observations into this one.
    pub fn merge(&mut self, other: &ActivityBitmap) {
        for (dst, src) in self.0.iter_mut().zip(other.0.iter()) {
            *dst |= src;
        }
    }

    /// Iterate all 1440 bits in chronological order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0
            .iter()
            .flat_map(|&byte| (0..8u32).rev().map(move |shift| (byte >> shift) & 1 == 1))
    }

    /// Render as 1440 ASCII `'0'`/`'1'` characters.
    pub fn to_bit_string(&self) -> String {
        self.bits().map(|bit| if bit { '1' } else { '0' }).collect()
    }

    /// Standard base64 of the raw bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode the base64 storage form.
    pub fn from_base64(encoded: &str) -> Result<Self, BitmapError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| BitmapError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Byte index and bit mask for a minute (MSB first).
fn locate(minute: usize) -> Result<(usize, u8), BitmapError> {
    if minute >= MINUTES_PER_DAY {
        return Err(BitmapError::InvalidMinute(minute));
    }
    Ok((minute / 8, 1 << (7 - minute % 8)))
}

impl Serialize for ActivityBitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for ActivityBitmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}
