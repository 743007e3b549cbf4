// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Property filter mask wire format.
//!
//! The peer sends the attribute mask as a byte sequence in big-endian byte
//! order: attribute bit `b` lives in byte `len - 1 - b / 8`, at bit position
//! `b % 8` within that byte.

use thiserror::Error;

/// Filter mask errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("malformed filter: {required} bytes needed, got {actual}")]
    MalformedFilter { required: usize, actual: usize },
}

/// Attribute bitmask received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMask {
    bytes: Vec<u8>,
}

impl FilterMask {
    /// Wraps the raw mask bytes as received.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        FilterMask {
            bytes: bytes.to_vec(),
        }
    }

    /// Builds a mask with exactly the given attribute bits set.
    ///
    /// The result is the 8-byte form peers normally send; bits past 63 are
    /// ignored.
    pub fn with_bits(bits: &[usize]) -> Self {
        let mut bytes = vec![0u8; 8];
        for &bit in bits {
            if let Some(index) = (bytes.len() - 1).checked_sub(bit / 8) {
                bytes[index] |= 1 << (bit % 8);
            }
        }
        FilterMask { bytes }
    }

    /// Returns a mask with every attribute bit set.
    pub fn all() -> Self {
        FilterMask {
            bytes: vec![0xFF; 8],
        }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads one attribute bit.
    ///
    /// Fails with `MalformedFilter` when the mask has no byte for `bit`.
    pub fn bit(&self, bit: usize) -> Result<bool, FilterError> {
        let offset = bit / 8;
        let byte = self
            .bytes
            .len()
            .checked_sub(1 + offset)
            .and_then(|index| self.bytes.get(index))
            .ok_or(FilterError::MalformedFilter {
                required: offset + 1,
                actual: self.bytes.len(),
            })?;
        Ok((byte >> (bit % 8)) & 0x01 == 1)
    }
}
