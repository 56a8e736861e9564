//! Packed bit strings
//!
//! A [`BitString`] is a byte buffer plus an explicit bit length. Bit positions
//! are 1-based and run from the most significant bit of the first byte, so
//! comparing two bit strings bit by bit agrees with comparing their bytes
//! lexicographically. Bits past the length read as zero; unused bits of the
//! last byte are always kept cleared.
//!
//! A [`BitPattern`] is a byte pattern in which every `*` byte stands for
//! eight wildcard bits.
//!
//! ```rust
//! use rust_advanced_collections::bitstring::BitString;
//!
//! let a = BitString::from("ban");
//! let b = BitString::from("band");
//! assert!(b.has_prefix(&a));
//! // 'd' = 0x64 has its first set bit at position 2 of the fourth byte
//! assert_eq!(a.diff(&b), 26);
//! assert!(!a.bit(26));
//! assert!(b.bit(26));
//! ```

use std::fmt;

/// The byte that makes a pattern position match anything
pub const WILDCARD: u8 = b'*';

/// A sequence of bits with 1-based positions
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    /// The empty bit string
    pub fn new() -> Self {
        Self::default()
    }

    /// Every bit of `bytes`; the length is `8 * bytes.len()`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no bits
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes, with unused trailing bits cleared
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The bit at 1-based `pos`; `false` at position 0 and past the end
    pub fn bit(&self, pos: usize) -> bool {
        if pos == 0 || pos > self.len {
            return false;
        }
        let i = pos - 1;
        self.bytes[i / 8] & (0x80 >> (i % 8)) != 0
    }

    /// Position of the first bit where the two strings differ, or 0 when they
    /// are equal once the shorter one is padded with zeros
    pub fn diff(&self, other: &BitString) -> usize {
        let n = self.bytes.len().max(other.bytes.len());
        for i in 0..n {
            let a = self.bytes.get(i).copied().unwrap_or(0);
            let b = other.bytes.get(i).copied().unwrap_or(0);
            let x = a ^ b;
            if x != 0 {
                return i * 8 + x.leading_zeros() as usize + 1;
            }
        }
        0
    }

    /// Bits `start..=end` (1-based); empty when the bounds are invalid
    pub fn sub(&self, start: usize, end: usize) -> BitString {
        let mut out = BitString::new();
        if start == 0 || start > end || end > self.len {
            return out;
        }
        for pos in start..=end {
            out.push(self.bit(pos));
        }
        out
    }

    /// `self` followed by `other`
    pub fn concat(&self, other: &BitString) -> BitString {
        let mut out = self.clone();
        if self.len % 8 == 0 {
            out.bytes.extend_from_slice(&other.bytes);
            out.len += other.len;
        } else {
            for pos in 1..=other.len {
                out.push(other.bit(pos));
            }
        }
        out
    }

    /// True when the leading bits of `self` are exactly `prefix`
    pub fn has_prefix(&self, prefix: &BitString) -> bool {
        if prefix.len > self.len {
            return false;
        }
        let full = prefix.len / 8;
        if self.bytes[..full] != prefix.bytes[..full] {
            return false;
        }
        let rest = prefix.len % 8;
        if rest == 0 {
            return true;
        }
        let mask = 0xFFu8 << (8 - rest);
        self.bytes[full] & mask == prefix.bytes[full] & mask
    }

    /// Appends one bit
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let i = self.len;
            self.bytes[i / 8] |= 0x80 >> (i % 8);
        }
        self.len += 1;
    }
}

impl From<&[u8]> for BitString {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for BitString {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString(")?;
        for pos in 1..=self.len {
            f.write_str(if self.bit(pos) { "1" } else { "0" })?;
        }
        write!(f, ")")
    }
}

/// A pattern bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
    /// Matches either bit
    Any,
}

/// A byte pattern where each [`WILDCARD`] byte matches any byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPattern {
    bytes: Vec<u8>,
}

impl BitPattern {
    pub fn new(pattern: &[u8]) -> Self {
        Self {
            bytes: pattern.to_vec(),
        }
    }

    /// Number of bits (eight per pattern byte)
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The pattern bit at 1-based `pos`; `Zero` at position 0 and past the end
    pub fn bit(&self, pos: usize) -> Bit {
        if pos == 0 || pos > self.len() {
            return Bit::Zero;
        }
        let i = pos - 1;
        match self.bytes[i / 8] {
            WILDCARD => Bit::Any,
            b if b & (0x80 >> (i % 8)) != 0 => Bit::One,
            _ => Bit::Zero,
        }
    }

    /// True when `key` has the pattern's length and agrees on every literal byte
    pub fn matches(&self, key: &[u8]) -> bool {
        key.len() == self.bytes.len()
            && self
                .bytes
                .iter()
                .zip(key)
                .all(|(&p, &k)| p == WILDCARD || p == k)
    }
}

impl From<&str> for BitPattern {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}
