//! Radix conversion between integers, byte strings, and text alphabets.
//!
//! Mirrors the `pybitcointools`-style `encode`/`decode`/`changebase` trio that
//! the rest of the key/address machinery builds on, over the fixed set of
//! bases DigiID actually needs: binary, decimal, hex, base32, base58, and the
//! identity byte alphabet (base 256).

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::FormatError;

/// Bitcoin/DigiByte's base58 alphabet: no `0`, `O`, `I`, or `l`.
pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";
const BINARY_ALPHABET: &[u8; 2] = b"01";
const DECIMAL_ALPHABET: &[u8; 10] = b"0123456789";

/// One of the radixes this crate ever converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Binary,
    Decimal,
    Hex,
    Base32,
    Base58,
    /// The identity byte alphabet: digits are raw bytes `0..=255`.
    Base256,
}

impl Base {
    fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Decimal => 10,
            Base::Hex => 16,
            Base::Base32 => 32,
            Base::Base58 => 58,
            Base::Base256 => 256,
        }
    }

    fn alphabet(self) -> Option<&'static [u8]> {
        match self {
            Base::Binary => Some(BINARY_ALPHABET),
            Base::Decimal => Some(DECIMAL_ALPHABET),
            Base::Hex => Some(HEX_ALPHABET),
            Base::Base32 => Some(BASE32_ALPHABET),
            Base::Base58 => Some(BASE58_ALPHABET),
            Base::Base256 => None,
        }
    }

    /// The element used to left-pad a short encoding: `0`-byte for base 256,
    /// `'1'` for base58 (its own zero-digit), `'0'` for every other text base.
    fn pad_byte(self) -> u8 {
        match self {
            Base::Base256 => 0,
            Base::Base58 => b'1',
            _ => b'0',
        }
    }
}

/// The result of `encode`: text for every base except 256, which is raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl EncodedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EncodedValue::Text(s) => Some(s),
            EncodedValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EncodedValue::Bytes(b) => Some(b),
            EncodedValue::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            EncodedValue::Text(s) => Some(s),
            EncodedValue::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            EncodedValue::Bytes(b) => Some(b),
            EncodedValue::Text(_) => None,
        }
    }
}

/// Emits the digits of `value` in `base`, left-padded to `minlen` with the
/// base's padding element.
pub fn encode(value: &BigUint, base: Base, minlen: usize) -> EncodedValue {
    let radix = BigUint::from(base.radix());
    let mut digits: Vec<u8> = Vec::new();
    let mut v = value.clone();

    if v.is_zero() {
        digits.push(0);
    }
    while !v.is_zero() {
        let (q, r) = num_integer::Integer::div_rem(&v, &radix);
        // r < base.radix() <= 256, always representable in a u8 as a digit index.
        digits.push(r.to_u8().expect("remainder below radix fits in u8"));
        v = q;
    }
    digits.reverse();

    while digits.len() < minlen {
        digits.insert(0, 0);
    }

    match base {
        Base::Base256 => EncodedValue::Bytes(digits),
        _ => {
            let alphabet = base.alphabet().expect("text base always has an alphabet");
            let text: String = digits
                .iter()
                .map(|&d| alphabet[d as usize] as char)
                .collect();
            EncodedValue::Text(text)
        }
    }
}

/// Inverse of [`encode`]: recovers the integer a base-`base` value represents.
pub fn decode(input: &EncodedValue, base: Base) -> Result<BigUint, FormatError> {
    let radix = BigUint::from(base.radix());
    let mut acc = BigUint::zero();

    match (base, input) {
        (Base::Base256, EncodedValue::Bytes(bytes)) => {
            for &b in bytes {
                acc = acc * &radix + BigUint::from(b);
            }
        }
        (Base::Base256, EncodedValue::Text(_)) => return Err(FormatError::InvalidAlphabet),
        (_, EncodedValue::Text(text)) => {
            let alphabet = base.alphabet().expect("text base always has an alphabet");
            for ch in text.bytes() {
                let digit = alphabet
                    .iter()
                    .position(|&a| a == ch)
                    .ok_or(FormatError::InvalidAlphabet)?;
                acc = acc * &radix + BigUint::from(digit as u32);
            }
        }
        (_, EncodedValue::Bytes(_)) => return Err(FormatError::InvalidAlphabet),
    }

    Ok(acc)
}

/// Decodes `input` as `from`, then re-encodes it as `to`. When `from == to`
/// this only re-applies left-padding.
pub fn changebase(
    input: &EncodedValue,
    from: Base,
    to: Base,
    minlen: usize,
) -> Result<EncodedValue, FormatError> {
    let value = decode(input, from)?;
    Ok(encode(&value, to, minlen))
}
