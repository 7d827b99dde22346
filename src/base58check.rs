//! Base58Check: a version byte, a payload, and a 4-byte double-SHA256
//! checksum, all encoded over the Base58 alphabet with leading zero bytes
//! mapped to leading `'1'`s.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::basecodec::{self, Base, EncodedValue};
use crate::error::ChecksumError;
use crate::hash::dsha256;

/// A Base58Check version "byte", which per the source format may itself span
/// more than one byte (e.g. some altcoin P2SH versions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionByte(pub u32);

impl VersionByte {
    fn to_be_bytes_minimal(self) -> Vec<u8> {
        if self.0 == 0 {
            return vec![0];
        }
        let mut v = self.0;
        let mut bytes = Vec::new();
        while v > 0 {
            bytes.push((v % 256) as u8);
            v /= 256;
        }
        bytes.reverse();
        bytes
    }
}

impl From<u8> for VersionByte {
    fn from(b: u8) -> Self { VersionByte(b as u32) }
}

fn leading_zero_count(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| b == 0).count()
}

/// Encodes `payload` under `version` as a Base58Check string.
pub fn bin_to_b58check(payload: &[u8], version: VersionByte) -> String {
    let mut versioned = version.to_be_bytes_minimal();
    versioned.extend_from_slice(payload);

    let checksum = dsha256(&versioned);
    let zeros = leading_zero_count(&versioned);

    let mut full = versioned;
    full.extend_from_slice(&checksum[0..4]);

    let value = BigUint::from_bytes_be(&full);
    let body = if value.is_zero() {
        String::new()
    } else {
        basecodec::encode(&value, Base::Base58, 0)
            .into_text()
            .expect("base58 encode always returns text")
    };

    let mut out = String::with_capacity(zeros + body.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.push_str(&body);
    out
}

/// Decodes a Base58Check string, returning its version and payload (with the
/// version stripped), after verifying the trailing checksum.
pub fn b58check_to_bin(text: &str) -> Result<(VersionByte, Vec<u8>), ChecksumError> {
    let zeros = text.chars().take_while(|&c| c == '1').count();
    let body = &text[zeros..];

    let value = if body.is_empty() {
        BigUint::zero()
    } else {
        basecodec::decode(&EncodedValue::Text(body.to_string()), Base::Base58)
            .map_err(|_| ChecksumError)?
    };

    let mut decoded = value.to_bytes_be();
    let mut full = vec![0u8; zeros];
    full.append(&mut decoded);

    if full.len() < 4 {
        return Err(ChecksumError);
    }

    let split_at = full.len() - 4;
    let (head, tail) = full.split_at(split_at);

    let checksum = dsha256(head);
    if &checksum[0..4] != tail {
        log::debug!("base58check checksum mismatch decoding {} bytes", full.len());
        return Err(ChecksumError);
    }

    // Version is the single leading byte for every version this crate uses
    // (DigiByte mainnet P2PKH/P2SH and WIF are all single-byte versions); a
    // caller working with a multi-byte version must re-derive it from `head`.
    let version = VersionByte(head[0] as u32);
    Ok((version, head[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_restores_payload_and_version() {
        let payload = b"hello world, this is a test payload";
        let version = VersionByte(30); // DigiByte mainnet P2PKH = 0x1E
        let encoded = bin_to_b58check(payload, version);
        let (decoded_version, decoded_payload) = b58check_to_bin(&encoded).unwrap();
        assert_eq!(decoded_version, version);
        assert_eq!(decoded_payload, payload);
    }

    #[test]
    fn leading_zero_bytes_become_leading_ones() {
        let payload = [0u8, 0u8, 1u8, 2u8, 3u8];
        let encoded = bin_to_b58check(&payload, VersionByte(0));
        assert!(encoded.starts_with("111"));
    }

    #[test]
    fn tampered_checksum_is_rejected() {
        let payload = b"some payload";
        let mut encoded = bin_to_b58check(payload, VersionByte(30));
        // Flip the last character, which lives in the checksum tail.
        let last = encoded.pop().unwrap();
        let replacement = if last == 'a' { 'b' } else { 'a' };
        encoded.push(replacement);
        assert!(b58check_to_bin(&encoded).is_err());
    }
}
