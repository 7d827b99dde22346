//! Public and private key encodings, WIF, and address derivation.
//!
//! Unlike `pybitcointools`-style implementations, formats here are not
//! threaded through every operation as sniffed strings: callers parse at the
//! edge into a [`PublicKeyFormat`]/[`PrivateKeyFormat`] tag, and every later
//! step matches on the closed enum.

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroize;

use crate::base58check::{self, VersionByte};
use crate::curve::{self, AffinePoint};
use crate::error::{FormatError, KeyRangeError};
use crate::field::pow_mod;
use crate::hash::hash160;

/// DigiByte mainnet P2PKH version byte.
pub const MAINNET_P2PKH: u8 = 0x1E;
/// DigiByte mainnet P2SH version byte (the `0x05` Bitcoin-historical value is
/// documented but not used as a default).
pub const MAINNET_P2SH: u8 = 0x3F;
/// Historical P2SH version byte, kept for reference; DigiByte moved to 0x3F.
pub const MAINNET_P2SH_HISTORICAL: u8 = 0x05;

/// The network-specific version bytes a caller selects explicitly: there is
/// no ambient "current network" state anywhere in this crate, so every
/// address-producing call site takes one of these by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub p2pkh_version: VersionByte,
    pub p2sh_version: VersionByte,
}

impl NetworkParams {
    /// DigiByte mainnet: P2PKH `0x1E`, P2SH `0x3F`.
    pub const fn mainnet() -> Self {
        NetworkParams {
            p2pkh_version: VersionByte(MAINNET_P2PKH as u32),
            p2sh_version: VersionByte(MAINNET_P2SH as u32),
        }
    }

    /// The WIF version byte for this network's P2PKH keys (`0x80 + p2pkh`).
    pub fn wif_version(&self) -> VersionByte {
        VersionByte(0x80 + self.p2pkh_version.0)
    }
}

/// The tagged source format of a decoded public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// `0x04 || x || y`, 65 bytes (or 130 hex chars).
    Uncompressed,
    /// `(0x02 | 0x03) || x`, 33 bytes (or 66 hex chars). `parity` is the
    /// lead byte's low bit.
    Compressed { parity: u8 },
    /// `x || y` with no lead byte, 64 bytes (or 128 hex chars).
    Electrum,
    /// `x` and `y` as a base-10 pair, textual only (no fixed byte form).
    Decimal,
}

/// A decoded public key: an affine point plus the format it was read from
/// (needed so re-encoding round-trips to the same family).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub point: AffinePoint,
    pub format: PublicKeyFormat,
}

impl PublicKey {
    pub fn from_point(point: AffinePoint, format: PublicKeyFormat) -> Self {
        PublicKey { point, format }
    }

    /// Serializes the raw bytes this key's format hashes to derive an address
    /// (33 bytes for compressed, 65 for uncompressed, 64 for electrum).
    pub fn serialize(&self) -> Vec<u8> {
        let x = be32(&self.point.x);
        let y = be32(&self.point.y);
        match self.format {
            PublicKeyFormat::Uncompressed => {
                let mut out = Vec::with_capacity(65);
                out.push(0x04);
                out.extend_from_slice(&x);
                out.extend_from_slice(&y);
                out
            }
            PublicKeyFormat::Compressed { .. } => {
                let parity = self.point.y.bit(0) as u8;
                let mut out = Vec::with_capacity(33);
                out.push(0x02 + parity);
                out.extend_from_slice(&x);
                out
            }
            // Decimal has no compression concept, so it hashes the same raw
            // x || y pair as electrum for address derivation.
            PublicKeyFormat::Electrum | PublicKeyFormat::Decimal => {
                let mut out = Vec::with_capacity(64);
                out.extend_from_slice(&x);
                out.extend_from_slice(&y);
                out
            }
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Builds a public key directly from a decimal `(x, y)` pair.
    pub fn from_decimal(x: BigUint, y: BigUint) -> Self {
        PublicKey::from_point(AffinePoint::new(x, y), PublicKeyFormat::Decimal)
    }

    /// Parses a public key from the `"x,y"` decimal-pair text form.
    pub fn from_decimal_str(s: &str) -> Result<Self, FormatError> {
        let (x_str, y_str) = s.split_once(',').ok_or(FormatError::InvalidDecimal)?;
        let x = x_str.trim().parse::<BigUint>().map_err(|_| FormatError::InvalidDecimal)?;
        let y = y_str.trim().parse::<BigUint>().map_err(|_| FormatError::InvalidDecimal)?;
        Ok(Self::from_decimal(x, y))
    }

    /// Parses a public key from raw bytes, detecting the format by length and
    /// lead byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        match bytes.len() {
            65 if bytes[0] == 0x04 => {
                let x = BigUint::from_bytes_be(&bytes[1..33]);
                let y = BigUint::from_bytes_be(&bytes[33..65]);
                Ok(PublicKey::from_point(AffinePoint::new(x, y), PublicKeyFormat::Uncompressed))
            }
            33 if bytes[0] == 0x02 || bytes[0] == 0x03 => {
                let parity = bytes[0] - 0x02;
                let x = BigUint::from_bytes_be(&bytes[1..33]);
                let y = recover_y(&x, parity)?;
                Ok(PublicKey::from_point(AffinePoint::new(x, y), PublicKeyFormat::Compressed { parity }))
            }
            64 => {
                let x = BigUint::from_bytes_be(&bytes[0..32]);
                let y = BigUint::from_bytes_be(&bytes[32..64]);
                Ok(PublicKey::from_point(AffinePoint::new(x, y), PublicKeyFormat::Electrum))
            }
            _ => Err(FormatError::UnrecognizedKeyFormat),
        }
    }

    /// Parses a public key from a hex string, detecting the format by length
    /// and lead byte. The parity bit for `hex_compressed` is taken from the
    /// *integer* value of the decoded lead byte, not the ASCII code of the
    /// first hex character (see crate-level design notes).
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = hex::decode(s).map_err(|_| FormatError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}

fn be32(v: &BigUint) -> [u8; 32] {
    let bytes = v.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Recovers `y` for a compressed public key via `β = (x^3 + 7)^((p+1)/4) mod p`,
/// picking `β` or `p - β` to match the requested parity.
fn recover_y(x: &BigUint, parity: u8) -> Result<BigUint, FormatError> {
    let p = curve::p();
    let alpha = (pow_mod(x, &BigUint::from(3u32), p) + BigUint::from(7u32)) % p;
    let exponent = (p + BigUint::from(1u32)) / BigUint::from(4u32);
    let beta = pow_mod(&alpha, &exponent, p);

    // Reject x values with no corresponding curve point.
    if (&beta * &beta) % p != alpha {
        log::debug!("compressed public key x-coordinate has no corresponding curve point");
        return Err(FormatError::UnrecognizedKeyFormat);
    }

    let beta_parity = beta.bit(0) as u8;
    if beta_parity == parity {
        Ok(beta)
    } else {
        Ok(p - beta)
    }
}

/// The tagged source format of a decoded private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKeyFormat {
    /// Base-10 integer in `[1, n)`, textual only (no fixed byte form).
    Decimal,
    /// 32 raw bytes / 64 hex chars.
    Raw,
    /// 33 bytes with a trailing `0x01` / 66 hex chars with a trailing "01".
    Compressed,
    /// Base58Check(32 bytes, version = 128 + network byte).
    Wif,
    /// Base58Check(32 bytes || 0x01, version = 128 + network byte).
    WifCompressed,
}

/// A private scalar in `[1, n)`, zeroed on drop.
pub struct PrivateKey {
    scalar_be: [u8; 32],
    pub format: PrivateKeyFormat,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.scalar_be.zeroize();
    }
}

impl PrivateKey {
    pub fn scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&self.scalar_be)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.scalar_be
    }

    fn from_scalar(scalar: &BigUint, format: PrivateKeyFormat) -> Result<Self, KeyRangeError> {
        if scalar.is_zero() || scalar >= curve::n() {
            return Err(KeyRangeError);
        }
        Ok(PrivateKey { scalar_be: be32(scalar), format })
    }

    pub fn from_raw_bytes(bytes: &[u8; 32]) -> Result<Self, KeyRangeError> {
        Self::from_scalar(&BigUint::from_bytes_be(bytes), PrivateKeyFormat::Raw)
    }

    /// Builds a private key directly from a decimal scalar in `[1, n)`.
    pub fn from_decimal(scalar: &BigUint) -> Result<Self, KeyRangeError> {
        Self::from_scalar(scalar, PrivateKeyFormat::Decimal)
    }

    /// Parses a private key from its base-10 text form.
    pub fn from_decimal_str(s: &str) -> Result<Self, FormatError> {
        let scalar = s.trim().parse::<BigUint>().map_err(|_| FormatError::InvalidDecimal)?;
        Self::from_decimal(&scalar).map_err(|_| FormatError::UnrecognizedKeyFormat)
    }

    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = hex::decode(s).map_err(|_| FormatError::InvalidHex)?;
        match bytes.len() {
            32 => Self::from_raw_bytes(bytes.as_slice().try_into().unwrap())
                .map_err(|_| FormatError::UnrecognizedKeyFormat),
            33 if bytes[32] == 0x01 => {
                let scalar = BigUint::from_bytes_be(&bytes[0..32]);
                Self::from_scalar(&scalar, PrivateKeyFormat::Compressed)
                    .map_err(|_| FormatError::UnrecognizedKeyFormat)
            }
            _ => Err(FormatError::UnrecognizedKeyFormat),
        }
    }

    /// Decodes a WIF or WIF-compressed private key under the given network's
    /// WIF version (`0x80 + network_byte`).
    pub fn from_wif(s: &str) -> Result<Self, FormatError> {
        let (version, payload) = base58check::b58check_to_bin(s).map_err(|_| FormatError::InvalidBase58)?;
        match payload.len() {
            32 => {
                let scalar = BigUint::from_bytes_be(&payload);
                Self::from_scalar(&scalar, PrivateKeyFormat::Wif)
                    .map_err(|_| FormatError::UnrecognizedKeyFormat)
            }
            33 if payload[32] == 0x01 => {
                let scalar = BigUint::from_bytes_be(&payload[0..32]);
                Self::from_scalar(&scalar, PrivateKeyFormat::WifCompressed)
                    .map_err(|_| FormatError::UnrecognizedKeyFormat)
            }
            _ => {
                let _ = version;
                Err(FormatError::UnrecognizedKeyFormat)
            }
        }
    }

    pub fn to_wif(&self, wif_version: VersionByte) -> String {
        let mut payload = self.scalar_be.to_vec();
        if matches!(self.format, PrivateKeyFormat::WifCompressed | PrivateKeyFormat::Compressed) {
            payload.push(0x01);
        }
        base58check::bin_to_b58check(&payload, wif_version)
    }
}

/// Detects and parses a public key from an opaque string: tries the
/// `"x,y"` decimal-pair form first, then falls back to hex (which itself
/// detects uncompressed/compressed/electrum by length and lead byte).
pub fn detect_public_key(s: &str) -> Result<PublicKey, FormatError> {
    PublicKey::from_decimal_str(s).or_else(|_| PublicKey::from_hex(s))
}

/// Detects and parses a private key from an opaque string: an all-digit
/// string is read as a decimal scalar, otherwise falls back to hex and
/// then WIF.
pub fn detect_private_key(s: &str) -> Result<PrivateKey, FormatError> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return PrivateKey::from_decimal_str(s);
    }
    PrivateKey::from_hex(s).or_else(|_| PrivateKey::from_wif(s))
}

/// `d * G`, re-encoded in the family (compressed vs. uncompressed) implied by
/// `d`'s source format: `wif*` re-encodes as `hex*`.
pub fn privkey_to_pubkey(privkey: &PrivateKey) -> PublicKey {
    let point = curve::scalar_mul_base(&privkey.scalar());
    let format = match privkey.format {
        PrivateKeyFormat::Raw | PrivateKeyFormat::Wif => PublicKeyFormat::Uncompressed,
        PrivateKeyFormat::Compressed | PrivateKeyFormat::WifCompressed => {
            let parity = point.y.bit(0) as u8;
            PublicKeyFormat::Compressed { parity }
        }
        PrivateKeyFormat::Decimal => PublicKeyFormat::Decimal,
    };
    PublicKey::from_point(point, format)
}

/// `bin_to_b58check(hash160(serialize(pubkey)), version)`.
pub fn pubkey_to_address(pubkey: &PublicKey, version: VersionByte) -> String {
    let payload = hash160(&pubkey.serialize());
    base58check::bin_to_b58check(&payload, version)
}

/// A coarse structural match for `^[D|3|dgb1|S][a-km-zA-HJ-NP-Z0-9]{26,33}$`,
/// hand-written rather than pulling in a regex engine for one fixed pattern.
///
/// Note the character class really does include the full `0-9` digit range
/// (not just the base58-safe digits) — that's what the regex says, and this
/// matcher reproduces it exactly rather than "fixing" it to true base58.
pub fn looks_like_address(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let rest = if let Some(r) = s.strip_prefix("dgb1") {
        r.as_bytes()
    } else {
        match bytes[0] {
            b'D' | b'3' | b'S' => &bytes[1..],
            _ => return false,
        }
    };

    if rest.len() < 26 || rest.len() > 33 {
        return false;
    }

    rest.iter().all(|&b| matches!(b,
        b'a'..=b'k' | b'm'..=b'z' | b'A'..=b'H' | b'J'..=b'N' | b'P'..=b'Z' | b'0'..=b'9'
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privkey_one_yields_generator() {
        let privkey = PrivateKey::from_raw_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 1;
            b
        })
        .unwrap();
        let pubkey = privkey_to_pubkey(&privkey);
        assert_eq!(pubkey.point, curve::generator().clone());
    }

    #[test]
    fn zero_privkey_is_rejected() {
        assert!(PrivateKey::from_raw_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn pubkey_round_trips_through_compressed_bytes() {
        let mut b = [0u8; 32];
        b[31] = 5;
        let privkey = PrivateKey::from_hex(&hex::encode({
            let mut full = b.to_vec();
            full.push(0x01);
            full
        }))
        .unwrap();
        let pubkey = privkey_to_pubkey(&privkey);
        let serialized = pubkey.serialize();
        assert_eq!(serialized.len(), 33);
        let reparsed = PublicKey::from_bytes(&serialized).unwrap();
        assert_eq!(reparsed.point, pubkey.point);
    }

    #[test]
    fn address_matches_matcher_and_round_trips() {
        let mut b = [0u8; 32];
        b[31] = 42;
        let privkey = PrivateKey::from_raw_bytes(&b).unwrap();
        let pubkey = privkey_to_pubkey(&privkey);
        let address = pubkey_to_address(&pubkey, VersionByte(MAINNET_P2PKH as u32));
        assert!(looks_like_address(&address), "address {} failed matcher", address);
        let (version, _) = base58check::b58check_to_bin(&address).unwrap();
        assert_eq!(version, VersionByte(MAINNET_P2PKH as u32));
    }

    #[test]
    fn wif_round_trip() {
        let mut b = [0u8; 32];
        b[31] = 7;
        let privkey = PrivateKey::from_raw_bytes(&b).unwrap();
        let wif = privkey.to_wif(VersionByte(128 + MAINNET_P2PKH as u32));
        let decoded = PrivateKey::from_wif(&wif).unwrap();
        assert_eq!(decoded.scalar(), privkey.scalar());
    }

    #[test]
    fn decimal_privkey_round_trips_to_decimal_pubkey() {
        let mut b = [0u8; 32];
        b[31] = 11;
        let raw = PrivateKey::from_raw_bytes(&b).unwrap();

        let decimal = PrivateKey::from_decimal_str(&raw.scalar().to_string()).unwrap();
        assert_eq!(decimal.scalar(), raw.scalar());
        assert!(matches!(decimal.format, PrivateKeyFormat::Decimal));

        let pubkey = privkey_to_pubkey(&decimal);
        assert!(matches!(pubkey.format, PublicKeyFormat::Decimal));
        assert_eq!(pubkey.point, privkey_to_pubkey(&raw).point);

        let text = format!("{},{}", pubkey.point.x, pubkey.point.y);
        let reparsed = PublicKey::from_decimal_str(&text).unwrap();
        assert_eq!(reparsed.point, pubkey.point);

        // Decimal has no compression marker, so address derivation matches electrum.
        let address = pubkey_to_address(&pubkey, VersionByte(MAINNET_P2PKH as u32));
        let electrum = PublicKey::from_point(pubkey.point.clone(), PublicKeyFormat::Electrum);
        assert_eq!(address, pubkey_to_address(&electrum, VersionByte(MAINNET_P2PKH as u32)));
    }

    #[test]
    fn detect_private_key_picks_decimal_then_hex_then_wif() {
        let mut b = [0u8; 32];
        b[31] = 12;
        let privkey = PrivateKey::from_raw_bytes(&b).unwrap();

        let from_decimal = detect_private_key(&privkey.scalar().to_string()).unwrap();
        assert_eq!(from_decimal.scalar(), privkey.scalar());

        let from_hex = detect_private_key(&hex::encode(privkey.to_bytes())).unwrap();
        assert_eq!(from_hex.scalar(), privkey.scalar());

        let wif = privkey.to_wif(VersionByte(128 + MAINNET_P2PKH as u32));
        let from_wif = detect_private_key(&wif).unwrap();
        assert_eq!(from_wif.scalar(), privkey.scalar());
    }

    #[test]
    fn detect_public_key_picks_decimal_then_hex() {
        let mut b = [0u8; 32];
        b[31] = 13;
        let privkey = PrivateKey::from_raw_bytes(&b).unwrap();
        let pubkey = privkey_to_pubkey(&privkey);

        let text = format!("{},{}", pubkey.point.x, pubkey.point.y);
        let from_decimal = detect_public_key(&text).unwrap();
        assert_eq!(from_decimal.point, pubkey.point);

        let from_hex = detect_public_key(&pubkey.to_hex()).unwrap();
        assert_eq!(from_hex.point, pubkey.point);
    }

    #[test]
    fn network_params_mainnet_matches_constants() {
        let net = NetworkParams::mainnet();
        assert_eq!(net.p2pkh_version, VersionByte(MAINNET_P2PKH as u32));
        assert_eq!(net.p2sh_version, VersionByte(MAINNET_P2SH as u32));
        assert_eq!(net.wif_version(), VersionByte(128 + MAINNET_P2PKH as u32));
    }
}
