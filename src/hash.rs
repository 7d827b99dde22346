//! Hash primitives: SHA-256, RIPEMD-160, their Bitcoin/DigiByte-style
//! compositions (HASH160, double-SHA256), HMAC-SHA256, and the DigiByte
//! "signed message" tagged hash used for Electrum-style message signing.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// The DigiByte signed-message magic string. Its length (25) is the varint-free
/// length byte prefixed in [`electrum_sig_hash`].
const MESSAGE_MAGIC: &str = "DigiByte Signed Message:\n";

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

pub fn ripemd160(bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// RIPEMD-160(SHA-256(bytes)) — the hash used to derive addresses from public keys.
pub fn hash160(bytes: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(bytes))
}

/// SHA-256(SHA-256(bytes)) — the hash used for Base58Check checksums and message signing.
pub fn dsha256(bytes: &[u8]) -> [u8; 32] {
    sha256(&sha256(bytes))
}

pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts a key of any length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// Bitcoin-style varint: `<253` as one byte, `<2^16` as `0xFD` + 2 LE bytes,
/// `<2^32` as `0xFE` + 4 LE bytes, else `0xFF` + 8 LE bytes.
fn push_varint(out: &mut Vec<u8>, n: u64) {
    if n < 253 {
        out.push(n as u8);
    } else if n <= 0xFFFF {
        out.push(0xFD);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xFFFF_FFFF {
        out.push(0xFE);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(0xFF);
        out.extend_from_slice(&n.to_le_bytes());
    }
}

/// `dsha256(0x19 ‖ "DigiByte Signed Message:\n" ‖ varint(len(msg)) ‖ msg)`.
///
/// This is the hash that gets ECDSA-signed by a wallet proving ownership of an
/// address outside of the DigiID URI flow (the "verify by anything" dispatch
/// in [`crate::ecdsa::verify_by_anything`] uses it for non-address pubkeys).
pub fn electrum_sig_hash(msg_text: &str) -> [u8; 32] {
    let mut buf = Vec::with_capacity(1 + MESSAGE_MAGIC.len() + 9 + msg_text.len());
    buf.push(MESSAGE_MAGIC.len() as u8);
    buf.extend_from_slice(MESSAGE_MAGIC.as_bytes());
    push_varint(&mut buf, msg_text.len() as u64);
    buf.extend_from_slice(msg_text.as_bytes());
    dsha256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s3_sha256_known_vector() {
        let digest = sha256(b"784734adfids");
        assert_eq!(
            hex::encode(digest),
            "ae616f5c8f6d338e4905f6170a90a231d0c89470a94b28e894a83aef90975557"
        );
    }

    #[test]
    fn hash160_is_ripemd_of_sha256() {
        let msg = b"digiid";
        let expected = ripemd160(&sha256(msg));
        assert_eq!(hash160(msg), expected);
    }

    #[test]
    fn dsha256_is_sha256_twice() {
        let msg = b"digiid";
        let expected = sha256(&sha256(msg));
        assert_eq!(dsha256(msg), expected);
    }

    #[test]
    fn hmac_is_deterministic() {
        let a = hmac_sha256(b"key", b"msg");
        let b = hmac_sha256(b"key", b"msg");
        assert_eq!(a, b);
    }

    #[test]
    fn varint_thresholds() {
        let mut out = Vec::new();
        push_varint(&mut out, 5);
        assert_eq!(out, vec![5]);

        let mut out = Vec::new();
        push_varint(&mut out, 1000);
        assert_eq!(out[0], 0xFD);

        let mut out = Vec::new();
        push_varint(&mut out, 1 << 17);
        assert_eq!(out[0], 0xFE);
    }

    #[test]
    fn electrum_sig_hash_is_deterministic() {
        let a = electrum_sig_hash("digiid://example.com/cb?x=abc123");
        let b = electrum_sig_hash("digiid://example.com/cb?x=abc123");
        assert_eq!(a, b);
        let c = electrum_sig_hash("digiid://example.com/cb?x=abc124");
        assert_ne!(a, c);
    }
}
