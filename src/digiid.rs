//! DigiID challenge construction and verification: the layer that glues
//! URI templating, ECDSA recovery, and address derivation into a single
//! boolean decision for a host application.

use url::Url;

use crate::base58check::VersionByte;
use crate::ecdsa::{self, CompactSignature};
use crate::hash::electrum_sig_hash;
use crate::keycodec::{self, MAINNET_P2PKH};

/// A DigiID login challenge. Immutable once constructed; the host is
/// responsible for nonce generation and replay prevention — this type only
/// carries the data needed to template and validate the URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub nonce: String,
    pub callback: Url,
    pub secure: bool,
}

impl Challenge {
    pub fn new(nonce: impl Into<String>, callback: Url, secure: bool) -> Self {
        Challenge { nonce: nonce.into(), callback, secure }
    }
}

/// Templates `challenge` into a `digiid://` URI: the callback's scheme is
/// replaced, and `x=<nonce>` (plus `u=1` when insecure) is appended as the
/// query string, in a fixed parameter order.
///
/// `digiid` is not one of `url`'s "special" schemes (`http`, `https`, ...),
/// and `Url::set_scheme` refuses to cross that boundary in either direction,
/// so the host/path are pulled out of the parsed callback and the `digiid`
/// URI is assembled by hand rather than by mutating the callback's `Url`.
pub fn generate_uri(challenge: &Challenge) -> String {
    let host = challenge.callback.host_str().unwrap_or("");
    let path = challenge.callback.path();

    let query = if challenge.secure {
        format!("x={}", challenge.nonce)
    } else {
        format!("x={}&u=1", challenge.nonce)
    };

    format!("digiid://{host}{path}?{query}")
}

/// Validates `uri` against `challenge` by comparing parsed query
/// multi-maps rather than raw strings, so parameter order and percent-
/// encoding differences between wallets don't cause spurious rejections.
pub fn uri_valid(challenge: &Challenge, uri: &str) -> bool {
    let expected = generate_uri(challenge);

    let Ok(expected_url) = Url::parse(&expected) else {
        log::debug!("uri_valid: failed to parse our own generated URI, this is a bug");
        return false;
    };
    let Ok(actual_url) = Url::parse(uri) else {
        log::debug!("uri_valid: candidate URI did not parse");
        return false;
    };

    if expected_url.scheme() != actual_url.scheme()
        || expected_url.host_str() != actual_url.host_str()
        || expected_url.path() != actual_url.path()
    {
        log::debug!("uri_valid: scheme, host, or path mismatch");
        return false;
    }

    let mut expected_pairs: Vec<(String, String)> = expected_url.query_pairs().into_owned().collect();
    let mut actual_pairs: Vec<(String, String)> = actual_url.query_pairs().into_owned().collect();
    expected_pairs.sort();
    actual_pairs.sort();

    expected_pairs == actual_pairs
}

/// Verifies that `signature` over `uri` was produced by the key controlling
/// `claimed_address`: recovers the public key, re-derives the mainnet P2PKH
/// address, and only then runs the full ECDSA verification. Any failure —
/// malformed signature, address mismatch, bad signature — collapses to
/// `false` rather than propagating a typed error, per the public boundary's
/// error policy.
pub fn signature_valid(uri: &str, claimed_address: &str, signature: &CompactSignature) -> bool {
    let hash = electrum_sig_hash(uri);

    let Ok(pubkey) = ecdsa::recover_pubkey(&hash, signature) else {
        log::debug!("signature_valid: public key recovery failed");
        return false;
    };

    let recovered_address = keycodec::pubkey_to_address(&pubkey, VersionByte(MAINNET_P2PKH as u32));
    if recovered_address != claimed_address {
        log::debug!("signature_valid: recovered address did not match the claimed address");
        return false;
    }

    ecdsa::verify_by_address(&hash, signature, claimed_address)
}

/// Builds a QR-code image URL for `uri` via a public chart-rendering
/// service. Not a cryptographic operation — a thin convenience for hosts
/// that want a one-line way to display the challenge.
pub fn qr_url(uri: &str) -> String {
    let mut url = Url::parse("https://chart.googleapis.com/chart").expect("static URL is valid");
    url.query_pairs_mut()
        .append_pair("chs", "280x280")
        .append_pair("chld", "L|0")
        .append_pair("cht", "qr")
        .append_pair("chl", uri);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_challenge(secure: bool) -> Challenge {
        Challenge::new("abc123", Url::parse("https://example.com/cb").unwrap(), secure)
    }

    #[test]
    fn qr_url_embeds_the_challenge_uri() {
        let challenge = example_challenge(true);
        let uri = generate_uri(&challenge);
        let chart_url = qr_url(&uri);
        assert!(chart_url.starts_with("https://chart.googleapis.com/chart?"));
        let parsed = Url::parse(&chart_url).unwrap();
        let chl = parsed.query_pairs().find(|(k, _)| k == "chl").unwrap().1;
        assert_eq!(chl, uri);
    }

    #[test]
    fn scenario_s4_secure_uri_construction() {
        let challenge = example_challenge(true);
        assert_eq!(generate_uri(&challenge), "digiid://example.com/cb?x=abc123");
    }

    #[test]
    fn scenario_s4_insecure_uri_appends_u_flag() {
        let challenge = example_challenge(false);
        assert_eq!(generate_uri(&challenge), "digiid://example.com/cb?x=abc123&u=1");
    }

    #[test]
    fn uri_valid_accepts_reordered_query_params() {
        let challenge = example_challenge(false);
        let canonical = generate_uri(&challenge);
        let reordered = canonical.replace("x=abc123&u=1", "u=1&x=abc123");
        assert_ne!(canonical, reordered);
        assert!(uri_valid(&challenge, &reordered));
    }

    #[test]
    fn uri_valid_rejects_wrong_nonce() {
        let challenge = example_challenge(true);
        assert!(!uri_valid(&challenge, "digiid://example.com/cb?x=different"));
    }

    #[test]
    fn scenario_s5_sign_recover_verify_round_trip() {
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes[31] = 99;
        let privkey = keycodec::PrivateKey::from_hex(&hex::encode({
            let mut full = scalar_bytes.to_vec();
            full.push(0x01);
            full
        }))
        .unwrap();

        let pubkey = keycodec::privkey_to_pubkey(&privkey);
        let address = keycodec::pubkey_to_address(&pubkey, VersionByte(MAINNET_P2PKH as u32));

        let challenge = example_challenge(true);
        let uri = generate_uri(&challenge);

        let hash = electrum_sig_hash(&uri);
        let signature = ecdsa::sign(&hash, &privkey).unwrap();

        assert!(signature_valid(&uri, &address, &signature));
    }

    #[test]
    fn scenario_s6_tampered_uri_fails_verification() {
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes[31] = 100;
        let privkey = keycodec::PrivateKey::from_raw_bytes(&scalar_bytes).unwrap();
        let pubkey = keycodec::privkey_to_pubkey(&privkey);
        let address = keycodec::pubkey_to_address(&pubkey, VersionByte(MAINNET_P2PKH as u32));

        let uri = "digiid://example.com/cb?x=abc123";
        let hash = electrum_sig_hash(uri);
        let signature = ecdsa::sign(&hash, &privkey).unwrap();
        assert!(signature_valid(uri, &address, &signature));

        let tampered = "digiid://example.com/cb?x=abc124";
        assert!(!signature_valid(tampered, &address, &signature));
    }
}
