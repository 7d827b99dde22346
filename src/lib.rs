//! DigiID challenge/response authentication, built on a pure-arithmetic
//! secp256k1 implementation.
//!
//! This crate signs and verifies DigiID login challenges: it has no
//! network I/O, no session storage, and no QR-code rendering beyond a thin
//! URL helper. Hosts supply nonces, callbacks, signatures, and claimed
//! addresses; this crate supplies the cryptography in between.
//!
//! ```
//! use digiid_core::curve;
//! assert!(curve::generator().is_on_curve());
//! ```
//!
//! # Side channels
//!
//! Every operation here runs over [`num_bigint::BigUint`], which is
//! variable-time: branch timing and memory access patterns can depend on
//! secret values. That's an acceptable tradeoff for *verification*, whose
//! inputs (signatures, addresses, public keys) are public by construction.
//! It is a weaker guarantee for *signing*, where the private scalar and the
//! nonce `k` are secret. Production signing paths that face a timing-
//! sensitive adversary should move to a constant-time secp256k1 primitive;
//! this crate favors a self-contained, auditable implementation over that
//! hardening.

pub mod base58check;
pub mod basecodec;
pub mod curve;
pub mod digiid;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod hash;
pub mod keycodec;

pub use digiid::{generate_uri, qr_url, signature_valid, uri_valid, Challenge};
pub use ecdsa::CompactSignature;
pub use error::{DigiIdError, Result};
pub use keycodec::{PrivateKey, PublicKey};
