//! Error types for every fallible boundary in this crate.
//!
//! Each variant corresponds to one of the error kinds from the DigiID core
//! specification. None of these wrap a `thiserror`-derived type: we implement
//! `Display` and `std::error::Error` by hand, the way the rest of this codebase
//! does for its own error enums.

use std::error::Error as StdError;
use std::fmt;

/// Base58Check payload or key input did not match any recognized layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A character fell outside the alphabet of the requested base.
    InvalidAlphabet,
    /// Byte length or lead byte did not match any known public/private key encoding.
    UnrecognizedKeyFormat,
    /// A hex string had odd length or non-hex characters.
    InvalidHex,
    /// A WIF/Base58Check string had no leading `'1'`-run accounting or was empty.
    InvalidBase58,
    /// A DigiID URI or callback URL could not be parsed.
    InvalidUri,
    /// A decimal-format key string was not a valid base-10 integer (or, for
    /// public keys, not a valid `"x,y"` decimal pair).
    InvalidDecimal,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidAlphabet => write!(f, "input contains a character outside the requested base's alphabet"),
            FormatError::UnrecognizedKeyFormat => write!(f, "key does not match any recognized encoding"),
            FormatError::InvalidHex => write!(f, "invalid hex string"),
            FormatError::InvalidBase58 => write!(f, "invalid base58 string"),
            FormatError::InvalidUri => write!(f, "invalid DigiID URI or callback URL"),
            FormatError::InvalidDecimal => write!(f, "invalid decimal key encoding"),
        }
    }
}

impl StdError for FormatError {}

/// A Base58Check payload's trailing checksum did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumError;

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base58check checksum mismatch")
    }
}

impl StdError for ChecksumError {}

/// A secp256k1 point, signature, or recovery failed a curve-level check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    /// The decoded `(x, y)` does not satisfy `y^2 = x^3 + 7 (mod p)`.
    PointNotOnCurve,
    /// A recovered or provided `v` fell outside `[27, 34]`.
    InvalidRecoveryId,
    /// `r` or `s` reduced to zero modulo the curve order.
    ZeroScalar,
    /// Signing produced a signature that failed its own self-verification step.
    SelfVerificationFailed,
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::PointNotOnCurve => write!(f, "point does not satisfy the secp256k1 curve equation"),
            CurveError::InvalidRecoveryId => write!(f, "recovery id v is outside [27, 34]"),
            CurveError::ZeroScalar => write!(f, "r or s reduced to zero modulo the curve order"),
            CurveError::SelfVerificationFailed => write!(f, "signature failed self-verification after signing"),
        }
    }
}

impl StdError for CurveError {}

/// A private scalar fell outside `[1, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRangeError;

impl fmt::Display for KeyRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "private key scalar is zero or not less than the curve order")
    }
}

impl StdError for KeyRangeError {}

/// An arithmetic invariant that should always hold was violated. This indicates
/// a bug in this crate, not bad caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalAssertError(pub &'static str);

impl fmt::Display for InternalAssertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal invariant violated: {}", self.0)
    }
}

impl StdError for InternalAssertError {}

/// The crate-wide error type. Every fallible public function returns
/// `Result<T, DigiIdError>`; the boolean-returning DigiID entry points
/// (`uri_valid`, `signature_valid`) fold every variant to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigiIdError {
    Format(FormatError),
    Checksum(ChecksumError),
    Curve(CurveError),
    KeyRange(KeyRangeError),
    Internal(InternalAssertError),
}

impl fmt::Display for DigiIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigiIdError::Format(e) => e.fmt(f),
            DigiIdError::Checksum(e) => e.fmt(f),
            DigiIdError::Curve(e) => e.fmt(f),
            DigiIdError::KeyRange(e) => e.fmt(f),
            DigiIdError::Internal(e) => e.fmt(f),
        }
    }
}

impl StdError for DigiIdError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DigiIdError::Format(e) => Some(e),
            DigiIdError::Checksum(e) => Some(e),
            DigiIdError::Curve(e) => Some(e),
            DigiIdError::KeyRange(e) => Some(e),
            DigiIdError::Internal(e) => Some(e),
        }
    }
}

impl From<FormatError> for DigiIdError {
    fn from(e: FormatError) -> Self { DigiIdError::Format(e) }
}

impl From<ChecksumError> for DigiIdError {
    fn from(e: ChecksumError) -> Self { DigiIdError::Checksum(e) }
}

impl From<CurveError> for DigiIdError {
    fn from(e: CurveError) -> Self { DigiIdError::Curve(e) }
}

impl From<KeyRangeError> for DigiIdError {
    fn from(e: KeyRangeError) -> Self { DigiIdError::KeyRange(e) }
}

impl From<InternalAssertError> for DigiIdError {
    fn from(e: InternalAssertError) -> Self { DigiIdError::Internal(e) }
}

pub type Result<T> = core::result::Result<T, DigiIdError>;
