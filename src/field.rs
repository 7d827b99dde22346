//! Modular arithmetic shared by curve point math and scalar (ECDSA) math:
//! Euclidean mod, modular exponentiation, and modular inverse.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

/// The mathematician's mod, not Rust's truncated-division remainder: the
/// result always lies in `[0, m)` even when `a` is negative.
pub fn mod_floor(a: &BigInt, m: &BigUint) -> BigUint {
    let m_signed = BigInt::from(m.clone());
    let mut r = a % &m_signed;
    if r.is_negative() {
        r += &m_signed;
    }
    r.to_biguint().expect("non-negative BigInt converts to BigUint")
}

/// `base^exp mod m` via square-and-multiply.
pub fn pow_mod(base: &BigUint, exp: &BigUint, m: &BigUint) -> BigUint {
    base.modpow(exp, m)
}

/// Modular inverse of `a` modulo `n` via the extended Euclidean algorithm.
/// By convention `inv_mod(0, n) == 0`.
pub fn inv_mod(a: &BigUint, n: &BigUint) -> BigUint {
    if a.is_zero() {
        return BigUint::zero();
    }

    let mut old_r = BigInt::from(a.clone());
    let mut r = BigInt::from(n.clone());
    let mut old_s = BigInt::from(1);
    let mut s = BigInt::from(0);

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let new_r = &old_r - &quotient * &r;
        old_r = r;
        r = new_r;

        let new_s = &old_s - &quotient * &s;
        old_s = s;
        s = new_s;
    }

    mod_floor(&old_s, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod_floor_normalizes_negative_input() {
        let m = BigUint::from(7u32);
        let a = BigInt::from(-3);
        assert_eq!(mod_floor(&a, &m), BigUint::from(4u32));
    }

    #[test]
    fn pow_mod_matches_naive_exponentiation() {
        let base = BigUint::from(4u32);
        let exp = BigUint::from(13u32);
        let m = BigUint::from(497u32);
        assert_eq!(pow_mod(&base, &exp, &m), BigUint::from(445u32));
    }

    #[test]
    fn inv_mod_is_multiplicative_inverse() {
        let n = BigUint::from(4133u32); // a prime, for a clean [1, n) domain
        let mut a = BigUint::from(1u32);
        while a < n {
            let inv = inv_mod(&a, &n);
            assert_eq!((&a * &inv) % &n, BigUint::from(1u32));
            a += BigUint::from(137u32);
        }
    }

    #[test]
    fn inv_mod_zero_is_zero_by_convention() {
        let n = BigUint::from(97u32);
        assert_eq!(inv_mod(&BigUint::zero(), &n), BigUint::zero());
    }
}
