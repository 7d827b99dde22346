//! secp256k1 point arithmetic: affine and Jacobian coordinates, point
//! doubling and addition, and scalar multiplication by repeated doubling and
//! adding. Nothing here calls into `libsecp256k1` or any FFI boundary — every
//! operation is ordinary modular arithmetic over [`num_bigint::BigUint`],
//! which makes the whole module variable-time (see the crate-level docs).

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::field::{inv_mod, pow_mod};

/// An affine point on secp256k1, or the point at infinity (encoded as `(0, 0)`
/// as a sentinel rather than a separate enum variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: BigUint,
    pub y: BigUint,
}

impl AffinePoint {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        AffinePoint { x, y }
    }

    pub fn infinity() -> Self {
        AffinePoint { x: BigUint::zero(), y: BigUint::zero() }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// `y^2 == x^3 + 7 (mod p)`.
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity() {
            return true;
        }
        let p = p();
        let lhs = (&self.y * &self.y) % p;
        let rhs = (pow_mod(&self.x, &BigUint::from(3u32), p) + BigUint::from(7u32)) % p;
        lhs == rhs
    }
}

/// A secp256k1 point in Jacobian coordinates: the affine equivalent is
/// `(X / Z^2, Y / Z^3)`. `Y == 0` encodes the point at infinity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JacobianPoint {
    pub x: BigUint,
    pub y: BigUint,
    pub z: BigUint,
}

impl JacobianPoint {
    pub fn infinity() -> Self {
        JacobianPoint { x: BigUint::zero(), y: BigUint::zero(), z: BigUint::one() }
    }

    pub fn is_infinity(&self) -> bool {
        self.y.is_zero()
    }
}

fn hex_const(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).expect("hard-coded secp256k1 constant is valid hex")
}

lazy_static::lazy_static! {
    static ref P: BigUint = hex_const("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f");
    static ref N: BigUint = hex_const("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
    static ref G: AffinePoint = AffinePoint::new(
        hex_const("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
        hex_const("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
    );
}

/// The secp256k1 field prime.
pub fn p() -> &'static BigUint {
    &P
}

/// The secp256k1 curve order.
pub fn n() -> &'static BigUint {
    &N
}

/// The secp256k1 base point.
pub fn generator() -> &'static AffinePoint {
    &G
}

pub fn to_jacobian(p: &AffinePoint) -> JacobianPoint {
    if p.is_infinity() {
        return JacobianPoint::infinity();
    }
    JacobianPoint { x: p.x.clone(), y: p.y.clone(), z: BigUint::one() }
}

pub fn from_jacobian(p: &JacobianPoint) -> AffinePoint {
    if p.is_infinity() {
        return AffinePoint::infinity();
    }
    let modulus = self::p();
    let z_inv = inv_mod(&p.z, modulus);
    let z_inv2 = (&z_inv * &z_inv) % modulus;
    let z_inv3 = (&z_inv2 * &z_inv) % modulus;
    AffinePoint::new((&p.x * &z_inv2) % modulus, (&p.y * &z_inv3) % modulus)
}

/// Doubles a Jacobian point. `a = 0` for secp256k1, so the usual `a*Z^4` term
/// drops out of `M`.
pub fn jac_double(point: &JacobianPoint) -> JacobianPoint {
    if point.is_infinity() {
        return JacobianPoint::infinity();
    }
    let modulus = p();
    let (x, y, z) = (&point.x, &point.y, &point.z);

    let y_sq = mul_mod(y, y, modulus);
    let s = mul_mod(&BigUint::from(4u32), &mul_mod(x, &y_sq, modulus), modulus);
    let m = mul_mod(&BigUint::from(3u32), &mul_mod(x, x, modulus), modulus);

    let x_new = sub_mod(&mul_mod(&m, &m, modulus), &mul_mod(&BigUint::from(2u32), &s, modulus), modulus);
    let y_sq_sq = mul_mod(&y_sq, &y_sq, modulus);
    let y_new = sub_mod(
        &mul_mod(&m, &sub_mod(&s, &x_new, modulus), modulus),
        &mul_mod(&BigUint::from(8u32), &y_sq_sq, modulus),
        modulus,
    );
    let z_new = mul_mod(&BigUint::from(2u32), &mul_mod(y, z, modulus), modulus);

    JacobianPoint { x: x_new, y: y_new, z: z_new }
}

/// Adds two Jacobian points.
pub fn jac_add(p1: &JacobianPoint, p2: &JacobianPoint) -> JacobianPoint {
    if p1.is_infinity() {
        return p2.clone();
    }
    if p2.is_infinity() {
        return p1.clone();
    }
    let modulus = p();

    let z1_sq = mul_mod(&p1.z, &p1.z, modulus);
    let z2_sq = mul_mod(&p2.z, &p2.z, modulus);
    let u1 = mul_mod(&p1.x, &z2_sq, modulus);
    let u2 = mul_mod(&p2.x, &z1_sq, modulus);
    let s1 = mul_mod(&p1.y, &mul_mod(&z2_sq, &p2.z, modulus), modulus);
    let s2 = mul_mod(&p2.y, &mul_mod(&z1_sq, &p1.z, modulus), modulus);

    if u1 == u2 {
        return if s1 != s2 { JacobianPoint::infinity() } else { jac_double(p1) };
    }

    let h = sub_mod(&u2, &u1, modulus);
    let r = sub_mod(&s2, &s1, modulus);
    let h_sq = mul_mod(&h, &h, modulus);
    let h_cu = mul_mod(&h_sq, &h, modulus);
    let u1_h_sq = mul_mod(&u1, &h_sq, modulus);

    let x3 = sub_mod(&sub_mod(&mul_mod(&r, &r, modulus), &h_cu, modulus), &mul_mod(&BigUint::from(2u32), &u1_h_sq, modulus), modulus);
    let y3 = sub_mod(&mul_mod(&r, &sub_mod(&u1_h_sq, &x3, modulus), modulus), &mul_mod(&s1, &h_cu, modulus), modulus);
    let z3 = mul_mod(&mul_mod(&h, &p1.z, modulus), &p2.z, modulus);

    JacobianPoint { x: x3, y: y3, z: z3 }
}

fn mul_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    if a >= b {
        (a - b) % m
    } else {
        (m + a - b) % m
    }
}

/// Scalar multiplication `k * point`, by iterative double-and-add over the
/// bits of `k` (normalized modulo the curve order; `k = 0` yields infinity).
pub fn jac_mul(point: &JacobianPoint, k: &BigUint) -> JacobianPoint {
    let k = k % n();
    if k.is_zero() || point.is_infinity() {
        return JacobianPoint::infinity();
    }

    let mut result = JacobianPoint::infinity();
    let mut addend = point.clone();
    let bits = k.bits();

    for i in 0..bits {
        if k.bit(i) {
            result = jac_add(&result, &addend);
        }
        addend = jac_double(&addend);
    }

    result
}

/// Scalar multiplication in affine coordinates: `k * point`.
pub fn scalar_mul(point: &AffinePoint, k: &BigUint) -> AffinePoint {
    from_jacobian(&jac_mul(&to_jacobian(point), k))
}

/// `k * G`.
pub fn scalar_mul_base(k: &BigUint) -> AffinePoint {
    scalar_mul(generator(), k)
}

/// Adds two affine points.
pub fn point_add(p1: &AffinePoint, p2: &AffinePoint) -> AffinePoint {
    from_jacobian(&jac_add(&to_jacobian(p1), &to_jacobian(p2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(generator().is_on_curve());
    }

    #[test]
    fn doubling_generator_matches_scalar_mul_by_two() {
        let doubled = from_jacobian(&jac_double(&to_jacobian(generator())));
        let scaled = scalar_mul_base(&BigUint::from(2u32));
        assert_eq!(doubled, scaled);
        assert!(doubled.is_on_curve());
    }

    #[test]
    fn scalar_mul_by_order_is_infinity() {
        let result = scalar_mul_base(n());
        assert!(result.is_infinity());
    }

    #[test]
    fn scalar_mul_by_zero_is_infinity() {
        let result = scalar_mul_base(&BigUint::zero());
        assert!(result.is_infinity());
    }

    #[test]
    fn every_produced_point_satisfies_curve_law() {
        for k in [1u32, 2, 3, 5, 8, 13, 21, 1000] {
            let point = scalar_mul_base(&BigUint::from(k));
            assert!(point.is_on_curve(), "k={} produced an off-curve point", k);
        }
    }

    #[test]
    fn addition_is_commutative() {
        let a = scalar_mul_base(&BigUint::from(5u32));
        let b = scalar_mul_base(&BigUint::from(7u32));
        assert_eq!(point_add(&a, &b), point_add(&b, &a));
    }

    #[test]
    fn point_plus_infinity_is_point() {
        let a = scalar_mul_base(&BigUint::from(9u32));
        let inf = AffinePoint::infinity();
        assert_eq!(point_add(&a, &inf), a);
    }

    #[test]
    fn known_vector_2g_x_coordinate() {
        let two_g = scalar_mul_base(&BigUint::from(2u32));
        let expected_x = BigUint::parse_bytes(
            b"C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5",
            16,
        )
        .unwrap();
        assert_eq!(two_g.x, expected_x);
    }
}
