//! Arithmetic over the prime field used by the witness.
//!
//! Values are [`FieldElement`]s, either a compact signed machine word or an
//! extended 256-bit value. Every operation goes through an explicit
//! [`FieldContext`] that carries the modulus.

use std::fmt;

pub use ethnum::U256;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::utils::error::{Error, Result};

mod bitwise;
pub mod bn254;
pub mod literal;

/// A field element in one of its two encodings.
///
/// `Compact(v)` with negative `v` denotes `q + v`. `Extended` values are not
/// required to be reduced; arithmetic canonicalizes them before use.
/// The derived equality compares encodings; use [`FieldContext::equals`] to
/// compare values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldElement {
    Compact(i64),
    Extended(U256),
}

impl Default for FieldElement {
    fn default() -> Self {
        FieldElement::Compact(0)
    }
}

impl FieldElement {
    pub fn is_compact(&self) -> bool {
        matches!(self, FieldElement::Compact(_))
    }

    /// Truthiness approximation for control flow. Extended values are
    /// reported as 1 without decoding them.
    pub fn to_int(&self) -> i64 {
        match self {
            FieldElement::Compact(v) => *v,
            FieldElement::Extended(_) => 1,
        }
    }

    pub fn is_true(&self) -> bool {
        self.to_int() != 0
    }
}

impl From<bool> for FieldElement {
    fn from(b: bool) -> Self {
        FieldElement::Compact(b as i64)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldElement::Compact(v) => write!(f, "{}", v),
            FieldElement::Extended(v) => write!(f, "{}", v),
        }
    }
}

// `v` must be below the modulus, hence below 2^256
fn u256_from_reduced(v: &BigUint) -> U256 {
    let mut bytes = [0u8; 32];
    let le = v.to_bytes_le();
    bytes[..le.len()].copy_from_slice(&le);
    U256::from_le_bytes(bytes)
}

/// Immutable description of the field: modulus and derived constants.
#[derive(Debug, Clone)]
pub struct FieldContext {
    modulus: U256,
    q: BigUint,
    half: BigUint,
    mask: BigUint,
    bits: u32,
}

impl FieldContext {
    pub fn new(modulus: U256) -> Result<Self> {
        if modulus <= U256::ONE || modulus & U256::ONE == U256::ZERO {
            return Err(Error::InvalidConfig(format!(
                "field modulus {} is not an odd integer > 1",
                modulus
            )));
        }
        let q = BigUint::from_bytes_le(&modulus.to_le_bytes());
        let bits = 256 - modulus.leading_zeros();
        let half = &q >> 1u32;
        let mask = (BigUint::one() << bits) - BigUint::one();
        Ok(FieldContext {
            modulus,
            q,
            half,
            mask,
            bits,
        })
    }

    pub fn modulus(&self) -> U256 {
        self.modulus
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn byte_width(&self) -> usize {
        self.bits.div_ceil(64) as usize * 8
    }

    // ====================================
    // conversions
    // ====================================

    pub fn zero(&self) -> FieldElement {
        FieldElement::Compact(0)
    }

    pub fn one(&self) -> FieldElement {
        FieldElement::Compact(1)
    }

    pub fn from_u64(&self, v: u64) -> FieldElement {
        match i64::try_from(v) {
            Ok(v) => FieldElement::Compact(v),
            Err(_) => self.from_biguint(BigUint::from(v)),
        }
    }

    pub fn from_i64(&self, v: i64) -> FieldElement {
        FieldElement::Compact(v)
    }

    /// Canonical integer in `[0, q)`.
    pub fn to_biguint(&self, a: &FieldElement) -> BigUint {
        match a {
            FieldElement::Compact(v) if *v >= 0 => BigUint::from(*v as u64) % &self.q,
            FieldElement::Compact(v) => {
                let abs = BigUint::from(v.unsigned_abs()) % &self.q;
                (&self.q - abs) % &self.q
            }
            FieldElement::Extended(v) => BigUint::from_bytes_le(&v.to_le_bytes()) % &self.q,
        }
    }

    pub fn from_biguint(&self, v: BigUint) -> FieldElement {
        FieldElement::Extended(u256_from_reduced(&(v % &self.q)))
    }

    /// The canonical extended form of `a`.
    pub fn to_extended(&self, a: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a))
    }

    pub fn to_u256(&self, a: &FieldElement) -> U256 {
        u256_from_reduced(&self.to_biguint(a))
    }

    /// Canonical little-endian bytes, `byte_width()` long.
    pub fn to_le_bytes(&self, a: &FieldElement) -> Vec<u8> {
        let bytes = self.to_u256(a).to_le_bytes();
        bytes[..self.byte_width()].to_vec()
    }

    pub fn from_le_bytes(&self, bytes: &[u8]) -> FieldElement {
        self.from_biguint(BigUint::from_bytes_le(bytes))
    }

    pub fn is_zero(&self, a: &FieldElement) -> bool {
        match a {
            FieldElement::Compact(0) => true,
            _ => self.to_biguint(a).is_zero(),
        }
    }

    pub fn equals(&self, a: &FieldElement, b: &FieldElement) -> bool {
        match (a, b) {
            (FieldElement::Compact(x), FieldElement::Compact(y)) if x == y => true,
            _ => self.to_biguint(a) == self.to_biguint(b),
        }
    }

    // ====================================
    // arithmetics
    // ====================================

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) + self.to_biguint(b))
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) + &self.q - self.to_biguint(b))
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        self.from_biguint(&self.q - self.to_biguint(a))
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) * self.to_biguint(b))
    }

    #[inline(always)]
    pub fn square(&self, a: &FieldElement) -> FieldElement {
        self.mul(a, a)
    }

    /// Multiplicative inverse via Fermat's little theorem.
    pub fn inv(&self, a: &FieldElement) -> Result<FieldElement> {
        let x = self.to_biguint(a);
        if x.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let e = &self.q - BigUint::from(2u32);
        Ok(self.from_biguint(x.modpow(&e, &self.q)))
    }

    pub fn div(&self, a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
        let inv = self.inv(b)?;
        Ok(self.mul(a, &inv))
    }

    // ====================================
    // comparisons, results are 0 or 1
    // ====================================

    pub fn eq(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.equals(a, b).into()
    }

    pub fn neq(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (!self.equals(a, b)).into()
    }

    pub fn lt(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (self.to_biguint(a) < self.to_biguint(b)).into()
    }

    pub fn gt(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (self.to_biguint(a) > self.to_biguint(b)).into()
    }

    pub fn leq(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (self.to_biguint(a) <= self.to_biguint(b)).into()
    }

    pub fn geq(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (self.to_biguint(a) >= self.to_biguint(b)).into()
    }

    pub fn land(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (!self.is_zero(a) && !self.is_zero(b)).into()
    }

    pub fn lor(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (!self.is_zero(a) || !self.is_zero(b)).into()
    }

    pub fn lnot(&self, a: &FieldElement) -> FieldElement {
        self.is_zero(a).into()
    }
}
