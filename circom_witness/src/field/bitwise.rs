use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::{FieldContext, FieldElement};
use crate::utils::error::{Error, Result};

impl FieldContext {
    pub fn pow(&self, a: &FieldElement, e: &FieldElement) -> FieldElement {
        let a = self.to_biguint(a);
        let e = self.to_biguint(e);
        self.from_biguint(a.modpow(&e, &self.q))
    }

    pub fn band(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) & self.to_biguint(b))
    }

    pub fn bor(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) | self.to_biguint(b))
    }

    pub fn bxor(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) ^ self.to_biguint(b))
    }

    /// Complement within the bit width of the modulus.
    pub fn bnot(&self, a: &FieldElement) -> FieldElement {
        self.from_biguint(self.to_biguint(a) ^ &self.mask)
    }

    /// `a << k`. A shift amount above `q / 2` is read as negative and
    /// shifts right by `q - k` instead.
    pub fn shl(&self, a: &FieldElement, k: &FieldElement) -> FieldElement {
        let k = self.to_biguint(k);
        if k > self.half {
            let amount = &self.q - k;
            self.shift_right(a, &amount)
        } else {
            self.shift_left(a, &k)
        }
    }

    /// `a >> k`, with the same sign convention for `k` as [`Self::shl`].
    pub fn shr(&self, a: &FieldElement, k: &FieldElement) -> FieldElement {
        let k = self.to_biguint(k);
        if k > self.half {
            let amount = &self.q - k;
            self.shift_left(a, &amount)
        } else {
            self.shift_right(a, &k)
        }
    }

    fn shift_amount(&self, k: &BigUint) -> Option<u32> {
        k.to_u32().filter(|k| *k < self.bits)
    }

    fn shift_left(&self, a: &FieldElement, k: &BigUint) -> FieldElement {
        match self.shift_amount(k) {
            Some(k) => self.from_biguint((self.to_biguint(a) << k) & &self.mask),
            None => self.zero(),
        }
    }

    fn shift_right(&self, a: &FieldElement, k: &BigUint) -> FieldElement {
        match self.shift_amount(k) {
            Some(k) => self.from_biguint(self.to_biguint(a) >> k),
            None => self.zero(),
        }
    }

    /// Integer division of the canonical representatives.
    pub fn idiv(&self, a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
        let b = self.to_biguint(b);
        if b.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(self.from_biguint(self.to_biguint(a) / b))
    }

    /// Integer remainder of the canonical representatives.
    pub fn rem(&self, a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
        let b = self.to_biguint(b);
        if b.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(self.from_biguint(self.to_biguint(a) % b))
    }
}
