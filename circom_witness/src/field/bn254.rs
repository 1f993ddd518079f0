use ethnum::U256;

use super::FieldContext;

/// Scalar field modulus of BN254.
pub const MODULUS: U256 = U256::from_words(
    0x30644e72e131a029b85045b68181585d,
    0x2833e84879b9709143e1f593f0000001,
);

/// Width in bytes of a field element in the witness file.
pub const FIELD_BYTES: usize = 32;

impl FieldContext {
    pub fn bn254() -> Self {
        // MODULUS is a fixed odd prime, the checks in `new` cannot fail for it
        match FieldContext::new(MODULUS) {
            Ok(ctx) => ctx,
            Err(_) => unreachable!("bn254 modulus is valid"),
        }
    }
}
