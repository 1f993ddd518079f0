use num_bigint::BigUint;

use super::{FieldContext, FieldElement};
use crate::utils::error::{Error, Result};

pub const SUPPORTED_BASES: [u32; 4] = [2, 8, 10, 16];

fn is_digit(c: u8, base: u32) -> bool {
    match base {
        16 => c.is_ascii_hexdigit(),
        _ => c.is_ascii_digit() && u32::from(c - b'0') < base,
    }
}

impl FieldContext {
    /// Parses an unsigned literal in the given base and reduces it mod q.
    pub fn parse(&self, s: &str, base: u32) -> Result<FieldElement> {
        if !SUPPORTED_BASES.contains(&base) {
            return Err(Error::Unsupported(format!("literal base {}", base)));
        }
        let invalid = || Error::InvalidLiteral {
            literal: s.to_string(),
            base,
        };
        if s.is_empty() || !s.bytes().all(|c| is_digit(c, base)) {
            return Err(invalid());
        }
        let v = BigUint::parse_bytes(s.as_bytes(), base).ok_or_else(invalid)?;
        Ok(self.from_biguint(v))
    }

    /// Parses a literal with an optional `0b`, `0o` or `0x` prefix; anything
    /// else is read as decimal.
    pub fn parse_literal(&self, s: &str) -> Result<FieldElement> {
        let (digits, base) = match s.get(..2) {
            Some("0b") | Some("0B") => (&s[2..], 2),
            Some("0o") | Some("0O") => (&s[2..], 8),
            Some("0x") | Some("0X") => (&s[2..], 16),
            _ => (s, 10),
        };
        self.parse(digits, base)
    }

    pub fn to_decimal_string(&self, a: &FieldElement) -> String {
        self.to_biguint(a).to_str_radix(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_parse_bases() {
        let ctx = FieldContext::bn254();
        for (s, base) in [("101010", 2), ("52", 8), ("42", 10), ("2a", 16), ("2A", 16)] {
            let v = ctx.parse(s, base).unwrap();
            assert_eq!(ctx.to_decimal_string(&v), "42");
        }
        assert_eq!(
            ctx.to_decimal_string(&ctx.parse_literal("0x1F").unwrap()),
            "31"
        );
        assert_eq!(
            ctx.to_decimal_string(&ctx.parse_literal("0O17").unwrap()),
            "15"
        );
        assert_eq!(
            ctx.to_decimal_string(&ctx.parse_literal("0b11").unwrap()),
            "3"
        );
        assert_eq!(
            ctx.to_decimal_string(&ctx.parse_literal("0").unwrap()),
            "0"
        );
    }

    #[test]
    fn test_parse_reduces() {
        let ctx = FieldContext::bn254();
        let q = ctx.modulus().to_string();
        assert_eq!(ctx.to_decimal_string(&ctx.parse(&q, 10).unwrap()), "0");
        let q_plus_one = (ctx.modulus() + ethnum::U256::ONE).to_string();
        assert_eq!(ctx.to_decimal_string(&ctx.parse(&q_plus_one, 10).unwrap()), "1");
    }

    #[test]
    fn test_parse_rejects() {
        let ctx = FieldContext::bn254();
        for (s, base) in [
            ("102", 2),
            ("8", 8),
            ("12a", 10),
            ("0xg", 16),
            ("", 10),
            ("-5", 10),
            ("1_000", 10),
            ("+1", 10),
            (" 1", 10),
        ] {
            assert!(
                matches!(ctx.parse(s, base), Err(Error::InvalidLiteral { .. })),
                "{:?} base {}",
                s,
                base
            );
        }
        assert!(matches!(ctx.parse("1", 3), Err(Error::Unsupported(_))));
        assert!(matches!(
            ctx.parse_literal("0x"),
            Err(Error::InvalidLiteral { base: 16, .. })
        ));
    }

    #[test]
    fn test_round_trip_random() {
        let ctx = FieldContext::bn254();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let n = BigUint::from_bytes_le(&bytes);
            let expected = (&n % BigUint::from_bytes_le(&ctx.modulus().to_le_bytes())).to_string();
            for base in SUPPORTED_BASES {
                let v = ctx.parse(&n.to_str_radix(base), base).unwrap();
                assert_eq!(ctx.to_decimal_string(&v), expected);
            }
        }
    }
}
