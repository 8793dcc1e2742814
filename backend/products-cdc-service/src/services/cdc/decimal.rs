//! Debezium `Decimal` / `VariableScaleDecimal` decoding
//!
//! Debezium serialises `NUMERIC` columns (with `decimal.handling.mode=precise`)
//! as the base64 text of the unscaled value's big-endian two's-complement bytes,
//! alongside a scale. The value is `unscaled / 10^scale`.
//!
//! Decoding is exact: the unscaled value is an arbitrary-precision integer and
//! the scale is applied by shifting its decimal digits, never by float
//! arithmetic. Conversion to `f64` happens last, as a correctly rounded parse of
//! the exact digits. Callers that need the exact value should use
//! [`ExactDecimal`] instead of the `f64`.

use std::fmt::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_bigint::BigInt;
use num_traits::Signed;
use thiserror::Error;
use tracing::warn;

/// Digits below 10^-330 are beneath the smallest subnormal `f64`.
const F64_NEGLIGIBLE_EXPONENT: u64 = 330;

#[derive(Debug, Error)]
pub enum DecimalDecodeError {
    #[error("invalid base64 in decimal value: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// An exact decimal `unscaled * 10^-scale`.
///
/// Equality is structural: `10.50` (1050, 2) and `10.5` (105, 1) compare unequal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactDecimal {
    unscaled: BigInt,
    scale: u32,
}

impl ExactDecimal {
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    /// Build from two's-complement big-endian bytes. An empty slice is zero.
    pub fn from_signed_bytes_be(bytes: &[u8], scale: u32) -> Self {
        Self::new(BigInt::from_signed_bytes_be(bytes), scale)
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Nearest `f64` to the exact value.
    pub fn to_f64(&self) -> f64 {
        // upper bound on the decimal digit count of the unscaled magnitude
        let max_digits = (self.unscaled.bits() as f64 * std::f64::consts::LOG10_2) as u64 + 1;
        if u64::from(self.scale) > max_digits + F64_NEGLIGIBLE_EXPONENT {
            return if self.unscaled.is_negative() { -0.0 } else { 0.0 };
        }
        // Rust's float parser is correctly rounded for arbitrarily long input,
        // so going through the exact digits never rounds twice.
        self.to_string().parse().unwrap_or(0.0)
    }

    /// Encode back into the Debezium wire form (minimal two's-complement bytes).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.unscaled.to_signed_bytes_be())
    }
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_str_radix(10);
        let scale = self.scale as usize;

        if self.unscaled.is_negative() {
            f.write_char('-')?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            return write!(f, "{}.{}", integer, fraction);
        }

        f.write_str("0.")?;
        for _ in digits.len()..scale {
            f.write_char('0')?;
        }
        f.write_str(&digits)
    }
}

/// Result of a best-effort decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDecimal {
    pub value: f64,
    /// `None` when the encoded bytes were unreadable and `value` is the zero fallback.
    pub exact: Option<ExactDecimal>,
}

impl DecodedDecimal {
    pub fn is_fallback(&self) -> bool {
        self.exact.is_none()
    }
}

/// Decode to an exact decimal, failing on malformed base64.
pub fn try_decode_decimal(encoded: &str, scale: u32) -> Result<ExactDecimal, DecimalDecodeError> {
    let bytes = STANDARD.decode(encoded)?;
    Ok(ExactDecimal::from_signed_bytes_be(&bytes, scale))
}

/// Decode, substituting zero when the base64 text is malformed.
///
/// A corrupt price must not stop the surrounding event from being reported.
pub fn decode(encoded: &str, scale: u32) -> DecodedDecimal {
    match try_decode_decimal(encoded, scale) {
        Ok(exact) => DecodedDecimal {
            value: exact.to_f64(),
            exact: Some(exact),
        },
        Err(e) => {
            warn!(encoded = %encoded, scale, error = %e, "Falling back to zero for undecodable decimal");
            DecodedDecimal {
                value: 0.0,
                exact: None,
            }
        }
    }
}

/// `f64` approximation of `unscaled / 10^scale`; `0.0` for malformed input.
pub fn decode_decimal(encoded: &str, scale: u32) -> f64 {
    decode(encoded, scale).value
}
