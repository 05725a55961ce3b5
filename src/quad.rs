//! Decoding of IEEE 754-2008 binary128 ("quad precision") bit patterns
//! into arbitrary-precision decimals.
//!
//! Every finite binary128 value is an integer multiple of a power of
//! two and therefore exactly representable as a decimal, so the
//! conversion below is lossless for finite inputs. The two non-finite
//! classes have no decimal counterpart and receive documented
//! substitutes: an infinity becomes the format's maximum finite
//! magnitude with matching sign, and a NaN becomes exact zero.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

const EXPONENT_BIAS: i64 = 16383;
const FRACTION_BITS: u32 = 112;
const EXPONENT_MASK: u64 = 0x7FFF;

/// Decode a logical 128-bit pattern (sign in bit 127, 15 exponent bits,
/// 112 fraction bits) into its decimal value.
pub fn decode_binary128(bits: u128) -> BigDecimal {
    let negative = (bits >> 127) & 1 == 1;
    let exponent = ((bits >> FRACTION_BITS) as u64) & EXPONENT_MASK;
    let fraction = bits & ((1u128 << FRACTION_BITS) - 1);

    let magnitude = match (exponent, fraction) {
        (0, 0) => BigDecimal::zero(),
        // subnormal: no implicit leading 1
        (0, f) => scaled_pow2(BigInt::from(f), 1 - EXPONENT_BIAS - i64::from(FRACTION_BITS)),
        (EXPONENT_MASK, 0) => max_finite(),
        (EXPONENT_MASK, _) => return BigDecimal::zero(),
        (e, f) => {
            let mantissa = BigInt::from((1u128 << FRACTION_BITS) | f);
            scaled_pow2(mantissa, e as i64 - EXPONENT_BIAS - i64::from(FRACTION_BITS))
        }
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// The largest finite binary128 magnitude, `2^16383 * (2 - 2^-112)`,
/// which stands in for infinities.
pub fn max_finite() -> BigDecimal {
    let mantissa = (BigInt::from(1) << 113) - 1;
    BigDecimal::from(mantissa << 16271)
}

/// `mantissa * 2^exp2` as an exact decimal. Negative powers of two are
/// expressed as `mantissa * 5^k * 10^-k`.
fn scaled_pow2(mantissa: BigInt, exp2: i64) -> BigDecimal {
    if exp2 >= 0 {
        BigDecimal::from(mantissa << exp2 as usize)
    } else {
        let k = (-exp2) as usize;
        BigDecimal::new(mantissa * num_traits::pow(BigInt::from(5), k), k as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_binary128, max_finite};
    use bigdecimal::BigDecimal;
    use num_bigint::BigInt;
    use num_traits::Zero;

    fn pattern(sign: u8, exponent: u64, fraction: u128) -> u128 {
        (u128::from(sign) << 127) | (u128::from(exponent) << 112) | fraction
    }

    #[test]
    fn zeros() {
        assert_eq!(decode_binary128(0), BigDecimal::zero());
        // negative zero folds to plain zero
        assert_eq!(decode_binary128(pattern(1, 0, 0)), BigDecimal::zero());
    }

    #[test]
    fn small_integers() {
        // 1.0: biased exponent 16383, empty fraction
        assert_eq!(decode_binary128(pattern(0, 16383, 0)), BigDecimal::from(1));
        // -2.0
        assert_eq!(decode_binary128(pattern(1, 16384, 0)), BigDecimal::from(-2));
        // 1.5: fraction's top bit set
        assert_eq!(
            decode_binary128(pattern(0, 16383, 1 << 111)),
            BigDecimal::new(BigInt::from(15), 1)
        );
    }

    #[test]
    fn smallest_subnormal() {
        // 2^-16494 = 5^16494 * 10^-16494
        let expected = BigDecimal::new(num_traits::pow(BigInt::from(5), 16494), 16494);
        assert_eq!(decode_binary128(pattern(0, 0, 1)), expected);
    }

    #[test]
    fn infinity_becomes_max_finite() {
        let pos = decode_binary128(pattern(0, 0x7FFF, 0));
        assert_eq!(pos, max_finite());
        // 2^16383 * (2 - 2^-112) == 2^16384 - 2^16271
        let alt = BigDecimal::from((BigInt::from(1) << 16384) - (BigInt::from(1) << 16271));
        assert_eq!(pos, alt);
        let neg = decode_binary128(pattern(1, 0x7FFF, 0));
        assert_eq!(neg, -max_finite());
    }

    #[test]
    fn nan_becomes_zero() {
        assert_eq!(decode_binary128(pattern(0, 0x7FFF, 1)), BigDecimal::zero());
        assert_eq!(
            decode_binary128(pattern(1, 0x7FFF, 1 << 111)),
            BigDecimal::zero()
        );
    }
}
