//! Solidity integer variants and range validation

use std::fmt;
use std::str::FromStr;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A Solidity integer type: signedness and a bit width in `8..=256`, step 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegerVariant {
    signed: bool,
    bits: u16,
}

impl IntegerVariant {
    pub const UINT256: IntegerVariant = IntegerVariant {
        signed: false,
        bits: 256,
    };

    /// Returns `None` unless `bits` is a positive multiple of 8 not exceeding 256
    pub fn new(signed: bool, bits: u16) -> Option<Self> {
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return None;
        }
        Some(Self { signed, bits })
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// Largest representable value
    pub fn max_value(&self) -> U256 {
        let width = if self.signed { self.bits - 1 } else { self.bits };
        if width == 256 {
            U256::MAX
        } else {
            (U256::from(1u8) << width as usize) - U256::from(1u8)
        }
    }

    /// Magnitude of the smallest representable value (zero for unsigned)
    pub fn min_magnitude(&self) -> U256 {
        if self.signed {
            U256::from(1u8) << (self.bits - 1) as usize
        } else {
            U256::ZERO
        }
    }

    /// Whether an already-coerced integer fits this variant
    pub fn contains(&self, value: &BigInteger) -> bool {
        if value.is_negative() {
            self.signed && value.magnitude <= self.min_magnitude()
        } else {
            value.magnitude <= self.max_value()
        }
    }
}

impl fmt::Display for IntegerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { "int" } else { "uint" };
        write!(f, "{}{}", prefix, self.bits)
    }
}

impl FromStr for IntegerVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (signed, digits) = if let Some(rest) = s.strip_prefix("uint") {
            (false, rest)
        } else if let Some(rest) = s.strip_prefix("int") {
            (true, rest)
        } else {
            return Err(format!("not an integer type: {s}"));
        };

        // `uint` / `int` are aliases for the 256-bit variants
        let bits = if digits.is_empty() {
            256
        } else {
            digits
                .parse::<u16>()
                .map_err(|_| format!("invalid bit width in {s}"))?
        };

        IntegerVariant::new(signed, bits).ok_or_else(|| format!("unsupported bit width in {s}"))
    }
}

/// Sign-magnitude integer wide enough for every on-chain integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BigInteger {
    negative: bool,
    magnitude: U256,
}

impl BigInteger {
    pub fn new(negative: bool, magnitude: U256) -> Self {
        // -0 is 0
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn positive(magnitude: U256) -> Self {
        Self::new(false, magnitude)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// Value as `i64` when it lies within ±(2^53 - 1)
    pub fn as_safe_integer(&self) -> Option<i64> {
        const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;
        if self.magnitude > U256::from(MAX_SAFE_INTEGER) {
            return None;
        }
        let value = self.magnitude.to::<u64>() as i64;
        Some(if self.negative { -value } else { value })
    }

    /// Multiply by 10^18, `None` on overflow past 256 bits
    pub fn scale_to_wei(&self) -> Option<BigInteger> {
        let factor = U256::from(10u64).pow(U256::from(18u64));
        self.magnitude
            .checked_mul(factor)
            .map(|magnitude| BigInteger::new(self.negative, magnitude))
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// Outcome of coercing user text to an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// The text is not an integer literal
    NotInteger,
    /// An integer whose magnitude needs more than 256 bits
    Overflow,
    Value(BigInteger),
}

/// Coerce text the way a big-integer constructor would: surrounding whitespace
/// is ignored, empty text is zero, decimals may carry a sign, and `0x`/`0o`/`0b`
/// literals must be unsigned.
pub fn coerce_integer(value: &str) -> Coercion {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Coercion::Value(BigInteger::default());
    }

    let radix_literal = [("0x", 16u64), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|rest| (rest, *radix)));

    if let Some((digits, radix)) = radix_literal {
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix as u32)) {
            return Coercion::NotInteger;
        }
        return match U256::from_str_radix(digits, radix) {
            Ok(magnitude) => Coercion::Value(BigInteger::positive(magnitude)),
            Err(_) => Coercion::Overflow,
        };
    }

    let (negative, digits) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Coercion::NotInteger;
    }
    match U256::from_str_radix(digits, 10) {
        Ok(magnitude) => Coercion::Value(BigInteger::new(negative, magnitude)),
        Err(_) => Coercion::Overflow,
    }
}

/// Plain-number grammar: digits with an optional fractional part, and an
/// optional leading `-` when `allow_sign` is set
pub fn is_plain_number(value: &str, allow_sign: bool) -> bool {
    let body = match value.strip_prefix('-') {
        Some(rest) if allow_sign => rest,
        Some(_) => return false,
        None => value,
    };
    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.map_or(true, all_digits)
}

/// Decide whether `value` is acceptable for `variant`.
///
/// With `strict` unset, text that is not yet an integer is tolerated while it
/// still looks like a number being typed (including a lone `-` on signed
/// variants), so a field only turns invalid once the input is definitely wrong.
pub fn is_valid_integer(variant: IntegerVariant, value: &str, strict: bool) -> bool {
    match coerce_integer(value) {
        Coercion::Value(integer) => variant.contains(&integer),
        Coercion::Overflow => false,
        Coercion::NotInteger => {
            if strict {
                return false;
            }
            if value.is_empty() {
                return true;
            }
            if variant.is_signed() {
                is_plain_number(value, true) || value == "-"
            } else {
                is_plain_number(value, false)
            }
        }
    }
}

/// Scale a decimal amount (`"1.5"`) or integer literal by 10^18 exactly
pub fn multiply_by_1e18(value: &str) -> Option<BigInteger> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Coercion::Value(integer) = coerce_integer(trimmed) {
        return integer.scale_to_wei();
    }
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if !is_plain_number(body, false) {
        return None;
    }
    parse_ether(body)
        .ok()
        .map(|magnitude| BigInteger::new(negative, magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POW_256: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639936";

    fn variant(s: &str) -> IntegerVariant {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(variant("uint8"), IntegerVariant::new(false, 8).unwrap());
        assert_eq!(variant("int256"), IntegerVariant::new(true, 256).unwrap());
        assert_eq!(variant("uint"), IntegerVariant::UINT256);
        assert!("uint7".parse::<IntegerVariant>().is_err());
        assert!("uint264".parse::<IntegerVariant>().is_err());
        assert!("int0".parse::<IntegerVariant>().is_err());
        assert!("address".parse::<IntegerVariant>().is_err());
        assert_eq!(variant("int24").to_string(), "int24");
    }

    #[test]
    fn test_literal_bounds() {
        assert!(!is_valid_integer(variant("uint8"), "256", true));
        assert!(is_valid_integer(variant("uint8"), "255", true));
        assert!(!is_valid_integer(variant("int8"), "-129", true));
        assert!(is_valid_integer(variant("int8"), "-128", true));
        assert!(is_valid_integer(variant("int8"), "127", true));
        assert!(!is_valid_integer(variant("int8"), "128", true));
    }

    #[test]
    fn test_every_variant_bounds() {
        for bits in (8u16..=256).step_by(8) {
            let unsigned = IntegerVariant::new(false, bits).unwrap();
            let max = unsigned.max_value();
            assert!(is_valid_integer(unsigned, "0", true));
            assert!(is_valid_integer(unsigned, &max.to_string(), true), "uint{bits} max");
            assert!(!is_valid_integer(unsigned, "-1", true), "uint{bits} -1");
            let above = match max.checked_add(U256::from(1u8)) {
                Some(v) => v.to_string(),
                // 2^256 needs 257 bits
                None => TWO_POW_256.to_string(),
            };
            assert!(!is_valid_integer(unsigned, &above, true), "uint{bits} max+1");

            let signed = IntegerVariant::new(true, bits).unwrap();
            let max = signed.max_value();
            let min = signed.min_magnitude();
            assert!(is_valid_integer(signed, &max.to_string(), true), "int{bits} max");
            assert!(is_valid_integer(signed, &format!("-{min}"), true), "int{bits} min");
            assert!(
                !is_valid_integer(signed, &(max + U256::from(1u8)).to_string(), true),
                "int{bits} max+1"
            );
            assert!(
                !is_valid_integer(signed, &format!("-{}", min + U256::from(1u8)), true),
                "int{bits} min-1"
            );
        }
    }

    #[test]
    fn test_uint256_overflow_is_invalid() {
        let too_big = TWO_POW_256;
        assert_eq!(coerce_integer(too_big), Coercion::Overflow);
        assert!(!is_valid_integer(IntegerVariant::UINT256, too_big, true));
        assert!(!is_valid_integer(IntegerVariant::UINT256, too_big, false));
    }

    #[test]
    fn test_lenient_mode_tolerates_partial_input() {
        let int8 = variant("int8");
        let uint8 = variant("uint8");
        assert!(is_valid_integer(int8, "", false));
        assert!(is_valid_integer(int8, "-", false));
        assert!(is_valid_integer(uint8, "1.5", false));
        assert!(is_valid_integer(int8, "-1.5", false));
        assert!(!is_valid_integer(uint8, "-", false));
        assert!(!is_valid_integer(uint8, "-1.5", false));
        assert!(!is_valid_integer(uint8, "abc", false));
        assert!(!is_valid_integer(int8, "1.", false));

        assert!(!is_valid_integer(int8, "-", true));
        assert!(!is_valid_integer(uint8, "1.5", true));
    }

    #[test]
    fn test_coercion_grammar() {
        assert_eq!(coerce_integer(""), Coercion::Value(BigInteger::default()));
        assert_eq!(
            coerce_integer(" 0xff "),
            Coercion::Value(BigInteger::positive(U256::from(255u64)))
        );
        assert_eq!(
            coerce_integer("0b101"),
            Coercion::Value(BigInteger::positive(U256::from(5u64)))
        );
        assert_eq!(coerce_integer("-0x1"), Coercion::NotInteger);
        assert_eq!(coerce_integer("0x"), Coercion::NotInteger);
        assert_eq!(coerce_integer("1e3"), Coercion::NotInteger);
        assert_eq!(
            coerce_integer("-0"),
            Coercion::Value(BigInteger::default())
        );
        assert!(is_valid_integer(variant("uint8"), "-0", true));
    }

    #[test]
    fn test_multiply_by_1e18() {
        let one_and_half = multiply_by_1e18("1.5").unwrap();
        assert_eq!(one_and_half.to_string(), "1500000000000000000");
        assert_eq!(multiply_by_1e18("-2").unwrap().to_string(), "-2000000000000000000");
        assert!(multiply_by_1e18("").is_none());
        assert!(multiply_by_1e18("abc").is_none());
        assert!(multiply_by_1e18(&U256::MAX.to_string()).is_none());
    }

    #[test]
    fn test_safe_integer() {
        let max_safe = BigInteger::positive(U256::from(9_007_199_254_740_991u64));
        assert_eq!(max_safe.as_safe_integer(), Some(9_007_199_254_740_991));
        let unsafe_value = BigInteger::positive(U256::from(9_007_199_254_740_992u64));
        assert_eq!(unsafe_value.as_safe_integer(), None);
        assert_eq!(
            BigInteger::new(true, U256::from(42u64)).as_safe_integer(),
            Some(-42)
        );
    }
}
