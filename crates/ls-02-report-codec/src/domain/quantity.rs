//! Hex quantities.
//!
//! Amounts are rendered the way the ledger's tooling renders big numbers:
//! lowercase, `0x` prefixed, an even number of digits, `0x00` for zero and a
//! leading `-` for negatives.

use crate::error::{CodecError, CodecResult};

/// Render an amount as a hex quantity.
pub fn to_hex_quantity(value: i128) -> String {
    let mut digits = format!("{:x}", value.unsigned_abs());
    if digits.len() % 2 == 1 {
        digits.insert(0, '0');
    }
    if value < 0 {
        format!("-0x{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Parse a hex quantity back into an amount.
pub fn parse_hex_quantity(value: &str) -> CodecResult<i128> {
    let invalid = |reason: &str| CodecError::InvalidQuantity {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix"))?;
    if digits.is_empty() {
        return Err(invalid("no digits"));
    }

    let magnitude =
        u128::from_str_radix(digits, 16).map_err(|e| invalid(&e.to_string()))?;

    if negative {
        0i128
            .checked_sub_unsigned(magnitude)
            .ok_or_else(|| invalid("out of range"))
    } else {
        i128::try_from(magnitude).map_err(|_| invalid("out of range"))
    }
}
