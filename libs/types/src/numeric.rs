//! Fractional price notation codec
//!
//! Treasury prices are quoted as `I-XYz`: whole points `I`, 32nds `XY`
//! (two digits) and an eighth-of-a-32nd residue `z`, where `+` stands for
//! 4/8. One tick is therefore 1/256 of a point.
//!
//! Prices are held as `Decimal` so every tick is exactly representable and
//! `price_to_frac(frac_to_price(s)) == s` holds for every encoder output.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::PriceFormatError;

/// Ticks per whole price point.
pub const TICKS_PER_POINT: u32 = 256;

/// Ticks per 32nd.
const TICKS_PER_32ND: u32 = 8;

/// Residue digit rendered as `+`.
const HALF_RESIDUE: u32 = 4;

/// Build a price from a count of 1/256 ticks.
pub fn price_from_ticks(ticks: u64) -> Decimal {
    Decimal::from(ticks) / Decimal::from(TICKS_PER_POINT)
}

/// Decode `I-XYz` notation into a decimal price.
pub fn frac_to_price(text: &str) -> Result<Decimal, PriceFormatError> {
    let (whole, frac) = text
        .split_once('-')
        .ok_or_else(|| PriceFormatError::MissingSeparator(text.to_string()))?;

    if frac.len() != 3 {
        return Err(PriceFormatError::FractionLength(text.to_string()));
    }
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PriceFormatError::InvalidDigits(text.to_string()));
    }
    let whole: u64 = whole
        .parse()
        .map_err(|_| PriceFormatError::InvalidDigits(text.to_string()))?;

    let bytes = frac.as_bytes();
    if !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return Err(PriceFormatError::InvalidDigits(text.to_string()));
    }
    let thirty_seconds = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
    if thirty_seconds >= TICKS_PER_POINT / TICKS_PER_32ND {
        return Err(PriceFormatError::ThirtySecondsOutOfRange(text.to_string()));
    }

    let residue = match bytes[2] {
        b'+' => HALF_RESIDUE,
        b @ b'0'..=b'7' => u32::from(b - b'0'),
        _ => return Err(PriceFormatError::InvalidDigits(text.to_string())),
    };

    let ticks = u64::from(thirty_seconds * TICKS_PER_32ND + residue);
    Ok(Decimal::from(whole) + price_from_ticks(ticks))
}

/// Encode a decimal price as `I-XYz`.
///
/// Sub-tick remainders are truncated toward the lower tick.
pub fn price_to_frac(price: Decimal) -> String {
    let whole = price.floor();
    let ticks = ((price - whole) * Decimal::from(TICKS_PER_POINT))
        .floor()
        .to_u32()
        .unwrap_or_default();

    let thirty_seconds = ticks / TICKS_PER_32ND;
    let residue = ticks % TICKS_PER_32ND;

    let residue = if residue == HALF_RESIDUE {
        "+".to_string()
    } else {
        residue.to_string()
    };

    format!("{}-{:02}{}", whole.normalize(), thirty_seconds, residue)
}
