//! Datetime codecs: five storage layouts, all UTC, with no time-zone offset.
//!
//! Every layout counts from the same fixed epoch, 0000-03-01:
//!
//! - [`decode_epoch_micros`]: i64 microseconds since the epoch (±290,000
//!   years).
//! - [`pack`] / [`unpack`]: i64 bit-packed date/time fields (±131,000 years).
//! - [`decode_time_of_day`]: i32 milliseconds since midnight.
//! - [`decode_date_days`]: i32 days since the epoch (±245,000 years).
//! - [`decode_year_month`]: i16 months since the epoch (up to year 2730).
//!   Chosen so that adding and subtracting whole months or years stays exact,
//!   which day-granular layouts cannot offer since month lengths vary.
//!
//! The NA sentinel of every layout is the width's minimum signed value.

use colbuf_common::{Result, error::Error};
use colbuf_types::na::{NA_I16, NA_I32, NA_I64};

/// One decomposed timestamp, matching the bit-packed layout field for field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeFields {
    /// Calendar year, signed; 18 bits in the packed layout.
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub microsecond: u16,
}

/// Inclusive bounds of the packed layout's signed 18-bit year field.
pub const PACKED_YEAR_MIN: i32 = -(1 << 17);
pub const PACKED_YEAR_MAX: i32 = (1 << 17) - 1;

// Bit offsets of each field within the packed i64, least significant first:
// microsecond(10) millisecond(10) second(6) minute(6) hour(5) day(5)
// month(4) year(18, signed).
const MICROSECOND_SHIFT: u32 = 0;
const MILLISECOND_SHIFT: u32 = 10;
const SECOND_SHIFT: u32 = 20;
const MINUTE_SHIFT: u32 = 26;
const HOUR_SHIFT: u32 = 32;
const DAY_SHIFT: u32 = 37;
const MONTH_SHIFT: u32 = 42;
const YEAR_SHIFT: u32 = 46;

fn verify_field(name: &str, value: u32, bits: u32) -> Result<()> {
    if value >= (1 << bits) {
        return Err(Error::malformed_layout(
            "i8w",
            format!("{name} {value} does not fit its {bits}-bit field"),
        ));
    }
    Ok(())
}

/// Packs decomposed date/time fields into the i64 bit layout.
///
/// Every field is validated against its declared bit width; a value outside
/// that range is a malformed layout, never silently truncated. One otherwise
/// valid tuple is also rejected: year `PACKED_YEAR_MIN` with every other
/// field zero packs to `i64::MIN`, the NA sentinel, and must not be storable
/// as a present value. Over accepted tuples, [`unpack`] is the exact inverse.
pub fn pack(fields: &DateTimeFields) -> Result<i64> {
    if fields.year < PACKED_YEAR_MIN || fields.year > PACKED_YEAR_MAX {
        return Err(Error::malformed_layout(
            "i8w",
            format!("year {} does not fit its signed 18-bit field", fields.year),
        ));
    }
    verify_field("month", fields.month as u32, 4)?;
    verify_field("day", fields.day as u32, 5)?;
    verify_field("hour", fields.hour as u32, 5)?;
    verify_field("minute", fields.minute as u32, 6)?;
    verify_field("second", fields.second as u32, 6)?;
    verify_field("millisecond", fields.millisecond as u32, 10)?;
    verify_field("microsecond", fields.microsecond as u32, 10)?;

    let packed = ((fields.year as i64) << YEAR_SHIFT)
        | ((fields.month as i64) << MONTH_SHIFT)
        | ((fields.day as i64) << DAY_SHIFT)
        | ((fields.hour as i64) << HOUR_SHIFT)
        | ((fields.minute as i64) << MINUTE_SHIFT)
        | ((fields.second as i64) << SECOND_SHIFT)
        | ((fields.millisecond as i64) << MILLISECOND_SHIFT)
        | ((fields.microsecond as i64) << MICROSECOND_SHIFT);
    if packed == NA_I64 {
        return Err(Error::malformed_layout(
            "i8w",
            format!(
                "year {} with all other fields zero packs to the NA sentinel",
                fields.year
            ),
        ));
    }
    Ok(packed)
}

/// Unpacks an i64 bit layout back into its date/time fields.
///
/// Any bit pattern decomposes into fields within their declared widths; the
/// year is sign-extended from its 18-bit field.
pub fn unpack(packed: i64) -> DateTimeFields {
    DateTimeFields {
        year: (packed >> YEAR_SHIFT) as i32,
        month: ((packed >> MONTH_SHIFT) & 0xF) as u8,
        day: ((packed >> DAY_SHIFT) & 0x1F) as u8,
        hour: ((packed >> HOUR_SHIFT) & 0x1F) as u8,
        minute: ((packed >> MINUTE_SHIFT) & 0x3F) as u8,
        second: ((packed >> SECOND_SHIFT) & 0x3F) as u8,
        millisecond: ((packed >> MILLISECOND_SHIFT) & 0x3FF) as u16,
        microsecond: ((packed >> MICROSECOND_SHIFT) & 0x3FF) as u16,
    }
}

/// Decodes a packed timestamp, `None` for NA.
///
/// The sentinel can never collide with a value accepted by [`pack`]: the one
/// field tuple whose bits equal `i64::MIN` is rejected at encode time.
#[inline]
pub fn decode_packed(stored: i64) -> Option<DateTimeFields> {
    if stored == NA_I64 {
        return None;
    }
    Some(unpack(stored))
}

/// Encodes an optional field tuple into the packed storage value.
pub fn encode_packed(fields: Option<&DateTimeFields>) -> Result<i64> {
    match fields {
        Some(fields) => pack(fields),
        None => Ok(NA_I64),
    }
}

/// Decodes a microseconds-since-epoch timestamp, `None` for NA.
#[inline]
pub fn decode_epoch_micros(stored: i64) -> Option<i64> {
    (stored != NA_I64).then_some(stored)
}

#[inline]
pub fn encode_epoch_micros(value: Option<i64>) -> i64 {
    value.unwrap_or(NA_I64)
}

/// Decodes a milliseconds-since-midnight time, `None` for NA.
#[inline]
pub fn decode_time_of_day(stored: i32) -> Option<i32> {
    (stored != NA_I32).then_some(stored)
}

#[inline]
pub fn encode_time_of_day(value: Option<i32>) -> i32 {
    value.unwrap_or(NA_I32)
}

/// Decodes a days-since-epoch date, `None` for NA.
#[inline]
pub fn decode_date_days(stored: i32) -> Option<i32> {
    (stored != NA_I32).then_some(stored)
}

#[inline]
pub fn encode_date_days(value: Option<i32>) -> i32 {
    value.unwrap_or(NA_I32)
}

/// Decodes a months-since-epoch value, `None` for NA.
#[inline]
pub fn decode_year_month(stored: i16) -> Option<i16> {
    (stored != NA_I16).then_some(stored)
}

#[inline]
pub fn encode_year_month(value: Option<i16>) -> i16 {
    value.unwrap_or(NA_I16)
}

/// Converts a calendar year and month (1..=12) into the months-since-epoch
/// storage value, where month index 0 is March of year 0.
pub fn year_month_from_calendar(year: i32, month: u8) -> Result<i16> {
    if month < 1 || month > 12 {
        return Err(Error::invalid_arg(
            "month",
            format!("calendar month {month} is outside 1..=12"),
        ));
    }
    let index = year as i64 * 12 + month as i64 - 3;
    i16::try_from(index)
        .ok()
        .filter(|&v| v != NA_I16)
        .ok_or_else(|| {
            Error::capacity_exceeded(
                "i2d",
                format!("{year:04}-{month:02} is outside the representable month range"),
            )
        })
}

/// Converts a months-since-epoch storage value back into a calendar year and
/// month (1..=12). The NA sentinel carries no month and is rejected; decode
/// with [`decode_year_month`] first.
pub fn year_month_to_calendar(stored: i16) -> Result<(i32, u8)> {
    if stored == NA_I16 {
        return Err(Error::invalid_arg(
            "stored",
            "the NA sentinel does not name a calendar month",
        ));
    }
    let total = stored as i32 + 2;
    Ok((total.div_euclid(12), (total.rem_euclid(12) + 1) as u8))
}
