//! Fixed-point decimal codec.
//!
//! A decimal value is a signed integer plus a per-column scale: the stored
//! integer divided by `10^scale` is the logical value, so `7.11` at scale 2 is
//! stored as `711`. The scale lives in the column metadata rather than in each
//! value, which keeps all values of a column on a common scale. The width's
//! minimum signed value is the NA sentinel. The metadata's currency codepoint
//! is a presentation attribute and a compatibility key for the engine layer;
//! this codec only carries it.

use colbuf_common::{Result, error::Error};
use colbuf_types::{DecimalMetadata, StorageType};

use crate::element::{FixedElement, read_element, verify_element_count};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// The signed storage integer of a decimal column: `i16`, `i32` or `i64`.
pub trait DecimalWidth: FixedElement + sealed::Sealed {
    const STORAGE_TYPE: StorageType;
    /// The NA sentinel (the width's minimum signed value).
    const NA: Self;
    /// Largest scale at which the width can still hold a full unit digit.
    const MAX_SCALE: u32;

    fn to_i64(self) -> i64;
    fn from_i64(value: i64) -> Option<Self>;
}

macro_rules! impl_decimal_width {
    ($($ty:ty => ($stype:expr, $max_scale:expr)),*) => {
        $(
            impl DecimalWidth for $ty {
                const STORAGE_TYPE: StorageType = $stype;
                const NA: Self = <$ty>::MIN;
                const MAX_SCALE: u32 = $max_scale;

                #[inline]
                fn to_i64(self) -> i64 {
                    self as i64
                }

                #[inline]
                fn from_i64(value: i64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_decimal_width!(
    i16 => (StorageType::DecimalI16, 4),
    i32 => (StorageType::DecimalI32, 9),
    i64 => (StorageType::DecimalI64, 18)
);

fn verify_scale<T: DecimalWidth>(metadata: &DecimalMetadata) -> Result<()> {
    if metadata.scale > T::MAX_SCALE {
        return Err(Error::capacity_exceeded(
            T::STORAGE_TYPE.code(),
            format!(
                "scale {} exceeds the width's capacity of {} digits",
                metadata.scale,
                T::MAX_SCALE
            ),
        ));
    }
    Ok(())
}

/// Decodes one stored integer into its logical value, `None` for NA.
#[inline]
pub fn decode<T: DecimalWidth>(stored: T, metadata: &DecimalMetadata) -> Option<f64> {
    if stored == T::NA {
        return None;
    }
    Some(stored.to_i64() as f64 / 10f64.powi(metadata.scale as i32))
}

/// Encodes a logical value into the stored integer, rounding half away from
/// zero at the column's scale.
///
/// Fails with a capacity error when the scaled integer does not fit the
/// width's non-NA range (the sentinel itself is not a representable value),
/// or when the value is not finite.
pub fn encode<T: DecimalWidth>(value: f64, metadata: &DecimalMetadata) -> Result<T> {
    verify_scale::<T>(metadata)?;
    if !value.is_finite() {
        return Err(Error::capacity_exceeded(
            T::STORAGE_TYPE.code(),
            format!("value {value} is not a finite number"),
        ));
    }
    let scaled = (value * 10f64.powi(metadata.scale as i32)).round();
    // The cast below saturates outside i64's range, and i64::MAX itself
    // rounds up to 2^63 as an f64, so bound the magnitude first. -2^63 casts
    // exactly to i64::MIN and is rejected as the sentinel below.
    const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if scaled >= I64_LIMIT || scaled < -I64_LIMIT {
        return Err(Error::capacity_exceeded(
            T::STORAGE_TYPE.code(),
            format!("value {value} at scale {} overflows the width", metadata.scale),
        ));
    }
    from_unscaled(scaled as i64)
}

/// Converts an already-scaled integer into the stored representation.
///
/// Fails with a capacity error when the integer falls outside the width's
/// non-NA range.
pub fn from_unscaled<T: DecimalWidth>(unscaled: i64) -> Result<T> {
    match T::from_i64(unscaled) {
        Some(stored) if stored != T::NA => Ok(stored),
        _ => Err(Error::capacity_exceeded(
            T::STORAGE_TYPE.code(),
            format!("scaled integer {unscaled} does not fit the width"),
        )),
    }
}

/// Encodes a sequence of optional logical values into a decimal column buffer.
pub fn encode_column<T: DecimalWidth>(
    rows: impl IntoIterator<Item = Option<f64>>,
    metadata: &DecimalMetadata,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    for row in rows {
        let stored = match row {
            Some(value) => encode::<T>(value, metadata)?,
            None => T::NA,
        };
        stored.write_le(&mut buffer);
    }
    Ok(buffer)
}

/// A read-only view over a fixed-point decimal column buffer.
#[derive(Debug, Clone)]
pub struct DecimalView<'a, T: DecimalWidth> {
    buffer: &'a [u8],
    metadata: DecimalMetadata,
    row_count: usize,
    _width: std::marker::PhantomData<T>,
}

impl<'a, T: DecimalWidth> DecimalView<'a, T> {
    pub fn new(
        buffer: &'a [u8],
        metadata: &DecimalMetadata,
        row_count: usize,
    ) -> Result<DecimalView<'a, T>> {
        verify_scale::<T>(metadata)?;
        verify_element_count::<T>(T::STORAGE_TYPE.code(), buffer, row_count)?;
        Ok(DecimalView {
            buffer,
            metadata: *metadata,
            row_count,
            _width: std::marker::PhantomData,
        })
    }

    /// Returns the number of rows in the column.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the stored integer of the row at `index`, sentinel included.
    #[inline]
    pub fn stored(&self, index: usize) -> T {
        assert!(index < self.row_count);
        read_element::<T>(self.buffer, 0, index)
    }

    /// Returns `true` if the row at `index` is NA.
    #[inline]
    pub fn is_na(&self, index: usize) -> bool {
        self.stored(index) == T::NA
    }

    /// Decodes the row at `index`, returning `None` for NA.
    pub fn get(&self, index: usize) -> Result<Option<f64>> {
        if index >= self.row_count {
            return Err(Error::invalid_arg(
                "index",
                format!("row {index} out of {} rows", self.row_count),
            ));
        }
        Ok(decode(self.stored(index), &self.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(scale: u32) -> DecimalMetadata {
        DecimalMetadata { scale, currency: 0 }
    }

    #[test]
    fn test_reference_values() {
        let meta = scale(2);
        assert_eq!(decode::<i32>(711, &meta), Some(7.11));
        assert_eq!(decode::<i32>(i32::MIN, &meta), None);
        assert_eq!(encode::<i32>(7.11, &meta).unwrap(), 711);
        // Halves round away from zero; 0.125 is exact in binary.
        assert_eq!(encode::<i32>(0.125, &scale(2)).unwrap(), 13);
        assert_eq!(encode::<i32>(-0.125, &scale(2)).unwrap(), -13);
    }

    #[test]
    fn test_scale_zero_and_currency_pass_through() {
        let meta = DecimalMetadata { scale: 0, currency: 0x24 };
        assert_eq!(decode::<i16>(42, &meta), Some(42.0));
        assert_eq!(encode::<i16>(42.0, &meta).unwrap(), 42);
    }

    #[test]
    fn test_range_errors() {
        let meta = scale(2);
        // 400.00 needs 40000, which overflows i16.
        assert!(encode::<i16>(400.0, &meta).is_err());
        assert!(encode::<i16>(327.67, &meta).is_ok());
        // The sentinel slot is not a representable value.
        assert!(encode::<i16>(-327.68, &meta).is_err());
        assert!(encode::<i16>(f64::NAN, &meta).is_err());
        assert!(encode::<i16>(f64::INFINITY, &meta).is_err());
        // Scale beyond the width's digit capacity.
        assert!(encode::<i16>(1.0, &scale(5)).is_err());
        assert!(encode::<i64>(1.0, &scale(18)).is_ok());
    }

    #[test]
    fn test_i64_extremes_never_encode_as_the_sentinel() {
        let meta = scale(0);
        // -2^63 is representable as an f64 but its stored slot is the
        // sentinel; +2^63 would saturate the cast. Both must error.
        assert!(encode::<i64>(-9.223_372_036_854_776e18, &meta).is_err());
        assert!(encode::<i64>(9.223_372_036_854_776e18, &meta).is_err());
        // Values just inside the representable range still encode.
        let stored = encode::<i64>(9.2e18, &meta).unwrap();
        assert_ne!(stored, i64::MIN);
        assert!(stored > 0);
        let stored = encode::<i64>(-9.2e18, &meta).unwrap();
        assert_ne!(stored, i64::MIN);
        assert!(stored < 0);
    }

    #[test]
    fn test_from_unscaled() {
        assert_eq!(from_unscaled::<i16>(711).unwrap(), 711);
        assert!(from_unscaled::<i16>(40000).is_err());
        assert!(from_unscaled::<i16>(i16::MIN as i64).is_err());
        assert_eq!(from_unscaled::<i64>(i64::MAX).unwrap(), i64::MAX);
    }

    #[test]
    fn test_column_round_trip() {
        let meta = scale(3);
        let rows = [Some(1.5), None, Some(-0.25), Some(0.0)];
        let buffer = encode_column::<i32>(rows.iter().copied(), &meta).unwrap();
        assert_eq!(buffer.len(), 16);
        let view = DecimalView::<i32>::new(&buffer, &meta, 4).unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(view.get(i).unwrap(), *row);
            assert_eq!(view.is_na(i), row.is_none());
        }
        assert_eq!(view.stored(0), 1500);
        assert_eq!(view.stored(1), i32::MIN);
    }
}
