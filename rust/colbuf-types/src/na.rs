//! NA (missing value) sentinels.
//!
//! Every storage type reserves one bit pattern to mean "missing". Integer-based
//! sentinels can be compared by value (`x == NA_I32`), whereas floating-point
//! sentinels require the bit-exact predicates [`is_na_f32`] / [`is_na_f64`]:
//! the sentinel is a NaN, and IEEE equality never holds for NaNs. Any other
//! NaN or infinity bit pattern is a legitimate non-NA value and must never be
//! reclassified as missing.

use colbuf_common::{Result, error::Error};

use crate::storage::StorageType;

pub const NA_I8: i8 = i8::MIN;
pub const NA_I16: i16 = i16::MIN;
pub const NA_I32: i32 = i32::MIN;
pub const NA_I64: i64 = i64::MIN;

pub const NA_U8: u8 = u8::MAX;
pub const NA_U16: u16 = u16::MAX;
pub const NA_U32: u32 = u32::MAX;
pub const NA_U64: u64 = u64::MAX;

/// The designated NaN payload meaning NA for `f32` storage.
pub const NA_F32_BITS: u32 = 0x7F80_07A2;
/// The designated NaN payload meaning NA for `f64` storage.
pub const NA_F64_BITS: u64 = 0x7FF0_0000_0000_07A2;

pub const NA_F32: f32 = f32::from_bits(NA_F32_BITS);
pub const NA_F64: f64 = f64::from_bits(NA_F64_BITS);

/// The reserved opaque-object handle value meaning NA.
pub const NA_OBJECT: u64 = 0;

/// Returns `true` iff `value` carries the exact `f32` NA bit pattern.
#[inline]
pub fn is_na_f32(value: f32) -> bool {
    value.to_bits() == NA_F32_BITS
}

/// Returns `true` iff `value` carries the exact `f64` NA bit pattern.
#[inline]
pub fn is_na_f64(value: f64) -> bool {
    value.to_bits() == NA_F64_BITS
}

/// Returns the little-endian bytes of the storage type's NA sentinel, where a
/// single fixed-width pattern exists.
///
/// Returns `None` for the two rule-based cases: the variable-width string
/// types (any negative offset is NA) and `Fixchar` (a cell of `0xFF` bytes at
/// the metadata-declared width). Fails with a type mismatch for `Void`.
pub fn na_element_bytes(storage_type: StorageType) -> Result<Option<Vec<u8>>> {
    storage_type.verify_usable()?;
    let bytes = match storage_type {
        StorageType::Void => unreachable!(),
        StorageType::BooleanI8 | StorageType::IntegerI8 => NA_I8.to_le_bytes().to_vec(),
        StorageType::IntegerI16 | StorageType::DecimalI16 | StorageType::YearMonth => {
            NA_I16.to_le_bytes().to_vec()
        }
        StorageType::IntegerI32
        | StorageType::DecimalI32
        | StorageType::TimeOfDayMillis
        | StorageType::DateDays => NA_I32.to_le_bytes().to_vec(),
        StorageType::IntegerI64
        | StorageType::DecimalI64
        | StorageType::DateTimeMicros
        | StorageType::DateTimePacked => NA_I64.to_le_bytes().to_vec(),
        StorageType::RealF32 => NA_F32_BITS.to_le_bytes().to_vec(),
        StorageType::RealF64 => NA_F64_BITS.to_le_bytes().to_vec(),
        StorageType::EnumU8 => NA_U8.to_le_bytes().to_vec(),
        StorageType::EnumU16 => NA_U16.to_le_bytes().to_vec(),
        StorageType::EnumU32 => NA_U32.to_le_bytes().to_vec(),
        StorageType::ObjectPtr => NA_OBJECT.to_le_bytes().to_vec(),
        StorageType::VarcharI32 | StorageType::VarcharI64 | StorageType::Fixchar => {
            return Ok(None);
        }
    };
    Ok(Some(bytes))
}

/// Decides whether a raw element is the NA sentinel of the given storage type.
///
/// `element` must be exactly one element wide for `storage_type` (little
/// endian). For the variable-width string types the element is the signed
/// per-row offset, whose sign encodes nullability; for `Fixchar` the element
/// is the full `width`-byte cell, which is NA when every byte is the `0xFF`
/// filler.
///
/// Fails with a type mismatch for `Void` and with an invalid argument for an
/// element slice of the wrong length.
pub fn is_na_element(storage_type: StorageType, element: &[u8]) -> Result<bool> {
    storage_type.verify_usable()?;
    if storage_type != StorageType::Fixchar {
        let expected = storage_type.min_element_size();
        if element.len() != expected {
            return Err(Error::invalid_arg(
                "element",
                format!(
                    "expected {expected} bytes for {storage_type}, got {}",
                    element.len()
                ),
            ));
        }
    }
    let na = match storage_type {
        StorageType::Void => unreachable!(),
        StorageType::BooleanI8 | StorageType::IntegerI8 => element[0] as i8 == NA_I8,
        StorageType::IntegerI16 | StorageType::DecimalI16 | StorageType::YearMonth => {
            i16::from_le_bytes([element[0], element[1]]) == NA_I16
        }
        StorageType::IntegerI32
        | StorageType::DecimalI32
        | StorageType::TimeOfDayMillis
        | StorageType::DateDays => i32::from_le_bytes(element.try_into().unwrap()) == NA_I32,
        StorageType::IntegerI64
        | StorageType::DecimalI64
        | StorageType::DateTimeMicros
        | StorageType::DateTimePacked => {
            i64::from_le_bytes(element.try_into().unwrap()) == NA_I64
        }
        StorageType::RealF32 => {
            u32::from_le_bytes(element.try_into().unwrap()) == NA_F32_BITS
        }
        StorageType::RealF64 => {
            u64::from_le_bytes(element.try_into().unwrap()) == NA_F64_BITS
        }
        StorageType::VarcharI32 => i32::from_le_bytes(element.try_into().unwrap()) < 0,
        StorageType::VarcharI64 => i64::from_le_bytes(element.try_into().unwrap()) < 0,
        StorageType::Fixchar => {
            if element.is_empty() {
                return Err(Error::invalid_arg("element", "empty fixchar cell"));
            }
            element.iter().all(|&b| b == 0xFF)
        }
        StorageType::EnumU8 => element[0] == NA_U8,
        StorageType::EnumU16 => u16::from_le_bytes([element[0], element[1]]) == NA_U16,
        StorageType::EnumU32 => u32::from_le_bytes(element.try_into().unwrap()) == NA_U32,
        StorageType::ObjectPtr => u64::from_le_bytes(element.try_into().unwrap()) == NA_OBJECT,
    };
    Ok(na)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_na_is_bit_exact() {
        assert!(is_na_f32(NA_F32));
        assert!(is_na_f64(NA_F64));
        // A garden-variety NaN is not NA.
        assert!(!is_na_f32(f32::from_bits(0x7FC0_0000)));
        assert!(!is_na_f64(f64::NAN));
        assert!(!is_na_f32(f32::INFINITY));
        assert!(!is_na_f32(f32::NEG_INFINITY));
        assert!(!is_na_f64(f64::INFINITY));
        // IEEE equality would never detect the sentinel.
        #[allow(clippy::eq_op)]
        {
            assert_ne!(NA_F32, NA_F32);
        }
    }

    #[test]
    fn test_adversarial_nan_payloads() {
        // Every NaN payload one bit away from the sentinel is a value.
        for flip in 0..32 {
            let bits = NA_F32_BITS ^ (1u32 << flip);
            if bits == NA_F32_BITS {
                continue;
            }
            assert!(!is_na_f32(f32::from_bits(bits)), "bits {bits:#010X}");
        }
        for flip in 0..64 {
            let bits = NA_F64_BITS ^ (1u64 << flip);
            assert!(!is_na_f64(f64::from_bits(bits)), "bits {bits:#018X}");
        }
    }

    #[test]
    fn test_integer_sentinels() {
        assert_eq!(NA_I8, -128);
        assert_eq!(NA_I16, -32768);
        assert_eq!(NA_I32, -2147483648);
        assert_eq!(NA_I64, i64::MIN);
        assert_eq!(NA_U8, 255);
        assert_eq!(NA_U16, 65535);
        assert_eq!(NA_U32, u32::MAX);
    }

    #[test]
    fn test_na_element_bytes() {
        for stype in StorageType::ALL {
            if stype == StorageType::Void {
                assert!(na_element_bytes(stype).is_err());
                continue;
            }
            match na_element_bytes(stype).unwrap() {
                Some(bytes) => {
                    assert_eq!(bytes.len(), stype.min_element_size());
                    assert!(is_na_element(stype, &bytes).unwrap());
                }
                None => assert!(matches!(
                    stype,
                    StorageType::VarcharI32 | StorageType::VarcharI64 | StorageType::Fixchar
                )),
            }
        }
    }

    #[test]
    fn test_is_na_element() {
        assert!(is_na_element(StorageType::IntegerI8, &[0x80]).unwrap());
        assert!(!is_na_element(StorageType::IntegerI8, &[0x7F]).unwrap());
        assert!(is_na_element(StorageType::IntegerI32, &NA_I32.to_le_bytes()).unwrap());
        assert!(is_na_element(StorageType::RealF32, &NA_F32_BITS.to_le_bytes()).unwrap());
        assert!(!is_na_element(StorageType::RealF32, &0x7FC0_0000u32.to_le_bytes()).unwrap());
        assert!(is_na_element(StorageType::EnumU16, &[0xFF, 0xFF]).unwrap());
        assert!(is_na_element(StorageType::VarcharI32, &(-1i32).to_le_bytes()).unwrap());
        assert!(!is_na_element(StorageType::VarcharI32, &6i32.to_le_bytes()).unwrap());
        assert!(is_na_element(StorageType::Fixchar, &[0xFF; 4]).unwrap());
        assert!(!is_na_element(StorageType::Fixchar, b"ab\xFF\xFF").unwrap());
        assert!(is_na_element(StorageType::ObjectPtr, &0u64.to_le_bytes()).unwrap());

        assert!(is_na_element(StorageType::Void, &[]).is_err());
        assert!(is_na_element(StorageType::IntegerI32, &[0, 0]).is_err());
    }
}
