//! Little-endian access to fixed-width elements within a raw column buffer.

use colbuf_common::{Result, error::Error};

/// A fixed-width primitive that can be read from and written to a raw buffer
/// in little-endian byte order.
///
/// Buffer walks go through explicit byte conversion rather than slice casting,
/// since raw column buffers carry no alignment guarantee (the offset section
/// of a variable-width string buffer, for instance, starts at an arbitrary
/// multiple of 8 within the byte stream). The `bytemuck` bounds let encode
/// paths, which own their vectors, cast whole element slices in bulk.
pub trait FixedElement: bytemuck::NoUninit + bytemuck::AnyBitPattern + PartialEq {
    const SIZE: usize;

    fn read_le(bytes: &[u8]) -> Self;
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_fixed_element {
    ($($ty:ty),*) => {
        $(
            impl FixedElement for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    <$ty>::from_le_bytes(bytes.try_into().unwrap())
                }

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_fixed_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Reads element `index` of type `T` from a buffer of packed elements starting
/// at `base`.
#[inline]
pub fn read_element<T: FixedElement>(buffer: &[u8], base: usize, index: usize) -> T {
    let start = base + index * T::SIZE;
    T::read_le(&buffer[start..start + T::SIZE])
}

/// Serializes a slice of elements into a little-endian byte vector.
pub fn elements_to_bytes<T: FixedElement>(elements: &[T]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        bytemuck::cast_slice(elements).to_vec()
    } else {
        let mut out = Vec::with_capacity(elements.len() * T::SIZE);
        for &element in elements {
            element.write_le(&mut out);
        }
        out
    }
}

/// Verifies that a buffer of packed `T` elements holds exactly `row_count`
/// rows.
pub fn verify_element_count<T: FixedElement>(
    element: &str,
    buffer: &[u8],
    row_count: usize,
) -> Result<()> {
    // A row count so large the byte size overflows usize can never match
    // an in-memory buffer.
    let expected = row_count.checked_mul(T::SIZE).ok_or_else(|| {
        Error::malformed_layout(
            element,
            format!("row count {row_count} overflows the buffer size"),
        )
    })?;
    if buffer.len() != expected {
        return Err(Error::malformed_layout(
            element,
            format!(
                "buffer holds {} bytes, expected {expected} for {row_count} rows of {} bytes",
                buffer.len(),
                T::SIZE
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_element() {
        let mut buf = Vec::new();
        7i32.write_le(&mut buf);
        (-1i32).write_le(&mut buf);
        assert_eq!(read_element::<i32>(&buf, 0, 0), 7);
        assert_eq!(read_element::<i32>(&buf, 0, 1), -1);
        assert_eq!(read_element::<i16>(&buf, 4, 0), -1);
    }

    #[test]
    fn test_elements_to_bytes() {
        assert_eq!(elements_to_bytes(&[1i16, -1i16]), vec![1, 0, 0xFF, 0xFF]);
        assert_eq!(elements_to_bytes::<u8>(&[3, 4]), vec![3, 4]);
    }

    #[test]
    fn test_verify_element_count() {
        assert!(verify_element_count::<i32>("col", &[0; 8], 2).is_ok());
        assert!(verify_element_count::<i32>("col", &[0; 8], 3).is_err());
        // A row count whose byte size overflows usize never matches.
        assert!(verify_element_count::<i64>("col", &[], usize::MAX).is_err());
    }
}
