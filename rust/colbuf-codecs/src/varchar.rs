//! Variable-width string codec.
//!
//! Buffer layout, in order: the MUTF-8 string data of all non-NA rows placed
//! end-to-end, [`FILL_BYTE`] padding up to the next multiple of 8, then one
//! signed little-endian offset per row. The metadata records where the offset
//! section starts, so the total buffer size is always
//! `offsets_start + offset_width * row_count`.
//!
//! Each offset stores the cumulative end position of its row's string within
//! the data section, plus one; NA rows store the negation of that value. Row
//! `i` is therefore NA iff its offset is negative, starts at
//! `abs(offset[i - 1]) - 1` (or 0 for the first row), and ends at
//! `abs(offset[i]) - 1`. An NA row still carries the running cumulative
//! position so that the next row's start remains derivable, which makes its
//! length 0 by construction.
//!
//! A column with the four values `[NA, "hello", "", NA]` and 32-bit offsets
//! encodes as a 24-byte buffer (5 data bytes, 3 padding bytes, 4 offsets of
//! 4 bytes) with `offsets_start = 8`:
//!
//! ```text
//! h e l l o 0xFF 0xFF 0xFF <-1> <6> <6> <-6>
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use colbuf_common::{Result, error::Error, verify_layout};
use colbuf_types::{StorageType, VarcharMetadata};

use crate::element::{FixedElement, elements_to_bytes};
use crate::mutf8::{self, FILL_BYTE};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// The signed per-row offset primitive: `i32` for `VarcharI32` columns,
/// `i64` for `VarcharI64`. The width bounds the maximum total payload size
/// and is fixed per column at construction.
pub trait VarcharOffset: FixedElement + sealed::Sealed {
    const STORAGE_TYPE: StorageType;
    /// Largest representable `cumulative_end + 1` value.
    const MAX_CUMULATIVE: i64;

    fn to_i64(self) -> i64;
    fn from_i64(value: i64) -> Self;
    fn read_from(reader: &mut impl std::io::Read) -> std::io::Result<Self>;
}

impl VarcharOffset for i32 {
    const STORAGE_TYPE: StorageType = StorageType::VarcharI32;
    const MAX_CUMULATIVE: i64 = i32::MAX as i64;

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        value as i32
    }

    #[inline]
    fn read_from(reader: &mut impl std::io::Read) -> std::io::Result<Self> {
        reader.read_i32::<LittleEndian>()
    }
}

impl VarcharOffset for i64 {
    const STORAGE_TYPE: StorageType = StorageType::VarcharI64;
    const MAX_CUMULATIVE: i64 = i64::MAX;

    #[inline]
    fn to_i64(self) -> i64 {
        self
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        value
    }

    #[inline]
    fn read_from(reader: &mut impl std::io::Read) -> std::io::Result<Self> {
        reader.read_i64::<LittleEndian>()
    }
}

/// Rounds a byte length up to the next multiple of 8.
#[inline]
fn pad_to_8(len: usize) -> usize {
    (len + 7) & !7
}

/// Encodes a sequence of optional strings into a variable-width string buffer
/// and its metadata.
///
/// Fails with a capacity error when the cumulative payload exceeds what the
/// chosen offset width can address (about 2^31 bytes for `i32`).
pub fn encode<'a, T: VarcharOffset>(
    rows: impl IntoIterator<Item = Option<&'a str>>,
) -> Result<(Vec<u8>, VarcharMetadata)> {
    let mut payload = Vec::new();
    let mut offsets: Vec<T> = Vec::new();
    for row in rows {
        if let Some(text) = row {
            mutf8::encode_into(text, &mut payload);
        }
        let end_plus_one = payload.len() as i64 + 1;
        if end_plus_one > T::MAX_CUMULATIVE {
            return Err(Error::capacity_exceeded(
                T::STORAGE_TYPE.code(),
                format!(
                    "cumulative string payload of {} bytes exceeds the offset width",
                    payload.len()
                ),
            ));
        }
        let offset = match row {
            Some(_) => end_plus_one,
            None => -end_plus_one,
        };
        offsets.push(T::from_i64(offset));
    }

    let offsets_start = pad_to_8(payload.len());
    payload.resize(offsets_start, FILL_BYTE);
    payload.extend_from_slice(&elements_to_bytes(&offsets));
    Ok((
        payload,
        VarcharMetadata {
            offsets_start: offsets_start as i64,
        },
    ))
}

/// A validated read-only view over a variable-width string column buffer.
///
/// Construction checks the whole layout once (section sizes, padding, offset
/// monotonicity); row access afterwards only decodes the requested range.
#[derive(Debug, Clone)]
pub struct VarcharView<'a, T: VarcharOffset> {
    buffer: &'a [u8],
    offsets_start: usize,
    row_count: usize,
    _offset: std::marker::PhantomData<T>,
}

impl<'a, T: VarcharOffset> VarcharView<'a, T> {
    /// Creates a view over `buffer` holding `row_count` rows, verifying the
    /// layout against the metadata.
    pub fn new(
        buffer: &'a [u8],
        metadata: &VarcharMetadata,
        row_count: usize,
    ) -> Result<VarcharView<'a, T>> {
        let code = T::STORAGE_TYPE.code();
        if metadata.offsets_start < 0 || metadata.offsets_start % 8 != 0 {
            return Err(Error::malformed_layout(
                code,
                format!(
                    "offset section start {} is not a non-negative multiple of 8",
                    metadata.offsets_start
                ),
            ));
        }
        let offsets_start = metadata.offsets_start as usize;
        let expected = row_count
            .checked_mul(T::SIZE)
            .and_then(|offset_bytes| offsets_start.checked_add(offset_bytes))
            .ok_or_else(|| {
                Error::malformed_layout(
                    code,
                    format!("row count {row_count} overflows the buffer size"),
                )
            })?;
        if buffer.len() != expected {
            return Err(Error::malformed_layout(
                code,
                format!(
                    "buffer holds {} bytes, expected offsets_start {offsets_start} + {} offset bytes",
                    buffer.len(),
                    expected - offsets_start
                ),
            ));
        }

        let view = VarcharView {
            buffer,
            offsets_start,
            row_count,
            _offset: std::marker::PhantomData,
        };
        view.validate_offsets()?;
        Ok(view)
    }

    /// Walks the offset section and checks it against the cumulative
    /// derivation rule: magnitudes start at 1, never decrease, and an NA row
    /// repeats the previous row's cumulative position exactly.
    fn validate_offsets(&self) -> Result<()> {
        let code = T::STORAGE_TYPE.code();
        let mut reader = &self.buffer[self.offsets_start..];
        let mut prev_abs: i64 = 1;
        for row in 0..self.row_count {
            let raw = T::read_from(&mut reader)
                .map_err(|_| Error::malformed_layout(code, "truncated offset section"))?
                .to_i64();
            if raw == 0 || raw == i64::MIN {
                return Err(Error::malformed_layout(
                    code,
                    format!("offset {raw} at row {row} is outside the valid encoding"),
                ));
            }
            let abs = raw.abs();
            if raw < 0 && abs != prev_abs {
                return Err(Error::malformed_layout(
                    code,
                    format!("NA row {row} does not repeat the previous cumulative position"),
                ));
            }
            if abs < prev_abs {
                return Err(Error::malformed_layout(
                    code,
                    format!("offset magnitude decreases at row {row}"),
                ));
            }
            prev_abs = abs;
        }

        let data_end = (prev_abs - 1) as usize;
        if pad_to_8(data_end) != self.offsets_start {
            return Err(Error::malformed_layout(
                code,
                format!(
                    "string data ends at {data_end} but the offset section starts at {}",
                    self.offsets_start
                ),
            ));
        }
        let padding = &self.buffer[data_end..self.offsets_start];
        verify_layout!(padding, padding.iter().all(|&b| b == FILL_BYTE));
        Ok(())
    }

    /// Returns the number of rows in the column.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the raw (signed) offset of `index`.
    fn raw_offset(&self, index: usize) -> i64 {
        let start = self.offsets_start + index * T::SIZE;
        T::read_le(&self.buffer[start..start + T::SIZE]).to_i64()
    }

    /// Returns `true` if the row at `index` is NA.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_na(&self, index: usize) -> bool {
        assert!(index < self.row_count);
        self.raw_offset(index) < 0
    }

    /// Decodes the row at `index`, returning `None` for NA.
    pub fn get(&self, index: usize) -> Result<Option<String>> {
        if index >= self.row_count {
            return Err(Error::invalid_arg(
                "index",
                format!("row {index} out of {} rows", self.row_count),
            ));
        }
        let raw = self.raw_offset(index);
        if raw < 0 {
            return Ok(None);
        }
        let start = if index == 0 {
            0
        } else {
            (self.raw_offset(index - 1).abs() - 1) as usize
        };
        let end = (raw - 1) as usize;
        mutf8::decode(&self.buffer[start..end]).map(Some)
    }
}
