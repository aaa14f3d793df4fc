//! Dictionary (enum) string codec.
//!
//! A column stores one unsigned level index per row; the unsigned maximum of
//! the index width (`255`, `65535`, `2^32 - 1`) is the NA sentinel. Index `k`
//! resolves to level `k` through the metadata's offset table into the shared
//! level buffer, so distinct rows referencing the same level always yield
//! byte-identical text. The index width bounds the level count: a dictionary
//! needing more levels than the width can address fails construction.

use colbuf_common::{Result, error::Error};
use colbuf_types::{EnumMetadata, StorageType};

use crate::element::{FixedElement, elements_to_bytes, read_element, verify_element_count};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// The unsigned per-row level index primitive: `u8`, `u16` or `u32`.
pub trait EnumIndex: FixedElement + sealed::Sealed {
    const STORAGE_TYPE: StorageType;
    /// The NA sentinel, which is also one past the largest addressable level.
    const NA: Self;
    /// Maximum number of levels this index width can address.
    const MAX_LEVELS: usize;

    fn to_usize(self) -> usize;
    fn from_usize(value: usize) -> Self;
}

macro_rules! impl_enum_index {
    ($($ty:ty => $stype:expr),*) => {
        $(
            impl EnumIndex for $ty {
                const STORAGE_TYPE: StorageType = $stype;
                const NA: Self = <$ty>::MAX;
                const MAX_LEVELS: usize = <$ty>::MAX as usize;

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(value: usize) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_enum_index!(
    u8 => StorageType::EnumU8,
    u16 => StorageType::EnumU16,
    u32 => StorageType::EnumU32
);

fn verify_capacity<T: EnumIndex>(level_count: usize) -> Result<()> {
    if level_count > T::MAX_LEVELS {
        return Err(Error::capacity_exceeded(
            T::STORAGE_TYPE.code(),
            format!(
                "{level_count} levels exceed the {} addressable by this index width",
                T::MAX_LEVELS
            ),
        ));
    }
    Ok(())
}

/// Encodes rows against an existing dictionary, mapping each string to its
/// level index.
///
/// Fails with a capacity error when the dictionary itself is too large for
/// the index width, and with an invalid argument error when a row's text is
/// not one of the levels.
pub fn encode_with_levels<'a, T: EnumIndex>(
    rows: impl IntoIterator<Item = Option<&'a str>>,
    metadata: &EnumMetadata,
) -> Result<Vec<u8>> {
    verify_capacity::<T>(metadata.level_count())?;
    let mut indices: Vec<T> = Vec::new();
    for (row, text) in rows.into_iter().enumerate() {
        let index = match text {
            None => T::NA,
            Some(text) => {
                let level = (0..metadata.level_count())
                    .find(|&k| metadata.level(k).is_ok_and(|l| l == text))
                    .ok_or_else(|| {
                        Error::invalid_arg(
                            "rows",
                            format!("row {row} is not a level of the dictionary"),
                        )
                    })?;
                T::from_usize(level)
            }
        };
        indices.push(index);
    }
    Ok(elements_to_bytes(&indices))
}

/// Builds a dictionary from the distinct values of `rows` (in first-appearance
/// order) and encodes the rows against it.
pub fn encode<'a, T: EnumIndex>(
    rows: impl IntoIterator<Item = Option<&'a str>>,
) -> Result<(Vec<u8>, EnumMetadata)> {
    let rows: Vec<Option<&str>> = rows.into_iter().collect();
    let mut levels: Vec<&str> = Vec::new();
    for &text in rows.iter().flatten() {
        if !levels.contains(&text) {
            levels.push(text);
        }
    }
    verify_capacity::<T>(levels.len())?;
    let metadata = EnumMetadata::from_levels(levels.iter().copied())?;
    let buffer = encode_with_levels::<T>(rows, &metadata)?;
    Ok((buffer, metadata))
}

/// A read-only view over a dictionary-encoded string column.
#[derive(Debug, Clone)]
pub struct EnumView<'a, T: EnumIndex> {
    buffer: &'a [u8],
    metadata: &'a EnumMetadata,
    row_count: usize,
    _index: std::marker::PhantomData<T>,
}

impl<'a, T: EnumIndex> EnumView<'a, T> {
    /// Creates a view over `buffer` holding `row_count` level indices,
    /// resolved through `metadata`.
    pub fn new(
        buffer: &'a [u8],
        metadata: &'a EnumMetadata,
        row_count: usize,
    ) -> Result<EnumView<'a, T>> {
        verify_capacity::<T>(metadata.level_count())?;
        verify_element_count::<T>(T::STORAGE_TYPE.code(), buffer, row_count)?;
        Ok(EnumView {
            buffer,
            metadata,
            row_count,
            _index: std::marker::PhantomData,
        })
    }

    /// Returns the number of rows in the column.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns `true` if the row at `index` is NA.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_na(&self, index: usize) -> bool {
        assert!(index < self.row_count);
        read_element::<T>(self.buffer, 0, index) == T::NA
    }

    /// Verifies that every non-sentinel index of the buffer resolves to a
    /// level of the dictionary.
    pub fn verify_indices(&self) -> Result<()> {
        for index in 0..self.row_count {
            self.get(index)?;
        }
        Ok(())
    }

    /// Resolves the row at `index` to its level text, returning `None` for NA.
    ///
    /// A non-sentinel index beyond the level count is a malformed layout.
    pub fn get(&self, index: usize) -> Result<Option<&'a str>> {
        if index >= self.row_count {
            return Err(Error::invalid_arg(
                "index",
                format!("row {index} out of {} rows", self.row_count),
            ));
        }
        let level = read_element::<T>(self.buffer, 0, index);
        if level == T::NA {
            return Ok(None);
        }
        self.metadata.level(level.to_usize()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let rows = [Some("cat"), Some("dog"), None, Some("cat")];
        let (buffer, meta) = encode::<u8>(rows).unwrap();
        assert_eq!(meta.level_data(), b"catdog");
        assert_eq!(meta.level_offsets(), &[0, 3, 6]);
        assert_eq!(buffer, [0, 1, 255, 0]);

        let view = EnumView::<u8>::new(&buffer, &meta, 4).unwrap();
        assert_eq!(view.get(0).unwrap(), Some("cat"));
        assert_eq!(view.get(1).unwrap(), Some("dog"));
        assert_eq!(view.get(2).unwrap(), None);
        assert!(view.is_na(2));
        // Rows sharing a level observe byte-identical text.
        assert_eq!(view.get(3).unwrap(), view.get(0).unwrap());
    }

    #[test]
    fn test_level_capacity_bound() {
        let levels: Vec<String> = (0..=255).map(|i| format!("level{i}")).collect();

        // 256 levels do not fit u8 indices (255 is the sentinel).
        let too_many: Vec<Option<&str>> = levels.iter().map(|s| Some(s.as_str())).collect();
        let err = encode::<u8>(too_many.iter().copied()).unwrap_err();
        assert!(matches!(
            err.kind(),
            colbuf_common::error::ErrorKind::CapacityExceeded { .. }
        ));

        // Exactly at the limit succeeds.
        let at_limit: Vec<Option<&str>> = too_many[..255].to_vec();
        let (buffer, meta) = encode::<u8>(at_limit.iter().copied()).unwrap();
        assert_eq!(meta.level_count(), 255);
        let view = EnumView::<u8>::new(&buffer, &meta, 255).unwrap();
        assert_eq!(view.get(254).unwrap(), Some("level254"));

        // The wider index widths take the same dictionary in stride.
        assert!(encode::<u16>(too_many.iter().copied()).is_ok());
        assert!(encode::<u32>(too_many.iter().copied()).is_ok());
    }

    #[test]
    fn test_wide_indices_round_trip() {
        let rows = [Some("a"), None, Some("b"), Some("a"), None];
        for_each_width(&rows);

        fn for_each_width(rows: &[Option<&str>]) {
            fn check<T: EnumIndex>(rows: &[Option<&str>]) {
                let (buffer, meta) = encode::<T>(rows.iter().copied()).unwrap();
                let view = EnumView::<T>::new(&buffer, &meta, rows.len()).unwrap();
                for (i, row) in rows.iter().enumerate() {
                    assert_eq!(view.get(i).unwrap(), *row);
                }
            }
            check::<u8>(rows);
            check::<u16>(rows);
            check::<u32>(rows);
        }
    }

    #[test]
    fn test_unknown_level_rejected() {
        let meta = EnumMetadata::from_levels(["cat", "dog"]).unwrap();
        assert!(encode_with_levels::<u8>([Some("fox")], &meta).is_err());
        let buffer = encode_with_levels::<u8>([Some("dog"), None], &meta).unwrap();
        assert_eq!(buffer, [1, 255]);
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let meta = EnumMetadata::from_levels(["cat", "dog"]).unwrap();
        let buffer = [7u8];
        let view = EnumView::<u8>::new(&buffer, &meta, 1).unwrap();
        assert!(view.get(0).is_err());
        assert!(!view.is_na(0));
    }
}
