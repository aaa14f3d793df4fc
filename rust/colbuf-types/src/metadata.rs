//! Per-column metadata descriptors.
//!
//! A storage type whose shape depends on per-column parameters carries exactly
//! one metadata descriptor; [`StorageType::requires_metadata`] says which ones
//! do. The descriptor is a tagged union keyed by storage type family, so that
//! accessing the wrong variant is an error rather than a reinterpretation.

use colbuf_common::{Result, error::Error, verify_arg};

use crate::storage::StorageType;

/// Metadata for the fixed-point decimal storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalMetadata {
    /// Number of digits after the decimal point, shared by all values of the
    /// column.
    pub scale: u32,
    /// Unicode codepoint of a currency symbol to render in front of values,
    /// or 0 for none. Two columns with different non-zero currency codepoints
    /// are considered incompatible by the engine layer.
    pub currency: u32,
}

/// Metadata for the variable-width string storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarcharMetadata {
    /// Byte offset within the column buffer where the per-row offset array
    /// begins. The total buffer size is always
    /// `offsets_start + offset_width * row_count`.
    pub offsets_start: i64,
}

/// Metadata for the fixed-width string storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixcharMetadata {
    /// Bytes per element, `CHAR(n)` style.
    pub width: u32,
}

/// Metadata for the dictionary (enum) string storage types: the shared level
/// buffer and the offsets delimiting each level's byte range within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMetadata {
    level_data: Vec<u8>,
    level_offsets: Vec<u32>,
}

impl EnumMetadata {
    /// Creates enum metadata from a raw level buffer and its delimiting
    /// offsets (`level_count + 1` entries, starting at 0 and ending at the
    /// buffer length, monotonically non-decreasing).
    ///
    /// Each level's byte range must be valid UTF-8; levels are returned as
    /// `&str` without re-validation afterwards.
    pub fn new(level_data: Vec<u8>, level_offsets: Vec<u32>) -> Result<EnumMetadata> {
        verify_arg!(level_offsets, level_offsets.len() >= 1);
        verify_arg!(level_offsets, level_offsets[0] == 0);
        verify_arg!(
            level_offsets,
            *level_offsets.last().unwrap() as usize == level_data.len()
        );
        verify_arg!(
            level_offsets,
            level_offsets.windows(2).all(|w| w[0] <= w[1])
        );
        for w in level_offsets.windows(2) {
            std::str::from_utf8(&level_data[w[0] as usize..w[1] as usize]).map_err(|_| {
                Error::invalid_arg("level_data", "dictionary level is not valid UTF-8")
            })?;
        }
        Ok(EnumMetadata {
            level_data,
            level_offsets,
        })
    }

    /// Builds enum metadata from a sequence of level strings, concatenating
    /// them into the shared level buffer.
    pub fn from_levels<'a>(levels: impl IntoIterator<Item = &'a str>) -> Result<EnumMetadata> {
        let mut level_data = Vec::new();
        let mut level_offsets = vec![0u32];
        for level in levels {
            level_data.extend_from_slice(level.as_bytes());
            let end = u32::try_from(level_data.len()).map_err(|_| {
                Error::capacity_exceeded("level_data", "combined level size exceeds 2^32 bytes")
            })?;
            level_offsets.push(end);
        }
        Ok(EnumMetadata {
            level_data,
            level_offsets,
        })
    }

    /// Returns the number of levels in the dictionary.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.level_offsets.len() - 1
    }

    /// Returns the byte length of the shared level buffer.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.level_data.len()
    }

    /// Returns the raw level buffer.
    #[inline]
    pub fn level_data(&self) -> &[u8] {
        &self.level_data
    }

    /// Returns the delimiting offsets (`level_count + 1` entries).
    #[inline]
    pub fn level_offsets(&self) -> &[u32] {
        &self.level_offsets
    }

    /// Returns the text of level `index`.
    ///
    /// Distinct rows referencing the same level always observe byte-identical
    /// text, since all rows share this buffer.
    pub fn level(&self, index: usize) -> Result<&str> {
        if index >= self.level_count() {
            return Err(Error::malformed_layout(
                "level index",
                format!("index {index} out of {} levels", self.level_count()),
            ));
        }
        let start = self.level_offsets[index] as usize;
        let end = self.level_offsets[index + 1] as usize;
        // UTF-8 was validated at construction.
        Ok(unsafe { std::str::from_utf8_unchecked(&self.level_data[start..end]) })
    }
}

/// The per-column metadata descriptor: present if and only if the column's
/// storage type requires it.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    Decimal(DecimalMetadata),
    Varchar(VarcharMetadata),
    Fixchar(FixcharMetadata),
    Enum(EnumMetadata),
}

impl Metadata {
    /// Returns `true` if this variant is the one required by `storage_type`.
    pub fn matches(&self, storage_type: StorageType) -> bool {
        matches!(
            (self, storage_type),
            (
                Metadata::Decimal(_),
                StorageType::DecimalI16 | StorageType::DecimalI32 | StorageType::DecimalI64
            ) | (
                Metadata::Varchar(_),
                StorageType::VarcharI32 | StorageType::VarcharI64
            ) | (Metadata::Fixchar(_), StorageType::Fixchar)
                | (
                    Metadata::Enum(_),
                    StorageType::EnumU8 | StorageType::EnumU16 | StorageType::EnumU32
                )
        )
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Metadata::Decimal(_) => "decimal metadata",
            Metadata::Varchar(_) => "varchar metadata",
            Metadata::Fixchar(_) => "fixchar metadata",
            Metadata::Enum(_) => "enum metadata",
        }
    }

    pub fn as_decimal(&self) -> Result<&DecimalMetadata> {
        match self {
            Metadata::Decimal(meta) => Ok(meta),
            other => Err(Error::type_mismatch("decimal metadata", other.variant_name())),
        }
    }

    pub fn as_varchar(&self) -> Result<&VarcharMetadata> {
        match self {
            Metadata::Varchar(meta) => Ok(meta),
            other => Err(Error::type_mismatch("varchar metadata", other.variant_name())),
        }
    }

    pub fn as_fixchar(&self) -> Result<&FixcharMetadata> {
        match self {
            Metadata::Fixchar(meta) => Ok(meta),
            other => Err(Error::type_mismatch("fixchar metadata", other.variant_name())),
        }
    }

    pub fn as_enum(&self) -> Result<&EnumMetadata> {
        match self {
            Metadata::Enum(meta) => Ok(meta),
            other => Err(Error::type_mismatch("enum metadata", other.variant_name())),
        }
    }
}
