//! The storage (physical) type catalogue and its registry.

use std::sync::OnceLock;

use colbuf_common::{Result, error::Error};

use crate::logical::LogicalType;

/// Storage type of a data column: a specific physical byte layout implementing
/// one logical type.
///
/// Storage types are in many-to-one correspondence with [`LogicalType`]s: a
/// single logical type may have multiple storage types, but never the other way
/// around. The discriminants are stable ordinals and part of the wire contract
/// with any collaborator that serializes columns; they must not be renumbered.
///
/// `Void` is a placeholder whose presence indicates an error or uninitialized
/// state; no codec ever produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StorageType {
    Void = 0,
    /// Boolean stored as a signed byte: 1 = true, 0 = false, -128 = NA.
    BooleanI8 = 1,
    IntegerI8 = 2,
    IntegerI16 = 3,
    IntegerI32 = 4,
    IntegerI64 = 5,
    /// IEEE 754 single-precision; NA is one designated NaN payload.
    RealF32 = 6,
    /// IEEE 754 double-precision; NA is one designated NaN payload.
    RealF64 = 7,
    /// Fixed-point decimal stored as i16; scale and currency come from metadata.
    DecimalI16 = 8,
    DecimalI32 = 9,
    DecimalI64 = 10,
    /// Variable-width strings addressed by signed 32-bit offsets.
    VarcharI32 = 11,
    /// Variable-width strings addressed by signed 64-bit offsets.
    VarcharI64 = 12,
    /// Fixed-width strings, `CHAR(n)` style; the width comes from metadata.
    Fixchar = 13,
    /// Dictionary-encoded strings with 8-bit level indices.
    EnumU8 = 14,
    EnumU16 = 15,
    EnumU32 = 16,
    /// Timestamp: microseconds since 0000-03-01, UTC.
    DateTimeMicros = 17,
    /// Timestamp: bit-packed date/time fields (see `colbuf-codecs`).
    DateTimePacked = 18,
    /// Time of day: milliseconds since midnight.
    TimeOfDayMillis = 19,
    /// Date: days since 0000-03-01.
    DateDays = 20,
    /// Year and month: months since 0000-03, exact under month arithmetic.
    YearMonth = 21,
    /// Opaque host-managed object handle, one pointer-width slot per row.
    ObjectPtr = 22,
}

/// Number of storage types, including the `Void` placeholder.
pub const STORAGE_TYPE_COUNT: usize = 23;

impl StorageType {
    /// All storage types, indexed by their stable ordinal.
    pub const ALL: [StorageType; STORAGE_TYPE_COUNT] = [
        StorageType::Void,
        StorageType::BooleanI8,
        StorageType::IntegerI8,
        StorageType::IntegerI16,
        StorageType::IntegerI32,
        StorageType::IntegerI64,
        StorageType::RealF32,
        StorageType::RealF64,
        StorageType::DecimalI16,
        StorageType::DecimalI32,
        StorageType::DecimalI64,
        StorageType::VarcharI32,
        StorageType::VarcharI64,
        StorageType::Fixchar,
        StorageType::EnumU8,
        StorageType::EnumU16,
        StorageType::EnumU32,
        StorageType::DateTimeMicros,
        StorageType::DateTimePacked,
        StorageType::TimeOfDayMillis,
        StorageType::DateDays,
        StorageType::YearMonth,
        StorageType::ObjectPtr,
    ];

    /// Returns the stable ordinal of this storage type.
    #[inline]
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Converts a stable ordinal back into a storage type.
    ///
    /// Returns `None` when the ordinal is out of range.
    pub fn from_ordinal(ordinal: u8) -> Option<StorageType> {
        StorageType::ALL.get(ordinal as usize).copied()
    }

    /// Returns the immutable descriptor for this storage type.
    ///
    /// The lookup is total: every variant, including `Void`, has an entry.
    #[inline]
    pub fn info(&self) -> &'static StorageTypeInfo {
        &registry()[self.ordinal() as usize]
    }

    /// Returns the 3-character human-readable code of this storage type.
    ///
    /// The codes are part of the wire contract and stable across versions.
    #[inline]
    pub fn code(&self) -> &'static str {
        self.info().code
    }

    /// Returns the logical type implemented by this storage type.
    #[inline]
    pub fn logical_type(&self) -> LogicalType {
        self.info().logical_type
    }

    /// Returns `true` if columns of this storage type carry a metadata
    /// descriptor (see [`crate::metadata::Metadata`]).
    #[inline]
    pub fn requires_metadata(&self) -> bool {
        self.info().requires_metadata
    }

    /// Returns the minimal number of storage bytes per element.
    ///
    /// For fixed-size types this is the exact element width, so a column with
    /// `n` rows occupies `n * min_element_size()` bytes (plus, for variable
    /// width strings, the payload section). For `Fixchar` the width comes from
    /// metadata and this returns 0.
    #[inline]
    pub fn min_element_size(&self) -> usize {
        self.info().min_element_size
    }

    /// Verifies that this storage type may be used as an operand, i.e. that it
    /// is not the `Void` placeholder.
    pub fn verify_usable(&self) -> Result<()> {
        if *self == StorageType::Void {
            return Err(Error::type_mismatch("a concrete storage type", "void"));
        }
        Ok(())
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Immutable per-storage-type facts, for programmatic access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTypeInfo {
    /// 3-character label, easily understandable by humans.
    pub code: &'static str,
    /// Storage bytes per element; minimal per-element size for variable-size
    /// types, 0 where the size is entirely metadata-driven.
    pub min_element_size: usize,
    /// Whether columns of this type carry a metadata descriptor.
    pub requires_metadata: bool,
    /// The logical type this storage type implements.
    pub logical_type: LogicalType,
}

const fn build_registry() -> [StorageTypeInfo; STORAGE_TYPE_COUNT] {
    const fn row(
        code: &'static str,
        min_element_size: usize,
        requires_metadata: bool,
        logical_type: LogicalType,
    ) -> StorageTypeInfo {
        StorageTypeInfo {
            code,
            min_element_size,
            requires_metadata,
            logical_type,
        }
    }
    [
        row("---", 0, false, LogicalType::Unknown),
        row("i1b", 1, false, LogicalType::Boolean),
        row("i1i", 1, false, LogicalType::Integer),
        row("i2i", 2, false, LogicalType::Integer),
        row("i4i", 4, false, LogicalType::Integer),
        row("i8i", 8, false, LogicalType::Integer),
        row("f4r", 4, false, LogicalType::Real),
        row("f8r", 8, false, LogicalType::Real),
        row("i2r", 2, true, LogicalType::Real),
        row("i4r", 4, true, LogicalType::Real),
        row("i8r", 8, true, LogicalType::Real),
        row("i4s", 4, true, LogicalType::String),
        row("i8s", 8, true, LogicalType::String),
        row("c#s", 0, true, LogicalType::String),
        row("u1e", 1, true, LogicalType::String),
        row("u2e", 2, true, LogicalType::String),
        row("u4e", 4, true, LogicalType::String),
        row("i8d", 8, false, LogicalType::DateTime),
        row("i8w", 8, false, LogicalType::DateTime),
        row("i4t", 4, false, LogicalType::DateTime),
        row("i4d", 4, false, LogicalType::DateTime),
        row("i2d", 2, false, LogicalType::DateTime),
        row("p8p", 8, false, LogicalType::Object),
    ]
}

static REGISTRY: OnceLock<[StorageTypeInfo; STORAGE_TYPE_COUNT]> = OnceLock::new();

fn registry() -> &'static [StorageTypeInfo; STORAGE_TYPE_COUNT] {
    REGISTRY.get_or_init(build_registry)
}

/// Populates the process-wide storage type registry.
///
/// Idempotent; lookups self-initialize, so calling this is only needed to make
/// startup cost deterministic. The registry is read-only afterwards.
pub fn initialize() {
    let _ = registry();
}

/// Resolves a storage type by its stable ordinal and returns its descriptor.
///
/// Unlike [`StorageType::info`], which is total, this rejects out-of-range
/// ordinals with a type mismatch error.
pub fn info_of(ordinal: u8) -> Result<&'static StorageTypeInfo> {
    let stype = StorageType::from_ordinal(ordinal).ok_or_else(|| {
        Error::type_mismatch("a storage type ordinal in 0..23", ordinal.to_string())
    })?;
    Ok(stype.info())
}
