//! The logical (semantic) type of a column.

/// Logical type of a data column.
///
/// A logical type matches the user's notion of a column type: `Integer`
/// corresponds to the mathematical set of integers, regardless of how wide the
/// underlying storage is. Each logical type may be backed by multiple storage
/// types (see [`crate::storage::StorageType`]), and all storage types within
/// one logical type are freely interchangeable from the caller's perspective.
///
/// `Unknown` is a marker for a column whose type has not been determined yet
/// (for example, a column whose type should be auto-detected from the data);
/// it has no storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LogicalType {
    Unknown = 0,
    Boolean = 1,
    Integer = 2,
    Real = 3,
    String = 4,
    DateTime = 5,
    Duration = 6,
    Object = 7,
}

impl LogicalType {
    /// All logical types, in ordinal order.
    pub const ALL: [LogicalType; 8] = [
        LogicalType::Unknown,
        LogicalType::Boolean,
        LogicalType::Integer,
        LogicalType::Real,
        LogicalType::String,
        LogicalType::DateTime,
        LogicalType::Duration,
        LogicalType::Object,
    ];

    /// Returns `true` if this is a numeric logical type (boolean, integer or
    /// real). Numeric types participate in arithmetic promotion in the engine
    /// layer above this crate.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Boolean | LogicalType::Integer | LogicalType::Real
        )
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogicalType::Unknown => "unknown",
            LogicalType::Boolean => "boolean",
            LogicalType::Integer => "integer",
            LogicalType::Real => "real",
            LogicalType::String => "string",
            LogicalType::DateTime => "datetime",
            LogicalType::Duration => "duration",
            LogicalType::Object => "object",
        };
        f.write_str(name)
    }
}
