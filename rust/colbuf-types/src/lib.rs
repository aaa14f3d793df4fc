//! Type catalogue for the column value encoding: logical types, storage types
//! and their registry, NA sentinels, and per-column metadata descriptors.

pub mod logical;
pub mod metadata;
pub mod na;
pub mod storage;

pub use logical::LogicalType;
pub use metadata::{DecimalMetadata, EnumMetadata, FixcharMetadata, Metadata, VarcharMetadata};
pub use storage::{StorageType, StorageTypeInfo, initialize};
