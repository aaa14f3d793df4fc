//! Family codecs for the column value encoding.
//!
//! Each codec interprets a raw byte buffer plus its per-column metadata
//! according to its storage type, turning `(metadata, buffer, row index)` into
//! a logical value or NA, and the reverse for construction. All codecs are
//! pure functions over immutable buffers: once a column is published, any
//! number of readers may decode it concurrently, and every change means
//! building a new column.

pub mod column;
pub mod datetime;
pub mod decimal;
pub mod dictionary;
pub mod element;
pub mod fixchar;
pub mod mutf8;
pub mod object;
pub mod varchar;

pub use column::Column;
pub use object::ObjectHandle;
