//! The column carrier: one storage type, its metadata (when the storage type
//! requires one), a raw byte buffer, and a row count.
//!
//! Construction validates the whole package once: metadata presence must agree
//! with the storage type's registry entry, the metadata variant must be the
//! right one, and the buffer size must be exactly what the storage type,
//! metadata and row count determine. A published column is immutable; any
//! row-content change means constructing a new column.

use colbuf_common::{Result, error::Error};
use colbuf_types::{Metadata, StorageType, na};

use crate::decimal::{DecimalView, DecimalWidth};
use crate::dictionary::{self, EnumIndex, EnumView};
use crate::element::FixedElement;
use crate::fixchar::{self, FixcharView};
use crate::varchar::{self, VarcharOffset, VarcharView};

#[derive(Debug, Clone)]
pub struct Column {
    storage_type: StorageType,
    metadata: Option<Metadata>,
    data: Vec<u8>,
    row_count: usize,
}

impl Column {
    /// Assembles and validates a column from its raw parts.
    pub fn new(
        storage_type: StorageType,
        metadata: Option<Metadata>,
        data: Vec<u8>,
        row_count: usize,
    ) -> Result<Column> {
        storage_type.verify_usable()?;
        match (&metadata, storage_type.requires_metadata()) {
            (None, true) => {
                return Err(Error::type_mismatch(
                    format!("metadata for {storage_type}"),
                    "no metadata",
                ));
            }
            (Some(_), false) => {
                return Err(Error::type_mismatch(
                    format!("no metadata for {storage_type}"),
                    "metadata",
                ));
            }
            _ => {}
        }
        if let Some(meta) = &metadata {
            if !meta.matches(storage_type) {
                return Err(Error::type_mismatch(
                    format!("metadata for {storage_type}"),
                    "a different metadata variant",
                ));
            }
        }

        let column = Column {
            storage_type,
            metadata,
            data,
            row_count,
        };
        column.verify_layout()?;
        Ok(column)
    }

    /// Builds a fixed-width column from raw element values.
    ///
    /// The element width of `T` must equal the storage type's element size;
    /// sentinel placement is the caller's concern (this is the raw-buffer
    /// entry point; the typed encode paths of the codec modules place
    /// sentinels themselves).
    pub fn from_elements<T: FixedElement>(
        storage_type: StorageType,
        values: &[T],
    ) -> Result<Column> {
        storage_type.verify_usable()?;
        if storage_type.requires_metadata() || T::SIZE != storage_type.min_element_size() {
            return Err(Error::type_mismatch(
                format!(
                    "a metadata-free storage type with {}-byte elements",
                    T::SIZE
                ),
                storage_type.to_string(),
            ));
        }
        Column::new(
            storage_type,
            None,
            crate::element::elements_to_bytes(values),
            values.len(),
        )
    }

    /// Builds a variable-width string column from optional rows.
    pub fn varchar<'a, T: VarcharOffset>(
        rows: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<Column> {
        let rows: Vec<Option<&str>> = rows.into_iter().collect();
        let (data, meta) = varchar::encode::<T>(rows.iter().copied())?;
        Column::new(
            T::STORAGE_TYPE,
            Some(Metadata::Varchar(meta)),
            data,
            rows.len(),
        )
    }

    /// Builds a fixed-width string column from optional rows.
    pub fn fixchar<'a>(
        rows: impl IntoIterator<Item = Option<&'a str>>,
        width: u32,
    ) -> Result<Column> {
        let rows: Vec<Option<&str>> = rows.into_iter().collect();
        let (data, meta) = fixchar::encode(rows.iter().copied(), width)?;
        Column::new(
            StorageType::Fixchar,
            Some(Metadata::Fixchar(meta)),
            data,
            rows.len(),
        )
    }

    /// Builds a dictionary-encoded string column from optional rows, deriving
    /// the dictionary from their distinct values.
    pub fn dictionary<'a, T: EnumIndex>(
        rows: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<Column> {
        let rows: Vec<Option<&str>> = rows.into_iter().collect();
        let (data, meta) = dictionary::encode::<T>(rows.iter().copied())?;
        Column::new(
            T::STORAGE_TYPE,
            Some(Metadata::Enum(meta)),
            data,
            rows.len(),
        )
    }

    /// Builds a fixed-point decimal column from optional logical values.
    pub fn decimal<T: DecimalWidth>(
        rows: impl IntoIterator<Item = Option<f64>>,
        metadata: colbuf_types::DecimalMetadata,
    ) -> Result<Column> {
        let rows: Vec<Option<f64>> = rows.into_iter().collect();
        let data = crate::decimal::encode_column::<T>(rows.iter().copied(), &metadata)?;
        Column::new(
            T::STORAGE_TYPE,
            Some(Metadata::Decimal(metadata)),
            data,
            rows.len(),
        )
    }

    fn verify_layout(&self) -> Result<()> {
        match self.storage_type {
            StorageType::VarcharI32 => {
                let meta = self.required_metadata()?.as_varchar()?;
                VarcharView::<i32>::new(&self.data, meta, self.row_count)?;
            }
            StorageType::VarcharI64 => {
                let meta = self.required_metadata()?.as_varchar()?;
                VarcharView::<i64>::new(&self.data, meta, self.row_count)?;
            }
            StorageType::Fixchar => {
                let meta = self.required_metadata()?.as_fixchar()?;
                FixcharView::new(&self.data, meta, self.row_count)?;
            }
            StorageType::EnumU8 => self.verify_enum_layout::<u8>()?,
            StorageType::EnumU16 => self.verify_enum_layout::<u16>()?,
            StorageType::EnumU32 => self.verify_enum_layout::<u32>()?,
            _ => {
                let expected = self
                    .storage_type
                    .min_element_size()
                    .checked_mul(self.row_count)
                    .ok_or_else(|| {
                        Error::malformed_layout(
                            self.storage_type.code(),
                            format!("row count {} overflows the buffer size", self.row_count),
                        )
                    })?;
                if self.data.len() != expected {
                    return Err(Error::malformed_layout(
                        self.storage_type.code(),
                        format!(
                            "buffer holds {} bytes, expected {expected} for {} rows",
                            self.data.len(),
                            self.row_count
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    // The view checks the level capacity against the index width and the
    // buffer size; the index scan rejects stored indices beyond the levels.
    fn verify_enum_layout<T: EnumIndex>(&self) -> Result<()> {
        let meta = self.required_metadata()?.as_enum()?;
        EnumView::<T>::new(&self.data, meta, self.row_count)?.verify_indices()
    }

    #[inline]
    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    #[inline]
    pub fn logical_type(&self) -> colbuf_types::LogicalType {
        self.storage_type.logical_type()
    }

    #[inline]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the raw element bytes of one row.
    ///
    /// For the variable-width string types this is the row's signed offset
    /// (whose sign encodes nullability), for `Fixchar` the full `width`-byte
    /// cell, and for every other type the fixed-width element itself.
    pub fn element(&self, index: usize) -> Result<&[u8]> {
        if index >= self.row_count {
            return Err(Error::invalid_arg(
                "index",
                format!("row {index} out of {} rows", self.row_count),
            ));
        }
        let (base, size) = match self.storage_type {
            StorageType::VarcharI32 | StorageType::VarcharI64 => {
                let meta = self.required_metadata()?.as_varchar()?;
                (meta.offsets_start as usize, self.storage_type.min_element_size())
            }
            StorageType::Fixchar => {
                let meta = self.required_metadata()?.as_fixchar()?;
                (0, meta.width as usize)
            }
            _ => (0, self.storage_type.min_element_size()),
        };
        let start = base + index * size;
        Ok(&self.data[start..start + size])
    }

    /// Returns `true` if the row at `index` holds the storage type's NA
    /// sentinel.
    pub fn is_na(&self, index: usize) -> Result<bool> {
        na::is_na_element(self.storage_type, self.element(index)?)
    }

    /// Reads the raw fixed-width element at `index` as `T`, sentinel included.
    pub fn element_as<T: FixedElement>(&self, index: usize) -> Result<T> {
        let bytes = self.element(index)?;
        if bytes.len() != T::SIZE {
            return Err(Error::type_mismatch(
                format!("a {}-byte element", bytes.len()),
                format!("a {}-byte read", T::SIZE),
            ));
        }
        Ok(T::read_le(bytes))
    }

    /// Returns a validated variable-width string view of this column.
    pub fn varchar_view<T: VarcharOffset>(&self) -> Result<VarcharView<'_, T>> {
        self.verify_storage_type(T::STORAGE_TYPE)?;
        let meta = self.required_metadata()?.as_varchar()?;
        VarcharView::new(&self.data, meta, self.row_count)
    }

    /// Returns a fixed-width string view of this column.
    pub fn fixchar_view(&self) -> Result<FixcharView<'_>> {
        self.verify_storage_type(StorageType::Fixchar)?;
        let meta = self.required_metadata()?.as_fixchar()?;
        FixcharView::new(&self.data, meta, self.row_count)
    }

    /// Returns a dictionary string view of this column.
    pub fn enum_view<T: EnumIndex>(&self) -> Result<EnumView<'_, T>> {
        self.verify_storage_type(T::STORAGE_TYPE)?;
        let meta = self.required_metadata()?.as_enum()?;
        EnumView::new(&self.data, meta, self.row_count)
    }

    /// Returns a fixed-point decimal view of this column.
    pub fn decimal_view<T: DecimalWidth>(&self) -> Result<DecimalView<'_, T>> {
        self.verify_storage_type(T::STORAGE_TYPE)?;
        let meta = self.required_metadata()?.as_decimal()?;
        DecimalView::new(&self.data, meta, self.row_count)
    }

    // Present after construction for every metadata-carrying storage type.
    fn required_metadata(&self) -> Result<&Metadata> {
        self.metadata.as_ref().ok_or_else(|| {
            Error::type_mismatch(format!("metadata for {}", self.storage_type), "no metadata")
        })
    }

    fn verify_storage_type(&self, expected: StorageType) -> Result<()> {
        if self.storage_type != expected {
            return Err(Error::type_mismatch(
                expected.to_string(),
                self.storage_type.to_string(),
            ));
        }
        Ok(())
    }
}
