//! Fixed-width string codec, `CHAR(n)` style.
//!
//! Every row occupies exactly `width` bytes (from the metadata), with no
//! offset table. Strings shorter than `width` are right-padded with
//! [`FILL_BYTE`]; a row whose every byte is the filler is NA. Trailing filler
//! bytes are always stripped on decode, so the filler can never be legitimate
//! trailing content.

use colbuf_common::{Result, error::Error};
use colbuf_types::FixcharMetadata;

use crate::mutf8::{self, FILL_BYTE};

/// Encodes a sequence of optional strings into a fixed-width string buffer.
///
/// Fails with a capacity error when a string's encoded length exceeds `width`.
pub fn encode<'a>(
    rows: impl IntoIterator<Item = Option<&'a str>>,
    width: u32,
) -> Result<(Vec<u8>, FixcharMetadata)> {
    if width == 0 {
        return Err(Error::invalid_arg("width", "fixchar width must be positive"));
    }
    let width = width as usize;
    let mut buffer = Vec::new();
    for (row, text) in rows.into_iter().enumerate() {
        match text {
            Some(text) => {
                let encoded = mutf8::encoded_len(text);
                if encoded > width {
                    return Err(Error::capacity_exceeded(
                        "c#s",
                        format!("row {row} needs {encoded} bytes, column width is {width}"),
                    ));
                }
                mutf8::encode_into(text, &mut buffer);
                buffer.resize(buffer.len() + (width - encoded), FILL_BYTE);
            }
            None => buffer.resize(buffer.len() + width, FILL_BYTE),
        }
    }
    Ok((
        buffer,
        FixcharMetadata {
            width: width as u32,
        },
    ))
}

/// A read-only view over a fixed-width string column buffer.
#[derive(Debug, Clone)]
pub struct FixcharView<'a> {
    buffer: &'a [u8],
    width: usize,
    row_count: usize,
}

impl<'a> FixcharView<'a> {
    /// Creates a view over `buffer` holding `row_count` cells of
    /// `metadata.width` bytes each.
    pub fn new(
        buffer: &'a [u8],
        metadata: &FixcharMetadata,
        row_count: usize,
    ) -> Result<FixcharView<'a>> {
        if metadata.width == 0 {
            return Err(Error::invalid_arg("width", "fixchar width must be positive"));
        }
        let width = metadata.width as usize;
        let expected = width.checked_mul(row_count).ok_or_else(|| {
            Error::malformed_layout(
                "c#s",
                format!("row count {row_count} overflows the buffer size"),
            )
        })?;
        if buffer.len() != expected {
            return Err(Error::malformed_layout(
                "c#s",
                format!(
                    "buffer holds {} bytes, expected {expected} for {row_count} rows of width {width}",
                    buffer.len()
                ),
            ));
        }
        Ok(FixcharView {
            buffer,
            width,
            row_count,
        })
    }

    /// Returns the number of rows in the column.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    fn cell(&self, index: usize) -> &'a [u8] {
        &self.buffer[index * self.width..(index + 1) * self.width]
    }

    /// Returns `true` if the row at `index` is NA (every cell byte is the
    /// filler).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_na(&self, index: usize) -> bool {
        assert!(index < self.row_count);
        self.cell(index).iter().all(|&b| b == FILL_BYTE)
    }

    /// Decodes the row at `index`, stripping trailing filler bytes; returns
    /// `None` for NA.
    pub fn get(&self, index: usize) -> Result<Option<String>> {
        if index >= self.row_count {
            return Err(Error::invalid_arg(
                "index",
                format!("row {index} out of {} rows", self.row_count),
            ));
        }
        let cell = self.cell(index);
        let content_len = cell
            .iter()
            .rposition(|&b| b != FILL_BYTE)
            .map(|p| p + 1)
            .unwrap_or(0);
        if content_len == 0 {
            // An all-filler cell is NA; a present empty string encodes
            // identically and therefore also reads back as NA.
            return Ok(None);
        }
        mutf8::decode(&cell[..content_len]).map(Some)
    }
}
