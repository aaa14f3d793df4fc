//! Modified UTF-8 (MUTF-8) text codec shared by the string storage families.
//!
//! MUTF-8 differs from UTF-8 in exactly one way: the NUL character is encoded
//! as the two-byte sequence `0xC0 0x80` instead of `0x00`. A literal `0x00`
//! byte therefore never appears inside encoded text, and neither does `0xFF`
//! (which is not a valid UTF-8 byte to begin with). This leaves both bytes
//! free for framing: `0x00` as an end-of-string marker and [`FILL_BYTE`] as
//! padding/filler that can never be confused with content.

use colbuf_common::{Result, error::Error};

/// The byte used to pad string sections; not a valid (M)UTF-8 byte.
pub const FILL_BYTE: u8 = 0xFF;

/// Appends the MUTF-8 encoding of `text` to `out` and returns the number of
/// bytes written.
pub fn encode_into(text: &str, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    for &byte in text.as_bytes() {
        if byte == 0 {
            out.extend_from_slice(&[0xC0, 0x80]);
        } else {
            out.push(byte);
        }
    }
    out.len() - start
}

/// Returns the MUTF-8 encoded length of `text` in bytes.
pub fn encoded_len(text: &str) -> usize {
    let nuls = text.as_bytes().iter().filter(|&&b| b == 0).count();
    text.len() + nuls
}

/// Decodes an MUTF-8 byte range back into a string, turning the `0xC0 0x80`
/// substitute back into NUL.
///
/// Fails with a malformed layout error when the range contains a literal
/// `0x00`, a `0xFF` filler byte, or is otherwise not valid UTF-8.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x00 => {
                return Err(Error::malformed_layout(
                    "string data",
                    "literal NUL byte inside encoded text",
                ));
            }
            FILL_BYTE => {
                return Err(Error::malformed_layout(
                    "string data",
                    "filler byte inside encoded text",
                ));
            }
            0xC0 if bytes.get(i + 1) == Some(&0x80) => {
                out.push(0x00);
                i += 2;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|_| Error::malformed_layout("string data", "invalid UTF-8 sequence"))
}
