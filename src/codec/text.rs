//! Fixed-width text fields.
//!
//! Map names and picture names are stored as 32-byte, NUL padded strings in
//! the GB2312 charset. Decoding goes through `encoding_rs::GBK`, which is a
//! superset of GB2312. Encoding uses the same table but rejects any output
//! outside the EUC-CN range, so written files stay readable as GB2312.

use encoding_rs::{Encoding, GBK, UTF_8};

use crate::error::{Error, Result};

/// Charset used for fixed-width text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Gb2312,
    Utf8,
}

impl Charset {
    fn encoding(self) -> &'static Encoding {
        match self {
            Charset::Gb2312 => GBK,
            Charset::Utf8 => UTF_8,
        }
    }

    /// Encode `text` into at most `width` bytes. The result is not padded.
    pub fn encode(self, field: &'static str, text: &str, width: usize) -> Result<Vec<u8>> {
        let (bytes, _, unmappable) = self.encoding().encode(text);
        if unmappable || (self == Charset::Gb2312 && !is_euc_cn(&bytes)) {
            return Err(Error::UnmappableText { field });
        }
        if bytes.len() > width {
            return Err(Error::FieldOverflow { field, len: bytes.len(), max: width });
        }
        Ok(bytes.into_owned())
    }

    /// Decode a full fixed-width field. Trailing NUL padding is dropped
    /// first, then trailing spaces.
    pub fn decode(self, field: &'static str, raw: &[u8]) -> String {
        let raw = trim_end(raw, 0);
        let raw = trim_end(raw, b' ');
        let (text, malformed) = self.encoding().decode_without_bom_handling(raw);
        if malformed {
            tracing::debug!(field, "malformed {:?} text replaced", self);
        }
        text.into_owned()
    }
}

fn trim_end(raw: &[u8], pad: u8) -> &[u8] {
    let end = raw.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    &raw[..end]
}

/// ASCII bytes, or two-byte pairs with lead 0xA1-0xF7 and trail 0xA1-0xFE
fn is_euc_cn(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x00..=0x7F => i += 1,
            0xA1..=0xF7 => match bytes.get(i + 1) {
                Some(0xA1..=0xFE) => i += 2,
                _ => return false,
            },
            _ => return false,
        }
    }
    true
}
