//! Declarative fixed-width field layouts.
//!
//! Every fixed-size block in a map file (the file header, the element
//! header, the jump point header) is described by a `&[FieldDesc]` table.
//! `read_fields` and `write_fields` walk a table in order, so a layout
//! change is a table edit rather than new parse code.

use indexmap::IndexMap;

use super::text::Charset;
use super::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed big-endian integer
    Int,
    /// Padded text in the configured charset
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDesc {
    pub name: &'static str,
    pub kind: FieldKind,
    pub width: usize,
}

const fn int(name: &'static str) -> FieldDesc {
    FieldDesc { name, kind: FieldKind::Int, width: 4 }
}

const fn text(name: &'static str) -> FieldDesc {
    FieldDesc { name, kind: FieldKind::Text, width: 32 }
}

pub const HEADER_FIELDS: &[FieldDesc] = &[
    int("map_id"),
    int("map_type"),
    text("map_name"),
    text("map_picture"),
    int("tile_col"),
    int("tile_row"),
    int("element_num"),
    int("jump_point_num"),
    int("offset_x"),
    int("offset_y"),
    int("tw"),
    int("th"),
];

pub const ELEMENT_HEADER_FIELDS: &[FieldDesc] = &[
    int("id"),
    int("index_tx"),
    int("index_ty"),
    int("type"),
    int("data_length"),
];

pub const JUMP_POINT_HEADER_FIELDS: &[FieldDesc] = &[
    int("id"),
    int("index_tx"),
    int("index_ty"),
    int("target_map_id"),
    int("target_index_tx"),
    int("target_index_ty"),
    int("hw"),
    int("yl"),
    int("wl"),
    int("min_level"),
    int("max_level"),
    int("data_length"),
];

/// Total encoded size of a layout in bytes
pub const fn layout_size(fields: &[FieldDesc]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].width;
        i += 1;
    }
    total
}

pub const HEADER_SIZE: usize = layout_size(HEADER_FIELDS);
pub const ELEMENT_HEADER_SIZE: usize = layout_size(ELEMENT_HEADER_FIELDS);
pub const JUMP_POINT_HEADER_SIZE: usize = layout_size(JUMP_POINT_HEADER_FIELDS);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i32),
    Text(String),
}

/// Decoded field values in layout order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(IndexMap<&'static str, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_int(&mut self, name: &'static str, v: i32) -> &mut Self {
        self.0.insert(name, FieldValue::Int(v));
        self
    }

    pub fn set_text(&mut self, name: &'static str, v: impl Into<String>) -> &mut Self {
        self.0.insert(name, FieldValue::Text(v.into()));
        self
    }

    pub fn int(&self, name: &str) -> Result<i32> {
        match self.0.get(name) {
            Some(FieldValue::Int(v)) => Ok(*v),
            Some(FieldValue::Text(_)) => Err(Error::InvariantViolation(format!(
                "field `{name}` is text, expected integer"
            ))),
            None => Err(Error::InvariantViolation(format!("missing field `{name}`"))),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        match self.0.get(name) {
            Some(FieldValue::Text(v)) => Ok(v.as_str()),
            Some(FieldValue::Int(_)) => Err(Error::InvariantViolation(format!(
                "field `{name}` is integer, expected text"
            ))),
            None => Err(Error::InvariantViolation(format!("missing field `{name}`"))),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Read one block described by `fields`, advancing `reader` by its full size.
///
/// The block is taken from the reader in one piece first, so a short input
/// fails before any field is interpreted.
pub fn read_fields(
    reader: &mut BinaryReader,
    fields: &[FieldDesc],
    charset: Charset,
) -> Result<FieldMap> {
    let block = reader.read_bytes(layout_size(fields))?;
    let mut block = BinaryReader::new(block);
    let mut map = FieldMap(IndexMap::with_capacity(fields.len()));

    for f in fields {
        let value = match f.kind {
            FieldKind::Int => FieldValue::Int(block.read_i32_be()?),
            FieldKind::Text => FieldValue::Text(charset.decode(f.name, block.read_bytes(f.width)?)),
        };
        map.0.insert(f.name, value);
    }

    Ok(map)
}

/// Write the values in `map` following the order and widths of `fields`.
///
/// All values are validated before anything is written, so on error the
/// writer is left untouched.
pub fn write_fields(
    writer: &mut BinaryWriter,
    fields: &[FieldDesc],
    map: &FieldMap,
    charset: Charset,
) -> Result<()> {
    let mut block = BinaryWriter::with_capacity(layout_size(fields));

    for f in fields {
        match f.kind {
            FieldKind::Int => block.write_i32_be(map.int(f.name)?),
            FieldKind::Text => {
                let bytes = charset.encode(f.name, map.text(f.name)?, f.width)?;
                block.write_padded(&bytes, f.width);
            }
        }
    }

    writer.write_bytes(block.as_slice());
    Ok(())
}
