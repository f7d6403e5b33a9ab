//! Decompressed map payload layout (all integers big-endian):
//!
//! ```text
//! header       104 bytes            HEADER_FIELDS
//! tiles        tile_col * tile_row  one flag byte per tile, column by column
//! elements     element_num x        20-byte header + data_length bytes
//! jump points  jump_point_num x     48-byte header + data_length bytes
//! ```

use flate2::Compression;

use super::fields::{
    read_fields, write_fields, ELEMENT_HEADER_FIELDS, ELEMENT_HEADER_SIZE, HEADER_FIELDS,
    HEADER_SIZE, JUMP_POINT_HEADER_FIELDS, JUMP_POINT_HEADER_SIZE,
};
use super::map_types::{MapElement, MapJumpPoint, TiledMap};
use super::text::Charset;
use super::tile::MapTile;
use super::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

/// Codec settings. The defaults read and write files produced by the
/// original game tools.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    /// Charset of `map_name` and `map_picture`
    pub charset: Charset,
    /// Largest `tile_col * tile_row` accepted by `decode` and `encode`
    pub max_tiles: usize,
    /// Largest single element or jump point payload accepted by `decode`
    /// and `encode`
    pub max_data_length: usize,
    /// zlib level used when saving
    pub compression: Compression,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            charset: Charset::Gb2312,
            max_tiles: 16 * 1024 * 1024,
            max_data_length: 16 * 1024 * 1024,
            compression: Compression::default(),
        }
    }
}

/// Converts between `TiledMap` and the decompressed payload bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct MapCodec {
    pub options: CodecOptions,
}

impl MapCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn decode(&self, data: &[u8]) -> Result<TiledMap> {
        let mut reader = BinaryReader::new(data);
        let charset = self.options.charset;

        let header = read_fields(&mut reader, HEADER_FIELDS, charset)?;
        let mut map = TiledMap::from_header(&header)?;
        tracing::debug!(
            map_id = map.map_id,
            cols = map.tile_col,
            rows = map.tile_row,
            elements = map.element_num,
            jump_points = map.jump_point_num,
            "decoded map header"
        );

        let tile_count = self.grid_size(map.tile_col, map.tile_row)?;
        map.tiles = reader
            .read_bytes(tile_count)?
            .iter()
            .map(|&b| MapTile::from_byte(b))
            .collect();

        let element_num = non_negative("element_num", map.element_num)?;
        map.elements = Vec::with_capacity(element_num.min(reader.remaining() / ELEMENT_HEADER_SIZE));
        for _ in 0..element_num {
            let fields = read_fields(&mut reader, ELEMENT_HEADER_FIELDS, charset)?;
            let mut element = MapElement::from_header(&fields)?;
            element.data = self.read_payload(&mut reader, element.data_length)?;
            map.elements.push(element);
        }

        let jump_point_num = non_negative("jump_point_num", map.jump_point_num)?;
        map.jump_points =
            Vec::with_capacity(jump_point_num.min(reader.remaining() / JUMP_POINT_HEADER_SIZE));
        for _ in 0..jump_point_num {
            let fields = read_fields(&mut reader, JUMP_POINT_HEADER_FIELDS, charset)?;
            let mut jump_point = MapJumpPoint::from_header(&fields)?;
            jump_point.data = self.read_payload(&mut reader, jump_point.data_length)?;
            map.jump_points.push(jump_point);
        }

        if !reader.is_empty() {
            tracing::debug!(trailing = reader.remaining(), "ignoring bytes after last jump point");
        }

        Ok(map)
    }

    pub fn encode(&self, map: &TiledMap) -> Result<Vec<u8>> {
        self.validate(map)?;
        let charset = self.options.charset;

        let mut writer = BinaryWriter::with_capacity(encoded_size_hint(map));
        write_fields(&mut writer, HEADER_FIELDS, &map.header_fields(), charset)?;

        for &tile in &map.tiles {
            writer.write_u8(tile.to_byte());
        }

        for (i, element) in map.elements.iter().enumerate() {
            self.check_payload("element", i, element.data_length, &element.data)?;
            write_fields(&mut writer, ELEMENT_HEADER_FIELDS, &element.header_fields(), charset)?;
            writer.write_bytes(&element.data);
        }

        for (i, jump_point) in map.jump_points.iter().enumerate() {
            self.check_payload("jump point", i, jump_point.data_length, &jump_point.data)?;
            write_fields(&mut writer, JUMP_POINT_HEADER_FIELDS, &jump_point.header_fields(), charset)?;
            writer.write_bytes(&jump_point.data);
        }

        tracing::debug!(map_id = map.map_id, bytes = writer.len(), "encoded map");
        Ok(writer.into_vec())
    }

    fn grid_size(&self, cols: i32, rows: i32) -> Result<usize> {
        let cols_n = non_negative("tile_col", cols)?;
        let rows_n = non_negative("tile_row", rows)?;
        let max = self.options.max_tiles;
        match cols_n.checked_mul(rows_n) {
            Some(n) if n <= max => Ok(n),
            _ => Err(Error::GridTooLarge { cols, rows, max }),
        }
    }

    fn read_payload(&self, reader: &mut BinaryReader, data_length: i32) -> Result<Vec<u8>> {
        let len = non_negative("data_length", data_length)?;
        if len > self.options.max_data_length {
            return Err(Error::PayloadTooLarge { len, max: self.options.max_data_length });
        }
        reader.read_vec(len)
    }

    /// Document-level invariants checked before any byte is written
    fn validate(&self, map: &TiledMap) -> Result<()> {
        let expected = i64::from(map.tile_col) * i64::from(map.tile_row);
        if map.tile_col < 0 || map.tile_row < 0 || map.tiles.len() as i64 != expected {
            return Err(Error::InvariantViolation(format!(
                "{} tiles for a {}x{} grid",
                map.tiles.len(),
                map.tile_col,
                map.tile_row
            )));
        }
        if map.elements.len() as i64 != i64::from(map.element_num) {
            return Err(Error::InvariantViolation(format!(
                "element_num is {} but map has {} elements",
                map.element_num,
                map.elements.len()
            )));
        }
        if map.jump_points.len() as i64 != i64::from(map.jump_point_num) {
            return Err(Error::InvariantViolation(format!(
                "jump_point_num is {} but map has {} jump points",
                map.jump_point_num,
                map.jump_points.len()
            )));
        }
        // a grid this codec would refuse to load is not written either
        self.grid_size(map.tile_col, map.tile_row)?;
        Ok(())
    }

    fn check_payload(&self, what: &str, index: usize, data_length: i32, data: &[u8]) -> Result<()> {
        if data.len() as i64 != i64::from(data_length) {
            return Err(Error::InvariantViolation(format!(
                "{what} {index}: data_length is {data_length} but data has {} bytes",
                data.len()
            )));
        }
        let max = self.options.max_data_length;
        if data.len() > max {
            return Err(Error::PayloadTooLarge { len: data.len(), max });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::NegativeLength { field, value })
}

fn encoded_size_hint(map: &TiledMap) -> usize {
    let elements: usize = map.elements.iter().map(|e| ELEMENT_HEADER_SIZE + e.data.len()).sum();
    let jump_points: usize =
        map.jump_points.iter().map(|j| JUMP_POINT_HEADER_SIZE + j.data.len()).sum();
    HEADER_SIZE + map.tiles.len() + elements + jump_points
}

/// Decode a decompressed payload with default options
pub fn decode_map(data: &[u8]) -> Result<TiledMap> {
    MapCodec::default().decode(data)
}

/// Encode a map to an uncompressed payload with default options
pub fn encode_map(map: &TiledMap) -> Result<Vec<u8>> {
    MapCodec::default().encode(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TiledMap {
        let mut map = TiledMap::with_size(3, 2);
        map.map_id = 1001;
        map.map_type = 2;
        map.map_name = "落日峡谷".into();
        map.map_picture = "1001.jpg".into();
        map.offset_x = -16;
        map.offset_y = 8;
        map.set_tile(0, 1, MapTile { exist: true, run: true, ..Default::default() });
        map.set_tile(2, 0, MapTile::from_byte(0xFF));

        map.add_element(MapElement::new(1, 4, 5, 3, vec![0xDE, 0xAD]));
        map.add_element(MapElement::new(2, 6, 7, 1, Vec::new()));
        map.add_jump_point(
            MapJumpPoint {
                id: 9,
                index_tx: 1,
                index_ty: 1,
                target_map_id: 1002,
                target_index_tx: 30,
                target_index_ty: 40,
                hw: 2,
                yl: 3,
                wl: 4,
                min_level: 10,
                max_level: 99,
                ..Default::default()
            }
            .with_data(b"portal".to_vec()),
        );
        map.add_jump_point(MapJumpPoint { id: 10, ..Default::default() });
        map
    }

    #[test]
    fn test_roundtrip() {
        let map = sample_map();
        let data = encode_map(&map).unwrap();
        assert_eq!(
            data.len(),
            HEADER_SIZE + 6 + (ELEMENT_HEADER_SIZE * 2 + 2) + (JUMP_POINT_HEADER_SIZE * 2 + 6)
        );
        assert_eq!(decode_map(&data).unwrap(), map);
    }

    #[test]
    fn test_two_by_two_tile_bytes() {
        let mut map = TiledMap::with_size(2, 2);
        map.tiles[0] = MapTile { exist: true, ..Default::default() };
        map.tiles[2] = MapTile { arena: true, ..Default::default() };

        let data = encode_map(&map).unwrap();
        assert_eq!(data.len(), HEADER_SIZE + 4);
        assert_eq!(&data[HEADER_SIZE..], &[0x01, 0x00, 0x40, 0x00]);

        let back = decode_map(&data).unwrap();
        assert_eq!(back.tiles, map.tiles);
    }

    #[test]
    fn test_header_layout() {
        let map = sample_map();
        let data = encode_map(&map).unwrap();
        assert_eq!(&data[0..4], &1001i32.to_be_bytes());
        assert_eq!(&data[4..8], &2i32.to_be_bytes());
        // map_picture starts after two ints and one 32-byte name
        assert_eq!(&data[40..48], b"1001.jpg");
        assert!(data[48..72].iter().all(|&b| b == 0));
        assert_eq!(&data[72..76], &3i32.to_be_bytes());
        assert_eq!(&data[76..80], &2i32.to_be_bytes());
        assert_eq!(&data[96..100], &20i32.to_be_bytes());
    }

    #[test]
    fn test_truncated_header() {
        let data = encode_map(&sample_map()).unwrap();
        let err = decode_map(&data[..HEADER_SIZE - 1]).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { need: 104, .. }));
    }

    #[test]
    fn test_truncated_sections() {
        let data = encode_map(&sample_map()).unwrap();
        for cut in [HEADER_SIZE + 3, HEADER_SIZE + 6 + 10, data.len() - 1] {
            assert!(
                matches!(decode_map(&data[..cut]), Err(Error::TruncatedInput { .. })),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_declared_records_missing() {
        let mut map = TiledMap::default();
        map.element_num = 3;
        let mut header = BinaryWriter::new();
        write_fields(&mut header, HEADER_FIELDS, &map.header_fields(), Charset::Gb2312).unwrap();
        assert!(matches!(
            decode_map(header.as_slice()),
            Err(Error::TruncatedInput { need: 20, have: 0 })
        ));
    }

    #[test]
    fn test_declared_jump_points_missing() {
        let mut map = TiledMap::default();
        map.add_element(MapElement::new(1, 0, 0, 0, vec![1, 2]));
        map.add_jump_point(MapJumpPoint { id: 3, ..Default::default() });
        map.jump_point_num = 2;

        // header, the one element, then a single 48-byte jump point header
        let mut w = BinaryWriter::new();
        write_fields(&mut w, HEADER_FIELDS, &map.header_fields(), Charset::Gb2312).unwrap();
        write_fields(&mut w, ELEMENT_HEADER_FIELDS, &map.elements[0].header_fields(), Charset::Gb2312)
            .unwrap();
        w.write_bytes(&map.elements[0].data);
        write_fields(
            &mut w,
            JUMP_POINT_HEADER_FIELDS,
            &map.jump_points[0].header_fields(),
            Charset::Gb2312,
        )
        .unwrap();

        assert!(matches!(
            decode_map(w.as_slice()),
            Err(Error::TruncatedInput { need: 48, have: 0 })
        ));
    }

    #[test]
    fn test_negative_lengths_rejected() {
        let mut map = TiledMap::default();
        map.tile_col = -2;
        let mut w = BinaryWriter::new();
        write_fields(&mut w, HEADER_FIELDS, &map.header_fields(), Charset::Gb2312).unwrap();
        assert!(matches!(
            decode_map(w.as_slice()),
            Err(Error::NegativeLength { field: "tile_col", value: -2 })
        ));

        let mut map = TiledMap::default();
        map.add_jump_point(MapJumpPoint { data_length: -5, ..Default::default() });
        let mut w = BinaryWriter::new();
        write_fields(&mut w, HEADER_FIELDS, &map.header_fields(), Charset::Gb2312).unwrap();
        write_fields(
            &mut w,
            JUMP_POINT_HEADER_FIELDS,
            &map.jump_points[0].header_fields(),
            Charset::Gb2312,
        )
        .unwrap();
        assert!(matches!(
            decode_map(w.as_slice()),
            Err(Error::NegativeLength { field: "data_length", value: -5 })
        ));
    }

    #[test]
    fn test_grid_cap() {
        let codec = MapCodec::new(CodecOptions { max_tiles: 4, ..Default::default() });
        let data = encode_map(&TiledMap::with_size(3, 2)).unwrap();
        assert!(matches!(
            codec.decode(&data),
            Err(Error::GridTooLarge { cols: 3, rows: 2, max: 4 })
        ));
        assert!(codec.decode(&encode_map(&TiledMap::with_size(2, 2)).unwrap()).is_ok());
    }

    #[test]
    fn test_encode_respects_grid_cap() {
        let codec = MapCodec::new(CodecOptions { max_tiles: 4, ..Default::default() });
        assert!(matches!(
            codec.encode(&TiledMap::with_size(3, 2)),
            Err(Error::GridTooLarge { cols: 3, rows: 2, max: 4 })
        ));
        let data = codec.encode(&TiledMap::with_size(4, 1)).unwrap();
        assert_eq!(codec.decode(&data).unwrap().tiles.len(), 4);
    }

    #[test]
    fn test_encode_respects_payload_cap() {
        let codec = MapCodec::new(CodecOptions { max_data_length: 4, ..Default::default() });

        let mut map = TiledMap::default();
        map.add_element(MapElement::new(1, 0, 0, 0, vec![0; 5]));
        assert!(matches!(codec.encode(&map), Err(Error::PayloadTooLarge { len: 5, max: 4 })));

        let mut map = TiledMap::default();
        map.add_jump_point(MapJumpPoint::default().with_data(vec![0; 5]));
        assert!(matches!(codec.encode(&map), Err(Error::PayloadTooLarge { len: 5, max: 4 })));

        let mut map = TiledMap::default();
        map.add_element(MapElement::new(1, 0, 0, 0, vec![7; 4]));
        let data = codec.encode(&map).unwrap();
        assert_eq!(codec.decode(&data).unwrap(), map);
    }

    #[test]
    fn test_payload_cap() {
        let codec = MapCodec::new(CodecOptions { max_data_length: 1, ..Default::default() });
        let data = encode_map(&sample_map()).unwrap();
        assert!(matches!(
            codec.decode(&data),
            Err(Error::PayloadTooLarge { len: 2, max: 1 })
        ));
    }

    #[test]
    fn test_invariant_violations() {
        let mut map = sample_map();
        map.tiles.pop();
        assert!(matches!(encode_map(&map), Err(Error::InvariantViolation(_))));

        let mut map = sample_map();
        map.element_num = 5;
        assert!(matches!(encode_map(&map), Err(Error::InvariantViolation(_))));

        let mut map = sample_map();
        map.jump_point_num = 0;
        assert!(matches!(encode_map(&map), Err(Error::InvariantViolation(_))));

        let mut map = sample_map();
        map.elements[1].data_length = 4;
        assert!(matches!(encode_map(&map), Err(Error::InvariantViolation(_))));

        let mut map = sample_map();
        map.jump_points[0].data.push(0);
        assert!(matches!(encode_map(&map), Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_name_overflow() {
        let mut map = TiledMap::default();
        // 17 hanzi = 34 bytes in GB2312
        map.map_name = "地".repeat(17);
        assert!(matches!(
            encode_map(&map),
            Err(Error::FieldOverflow { field: "map_name", len: 34, max: 32 })
        ));
    }

    #[test]
    fn test_utf8_option() {
        let codec = MapCodec::new(CodecOptions { charset: Charset::Utf8, ..Default::default() });
        let map = TiledMap { map_name: "café".into(), ..Default::default() };
        let data = codec.encode(&map).unwrap();
        assert_eq!(&data[8..13], "café".as_bytes());
        assert_eq!(codec.decode(&data).unwrap(), map);
    }
}
