use serde::{Deserialize, Serialize};

use super::fields::FieldMap;
use super::tile::MapTile;
use crate::error::Result;

/// A whole map: header, tile grid, placed elements and jump points.
///
/// Tiles are stored column by column: the tile at `(x, y)` lives at index
/// `x * tile_row + y`. This is the on-disk order and is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiledMap {
    pub map_id: i32,
    pub map_type: i32,
    pub map_name: String,
    pub map_picture: String,
    pub tile_col: i32,
    pub tile_row: i32,
    pub element_num: i32,
    pub jump_point_num: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub tw: i32,
    pub th: i32,

    pub tiles: Vec<MapTile>,
    pub elements: Vec<MapElement>,
    pub jump_points: Vec<MapJumpPoint>,
}

impl Default for TiledMap {
    fn default() -> Self {
        Self {
            map_id: 0,
            map_type: 1,
            map_name: "untitled".into(),
            map_picture: String::new(),
            tile_col: 0,
            tile_row: 0,
            element_num: 0,
            jump_point_num: 0,
            offset_x: 0,
            offset_y: 0,
            tw: 20,
            th: 20,
            tiles: Vec::new(),
            elements: Vec::new(),
            jump_points: Vec::new(),
        }
    }
}

impl TiledMap {
    /// Empty map of the given size, every tile cleared
    pub fn with_size(tile_col: i32, tile_row: i32) -> Self {
        let mut map = Self::default();
        map.resize_tiles(tile_col, tile_row);
        map
    }

    fn tile_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.tile_col || y >= self.tile_row {
            return None;
        }
        Some(x as usize * self.tile_row as usize + y as usize)
    }

    pub fn get_tile(&self, x: i32, y: i32) -> Option<&MapTile> {
        self.tiles.get(self.tile_index(x, y)?)
    }

    pub fn get_tile_mut(&mut self, x: i32, y: i32) -> Option<&mut MapTile> {
        let idx = self.tile_index(x, y)?;
        self.tiles.get_mut(idx)
    }

    /// Returns false if `(x, y)` is outside the grid
    pub fn set_tile(&mut self, x: i32, y: i32, tile: MapTile) -> bool {
        match self.get_tile_mut(x, y) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Resize the grid, keeping tiles that fall inside both the old and new
    /// bounds and clearing the rest. Negative sizes are ignored and return
    /// false.
    pub fn resize_tiles(&mut self, tile_col: i32, tile_row: i32) -> bool {
        if tile_col < 0 || tile_row < 0 {
            return false;
        }

        let mut tiles = Vec::with_capacity(tile_col as usize * tile_row as usize);
        for x in 0..tile_col {
            for y in 0..tile_row {
                tiles.push(self.get_tile(x, y).copied().unwrap_or_default());
            }
        }

        self.tile_col = tile_col;
        self.tile_row = tile_row;
        self.tiles = tiles;
        true
    }

    pub fn add_element(&mut self, element: MapElement) {
        self.elements.push(element);
        self.element_num = self.elements.len() as i32;
    }

    pub fn add_jump_point(&mut self, jump_point: MapJumpPoint) {
        self.jump_points.push(jump_point);
        self.jump_point_num = self.jump_points.len() as i32;
    }

    /// Recompute declared counts and payload lengths from the owned records
    pub fn sync_counts(&mut self) {
        self.element_num = self.elements.len() as i32;
        self.jump_point_num = self.jump_points.len() as i32;
        for e in &mut self.elements {
            e.data_length = e.data.len() as i32;
        }
        for j in &mut self.jump_points {
            j.data_length = j.data.len() as i32;
        }
    }

    pub fn header_fields(&self) -> FieldMap {
        let mut f = FieldMap::new();
        f.set_int("map_id", self.map_id)
            .set_int("map_type", self.map_type)
            .set_text("map_name", self.map_name.as_str())
            .set_text("map_picture", self.map_picture.as_str())
            .set_int("tile_col", self.tile_col)
            .set_int("tile_row", self.tile_row)
            .set_int("element_num", self.element_num)
            .set_int("jump_point_num", self.jump_point_num)
            .set_int("offset_x", self.offset_x)
            .set_int("offset_y", self.offset_y)
            .set_int("tw", self.tw)
            .set_int("th", self.th);
        f
    }

    /// Build a map with header values only; sections are left empty
    pub fn from_header(f: &FieldMap) -> Result<Self> {
        Ok(Self {
            map_id: f.int("map_id")?,
            map_type: f.int("map_type")?,
            map_name: f.text("map_name")?.to_owned(),
            map_picture: f.text("map_picture")?.to_owned(),
            tile_col: f.int("tile_col")?,
            tile_row: f.int("tile_row")?,
            element_num: f.int("element_num")?,
            jump_point_num: f.int("jump_point_num")?,
            offset_x: f.int("offset_x")?,
            offset_y: f.int("offset_y")?,
            tw: f.int("tw")?,
            th: f.int("th")?,
            tiles: Vec::new(),
            elements: Vec::new(),
            jump_points: Vec::new(),
        })
    }
}

/// Placed monster, NPC or other entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapElement {
    pub id: i32,
    pub index_tx: i32,
    pub index_ty: i32,
    #[serde(rename = "type")]
    pub kind: i32,
    pub data_length: i32,
    pub data: Vec<u8>,
}

impl MapElement {
    pub fn new(id: i32, index_tx: i32, index_ty: i32, kind: i32, data: Vec<u8>) -> Self {
        Self {
            id,
            index_tx,
            index_ty,
            kind,
            data_length: data.len() as i32,
            data,
        }
    }

    pub fn header_fields(&self) -> FieldMap {
        let mut f = FieldMap::new();
        f.set_int("id", self.id)
            .set_int("index_tx", self.index_tx)
            .set_int("index_ty", self.index_ty)
            .set_int("type", self.kind)
            .set_int("data_length", self.data_length);
        f
    }

    pub fn from_header(f: &FieldMap) -> Result<Self> {
        Ok(Self {
            id: f.int("id")?,
            index_tx: f.int("index_tx")?,
            index_ty: f.int("index_ty")?,
            kind: f.int("type")?,
            data_length: f.int("data_length")?,
            data: Vec::new(),
        })
    }
}

/// Teleport from a cell on this map to a cell on `target_map_id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapJumpPoint {
    pub id: i32,
    pub index_tx: i32,
    pub index_ty: i32,
    pub target_map_id: i32,
    pub target_index_tx: i32,
    pub target_index_ty: i32,
    pub hw: i32,
    pub yl: i32,
    pub wl: i32,
    pub min_level: i32,
    pub max_level: i32,
    pub data_length: i32,
    pub data: Vec<u8>,
}

impl MapJumpPoint {
    /// Attach a payload and set `data_length` to match
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data_length = data.len() as i32;
        self.data = data;
        self
    }

    pub fn header_fields(&self) -> FieldMap {
        let mut f = FieldMap::new();
        f.set_int("id", self.id)
            .set_int("index_tx", self.index_tx)
            .set_int("index_ty", self.index_ty)
            .set_int("target_map_id", self.target_map_id)
            .set_int("target_index_tx", self.target_index_tx)
            .set_int("target_index_ty", self.target_index_ty)
            .set_int("hw", self.hw)
            .set_int("yl", self.yl)
            .set_int("wl", self.wl)
            .set_int("min_level", self.min_level)
            .set_int("max_level", self.max_level)
            .set_int("data_length", self.data_length);
        f
    }

    pub fn from_header(f: &FieldMap) -> Result<Self> {
        Ok(Self {
            id: f.int("id")?,
            index_tx: f.int("index_tx")?,
            index_ty: f.int("index_ty")?,
            target_map_id: f.int("target_map_id")?,
            target_index_tx: f.int("target_index_tx")?,
            target_index_ty: f.int("target_index_ty")?,
            hw: f.int("hw")?,
            yl: f.int("yl")?,
            wl: f.int("wl")?,
            min_level: f.int("min_level")?,
            max_level: f.int("max_level")?,
            data_length: f.int("data_length")?,
            data: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(cols: i32, rows: i32) -> TiledMap {
        let mut map = TiledMap::with_size(cols, rows);
        for (i, t) in map.tiles.iter_mut().enumerate() {
            *t = MapTile::from_byte(i as u8 + 1);
        }
        map
    }

    #[test]
    fn test_defaults() {
        let map = TiledMap::default();
        assert_eq!(map.map_type, 1);
        assert_eq!(map.map_name, "untitled");
        assert_eq!((map.tw, map.th), (20, 20));
        assert!(map.tiles.is_empty());
    }

    #[test]
    fn test_column_major_indexing() {
        let map = numbered(3, 4);
        assert_eq!(map.tiles.len(), 12);
        // index = x * tile_row + y
        assert_eq!(map.get_tile(0, 1).unwrap().to_byte(), 2);
        assert_eq!(map.get_tile(1, 0).unwrap().to_byte(), 5);
        assert_eq!(map.get_tile(2, 3).unwrap().to_byte(), 12);
        assert!(map.get_tile(3, 0).is_none());
        assert!(map.get_tile(0, 4).is_none());
        assert!(map.get_tile(-1, 0).is_none());
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let old = numbered(3, 4);
        let mut map = old.clone();
        assert!(map.resize_tiles(5, 2));
        assert_eq!((map.tile_col, map.tile_row), (5, 2));
        assert_eq!(map.tiles.len(), 10);

        for x in 0..5 {
            for y in 0..2 {
                let tile = *map.get_tile(x, y).unwrap();
                if x < 3 {
                    assert_eq!(tile, *old.get_tile(x, y).unwrap());
                } else {
                    assert_eq!(tile, MapTile::default());
                }
            }
        }
    }

    #[test]
    fn test_resize_negative_is_ignored() {
        let mut map = numbered(2, 2);
        let before = map.clone();
        assert!(!map.resize_tiles(-1, 5));
        assert!(!map.resize_tiles(5, -1));
        assert_eq!(map, before);
    }

    #[test]
    fn test_resize_to_empty() {
        let mut map = numbered(2, 2);
        assert!(map.resize_tiles(0, 7));
        assert!(map.tiles.is_empty());
        assert_eq!(map.tile_row, 7);
    }

    #[test]
    fn test_set_tile() {
        let mut map = TiledMap::with_size(2, 3);
        let safe = MapTile { safe: true, ..Default::default() };
        assert!(map.set_tile(1, 2, safe));
        assert_eq!(map.tiles[5], safe);
        assert!(!map.set_tile(2, 0, safe));
    }

    #[test]
    fn test_count_helpers() {
        let mut map = TiledMap::default();
        map.add_element(MapElement::new(1, 2, 3, 4, vec![9, 9]));
        map.add_jump_point(MapJumpPoint { id: 5, ..Default::default() }.with_data(vec![1]));
        assert_eq!(map.element_num, 1);
        assert_eq!(map.jump_point_num, 1);
        assert_eq!(map.elements[0].data_length, 2);
        assert_eq!(map.jump_points[0].data_length, 1);

        map.elements[0].data.push(0);
        map.elements.push(MapElement::default());
        map.sync_counts();
        assert_eq!(map.element_num, 2);
        assert_eq!(map.elements[0].data_length, 3);
    }

    #[test]
    fn test_header_fields_roundtrip() {
        let map = TiledMap { map_id: 42, map_name: "town".into(), ..Default::default() };
        let back = TiledMap::from_header(&map.header_fields()).unwrap();
        assert_eq!(back, map);
    }
}
