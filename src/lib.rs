//! Tiled Map Files
//!
//! Reads and writes the compressed binary map format used by the game
//! server: a fixed header, a grid of per-tile flag bytes, placed elements
//! and jump points, all wrapped in one zlib stream.

pub mod codec;
pub mod error;

pub use error::{Error, Result};
pub use codec::{
    Charset, CodecOptions, MapCodec,
    TiledMap, MapTile, MapElement, MapJumpPoint,
    decode_map, encode_map, load_map, save_map,
};
