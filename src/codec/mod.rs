pub mod reader;
pub mod writer;
pub mod text;
pub mod fields;
pub mod tile;
pub mod map_types;
pub mod map_file;
pub mod container;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
pub use text::Charset;
pub use fields::{FieldDesc, FieldKind, FieldMap, FieldValue, read_fields, write_fields};
pub use tile::{MapTile, TileBits};
pub use map_types::{TiledMap, MapElement, MapJumpPoint};
pub use map_file::{CodecOptions, MapCodec, decode_map, encode_map};
pub use container::{compress, decompress, load_map, save_map};
