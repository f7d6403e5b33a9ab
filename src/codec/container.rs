//! On-disk map files: the whole payload as a single zlib stream.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::map_file::MapCodec;
use super::map_types::TiledMap;
use crate::error::{Error, Result};

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(decompressed)
}

pub fn compress(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

impl MapCodec {
    /// Decode a compressed map from any byte source
    pub fn read_map<R: Read>(&self, mut source: R) -> Result<TiledMap> {
        let mut compressed = Vec::new();
        source.read_to_end(&mut compressed)?;
        let payload = decompress(&compressed)?;
        tracing::debug!(compressed = compressed.len(), payload = payload.len(), "inflated map");
        self.decode(&payload)
    }

    /// Encode and compress a map into any byte sink
    pub fn write_map<W: Write>(&self, map: &TiledMap, mut sink: W) -> Result<()> {
        let payload = self.encode(map)?;
        let compressed = compress(&payload, self.options.compression)?;
        tracing::debug!(payload = payload.len(), compressed = compressed.len(), "deflated map");
        sink.write_all(&compressed)?;
        sink.flush()?;
        Ok(())
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<TiledMap> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading map");
        self.read_map(fs::read(path)?.as_slice())
    }

    /// Nothing is written to `path` unless encoding succeeds
    pub fn save(&self, map: &TiledMap, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "saving map");
        let mut buf = Vec::new();
        self.write_map(map, &mut buf)?;
        fs::write(path, buf)?;
        Ok(())
    }
}

/// Load a map file with default options
pub fn load_map(path: impl AsRef<Path>) -> Result<TiledMap> {
    MapCodec::default().load(path)
}

/// Save a map file with default options
pub fn save_map(map: &TiledMap, path: impl AsRef<Path>) -> Result<()> {
    MapCodec::default().save(map, path)
}
