use byteorder::{BigEndian, ByteOrder};

/// Growable output buffer for map payloads
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i32_be(&mut self, v: i32) {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    /// Write `bytes` left-justified in a field of `width`, NUL padded.
    /// Caller guarantees `bytes.len() <= width`.
    pub fn write_padded(&mut self, bytes: &[u8], width: usize) {
        self.write_bytes(bytes);
        self.data.resize(self.data.len() + width.saturating_sub(bytes.len()), 0);
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}
