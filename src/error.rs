#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("truncated input: need {need} bytes, have {have}")]
    TruncatedInput { need: usize, have: usize },

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("field `{field}` too long: {len} bytes (max {max})")]
    FieldOverflow { field: &'static str, len: usize, max: usize },

    #[error("field `{field}` contains text not representable in its charset")]
    UnmappableText { field: &'static str },

    #[error("negative {field}: {value}")]
    NegativeLength { field: &'static str, value: i32 },

    #[error("tile grid too large: {cols}x{rows} (max {max} tiles)")]
    GridTooLarge { cols: i32, rows: i32, max: usize },

    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
