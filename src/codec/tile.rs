use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Bit positions of the per-tile flag byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TileBits: u8 {
        const EXIST = 1 << 0;
        const ALPHA = 1 << 1;
        const RUN = 1 << 2;
        const SAFE = 1 << 3;
        const ALL_SAFE = 1 << 4;
        const SELL = 1 << 5;
        const ARENA = 1 << 6;
        const REVERSED = 1 << 7;
    }
}

/// One grid cell. Every byte value is a valid tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MapTile {
    pub exist: bool,
    pub alpha: bool,
    pub run: bool,
    pub safe: bool,
    pub all_safe: bool,
    pub sell: bool,
    pub arena: bool,
    pub reversed: bool,
}

impl MapTile {
    pub fn from_byte(b: u8) -> Self {
        let bits = TileBits::from_bits_retain(b);
        Self {
            exist: bits.contains(TileBits::EXIST),
            alpha: bits.contains(TileBits::ALPHA),
            run: bits.contains(TileBits::RUN),
            safe: bits.contains(TileBits::SAFE),
            all_safe: bits.contains(TileBits::ALL_SAFE),
            sell: bits.contains(TileBits::SELL),
            arena: bits.contains(TileBits::ARENA),
            reversed: bits.contains(TileBits::REVERSED),
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut bits = TileBits::empty();
        bits.set(TileBits::EXIST, self.exist);
        bits.set(TileBits::ALPHA, self.alpha);
        bits.set(TileBits::RUN, self.run);
        bits.set(TileBits::SAFE, self.safe);
        bits.set(TileBits::ALL_SAFE, self.all_safe);
        bits.set(TileBits::SELL, self.sell);
        bits.set(TileBits::ARENA, self.arena);
        bits.set(TileBits::REVERSED, self.reversed);
        bits.bits()
    }
}
