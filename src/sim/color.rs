//! Ball/segment colors, origins and the per-mode segment tables

use serde::{Deserialize, Serialize};

/// The paddle and ball colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    /// Display hex used by the presentation layer
    pub fn hex(&self) -> &'static str {
        match self {
            Color::Red => "#FF5E5E",
            Color::Green => "#00CC66",
            Color::Blue => "#5599FF",
            Color::Yellow => "#FFD700",
        }
    }
}

/// Edge of the play area a ball enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Falls from the top edge
    Top,
    /// Rises from the bottom edge
    Bottom,
}

/// Colors that reach the top contact zone as the paddle turns, 3-segment mode
pub const TOP_SEQUENCE_3: [Color; 3] = [Color::Red, Color::Blue, Color::Green];

/// Colors that reach the top contact zone as the paddle turns, 4-segment mode
pub const TOP_SEQUENCE_4: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

/// Spawn pool for normal mode
pub const POOL_3: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

/// Spawn pool for hard mode
pub const POOL_4: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

/// Slot-to-color table for a segment count.
///
/// Segment counts are validated in tuning, so anything that is not 4 is 3.
pub fn top_sequence(segment_count: u8) -> &'static [Color] {
    if segment_count == 4 {
        &TOP_SEQUENCE_4
    } else {
        &TOP_SEQUENCE_3
    }
}

/// Spawn pool for a segment count
pub fn color_pool(segment_count: u8) -> &'static [Color] {
    if segment_count == 4 { &POOL_4 } else { &POOL_3 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_their_pools() {
        for n in [3u8, 4] {
            let seq = top_sequence(n);
            let pool = color_pool(n);
            assert_eq!(seq.len(), n as usize);
            assert_eq!(pool.len(), n as usize);
            for c in pool {
                assert!(seq.contains(c), "{:?} missing from {}-segment table", c, n);
            }
        }
    }

    #[test]
    fn test_opposite_pairs_in_four_segment_table() {
        // 0<->2 and 1<->3 are the diametric pairs
        assert_eq!(TOP_SEQUENCE_4[0], Color::Red);
        assert_eq!(TOP_SEQUENCE_4[2], Color::Green);
        assert_eq!(TOP_SEQUENCE_4[1], Color::Yellow);
        assert_eq!(TOP_SEQUENCE_4[3], Color::Blue);
    }
}
