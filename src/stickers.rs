// Sticker glyphs: small 8x8 pixel icons drawn scaled up on top of sprites.
// Visual: each sticker is a flat coloured silhouette (star, heart, hat, ...).

/// One entry of the sticker palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sticker {
    Star,
    Heart,
    Hat,
    Glasses,
    Flower,
    Unicorn,
    Poop,
    Ribbon,
    Glove,
    Sneaker,
    Crown,
}

impl Sticker {
    /// Palette order, left to right.
    pub const ALL: [Sticker; 11] = [
        Sticker::Star,
        Sticker::Heart,
        Sticker::Hat,
        Sticker::Glasses,
        Sticker::Flower,
        Sticker::Unicorn,
        Sticker::Poop,
        Sticker::Ribbon,
        Sticker::Glove,
        Sticker::Sneaker,
        Sticker::Crown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sticker::Star => "star",
            Sticker::Heart => "heart",
            Sticker::Hat => "hat",
            Sticker::Glasses => "glasses",
            Sticker::Flower => "flower",
            Sticker::Unicorn => "unicorn",
            Sticker::Poop => "poop",
            Sticker::Ribbon => "ribbon",
            Sticker::Glove => "glove",
            Sticker::Sneaker => "sneaker",
            Sticker::Crown => "crown",
        }
    }

    /// Fill colour, 0x00RRGGBB.
    pub fn color(self) -> u32 {
        match self {
            Sticker::Star => 0x00FF_D54F,
            Sticker::Heart => 0x00E5_3935,
            Sticker::Hat => 0x0021_2121,
            Sticker::Glasses => 0x0037_474F,
            Sticker::Flower => 0x00F4_8FB1,
            Sticker::Unicorn => 0x00CE_93D8,
            Sticker::Poop => 0x0079_5548,
            Sticker::Ribbon => 0x00D8_1B60,
            Sticker::Glove => 0x0042_A5F5,
            Sticker::Sneaker => 0x0066_BB6A,
            Sticker::Crown => 0x00FF_B300,
        }
    }

    /// 8 rows, bit 7 is the leftmost pixel.
    pub fn bitmap(self) -> [u8; 8] {
        match self {
            Sticker::Star => [
                0b0001_1000, 0b0001_1000, 0b1111_1111, 0b0111_1110,
                0b0011_1100, 0b0111_1110, 0b0110_0110, 0b1100_0011,
            ],
            Sticker::Heart => [
                0b0110_0110, 0b1111_1111, 0b1111_1111, 0b1111_1111,
                0b0111_1110, 0b0011_1100, 0b0001_1000, 0b0000_0000,
            ],
            Sticker::Hat => [
                0b0011_1100, 0b0011_1100, 0b0011_1100, 0b0011_1100,
                0b0011_1100, 0b1111_1111, 0b1111_1111, 0b0000_0000,
            ],
            Sticker::Glasses => [
                0b0000_0000, 0b0000_0000, 0b1111_1111, 0b1110_0111,
                0b1110_0111, 0b0100_0010, 0b0000_0000, 0b0000_0000,
            ],
            Sticker::Flower => [
                0b0110_0110, 0b1111_1111, 0b0111_1110, 0b1111_1111,
                0b0110_0110, 0b0001_1000, 0b0001_1000, 0b0011_1100,
            ],
            Sticker::Unicorn => [
                0b0000_0100, 0b0000_1100, 0b0001_1000, 0b0111_1100,
                0b1111_1110, 0b0011_1110, 0b0011_0110, 0b0011_0110,
            ],
            Sticker::Poop => [
                0b0001_0000, 0b0001_1000, 0b0011_1100, 0b0011_1100,
                0b0111_1110, 0b0111_1110, 0b1111_1111, 0b1111_1111,
            ],
            Sticker::Ribbon => [
                0b1100_0011, 0b1110_0111, 0b1111_1111, 0b0001_1000,
                0b1111_1111, 0b1110_0111, 0b1100_0011, 0b0000_0000,
            ],
            Sticker::Glove => [
                0b0101_0100, 0b0101_0100, 0b0101_0101, 0b0111_1111,
                0b0111_1110, 0b0111_1110, 0b0011_1100, 0b0011_1100,
            ],
            Sticker::Sneaker => [
                0b0000_0000, 0b0000_0000, 0b0111_0000, 0b0111_1000,
                0b0111_1110, 0b1111_1111, 0b1111_1111, 0b0000_0000,
            ],
            Sticker::Crown => [
                0b0000_0000, 0b1001_1001, 0b1001_1001, 0b1111_1111,
                0b1111_1111, 0b1111_1111, 0b1111_1111, 0b0000_0000,
            ],
        }
    }

    /// Is the bitmap cell at (col,row) filled? Out-of-range cells are empty.
    #[inline]
    pub fn filled(self, col: i32, row: i32) -> bool {
        if !(0..8).contains(&col) || !(0..8).contains(&row) {
            return false;
        }
        self.bitmap()[row as usize] & (0x80 >> col) != 0
    }
}

/// Waste bin icon drawn inside the delete target.
pub const BIN_ICON: [u8; 8] = [
    0b0011_1100, 0b1111_1111, 0b0100_0010, 0b0101_1010,
    0b0101_1010, 0b0101_1010, 0b0101_1010, 0b0011_1100,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sticker_has_ink() {
        for s in Sticker::ALL {
            assert!(s.bitmap().iter().any(|row| *row != 0), "{} is blank", s.label());
        }
    }

    #[test]
    fn filled_reads_leftmost_bit_first() {
        // Unicorn horn tip sits at column 5 of the first row.
        assert!(Sticker::Unicorn.filled(5, 0));
        assert!(!Sticker::Unicorn.filled(0, 0));
        assert!(!Sticker::Unicorn.filled(8, 0));
        assert!(!Sticker::Unicorn.filled(-1, 3));
    }
}
