//! Connector bitmask algebra for tile edges
//!
//! A tile edge carries 8 connector sub-positions. The four edges are packed
//! clockwise into one `u32`: Top in bits 0..8, Right in 8..16, Bottom in
//! 16..24 and Left in 24..32. Rotating the whole value left by one byte turns
//! the tile a quarter clockwise.

use std::fmt;
use std::str::FromStr;

use crate::io::error::DungeonError;

/// Number of connector sub-positions on one side
pub const CONNECTORS_PER_SIDE: u8 = 8;

/// One edge of a tile, in clockwise order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// Upper edge, neighbour at row - 1
    Top = 0,
    /// Right edge, neighbour at col + 1
    Right = 1,
    /// Lower edge, neighbour at row + 1
    Bottom = 2,
    /// Left edge, neighbour at col - 1
    Left = 3,
}

impl Side {
    /// All sides in clockwise order starting at the top
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Position of this side in the clockwise order
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Side of a neighbouring tile that touches this one
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Grid step (dcol, drow) towards the neighbour on this side
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Top => (0, -1),
            Self::Right => (1, 0),
            Self::Bottom => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Token prefix used in descriptors and diagnostics
    pub const fn letter(self) -> char {
        match self {
            Self::Top => 'T',
            Self::Right => 'R',
            Self::Bottom => 'B',
            Self::Left => 'L',
        }
    }

    const fn shift(self) -> u32 {
        (self as u32) * CONNECTORS_PER_SIDE as u32
    }

    fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|side| side.letter() == letter)
    }
}

/// Packed connector bits for all four sides of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConnectionMask(u32);

impl ConnectionMask {
    /// No connectors anywhere
    pub const ZERO: Self = Self(0);
    /// Every connector on every side
    pub const FULL: Self = Self(u32::MAX);
    /// All 8 connectors of a single side
    pub const SIDE_FULL: u8 = u8::MAX;

    /// Wrap a raw bit pattern
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit pattern
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if no side carries a connector
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Mask with a single side set to `value`
    pub const fn from_side(side: Side, value: u8) -> Self {
        Self((value as u32) << side.shift())
    }

    /// 8-bit connector field of one side
    pub const fn side(self, side: Side) -> u8 {
        (self.0 >> side.shift()) as u8
    }

    /// Copy of this mask with one side replaced
    #[must_use]
    pub const fn with_side(self, side: Side, value: u8) -> Self {
        let cleared = self.0 & !((Self::SIDE_FULL as u32) << side.shift());
        Self(cleared | ((value as u32) << side.shift()))
    }

    /// Replace one side in place
    pub const fn set_side(&mut self, side: Side, value: u8) {
        *self = self.with_side(side, value);
    }

    /// True if the side has at least one connector
    pub const fn has_side(self, side: Side) -> bool {
        self.side(side) != 0
    }

    /// Test a single connector, `position` in 0..8
    pub const fn connector(self, side: Side, position: u8) -> bool {
        position < CONNECTORS_PER_SIDE && (self.side(side) >> position) & 1 == 1
    }

    /// Copy of this mask with a single connector opened
    ///
    /// Positions outside 0..8 leave the mask unchanged.
    #[must_use]
    pub const fn with_connector(self, side: Side, position: u8) -> Self {
        if position >= CONNECTORS_PER_SIDE {
            return self;
        }
        Self(self.0 | (1 << (side.shift() + position as u32)))
    }

    /// Side value as the touching neighbour must carry it
    ///
    /// Connector order runs clockwise around each tile, so two touching
    /// edges list the same connectors in opposite order.
    pub const fn mirrored_side(self, side: Side) -> u8 {
        self.side(side).reverse_bits()
    }

    /// Turn the tile clockwise by `quarter_turns` * 90 degrees
    #[must_use]
    pub const fn rotate(self, quarter_turns: u32) -> Self {
        let turns = quarter_turns % 4;
        if turns == 0 {
            return self;
        }
        Self(self.0.rotate_left(turns * CONNECTORS_PER_SIDE as u32))
    }

    /// Mirror the tile left-to-right
    ///
    /// Left and Right trade places unchanged, Top and Bottom keep their place
    /// with their connector order reversed.
    #[must_use]
    pub const fn flip_horizontal(self) -> Self {
        Self::ZERO
            .with_side(Side::Top, self.side(Side::Top).reverse_bits())
            .with_side(Side::Bottom, self.side(Side::Bottom).reverse_bits())
            .with_side(Side::Left, self.side(Side::Right))
            .with_side(Side::Right, self.side(Side::Left))
    }

    /// True if a half turn maps the mask onto itself
    pub const fn is_half_turn_symmetric(self) -> bool {
        self.0 == self.rotate(2).0
    }

    /// Connector tokens (`T0`..`L7`) in bit order
    pub fn tokens(self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.0.count_ones() as usize);
        for side in Side::ALL {
            for position in 0..CONNECTORS_PER_SIDE {
                if self.connector(side, position) {
                    tokens.push(format!("{}{position}", side.letter()));
                }
            }
        }
        tokens
    }

    /// Parse a single connector token such as `R3`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the token is not a side letter followed
    /// by a position in 0..8
    pub fn parse_token(token: &str) -> crate::io::error::Result<Self> {
        let mut chars = token.chars();
        let side = chars.next().and_then(Side::from_letter);
        let position = chars.as_str().parse::<u8>().ok();

        match (side, position) {
            (Some(side), Some(position)) if position < CONNECTORS_PER_SIDE => {
                Ok(Self::ZERO.with_connector(side, position))
            }
            _ => Err(DungeonError::InvalidArgument {
                reason: format!("'{token}' is not a connector token"),
            }),
        }
    }
}

impl std::ops::BitOr for ConnectionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ConnectionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ConnectionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(","))
    }
}

impl FromStr for ConnectionMask {
    type Err = DungeonError;

    /// Parse a comma-separated token list, the empty string being the zero mask
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_fold(Self::ZERO, |mask, token| {
                Ok(mask | Self::parse_token(token)?)
            })
    }
}
