use thiserror::Error;

use super::square::Direction;

/******************************************\
|==========================================|
|                 Colours                  |
|==========================================|
\******************************************/

/// # Colour representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    White,
    Black
}

impl Colour {
    /// Number of elements in the Colour enum
    pub const NUM: usize = 2;

    /// The pawn push direction for a colour
    pub const fn forward(&self) -> Direction {
        match self {
            Colour::White => Direction::N,
            Colour::Black => Direction::S,
        }
    }

    /// The east-side pawn capture direction for a colour
    pub const fn forward_east(&self) -> Direction {
        match self {
            Colour::White => Direction::NE,
            Colour::Black => Direction::SE,
        }
    }

    /// The west-side pawn capture direction for a colour
    pub const fn forward_west(&self) -> Direction {
        match self {
            Colour::White => Direction::NW,
            Colour::Black => Direction::SW,
        }
    }

    /// The pawn double push direction for a colour
    pub const fn double_forward(&self) -> Direction {
        match self {
            Colour::White => Direction::NN,
            Colour::Black => Direction::SS,
        }
    }
}

crate::impl_from_to_primitive!(Colour);

impl std::ops::Not for Colour {
    type Output = Self;

    /// Returns the opposite colour
    fn not(self) -> Self::Output {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }
}

/******************************************\
|==========================================|
|                Piece Type                |
|==========================================|
\******************************************/

/// # Piece type representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceType {
   Pawn, Knight, Bishop, Rook, Queen, King,
}

impl PieceType {
    /// Number of elements in the PieceType enum
    pub const NUM: usize = 6;
}

crate::impl_from_to_primitive!(PieceType);
crate::impl_enum_iter!(PieceType);

/******************************************\
|==========================================|
|                  Piece                   |
|==========================================|
\******************************************/

/// # Piece representation
///
/// Colour sits in the low bit and the piece type in the upper bits, so
/// `colour()` and `pt()` are a mask and a shift.

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    WhitePawn, BlackPawn, WhiteKnight, BlackKnight, WhiteBishop, BlackBishop,
    WhiteRook, BlackRook, WhiteQueen, BlackQueen, WhiteKing, BlackKing,
}

impl Piece {
    /// Number of elements in the Piece enum
    pub const NUM: usize = 12;

    /// Returns the piece type of the piece
    pub const fn pt(self) -> PieceType {
        unsafe { PieceType::from_unchecked(self as u8 >> 1) }
    }

    /// Returns the colour of the piece
    pub const fn colour(self) -> Colour {
        unsafe { Colour::from_unchecked(self as u8 & 1) }
    }

    /// Combines a colour and piece type pair into a piece
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::core::{Piece, Colour, PieceType};
    ///
    /// assert_eq!(Piece::from_parts(Colour::White, PieceType::Pawn), Piece::WhitePawn);
    /// assert_eq!(Piece::from_parts(Colour::Black, PieceType::King), Piece::BlackKing);
    /// ```
    pub const fn from_parts(colour: Colour, piece_type: PieceType) -> Self {
        unsafe { Piece::from_unchecked(colour as u8 | (piece_type as u8) << 1) }
    }
}

crate::impl_from_to_primitive!(Piece);
crate::impl_enum_iter!(Piece);

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

/// Piece characters in enum order, as used by FEN placement fields
const PIECE_STR: &str = "PpNnBbRrQqKk";

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let piece_char = PIECE_STR
            .chars()
            .nth(self.index())
            .ok_or(std::fmt::Error)?;
        write!(f, "{}", piece_char)
    }
}

impl std::fmt::Display for PieceType {
    /// Displays the piece type in lowercase, as used in promotion suffixes
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let piece_char = PIECE_STR
            .chars()
            .nth(self.index() << 1)
            .ok_or(std::fmt::Error)?
            .to_ascii_lowercase();
        write!(f, "{}", piece_char)
    }
}

/******************************************\
|==========================================|
|                Parse Piece               |
|==========================================|
\******************************************/

impl std::str::FromStr for Piece {
    type Err = ParsePieceError;

    /// Parses a FEN piece character into a piece
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::core::{Piece, ParsePieceError};
    ///
    /// assert_eq!("P".parse::<Piece>().unwrap(), Piece::WhitePawn);
    /// assert_eq!("k".parse::<Piece>().unwrap(), Piece::BlackKing);
    /// assert!(matches!("X".parse::<Piece>(), Err(ParsePieceError::InvalidChar('X'))));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ParsePieceError::InvalidLength(s.len()));
        }

        let piece_char = s.chars().next().ok_or(ParsePieceError::InvalidLength(0))?;
        let index = PIECE_STR
            .chars()
            .position(|c| c == piece_char)
            .ok_or(ParsePieceError::InvalidChar(piece_char))? as u8;

        Ok(unsafe { Piece::from_unchecked(index) })
    }
}

/******************************************\
|==========================================|
|            Piece Parse Error             |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePieceError {
    #[error("Invalid length for piece string: {0}, expected 1")]
    InvalidLength(usize),
    #[error("Invalid character for piece string: '{0}', expected one of \"PpNnBbRrQqKk\"")]
    InvalidChar(char),
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
