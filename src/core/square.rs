use thiserror::Error;

use super::piece::Colour;

/******************************************\
|==========================================|
|                 Squares                  |
|==========================================|
\******************************************/

/// # Square representation
///
/// The 64 board squares, A1 in the least significant position and H8 in
/// the most significant, so a `Square` doubles as a bit index.

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Number of elements in the Square enum
    pub const NUM: usize = 64;
}

crate::impl_from_to_primitive!(Square);
crate::impl_enum_iter!(Square);

/******************************************\
|==========================================|
|                  Ranks                   |
|==========================================|
\******************************************/

/// # Rank representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
pub enum Rank {
    Rank1, Rank2, Rank3, Rank4, Rank5, Rank6, Rank7, Rank8,
}

impl Rank {
    /// Number of elements in the Rank enum
    pub const NUM: usize = 8;
}

crate::impl_from_to_primitive!(Rank);
crate::impl_enum_iter!(Rank);

/******************************************\
|==========================================|
|                  Files                   |
|==========================================|
\******************************************/

/// # File representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
pub enum File {
    FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH,
}

impl File {
    /// Number of elements in the File enum
    pub const NUM: usize = 8;
}

crate::impl_from_to_primitive!(File);
crate::impl_enum_iter!(File);

/******************************************\
|==========================================|
|                Direction                 |
|==========================================|
\******************************************/

/// # Direction representation
///
/// Signed square-index offsets for the 8 compass directions, the 8 knight
/// jumps, and the pawn double push steps.

#[rustfmt::skip]
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    N = 8, S = -8, W = -1, E = 1,
    NE = 9, NW = 7, SE = -7, SW = -9,
    NNE = 17, NNW = 15, NEE = 10, NWW = 6,
    SEE = -6, SWW = -10, SSE = -15, SSW = -17,
    NN = 16, SS = -16,
}

crate::impl_from_to_primitive!(Direction, i8);

impl std::ops::Neg for Direction {
    type Output = Self;

    /// The opposite direction (N => S, NEE => SWW, ...)
    fn neg(self) -> Self::Output {
        Self::from_unchecked(-(self as i8))
    }
}

/******************************************\
|==========================================|
|              Implementation              |
|==========================================|
\******************************************/

impl Square {
    /// Returns the rank of a square
    pub const fn rank(&self) -> Rank {
        let rank_index = (*self as u8) >> 3;
        unsafe { Rank::from_unchecked(rank_index) }
    }

    /// Returns the file of a square
    pub const fn file(&self) -> File {
        let file_index = (*self as u8) & 0b111;
        unsafe { File::from_unchecked(file_index) }
    }

    /// Mirrors the square across the horizontal midline of the board
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::core::Square;
    ///
    /// assert_eq!(Square::A1.flip_rank(), Square::A8);
    /// assert_eq!(Square::E4.flip_rank(), Square::E5);
    /// ```
    pub const fn flip_rank(&self) -> Self {
        unsafe { Self::from_unchecked((*self as u8) ^ Square::A8 as u8) }
    }

    /// Returns the square from the perspective of `col`
    ///
    /// White's view is the identity; Black's view mirrors the rank, so
    /// `E2.relative(Black)` is `E7`.
    pub const fn relative(&self, col: Colour) -> Self {
        match col {
            Colour::White => *self,
            Colour::Black => self.flip_rank(),
        }
    }

    /// Combines a file and rank pair into a square
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::core::{Square, File, Rank};
    ///
    /// assert_eq!(Square::from_parts(File::FileE, Rank::Rank4), Square::E4);
    /// ```
    pub const fn from_parts(file: File, rank: Rank) -> Self {
        let index = ((rank as u8) << 3) + (file as u8);
        unsafe { Self::from_unchecked(index) }
    }

    /// Converts an i16 square index into a square, rejecting out-of-range values
    pub const fn try_from(value: i16) -> Result<Self, SquareOffBoardError> {
        if value >= 0 && value < 64 {
            Ok(unsafe { Square::from_unchecked(value as u8) })
        } else {
            Err(SquareOffBoardError)
        }
    }

    /// Steps the square in a direction, rejecting steps that leave the board
    ///
    /// Horizontal wrap is caught by checking the file before adding the
    /// offset; vertical overshoot is caught by the index range check.
    #[inline]
    pub const fn add(self, rhs: Direction) -> Result<Self, SquareOffBoardError> {
        let file = self.file() as u8;

        use Direction::*;
        let valid = match rhs {
            N | S | NN | SS => true,
            E | NE | NNE | SE | SSE if file < File::FileH as u8 => true,
            W | NW | NNW | SW | SSW if file > File::FileA as u8 => true,
            NEE | SEE if file < File::FileG as u8 => true,
            NWW | SWW if file > File::FileB as u8 => true,
            _ => false,
        };

        if valid {
            Square::try_from(self as i16 + rhs as i16)
        } else {
            Err(SquareOffBoardError)
        }
    }

    /// Steps the square in a direction without bounds checking
    ///
    /// ## Safety
    /// - The destination must stay on the board
    #[inline]
    pub const unsafe fn add_unchecked(self, rhs: Direction) -> Self {
        debug_assert!(self as i16 + rhs as i16 >= 0, "Square out of bounds");
        debug_assert!((self as i16 + rhs as i16) < 64, "Square out of bounds");
        unsafe { Square::from_unchecked((self as i16 + rhs as i16) as u8) }
    }
}

impl Rank {
    /// Mirrors the rank across the horizontal midline of the board
    pub const fn flip(&self) -> Self {
        unsafe { Self::from_unchecked(7 - (*self as u8)) }
    }

    /// Returns the rank from the perspective of `col`
    pub const fn relative(&self, col: Colour) -> Self {
        match col {
            Colour::White => *self,
            Colour::Black => self.flip(),
        }
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl std::fmt::Display for File {
    /// Displays the file as its coordinate letter (FileA => 'a')
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", (b'a' + (*self as u8)) as char)
    }
}

impl std::fmt::Display for Rank {
    /// Displays the rank as its coordinate digit (Rank1 => '1')
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", (b'1' + (*self as u8)) as char)
    }
}

impl std::fmt::Display for Square {
    /// Displays the square in coordinate form (Square::A1 => "a1")
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/******************************************\
|==========================================|
|              Parsing Strings             |
|==========================================|
\******************************************/

impl std::str::FromStr for File {
    type Err = ParseFileError;

    /// Parses a single letter 'a'-'h' into a file
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ParseFileError::InvalidLength(s.len()));
        }

        let file_char = s.chars().next().ok_or(ParseFileError::InvalidLength(0))?;
        match file_char {
            'a'..='h' => Ok(unsafe { File::from_unchecked(file_char as u8 - b'a') }),
            _ => Err(ParseFileError::InvalidChar(file_char)),
        }
    }
}

impl std::str::FromStr for Rank {
    type Err = ParseRankError;

    /// Parses a single digit '1'-'8' into a rank
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ParseRankError::InvalidLength(s.len()));
        }

        let rank_char = s.chars().next().ok_or(ParseRankError::InvalidLength(0))?;
        match rank_char {
            '1'..='8' => Ok(unsafe { Rank::from_unchecked(rank_char as u8 - b'1') }),
            _ => Err(ParseRankError::InvalidChar(rank_char)),
        }
    }
}

impl std::str::FromStr for Square {
    type Err = ParseSquareError;

    /// Parses a coordinate pair like "e4" into a square
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::core::{Square, ParseSquareError};
    ///
    /// assert_eq!("a1".parse::<Square>().unwrap(), Square::A1);
    /// assert!(matches!("e9".parse::<Square>(), Err(ParseSquareError::InvalidRankChar('9'))));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(ParseSquareError::InvalidLength(s.len()));
        }

        let mut chars = s.chars();
        let file_char = chars.next().ok_or(ParseSquareError::InvalidLength(0))?;
        let rank_char = chars.next().ok_or(ParseSquareError::InvalidLength(1))?;

        let file = file_char
            .to_string()
            .parse::<File>()
            .map_err(|_| ParseSquareError::InvalidFileChar(file_char))?;
        let rank = rank_char
            .to_string()
            .parse::<Rank>()
            .map_err(|_| ParseSquareError::InvalidRankChar(rank_char))?;

        Ok(Square::from_parts(file, rank))
    }
}

/******************************************\
|==========================================|
|              Square Errors               |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Square operation stepped off the board")]
pub struct SquareOffBoardError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFileError {
    #[error("Invalid length for file string: {0}, expected 1")]
    InvalidLength(usize),
    #[error("Invalid character for file string: '{0}', expected 'a'-'h'")]
    InvalidChar(char),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRankError {
    #[error("Invalid length for rank string: {0}, expected 1")]
    InvalidLength(usize),
    #[error("Invalid character for rank string: '{0}', expected '1'-'8'")]
    InvalidChar(char),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSquareError {
    #[error("Invalid length for square string: {0}, expected 2")]
    InvalidLength(usize),
    #[error("Invalid character for file string: '{0}', expected 'a'-'h'")]
    InvalidFileChar(char),
    #[error("Invalid character for rank string: '{0}', expected '1'-'8'")]
    InvalidRankChar(char),
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_from_parts() {
        assert_eq!(Square::from_parts(File::FileA, Rank::Rank1), Square::A1);
        assert_eq!(Square::from_parts(File::FileE, Rank::Rank4), Square::E4);
        assert_eq!(Square::from_parts(File::FileH, Rank::Rank8), Square::H8);
    }

    #[test]
    fn test_file_and_rank() {
        let square = Square::C6;
        assert_eq!(square.file(), File::FileC);
        assert_eq!(square.rank(), Rank::Rank6);
    }

    #[test]
    fn test_square_conversions_roundtrip() {
        for file in File::iter() {
            for rank in Rank::iter() {
                let square = Square::from_parts(file, rank);
                assert_eq!(square.file(), file);
                assert_eq!(square.rank(), rank);
            }
        }
    }

    #[test]
    fn test_flip_rank() {
        assert_eq!(Square::A1.flip_rank(), Square::A8);
        assert_eq!(Square::E4.flip_rank(), Square::E5);
        assert_eq!(Square::H8.flip_rank(), Square::H1);
        assert_eq!(Square::E2.relative(Colour::Black), Square::E7);
        assert_eq!(Square::E2.relative(Colour::White), Square::E2);
    }

    #[test]
    fn test_square_plus_direction() {
        assert_eq!(Square::E4.add(Direction::N), Ok(Square::E5));
        assert_eq!(Square::E4.add(Direction::S), Ok(Square::E3));
        assert_eq!(Square::E4.add(Direction::E), Ok(Square::F4));
        assert_eq!(Square::E4.add(Direction::W), Ok(Square::D4));

        assert_eq!(Square::E4.add(Direction::NE), Ok(Square::F5));
        assert_eq!(Square::E4.add(Direction::NW), Ok(Square::D5));
        assert_eq!(Square::E4.add(Direction::SE), Ok(Square::F3));
        assert_eq!(Square::E4.add(Direction::SW), Ok(Square::D3));

        assert_eq!(Square::E4.add(Direction::NN), Ok(Square::E6));
        assert_eq!(Square::E4.add(Direction::SS), Ok(Square::E2));

        assert_eq!(Square::E4.add(Direction::NNE), Ok(Square::F6));
        assert_eq!(Square::E4.add(Direction::NEE), Ok(Square::G5));

        assert_eq!(Square::H4.add(Direction::E), Err(SquareOffBoardError));
        assert_eq!(Square::A4.add(Direction::W), Err(SquareOffBoardError));
        assert_eq!(Square::E8.add(Direction::N), Err(SquareOffBoardError));
        assert_eq!(Square::E1.add(Direction::S), Err(SquareOffBoardError));
        assert_eq!(Square::H7.add(Direction::NEE), Err(SquareOffBoardError));
        assert_eq!(Square::A2.add(Direction::SWW), Err(SquareOffBoardError));
    }

    #[test]
    fn test_square_plus_direction_inverse() {
        use Direction::*;

        let directions: [Direction; 18] = [
            N, S, E, W, NE, NW, SE, SW, NNE, NNW, NEE, NWW, SSE, SSW, SEE, SWW, NN, SS,
        ];

        for dir in directions {
            for sq in Square::iter() {
                if let Ok(new_sq) = sq.add(dir) {
                    assert_eq!(new_sq.add(-dir), Ok(sq));
                }
            }
        }
    }

    #[test]
    fn test_square_try_from_i16() {
        assert_eq!(Square::try_from(0i16), Ok(Square::A1));
        assert_eq!(Square::try_from(36i16), Ok(Square::E5));
        assert_eq!(Square::try_from(63i16), Ok(Square::H8));

        assert!(Square::try_from(-1i16).is_err());
        assert!(Square::try_from(64i16).is_err());
    }

    #[test]
    fn test_square_display() {
        assert_eq!(Square::A1.to_string(), "a1");
        assert_eq!(Square::E4.to_string(), "e4");
        assert_eq!(Square::H8.to_string(), "h8");
    }

    #[test]
    fn test_square_from_str_valid() {
        assert_eq!("a1".parse::<Square>().unwrap(), Square::A1);
        assert_eq!("h8".parse::<Square>().unwrap(), Square::H8);
        assert_eq!("e4".parse::<Square>().unwrap(), Square::E4);
        assert_eq!("c7".parse::<Square>().unwrap(), Square::C7);
    }

    #[test]
    fn test_square_from_str_invalid() {
        assert!(matches!(
            "e".parse::<Square>(),
            Err(ParseSquareError::InvalidLength(1))
        ));
        assert!(matches!(
            "e4g".parse::<Square>(),
            Err(ParseSquareError::InvalidLength(3))
        ));
        assert!(matches!(
            "".parse::<Square>(),
            Err(ParseSquareError::InvalidLength(0))
        ));
        assert!(matches!(
            "z4".parse::<Square>(),
            Err(ParseSquareError::InvalidFileChar('z'))
        ));
        assert!(matches!(
            "A1".parse::<Square>(),
            Err(ParseSquareError::InvalidFileChar('A'))
        ));
        assert!(matches!(
            "a9".parse::<Square>(),
            Err(ParseSquareError::InvalidRankChar('9'))
        ));
        assert!(matches!(
            "h0".parse::<Square>(),
            Err(ParseSquareError::InvalidRankChar('0'))
        ));
    }
}
