// Primitive chess types

pub mod bitboard;
pub mod castling;
pub mod moves;
pub mod piece;
pub mod square;

mod macros;

// Re-export common types for easier access
pub use bitboard::Bitboard;
pub use castling::Castling;
pub use moves::{Move, MoveFlag};
pub use piece::{Colour, Piece, PieceType};
pub use square::{Direction, File, Rank, Square};

pub use piece::ParsePieceError;
pub use square::{ParseFileError, ParseRankError, ParseSquareError, SquareOffBoardError};
