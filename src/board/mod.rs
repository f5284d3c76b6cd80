pub mod fen;
pub mod movegen;
pub mod movement;
pub mod status;
pub mod zobrist;

pub use fen::{KILLER_FEN, MalformedPosition, START_FEN, TRICKY_FEN};
pub use movegen::{
    MoveList, ParseMoveError, bishop_attacks, king_attack, knight_attack, pawn_attack,
    queen_attacks, rook_attacks,
};
pub use movement::IllegalMove;
pub use status::GameStatus;
pub use zobrist::Key;

use crate::core::*;

/******************************************\
|==========================================|
|                Constants                 |
|==========================================|
\******************************************/

pub const MAX_MOVES: usize = 256;

/******************************************\
|==========================================|
|               Board State                |
|==========================================|
\******************************************/

/// The part of the position that a move cannot reconstruct on its own.
///
/// A copy is pushed onto the board history before every move, so undoing
/// a move restores the clock, the castling rights, the en passant square
/// and the hash key exactly as they were.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoardState {
    fifty_move: u8,

    captured: Option<Piece>,

    enpassant: Option<Square>,

    castle: Castling,

    key: Key,
}

impl BoardState {
    /// A fresh state carrying over only what the next move inherits.
    pub(super) fn snapshot(&self) -> Self {
        Self {
            fifty_move: self.fifty_move,
            castle: self.castle,
            enpassant: self.enpassant,
            key: self.key,
            captured: None,
        }
    }
}

/******************************************\
|==========================================|
|                  Board                   |
|==========================================|
\******************************************/

/// A full chess position with enough history to undo moves and detect
/// repetitions.
///
/// Piece placement is kept twice: a square-indexed mailbox for lookups
/// and per-piece-type/per-colour bitboards for set-wise move generation.
/// The two are updated in lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    board: [Option<Piece>; Square::NUM],

    pieces: [Bitboard; PieceType::NUM],

    occupied: [Bitboard; Colour::NUM],

    half_moves: u16,

    stm: Colour,

    pub(crate) state: BoardState,

    history: Vec<BoardState>,
}

/******************************************\
|==========================================|
|           Basic Implementation           |
|==========================================|
\******************************************/

impl Default for Board {
    /// The standard starting position.
    fn default() -> Board {
        let mut board = Board::new();
        board
            .set(START_FEN)
            .expect("start position FEN is well formed");
        board
    }
}

impl Board {
    pub(crate) fn new() -> Board {
        Board {
            board: [None; Square::NUM],
            pieces: [Bitboard::EMPTY; PieceType::NUM],
            occupied: [Bitboard::EMPTY; Colour::NUM],
            stm: Colour::White,
            half_moves: 0,
            state: BoardState::default(),
            history: Vec::with_capacity(MAX_MOVES),
        }
    }

    /// The piece on `square`, if any.
    #[inline]
    pub fn on(&self, square: Square) -> Option<Piece> {
        unsafe { *self.board.get_unchecked(square.index()) }
    }

    /// All pieces of the given type, both colours.
    #[inline]
    pub fn piecetype_bb(&self, piecetype: PieceType) -> Bitboard {
        unsafe { *self.pieces.get_unchecked(piecetype.index()) }
    }

    /// All pieces of the given colour.
    #[inline]
    pub fn occupied_bb(&self, colour: Colour) -> Bitboard {
        unsafe { *self.occupied.get_unchecked(colour.index()) }
    }

    #[inline]
    pub fn all_occupied_bb(&self) -> Bitboard {
        self.occupied_bb(Colour::White) | self.occupied_bb(Colour::Black)
    }

    /// The pieces of one colour and one type.
    #[inline]
    pub fn piece_bb(&self, col: Colour, pt: PieceType) -> Bitboard {
        self.piecetype_bb(pt) & self.occupied_bb(col)
    }

    /// The side to move.
    #[inline]
    pub fn stm(&self) -> Colour {
        self.stm
    }

    /// Plies played since the position the board was set from.
    #[inline]
    pub fn half_moves(&self) -> u16 {
        self.half_moves
    }

    /// The full move number, as it appears in FEN.
    #[inline]
    pub fn full_moves(&self) -> u16 {
        self.half_moves / 2 + 1
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn fifty_move(&self) -> u8 {
        self.state.fifty_move
    }

    /// The en passant target square, the one the double push skipped.
    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.state.enpassant
    }

    /// The square of the pawn that can be captured en passant.
    #[inline]
    pub fn ep_pawn(&self) -> Option<Square> {
        self.state
            .enpassant
            .map(|sq| unsafe { sq.add_unchecked(-self.stm.forward()) })
    }

    #[inline]
    pub fn castling(&self) -> Castling {
        self.state.castle
    }

    /// The Zobrist key of the current position.
    #[inline]
    pub fn key(&self) -> Key {
        self.state.key
    }

    /// The square of the king of `side`.
    ///
    /// Every position the board can hold has exactly one king per side,
    /// enforced when parsing FEN.
    #[inline]
    pub fn ksq(&self, side: Colour) -> Square {
        self.piece_bb(side, PieceType::King).lsb_unchecked()
    }

    /// Whether the king of `side` is attacked by the other side.
    #[inline]
    pub fn king_attacked(&self, side: Colour) -> bool {
        let ksq = self.ksq(side);
        (self.attackers_to(ksq, self.all_occupied_bb()) & self.occupied_bb(!side)).is_occupied()
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.king_attacked(self.stm)
    }

    /// Whether a pawn of `capturer` stands ready to take en passant on
    /// `ep_sq`.
    ///
    /// A target no pawn can reach does not distinguish the position, so
    /// it is kept out of the hash and two positions differing only by
    /// such a target count as repetitions of each other.
    #[inline]
    pub(crate) fn ep_capturable(&self, ep_sq: Square, capturer: Colour) -> bool {
        let candidates = pawn_attack(!capturer, ep_sq);
        (candidates & self.piece_bb(capturer, PieceType::Pawn)).is_occupied()
    }

    /// All pieces of either colour attacking `to`, with `occ` as blockers.
    pub fn attackers_to(&self, to: Square, occ: Bitboard) -> Bitboard {
        use crate::core::{Colour::*, PieceType::*};
        pawn_attack(White, to) & self.piece_bb(Black, Pawn)
            | pawn_attack(Black, to) & self.piece_bb(White, Pawn)
            | knight_attack(to) & self.piecetype_bb(Knight)
            | bishop_attacks(to, occ) & (self.piecetype_bb(Bishop) | self.piecetype_bb(Queen))
            | rook_attacks(to, occ) & (self.piecetype_bb(Rook) | self.piecetype_bb(Queen))
            | king_attack(to) & self.piecetype_bb(King)
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SEPARATOR: &str = "\n     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", SEPARATOR)?;

        for rank in Rank::iter().rev() {
            write!(f, " {}   |", rank as u8 + 1)?;

            for file in File::iter() {
                let square = Square::from_parts(file, rank);
                let cell = match self.on(square) {
                    Some(piece) => piece.to_string(),
                    None => " ".to_string(),
                };
                write!(f, " {} |", cell)?;
            }

            writeln!(f, "{}", SEPARATOR)?;
        }

        writeln!(f)?;
        writeln!(f, "       A   B   C   D   E   F   G   H")?;
        writeln!(f)?;
        writeln!(f, "Current Side: {:?}", self.stm())?;
        writeln!(f, "Castling: {}", self.state.castle)?;
        writeln!(
            f,
            "En Passant Square: {}",
            match self.state.enpassant {
                Some(square) => square.to_string(),
                None => "None".to_string(),
            }
        )?;
        writeln!(f, "Half Move Clock: {}", self.state.fifty_move)?;
        writeln!(f, "Full Move: {}", self.full_moves())?;
        writeln!(f, "Fen: {}", self.fen())?;
        writeln!(f, "Key: {:#X}", self.state.key)?;

        Ok(())
    }
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
    fn test_default_board_is_startpos() {
        let board = Board::default();

        assert_eq!(board.on(Square::E1), Some(Piece::WhiteKing));
        assert_eq!(board.on(Square::D8), Some(Piece::BlackQueen));
        assert_eq!(board.stm(), Colour::White);
        assert_eq!(board.castling(), Castling::ALL);
        assert_eq!(board.ep(), None);
        assert_eq!(board.full_moves(), 1);
    }

    #[test]
    fn test_bitboards_match_mailbox() {
        let board = Board::default();

        for sq in Square::iter() {
            match board.on(sq) {
                Some(piece) => {
                    assert!(board.piece_bb(piece.colour(), piece.pt()).contains(sq));
                }
                None => {
                    assert!(!board.all_occupied_bb().contains(sq));
                }
            }
        }

        assert_eq!(board.occupied_bb(Colour::White).count_bits(), 16);
        assert_eq!(board.occupied_bb(Colour::Black).count_bits(), 16);
        assert_eq!(board.piecetype_bb(PieceType::Pawn).count_bits(), 16);
    }

    #[test]
    fn test_attackers_to() {
        let board = Board::default();
        let occ = board.all_occupied_bb();

        // E2 pawn is defended by the king, the queen and the G1 knight
        let attackers = board.attackers_to(Square::E2, occ) & board.occupied_bb(Colour::White);
        assert!(attackers.contains(Square::E1));
        assert!(attackers.contains(Square::D1));
        assert!(attackers.contains(Square::G1));
        assert!(!attackers.contains(Square::B1));

        // F3 is covered by the G2 pawn and the G1 knight
        let attackers = board.attackers_to(Square::F3, occ) & board.occupied_bb(Colour::White);
        assert!(attackers.contains(Square::G2));
        assert!(attackers.contains(Square::G1));
    }

    #[test]
    fn test_king_lookup_and_check() {
        let board = Board::default();
        assert_eq!(board.ksq(Colour::White), Square::E1);
        assert_eq!(board.ksq(Colour::Black), Square::E8);
        assert!(!board.in_check());

        let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert!(board.in_check());
        assert!(board.king_attacked(Colour::White));
        assert!(!board.king_attacked(Colour::Black));
    }
}
