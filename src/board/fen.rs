use thiserror::Error;

use super::Board;
use super::movegen::king_attack;
use crate::core::*;

/******************************************\
|==========================================|
|            Useful fen strings            |
|==========================================|
\******************************************/

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const TRICKY_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

pub const KILLER_FEN: &str = "rnbqkb1r/pp1p1pPp/8/2p1pP2/1P1P4/3P3P/P1P1P3/RNBQKBNR w KQkq e6 0 1";

/******************************************\
|==========================================|
|               Parse Fen                  |
|==========================================|
\******************************************/

impl Board {
    pub const FEN_SECTIONS: usize = 6;

    /// Sets the board from a FEN string.
    ///
    /// All six fields are required. On top of field-level syntax the
    /// position itself is checked: exactly one king per side, no pawns
    /// on the back ranks, kings not adjacent, and the castling and en
    /// passant fields must agree with the piece placement. A failed
    /// parse leaves the board cleared.
    pub fn set(&mut self, fen: &str) -> Result<(), MalformedPosition> {
        *self = Board::new();

        let result = self.try_set(fen);
        // A failure partway through must not leave a half-built position
        if result.is_err() {
            *self = Board::new();
        }
        result
    }

    fn try_set(&mut self, fen: &str) -> Result<(), MalformedPosition> {
        let mut parts = fen.split_whitespace();

        let piece_placement = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.parse_piece_placement(piece_placement)?;

        let side_to_move = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.parse_side_to_move(side_to_move)?;

        let castling = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.parse_castling(castling)?;

        let enpassant = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.parse_enpassant(enpassant)?;

        let fifty_move_token = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.state.fifty_move = self.parse_fifty_move(fifty_move_token)?;

        let full_move_token = parts.next().ok_or(MalformedPosition::FieldCount)?;
        self.half_moves = self.parse_full_move(full_move_token)?;

        if parts.next().is_some() {
            return Err(MalformedPosition::FieldCount);
        }

        self.validate()?;

        self.state.key = self.calc_key();

        Ok(())
    }

    pub fn from_fen(fen: &str) -> Result<Self, MalformedPosition> {
        let mut board = Board::new();
        board.set(fen)?;
        Ok(board)
    }

    /// Serialises the position back to FEN.
    pub fn fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::iter().rev() {
            let mut empty_count = 0;
            for file in File::iter() {
                let square = Square::from_parts(file, rank);
                match self.on(square) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push_str(&piece.to_string());
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank != Rank::Rank1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push_str(match self.stm() {
            Colour::White => "w",
            Colour::Black => "b",
        });

        fen.push(' ');
        fen.push_str(&self.state.castle.to_string());

        fen.push(' ');
        match self.state.enpassant {
            Some(square) => fen.push_str(&square.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {}", self.state.fifty_move));

        fen.push_str(&format!(" {}", self.full_moves()));

        fen
    }

    fn parse_separator(
        rank_iter: &mut impl DoubleEndedIterator<Item = Rank>,
        rank: Rank,
        file: u8,
    ) -> Result<(Rank, u8), MalformedPosition> {
        if file != 8 {
            return Err(MalformedPosition::RankFormat(format!(
                "Rank {:?} ended prematurely at file index {} (expected 8) before '/'",
                rank, file
            )));
        }

        let next_rank = rank_iter.next().ok_or_else(|| {
            MalformedPosition::RankFormat(format!(
                "Too many rank separators ('/') found after completing rank {:?}",
                rank
            ))
        })?;

        Ok((next_rank, 0))
    }

    fn parse_skip(
        skip: char,
        idx: usize,
        current_rank: Rank,
        current_file_index: u8,
    ) -> Result<u8, MalformedPosition> {
        // Caller only hands us ascii digits
        let skip_val = skip.to_digit(10).unwrap();

        if !(1..=8).contains(&skip_val) {
            return Err(MalformedPosition::RankFormat(format!(
                "Invalid skip digit '{}' (must be 1-8) at char index {}",
                skip, idx
            )));
        }

        let skip_u8 = skip_val as u8;

        if current_file_index + skip_u8 > 8 {
            return Err(MalformedPosition::RankFormat(format!(
                "Skip value {} exceeds rank length at file index {} on rank {:?}",
                skip_u8, current_file_index, current_rank
            )));
        }

        Ok(skip_u8)
    }

    fn parse_piece(&mut self, piece: char, rank: Rank, file: u8) -> Result<(), MalformedPosition> {
        if file >= 8 {
            return Err(MalformedPosition::RankFormat(format!(
                "Piece placement '{}' attempted beyond file H (index >= 8) on rank {:?}",
                piece, rank
            )));
        }

        let piece_enum = piece
            .to_string()
            .parse::<Piece>()
            .map_err(|_| MalformedPosition::InvalidPiece(piece))?;

        // Bounds were checked above
        let current_file = unsafe { File::from_unchecked(file) };

        let sq = Square::from_parts(current_file, rank);

        self.add_piece(piece_enum, sq);

        Ok(())
    }

    fn parse_piece_placement(&mut self, piece_placement: &str) -> Result<(), MalformedPosition> {
        let mut rank_iter = Rank::iter().rev();

        let mut rank = rank_iter
            .next()
            .ok_or_else(|| MalformedPosition::RankFormat("Board has no ranks?".to_string()))?;

        let mut file: u8 = 0;

        for (i, char) in piece_placement.chars().enumerate() {
            match char {
                '/' => {
                    (rank, file) = Self::parse_separator(&mut rank_iter, rank, file)?;
                }

                skip if skip.is_ascii_digit() => {
                    file += Self::parse_skip(skip, i, rank, file)?;
                }

                piece_char => {
                    self.parse_piece(piece_char, rank, file)?;
                    file += 1;
                }
            }
        }

        if file != 8 {
            return Err(MalformedPosition::RankFormat(format!(
                "Final rank {:?} ended prematurely at file index {} (expected 8)",
                rank, file
            )));
        }

        if rank_iter.next().is_some() {
            return Err(MalformedPosition::RankFormat(
                "Not enough ranks specified in FEN string (expected 8)".to_string(),
            ));
        }

        Ok(())
    }

    fn parse_side_to_move(&mut self, side_to_move: &str) -> Result<(), MalformedPosition> {
        match side_to_move {
            "w" => self.stm = Colour::White,
            "b" => self.stm = Colour::Black,
            _ => return Err(MalformedPosition::SideToMove(side_to_move.to_string())),
        };
        Ok(())
    }

    fn parse_castling(&mut self, castling: &str) -> Result<(), MalformedPosition> {
        self.state.castle = Castling::NONE;

        if castling == "-" {
            return Ok(());
        }

        for c in castling.chars() {
            match c {
                'K' => self.state.castle.set(Castling::WK),
                'Q' => self.state.castle.set(Castling::WQ),
                'k' => self.state.castle.set(Castling::BK),
                'q' => self.state.castle.set(Castling::BQ),
                _ => return Err(MalformedPosition::CastlingChar(c)),
            };
        }

        Ok(())
    }

    fn parse_enpassant(&mut self, enpassant: &str) -> Result<(), MalformedPosition> {
        self.state.enpassant = match enpassant {
            "-" => None,

            _ => {
                let square = enpassant
                    .parse::<Square>()
                    .map_err(|_| MalformedPosition::EnPassant(enpassant.to_string()))?;

                // The target is always on the third rank from the
                // opponent's side of the board
                if square.rank() != Rank::Rank6.relative(self.stm) {
                    return Err(MalformedPosition::EnPassant(format!(
                        "{square} is not a valid en passant target for the side to move"
                    )));
                }
                Some(square)
            }
        };
        Ok(())
    }

    fn parse_fifty_move(&mut self, fifty_move_token: &str) -> Result<u8, MalformedPosition> {
        fifty_move_token
            .parse::<u8>()
            .map_err(|_| MalformedPosition::HalfMoveClock(fifty_move_token.to_string()))
    }

    fn parse_full_move(&mut self, full_move_token: &str) -> Result<u16, MalformedPosition> {
        let full_move_number = full_move_token
            .parse::<u16>()
            .map_err(|_| MalformedPosition::FullMoveNumber(full_move_token.to_string()))?;

        if full_move_number == 0 {
            return Err(MalformedPosition::FullMoveNumber(format!(
                "Fullmove number cannot be 0, found: {}",
                full_move_token
            )));
        }

        let ply = (full_move_number - 1) * 2 + (self.stm() as u16);

        Ok(ply)
    }

    /// Checks the parsed position is one the rest of the crate can
    /// operate on.
    fn validate(&self) -> Result<(), MalformedPosition> {
        for colour in [Colour::White, Colour::Black] {
            let kings = self.piece_bb(colour, PieceType::King).count_bits();
            if kings != 1 {
                return Err(MalformedPosition::KingCount(format!(
                    "{:?} has {} kings, expected exactly 1",
                    colour, kings
                )));
            }
        }

        if (self.piecetype_bb(PieceType::Pawn) & Bitboard::BACK_RANKS).is_occupied() {
            return Err(MalformedPosition::PawnOnBackRank);
        }

        if king_attack(self.ksq(Colour::White)).contains(self.ksq(Colour::Black)) {
            return Err(MalformedPosition::AdjacentKings);
        }

        // Each castling right needs its king and rook still at home
        let requirements = [
            (Castling::WK, Piece::WhiteKing, Square::E1, Square::H1),
            (Castling::WQ, Piece::WhiteKing, Square::E1, Square::A1),
            (Castling::BK, Piece::BlackKing, Square::E8, Square::H8),
            (Castling::BQ, Piece::BlackKing, Square::E8, Square::A8),
        ];
        for (right, king, king_sq, rook_sq) in requirements {
            if !self.state.castle.has(right) {
                continue;
            }
            let rook = Piece::from_parts(king.colour(), PieceType::Rook);
            if self.on(king_sq) != Some(king) || self.on(rook_sq) != Some(rook) {
                return Err(MalformedPosition::CastlingRights(format!(
                    "Right '{}' is set but the king or rook has left its home square",
                    right
                )));
            }
        }

        if let Some(ep_sq) = self.state.enpassant {
            let them = !self.stm();
            // The pawn that just double-pushed sits one step past the target
            let pawn_sq = unsafe { ep_sq.add_unchecked(them.forward()) };
            let pawn = Piece::from_parts(them, PieceType::Pawn);
            if self.on(ep_sq).is_some() || self.on(pawn_sq) != Some(pawn) {
                return Err(MalformedPosition::EnPassant(format!(
                    "Target {} is not behind a pawn that just double-pushed",
                    ep_sq
                )));
            }
        }

        Ok(())
    }
}

/******************************************\
|==========================================|
|             Fen Parse Errors             |
|==========================================|
\******************************************/

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum MalformedPosition {
    #[error("FEN string must have 6 fields separated by spaces")]
    FieldCount,

    #[error("Invalid character in FEN piece placement: '{0}'")]
    InvalidPiece(char),

    #[error("Invalid rank format in FEN piece placement: {0}")]
    RankFormat(String),

    #[error("Invalid side to move in FEN: '{0}', expected 'w' or 'b'")]
    SideToMove(String),

    #[error("Invalid character in FEN castling availability: '{0}'")]
    CastlingChar(char),

    #[error("Inconsistent castling rights: {0}")]
    CastlingRights(String),

    #[error("Invalid en passant target square in FEN: '{0}'")]
    EnPassant(String),

    #[error("Invalid halfmove clock value in FEN: '{0}'")]
    HalfMoveClock(String),

    #[error("Invalid fullmove number value in FEN: '{0}'")]
    FullMoveNumber(String),

    #[error("Invalid king count: {0}")]
    KingCount(String),

    #[error("Pawns cannot stand on the first or eighth rank")]
    PawnOnBackRank,

    #[error("The two kings cannot stand on adjacent squares")]
    AdjacentKings,
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
