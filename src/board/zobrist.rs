use super::{Board, BoardState};
use crate::core::*;
use crate::utils::PRNG;

/******************************************\
|==========================================|
|              Key Definition              |
|==========================================|
\******************************************/

/// A Zobrist hash of a position, used for repetition detection.
pub type Key = u64;

/******************************************\
|==========================================|
|              Zobrist Table               |
|==========================================|
\******************************************/

/// The precomputed random numbers for Zobrist hashing.
///
/// Every hashable element of a position (a piece on a square, the side
/// to move, a castling rights combination, an en passant file) has its
/// own key, and a position hash is the XOR of the keys of its elements.
#[derive(Debug)]
pub struct ZobristTable {
    /// Keys for each piece on each square: `pieces[piece_index][square_index]`.
    pub pieces: [[Key; Square::NUM]; Piece::NUM],
    /// Key XORed in when Black is to move.
    pub side_to_move: Key,
    /// Keys for each possible castling rights mask: `castling[castling_mask]`.
    pub castling: [Key; Castling::NUM],
    /// Keys for each possible en passant file: `enpassant[file_index]`.
    pub enpassant: [Key; File::NUM],
}

pub const ZOBRIST: ZobristTable = init_zobrist_table();

/******************************************\
|==========================================|
|              Initialisation              |
|==========================================|
\******************************************/

const fn init_zobrist_table() -> ZobristTable {
    let mut rng = PRNG::new(0x7C2E9D41B8F0A653);

    let mut pieces = [[0; Square::NUM]; Piece::NUM];
    let mut castling = [0; Castling::NUM];
    let mut enpassant = [0; File::NUM];

    let mut i = 0;
    while i < Piece::NUM {
        let mut j = 0;
        while j < Square::NUM {
            pieces[i][j] = rng.random_u64();
            j += 1;
        }
        i += 1;
    }

    let side_to_move = rng.random_u64();

    i = 0;
    while i < Castling::NUM {
        castling[i] = rng.random_u64();
        i += 1;
    }

    i = 0;
    while i < File::NUM {
        enpassant[i] = rng.random_u64();
        i += 1;
    }

    ZobristTable {
        pieces,
        side_to_move,
        castling,
        enpassant,
    }
}

/******************************************\
|==========================================|
|              Access Functions            |
|==========================================|
\******************************************/

/// The key for a specific piece on a specific square.
#[inline]
pub fn piece_key(piece: Piece, sq: Square) -> Key {
    unsafe {
        *ZOBRIST
            .pieces
            .get_unchecked(piece.index())
            .get_unchecked(sq.index())
    }
}

/// The key XORed into the hash when Black is to move.
#[inline]
pub fn side_key() -> Key {
    ZOBRIST.side_to_move
}

/// The key for a set of castling rights.
#[inline]
pub fn castle_key(flag: Castling) -> Key {
    ZOBRIST.castling[flag.0 as usize]
}

/// The key for an en passant capture being possible on a file.
#[inline]
pub fn ep_key(file: File) -> Key {
    unsafe { *ZOBRIST.enpassant.get_unchecked(file.index()) }
}

/******************************************\
|==========================================|
|           Incremental Updates            |
|==========================================|
\******************************************/

impl BoardState {
    #[inline]
    pub(super) fn toggle_piece(&mut self, piece: Piece, sq: Square) {
        self.key ^= piece_key(piece, sq);
    }

    #[inline]
    pub(super) fn toggle_castle(&mut self, flag: Castling) {
        self.key ^= castle_key(flag);
    }

    #[inline]
    pub(super) fn toggle_side(&mut self) {
        self.key ^= side_key();
    }

    #[inline]
    pub(super) fn toggle_ep(&mut self, file: File) {
        self.key ^= ep_key(file);
    }
}

/******************************************\
|==========================================|
|            Board Implementation          |
|==========================================|
\******************************************/

impl Board {
    /// Computes the Zobrist key of the board from scratch.
    ///
    /// Moves keep the key up to date incrementally; this full
    /// recomputation seeds it after FEN parsing and cross-checks it in
    /// tests.
    pub(crate) fn calc_key(&self) -> Key {
        let mut key = 0;

        for sq in Square::iter() {
            if let Some(piece) = self.on(sq) {
                key ^= piece_key(piece, sq);
            }
        }

        if self.stm() as u8 == Colour::Black as u8 {
            key ^= side_key();
        }

        key ^= castle_key(self.state.castle);

        // An uncapturable target is carried for FEN output but not hashed
        if let Some(ep_square) = self.state.enpassant {
            if self.ep_capturable(ep_square, self.stm()) {
                key ^= ep_key(ep_square.file());
            }
        }

        key
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
