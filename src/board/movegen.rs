use std::mem::MaybeUninit;
use std::slice;

use thiserror::Error;

use super::Board;
use super::movement::IllegalMove;
use crate::core::*;

/******************************************\
|==========================================|
|              Attack Tables               |
|==========================================|
\******************************************/

type AttackTable = [Bitboard; Square::NUM];

/// Builds the attack table for a leaper from its step directions.
const fn init_leaper_attacks(dirs: &[Direction]) -> AttackTable {
    let mut attacks = [Bitboard::EMPTY; Square::NUM];

    let mut i = 0;
    while i < Square::NUM {
        let sq_bb = unsafe { Square::from_unchecked(i as u8).bb() };

        let mut j = 0;
        while j < dirs.len() {
            attacks[i] = Bitboard(attacks[i].0 | sq_bb.shift(dirs[j]).0);
            j += 1;
        }

        i += 1;
    }

    attacks
}

static PAWN_ATTACKS: [AttackTable; Colour::NUM] = [
    init_leaper_attacks(&[Direction::NE, Direction::NW]),
    init_leaper_attacks(&[Direction::SE, Direction::SW]),
];

#[rustfmt::skip]
static KNIGHT_ATTACKS: AttackTable = init_leaper_attacks(&[
    Direction::NNE, Direction::NNW, Direction::NEE, Direction::NWW,
    Direction::SSE, Direction::SSW, Direction::SEE, Direction::SWW,
]);

#[rustfmt::skip]
static KING_ATTACKS: AttackTable = init_leaper_attacks(&[
    Direction::N, Direction::S, Direction::E, Direction::W,
    Direction::NE, Direction::NW, Direction::SE, Direction::SW,
]);

/// The squares a pawn of `col` on `sq` attacks.
#[inline]
pub fn pawn_attack(col: Colour, sq: Square) -> Bitboard {
    unsafe {
        *PAWN_ATTACKS
            .get_unchecked(col.index())
            .get_unchecked(sq.index())
    }
}

/// The squares a knight on `sq` attacks.
#[inline]
pub fn knight_attack(sq: Square) -> Bitboard {
    unsafe { *KNIGHT_ATTACKS.get_unchecked(sq.index()) }
}

/// The squares a king on `sq` attacks.
#[inline]
pub fn king_attack(sq: Square) -> Bitboard {
    unsafe { *KING_ATTACKS.get_unchecked(sq.index()) }
}

/// The squares a bishop on `sq` attacks, with `occ` as blockers.
#[inline]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Bitboard::slider_attacks(PieceType::Bishop, sq.bb(), occ)
}

/// The squares a rook on `sq` attacks, with `occ` as blockers.
#[inline]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Bitboard::slider_attacks(PieceType::Rook, sq.bb(), occ)
}

/// The squares a queen on `sq` attacks, with `occ` as blockers.
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    bishop_attacks(sq, occ) | rook_attacks(sq, occ)
}

/******************************************\
|==========================================|
|                Move List                 |
|==========================================|
\******************************************/

/// A fixed-capacity list of moves, sized for the most any legal chess
/// position can produce.
pub struct MoveList {
    moves: [MaybeUninit<Move>; super::MAX_MOVES],
    num_moves: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.num_moves, "MoveList index out of bounds");

        unsafe { self.moves[index].assume_init_ref() }
    }
}

impl MoveList {
    #[inline]
    pub fn new() -> MoveList {
        MoveList {
            moves: [MaybeUninit::uninit(); super::MAX_MOVES],
            num_moves: 0,
        }
    }

    #[inline]
    pub(super) fn add_move(&mut self, move_: Move) {
        debug_assert!(self.num_moves < super::MAX_MOVES);

        self.moves[self.num_moves].write(move_);

        self.num_moves += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.num_moves
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_moves == 0
    }

    /// The initialised prefix of the backing array as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        unsafe {
            let ptr = self.moves.as_ptr() as *const Move;
            slice::from_raw_parts(ptr, self.num_moves)
        }
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Whether a move with the same identity is in the list.
    #[inline]
    pub fn contains(&self, move_: Move) -> bool {
        self.iter().any(|m| *m == move_)
    }

    /// Finds the stored move matching `move_` by identity.
    ///
    /// The returned move carries the full flag the generator assigned,
    /// which a bare (from, to, promotion) probe lacks.
    #[inline]
    pub fn find(&self, move_: Move) -> Option<Move> {
        self.iter().copied().find(|m| *m == move_)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/******************************************\
|==========================================|
|              Helper Functions            |
|==========================================|
\******************************************/

/// Adds all four promotion moves for each pawn in `bb` moving along `dir`.
#[inline]
fn add_promo_moves<const CAPTURE: bool>(bb: Bitboard, move_list: &mut MoveList, dir: Direction) {
    bb.for_each(|from| {
        // Safety: `from` is on the rank before promotion, so `dir` stays on the board.
        let to = unsafe { from.add_unchecked(dir) };
        move_list.add_move(Move::new_promotion(from, to, PieceType::Queen, CAPTURE));
        move_list.add_move(Move::new_promotion(from, to, PieceType::Rook, CAPTURE));
        move_list.add_move(Move::new_promotion(from, to, PieceType::Bishop, CAPTURE));
        move_list.add_move(Move::new_promotion(from, to, PieceType::Knight, CAPTURE));
    });
}

/// Adds one move per pawn in `bb`, all moving along `dir` with `flag`.
#[inline]
fn add_pawn_moves(bb: Bitboard, move_list: &mut MoveList, dir: Direction, flag: MoveFlag) {
    bb.for_each(|from| {
        // Safety: the calling context ensures `from` + `dir` stays on the board.
        let to = unsafe { from.add_unchecked(dir) };
        move_list.add_move(Move::new(from, to, flag));
    })
}

/******************************************\
|==========================================|
|              Move Generation             |
|==========================================|
\******************************************/

impl Board {
    /// Generates all pseudo-legal moves for the side to move.
    ///
    /// Pseudo-legal means piece movement rules, occupancy and castling
    /// preconditions are respected, but the mover's king may be left in
    /// check. [`Board::legal_moves`] filters that out.
    pub(crate) fn generate_moves(&self, move_list: &mut MoveList) {
        self.gen_pawn_moves(move_list);
        self.gen_piece_moves(PieceType::Knight, move_list);
        self.gen_piece_moves(PieceType::Bishop, move_list);
        self.gen_piece_moves(PieceType::Rook, move_list);
        self.gen_piece_moves(PieceType::Queen, move_list);
        self.gen_piece_moves(PieceType::King, move_list);

        if !self.in_check() {
            self.gen_castling_moves(move_list);
        }
    }

    /// Generates the legal moves for the side to move.
    ///
    /// Every pseudo-legal move is made on a scratch copy of the board
    /// and kept only when it does not leave the mover's king attacked.
    pub fn legal_moves(&self) -> MoveList {
        let mut pseudo = MoveList::new();
        self.generate_moves(&mut pseudo);

        let mut probe = self.clone();
        let mut legal = MoveList::new();

        for move_ in pseudo.iter() {
            probe.make_move(*move_);
            // After make_move the side to move has flipped, so the
            // mover's king is the one the new side to move attacks.
            if !probe.king_attacked(!probe.stm()) {
                legal.add_move(*move_);
            }
            probe.undo_move(*move_);
        }

        legal
    }

    /// Generates pawn pushes, captures, promotions and en passant.
    ///
    /// Works set-wise: each move kind is one shift of the whole pawn
    /// bitboard, and the promotion rank is split off first so those
    /// pawns fan out into the four promotion moves instead.
    fn gen_pawn_moves(&self, move_list: &mut MoveList) {
        let us = self.stm();
        let them = !us;

        let empty = !self.all_occupied_bb();
        let enemies = self.occupied_bb(them);

        let pawns = self.piece_bb(us, PieceType::Pawn);
        let on_promo = pawns & Bitboard::promo_rank(us);
        let rest = pawns & !on_promo;

        let up = us.forward();
        let up_east = us.forward_east();
        let up_west = us.forward_west();

        // Single and double pushes
        let can_push = rest & empty.shift(-up);
        add_pawn_moves(can_push, move_list, up, MoveFlag::QuietMove);

        let can_double = can_push & Bitboard::push_rank(us) & empty.shift(-up).shift(-up);
        add_pawn_moves(
            can_double,
            move_list,
            us.double_forward(),
            MoveFlag::DoublePawnPush,
        );

        // Ordinary captures
        add_pawn_moves(
            rest & enemies.shift(-up_east),
            move_list,
            up_east,
            MoveFlag::Capture,
        );
        add_pawn_moves(
            rest & enemies.shift(-up_west),
            move_list,
            up_west,
            MoveFlag::Capture,
        );

        // Promotions, quiet and capturing
        if on_promo.is_occupied() {
            add_promo_moves::<false>(on_promo & empty.shift(-up), move_list, up);
            add_promo_moves::<true>(on_promo & enemies.shift(-up_east), move_list, up_east);
            add_promo_moves::<true>(on_promo & enemies.shift(-up_west), move_list, up_west);
        }

        // En passant: any pawn of ours standing where an enemy pawn
        // would attack the target square can capture onto it.
        if let Some(ep) = self.ep() {
            let candidates = rest & pawn_attack(them, ep);
            candidates.for_each(|from| {
                move_list.add_move(Move::new(from, ep, MoveFlag::EPCapture));
            });
        }
    }

    /// Generates moves for every piece of the side to move of type `pt`.
    fn gen_piece_moves(&self, pt: PieceType, move_list: &mut MoveList) {
        let us = self.stm();
        let occ = self.all_occupied_bb();
        let enemies = self.occupied_bb(!us);

        self.piece_bb(us, pt).for_each(|from| {
            let dest = match pt {
                PieceType::Knight => knight_attack(from),
                PieceType::Bishop => bishop_attacks(from, occ),
                PieceType::Rook => rook_attacks(from, occ),
                PieceType::Queen => queen_attacks(from, occ),
                PieceType::King => king_attack(from),
                PieceType::Pawn => unreachable!("pawns have their own generator"),
            } & !self.occupied_bb(us);

            (dest & enemies).for_each(|to| {
                move_list.add_move(Move::new(from, to, MoveFlag::Capture));
            });
            (dest & !occ).for_each(|to| {
                move_list.add_move(Move::new(from, to, MoveFlag::QuietMove));
            });
        });
    }

    /// Generates castling moves for the side to move.
    ///
    /// The caller guarantees the king is not in check. A castle needs
    /// the right to still be held, the squares between king and rook to
    /// be empty, and the squares the king crosses or lands on to be
    /// unattacked.
    fn gen_castling_moves(&self, move_list: &mut MoveList) {
        let us = self.stm();
        let occ = self.all_occupied_bb();

        if self.castling().has(Castling::king_side(us)) {
            let path = Bitboard::from([Square::F1.relative(us), Square::G1.relative(us)]);
            if (occ & path).is_empty() && !self.any_attacked(path, !us) {
                move_list.add_move(Move::new(
                    Square::E1.relative(us),
                    Square::G1.relative(us),
                    MoveFlag::KingCastle,
                ));
            }
        }

        if self.castling().has(Castling::queen_side(us)) {
            let between = Bitboard::from([
                Square::B1.relative(us),
                Square::C1.relative(us),
                Square::D1.relative(us),
            ]);
            // The B file square must be empty but the king never crosses it.
            let path = Bitboard::from([Square::C1.relative(us), Square::D1.relative(us)]);
            if (occ & between).is_empty() && !self.any_attacked(path, !us) {
                move_list.add_move(Move::new(
                    Square::E1.relative(us),
                    Square::C1.relative(us),
                    MoveFlag::QueenCastle,
                ));
            }
        }
    }

    /// Whether any square in `squares` is attacked by a piece of `by`.
    fn any_attacked(&self, squares: Bitboard, by: Colour) -> bool {
        let occ = self.all_occupied_bb();
        let mut bb = squares;
        while let Some(sq) = bb.pop_lsb() {
            if (self.attackers_to(sq, occ) & self.occupied_bb(by)).is_occupied() {
                return true;
            }
        }
        false
    }
}

/******************************************\
|==========================================|
|               Move Parsing               |
|==========================================|
\******************************************/

impl Board {
    /// Parses a move in long algebraic coordinate form and resolves it
    /// against the current position.
    ///
    /// Accepts `e2e4` style moves with an optional promotion suffix
    /// (`e7e8q`). The parsed probe is matched against the legal move
    /// list, so the returned move carries the full flag (capture,
    /// castle, en passant, ...) and is guaranteed to be playable.
    ///
    /// ## Examples
    ///
    /// ```
    /// use castellan::Board;
    ///
    /// let board = Board::default();
    /// let mv = board.parse_move("e2e4").unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// assert!(board.parse_move("e2e5").is_err());
    /// ```
    pub fn parse_move(&self, s: &str) -> Result<Move, ParseMoveError> {
        if !(4..=5).contains(&s.len()) {
            return Err(ParseMoveError::InvalidLength(s.len()));
        }

        let from = s[0..2].parse::<Square>()?;
        let to = s[2..4].parse::<Square>()?;

        let probe = match s.chars().nth(4) {
            None => Move::new(from, to, MoveFlag::QuietMove),
            Some(c) => {
                let pt = match c {
                    'n' => PieceType::Knight,
                    'b' => PieceType::Bishop,
                    'r' => PieceType::Rook,
                    'q' => PieceType::Queen,
                    _ => return Err(ParseMoveError::InvalidPromotion(c)),
                };
                Move::new_promotion(from, to, pt, false)
            }
        };

        self.legal_moves()
            .find(probe)
            .ok_or(ParseMoveError::Illegal(IllegalMove(probe)))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("Invalid length for move string: {0}, expected 4 or 5")]
    InvalidLength(usize),
    #[error(transparent)]
    InvalidSquare(#[from] ParseSquareError),
    #[error("Invalid promotion piece character: '{0}', expected one of \"nbrq\"")]
    InvalidPromotion(char),
    #[error(transparent)]
    Illegal(#[from] IllegalMove),
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::super::fen::*;
    use super::*;

    fn legal_from_fen(fen: &str) -> MoveList {
        Board::from_fen(fen)
            .unwrap_or_else(|e| panic!("Test FEN failed to parse: {}: {}", fen, e))
            .legal_moves()
    }

    #[test]
    fn test_leaper_tables() {
        assert_eq!(
            knight_attack(Square::A1),
            Square::B3.bb() | Square::C2.bb()
        );
        assert_eq!(knight_attack(Square::E4).count_bits(), 8);

        assert_eq!(king_attack(Square::E4).count_bits(), 8);
        assert_eq!(
            king_attack(Square::A1),
            Square::A2.bb() | Square::B1.bb() | Square::B2.bb()
        );

        assert_eq!(
            pawn_attack(Colour::White, Square::E4),
            Square::D5.bb() | Square::F5.bb()
        );
        assert_eq!(pawn_attack(Colour::White, Square::H4), Square::G5.bb());
        assert_eq!(
            pawn_attack(Colour::Black, Square::E4),
            Square::D3.bb() | Square::F3.bb()
        );
        assert_eq!(pawn_attack(Colour::Black, Square::A8), Square::B7.bb());
    }

    #[test]
    fn test_move_list_basics() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let e2e4 = Move::new(Square::E2, Square::E4, MoveFlag::DoublePawnPush);
        list.add_move(e2e4);
        list.add_move(Move::new(Square::G1, Square::F3, MoveFlag::QuietMove));

        assert_eq!(list.len(), 2);
        assert_eq!(list[0], e2e4);
        assert!(list.contains(Move::new(Square::E2, Square::E4, MoveFlag::QuietMove)));
        assert!(!list.contains(Move::new(Square::E2, Square::E3, MoveFlag::QuietMove)));

        let found = list
            .find(Move::new(Square::E2, Square::E4, MoveFlag::QuietMove))
            .unwrap();
        assert_eq!(found.flag(), MoveFlag::DoublePawnPush);
    }

    #[test]
    fn test_startpos_has_twenty_moves() {
        let moves = legal_from_fen(START_FEN);
        assert_eq!(moves.len(), 20);

        // Every pawn can double push, nothing can capture
        let double_pushes = moves.iter().filter(|m| m.is_double_push()).count();
        assert_eq!(double_pushes, 8);
        assert!(moves.iter().all(|m| !m.is_capture()));
    }

    #[test]
    fn test_kiwipete_has_fortyeight_moves() {
        let moves = legal_from_fen(TRICKY_FEN);
        assert_eq!(moves.len(), 48);
    }

    #[test]
    fn test_promotions_fan_out() {
        // One pawn ready to promote, pushing or capturing the rook
        let moves = legal_from_fen("r3k3/1P6/8/8/8/8/8/4K3 w - - 0 1");

        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 8);

        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
        ] {
            assert!(moves.contains(Move::new_promotion(Square::B7, Square::B8, pt, false)));
            assert!(moves.contains(Move::new_promotion(Square::B7, Square::A8, pt, true)));
        }
    }

    #[test]
    fn test_en_passant_generated_from_target() {
        let moves = legal_from_fen("rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");

        let ep = Move::new(Square::E5, Square::D6, MoveFlag::EPCapture);
        let found = moves.find(ep).unwrap();
        assert!(found.is_ep_capture());
    }

    #[test]
    fn test_no_en_passant_without_target() {
        // Same placement but the double-push happened longer ago
        let moves = legal_from_fen("rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3");
        assert!(!moves.contains(Move::new(Square::E5, Square::D6, MoveFlag::EPCapture)));
    }

    #[test]
    fn test_castling_both_sides_available() {
        let moves = legal_from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");

        assert!(moves.contains(Move::new(Square::E1, Square::G1, MoveFlag::KingCastle)));
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveFlag::QueenCastle)));
    }

    #[test]
    fn test_castling_blocked_by_pieces() {
        let moves = legal_from_fen(START_FEN);
        assert!(!moves.contains(Move::new(Square::E1, Square::G1, MoveFlag::KingCastle)));
        assert!(!moves.contains(Move::new(Square::E1, Square::C1, MoveFlag::QueenCastle)));
    }

    #[test]
    fn test_castling_through_check_rejected() {
        // Black rook on f8 covers f1, the square the king passes through
        let moves = legal_from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(Move::new(Square::E1, Square::G1, MoveFlag::KingCastle)));
        // Queen side path (c1, d1) is clear of attacks
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveFlag::QueenCastle)));
    }

    #[test]
    fn test_castling_into_check_rejected() {
        // Black rook on g8 covers g1, the king's destination
        let moves = legal_from_fen("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(Move::new(Square::E1, Square::G1, MoveFlag::KingCastle)));
    }

    #[test]
    fn test_castling_while_in_check_rejected() {
        // Black rook on e8 gives check down the e file
        let moves = legal_from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(Move::new(Square::E1, Square::G1, MoveFlag::KingCastle)));
        assert!(!moves.contains(Move::new(Square::E1, Square::C1, MoveFlag::QueenCastle)));
    }

    #[test]
    fn test_queenside_b_file_attack_does_not_block() {
        // Black rook on b8 attacks b1, which the king never crosses
        let moves = legal_from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveFlag::QueenCastle)));
    }

    #[test]
    fn test_pinned_piece_cannot_move_away() {
        // White knight on e4 is pinned against the king by the e8 rook
        let moves = legal_from_fen("4r1k1/8/8/8/4N3/8/8/4K3 w - - 0 1");
        for move_ in moves.iter() {
            assert_ne!(move_.from(), Square::E4, "pinned knight moved: {}", move_);
        }
    }

    #[test]
    fn test_check_restricts_moves() {
        // White king on e1 checked by the e8 rook; blocking or stepping
        // aside are the only options
        let moves = legal_from_fen("4r1k1/8/8/8/8/8/8/3QK3 w - - 0 1");
        for move_ in moves.iter() {
            let resolves = move_.from() == Square::E1 || move_.to().file() == File::FileE;
            assert!(resolves, "move does not address the check: {}", move_);
        }
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let moves = legal_from_fen("4k3/8/8/8/8/8/r7/4K3 w - - 0 1");
        assert!(!moves.contains(Move::new(Square::E1, Square::D2, MoveFlag::QuietMove)));
        assert!(!moves.contains(Move::new(Square::E1, Square::E2, MoveFlag::QuietMove)));
        assert!(moves.contains(Move::new(Square::E1, Square::D1, MoveFlag::QuietMove)));
    }

    #[test]
    fn test_parse_move_valid() {
        let board = Board::default();

        let mv = board.parse_move("e2e4").unwrap();
        assert_eq!(mv.flag(), MoveFlag::DoublePawnPush);

        let mv = board.parse_move("g1f3").unwrap();
        assert_eq!(mv.flag(), MoveFlag::QuietMove);
    }

    #[test]
    fn test_parse_move_promotion() {
        let board = Board::from_fen("r3k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        let mv = board.parse_move("b7b8q").unwrap();
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
        assert!(!mv.is_capture());

        let mv = board.parse_move("b7a8n").unwrap();
        assert_eq!(mv.promotion(), Some(PieceType::Knight));
        assert!(mv.is_capture());
    }

    #[test]
    fn test_parse_move_errors() {
        let board = Board::default();

        assert!(matches!(
            board.parse_move("e2"),
            Err(ParseMoveError::InvalidLength(2))
        ));
        assert!(matches!(
            board.parse_move("e2e4qq"),
            Err(ParseMoveError::InvalidLength(6))
        ));
        assert!(matches!(
            board.parse_move("z2e4"),
            Err(ParseMoveError::InvalidSquare(_))
        ));
        assert!(matches!(
            board.parse_move("e7e8x"),
            Err(ParseMoveError::InvalidPromotion('x'))
        ));
        assert!(matches!(
            board.parse_move("e2e5"),
            Err(ParseMoveError::Illegal(_))
        ));
    }
}
