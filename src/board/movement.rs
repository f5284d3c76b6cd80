use thiserror::Error;

use super::Board;
use crate::core::*;

/******************************************\
|==========================================|
|             Castling Rights              |
|==========================================|
\******************************************/

/// Per-square castling rights masks.
///
/// A move touching a square keeps only the rights in that square's mask,
/// so a king or rook leaving its home square, or a rook being captured
/// on it, clears the affected rights and every other square is a no-op.
#[rustfmt::skip]
const CASTLING_RIGHTS_MASK: [u8; Square::NUM] = [
    13, 15, 15, 15, 12, 15, 15, 14,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
     7, 15, 15, 15,  3, 15, 15, 11,
];

/// The rights that survive a move touching `sq`.
#[inline]
fn castling_rights(sq: Square) -> Castling {
    Castling(CASTLING_RIGHTS_MASK[sq.index()])
}

/******************************************\
|==========================================|
|              Illegal Moves               |
|==========================================|
\******************************************/

/// Returned when a move is not in the legal move set of the position it
/// was applied to.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Move '{0}' is not legal in this position")]
pub struct IllegalMove(pub Move);

/******************************************\
|==========================================|
|             Low Level Helpers            |
|==========================================|
\******************************************/

impl Board {
    /// Puts a piece on `square`, updating the mailbox and bitboards.
    ///
    /// Does not touch the Zobrist key or any counters.
    #[inline]
    pub(crate) fn add_piece(&mut self, piece: Piece, square: Square) {
        self.board[square.index()] = Some(piece);
        self.pieces[piece.pt().index()].set(square);
        self.occupied[piece.colour().index()].set(square);
    }

    /// Removes the piece on `square`, updating the mailbox and bitboards.
    ///
    /// Does not touch the Zobrist key or any counters. The square must
    /// be occupied.
    #[inline]
    pub(crate) fn remove_piece(&mut self, square: Square) {
        debug_assert!(self.on(square).is_some(), "remove_piece: 'square' is empty");
        let piece = unsafe { self.on(square).unwrap_unchecked() };

        self.board[square.index()] = None;
        self.pieces[piece.pt().index()].clear(square);
        self.occupied[piece.colour().index()].clear(square);
    }

    /// Moves the piece on `from` to `to`, updating the mailbox and
    /// bitboards.
    ///
    /// Does not touch the Zobrist key or any counters. The `from` square
    /// must be occupied and `to` must be empty.
    #[inline]
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        debug_assert!(
            self.on(from).is_some(),
            "move_piece: 'from' square is empty"
        );
        let piece = unsafe { self.on(from).unwrap_unchecked() };

        self.board[from.index()] = None;
        self.board[to.index()] = Some(piece);

        self.pieces[piece.pt().index()].clear(from);
        self.pieces[piece.pt().index()].set(to);

        self.occupied[piece.colour().index()].clear(from);
        self.occupied[piece.colour().index()].set(to);
    }

    /// Records the en passant target of a double push from `from`.
    ///
    /// The target always goes into the state so it round-trips through
    /// FEN, but its file is hashed only when an enemy pawn could take
    /// it, keeping the keys of otherwise identical positions equal.
    #[inline]
    fn set_ep(&mut self, from: Square) {
        let us = self.stm;
        // The skipped square is one step ahead of the pushing pawn
        let ep_sq = unsafe { from.add_unchecked(us.forward()) };
        self.state.enpassant = Some(ep_sq);

        if self.ep_capturable(ep_sq, !us) {
            self.state.toggle_ep(ep_sq.file());
        }
    }

    /// The home square of the rook taking part in a castle.
    #[inline]
    fn rook_from(&self, king_side: bool) -> Square {
        match king_side {
            true => Square::H1.relative(self.stm),
            false => Square::A1.relative(self.stm),
        }
    }

    /// The square the castling rook lands on.
    #[inline]
    fn rook_to(&self, king_side: bool) -> Square {
        match king_side {
            true => Square::F1.relative(self.stm),
            false => Square::D1.relative(self.stm),
        }
    }

    /// Performs the rook half of a castle and hashes it.
    ///
    /// The king is moved by `make_move` itself.
    #[inline]
    fn castle(&mut self, king_side: bool) {
        let piece = Piece::from_parts(self.stm, PieceType::Rook);

        let rook_from = self.rook_from(king_side);
        let rook_to = self.rook_to(king_side);

        self.move_piece(rook_from, rook_to);

        self.state.toggle_piece(piece, rook_from);
        self.state.toggle_piece(piece, rook_to);
    }

    /// Moves the castling rook back home.
    ///
    /// No hashing: `undo_move` restores the whole key from history.
    #[inline]
    fn undo_castle(&mut self, king_side: bool) {
        let rook_from = self.rook_from(king_side);
        let rook_to = self.rook_to(king_side);

        self.move_piece(rook_to, rook_from);
    }

    /// Masks the castling rights with those surviving a move from `from`
    /// to `to`, rehashing the rights.
    #[inline]
    fn update_castle_rights(&mut self, from: Square, to: Square) {
        self.state.toggle_castle(self.state.castle);
        self.state
            .castle
            .mask(castling_rights(from) & castling_rights(to));
        self.state.toggle_castle(self.state.castle);
    }
}

/******************************************\
|==========================================|
|              Making Moves                |
|==========================================|
\******************************************/

impl Board {
    /// Applies a move after checking it is legal here.
    ///
    /// The move only needs the right origin, destination and promotion
    /// piece; the matching generated move, with its full flag, is the
    /// one played and returned. An illegal move leaves the board
    /// untouched.
    pub fn apply(&mut self, move_: Move) -> Result<Move, IllegalMove> {
        match self.legal_moves().find(move_) {
            Some(tagged) => {
                self.make_move(tagged);
                Ok(tagged)
            }
            None => Err(IllegalMove(move_)),
        }
    }

    /// Applies a move to the board, updating all state.
    ///
    /// The move must come from this position's move generator. Pushes
    /// the current [`super::BoardState`] onto the history so
    /// [`Board::undo_move`] can restore it exactly, then updates the
    /// placement, the counters, the castling rights, the en passant
    /// target and the Zobrist key incrementally, and flips the side to
    /// move.
    pub fn make_move(&mut self, move_: Move) {
        // The current state becomes the previous state
        let state = self.state.snapshot();
        let old = std::mem::replace(&mut self.state, state);
        self.history.push(old);

        self.half_moves += 1;

        let from = move_.from();
        let to = move_.to();
        let us = self.stm;
        let them = !us;
        debug_assert!(self.on(from).is_some(), "make_move: 'from' square is empty");
        let piece = unsafe { self.on(from).unwrap_unchecked() };
        let flag = move_.flag();

        // Incremented by default, reset below on pawn moves and captures
        self.state.fifty_move += 1;

        // Clear the stale en passant target before possibly setting a new
        // one. No piece has moved yet, so the capturability test sees the
        // same placement the target was hashed against.
        if let Some(ep_sq) = self.state.enpassant {
            if self.ep_capturable(ep_sq, us) {
                self.state.toggle_ep(ep_sq.file());
            }
            self.state.enpassant = None;
        }

        match flag {
            MoveFlag::QuietMove => {
                if piece.pt() == PieceType::Pawn {
                    self.state.fifty_move = 0;
                }
                self.move_piece(from, to);
                self.state.toggle_piece(piece, from);
                self.state.toggle_piece(piece, to);
                self.update_castle_rights(from, to);
            }
            MoveFlag::DoublePawnPush => {
                self.state.fifty_move = 0;
                self.set_ep(from);
                self.move_piece(from, to);
                self.state.toggle_piece(piece, from);
                self.state.toggle_piece(piece, to);
            }
            MoveFlag::KingCastle | MoveFlag::QueenCastle => {
                // Pick the king up first so the rook can cross its square
                self.remove_piece(from);
                self.state.toggle_piece(piece, from);

                self.castle(flag == MoveFlag::KingCastle);

                self.add_piece(piece, to);
                self.state.toggle_piece(piece, to);
                self.update_castle_rights(from, to);
            }
            MoveFlag::Capture => {
                self.state.fifty_move = 0;
                debug_assert!(
                    self.on(to).is_some(),
                    "make_move: Capture flag set, but 'to' square is empty"
                );
                let captured = unsafe { self.on(to).unwrap_unchecked() };
                self.state.captured = Some(captured);

                self.remove_piece(to);
                self.state.toggle_piece(captured, to);

                self.move_piece(from, to);
                self.state.toggle_piece(piece, from);
                self.state.toggle_piece(piece, to);
                // Also clears rights when a rook is captured at home
                self.update_castle_rights(from, to);
            }
            MoveFlag::EPCapture => {
                self.state.fifty_move = 0;
                // The captured pawn sits behind the target square
                let cap_sq = unsafe { to.add_unchecked(-us.forward()) };
                let captured = Piece::from_parts(them, PieceType::Pawn);
                self.state.captured = Some(captured);

                self.remove_piece(cap_sq);
                self.state.toggle_piece(captured, cap_sq);

                self.move_piece(from, to);
                self.state.toggle_piece(piece, from);
                self.state.toggle_piece(piece, to);
            }
            MoveFlag::KnightPromo
            | MoveFlag::BishopPromo
            | MoveFlag::RookPromo
            | MoveFlag::QueenPromo => {
                self.state.fifty_move = 0;
                debug_assert!(move_.promotion().is_some());
                let promo_pt = unsafe { move_.promotion().unwrap_unchecked() };
                let promo_piece = Piece::from_parts(us, promo_pt);

                self.remove_piece(from);
                self.state.toggle_piece(piece, from);

                self.add_piece(promo_piece, to);
                self.state.toggle_piece(promo_piece, to);
                self.update_castle_rights(from, to);
            }
            MoveFlag::KnightPromoCapture
            | MoveFlag::BishopPromoCapture
            | MoveFlag::RookPromoCapture
            | MoveFlag::QueenPromoCapture => {
                self.state.fifty_move = 0;
                debug_assert!(
                    self.on(to).is_some(),
                    "make_move: PromoCapture flag set, but 'to' square is empty"
                );
                let captured = unsafe { self.on(to).unwrap_unchecked() };
                self.state.captured = Some(captured);

                self.remove_piece(to);
                self.state.toggle_piece(captured, to);

                debug_assert!(move_.promotion().is_some());
                let promo_pt = unsafe { move_.promotion().unwrap_unchecked() };
                let promo_piece = Piece::from_parts(us, promo_pt);

                self.remove_piece(from);
                self.state.toggle_piece(piece, from);

                self.add_piece(promo_piece, to);
                self.state.toggle_piece(promo_piece, to);
                self.update_castle_rights(from, to);
            }
        }

        self.stm = !self.stm;
        self.state.toggle_side();
    }

    /// Reverses a move that was just made.
    ///
    /// `move_` must be the exact move passed to the matching
    /// [`Board::make_move`] call, with no other mutation in between.
    /// The previous state is popped off the history, so counters,
    /// rights, the en passant target and the key come back bit for bit.
    pub fn undo_move(&mut self, move_: Move) {
        self.stm = !self.stm;
        self.half_moves -= 1;

        let from = move_.from();
        let to = move_.to();
        let us = self.stm;
        let flag = move_.flag();
        // The captured piece lives in the state being discarded
        let captured = self.state.captured;

        // Calling undo without a prior make is a fatal logic error
        self.state = self.history.pop().unwrap();

        match flag {
            MoveFlag::QuietMove | MoveFlag::DoublePawnPush => {
                self.move_piece(to, from);
            }
            MoveFlag::Capture => {
                self.move_piece(to, from);
                debug_assert!(
                    captured.is_some(),
                    "undo_move: Capture flag set, but no captured piece stored"
                );
                self.add_piece(unsafe { captured.unwrap_unchecked() }, to);
            }
            MoveFlag::EPCapture => {
                self.move_piece(to, from);
                let cap_sq = unsafe { to.add_unchecked(-us.forward()) };
                debug_assert!(
                    captured.is_some(),
                    "undo_move: EPCapture flag set, but no captured piece stored"
                );
                self.add_piece(unsafe { captured.unwrap_unchecked() }, cap_sq);
            }
            MoveFlag::KingCastle | MoveFlag::QueenCastle => {
                self.remove_piece(to);
                self.undo_castle(flag == MoveFlag::KingCastle);
                self.add_piece(Piece::from_parts(us, PieceType::King), from);
            }
            MoveFlag::KnightPromo
            | MoveFlag::BishopPromo
            | MoveFlag::RookPromo
            | MoveFlag::QueenPromo => {
                self.remove_piece(to);
                self.add_piece(Piece::from_parts(us, PieceType::Pawn), from);
            }
            MoveFlag::KnightPromoCapture
            | MoveFlag::BishopPromoCapture
            | MoveFlag::RookPromoCapture
            | MoveFlag::QueenPromoCapture => {
                self.remove_piece(to);
                debug_assert!(
                    captured.is_some(),
                    "undo_move: PromoCapture flag set, but no captured piece stored"
                );
                self.add_piece(unsafe { captured.unwrap_unchecked() }, to);
                self.add_piece(Piece::from_parts(us, PieceType::Pawn), from);
            }
        }
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
