use std::hash::{Hash, Hasher};

use super::piece::PieceType;
use super::square::Square;

/******************************************\
|==========================================|
|                Move Flag                 |
|==========================================|
\******************************************/

/// The 4-bit move kind tag packed into the top of a [`Move`].
///
/// Bit 2 marks captures and bit 3 marks promotions, so both properties
/// are a single mask test. The low two bits of a promotion flag select
/// the promotion piece.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveFlag {
    QuietMove = 0b0000,

    DoublePawnPush = 0b0001,

    KingCastle = 0b0010,

    QueenCastle = 0b0011,

    Capture = 0b0100,

    EPCapture = 0b0101,

    KnightPromo = 0b1000,

    BishopPromo = 0b1001,

    RookPromo = 0b1010,

    QueenPromo = 0b1011,

    KnightPromoCapture = 0b1100,

    BishopPromoCapture = 0b1101,

    RookPromoCapture = 0b1110,

    QueenPromoCapture = 0b1111,
}

crate::impl_from_to_primitive!(MoveFlag, u16);

impl MoveFlag {
    const CAPTURE_FLAG_MASK: u16 = 0x4;

    const PROMOTION_FLAG_MASK: u16 = 0x8;

    const PROMOTION_PIECE_MASK: u16 = 0x3;

    #[inline(always)]
    pub const fn is_capture(self) -> bool {
        (self as u16 & Self::CAPTURE_FLAG_MASK) != 0
    }

    #[inline(always)]
    pub const fn is_promotion(self) -> bool {
        (self as u16 & Self::PROMOTION_FLAG_MASK) != 0
    }

    /// The piece a promotion flag promotes to.
    ///
    /// Only meaningful on promotion flags; on other flags the low bits
    /// alias the quiet/castle tags.
    #[inline(always)]
    pub const fn promotion_piece_type(self) -> PieceType {
        let promo_index = (self as u16 & Self::PROMOTION_PIECE_MASK) as usize;

        match promo_index {
            0 => PieceType::Knight,
            1 => PieceType::Bishop,
            2 => PieceType::Rook,
            3 => PieceType::Queen,
            _ => unreachable!(),
        }
    }

    /// Builds the promotion flag for a piece type and capture bit.
    ///
    /// Panics on pawn or king, which are not promotion targets.
    pub const fn promotion_flag(piece_type: PieceType, is_capture: bool) -> MoveFlag {
        match (piece_type, is_capture) {
            (PieceType::Knight, false) => MoveFlag::KnightPromo,
            (PieceType::Bishop, false) => MoveFlag::BishopPromo,
            (PieceType::Rook, false) => MoveFlag::RookPromo,
            (PieceType::Queen, false) => MoveFlag::QueenPromo,
            (PieceType::Knight, true) => MoveFlag::KnightPromoCapture,
            (PieceType::Bishop, true) => MoveFlag::BishopPromoCapture,
            (PieceType::Rook, true) => MoveFlag::RookPromoCapture,
            (PieceType::Queen, true) => MoveFlag::QueenPromoCapture,
            _ => panic!("Invalid promotion piece type!"),
        }
    }
}

/******************************************\
|==========================================|
|                   Move                   |
|==========================================|
\******************************************/

/// A move packed into 16 bits: 6 bits origin, 6 bits destination, 4 bits
/// [`MoveFlag`].
///
/// Move identity is the (origin, destination, promotion) triple: two
/// moves compare equal even when one carries a capture tag and the other
/// does not. The remaining flag bits are bookkeeping for make/undo, not
/// part of what distinguishes one move from another in a position.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    data: u16,
}

impl Default for Move {
    fn default() -> Self {
        Self::NONE
    }
}

impl Move {
    const FROM_SHIFT: u16 = 0;

    const TO_SHIFT: u16 = 6;

    const FLAG_SHIFT: u16 = 12;

    const SQUARE_MASK: u16 = 0x3F;

    const FLAG_MASK: u16 = 0xF;

    pub const NONE: Self = Self::new(Square::A1, Square::A1, MoveFlag::QuietMove);

    #[inline(always)]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        let data = ((from as u16) << Self::FROM_SHIFT)
            | ((to as u16) << Self::TO_SHIFT)
            | ((flag as u16) << Self::FLAG_SHIFT);

        Self { data }
    }

    #[inline(always)]
    pub fn new_promotion(
        from: Square,
        to: Square,
        piece_type: PieceType,
        is_capture: bool,
    ) -> Self {
        Self::new(from, to, MoveFlag::promotion_flag(piece_type, is_capture))
    }

    /// The origin square.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        // The 6-bit mask keeps the index in range
        unsafe { Square::from_unchecked(((self.data >> Self::FROM_SHIFT) & Self::SQUARE_MASK) as u8) }
    }

    /// The destination square.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        // The 6-bit mask keeps the index in range
        unsafe { Square::from_unchecked(((self.data >> Self::TO_SHIFT) & Self::SQUARE_MASK) as u8) }
    }

    #[inline(always)]
    pub const fn flag(&self) -> MoveFlag {
        MoveFlag::from_unchecked((self.data >> Self::FLAG_SHIFT) & Self::FLAG_MASK)
    }

    /// The promotion piece, or `None` for non-promotion moves.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceType> {
        if self.flag().is_promotion() {
            Some(self.flag().promotion_piece_type())
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.flag().is_capture()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.flag().is_promotion()
    }

    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        self.flag() as u8 == MoveFlag::QuietMove as u8
    }

    #[inline(always)]
    pub const fn is_double_push(&self) -> bool {
        self.flag() as u8 == MoveFlag::DoublePawnPush as u8
    }

    #[inline(always)]
    pub const fn is_ep_capture(&self) -> bool {
        self.flag() as u8 == MoveFlag::EPCapture as u8
    }

    #[inline(always)]
    pub const fn is_king_castle(&self) -> bool {
        self.flag() as u8 == MoveFlag::KingCastle as u8
    }

    #[inline(always)]
    pub const fn is_queen_castle(&self) -> bool {
        self.flag() as u8 == MoveFlag::QueenCastle as u8
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.is_king_castle() || self.is_queen_castle()
    }

    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        self.data == Self::NONE.data
    }

    #[inline(always)]
    pub const fn raw(&self) -> u16 {
        self.data
    }
}

/******************************************\
|==========================================|
|               Move Identity              |
|==========================================|
\******************************************/

// Equality deliberately ignores the capture/quiet distinction so that a
// bare (from, to, promotion) probe matches the fully tagged move the
// generator produced.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from() as u8 == other.from() as u8
            && self.to() as u8 == other.to() as u8
            && self.promotion() == other.promotion()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from().hash(state);
        self.to().hash(state);
        self.promotion().map(|pt| pt as u8).hash(state);
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl std::fmt::Display for Move {
    /// Displays the move in long algebraic coordinate form: `e2e4`,
    /// `e7e8q` for promotions, `e1g1` for castling.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(pt) = self.promotion() {
            write!(f, "{}", pt)?;
        }
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
    use crate::core::square::Square::*;

    #[test]
    fn test_encoding_decoding_basic() {
        let m = Move::new(E2, E4, MoveFlag::QuietMove);
        assert_eq!(m.from(), E2);
        assert_eq!(m.to(), E4);
        assert_eq!(m.flag(), MoveFlag::QuietMove);
        assert!(m.is_quiet());
        assert!(!m.is_capture());
        assert!(!m.is_promotion());
        assert!(!m.is_castle());
    }

    #[test]
    fn test_encoding_decoding_capture() {
        let m = Move::new(D4, C5, MoveFlag::Capture);
        assert_eq!(m.from(), D4);
        assert_eq!(m.to(), C5);
        assert_eq!(m.flag(), MoveFlag::Capture);
        assert!(!m.is_quiet());
        assert!(m.is_capture());
        assert!(!m.is_ep_capture());
    }

    #[test]
    fn test_encoding_decoding_ep_capture() {
        let m = Move::new(E5, D6, MoveFlag::EPCapture);
        assert_eq!(m.flag(), MoveFlag::EPCapture);
        assert!(m.is_capture());
        assert!(m.is_ep_capture());
        assert!(!m.is_promotion());
    }

    #[test]
    fn test_encoding_decoding_double_push() {
        let m = Move::new(A2, A4, MoveFlag::DoublePawnPush);
        assert!(m.is_double_push());
        assert!(!m.is_capture());
        assert!(!m.is_promotion());
    }

    #[test]
    fn test_encoding_decoding_castles() {
        let m_ks = Move::new(E1, G1, MoveFlag::KingCastle);
        assert!(m_ks.is_king_castle());
        assert!(!m_ks.is_queen_castle());
        assert!(m_ks.is_castle());
        assert!(!m_ks.is_capture());

        let m_qs = Move::new(E8, C8, MoveFlag::QueenCastle);
        assert!(!m_qs.is_king_castle());
        assert!(m_qs.is_queen_castle());
        assert!(m_qs.is_castle());
    }

    #[test]
    fn test_promotion_constructors() {
        let m_qn = Move::new_promotion(A7, A8, PieceType::Knight, false);
        assert_eq!(m_qn.flag(), MoveFlag::KnightPromo);
        assert!(m_qn.is_promotion());
        assert!(!m_qn.is_capture());
        assert_eq!(m_qn.promotion(), Some(PieceType::Knight));

        let m_cq = Move::new_promotion(D7, E8, PieceType::Queen, true);
        assert_eq!(m_cq.flag(), MoveFlag::QueenPromoCapture);
        assert!(m_cq.is_capture());
        assert_eq!(m_cq.promotion(), Some(PieceType::Queen));

        let m_cr = Move::new_promotion(C7, D8, PieceType::Rook, true);
        assert_eq!(m_cr.flag(), MoveFlag::RookPromoCapture);
        assert_eq!(m_cr.promotion(), Some(PieceType::Rook));

        let m_qb = Move::new_promotion(B7, B8, PieceType::Bishop, false);
        assert_eq!(m_qb.flag(), MoveFlag::BishopPromo);
        assert_eq!(m_qb.promotion(), Some(PieceType::Bishop));
    }

    #[test]
    #[should_panic(expected = "Invalid promotion piece type!")]
    fn test_invalid_promotion_panic_pawn() {
        Move::new_promotion(A7, A8, PieceType::Pawn, false);
    }

    #[test]
    #[should_panic(expected = "Invalid promotion piece type!")]
    fn test_invalid_promotion_panic_king() {
        Move::new_promotion(A7, A8, PieceType::King, false);
    }

    #[test]
    fn test_promotion_accessor() {
        assert_eq!(Move::new(E2, E4, MoveFlag::QuietMove).promotion(), None);
        assert_eq!(Move::new(E4, D5, MoveFlag::Capture).promotion(), None);
        assert_eq!(Move::new(E1, G1, MoveFlag::KingCastle).promotion(), None);
        assert_eq!(
            Move::new_promotion(E7, E8, PieceType::Queen, false).promotion(),
            Some(PieceType::Queen)
        );
    }

    #[test]
    fn test_move_identity_ignores_capture_tag() {
        let quiet = Move::new(E2, E4, MoveFlag::QuietMove);
        let push = Move::new(E2, E4, MoveFlag::DoublePawnPush);
        let capture = Move::new(E2, E4, MoveFlag::Capture);

        assert_eq!(quiet, push);
        assert_eq!(quiet, capture);
        assert_ne!(quiet, Move::new(E2, E3, MoveFlag::QuietMove));
    }

    #[test]
    fn test_move_identity_promotion_distinguishes() {
        let queen = Move::new_promotion(E7, E8, PieceType::Queen, false);
        let queen_cap = Move::new_promotion(E7, E8, PieceType::Queen, true);
        let rook = Move::new_promotion(E7, E8, PieceType::Rook, false);
        let plain = Move::new(E7, E8, MoveFlag::QuietMove);

        assert_eq!(queen, queen_cap);
        assert_ne!(queen, rook);
        assert_ne!(queen, plain);
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(E2, E4, MoveFlag::DoublePawnPush).to_string(), "e2e4");
        assert_eq!(Move::new(E5, D6, MoveFlag::EPCapture).to_string(), "e5d6");
        assert_eq!(Move::new(E1, G1, MoveFlag::KingCastle).to_string(), "e1g1");
        assert_eq!(
            Move::new_promotion(E7, E8, PieceType::Queen, false).to_string(),
            "e7e8q"
        );
        assert_eq!(
            Move::new_promotion(B7, A8, PieceType::Knight, true).to_string(),
            "b7a8n"
        );
    }

    #[test]
    fn test_default_move() {
        let default_move = Move::default();
        assert_eq!(default_move.raw(), 0);
        assert_eq!(default_move.from(), A1);
        assert_eq!(default_move.to(), A1);
        assert!(default_move.is_quiet());
        assert!(default_move.is_none());
    }
}
