use std::fmt;

use super::{Colour, Direction, File, PieceType, Rank, Square};

/******************************************\
|==========================================|
|                 Bitboard                 |
|==========================================|
\******************************************/

/// A 64-bit set of squares, one bit per square from A1 (LSB) to H8 (MSB).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Bitboard(pub u64);

crate::impl_bit_ops!(Bitboard);
crate::impl_bit_mani_ops!(Bitboard, u8);

/******************************************\
|==========================================|
|           Bitboard Constants             |
|==========================================|
\******************************************/

impl Bitboard {
    /// The empty set.
    pub const EMPTY: Bitboard = Bitboard(0);

    /// All 64 squares.
    pub const FULL: Bitboard = Bitboard(!Self::EMPTY.0);

    /// Only the A1 square.
    pub const A1: Bitboard = Bitboard(1);

    /// The 1st rank.
    pub const RANK_1: Bitboard = Bitboard(0x00000000000000ff);

    /// The 8th rank.
    pub const RANK_8: Bitboard = Bitboard(0xff00000000000000);

    /// The 1st and 2nd ranks.
    pub const RANK_12: Bitboard = Bitboard(0x000000000000ffff);

    /// The 7th and 8th ranks.
    pub const RANK_78: Bitboard = Bitboard(0xffff000000000000);

    /// The A file.
    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);

    /// The H file.
    pub const FILE_H: Bitboard = Bitboard(0x8080808080808080);

    /// The A and B files.
    const FILE_AB: Bitboard = Bitboard(0x303030303030303);

    /// The G and H files.
    const FILE_GH: Bitboard = Bitboard(0xC0C0C0C0C0C0C0C0);

    /// Both back ranks, where pawns can never stand.
    pub const BACK_RANKS: Bitboard = Bitboard(Self::RANK_1.0 | Self::RANK_8.0);
}

/******************************************\
|==========================================|
|                Conversions               |
|==========================================|
\******************************************/

impl Square {
    /// The bitboard holding only this square.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(Bitboard::A1.0 << *self as u8)
    }
}

impl Rank {
    /// The bitboard holding every square on this rank.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(Bitboard::RANK_1.0 << (8 * *self as u8))
    }
}

impl File {
    /// The bitboard holding every square on this file.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(Bitboard::FILE_A.0 << *self as u8)
    }
}

impl<const N: usize> From<[Square; N]> for Bitboard {
    fn from(squares: [Square; N]) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for square in squares {
            bb.set(square);
        }
        bb
    }
}

/******************************************\
|==========================================|
|         Bitboard Implementation          |
|==========================================|
\******************************************/

impl Bitboard {
    /// The square of the least significant set bit, or `None` when empty.
    #[inline]
    pub const fn lsb(&self) -> Option<Square> {
        match self.0 {
            0 => None,
            bits => unsafe { Some(Square::from_unchecked(bits.trailing_zeros() as u8)) },
        }
    }

    /// The square of the least significant set bit.
    ///
    /// ## Safety
    /// Assumes the bitboard is not empty; debug builds assert it.
    pub const fn lsb_unchecked(&self) -> Square {
        debug_assert!(self.0 != 0, "Bitboard is empty");
        unsafe { Square::from_unchecked(self.0.trailing_zeros() as u8) }
    }

    /// Clears and returns the least significant set bit, or `None` when empty.
    #[inline]
    pub const fn pop_lsb(&mut self) -> Option<Square> {
        match self.0 {
            0 => None,
            _ => {
                let lsb_square = self.lsb_unchecked();
                self.0 &= self.0 - 1;
                Some(lsb_square)
            }
        }
    }

    /// Clears and returns the least significant set bit.
    ///
    /// ## Safety
    /// Assumes the bitboard is not empty; debug builds assert it.
    #[inline]
    pub const fn pop_lsb_unchecked(&mut self) -> Square {
        debug_assert!(self.0 != 0, "Bitboard is empty");
        let lsb_square = self.lsb_unchecked();
        self.0 &= self.0 - 1;
        lsb_square
    }

    /// The number of set bits.
    #[inline]
    pub const fn count_bits(&self) -> u32 {
        self.0.count_ones()
    }

    /// Whether no bits are set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether at least one bit is set.
    #[inline]
    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    /// Whether the bit for `square` is set.
    #[inline]
    pub const fn contains(&self, square: Square) -> bool {
        (self.0 & (1u64 << (square as u8 as u64))) != 0
    }

    /// Sets the bit for `square`.
    #[inline]
    pub const fn set(&mut self, square: Square) {
        self.0 |= 1u64 << (square as u8 as u64);
    }

    /// Clears the bit for `square`.
    #[inline]
    pub const fn clear(&mut self, square: Square) {
        self.0 &= !(1u64 << (square as u8 as u64));
    }

    /// Toggles the bit for `square`.
    #[inline]
    pub const fn toggle(&mut self, square: Square) {
        self.0 ^= 1u64 << (square as u8 as u64);
    }

    /// Calls `f` with each set square, in LSB-first order.
    #[inline]
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(Square),
    {
        let mut bb = *self;
        while bb.0 != 0 {
            f(bb.pop_lsb_unchecked());
        }
    }

    /// Rotates left for positive shifts, right for negative shifts.
    #[inline]
    const fn rotate_left(&self, shift: i16) -> Bitboard {
        let bb = if shift >= 0 {
            self.0.rotate_left(shift as u32)
        } else {
            self.0.rotate_right(-shift as u32)
        };
        Bitboard(bb)
    }

    /// Shifts every set bit one step in `dir`; bits leaving the board are dropped.
    #[inline]
    pub(crate) const fn shift(&self, dir: Direction) -> Bitboard {
        let bb = *self;

        Bitboard(bb.0 & Self::avoid_wrap(dir).0).rotate_left(dir as i16)
    }

    /// The mask of squares from which a step in `dir` stays on the board.
    const fn avoid_wrap(dir: Direction) -> Bitboard {
        use Direction::*;
        let bb = match dir {
            SSE => Self::RANK_12.0 | Self::FILE_H.0,
            SEE => Self::RANK_1.0 | Self::FILE_GH.0,
            SWW => Self::RANK_1.0 | Self::FILE_AB.0,
            SSW => Self::RANK_12.0 | Self::FILE_A.0,
            NNW => Self::RANK_78.0 | Self::FILE_A.0,
            NNE => Self::RANK_78.0 | Self::FILE_H.0,
            NWW => Self::RANK_8.0 | Self::FILE_AB.0,
            NEE => Self::RANK_8.0 | Self::FILE_GH.0,

            N => Self::RANK_8.0,
            S => Self::RANK_1.0,
            E => Self::FILE_H.0,
            W => Self::FILE_A.0,

            NE => Self::RANK_8.0 | Self::FILE_H.0,
            NW => Self::RANK_8.0 | Self::FILE_A.0,
            SE => Self::RANK_1.0 | Self::FILE_H.0,
            SW => Self::RANK_1.0 | Self::FILE_A.0,

            NN => Self::RANK_78.0,
            SS => Self::RANK_12.0,
        };
        Bitboard(!bb)
    }

    /// Fills from the seed squares through `empty` squares in `dir`.
    /// Uses the [Kogge-Stone Algorithm](https://www.chessprogramming.org/Kogge-Stone_Algorithm)
    const fn occluded_fill(self, mut empty: Bitboard, dir: Direction) -> Bitboard {
        let shift = dir as i16;
        empty.0 &= Self::avoid_wrap(dir).0;
        let mut bb = Bitboard(self.0 & Self::avoid_wrap(dir).0);
        bb.0 |= empty.0 & bb.rotate_left(shift).0;
        empty.0 &= empty.rotate_left(shift).0;
        bb.0 |= empty.0 & bb.rotate_left(2 * shift).0;
        empty.0 &= empty.rotate_left(2 * shift).0;
        bb.0 |= empty.0 & bb.rotate_left(4 * shift).0;
        bb
    }

    /// Ray attacks from squares in `bb` toward `dir`, blocked by `occ`.
    const fn sliding_attack(bb: Bitboard, occ: Bitboard, dir: Direction) -> Bitboard {
        bb.occluded_fill(Bitboard(!occ.0), dir).shift(dir)
    }

    /// Bishop or rook attacks from squares in `bb`, blocked by `occ`.
    pub(crate) const fn slider_attacks(pt: PieceType, bb: Bitboard, occ: Bitboard) -> Bitboard {
        let bb = match pt {
            PieceType::Bishop => {
                Bitboard::sliding_attack(bb, occ, Direction::NE).0
                    | Bitboard::sliding_attack(bb, occ, Direction::NW).0
                    | Bitboard::sliding_attack(bb, occ, Direction::SE).0
                    | Bitboard::sliding_attack(bb, occ, Direction::SW).0
            }
            PieceType::Rook => {
                Bitboard::sliding_attack(bb, occ, Direction::N).0
                    | Bitboard::sliding_attack(bb, occ, Direction::S).0
                    | Bitboard::sliding_attack(bb, occ, Direction::E).0
                    | Bitboard::sliding_attack(bb, occ, Direction::W).0
            }
            _ => unreachable!(),
        };
        Bitboard(bb)
    }

    /// The starting rank of pawns of `col` (2nd for White, 7th for Black).
    #[inline]
    pub const fn push_rank(col: Colour) -> Bitboard {
        match col {
            Colour::White => Rank::Rank2.bb(),
            Colour::Black => Rank::Rank7.bb(),
        }
    }

    /// The rank from which pawns of `col` promote on their next push.
    #[inline]
    pub const fn promo_rank(col: Colour) -> Bitboard {
        match col {
            Colour::White => Rank::Rank7.bb(),
            Colour::Black => Rank::Rank2.bb(),
        }
    }

}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SEPARATOR: &str = "\n     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", SEPARATOR)?;

        for rank in Rank::iter().rev() {
            write!(f, " {}   |", rank as u8 + 1)?;

            for file in File::iter() {
                let square = Square::from_parts(file, rank);
                let cell = if self.contains(square) { " 1 " } else { "   " };
                write!(f, "{}|", cell)?;
            }

            writeln!(f, "{}", SEPARATOR)?;
        }

        writeln!(f)?;
        writeln!(f, "       A   B   C   D   E   F   G   H")?;
        writeln!(f)?;
        writeln!(f, "Bitboard: {:#x}", self.0)
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
    fn test_lsb_and_pop() {
        let a1 = Square::A1.bb();
        assert_eq!(a1.lsb(), Some(Square::A1));
        assert_eq!(Square::H8.bb().lsb(), Some(Square::H8));
        assert_eq!(Bitboard::EMPTY.lsb(), None);

        let mut bb = Square::E4.bb() | Square::A1.bb();
        assert_eq!(bb.pop_lsb(), Some(Square::A1));
        assert_eq!(bb.pop_lsb(), Some(Square::E4));
        assert_eq!(bb.pop_lsb(), None);
    }

    #[test]
    fn test_count_bits() {
        assert_eq!(Bitboard::EMPTY.count_bits(), 0);
        assert_eq!(Square::E4.bb().count_bits(), 1);
        assert_eq!(
            (Square::E4.bb() | Square::D5.bb() | Square::A1.bb()).count_bits(),
            3
        );
        assert_eq!(Bitboard::FULL.count_bits(), 64);
    }

    #[test]
    fn test_set_clear_toggle() {
        let mut bb = Bitboard::EMPTY;
        bb.set(Square::E4);
        assert!(bb.contains(Square::E4));
        assert!(!bb.contains(Square::A1));

        bb.clear(Square::E4);
        assert!(!bb.contains(Square::E4));

        bb.toggle(Square::D5);
        assert!(bb.contains(Square::D5));
        bb.toggle(Square::D5);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_for_each() {
        let bb = Square::E4.bb() | Square::D5.bb();

        let mut squares = Vec::new();
        bb.for_each(|sq| squares.push(sq));

        assert_eq!(squares, vec![Square::E4, Square::D5]);
    }

    #[test]
    fn test_shift_basic_directions() {
        let bb = Square::E5.bb();

        assert_eq!(bb.shift(Direction::N), Square::E6.bb());
        assert_eq!(bb.shift(Direction::S), Square::E4.bb());
        assert_eq!(bb.shift(Direction::E), Square::F5.bb());
        assert_eq!(bb.shift(Direction::W), Square::D5.bb());

        assert_eq!(bb.shift(Direction::NE), Square::F6.bb());
        assert_eq!(bb.shift(Direction::NW), Square::D6.bb());
        assert_eq!(bb.shift(Direction::SE), Square::F4.bb());
        assert_eq!(bb.shift(Direction::SW), Square::D4.bb());

        assert_eq!(bb.shift(Direction::NN), Square::E7.bb());
        assert_eq!(bb.shift(Direction::SS), Square::E3.bb());

        assert_eq!(bb.shift(Direction::NNE), Square::F7.bb());
        assert_eq!(bb.shift(Direction::NWW), Square::C6.bb());
        assert_eq!(bb.shift(Direction::SSW), Square::D3.bb());
    }

    #[test]
    fn test_shift_edges_drop_bits() {
        let h5 = Square::H5.bb();
        assert_eq!(h5.shift(Direction::E), Bitboard::EMPTY);
        assert_eq!(h5.shift(Direction::NE), Bitboard::EMPTY);
        assert_eq!(h5.shift(Direction::SE), Bitboard::EMPTY);
        assert_eq!(h5.shift(Direction::W), Square::G5.bb());

        let a5 = Square::A5.bb();
        assert_eq!(a5.shift(Direction::W), Bitboard::EMPTY);
        assert_eq!(a5.shift(Direction::NW), Bitboard::EMPTY);
        assert_eq!(a5.shift(Direction::SW), Bitboard::EMPTY);

        let e8 = Square::E8.bb();
        assert_eq!(e8.shift(Direction::N), Bitboard::EMPTY);
        assert_eq!(e8.shift(Direction::S), Square::E7.bb());

        let g5 = Square::G5.bb();
        assert_eq!(g5.shift(Direction::NEE), Bitboard::EMPTY);
        assert_eq!(g5.shift(Direction::SEE), Bitboard::EMPTY);
    }

    #[test]
    fn test_slider_attacks_open_board() {
        let rook = Bitboard::slider_attacks(PieceType::Rook, Square::A1.bb(), Bitboard::EMPTY);
        assert_eq!(rook, (Bitboard::FILE_A | Bitboard::RANK_1) ^ Square::A1.bb());

        let bishop = Bitboard::slider_attacks(PieceType::Bishop, Square::C1.bb(), Bitboard::EMPTY);
        assert!(bishop.contains(Square::A3));
        assert!(bishop.contains(Square::H6));
        assert!(!bishop.contains(Square::C2));
    }

    #[test]
    fn test_slider_attacks_blocked() {
        let occ = Square::E4.bb() | Square::B1.bb();
        let rook = Bitboard::slider_attacks(PieceType::Rook, Square::E1.bb(), occ);

        assert!(rook.contains(Square::E2));
        assert!(rook.contains(Square::E4));
        assert!(!rook.contains(Square::E5));
        assert!(rook.contains(Square::B1));
        assert!(!rook.contains(Square::A1));
        assert!(rook.contains(Square::H1));
    }

    #[test]
    fn test_pawn_ranks() {
        assert_eq!(Bitboard::push_rank(Colour::White), Rank::Rank2.bb());
        assert_eq!(Bitboard::push_rank(Colour::Black), Rank::Rank7.bb());
        assert_eq!(Bitboard::promo_rank(Colour::White), Rank::Rank7.bb());
        assert_eq!(Bitboard::promo_rank(Colour::Black), Rank::Rank2.bb());
    }
}
