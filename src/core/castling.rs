use super::piece::Colour;

/******************************************\
|==========================================|
|                 Castling                 |
|==========================================|
\******************************************/

/// # Castling rights representation
///
/// One bit per right, in `KQkq` order from the low end.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Castling(pub u8);

crate::impl_bit_ops!(Castling);

impl Default for Castling {
    fn default() -> Self {
        Castling::NONE
    }
}

impl Castling {
    /// Number of possible rights combinations
    pub const NUM: usize = 16;
    // Atomic rights
    pub const WK: Castling = Castling(1);
    pub const WQ: Castling = Castling(2);
    pub const BK: Castling = Castling(4);
    pub const BQ: Castling = Castling(8);
    // Per-colour rights
    pub const WHITE_CASTLING: Castling = Castling(3);
    pub const BLACK_CASTLING: Castling = Castling(12);
    // All or nothing
    pub const ALL: Castling = Castling(15);
    pub const NONE: Castling = Castling(0);

    /// Checks whether any of the given rights are present
    pub fn has(self, right: Castling) -> bool {
        self & right != Castling::NONE
    }

    /// Adds the given rights
    pub fn set(&mut self, right: Castling) {
        *self |= right;
    }

    /// Removes the given rights
    pub fn remove(&mut self, right: Castling) {
        *self &= !right;
    }

    /// Keeps only the rights present in `mask`
    #[inline]
    pub fn mask(&mut self, mask: Castling) {
        self.0 &= mask.0;
    }

    /// The king side right for a colour
    #[inline]
    pub fn king_side(colour: Colour) -> Self {
        match colour {
            Colour::White => Castling::WK,
            Colour::Black => Castling::BK,
        }
    }

    /// The queen side right for a colour
    #[inline]
    pub fn queen_side(colour: Colour) -> Self {
        match colour {
            Colour::White => Castling::WQ,
            Colour::Black => Castling::BQ,
        }
    }
}

impl std::ops::Not for Castling {
    type Output = Self;

    /// Inverts the rights within the low 4 bits
    #[inline]
    fn not(self) -> Self::Output {
        Castling(!self.0 & 0x0F)
    }
}

impl std::fmt::Display for Castling {
    /// Displays the rights in FEN form: `KQkq` subsets, or `-` for none
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        if self.has(Castling::WK) {
            write!(f, "K")?;
        }
        if self.has(Castling::WQ) {
            write!(f, "Q")?;
        }
        if self.has(Castling::BK) {
            write!(f, "k")?;
        }
        if self.has(Castling::BQ) {
            write!(f, "q")?;
        }

        Ok(())
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
