//! Set of squares backed by an 81-bit mask

use super::Square;

/// Set of squares (lower 81 bits of a `u128`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(u128);

impl SquareSet {
    /// Empty set
    pub const EMPTY: Self = SquareSet(0);

    /// All squares set
    pub const ALL: Self = SquareSet((1u128 << 81) - 1);

    /// Create set with a single square
    #[inline]
    pub fn from_square(sq: Square) -> Self {
        SquareSet(1u128 << sq.index())
    }

    /// Set bit at square
    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0 |= 1u128 << sq.index();
    }

    /// Clear bit at square
    #[inline]
    pub fn remove(&mut self, sq: Square) {
        self.0 &= !(1u128 << sq.index());
    }

    /// Test bit at square
    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        (self.0 >> sq.index()) & 1 != 0
    }

    /// Pop least significant square
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let lsb = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Square::from_index(lsb)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate squares in index order (1一, 1二, ..., 9九)
    pub fn iter(&self) -> SquareSetIter {
        SquareSetIter(*self)
    }
}

pub struct SquareSetIter(SquareSet);

impl Iterator for SquareSetIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = SquareSetIter;

    fn into_iter(self) -> SquareSetIter {
        SquareSetIter(self)
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::EMPTY;
        for sq in iter {
            set.insert(sq);
        }
        set
    }
}

impl std::ops::BitOr for SquareSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for SquareSet {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & rhs.0)
    }
}

impl std::ops::Not for SquareSet {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        SquareSet(!self.0 & Self::ALL.0)
    }
}

impl std::ops::BitOrAssign for SquareSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
