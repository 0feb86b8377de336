//! 盤面（Board）

use crate::types::{Piece, PieceKind, Side, Square, SquareSet};

/// 9x9 の盤面
///
/// 論理的には値型。`place` / `remove` は新しい盤面を返し、
/// `put` / `take` は呼び出し側が所有するバッファを書き換える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; Square::NUM],
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

/// 1 段目（後手）/ 9 段目（先手）の並び（筋 1..9 の順）
const BACK_RANK: [PieceKind; 9] = [
    PieceKind::Lance,
    PieceKind::Knight,
    PieceKind::Silver,
    PieceKind::Gold,
    PieceKind::King,
    PieceKind::Gold,
    PieceKind::Silver,
    PieceKind::Knight,
    PieceKind::Lance,
];

impl Board {
    pub const fn empty() -> Self {
        Board {
            cells: [None; Square::NUM],
        }
    }

    /// 平手の初期配置
    pub fn initial() -> Self {
        let mut board = Board::empty();
        for (file, kind) in (1..=9).zip(BACK_RANK) {
            board.put_at(file, 1, Piece::new(kind, Side::Gote));
            board.put_at(file, 9, Piece::new(kind, Side::Sente));
            board.put_at(file, 3, Piece::new(PieceKind::Pawn, Side::Gote));
            board.put_at(file, 7, Piece::new(PieceKind::Pawn, Side::Sente));
        }
        // 後手: 8二飛 2二角 / 先手: 8八角 2八飛
        board.put_at(8, 2, Piece::new(PieceKind::Rook, Side::Gote));
        board.put_at(2, 2, Piece::new(PieceKind::Bishop, Side::Gote));
        board.put_at(8, 8, Piece::new(PieceKind::Bishop, Side::Sente));
        board.put_at(2, 8, Piece::new(PieceKind::Rook, Side::Sente));
        board
    }

    fn put_at(&mut self, file: u8, rank: u8, piece: Piece) {
        if let Some(sq) = Square::new(file, rank) {
            self.put(sq, piece);
        }
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    /// 駒を置いた盤面を返す
    #[must_use]
    pub fn place(&self, sq: Square, piece: Piece) -> Board {
        let mut next = *self;
        next.put(sq, piece);
        next
    }

    /// 駒を取り除いた盤面と、取り除いた駒を返す
    #[must_use]
    pub fn remove(&self, sq: Square) -> (Board, Option<Piece>) {
        let mut next = *self;
        let removed = next.take(sq);
        (next, removed)
    }

    /// その場で駒を置く（既存の駒は上書き）
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.cells[sq.index()] = Some(piece);
    }

    /// その場で駒を取り除く
    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()].take()
    }

    /// 駒のある升
    pub fn occupied(&self) -> SquareSet {
        Square::all().filter(|&sq| self.get(sq).is_some()).collect()
    }

    /// 指定側の駒がある升
    pub fn occupied_by(&self, side: Side) -> SquareSet {
        Square::all()
            .filter(|&sq| self.get(sq).is_some_and(|p| p.side == side))
            .collect()
    }

    /// 指定した駒種・手番・成りの駒がある升
    pub fn pieces(&self, side: Side, kind: PieceKind, promoted: bool) -> SquareSet {
        let Some(target) = Piece::with_state(kind, side, promoted) else {
            return SquareSet::EMPTY;
        };
        Square::all().filter(|&sq| self.get(sq) == Some(target)).collect()
    }

    /// 玉の位置
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces(side, PieceKind::King, false).iter().next()
    }

    /// 内容が異なる升
    pub fn diff(&self, other: &Board) -> Vec<Square> {
        Square::all().filter(|&sq| self.get(sq) != other.get(sq)).collect()
    }

    /// (升, 駒) を升の順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }
}
