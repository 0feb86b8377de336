//! 駒の利き（Movement Rule Table）
//!
//! 駒種と成りごとに、1 歩で進む方向（steps）と走る方向（slides）を表で持つ。
//! 方向は先手から見た (筋の増分, 段の増分) で、先手の前方は段 -1。
//! 後手は両成分の符号を反転して使う。

use crate::board::Board;
use crate::types::{Piece, PieceKind, Side, Square, SquareSet};

/// 1 つの駒の動き
#[derive(Debug, Clone, Copy)]
pub struct Movement {
    pub steps: &'static [(i8, i8)],
    pub slides: &'static [(i8, i8)],
}

const NONE: &[(i8, i8)] = &[];

const PAWN_STEPS: &[(i8, i8)] = &[(0, -1)];
const KNIGHT_STEPS: &[(i8, i8)] = &[(1, -2), (-1, -2)];
const SILVER_STEPS: &[(i8, i8)] = &[(1, -1), (0, -1), (-1, -1), (1, 1), (-1, 1)];
const GOLD_STEPS: &[(i8, i8)] = &[(1, -1), (0, -1), (-1, -1), (1, 0), (-1, 0), (0, 1)];
const KING_STEPS: &[(i8, i8)] = &[
    (1, -1),
    (0, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];
const ORTHOGONAL: &[(i8, i8)] = &[(0, -1), (1, 0), (-1, 0), (0, 1)];
const DIAGONAL: &[(i8, i8)] = &[(1, -1), (-1, -1), (1, 1), (-1, 1)];
const FORWARD: &[(i8, i8)] = &[(0, -1)];

const fn movement(steps: &'static [(i8, i8)], slides: &'static [(i8, i8)]) -> Movement {
    Movement { steps, slides }
}

/// `MOVEMENT[kind][promoted as usize]`
///
/// 金・玉の成り側は生駒と同じ内容にしておく（成ることはない）。
pub const MOVEMENT: [[Movement; 2]; PieceKind::NUM] = [
    // Pawn / と
    [movement(PAWN_STEPS, NONE), movement(GOLD_STEPS, NONE)],
    // Lance / 成香
    [movement(NONE, FORWARD), movement(GOLD_STEPS, NONE)],
    // Knight / 成桂
    [movement(KNIGHT_STEPS, NONE), movement(GOLD_STEPS, NONE)],
    // Silver / 成銀
    [movement(SILVER_STEPS, NONE), movement(GOLD_STEPS, NONE)],
    // Gold
    [movement(GOLD_STEPS, NONE), movement(GOLD_STEPS, NONE)],
    // Bishop / 馬
    [movement(NONE, DIAGONAL), movement(ORTHOGONAL, DIAGONAL)],
    // Rook / 龍
    [movement(NONE, ORTHOGONAL), movement(DIAGONAL, ORTHOGONAL)],
    // King
    [movement(KING_STEPS, NONE), movement(KING_STEPS, NONE)],
];

/// 駒の動き表を引く
#[inline]
pub fn movement_of(piece: Piece) -> Movement {
    MOVEMENT[piece.kind.index()][piece.promoted as usize]
}

#[inline]
fn orient(side: Side, (df, dr): (i8, i8)) -> (i8, i8) {
    match side {
        Side::Sente => (df, dr),
        Side::Gote => (-df, -dr),
    }
}

/// `origin` にある `piece` が動ける升
///
/// 盤上の `origin` の内容は見ない（`piece` が置かれているものとして扱う）。
/// 走り駒は最初に駒がある升で止まり、その駒が相手の駒なら取れる升として含める。
/// 自駒のある升は含めない。王手放置などの合法性は見ない。
pub fn legal_destinations(board: &Board, origin: Square, piece: Piece) -> SquareSet {
    let movement = movement_of(piece);
    let mut targets = SquareSet::EMPTY;
    let open = |sq: Square| board.get(sq).is_none_or(|p| p.side != piece.side);

    for &dir in movement.steps {
        let (df, dr) = orient(piece.side, dir);
        if let Some(to) = origin.offset(df, dr) {
            if open(to) {
                targets.insert(to);
            }
        }
    }

    for &dir in movement.slides {
        let (df, dr) = orient(piece.side, dir);
        let mut cursor = origin;
        while let Some(to) = cursor.offset(df, dr) {
            match board.get(to) {
                None => targets.insert(to),
                Some(blocker) => {
                    if blocker.side != piece.side {
                        targets.insert(to);
                    }
                    break;
                }
            }
            cursor = to;
        }
    }

    targets
}

/// 盤上の駒の利き（`origin` が空なら空集合）
pub fn destinations_from(board: &Board, origin: Square) -> SquareSet {
    match board.get(origin) {
        Some(piece) => legal_destinations(board, origin, piece),
        None => SquareSet::EMPTY,
    }
}
