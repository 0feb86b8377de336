//! 駒打ちの規則（Drop Legality）

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::promotion::is_dead_rank;
use crate::types::{PieceKind, Side, Square, SquareSet};

/// 駒打ちできない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropViolation {
    /// 打つ升に駒がある
    Occupied,
    /// 行き所のない段（歩・香は 1 段目、桂は 2 段目まで）
    DeadRank,
    /// 二歩
    DoublePawn,
    /// 玉は打てない
    NotInHand,
}

/// `side` が `kind` を `to` に打つときの違反（なければ None）
///
/// 持ち駒の枚数は見ない。打ち歩詰めは判定しない。
pub fn drop_violation(board: &Board, side: Side, kind: PieceKind, to: Square) -> Option<DropViolation> {
    if kind == PieceKind::King {
        return Some(DropViolation::NotInHand);
    }
    if board.get(to).is_some() {
        return Some(DropViolation::Occupied);
    }
    if is_dead_rank(kind, side, to.rank()) {
        return Some(DropViolation::DeadRank);
    }
    if kind == PieceKind::Pawn && has_pawn_on_file(board, side, to.file()) {
        return Some(DropViolation::DoublePawn);
    }
    None
}

/// 二歩以外の違反だけを見る
///
/// 棋譜の再生では二歩を許容するかどうかを呼び出し側が決める。
pub fn basic_drop_violation(
    board: &Board,
    side: Side,
    kind: PieceKind,
    to: Square,
) -> Option<DropViolation> {
    drop_violation(board, side, kind, to).filter(|v| *v != DropViolation::DoublePawn)
}

/// 同じ筋に自分の生の歩があるか
pub fn has_pawn_on_file(board: &Board, side: Side, file: u8) -> bool {
    (1..=9)
        .filter_map(|rank| Square::new(file, rank))
        .filter_map(|sq| board.get(sq))
        .any(|p| p.kind == PieceKind::Pawn && p.side == side && !p.promoted)
}

/// `kind` を打てる升の集合（二歩も除く）
pub fn drop_targets(board: &Board, side: Side, kind: PieceKind) -> SquareSet {
    Square::all()
        .filter(|&sq| drop_violation(board, side, kind, sq).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    fn sq(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    #[test]
    fn test_occupied() {
        let board = Board::initial();
        assert_eq!(
            drop_violation(&board, Side::Sente, PieceKind::Gold, sq("8h")),
            Some(DropViolation::Occupied)
        );
        assert_eq!(drop_violation(&board, Side::Sente, PieceKind::Gold, sq("5e")), None);
    }

    #[test]
    fn test_dead_ranks_per_side() {
        let board = Board::empty();
        let cases = [
            (Side::Sente, PieceKind::Pawn, "5a", true),
            (Side::Sente, PieceKind::Pawn, "5b", false),
            (Side::Sente, PieceKind::Lance, "1a", true),
            (Side::Sente, PieceKind::Knight, "1b", true),
            (Side::Sente, PieceKind::Knight, "1c", false),
            (Side::Gote, PieceKind::Pawn, "5i", true),
            (Side::Gote, PieceKind::Knight, "5h", true),
            (Side::Gote, PieceKind::Knight, "5g", false),
            (Side::Sente, PieceKind::Silver, "5a", false),
        ];
        for (side, kind, to, dead) in cases {
            let v = drop_violation(&board, side, kind, sq(to));
            assert_eq!(v == Some(DropViolation::DeadRank), dead, "{side:?} {kind:?} {to}");
        }
    }

    #[test]
    fn test_double_pawn() {
        let board = Board::empty().place(sq("5g"), Piece::new(PieceKind::Pawn, Side::Sente));
        assert_eq!(
            drop_violation(&board, Side::Sente, PieceKind::Pawn, sq("5e")),
            Some(DropViolation::DoublePawn)
        );
        assert_eq!(basic_drop_violation(&board, Side::Sente, PieceKind::Pawn, sq("5e")), None);
        // 相手の歩、と金は数えない
        assert_eq!(drop_violation(&board, Side::Gote, PieceKind::Pawn, sq("5e")), None);
        let board = Board::empty().place(sq("5c"), Piece::promoted(PieceKind::Pawn, Side::Sente));
        assert_eq!(drop_violation(&board, Side::Sente, PieceKind::Pawn, sq("5e")), None);
    }

    #[test]
    fn test_king_cannot_be_dropped() {
        assert_eq!(
            drop_violation(&Board::empty(), Side::Sente, PieceKind::King, sq("5e")),
            Some(DropViolation::NotInHand)
        );
    }

    #[test]
    fn test_drop_targets() {
        let board = Board::initial();
        // 金はすべての空き升に打てる
        assert_eq!(drop_targets(&board, Side::Sente, PieceKind::Gold).len(), 41);
        // 歩は全筋に歩があるので打てない
        assert!(drop_targets(&board, Side::Sente, PieceKind::Pawn).is_empty());
    }
}
