//! 局面の履歴（Timeline）

use crate::error::MoveError;
use crate::moves::CanonicalMove;
use crate::position::Position;

/// 手数で引ける局面の列
///
/// `positions[0]` が開始局面、`positions[i + 1]` が `moves[i]` を指した後の局面。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    positions: Vec<Position>,
    moves: Vec<CanonicalMove>,
}

impl Timeline {
    pub fn new(start: Position) -> Self {
        Timeline {
            positions: vec![start],
            moves: Vec::new(),
        }
    }

    /// 指し手を検証して末尾に追加する
    pub fn push(&mut self, mv: CanonicalMove) -> Result<&Position, MoveError> {
        let next = self.last().apply(&mv)?;
        Ok(self.push_unchecked(mv, next))
    }

    /// 検証済みの遷移を追加する
    pub fn push_unchecked(&mut self, mv: CanonicalMove, next: Position) -> &Position {
        self.moves.push(mv);
        self.positions.push(next);
        self.last()
    }

    /// 指し手の数
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn start(&self) -> &Position {
        &self.positions[0]
    }

    /// 最新の局面
    pub fn last(&self) -> &Position {
        // positions は常に開始局面を含む
        &self.positions[self.positions.len() - 1]
    }

    /// `ply` 手指した後の局面（0 は開始局面）
    pub fn position_at(&self, ply: usize) -> Option<&Position> {
        self.positions.get(ply)
    }

    /// `ply` 手目（0 始まり）の指し手と、その直前の局面
    pub fn step(&self, ply: usize) -> Option<(&Position, CanonicalMove)> {
        Some((self.positions.get(ply)?, *self.moves.get(ply)?))
    }

    pub fn moves(&self) -> &[CanonicalMove] {
        &self.moves
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// `ply` 手目までに巻き戻す
    pub fn truncate(&mut self, ply: usize) {
        self.moves.truncate(ply);
        self.positions.truncate(ply + 1);
    }

    pub fn into_moves(self) -> Vec<CanonicalMove> {
        self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn mv(s: &str) -> CanonicalMove {
        CanonicalMove::from_usi(s).unwrap()
    }

    #[test]
    fn test_positions_indexed_by_ply() {
        let mut timeline = Timeline::new(Position::startpos());
        assert!(timeline.is_empty());
        timeline.push(mv("7g7f")).unwrap();
        timeline.push(mv("3c3d")).unwrap();

        assert_eq!(timeline.len(), 2);
        assert!(timeline.position_at(0).unwrap().is_startpos());
        assert_eq!(timeline.position_at(1).unwrap().turn, Side::Gote);
        assert_eq!(timeline.position_at(2), Some(timeline.last()));
        assert_eq!(timeline.position_at(3), None);

        let (before, played) = timeline.step(1).unwrap();
        assert_eq!(played, mv("3c3d"));
        assert_eq!(before, timeline.position_at(1).unwrap());
    }

    #[test]
    fn test_rejected_move_leaves_timeline_unchanged() {
        let mut timeline = Timeline::new(Position::startpos());
        timeline.push(mv("7g7f")).unwrap();
        assert!(timeline.push(mv("7f7e")).is_err());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_truncate() {
        let mut timeline = Timeline::new(Position::startpos());
        for m in ["7g7f", "3c3d", "2g2f"] {
            timeline.push(mv(m)).unwrap();
        }
        timeline.truncate(1);
        assert_eq!(timeline.moves(), &[mv("7g7f")]);
        assert_eq!(timeline.positions().len(), 2);
    }
}
