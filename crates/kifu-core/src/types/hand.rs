//! 持ち駒（Hands）

use super::{PieceKind, Side};
use crate::error::MoveError;

/// 1 種あたりの持ち駒の上限（Pawn..Rook の順）
pub const MAX_HAND_PIECES: [u8; 7] = [18, 4, 4, 4, 4, 2, 2];

/// 両者の持ち駒
///
/// 持ち駒は常に生駒。取った駒は `add` の時点で成りが外れている。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hands {
    counts: [[u8; 7]; 2],
}

impl Hands {
    pub const fn new() -> Self {
        Hands {
            counts: [[0; 7]; 2],
        }
    }

    /// 持ち駒の枚数（King は常に 0）
    #[inline]
    pub fn count(&self, side: Side, kind: PieceKind) -> u8 {
        match kind.hand_index() {
            Some(idx) => self.counts[side.index()][idx],
            None => 0,
        }
    }

    /// 持ち駒を 1 枚加える
    ///
    /// King は持ち駒にならないので無視する（不正な棋譜でのみ起こる）。
    pub fn add(&mut self, side: Side, kind: PieceKind) {
        match kind.hand_index() {
            Some(idx) => {
                let slot = &mut self.counts[side.index()][idx];
                *slot = slot.saturating_add(1);
            }
            None => log::warn!("ignoring captured king for {side:?}"),
        }
    }

    /// 持ち駒を `n` 枚に設定する（SFEN 読み込み用）
    pub fn set(&mut self, side: Side, kind: PieceKind, n: u8) {
        if let Some(idx) = kind.hand_index() {
            self.counts[side.index()][idx] = n;
        }
    }

    /// 持ち駒を 1 枚取り出す
    pub fn take(&mut self, side: Side, kind: PieceKind) -> Result<(), MoveError> {
        let idx = kind.hand_index().ok_or(MoveError::EmptyHand { side, kind })?;
        let slot = &mut self.counts[side.index()][idx];
        if *slot == 0 {
            return Err(MoveError::EmptyHand { side, kind });
        }
        *slot -= 1;
        Ok(())
    }

    /// 指定側の持ち駒が空か
    pub fn is_empty_for(&self, side: Side) -> bool {
        self.counts[side.index()].iter().all(|&n| n == 0)
    }

    /// 両者とも持ち駒なし
    pub fn is_empty(&self) -> bool {
        Side::ALL.iter().all(|&side| self.is_empty_for(side))
    }

    /// (駒種, 枚数) を SFEN の並び順（飛角金銀桂香歩）で返す。0 枚は省く
    pub fn iter(&self, side: Side) -> impl Iterator<Item = (PieceKind, u8)> + '_ {
        PieceKind::HAND_ORDER
            .iter()
            .map(move |&kind| (kind, self.count(side, kind)))
            .filter(|&(_, n)| n > 0)
    }
}
