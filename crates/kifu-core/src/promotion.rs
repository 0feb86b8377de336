//! 成りの規則（Promotion Policy）
//!
//! 段は手番側から見た相対段（敵陣の最奥が 1）で扱う。
//! 行き所のない駒の段（`forced_depth`）は駒打ちの制限と共通。

use serde::{Deserialize, Serialize};

use crate::types::{PieceKind, Side};

/// 敵陣の深さ
pub const PROMOTION_ZONE_DEPTH: u8 = 3;

/// 成りの可否
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionState {
    /// 成れない
    Forbidden,
    /// 成っても成らなくてもよい
    Optional,
    /// 成らなければならない（行き所のない駒）
    Mandatory,
}

/// 駒種ごとの成り規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRule {
    pub promotable: bool,
    /// 相対段がこの値以下の升には生駒のまま居られない（0 なら制限なし）
    pub forced_depth: u8,
}

const fn rule(promotable: bool, forced_depth: u8) -> PromotionRule {
    PromotionRule {
        promotable,
        forced_depth,
    }
}

/// `PieceKind` の並び順に対応
pub const PROMOTION_RULES: [PromotionRule; PieceKind::NUM] = [
    rule(true, 1),  // Pawn
    rule(true, 1),  // Lance
    rule(true, 2),  // Knight
    rule(true, 0),  // Silver
    rule(false, 0), // Gold
    rule(true, 0),  // Bishop
    rule(true, 0),  // Rook
    rule(false, 0), // King
];

#[inline]
pub const fn rule_of(kind: PieceKind) -> PromotionRule {
    PROMOTION_RULES[kind.index()]
}

/// 相対段が敵陣か
#[inline]
pub const fn in_zone(side: Side, rank: u8) -> bool {
    side.relative_rank(rank) <= PROMOTION_ZONE_DEPTH
}

/// 生駒が `rank` に居られないか（成り強制・駒打ち禁止の段）
#[inline]
pub const fn is_dead_rank(kind: PieceKind, side: Side, rank: u8) -> bool {
    side.relative_rank(rank) <= rule_of(kind).forced_depth
}

/// 生駒が `from_rank` から `to_rank` へ動くときの成りの可否
///
/// 成駒に対して呼んではならない（呼び出し側で `Forbidden` として扱う）。
pub const fn promotion_state(
    kind: PieceKind,
    side: Side,
    from_rank: u8,
    to_rank: u8,
) -> PromotionState {
    if !rule_of(kind).promotable {
        return PromotionState::Forbidden;
    }
    if !in_zone(side, from_rank) && !in_zone(side, to_rank) {
        return PromotionState::Forbidden;
    }
    if is_dead_rank(kind, side, to_rank) {
        PromotionState::Mandatory
    } else {
        PromotionState::Optional
    }
}

impl PromotionState {
    /// 指し手の成り指定を規則と突き合わせる
    ///
    /// `requested` が None（指定なし）なら、`Mandatory` は成り、それ以外は不成。
    /// 矛盾する指定は `Err(self)` を返す。
    pub fn reconcile(self, requested: Option<bool>) -> Result<bool, PromotionState> {
        match (self, requested) {
            (PromotionState::Forbidden, Some(true)) => Err(self),
            (PromotionState::Mandatory, Some(false)) => Err(self),
            (PromotionState::Mandatory, None) => Ok(true),
            (_, Some(flag)) => Ok(flag),
            (_, None) => Ok(false),
        }
    }
}
