//! 移動元の推定（Disambiguation Resolver）
//!
//! 優先順: 明示された移動元 > 修飾語（右・左・直・上・引・寄） > 移動先と同じ筋 > 最も近い駒。
//! 距離はユークリッド距離の 2 乗で比べ、それでも並ぶ場合は推測しない。

use kifu_core::movement::legal_destinations;
use kifu_core::types::{Side, Square};
use kifu_core::{Board, Piece};
use smallvec::SmallVec;

use crate::error::ResolveError;
use crate::intent::{DirectionHint, IntendedMove, Lateral, Vertical};

/// 候補はほとんどの場合 1〜2 個
type Candidates = SmallVec<[Square; 4]>;

/// 盤上の駒の手（`intent.is_drop == false`）の移動元を決める
pub fn resolve_origin(board: &Board, intent: &IntendedMove) -> Result<Square, ResolveError> {
    let destination = intent.destination;

    if let Some(origin) = intent.origin {
        // 動けるかどうかは指し手の適用時に見る
        let found = board.get(origin);
        if !found.is_some_and(|piece| intent.matches_origin_piece(piece)) {
            return Err(ResolveError::OriginMismatch {
                origin,
                expected: named_piece(intent),
                found,
            });
        }
        return Ok(origin);
    }

    let candidates = candidates(board, intent);
    match candidates.len() {
        0 => Err(ResolveError::NoLegalOrigin {
            side: intent.side,
            kind: intent.kind,
            destination,
        }),
        1 => Ok(candidates[0]),
        _ => {
            log::debug!(
                "{:?} {:?} to {destination}: candidates {:?}",
                intent.side,
                intent.kind,
                candidates.as_slice()
            );
            match intent.hint.filter(|h| !h.is_empty()) {
                Some(hint) => select_by_hint(&candidates, intent.side, destination, hint),
                None => break_tie(&candidates, destination),
            }
        }
    }
}

fn named_piece(intent: &IntendedMove) -> Piece {
    Piece::with_state(intent.kind, intent.side, intent.promoted)
        .unwrap_or(Piece::new(intent.kind, intent.side))
}

/// 記法の駒と同じ駒で、移動先に動けるもの（升の順）
pub fn candidates(board: &Board, intent: &IntendedMove) -> Candidates {
    board
        .iter()
        .filter(|&(_, piece)| intent.matches_origin_piece(piece))
        .filter(|&(sq, piece)| legal_destinations(board, sq, piece).contains(intent.destination))
        .map(|(sq, _)| sq)
        .collect()
}

/// 修飾語で 1 つに絞る
///
/// 上下の修飾で絞ってから左右の修飾で絞る。左右は手番側から見る（先手の右は 1 筋側）。
fn select_by_hint(
    candidates: &Candidates,
    side: Side,
    destination: Square,
    hint: DirectionHint,
) -> Result<Square, ResolveError> {
    let rel = |sq: Square| side.relative_rank(sq.rank());
    let dest_rank = rel(destination);

    let mut survivors: Candidates = candidates.clone();
    if let Some(vertical) = hint.vertical {
        survivors.retain(|sq| match vertical {
            // 前に進む: 移動元が移動先より後ろ
            Vertical::Up => rel(*sq) > dest_rank,
            Vertical::Back => rel(*sq) < dest_rank,
            Vertical::Sideways => rel(*sq) == dest_rank,
        });
    }

    match hint.lateral {
        Some(Lateral::Straight) => {
            survivors.retain(|sq| sq.file() == destination.file() && rel(*sq) > dest_rank);
        }
        Some(lateral) => {
            // 先手の右は筋の小さい側、後手は逆
            let rightmost = matches!(
                (lateral, side),
                (Lateral::Right, Side::Sente) | (Lateral::Left, Side::Gote)
            );
            let extreme = if rightmost {
                survivors.iter().map(|sq| sq.file()).min()
            } else {
                survivors.iter().map(|sq| sq.file()).max()
            };
            if let Some(file) = extreme {
                survivors.retain(|sq| sq.file() == file);
            }
        }
        None => {}
    }

    if survivors.len() == 1 {
        log::debug!("hint {hint:?} selected {}", survivors[0]);
        Ok(survivors[0])
    } else {
        Err(ResolveError::AmbiguousHintMismatch {
            destination,
            hint,
            candidates: candidates.to_vec(),
        })
    }
}

/// 修飾語がないときの選択: 同じ筋の駒、次に最も近い駒
fn break_tie(candidates: &Candidates, destination: Square) -> Result<Square, ResolveError> {
    let same_file: Candidates = candidates
        .iter()
        .copied()
        .filter(|sq| sq.file() == destination.file())
        .collect();
    let pool = if same_file.is_empty() {
        candidates.clone()
    } else {
        same_file
    };
    if pool.len() == 1 {
        log::debug!("same file as {destination}: {}", pool[0]);
        return Ok(pool[0]);
    }

    let nearest = pool.iter().map(|sq| sq.distance_sq(destination)).min();
    let closest: Candidates = pool
        .iter()
        .copied()
        .filter(|sq| Some(sq.distance_sq(destination)) == nearest)
        .collect();
    if closest.len() == 1 {
        log::debug!("nearest to {destination}: {}", closest[0]);
        Ok(closest[0])
    } else {
        Err(ResolveError::UnresolvedAmbiguity {
            destination,
            candidates: closest.to_vec(),
        })
    }
}
