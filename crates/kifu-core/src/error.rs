//! Error types for the rules core

use crate::drop::DropViolation;
use crate::moves::CanonicalMove;
use crate::promotion::PromotionState;
use crate::types::{PieceKind, Side, Square};

/// 指し手を局面に適用できなかった理由
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 移動元に駒がない
    #[error("no piece on {0}")]
    NoPiece(Square),

    /// 移動元の駒が手番側のものではない
    #[error("piece on {square} does not belong to {side:?}")]
    WrongOwner { square: Square, side: Side },

    /// 駒の動きとして到達できない
    #[error("{from} cannot reach {to}")]
    IllegalDestination { from: Square, to: Square },

    /// 自駒のある升への移動
    #[error("destination {0} holds an own piece")]
    IllegalCapture(Square),

    /// 成り指定が成り規則と矛盾する
    #[error("promote={requested} conflicts with {state:?} for {kind:?}")]
    IllegalPromotion {
        kind: PieceKind,
        state: PromotionState,
        requested: bool,
    },

    /// 持ち駒がない
    #[error("{side:?} has no {kind:?} in hand")]
    EmptyHand { side: Side, kind: PieceKind },

    /// 打てない升への駒打ち
    #[error("cannot drop {kind:?} on {square}: {violation:?}")]
    IllegalDrop {
        kind: PieceKind,
        square: Square,
        violation: DropViolation,
    },
}

/// SFEN の読み込みエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SfenError {
    #[error("SFEN needs board, side, hands and move number: {0}")]
    TooFewFields(String),

    #[error("invalid rank count: {0} (expected 9)")]
    InvalidRankCount(usize),

    #[error("rank {rank}: {reason}")]
    InvalidRank { rank: usize, reason: String },

    #[error("unknown piece character: {0}")]
    UnknownPiece(char),

    #[error("invalid hands format: {0}")]
    InvalidHands(String),

    #[error("invalid side to move: {0} (expected 'b' or 'w')")]
    InvalidSideToMove(String),

    #[error("invalid move count: {0}")]
    InvalidMoveCount(String),
}

/// USI 表記（指し手・棋譜行）の読み込みエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsiError {
    /// 座標や指し手として読めないトークン
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Sfen(#[from] SfenError),
}

/// 解析エンジン出力の突き合わせエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// 読み筋の `index` 手目が局面上で指せない
    #[error("pv move #{index} ({mv}) is not playable: {source}")]
    UnplayablePv {
        index: usize,
        mv: CanonicalMove,
        #[source]
        source: MoveError,
    },
}
