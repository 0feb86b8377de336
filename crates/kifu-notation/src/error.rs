//! Error types for notation parsing and transpilation

use kifu_core::error::{MoveError, UsiError};
use kifu_core::types::{PieceKind, Side, Square};
use kifu_core::Piece;

use crate::intent::DirectionHint;

/// 移動元を 1 つに決められない
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// 明示された移動元に、記法の駒がない
    #[error("origin {origin} does not hold {expected:?} (found {found:?})")]
    OriginMismatch {
        origin: Square,
        expected: Piece,
        found: Option<Piece>,
    },

    /// 移動先に動ける駒がない
    #[error("no {side:?} {kind:?} can reach {destination}")]
    NoLegalOrigin {
        side: Side,
        kind: PieceKind,
        destination: Square,
    },

    /// 修飾語で絞り込めない（0 個または複数）
    #[error("hint {hint:?} does not single out one of {candidates:?} for {destination}")]
    AmbiguousHintMismatch {
        destination: Square,
        hint: DirectionHint,
        candidates: Vec<Square>,
    },

    /// 同じ筋・距離でも決まらない
    #[error("cannot choose between {candidates:?} for {destination}")]
    UnresolvedAmbiguity {
        destination: Square,
        candidates: Vec<Square>,
    },
}

/// 1 手分の変換エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlyError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Move(#[from] MoveError),

    /// 記法の手番記号が局面の手番と合わない
    #[error("{found:?} moves, but it is {expected:?}'s turn")]
    TurnMismatch { expected: Side, found: Side },

    /// USI の行が読めない（開始局面か指し手）
    #[error(transparent)]
    Usi(#[from] UsiError),
}

/// 棋譜の変換エラー（最初に失敗した手）
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("ply {ply}{}: {source}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
pub struct TranspileError {
    /// 0 始まりの手数（出力の指し手の添字）
    pub ply: usize,
    /// 元テキストの行番号
    pub line: Option<usize>,
    #[source]
    pub source: PlyError,
}

/// 取り込み処理のエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// どの形式としても読めない
    #[error("unrecognized record format")]
    UnrecognizedFormat,

    /// `game` は 0 始まりの対局番号
    #[error("game {game}: {source}")]
    Transpile {
        game: usize,
        #[source]
        source: TranspileError,
    },
}
