//! 棋譜の 1 手を構造化したもの（IntendedMove）
//!
//! 記法は移動元を省くことが多いので、移動元・成りは盤面を見てから決める。

use std::fmt;

use kifu_core::types::{PieceKind, Side, Square};
use kifu_core::{Piece, Position};
use serde::{Deserialize, Serialize};

use crate::info::GameInfo;

/// 左右の修飾（右・左・直）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lateral {
    Right,
    Left,
    Straight,
}

/// 上下の修飾（上・引・寄）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Up,
    Back,
    Sideways,
}

/// 同じ駒が複数あるときの区別（例: 「右上」）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirectionHint {
    pub lateral: Option<Lateral>,
    pub vertical: Option<Vertical>,
}

impl DirectionHint {
    pub fn is_empty(&self) -> bool {
        self.lateral.is_none() && self.vertical.is_none()
    }
}

/// 記法から読み取った 1 手
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntendedMove {
    pub side: Side,
    pub kind: PieceKind,
    /// 記法に書かれた駒が成駒か
    pub promoted: bool,
    /// 記法の駒名が着手後の駒を指すか（CSA）。false なら着手前の駒（KIF）
    pub names_arrival: bool,
    pub origin: Option<Square>,
    pub destination: Square,
    pub is_drop: bool,
    /// 明示された成・不成
    pub promote: Option<bool>,
    pub hint: Option<DirectionHint>,
    /// 元テキストの行番号（1 始まり）
    pub line: Option<usize>,
}

impl IntendedMove {
    /// 移動元の候補になる盤上の駒
    ///
    /// CSA では成った直後の駒名が書かれるので、成駒名なら生駒も候補になる。
    pub fn matches_origin_piece(&self, piece: Piece) -> bool {
        if piece.kind != self.kind || piece.side != self.side {
            return false;
        }
        piece.promoted == self.promoted || (self.names_arrival && self.promoted && !piece.promoted)
    }

    /// 盤上の `piece` を動かすときの成り指定
    pub fn requested_promotion(&self, piece: Piece) -> Option<bool> {
        if self.names_arrival {
            Some(self.promoted && !piece.promoted)
        } else {
            self.promote
        }
    }
}

/// 読み捨てた行の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineIssue {
    /// 座標や駒名が読めない
    MalformedToken,
    /// 「同」だが直前の指し手がない
    NoPreviousDestination,
    /// 対応していない記述（変化手順など）
    Unsupported,
}

/// 読み捨てた行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWarning {
    /// 1 始まり
    pub line: usize,
    pub text: String,
    pub issue: LineIssue,
}

impl LineWarning {
    pub fn new(line: usize, text: &str, issue: LineIssue) -> Self {
        let warning = LineWarning {
            line,
            text: text.to_string(),
            issue,
        };
        log::warn!("{warning}");
        warning
    }
}

impl fmt::Display for LineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: dropped ({:?}): {}", self.line, self.issue, self.text)
    }
}

/// 1 局分の読み込み結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGame {
    pub info: GameInfo,
    pub start: Position,
    pub moves: Vec<IntendedMove>,
    pub warnings: Vec<LineWarning>,
}

impl Default for ParsedGame {
    fn default() -> Self {
        ParsedGame::new(Position::startpos())
    }
}

impl ParsedGame {
    pub fn new(start: Position) -> Self {
        ParsedGame {
            info: GameInfo::default(),
            start,
            moves: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 指し手も対局情報もない
    pub fn is_blank(&self) -> bool {
        self.moves.is_empty() && self.info.is_empty()
    }
}
