//! # kifu-core
//!
//! 棋譜変換のための将棋ルールコア。
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Side, Square, SquareSet, PieceKind, Piece, Hands）
//! - `board`: 盤面
//! - `movement`: 駒の利き
//! - `promotion`: 成りの規則
//! - `drop`: 駒打ちの規則
//! - `position`: 局面と指し手の適用
//! - `moves`: 正規化された指し手（USI 表記）
//! - `sfen`: 局面文字列
//! - `handicap`: 駒落ちの開始局面
//! - `record`: 正規化された棋譜
//! - `timeline`: 局面の履歴
//! - `json`: 編集画面向けの盤面 JSON
//! - `analysis`: 解析エンジン出力の読み込みと突き合わせ
//!
//! 入出力は持たない。すべての関数は引数の値だけで結果が決まる。

pub mod types;

pub mod board;
pub mod drop;
pub mod movement;
pub mod promotion;

pub mod moves;
pub mod position;
pub mod sfen;
pub mod handicap;

pub mod record;
pub mod timeline;

pub mod analysis;
pub mod json;

pub mod error;

pub use board::Board;
pub use drop::DropViolation;
pub use error::{AnalysisError, MoveError, SfenError, UsiError};
pub use handicap::Handicap;
pub use moves::CanonicalMove;
pub use position::Position;
pub use promotion::PromotionState;
pub use record::{CanonicalRecord, RecordReplayError, StartPosition};
pub use timeline::Timeline;
pub use types::{Hands, Piece, PieceKind, Side, Square, SquareSet};
