//! # kifu-notation
//!
//! KIF / KI2 / CSA 形式の棋譜を読み、USI の指し手列に変換する。
//!
//! ## 処理の流れ
//!
//! 1. `detect`: 形式の判定
//! 2. `split`: 複数局のテキストを 1 局ずつに分ける
//! 3. `kif` / `csa`: 1 局を `ParsedGame`（対局情報と `IntendedMove` の列）にする
//! 4. `resolve`: 移動元の推定
//! 5. `transpile`: 局面に沿って `CanonicalMove` に変換する
//!
//! `ingest` はこれらをまとめて呼ぶ入口。`kif_export` は変換結果を KIF で書き出す。
//!
//! ```
//! use kifu_notation::{FormatHint, TranspileOptions, ingest};
//!
//! let games = ingest("▲７六歩 △３四歩", FormatHint::Auto, TranspileOptions::default()).unwrap();
//! let record = games[0].record.as_ref().unwrap();
//! assert_eq!(record.to_string(), "startpos moves 7g7f 3c3d");
//! ```

pub mod error;
pub mod info;
pub mod intent;
mod kanji;

pub mod csa;
pub mod detect;
pub mod kif;
pub mod kif_export;
pub mod split;

pub mod ingest;
pub mod resolve;
pub mod transpile;

pub use detect::{Format, detect_format};
pub use error::{IngestError, PlyError, ResolveError, TranspileError};
pub use info::{GameInfo, GameResult, Termination};
pub use ingest::{FormatHint, GameOutcome, ingest};
pub use intent::{DirectionHint, IntendedMove, Lateral, LineIssue, LineWarning, ParsedGame, Vertical};
pub use transpile::{Step, TranspileOptions, Transpiler, transpile, transpile_from};
