//! テキストの取り込み: 形式判定、局の分割、読み込み、変換
//!
//! 1 局の変換に失敗しても他の局は続けて処理し、結果は局ごとに返す。

use kifu_core::error::UsiError;
use kifu_core::{CanonicalRecord, RecordReplayError, StartPosition, Timeline};
use serde::{Deserialize, Serialize};

use crate::csa::parse_csa;
use crate::detect::{Format, detect_format};
use crate::error::{IngestError, PlyError, TranspileError};
use crate::info::GameInfo;
use crate::intent::{LineWarning, ParsedGame};
use crate::kif::parse_kif;
use crate::split::split_games;
use crate::transpile::{TranspileOptions, replay};

/// 入力形式の指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    /// 内容から判定する
    #[default]
    Auto,
    Kif,
    Csa,
    Usi,
}

impl From<Format> for FormatHint {
    fn from(format: Format) -> Self {
        match format {
            Format::Kif => FormatHint::Kif,
            Format::Csa => FormatHint::Csa,
            Format::Usi => FormatHint::Usi,
        }
    }
}

/// 1 局分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// 0 始まり
    pub index: usize,
    pub format: Format,
    pub info: GameInfo,
    pub warnings: Vec<LineWarning>,
    pub record: Result<CanonicalRecord, TranspileError>,
}

impl GameOutcome {
    /// 変換に失敗していれば `IngestError::Transpile` にする
    pub fn into_record(self) -> Result<CanonicalRecord, IngestError> {
        let game = self.index;
        self.record
            .map_err(|source| IngestError::Transpile { game, source })
    }

    /// 局面の履歴（変換に成功した局のみ）
    pub fn timeline(&self) -> Option<Timeline> {
        let record = self.record.as_ref().ok()?;
        match record.replay() {
            Ok(timeline) => Some(timeline),
            Err(e) => {
                log::error!("game {}: converted record does not replay: {e}", self.index);
                None
            }
        }
    }
}

/// テキストを読み、局ごとの変換結果を返す
///
/// 形式を判定できないか、1 局も読めなければ `UnrecognizedFormat`。
pub fn ingest(
    text: &str,
    hint: FormatHint,
    options: TranspileOptions,
) -> Result<Vec<GameOutcome>, IngestError> {
    let games = match hint {
        FormatHint::Usi => ingest_usi(text),
        FormatHint::Kif => ingest_notation(text, Format::Kif, options),
        FormatHint::Csa => ingest_notation(text, Format::Csa, options),
        FormatHint::Auto => match detect_format(text) {
            Some(Format::Usi) => ingest_usi(text),
            Some(format) => ingest_notation(text, format, options),
            None => {
                log::debug!("format not detected; trying KIF then CSA");
                let games = ingest_notation(text, Format::Kif, options);
                if games.is_empty() {
                    ingest_notation(text, Format::Csa, options)
                } else {
                    games
                }
            }
        },
    };
    if games.is_empty() {
        return Err(IngestError::UnrecognizedFormat);
    }
    Ok(games)
}

fn ingest_notation(text: &str, format: Format, options: TranspileOptions) -> Vec<GameOutcome> {
    let parse: fn(&str) -> ParsedGame = match format {
        Format::Csa => parse_csa,
        _ => parse_kif,
    };
    let mut games = Vec::new();
    for segment in split_games(text) {
        let parsed = parse(segment);
        if parsed.is_blank() {
            log::debug!("skipping a segment without moves or headers");
            continue;
        }
        let index = games.len();
        let record = convert(&parsed, options);
        match &record {
            Ok(record) => log::info!("game {index}: {} moves ({format})", record.moves.len()),
            Err(e) => log::info!("game {index}: failed at {e}"),
        }
        games.push(GameOutcome {
            index,
            format,
            info: parsed.info,
            warnings: parsed.warnings,
            record,
        });
    }
    games
}

fn convert(parsed: &ParsedGame, options: TranspileOptions) -> Result<CanonicalRecord, TranspileError> {
    let timeline = replay(&parsed.start, &parsed.moves, options)?;
    Ok(CanonicalRecord::new(
        StartPosition::from_position(&parsed.start),
        timeline.into_moves(),
    ))
}

/// 1 行 1 局。`position` 形式のほか、平手からの指し手の列も受け付ける
fn ingest_usi(text: &str) -> Vec<GameOutcome> {
    let mut games = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let index = games.len();
        let checked = check_usi_line(line).map_err(|(ply, source)| TranspileError {
            ply,
            line: Some(i + 1),
            source,
        });
        if let Err(e) = &checked {
            log::info!("game {index}: failed at {e}");
        }
        games.push(GameOutcome {
            index,
            format: Format::Usi,
            info: GameInfo::default(),
            warnings: Vec::new(),
            record: checked,
        });
    }
    games
}

/// 1 行を読んで指し直す。失敗した手数（読めなければ 0）とエラーを返す
fn check_usi_line(line: &str) -> Result<CanonicalRecord, (usize, PlyError)> {
    let parsed: Result<CanonicalRecord, UsiError> = if ["position", "startpos", "sfen"]
        .iter()
        .any(|p| line.starts_with(p))
    {
        line.parse()
    } else {
        format!("startpos moves {line}").parse()
    };
    let record = match parsed {
        Ok(record) => record,
        Err(e) => return Err((0, PlyError::Usi(e))),
    };
    match record.replay() {
        Ok(_) => Ok(record),
        Err(RecordReplayError::Move { ply, source }) => Err((ply, PlyError::Move(source))),
        Err(RecordReplayError::Start(e)) => Err((0, PlyError::Usi(e))),
    }
}
