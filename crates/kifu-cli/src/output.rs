//! 変換結果の書き出し

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kifu_core::CanonicalMove;
use kifu_core::json::{BoardStateJson, ReplayResultJson};
use kifu_notation::kif_export::write_kif;
use kifu_notation::{Format, GameInfo, GameOutcome, LineWarning};
use serde::{Deserialize, Serialize};

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `startpos moves 7g7f ...`（1 局 1 行）
    #[default]
    Usi,
    /// 最終局面の SFEN（1 局 1 行）
    Sfen,
    /// KIF 形式
    Kif,
    /// 全局を JSON 配列で
    Json,
}

#[derive(Debug, Serialize)]
struct GameJson<'a> {
    index: usize,
    format: Format,
    info: &'a GameInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<LineWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<String>,
    moves: Vec<CanonicalMove>,
    #[serde(skip_serializing_if = "Option::is_none")]
    board: Option<BoardStateJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> GameJson<'a> {
    fn new(game: &'a GameOutcome) -> Self {
        let mut json = GameJson {
            index: game.index,
            format: game.format,
            info: &game.info,
            warnings: game.warnings.clone(),
            record: None,
            moves: Vec::new(),
            board: None,
            error: None,
        };
        match &game.record {
            Ok(record) => {
                json.record = Some(record.to_string());
                match ReplayResultJson::from_record(record) {
                    Ok(replay) => {
                        json.moves = replay.applied;
                        json.board = Some(replay.board);
                        json.error = replay.error;
                    }
                    Err(e) => json.error = Some(e.to_string()),
                }
            }
            Err(e) => json.error = Some(e.to_string()),
        }
        json
    }
}

/// テキストで 1 局ずつ書く形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextFormat {
    Usi,
    Sfen,
    Kif,
}

/// 変換に成功した局を書き出す（失敗した局はログに出して飛ばす。JSON では `error` に入れる）
pub fn write_games<W: Write>(out: &mut W, format: OutputFormat, games: &[GameOutcome]) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, games),
        OutputFormat::Usi => write_text(out, TextFormat::Usi, games),
        OutputFormat::Sfen => write_text(out, TextFormat::Sfen, games),
        OutputFormat::Kif => write_text(out, TextFormat::Kif, games),
    }
}

fn write_json<W: Write>(out: &mut W, games: &[GameOutcome]) -> Result<()> {
    let json: Vec<GameJson> = games.iter().map(GameJson::new).collect();
    serde_json::to_writer_pretty(&mut *out, &json).context("failed to write JSON")?;
    writeln!(out)?;
    Ok(())
}

fn write_text<W: Write>(out: &mut W, format: TextFormat, games: &[GameOutcome]) -> Result<()> {
    let mut first = true;
    for game in games {
        let record = match &game.record {
            Ok(record) => record,
            Err(e) => {
                log::error!("game {}: {e}", game.index);
                continue;
            }
        };
        match format {
            TextFormat::Usi => writeln!(out, "{record}")?,
            TextFormat::Sfen => {
                let Some(timeline) = game.timeline() else {
                    continue;
                };
                writeln!(out, "{}", timeline.last().to_sfen())?;
            }
            TextFormat::Kif => {
                let Some(timeline) = game.timeline() else {
                    continue;
                };
                if !first {
                    writeln!(out)?;
                }
                write_kif(out, &game.info, &timeline)
                    .with_context(|| format!("failed to write game {} as KIF", game.index))?;
            }
        }
        first = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kifu_notation::{FormatHint, TranspileOptions, ingest};

    fn render(text: &str, format: OutputFormat) -> String {
        let games = ingest(text, FormatHint::Auto, TranspileOptions::default()).unwrap();
        let mut out = Vec::new();
        write_games(&mut out, format, &games).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_usi_output() {
        assert_eq!(render("+7776FU\n-3334FU\n", OutputFormat::Usi), "startpos moves 7g7f 3c3d\n");
    }

    #[test]
    fn test_sfen_output() {
        assert_eq!(
            render("▲７六歩", OutputFormat::Sfen),
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL w - 2\n"
        );
    }

    #[test]
    fn test_failed_game_is_skipped() {
        let out = render("▲７六歩 △７六歩\n\n\n▲２六歩\n", OutputFormat::Usi);
        assert_eq!(out, "startpos moves 2g2f\n");
    }

    #[test]
    fn test_json_output() {
        let out = render("▲７六歩 △７六歩\n\n\n▲２六歩\n", OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let games = value.as_array().unwrap();
        assert_eq!(games.len(), 2);
        assert!(games[0]["error"].is_string());
        assert!(games[0].get("record").is_none());
        assert_eq!(games[1]["record"], "startpos moves 2g2f");
        assert_eq!(games[1]["moves"], serde_json::json!(["2g2f"]));
        assert_eq!(games[1]["board"]["turn"], "gote");
    }

    #[test]
    fn test_json_output_of_only_failed_games() {
        let out = render("▲７六歩 △７六歩\n", OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert!(value[0]["error"].as_str().unwrap().contains("ply 1"));
        assert_eq!(value[0]["moves"], serde_json::json!([]));

        // 行形式では何も書かない
        assert_eq!(render("▲７六歩 △７六歩\n", OutputFormat::Usi), "");
    }

    #[test]
    fn test_kif_games_are_separated() {
        let out = render("▲７六歩\n\n\n▲２六歩\n", OutputFormat::Kif);
        assert_eq!(out.matches("手合割：平手").count(), 2);
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn test_kif_output() {
        let out = render("▲７六歩 △３四歩", OutputFormat::Kif);
        assert!(out.contains("手合割：平手"));
        assert!(out.contains("   1 ▲７六歩(77)"));
        assert!(out.contains("   2 △３四歩(33)"));
    }
}
