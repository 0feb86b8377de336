//! 対局情報（ヘッダ）

use chrono::{NaiveDate, NaiveDateTime};
use kifu_core::{Handicap, Side};
use serde::{Deserialize, Serialize};

/// 終局の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Resign,
    Abort,
    Repetition,
    Checkmate,
    Impasse,
    Timeout,
    IllegalMove,
    /// 「まで N 手で…」の行のみ
    Other,
}

impl Termination {
    /// KIF の終局語
    pub fn from_kif(word: &str) -> Option<Termination> {
        let t = match word {
            "投了" => Termination::Resign,
            "中断" | "封じ手" => Termination::Abort,
            "千日手" => Termination::Repetition,
            "詰み" | "詰" | "不詰" => Termination::Checkmate,
            "持将棋" | "入玉勝ち" => Termination::Impasse,
            "切れ負け" | "時間切れ" => Termination::Timeout,
            "反則勝ち" | "反則負け" | "反則" => Termination::IllegalMove,
            _ => return None,
        };
        Some(t)
    }

    /// CSA の `%` で始まる終局コマンド
    pub fn from_csa(command: &str) -> Option<Termination> {
        let t = match command {
            "%TORYO" => Termination::Resign,
            "%CHUDAN" => Termination::Abort,
            "%SENNICHITE" | "%OUTE_SENNICHITE" => Termination::Repetition,
            "%TSUMI" | "%FUZUMI" => Termination::Checkmate,
            "%JISHOGI" | "%KACHI" | "%HIKIWAKE" => Termination::Impasse,
            "%TIME_UP" => Termination::Timeout,
            "%ILLEGAL_MOVE" | "%+ILLEGAL_ACTION" | "%-ILLEGAL_ACTION" => Termination::IllegalMove,
            _ => return None,
        };
        Some(t)
    }

    pub const fn kif_word(self) -> &'static str {
        match self {
            Termination::Resign => "投了",
            Termination::Abort => "中断",
            Termination::Repetition => "千日手",
            Termination::Checkmate => "詰み",
            Termination::Impasse => "持将棋",
            Termination::Timeout => "切れ負け",
            Termination::IllegalMove => "反則負け",
            Termination::Other => "",
        }
    }
}

/// 終局情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub termination: Termination,
    /// 棋譜に書かれた手数（「まで N 手」）
    pub plies: Option<u32>,
    pub winner: Option<Side>,
}

/// 対局情報
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handicap: Option<Handicap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

impl GameInfo {
    pub fn is_empty(&self) -> bool {
        *self == GameInfo::default()
    }

    /// 終局情報を記録する（最初の 1 つを優先し、後から分かった手数・勝者は補う）
    pub fn record_result(&mut self, result: GameResult) {
        match &mut self.result {
            Some(existing) => {
                existing.plies = existing.plies.or(result.plies);
                existing.winner = existing.winner.or(result.winner);
                if existing.termination == Termination::Other {
                    existing.termination = result.termination;
                }
            }
            None => self.result = Some(result),
        }
    }
}

/// ヘッダの日時を読む
///
/// `2024/01/02 10:00:00`, `2024/01/02(火) 10:00`, `2024-01-02T10:00:00`, `2024/01/02` など。
/// 日付のみなら 0 時とする。
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let mut cleaned = String::with_capacity(value.len());
    let mut in_paren = false;
    for c in value.trim().chars() {
        match c {
            '(' | '（' => in_paren = true,
            ')' | '）' => in_paren = false,
            _ if !in_paren => cleaned.push(c),
            _ => {}
        }
    }
    let cleaned = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('-', "/")
        .replace('T', " ");

    const DATETIME_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(&cleaned, "%Y/%m/%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2024/01/02 10:20:30").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 10:20:30");
        let dt = parse_timestamp("2024/01/02(火) 10:20").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 10:20:00");
        let dt = parse_timestamp("2024-01-02T10:20:30").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 10:20:30");
        let dt = parse_timestamp("2024/01/02").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 00:00:00");
        assert_eq!(parse_timestamp("昨日"), None);
    }

    #[test]
    fn test_termination_words() {
        assert_eq!(Termination::from_kif("投了"), Some(Termination::Resign));
        assert_eq!(Termination::from_kif("千日手"), Some(Termination::Repetition));
        assert_eq!(Termination::from_kif("歩"), None);
        assert_eq!(Termination::from_csa("%TORYO"), Some(Termination::Resign));
        assert_eq!(Termination::from_csa("%KACHI"), Some(Termination::Impasse));
        assert_eq!(Termination::from_csa("%FOO"), None);
    }

    #[test]
    fn test_record_result_keeps_first_termination() {
        let mut info = GameInfo::default();
        info.record_result(GameResult {
            termination: Termination::Resign,
            plies: None,
            winner: None,
        });
        info.record_result(GameResult {
            termination: Termination::Other,
            plies: Some(9),
            winner: Some(Side::Sente),
        });
        let result = info.result.unwrap();
        assert_eq!(result.termination, Termination::Resign);
        assert_eq!(result.plies, Some(9));
        assert_eq!(result.winner, Some(Side::Sente));
    }
}
