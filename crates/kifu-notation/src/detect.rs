//! 棋譜形式の判定

use std::fmt;
use std::str::FromStr;

use kifu_core::CanonicalMove;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 棋譜の形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `position startpos moves ...` または指し手の列
    Usi,
    /// KIF / KI2
    Kif,
    Csa,
}

impl Format {
    pub const fn as_str(self) -> &'static str {
        match self {
            Format::Usi => "usi",
            Format::Kif => "kif",
            Format::Csa => "csa",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usi" | "sfen" => Ok(Format::Usi),
            "kif" | "kifu" | "ki2" => Ok(Format::Kif),
            "csa" => Ok(Format::Csa),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

static CSA_MOVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-][0-9]{4}[A-Z]{2}").expect("valid regex"));

static KIF_MOVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\s+(?:[１-９]|同)").expect("valid regex"));

/// 判定の優先順（先に当てはまったものを採る）
pub const DETECTORS: [(Format, fn(&str) -> bool); 3] = [
    (Format::Usi, looks_like_usi),
    (Format::Csa, looks_like_csa),
    (Format::Kif, looks_like_kif),
];

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// 先頭行が `position` / `startpos` / `sfen` か、すべての語が USI の指し手
pub fn looks_like_usi(text: &str) -> bool {
    let Some(first) = content_lines(text).next() else {
        return false;
    };
    if ["position ", "startpos", "sfen "].iter().any(|p| first.starts_with(p)) {
        return true;
    }
    let mut tokens = text.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| CanonicalMove::from_usi(t).is_ok())
}

pub fn looks_like_csa(text: &str) -> bool {
    content_lines(text).any(|line| {
        ["V2", "PI", "P1", "N+", "N-", "$"].iter().any(|p| line.starts_with(p))
            || CSA_MOVE_RE.is_match(line)
    })
}

pub fn looks_like_kif(text: &str) -> bool {
    const MARKERS: [&str; 5] = ["手合割", "開始日時", "手数----", "先手：", "後手："];
    content_lines(text).any(|line| {
        MARKERS.iter().any(|m| line.contains(m))
            || line.starts_with(['▲', '△', '☗', '☖'])
            || KIF_MOVE_RE.is_match(line)
    })
}

/// テキストの形式を判定する（どれにも当てはまらなければ None）
pub fn detect_format(text: &str) -> Option<Format> {
    let format = DETECTORS
        .iter()
        .find(|(_, detect)| detect(text))
        .map(|&(format, _)| format);
    log::debug!("detected format: {format:?}");
    format
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_usi() {
        assert_eq!(detect_format("position startpos moves 7g7f"), Some(Format::Usi));
        assert_eq!(detect_format("startpos moves 7g7f 3c3d\n"), Some(Format::Usi));
        assert_eq!(detect_format("7g7f 3c3d\n2g2f"), Some(Format::Usi));
        assert_eq!(
            detect_format("sfen 4k4/9/9/9/9/9/9/9/4K4 b G 1 moves G*5b"),
            Some(Format::Usi)
        );
    }

    #[test]
    fn test_detect_csa() {
        assert_eq!(detect_format("V2.2\nPI\n+\n+7776FU\n"), Some(Format::Csa));
        assert_eq!(detect_format("+7776FU\n-3334FU\n"), Some(Format::Csa));
    }

    #[test]
    fn test_detect_kif() {
        assert_eq!(detect_format("手合割：平手\n   1 ７六歩(77)\n"), Some(Format::Kif));
        assert_eq!(detect_format("▲７六歩 △３四歩"), Some(Format::Kif));
        assert_eq!(detect_format("   1 ７六歩(77)\n   2 ３四歩(33)\n"), Some(Format::Kif));
    }

    #[test]
    fn test_undetectable() {
        assert_eq!(detect_format(""), None);
        assert_eq!(detect_format("hello world"), None);
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!("KI2".parse::<Format>(), Ok(Format::Kif));
        assert_eq!("csa".parse::<Format>(), Ok(Format::Csa));
        assert!("pgn".parse::<Format>().is_err());
    }
}
