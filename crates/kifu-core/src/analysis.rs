//! 解析エンジンの出力（USI `info` 行）
//!
//! エンジンそのものは扱わない。受け取った候補手と読み筋を、
//! 手元で再現した局面の上で突き合わせるだけ。

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::moves::CanonicalMove;
use crate::position::Position;

/// 評価値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Score {
    /// 手番側から見たセンチポーン
    Cp(i32),
    /// 詰みまでの手数（負なら詰まされる）
    Mate(i32),
}

/// `lowerbound` / `upperbound`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// `info` 行 1 本分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub multipv: u32,
    pub depth: Option<u32>,
    pub score: Score,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<ScoreBound>,
    pub pv: Vec<CanonicalMove>,
}

impl AnalysisInfo {
    /// 読み筋の先頭（候補手）
    pub fn best_move(&self) -> Option<CanonicalMove> {
        self.pv.first().copied()
    }
}

/// USI の `info` 行を読む
///
/// `score` と `pv` の両方を含む行だけを対象にする。`multipv` がなければ 1。
/// 読み筋は USI 表記として読めなくなったところで打ち切る。
pub fn parse_info_line(line: &str) -> Option<AnalysisInfo> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }

    let mut multipv = 1;
    let mut depth = None;
    let mut score = None;
    let mut bound = None;
    let mut pv = None;

    while let Some(token) = tokens.next() {
        match token {
            "multipv" => multipv = tokens.next()?.parse().ok()?,
            "depth" => depth = tokens.next()?.parse().ok(),
            "score" => {
                let kind = tokens.next()?;
                let mut value = tokens.next()?;
                bound = match value {
                    "lowerbound" => Some(ScoreBound::Lower),
                    "upperbound" => Some(ScoreBound::Upper),
                    _ => None,
                };
                if bound.is_some() {
                    value = tokens.next()?;
                }
                score = Some(parse_score(kind, value)?);
            }
            "pv" => {
                let moves: Vec<CanonicalMove> = tokens
                    .by_ref()
                    .map_while(|t| CanonicalMove::from_usi(t).ok())
                    .collect();
                pv = Some(moves);
                break;
            }
            // 文字列を値に取るので以降は読まない
            "string" => break,
            _ => {}
        }
    }

    Some(AnalysisInfo {
        multipv,
        depth,
        score: score?,
        bound,
        pv: pv?,
    })
}

fn parse_score(kind: &str, value: &str) -> Option<Score> {
    match kind {
        "cp" => value.parse().ok().map(Score::Cp),
        "mate" => {
            // "mate +" / "mate -" は手数不明の詰み
            let n = match value {
                "+" => i32::MAX,
                "-" => -i32::MAX,
                v => v.trim_start_matches('+').parse().ok()?,
            };
            Some(Score::Mate(n))
        }
        _ => None,
    }
}

/// `bestmove` 行の指し手（`resign` / `win` は None）
pub fn parse_bestmove(line: &str) -> Option<CanonicalMove> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    CanonicalMove::from_usi(tokens.next()?).ok()
}

/// 読み筋が `position` から指せることを確かめ、最終局面を返す
pub fn cross_check(position: &Position, info: &AnalysisInfo) -> Result<Position, AnalysisError> {
    let mut current = *position;
    for (index, mv) in info.pv.iter().enumerate() {
        current = current
            .apply(mv)
            .map_err(|source| AnalysisError::UnplayablePv {
                index,
                mv: *mv,
                source,
            })?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_line() {
        let line = "info depth 12 seldepth 15 multipv 2 score cp -34 nodes 120000 nps 500000 pv 3c3d 2g2f 4c4d";
        let info = parse_info_line(line).unwrap();
        assert_eq!(info.multipv, 2);
        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Score::Cp(-34));
        assert_eq!(info.bound, None);
        assert_eq!(info.pv.len(), 3);
        assert_eq!(info.best_move().unwrap().to_usi(), "3c3d");
    }

    #[test]
    fn test_parse_bounds_and_mate() {
        let info = parse_info_line("info depth 3 score cp lowerbound 120 pv 7g7f").unwrap();
        assert_eq!(info.score, Score::Cp(120));
        assert_eq!(info.bound, Some(ScoreBound::Lower));
        assert_eq!(info.multipv, 1);

        let info = parse_info_line("info score mate +5 pv G*5b").unwrap();
        assert_eq!(info.score, Score::Mate(5));
        let info = parse_info_line("info score mate -3 pv 5a4b").unwrap();
        assert_eq!(info.score, Score::Mate(-3));
    }

    #[test]
    fn test_lines_without_score_or_pv() {
        assert!(parse_info_line("info depth 10 nodes 100").is_none());
        assert!(parse_info_line("info score cp 10").is_none());
        assert!(parse_info_line("info string pv 7g7f score cp 3").is_none());
        assert!(parse_info_line("bestmove 7g7f").is_none());
        assert!(parse_info_line("info score cp abc pv 7g7f").is_none());
    }

    #[test]
    fn test_pv_stops_at_unreadable_token() {
        let info = parse_info_line("info score cp 5 pv 7g7f 3c3d (garbage) 2g2f").unwrap();
        assert_eq!(info.pv.len(), 2);
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove 7g7f ponder 3c3d").unwrap().to_usi(), "7g7f");
        assert_eq!(parse_bestmove("bestmove resign"), None);
    }

    #[test]
    fn test_cross_check() {
        let info = parse_info_line("info score cp 30 pv 7g7f 3c3d 8h2b+").unwrap();
        let end = cross_check(&Position::startpos(), &info).unwrap();
        assert_eq!(end.ply, 4);

        let info = parse_info_line("info score cp 30 pv 7g7f 7c7d 7f7e 3c3d 8h2b+").unwrap();
        assert!(cross_check(&Position::startpos(), &info).is_ok());

        let info = parse_info_line("info score cp 30 pv 7g7f 8h2b+").unwrap();
        let err = cross_check(&Position::startpos(), &info).unwrap_err();
        assert!(matches!(err, AnalysisError::UnplayablePv { index: 1, .. }));
    }
}
