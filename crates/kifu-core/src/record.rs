//! 正規化された棋譜（開始局面 + 指し手列）
//!
//! 文字列表現は USI の `position` コマンドの引数と同じ。
//!
//! ```text
//! startpos moves 7g7f 3c3d
//! sfen lnsgkgsn1/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL w - 1 moves 5a4b
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MoveError, UsiError};
use crate::moves::CanonicalMove;
use crate::position::Position;
use crate::timeline::Timeline;
use crate::types::Side;

/// 開始局面
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "sfen", rename_all = "lowercase")]
pub enum StartPosition {
    Startpos,
    Sfen(String),
}

impl StartPosition {
    /// 局面から（平手初期局面なら `Startpos`）
    pub fn from_position(position: &Position) -> Self {
        if position.is_startpos() && position.ply == 1 {
            StartPosition::Startpos
        } else {
            StartPosition::Sfen(position.to_sfen())
        }
    }

    pub fn position(&self) -> Result<Position, UsiError> {
        match self {
            StartPosition::Startpos => Ok(Position::startpos()),
            StartPosition::Sfen(sfen) => Ok(Position::from_sfen(sfen)?),
        }
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPosition::Startpos => f.write_str("startpos"),
            StartPosition::Sfen(sfen) => write!(f, "sfen {sfen}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub start: StartPosition,
    pub moves: Vec<CanonicalMove>,
}

impl CanonicalRecord {
    pub fn new(start: StartPosition, moves: Vec<CanonicalMove>) -> Self {
        CanonicalRecord { start, moves }
    }

    /// 平手初期局面からの棋譜
    pub fn from_startpos(moves: Vec<CanonicalMove>) -> Self {
        CanonicalRecord::new(StartPosition::Startpos, moves)
    }

    /// 全手を検証しながら再生する
    pub fn replay(&self) -> Result<Timeline, RecordReplayError> {
        let start = self.start.position()?;
        let mut timeline = Timeline::new(start);
        for (ply, mv) in self.moves.iter().enumerate() {
            timeline
                .push(*mv)
                .map_err(|source| RecordReplayError::Move { ply, source })?;
        }
        Ok(timeline)
    }

    /// 最後の指し手の後の手番
    pub fn side_to_move(&self) -> Result<Side, UsiError> {
        let start = self.start.position()?;
        Ok(if self.moves.len() % 2 == 0 {
            start.turn
        } else {
            !start.turn
        })
    }
}

/// USI の `position` コマンドの引数から手番を判定する
///
/// 読めない入力は先手番として扱う（最後の指し手の数え方のみで判定する）。
pub fn side_to_move_of(record: &str) -> Side {
    match record.parse::<CanonicalRecord>() {
        Ok(record) => record.side_to_move().unwrap_or(Side::Sente),
        Err(err) => {
            log::debug!("side_to_move_of: unreadable record: {err}");
            Side::Sente
        }
    }
}

/// 棋譜の再生エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordReplayError {
    #[error(transparent)]
    Start(#[from] UsiError),

    /// `ply` は 0 始まり
    #[error("move #{ply}: {source}")]
    Move {
        ply: usize,
        #[source]
        source: MoveError,
    },
}

impl fmt::Display for CanonicalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if !self.moves.is_empty() {
            f.write_str(" moves")?;
            for mv in &self.moves {
                write!(f, " {mv}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for CanonicalRecord {
    type Err = UsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace().peekable();
        if tokens.peek() == Some(&"position") {
            tokens.next();
        }

        let start = match tokens.next() {
            Some("startpos") => StartPosition::Startpos,
            Some("sfen") => {
                let fields: Vec<&str> = tokens.by_ref().take(4).collect();
                let sfen = fields.join(" ");
                Position::from_sfen(&sfen)?;
                StartPosition::Sfen(sfen)
            }
            Some(other) => return Err(UsiError::InvalidRecord(format!("unexpected token: {other}"))),
            None => return Err(UsiError::InvalidRecord("empty record".to_string())),
        };

        let moves = match tokens.next() {
            None => Vec::new(),
            Some("moves") => tokens.map(CanonicalMove::from_usi).collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(UsiError::InvalidRecord(format!("expected 'moves', got {other}")));
            }
        };

        Ok(CanonicalRecord { start, moves })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let record: CanonicalRecord = "startpos moves 7g7f 3c3d 8h2b+".parse().unwrap();
        assert_eq!(record.start, StartPosition::Startpos);
        assert_eq!(record.moves.len(), 3);
        assert_eq!(record.to_string(), "startpos moves 7g7f 3c3d 8h2b+");

        let with_keyword: CanonicalRecord = "position startpos moves 7g7f 3c3d 8h2b+".parse().unwrap();
        assert_eq!(with_keyword, record);

        let empty: CanonicalRecord = "startpos".parse().unwrap();
        assert!(empty.moves.is_empty());
        assert_eq!(empty.to_string(), "startpos");
    }

    #[test]
    fn test_sfen_start() {
        let text = "sfen lnsgkgsn1/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL w - 1 moves 5a4b";
        let record: CanonicalRecord = text.parse().unwrap();
        assert!(matches!(record.start, StartPosition::Sfen(_)));
        assert_eq!(record.to_string(), text);
        assert_eq!(record.side_to_move().unwrap(), Side::Sente);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<CanonicalRecord>(), Err(UsiError::InvalidRecord(_))));
        assert!(matches!(
            "startpos 7g7f".parse::<CanonicalRecord>(),
            Err(UsiError::InvalidRecord(_))
        ));
        assert!(matches!(
            "startpos moves 7g7f 00".parse::<CanonicalRecord>(),
            Err(UsiError::MalformedToken(_))
        ));
        assert!(matches!(
            "sfen 9/9 b - 1".parse::<CanonicalRecord>(),
            Err(UsiError::Sfen(_))
        ));
    }

    #[test]
    fn test_side_to_move_of() {
        assert_eq!(side_to_move_of("position startpos"), Side::Sente);
        assert_eq!(side_to_move_of("position startpos moves 7g7f"), Side::Gote);
        assert_eq!(side_to_move_of("position startpos moves 7g7f 3c3d"), Side::Sente);
        assert_eq!(side_to_move_of("garbage"), Side::Sente);
    }

    #[test]
    fn test_replay_reports_failing_ply() {
        let record: CanonicalRecord = "startpos moves 7g7f 3c3d 7f7d".parse().unwrap();
        let err = record.replay().unwrap_err();
        assert!(matches!(err, RecordReplayError::Move { ply: 2, .. }));

        let record: CanonicalRecord = "startpos moves 7g7f 3c3d".parse().unwrap();
        let timeline = record.replay().unwrap();
        assert_eq!(timeline.len(), 2);
    }
}
