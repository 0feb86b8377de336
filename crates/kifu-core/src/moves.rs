//! 正規化された指し手（CanonicalMove）と USI 表記

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UsiError;
use crate::types::{PieceKind, Square};

/// 変換結果の指し手
///
/// 盤上の移動か駒打ちのどちらか。USI 表記 `7g7f` / `8h2b+` / `G*5e` と 1 対 1 に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalMove {
    Normal { from: Square, to: Square, promote: bool },
    Drop { kind: PieceKind, to: Square },
}

impl CanonicalMove {
    #[inline]
    pub const fn normal(from: Square, to: Square, promote: bool) -> Self {
        CanonicalMove::Normal { from, to, promote }
    }

    #[inline]
    pub const fn drop(kind: PieceKind, to: Square) -> Self {
        CanonicalMove::Drop { kind, to }
    }

    /// 移動先
    #[inline]
    pub const fn to(&self) -> Square {
        match *self {
            CanonicalMove::Normal { to, .. } | CanonicalMove::Drop { to, .. } => to,
        }
    }

    /// 移動元（駒打ちは None）
    #[inline]
    pub const fn from(&self) -> Option<Square> {
        match *self {
            CanonicalMove::Normal { from, .. } => Some(from),
            CanonicalMove::Drop { .. } => None,
        }
    }

    #[inline]
    pub const fn is_drop(&self) -> bool {
        matches!(self, CanonicalMove::Drop { .. })
    }

    #[inline]
    pub const fn is_promote(&self) -> bool {
        matches!(self, CanonicalMove::Normal { promote: true, .. })
    }

    /// USI 表記に変換
    pub fn to_usi(&self) -> String {
        self.to_string()
    }

    /// USI 表記から変換
    pub fn from_usi(s: &str) -> Result<Self, UsiError> {
        let malformed = || UsiError::MalformedToken(s.to_string());

        // 駒打ち（例: "P*5e"）
        if let Some((piece, to)) = s.split_once('*') {
            let mut chars = piece.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_uppercase() => PieceKind::from_usi_char(c),
                _ => None,
            }
            .filter(|k| *k != PieceKind::King)
            .ok_or_else(malformed)?;
            let to = Square::from_usi(to).ok_or_else(malformed)?;
            return Ok(CanonicalMove::drop(kind, to));
        }

        let (body, promote) = match s.strip_suffix('+') {
            Some(stripped) => (stripped, true),
            None => (s, false),
        };
        if body.len() != 4 || !body.is_ascii() {
            return Err(malformed());
        }
        let from = Square::from_usi(&body[0..2]).ok_or_else(malformed)?;
        let to = Square::from_usi(&body[2..4]).ok_or_else(malformed)?;
        if from == to {
            return Err(malformed());
        }
        Ok(CanonicalMove::normal(from, to, promote))
    }
}

impl fmt::Display for CanonicalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CanonicalMove::Normal { from, to, promote } => {
                write!(f, "{from}{to}")?;
                if promote {
                    f.write_str("+")?;
                }
                Ok(())
            }
            CanonicalMove::Drop { kind, to } => write!(f, "{}*{to}", kind.usi_char()),
        }
    }
}

impl FromStr for CanonicalMove {
    type Err = UsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalMove::from_usi(s)
    }
}

impl Serialize for CanonicalMove {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalMove {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    #[test]
    fn test_parse_usi_move() {
        assert_eq!(
            CanonicalMove::from_usi("7g7f").unwrap(),
            CanonicalMove::normal(sq("7g"), sq("7f"), false)
        );
        assert_eq!(
            CanonicalMove::from_usi("8h7g+").unwrap(),
            CanonicalMove::normal(sq("8h"), sq("7g"), true)
        );
        assert_eq!(
            CanonicalMove::from_usi("G*8h").unwrap(),
            CanonicalMove::drop(PieceKind::Gold, sq("8h"))
        );
    }

    #[test]
    fn test_parse_usi_move_errors() {
        for bad in ["", "7g", "7g7", "7g7f++", "0a1a", "7g7g", "K*5e", "g*5e", "GG*5e", "G*5j", "７g7f"] {
            assert!(
                matches!(CanonicalMove::from_usi(bad), Err(UsiError::MalformedToken(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CanonicalMove::normal(sq("2b"), sq("8h"), true).to_string(), "2b8h+");
        assert_eq!(CanonicalMove::drop(PieceKind::Pawn, sq("5e")).to_usi(), "P*5e");
    }

    #[test]
    fn test_accessors() {
        let mv = CanonicalMove::drop(PieceKind::Silver, sq("4d"));
        assert!(mv.is_drop());
        assert_eq!(mv.from(), None);
        assert_eq!(mv.to(), sq("4d"));
        assert!(!mv.is_promote());
    }

    #[test]
    fn test_serde_as_usi_token() {
        let moves = vec![
            CanonicalMove::normal(sq("7g"), sq("7f"), false),
            CanonicalMove::drop(PieceKind::Gold, sq("8h")),
        ];
        let json = serde_json::to_string(&moves).unwrap();
        assert_eq!(json, r#"["7g7f","G*8h"]"#);
        let back: Vec<CanonicalMove> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, moves);
    }
}
