//! 手番（Side）

use serde::{Deserialize, Serialize};

/// 手番（先手/後手）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// 先手（▲, CSA の `+`, SFEN の `b`）
    Sente = 0,
    /// 後手（△, CSA の `-`, SFEN の `w`）
    Gote = 1,
}

impl Side {
    /// 手番の数
    pub const NUM: usize = 2;

    pub const ALL: [Side; 2] = [Side::Sente, Side::Gote];

    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Sente => Side::Gote,
            Side::Gote => Side::Sente,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 前進方向の段の増分（先手は 1 段目へ向かうので -1）
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::Sente => -1,
            Side::Gote => 1,
        }
    }

    /// 手番から見た段（敵陣の最奥が 1 になる）
    ///
    /// `rank` は 1..=9。範囲外の段は後手で 0 に丸める。
    #[inline]
    pub const fn relative_rank(self, rank: u8) -> u8 {
        match self {
            Side::Sente => rank,
            Side::Gote => 10u8.saturating_sub(rank),
        }
    }

    /// SFEN の手番文字
    #[inline]
    pub const fn to_sfen_char(self) -> char {
        match self {
            Side::Sente => 'b',
            Side::Gote => 'w',
        }
    }

    pub fn from_sfen_char(c: char) -> Option<Side> {
        match c {
            'b' => Some(Side::Sente),
            'w' => Some(Side::Gote),
            _ => None,
        }
    }

    /// JSON 表現（"sente" | "gote"）
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Sente => "sente",
            Side::Gote => "gote",
        }
    }
}

impl std::ops::Not for Side {
    type Output = Side;

    #[inline]
    fn not(self) -> Side {
        self.opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Sente.opponent(), Side::Gote);
        assert_eq!(!Side::Gote, Side::Sente);
    }

    #[test]
    fn test_relative_rank() {
        assert_eq!(Side::Sente.relative_rank(1), 1);
        assert_eq!(Side::Sente.relative_rank(9), 9);
        assert_eq!(Side::Gote.relative_rank(9), 1);
        assert_eq!(Side::Gote.relative_rank(7), 3);
    }

    #[test]
    fn test_relative_rank_out_of_range() {
        assert_eq!(Side::Gote.relative_rank(10), 0);
        assert_eq!(Side::Gote.relative_rank(11), 0);
        assert_eq!(Side::Gote.relative_rank(u8::MAX), 0);
        assert_eq!(Side::Sente.relative_rank(u8::MAX), u8::MAX);
    }

    #[test]
    fn test_sfen_char() {
        for side in Side::ALL {
            assert_eq!(Side::from_sfen_char(side.to_sfen_char()), Some(side));
        }
        assert_eq!(Side::from_sfen_char('x'), None);
    }
}
