//! 升目（Square）

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UsiError;

/// 升目（筋 1-9, 段 1-9）
///
/// 内部値は (筋-1)*9 + (段-1)。1一=0, 1二=1, ..., 1九=8, 2一=9, ...
/// 0 始まりの座標は外に出さない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 升目の数
    pub const NUM: usize = 81;

    /// 1一
    pub const SQ_11: Square = Square(0);
    /// 5五（中央）
    pub const SQ_55: Square = Square(40);
    /// 9九
    pub const SQ_99: Square = Square(80);

    /// 筋と段から生成（範囲外は None）
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Square> {
        if file >= 1 && file <= 9 && rank >= 1 && rank <= 9 {
            Some(Square((file - 1) * 9 + (rank - 1)))
        } else {
            None
        }
    }

    /// 筋（1-9）
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 / 9 + 1
    }

    /// 段（1-9）
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 % 9 + 1
    }

    /// インデックスとして使用（0-80）
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// インデックスから生成（範囲チェックあり）
    #[inline]
    pub const fn from_index(n: usize) -> Option<Square> {
        if n < Self::NUM { Some(Square(n as u8)) } else { None }
    }

    /// 筋・段方向にずらした升（盤外は None）
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (1..=9).contains(&file) && (1..=9).contains(&rank) {
            Square::new(file as u8, rank as u8)
        } else {
            None
        }
    }

    /// 180度回転
    #[inline]
    pub const fn inverse(self) -> Square {
        Square(80 - self.0)
    }

    /// USI形式の文字列（"7g"等）に変換
    pub fn to_usi(self) -> String {
        let mut s = String::with_capacity(2);
        s.push((b'0' + self.file()) as char);
        s.push((b'a' + self.rank() - 1) as char);
        s
    }

    /// USI形式の文字列からSquareに変換
    pub fn from_usi(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => Self::from_usi_chars(f, r),
            _ => None,
        }
    }

    /// 筋の数字と段の英字から生成
    pub fn from_usi_chars(file: char, rank: char) -> Option<Square> {
        let file = match file {
            '1'..='9' => file as u8 - b'0',
            _ => return None,
        };
        let rank = match rank {
            'a'..='i' => rank as u8 - b'a' + 1,
            _ => return None,
        };
        Square::new(file, rank)
    }

    /// CSA形式の2桁（"77"等）から生成。"00"（駒台）は None
    pub fn from_csa(s: &str) -> Option<Square> {
        let b = s.as_bytes();
        if b.len() != 2 || !b[0].is_ascii_digit() || !b[1].is_ascii_digit() {
            return None;
        }
        Square::new(b[0] - b'0', b[1] - b'0')
    }

    /// CSA形式の2桁に変換
    pub fn to_csa(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    /// チェビシェフ距離
    #[inline]
    pub fn chebyshev(self, other: Square) -> u8 {
        self.file().abs_diff(other.file()).max(self.rank().abs_diff(other.rank()))
    }

    /// ユークリッド距離の2乗
    #[inline]
    pub fn distance_sq(self, other: Square) -> u32 {
        let df = self.file().abs_diff(other.file()) as u32;
        let dr = self.rank().abs_diff(other.rank()) as u32;
        df * df + dr * dr
    }

    /// 全ての升を返すイテレータ
    pub fn all() -> impl Iterator<Item = Square> {
        (0..81).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), (b'a' + self.rank() - 1) as char)
    }
}

impl FromStr for Square {
    type Err = UsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_usi(s).ok_or_else(|| UsiError::MalformedToken(s.to_string()))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_new() {
        assert_eq!(Square::new(1, 1), Some(Square::SQ_11));
        assert_eq!(Square::new(5, 5), Some(Square::SQ_55));
        assert_eq!(Square::new(9, 9), Some(Square::SQ_99));
        assert_eq!(Square::new(0, 5), None);
        assert_eq!(Square::new(5, 10), None);
    }

    #[test]
    fn test_square_file_rank() {
        let sq = Square::new(3, 7).unwrap();
        assert_eq!(sq.file(), 3);
        assert_eq!(sq.rank(), 7);
    }

    #[test]
    fn test_square_usi() {
        assert_eq!(Square::new(7, 7).unwrap().to_usi(), "7g");
        assert_eq!(Square::from_usi("7g"), Square::new(7, 7));
        assert_eq!(Square::from_usi("1a"), Some(Square::SQ_11));
        assert_eq!(Square::from_usi("9i"), Some(Square::SQ_99));
        assert_eq!(Square::from_usi(""), None);
        assert_eq!(Square::from_usi("0a"), None);
        assert_eq!(Square::from_usi("5j"), None);
        assert_eq!(Square::from_usi("5ee"), None);
        assert_eq!(Square::from_usi("５e"), None);
    }

    #[test]
    fn test_square_csa() {
        assert_eq!(Square::from_csa("77"), Square::new(7, 7));
        assert_eq!(Square::from_csa("00"), None);
        assert_eq!(Square::from_csa("7"), None);
        assert_eq!(Square::new(2, 6).unwrap().to_csa(), "26");
    }

    #[test]
    fn test_square_offset() {
        let sq = Square::new(1, 1).unwrap();
        assert_eq!(sq.offset(0, -1), None);
        assert_eq!(sq.offset(-1, 0), None);
        assert_eq!(sq.offset(1, 1), Square::new(2, 2));
    }

    #[test]
    fn test_square_distance() {
        let a = Square::new(3, 2).unwrap();
        let b = Square::new(3, 3).unwrap();
        let c = Square::new(4, 4).unwrap();
        assert_eq!(a.chebyshev(b), 1);
        assert_eq!(a.distance_sq(c), 5);
        assert_eq!(b.chebyshev(c), 1);
        assert_eq!(b.distance_sq(c), 2);
    }

    #[test]
    fn test_square_all() {
        let all: Vec<_> = Square::all().collect();
        assert_eq!(all.len(), 81);
        assert_eq!(all[0], Square::SQ_11);
        assert_eq!(all[80], Square::SQ_99);
    }

    #[test]
    fn test_square_serde() {
        let sq = Square::new(8, 8).unwrap();
        let json = serde_json::to_string(&sq).unwrap();
        assert_eq!(json, "\"8h\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sq);
    }
}
