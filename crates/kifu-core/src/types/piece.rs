//! 駒種（PieceKind）と駒（Piece）

use serde::{Deserialize, Serialize};

use super::Side;

/// 駒種（生駒 8 種、先後の区別なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Lance = 1,
    Knight = 2,
    Silver = 3,
    Gold = 4,
    Bishop = 5,
    Rook = 6,
    King = 7,
}

impl PieceKind {
    /// 駒種の数
    pub const NUM: usize = 8;

    pub const ALL: [PieceKind; 8] = [
        PieceKind::Pawn,
        PieceKind::Lance,
        PieceKind::Knight,
        PieceKind::Silver,
        PieceKind::Gold,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::King,
    ];

    /// 手駒になる駒種（SFEN の持ち駒の並び順）
    pub const HAND_ORDER: [PieceKind; 7] = [
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Gold,
        PieceKind::Silver,
        PieceKind::Knight,
        PieceKind::Lance,
        PieceKind::Pawn,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 持ち駒配列のインデックス（King は None）
    #[inline]
    pub const fn hand_index(self) -> Option<usize> {
        match self {
            PieceKind::King => None,
            _ => Some(self as usize),
        }
    }

    /// 成れるかどうか（金・玉以外）
    #[inline]
    pub const fn can_promote(self) -> bool {
        !matches!(self, PieceKind::Gold | PieceKind::King)
    }

    /// USI/SFEN の駒文字（大文字）
    pub const fn usi_char(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Lance => 'L',
            PieceKind::Knight => 'N',
            PieceKind::Silver => 'S',
            PieceKind::Gold => 'G',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::King => 'K',
        }
    }

    /// USI/SFEN の駒文字から変換（大文字小文字は区別しない）
    pub fn from_usi_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'L' => Some(PieceKind::Lance),
            'N' => Some(PieceKind::Knight),
            'S' => Some(PieceKind::Silver),
            'G' => Some(PieceKind::Gold),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// CSA の駒コード → (駒種, 成駒か)
    pub fn from_csa(code: &str) -> Option<(PieceKind, bool)> {
        use PieceKind::*;
        let pair = match code {
            "FU" => (Pawn, false),
            "KY" => (Lance, false),
            "KE" => (Knight, false),
            "GI" => (Silver, false),
            "KI" => (Gold, false),
            "KA" => (Bishop, false),
            "HI" => (Rook, false),
            "OU" => (King, false),
            "TO" => (Pawn, true),
            "NY" => (Lance, true),
            "NK" => (Knight, true),
            "NG" => (Silver, true),
            "UM" => (Bishop, true),
            "RY" => (Rook, true),
            _ => return None,
        };
        Some(pair)
    }

    /// CSA の駒コード
    pub const fn csa_code(self, promoted: bool) -> &'static str {
        use PieceKind::*;
        match (self, promoted) {
            (Pawn, false) => "FU",
            (Pawn, true) => "TO",
            (Lance, false) => "KY",
            (Lance, true) => "NY",
            (Knight, false) => "KE",
            (Knight, true) => "NK",
            (Silver, false) => "GI",
            (Silver, true) => "NG",
            (Gold, _) => "KI",
            (Bishop, false) => "KA",
            (Bishop, true) => "UM",
            (Rook, false) => "HI",
            (Rook, true) => "RY",
            (King, _) => "OU",
        }
    }
}

/// 盤上の駒
///
/// `promoted == true` なら `kind.can_promote()` が成り立つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub promoted: bool,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Piece {
            kind,
            side,
            promoted: false,
        }
    }

    /// 成りを指定して生成（成れない駒種の成駒なら `None`）
    #[inline]
    pub const fn with_state(kind: PieceKind, side: Side, promoted: bool) -> Option<Self> {
        if promoted && !kind.can_promote() {
            return None;
        }
        Some(Piece {
            kind,
            side,
            promoted,
        })
    }

    /// 成駒を生成（成れない駒種なら生駒のまま）
    #[inline]
    pub const fn promoted(kind: PieceKind, side: Side) -> Self {
        Piece {
            kind,
            side,
            promoted: kind.can_promote(),
        }
    }

    /// 成った駒を返す
    #[inline]
    pub fn promote(self) -> Self {
        Piece {
            promoted: self.kind.can_promote(),
            ..self
        }
    }

    /// 金と同じ動きをする駒か（金・と・成香・成桂・成銀）
    #[inline]
    pub const fn moves_like_gold(self) -> bool {
        match self.kind {
            PieceKind::Gold => true,
            PieceKind::Pawn | PieceKind::Lance | PieceKind::Knight | PieceKind::Silver => {
                self.promoted
            }
            _ => false,
        }
    }

    /// SFEN の駒表記（"+p", "K" 等）
    pub fn to_sfen(self) -> String {
        let c = match self.side {
            Side::Sente => self.kind.usi_char(),
            Side::Gote => self.kind.usi_char().to_ascii_lowercase(),
        };
        if self.promoted { format!("+{c}") } else { c.to_string() }
    }
}
