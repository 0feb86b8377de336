//! KIF の文字（全角数字・漢数字・駒名）

use kifu_core::types::{PieceKind, Square};

const FILES: [char; 9] = ['１', '２', '３', '４', '５', '６', '７', '８', '９'];
const RANKS: [char; 9] = ['一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// 筋の数字（全角・半角）
pub fn file_from_char(c: char) -> Option<u8> {
    match c {
        '1'..='9' => Some(c as u8 - b'0'),
        _ => FILES.iter().position(|&f| f == c).map(|i| i as u8 + 1),
    }
}

/// 段の漢数字（半角数字も受け付ける）
pub fn rank_from_char(c: char) -> Option<u8> {
    match c {
        '1'..='9' => Some(c as u8 - b'0'),
        _ => RANKS.iter().position(|&r| r == c).map(|i| i as u8 + 1),
    }
}

/// "７六" の形
pub fn square_label(sq: Square) -> String {
    let mut s = String::with_capacity(6);
    s.push(FILES[sq.file() as usize - 1]);
    s.push(RANKS[sq.rank() as usize - 1]);
    s
}

/// 漢数字（一〜十八）
pub fn parse_kanji_number(s: &str) -> Option<u8> {
    let digit = |c: char| RANKS.iter().position(|&r| r == c).map(|i| i as u8 + 1);
    let mut chars = s.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (None, _, _) => None,
        (Some('十'), None, _) => Some(10),
        (Some('十'), Some(c), None) => digit(c).map(|d| 10 + d),
        (Some(c), None, _) => digit(c),
        _ => None,
    }
}

pub fn kanji_number(n: u8) -> String {
    match n {
        1..=9 => RANKS[n as usize - 1].to_string(),
        10 => "十".to_string(),
        11..=18 => format!("十{}", RANKS[n as usize - 11]),
        _ => n.to_string(),
    }
}

/// 駒名 → (駒種, 成駒か)
///
/// 棋譜中の表記（成香・杏 など）と局面図の 1 文字表記の両方を受け付ける。
pub fn piece_from_name(name: &str) -> Option<(PieceKind, bool)> {
    use PieceKind::*;
    let pair = match name {
        "歩" => (Pawn, false),
        "香" => (Lance, false),
        "桂" => (Knight, false),
        "銀" => (Silver, false),
        "金" => (Gold, false),
        "角" => (Bishop, false),
        "飛" => (Rook, false),
        "玉" | "王" => (King, false),
        "と" => (Pawn, true),
        "成香" | "杏" => (Lance, true),
        "成桂" | "圭" => (Knight, true),
        "成銀" | "全" => (Silver, true),
        "馬" => (Bishop, true),
        "龍" | "竜" => (Rook, true),
        _ => return None,
    };
    Some(pair)
}

/// 棋譜用の駒名
pub const fn piece_label(kind: PieceKind, promoted: bool) -> &'static str {
    match (kind, promoted) {
        (PieceKind::Pawn, false) => "歩",
        (PieceKind::Pawn, true) => "と",
        (PieceKind::Lance, false) => "香",
        (PieceKind::Lance, true) => "成香",
        (PieceKind::Knight, false) => "桂",
        (PieceKind::Knight, true) => "成桂",
        (PieceKind::Silver, false) => "銀",
        (PieceKind::Silver, true) => "成銀",
        (PieceKind::Gold, _) => "金",
        (PieceKind::Bishop, false) => "角",
        (PieceKind::Bishop, true) => "馬",
        (PieceKind::Rook, false) => "飛",
        (PieceKind::Rook, true) => "龍",
        (PieceKind::King, _) => "玉",
    }
}

/// 局面図用の 1 文字の駒名
pub const fn piece_glyph(kind: PieceKind, promoted: bool) -> char {
    match (kind, promoted) {
        (PieceKind::Lance, true) => '杏',
        (PieceKind::Knight, true) => '圭',
        (PieceKind::Silver, true) => '全',
        (PieceKind::Pawn, true) => 'と',
        (PieceKind::Pawn, false) => '歩',
        (PieceKind::Lance, false) => '香',
        (PieceKind::Knight, false) => '桂',
        (PieceKind::Silver, false) => '銀',
        (PieceKind::Gold, _) => '金',
        (PieceKind::Bishop, false) => '角',
        (PieceKind::Bishop, true) => '馬',
        (PieceKind::Rook, false) => '飛',
        (PieceKind::Rook, true) => '龍',
        (PieceKind::King, _) => '玉',
    }
}
