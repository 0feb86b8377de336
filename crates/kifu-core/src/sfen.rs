//! SFEN（局面文字列）の読み書き

use crate::board::Board;
use crate::error::SfenError;
use crate::position::Position;
use crate::types::{Hands, MAX_HAND_PIECES, Piece, PieceKind, Side, Square};

/// 平手初期局面の SFEN
pub const STARTPOS_SFEN: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFEN を読み込む
///
/// 手数フィールドは `Position::ply` にそのまま入る。持ち駒は駒種ごとの上限で切り詰める。
pub fn parse_sfen(sfen: &str) -> Result<Position, SfenError> {
    let parts: Vec<&str> = sfen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(SfenError::TooFewFields(sfen.to_string()));
    }

    let board = parse_board(parts[0])?;

    let turn = {
        let mut chars = parts[1].chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Side::from_sfen_char(c),
            _ => None,
        }
    }
    .ok_or_else(|| SfenError::InvalidSideToMove(parts[1].to_string()))?;

    let hands = parse_hands(parts[2])?;

    let ply: u32 = parts[3]
        .parse()
        .map_err(|_| SfenError::InvalidMoveCount(parts[3].to_string()))?;
    if ply == 0 {
        return Err(SfenError::InvalidMoveCount("move count must be at least 1".to_string()));
    }

    Ok(Position::new(board, hands, turn, ply))
}

/// 盤面フィールド（9 段目ではなく 1 段目から、各段は 9 筋から 1 筋へ）
fn parse_board(field: &str) -> Result<Board, SfenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 9 {
        return Err(SfenError::InvalidRankCount(ranks.len()));
    }

    let mut board = Board::empty();
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = rank_idx as u8 + 1;
        let invalid = |reason: String| SfenError::InvalidRank {
            rank: rank as usize,
            reason,
        };
        // 左端が 9 筋
        let mut filled: u8 = 0;
        let mut promoted = false;

        for c in rank_str.chars() {
            if filled >= 9 {
                return Err(invalid("extra characters after 9 squares".to_string()));
            }
            if let Some(n) = c.to_digit(10) {
                if promoted {
                    return Err(invalid("'+' must be followed by a piece".to_string()));
                }
                let n = n as u8;
                if n == 0 {
                    return Err(invalid("empty square count 0 is not allowed".to_string()));
                }
                if filled + n > 9 {
                    return Err(invalid(format!("{filled} + {n} empty squares exceeds 9")));
                }
                filled += n;
            } else if c == '+' {
                if promoted {
                    return Err(invalid("repeated '+'".to_string()));
                }
                promoted = true;
            } else {
                let kind = PieceKind::from_usi_char(c).ok_or(SfenError::UnknownPiece(c))?;
                let side = if c.is_ascii_uppercase() {
                    Side::Sente
                } else {
                    Side::Gote
                };
                let piece = Piece::with_state(kind, side, promoted)
                    .ok_or_else(|| invalid(format!("{c} cannot be promoted")))?;
                let file = 9 - filled;
                let sq = Square::new(file, rank).ok_or_else(|| invalid("square out of range".to_string()))?;
                board.put(sq, piece);
                filled += 1;
                promoted = false;
            }
        }

        if promoted {
            return Err(invalid("incomplete promoted piece".to_string()));
        }
        if filled != 9 {
            return Err(invalid(format!("expected 9 squares, got {filled}")));
        }
    }
    Ok(board)
}

/// 持ち駒フィールド（"-" / "2P3l" 等）
fn parse_hands(field: &str) -> Result<Hands, SfenError> {
    let mut hands = Hands::new();
    if field == "-" {
        return Ok(hands);
    }

    let mut count: Option<u32> = None;
    for c in field.chars() {
        if let Some(d) = c.to_digit(10) {
            count = Some(count.unwrap_or(0).saturating_mul(10).saturating_add(d));
            continue;
        }
        let kind = PieceKind::from_usi_char(c)
            .filter(|k| *k != PieceKind::King)
            .ok_or_else(|| SfenError::InvalidHands(field.to_string()))?;
        let side = if c.is_ascii_uppercase() {
            Side::Sente
        } else {
            Side::Gote
        };
        let n = count.take().unwrap_or(1);
        if n == 0 {
            return Err(SfenError::InvalidHands(field.to_string()));
        }
        let max = kind.hand_index().map_or(0, |i| MAX_HAND_PIECES[i]) as u32;
        let total = (hands.count(side, kind) as u32 + n).min(max);
        hands.set(side, kind, total as u8);
    }
    if count.is_some() {
        return Err(SfenError::InvalidHands(field.to_string()));
    }
    Ok(hands)
}

/// 局面を SFEN に変換
pub fn to_sfen(position: &Position) -> String {
    let mut out = String::with_capacity(96);
    out.push_str(&board_to_sfen(&position.board));
    out.push(' ');
    out.push(position.turn.to_sfen_char());
    out.push(' ');
    out.push_str(&hands_to_sfen(&position.hands));
    out.push(' ');
    out.push_str(&position.ply.to_string());
    out
}

/// 盤面フィールドのみ
pub fn board_to_sfen(board: &Board) -> String {
    let mut out = String::with_capacity(72);
    for rank in 1..=9u8 {
        if rank > 1 {
            out.push('/');
        }
        let mut empty = 0;
        for file in (1..=9u8).rev() {
            match Square::new(file, rank).and_then(|sq| board.get(sq)) {
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push_str(&piece.to_sfen());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
    }
    out
}

/// 持ち駒フィールドのみ（先手の大文字が先、各手番内は飛角金銀桂香歩）
pub fn hands_to_sfen(hands: &Hands) -> String {
    if hands.is_empty() {
        return "-".to_string();
    }
    let mut out = String::new();
    for side in Side::ALL {
        for (kind, n) in hands.iter(side) {
            if n > 1 {
                out.push_str(&n.to_string());
            }
            let c = kind.usi_char();
            out.push(match side {
                Side::Sente => c,
                Side::Gote => c.to_ascii_lowercase(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_roundtrip() {
        let pos = parse_sfen(STARTPOS_SFEN).unwrap();
        assert_eq!(pos.board, Board::initial());
        assert_eq!(pos.turn, Side::Sente);
        assert!(pos.hands.is_empty());
        assert_eq!(pos.ply, 1);
        assert_eq!(to_sfen(&pos), STARTPOS_SFEN);
    }

    #[test]
    fn test_promoted_and_hands() {
        let sfen = "lnsgkg1nl/1r5+B1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/7R1/LNSGKGSNL w Bs2p 6";
        let pos = parse_sfen(sfen).unwrap();
        let horse = pos.board.get(Square::from_usi("2b").unwrap()).unwrap();
        assert_eq!(horse, Piece::promoted(PieceKind::Bishop, Side::Sente));
        assert_eq!(pos.hands.count(Side::Sente, PieceKind::Bishop), 1);
        assert_eq!(pos.hands.count(Side::Gote, PieceKind::Silver), 1);
        assert_eq!(pos.hands.count(Side::Gote, PieceKind::Pawn), 2);
        assert_eq!(pos.turn, Side::Gote);
        assert_eq!(pos.ply, 6);
        assert_eq!(to_sfen(&pos), sfen);
    }

    #[test]
    fn test_hands_are_clipped() {
        let pos = parse_sfen("4k4/9/9/9/9/9/9/9/4K4 b 20P3R 1").unwrap();
        assert_eq!(pos.hands.count(Side::Sente, PieceKind::Pawn), 18);
        assert_eq!(pos.hands.count(Side::Sente, PieceKind::Rook), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_sfen("9/9/9 b -"), Err(SfenError::TooFewFields(_))));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9 b - 1"),
            Err(SfenError::InvalidRankCount(8))
        ));
        assert!(matches!(
            parse_sfen("0lnsgkgsnl/9/9/9/9/9/9/9/9 b - 1"),
            Err(SfenError::InvalidRank { rank: 1, .. })
        ));
        assert!(matches!(
            parse_sfen("lnsgkgsnlp/9/9/9/9/9/9/9/9 b - 1"),
            Err(SfenError::InvalidRank { rank: 1, .. })
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/8X b - 1"),
            Err(SfenError::UnknownPiece('X'))
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/8+G b - 1"),
            Err(SfenError::InvalidRank { rank: 9, .. })
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/9 x - 1"),
            Err(SfenError::InvalidSideToMove(_))
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/9 b 2 1"),
            Err(SfenError::InvalidHands(_))
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/9 b K 1"),
            Err(SfenError::InvalidHands(_))
        ));
        assert!(matches!(
            parse_sfen("9/9/9/9/9/9/9/9/9 b - 0"),
            Err(SfenError::InvalidMoveCount(_))
        ));
    }
}
