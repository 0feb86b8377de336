//! 編集画面向けの盤面 JSON

use serde::{Deserialize, Serialize};

use crate::moves::CanonicalMove;
use crate::position::Position;
use crate::record::{CanonicalRecord, RecordReplayError};
use crate::timeline::Timeline;
use crate::types::{Hands, Piece, PieceKind, Side, Square};

/// 駒の JSON 表現
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PieceJson {
    /// "sente" | "gote"
    pub owner: Side,
    /// "K" | "R" | "B" | "G" | "S" | "N" | "L" | "P"
    #[serde(rename = "type")]
    pub piece_type: String,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub promoted: bool,
}

impl From<Piece> for PieceJson {
    fn from(piece: Piece) -> Self {
        PieceJson {
            owner: piece.side,
            piece_type: piece.kind.usi_char().to_string(),
            promoted: piece.promoted,
        }
    }
}

/// 盤面の 1 マス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellJson {
    pub square: Square,
    /// 駒（存在しない場合は null）
    pub piece: Option<PieceJson>,
}

/// 片方の持ち駒
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HandJson {
    #[serde(rename = "R", skip_serializing_if = "Option::is_none")]
    pub rook: Option<u8>,
    #[serde(rename = "B", skip_serializing_if = "Option::is_none")]
    pub bishop: Option<u8>,
    #[serde(rename = "G", skip_serializing_if = "Option::is_none")]
    pub gold: Option<u8>,
    #[serde(rename = "S", skip_serializing_if = "Option::is_none")]
    pub silver: Option<u8>,
    #[serde(rename = "N", skip_serializing_if = "Option::is_none")]
    pub knight: Option<u8>,
    #[serde(rename = "L", skip_serializing_if = "Option::is_none")]
    pub lance: Option<u8>,
    #[serde(rename = "P", skip_serializing_if = "Option::is_none")]
    pub pawn: Option<u8>,
}

impl HandJson {
    fn from_hands(hands: &Hands, side: Side) -> Self {
        let mut json = HandJson::default();
        for (kind, n) in hands.iter(side) {
            let slot = match kind {
                PieceKind::Rook => &mut json.rook,
                PieceKind::Bishop => &mut json.bishop,
                PieceKind::Gold => &mut json.gold,
                PieceKind::Silver => &mut json.silver,
                PieceKind::Knight => &mut json.knight,
                PieceKind::Lance => &mut json.lance,
                PieceKind::Pawn => &mut json.pawn,
                PieceKind::King => continue,
            };
            *slot = Some(n);
        }
        json
    }
}

/// 両者の持ち駒
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandsJson {
    pub sente: HandJson,
    pub gote: HandJson,
}

/// 盤面全体の状態
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardStateJson {
    /// 段ごとの行（1 段目から）。各行は 9 筋から 1 筋の順
    pub cells: Vec<Vec<CellJson>>,
    pub hands: HandsJson,
    pub turn: Side,
    pub ply: u32,
}

impl From<&Position> for BoardStateJson {
    fn from(position: &Position) -> Self {
        let cells = (1..=9u8)
            .map(|rank| {
                (1..=9u8)
                    .rev()
                    .filter_map(|file| Square::new(file, rank))
                    .map(|square| CellJson {
                        square,
                        piece: position.piece_at(square).map(PieceJson::from),
                    })
                    .collect()
            })
            .collect();
        BoardStateJson {
            cells,
            hands: HandsJson {
                sente: HandJson::from_hands(&position.hands, Side::Sente),
                gote: HandJson::from_hands(&position.hands, Side::Gote),
            },
            turn: position.turn,
            ply: position.ply,
        }
    }
}

/// 棋譜を再生した結果
///
/// 途中で失敗した場合は失敗直前までの局面と、エラーメッセージを持つ。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplayResultJson {
    pub applied: Vec<CanonicalMove>,
    pub last_ply: usize,
    pub board: BoardStateJson,
    pub error: Option<String>,
}

impl ReplayResultJson {
    pub fn from_record(record: &CanonicalRecord) -> Result<Self, RecordReplayError> {
        let start = record.start.position()?;
        let mut timeline = Timeline::new(start);
        let mut error = None;
        for (ply, mv) in record.moves.iter().enumerate() {
            if let Err(source) = timeline.push(*mv) {
                error = Some(RecordReplayError::Move { ply, source }.to_string());
                break;
            }
        }
        Ok(ReplayResultJson {
            applied: timeline.moves().to_vec(),
            last_ply: timeline.len(),
            board: BoardStateJson::from(timeline.last()),
            error,
        })
    }
}

/// 手番側の `square` の駒が動ける升（升の順）
pub fn legal_targets(position: &Position, square: Square) -> Vec<Square> {
    position.legal_targets(square).iter().collect()
}

/// 手番側が `kind` を打てる升（升の順）
pub fn drop_targets(position: &Position, kind: PieceKind) -> Vec<Square> {
    position.drop_targets(kind).iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_state_json() {
        let json = BoardStateJson::from(&Position::startpos());
        assert_eq!(json.cells.len(), 9);
        assert_eq!(json.cells[0][0].square, Square::from_usi("9a").unwrap());
        assert_eq!(json.cells[8][8].square, Square::from_usi("1i").unwrap());
        let king = json.cells[8][4].piece.clone().unwrap();
        assert_eq!(king.owner, Side::Sente);
        assert_eq!(king.piece_type, "K");

        let value = serde_json::to_value(&json).unwrap();
        assert_eq!(value["turn"], "sente");
        assert_eq!(value["cells"][0][0]["square"], "9a");
        assert_eq!(value["cells"][0][0]["piece"]["owner"], "gote");
        assert!(value["cells"][0][0]["piece"].get("promoted").is_none());
        assert!(value["cells"][4][4]["piece"].is_null());
        assert_eq!(value["hands"]["sente"], serde_json::json!({}));
    }

    #[test]
    fn test_replay_result_stops_at_error() {
        let record: CanonicalRecord = "startpos moves 7g7f 3c3d 8h2b+ 3a2b 7f7d".parse().unwrap();
        let result = ReplayResultJson::from_record(&record).unwrap();
        assert_eq!(result.last_ply, 4);
        assert!(result.error.as_deref().unwrap().starts_with("move #4"));
        assert_eq!(result.board.hands.sente.bishop, Some(1));
        assert_eq!(result.board.hands.gote.bishop, Some(1));
    }

    #[test]
    fn test_targets() {
        let pos = Position::startpos();
        assert_eq!(
            legal_targets(&pos, Square::from_usi("2h").unwrap()),
            ["1h", "3h", "4h", "5h", "6h", "7h"]
                .iter()
                .map(|s| Square::from_usi(s).unwrap())
                .collect::<Vec<_>>()
        );
        assert!(drop_targets(&pos, PieceKind::Pawn).is_empty());
    }
}
