//! KIF 形式の書き出し

use std::io::{self, Write};

use kifu_core::error::MoveError;
use kifu_core::promotion::PromotionState;
use kifu_core::types::{Side, Square};
use kifu_core::{CanonicalMove, Handicap, Position, Timeline};

use crate::info::{GameInfo, Termination};
use crate::kanji::{kanji_number, piece_glyph, piece_label, square_label};

const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// 1 手を KIF の表記にする（例: `▲７六歩(77)`, `△同　銀(31)`, `▲５五角打`）
///
/// `previous` は直前の手の移動先で、同じ升なら「同」と書く。
pub fn format_kif_move(
    position: &Position,
    mv: &CanonicalMove,
    previous: Option<Square>,
) -> Result<String, MoveError> {
    let prefix = match position.turn {
        Side::Sente => "▲",
        Side::Gote => "△",
    };
    let to = mv.to();
    let dest = if previous == Some(to) {
        "同　".to_string()
    } else {
        square_label(to)
    };
    let (label, suffix) = match *mv {
        CanonicalMove::Drop { kind, .. } => (format!("{}打", piece_label(kind, false)), String::new()),
        CanonicalMove::Normal { from, to, promote } => {
            let piece = position.piece_at(from).ok_or(MoveError::NoPiece(from))?;
            let mut label = piece_label(piece.kind, piece.promoted).to_string();
            if promote {
                label.push('成');
            } else if position.promotion_state_for(piece, from, to) == PromotionState::Optional {
                label.push_str("不成");
            }
            (label, format!("({}{})", from.file(), from.rank()))
        }
    };
    Ok(format!("{prefix}{dest}{label}{suffix}"))
}

/// 棋譜全体を KIF で書き出す
///
/// 平手・駒落ちの開始局面は「手合割」で、それ以外は局面図で書く。
pub fn write_kif<W: Write>(writer: &mut W, info: &GameInfo, timeline: &Timeline) -> io::Result<()> {
    if let Some(start_time) = info.start_time {
        writeln!(writer, "開始日時：{}", start_time.format(DATETIME_FORMAT))?;
    }
    if let Some(end_time) = info.end_time {
        writeln!(writer, "終了日時：{}", end_time.format(DATETIME_FORMAT))?;
    }
    if let Some(event) = &info.event {
        writeln!(writer, "棋戦：{event}")?;
    }

    let start = timeline.start();
    match Handicap::ALL.into_iter().find(|h| h.sfen() == start.to_sfen()) {
        Some(handicap) => writeln!(writer, "手合割：{}", handicap.kif_name())?,
        None => write_bod(writer, start)?,
    }
    writeln!(writer, "先手：{}", info.sente.as_deref().unwrap_or(""))?;
    writeln!(writer, "後手：{}", info.gote.as_deref().unwrap_or(""))?;
    writeln!(writer, "手数----指手---------消費時間--")?;

    let mut previous = None;
    for (ply, (position, mv)) in (0..timeline.len()).filter_map(|i| timeline.step(i)).enumerate() {
        let text = format_kif_move(position, &mv, previous)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{:>4} {}", ply + 1, text)?;
        previous = Some(mv.to());
    }

    let plies = timeline.len();
    if let Some(result) = &info.result {
        if result.termination != Termination::Other {
            writeln!(writer, "{:>4} {}", plies + 1, result.termination.kif_word())?;
        }
        match result.winner {
            Some(Side::Sente) => writeln!(writer, "まで{plies}手で先手の勝ち")?,
            Some(Side::Gote) => writeln!(writer, "まで{plies}手で後手の勝ち")?,
            None if result.termination == Termination::Other => writeln!(writer, "まで{plies}手")?,
            None => writeln!(writer, "まで{plies}手で{}", result.termination.kif_word())?,
        }
    }
    Ok(())
}

/// 局面図（BOD）
fn write_bod<W: Write>(writer: &mut W, position: &Position) -> io::Result<()> {
    writeln!(writer, "後手の持駒：{}", hand_text(position, Side::Gote))?;
    writeln!(writer, "  ９ ８ ７ ６ ５ ４ ３ ２ １")?;
    writeln!(writer, "+---------------------------+")?;
    for rank in 1..=9u8 {
        let mut row = String::from("|");
        for file in (1..=9u8).rev() {
            let piece = Square::new(file, rank).and_then(|sq| position.piece_at(sq));
            match piece {
                Some(p) => {
                    row.push(if p.side == Side::Gote { 'v' } else { ' ' });
                    row.push(piece_glyph(p.kind, p.promoted));
                }
                None => row.push_str(" ・"),
            }
        }
        row.push('|');
        row.push_str(&kanji_number(rank));
        writeln!(writer, "{row}")?;
    }
    writeln!(writer, "+---------------------------+")?;
    writeln!(writer, "先手の持駒：{}", hand_text(position, Side::Sente))?;
    if position.turn == Side::Gote {
        writeln!(writer, "後手番")?;
    }
    Ok(())
}

fn hand_text(position: &Position, side: Side) -> String {
    let items: Vec<String> = position
        .hands
        .iter(side)
        .map(|(kind, n)| {
            let name = piece_label(kind, false);
            if n == 1 {
                name.to_string()
            } else {
                format!("{name}{}", kanji_number(n))
            }
        })
        .collect();
    if items.is_empty() {
        "なし".to_string()
    } else {
        items.join("　")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::GameResult;
    use crate::kif::parse_kif;

    fn mv(s: &str) -> CanonicalMove {
        CanonicalMove::from_usi(s).unwrap()
    }

    #[test]
    fn test_format_moves() {
        let pos = Position::startpos();
        assert_eq!(format_kif_move(&pos, &mv("7g7f"), None).unwrap(), "▲７六歩(77)");
        let pos = pos.apply(&mv("7g7f")).unwrap();
        assert_eq!(format_kif_move(&pos, &mv("3c3d"), None).unwrap(), "△３四歩(33)");
        let pos = pos.apply(&mv("3c3d")).unwrap();
        assert_eq!(format_kif_move(&pos, &mv("8h2b+"), None).unwrap(), "▲２二角成(88)");
        assert_eq!(format_kif_move(&pos, &mv("8h2b"), None).unwrap(), "▲２二角不成(88)");
        let pos = pos.apply(&mv("8h2b+")).unwrap();
        assert_eq!(format_kif_move(&pos, &mv("3a2b"), Some(mv("8h2b+").to())).unwrap(), "△同　銀(31)");
        assert!(format_kif_move(&pos, &mv("5e5d"), None).is_err());
    }

    #[test]
    fn test_format_drop() {
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b B 1").unwrap();
        assert_eq!(format_kif_move(&pos, &mv("B*5e"), None).unwrap(), "▲５五角打");
    }

    #[test]
    fn test_write_kif_round_trip() {
        let mut timeline = Timeline::new(Position::startpos());
        for m in ["7g7f", "3c3d", "8h2b+", "3a2b"] {
            timeline.push(mv(m)).unwrap();
        }
        let info = GameInfo {
            sente: Some("A".to_string()),
            gote: Some("B".to_string()),
            result: Some(GameResult {
                termination: Termination::Resign,
                plies: Some(4),
                winner: Some(Side::Gote),
            }),
            ..GameInfo::default()
        };
        let mut out = Vec::new();
        write_kif(&mut out, &info, &timeline).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("手合割：平手"));
        assert!(text.contains("   4 △同　銀(31)"));
        assert!(text.contains("   5 投了"));
        assert!(text.contains("まで4手で後手の勝ち"));

        let game = parse_kif(&text);
        assert!(game.warnings.is_empty(), "{:?}", game.warnings);
        assert_eq!(game.moves.len(), 4);
        assert_eq!(game.info.sente.as_deref(), Some("A"));
        assert_eq!(game.info.result.unwrap().winner, Some(Side::Gote));
    }

    #[test]
    fn test_write_bod_for_custom_start() {
        let start = Position::from_sfen("4k4/9/4P4/9/9/9/9/9/4K4 w G2P 1").unwrap();
        let timeline = Timeline::new(start);
        let mut out = Vec::new();
        write_kif(&mut out, &GameInfo::default(), &timeline).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("| ・ ・ ・ ・v玉 ・ ・ ・ ・|一"));
        assert!(text.contains("先手の持駒：金　歩二"));
        assert!(text.contains("後手番"));

        let game = parse_kif(&text);
        assert_eq!(game.start, start);
    }
}
