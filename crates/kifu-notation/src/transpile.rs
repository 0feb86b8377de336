//! 記法の指し手を局面に沿って USI の指し手に変換する（Replay Driver）
//!
//! 1 手ずつ移動元と成りを決め、局面に適用して次の手に進む。最初に失敗した手で止まる。

use std::iter::FusedIterator;

use kifu_core::drop::DropViolation;
use kifu_core::error::MoveError;
use kifu_core::{CanonicalMove, Position, Timeline};
use serde::{Deserialize, Serialize};

use crate::error::{PlyError, TranspileError};
use crate::intent::IntendedMove;
use crate::resolve::{candidates, resolve_origin};

/// 変換の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// 二歩をエラーにする（false なら警告ログのみ）
    pub reject_double_pawn: bool,
    /// 記法の手番記号と局面の手番を突き合わせる
    pub check_turn: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        TranspileOptions {
            reject_double_pawn: false,
            check_turn: true,
        }
    }
}

/// 変換した 1 手
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 0 始まり
    pub ply: usize,
    pub mv: CanonicalMove,
    /// 着手後の局面
    pub position: Position,
}

/// 1 手変換する。成功すれば指し手と着手後の局面を返す
pub fn transpile_ply(
    position: &Position,
    intent: &IntendedMove,
    options: &TranspileOptions,
) -> Result<(CanonicalMove, Position), PlyError> {
    if intent.side != position.turn {
        if options.check_turn {
            return Err(PlyError::TurnMismatch {
                expected: position.turn,
                found: intent.side,
            });
        }
        log::debug!("{:?} moves out of turn; treating as {:?}", intent.side, position.turn);
        let mut own = intent.clone();
        own.side = position.turn;
        return transpile_ply(position, &own, options);
    }

    let destination = intent.destination;
    if position.piece_at(destination).is_some_and(|p| p.side == intent.side) {
        return Err(MoveError::IllegalCapture(destination).into());
    }

    let mv = if intent.is_drop || is_implicit_drop(position, intent) {
        drop_move(position, intent, options)?
    } else {
        let from = resolve_origin(&position.board, intent)?;
        let piece = position.piece_at(from).ok_or(MoveError::NoPiece(from))?;
        let requested = intent.requested_promotion(piece);
        let state = position.promotion_state_for(piece, from, destination);
        let promote = state
            .reconcile(requested)
            .map_err(|state| MoveError::IllegalPromotion {
                kind: piece.kind,
                state,
                requested: requested.unwrap_or(false),
            })?;
        CanonicalMove::normal(from, destination, promote)
    };

    let next = position.apply(&mv)?;
    Ok((mv, next))
}

/// 「打」のない駒打ち（KI2 では盤上の駒が動けないときに省かれる）
fn is_implicit_drop(position: &Position, intent: &IntendedMove) -> bool {
    intent.origin.is_none()
        && !intent.promoted
        && position.hands.count(intent.side, intent.kind) > 0
        && candidates(&position.board, intent).is_empty()
}

fn drop_move(
    position: &Position,
    intent: &IntendedMove,
    options: &TranspileOptions,
) -> Result<CanonicalMove, MoveError> {
    let (kind, to) = (intent.kind, intent.destination);
    match position.drop_violation(kind, to) {
        None => {}
        Some(DropViolation::DoublePawn) if !options.reject_double_pawn => {
            log::warn!("{:?} drops a second pawn on file {}", intent.side, to.file());
        }
        Some(violation) => {
            return Err(MoveError::IllegalDrop {
                kind,
                square: to,
                violation,
            });
        }
    }
    Ok(CanonicalMove::drop(kind, to))
}

/// 指し手を順に変換するイテレータ
///
/// エラーを 1 度返した後は何も返さない。
#[derive(Debug, Clone)]
pub struct Transpiler<I> {
    position: Position,
    moves: I,
    ply: usize,
    options: TranspileOptions,
    failed: bool,
}

impl<I> Transpiler<I> {
    pub fn new(start: Position, moves: I, options: TranspileOptions) -> Self {
        Transpiler {
            position: start,
            moves,
            ply: 0,
            options,
            failed: false,
        }
    }

    /// 直前に変換した手の後の局面
    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl<'a, I> Iterator for Transpiler<I>
where
    I: Iterator<Item = &'a IntendedMove>,
{
    type Item = Result<Step, TranspileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let intent = self.moves.next()?;
        let ply = self.ply;
        match transpile_ply(&self.position, intent, &self.options) {
            Ok((mv, next)) => {
                log::trace!("ply {ply}: {mv}");
                self.position = next;
                self.ply += 1;
                Some(Ok(Step {
                    ply,
                    mv,
                    position: next,
                }))
            }
            Err(source) => {
                self.failed = true;
                let err = TranspileError {
                    ply,
                    line: intent.line,
                    source,
                };
                log::warn!("{err}");
                Some(Err(err))
            }
        }
    }
}

impl<'a, I> FusedIterator for Transpiler<I> where I: Iterator<Item = &'a IntendedMove> {}

/// 平手初期局面から変換する
pub fn transpile(moves: &[IntendedMove]) -> Result<Vec<CanonicalMove>, TranspileError> {
    transpile_from(&Position::startpos(), moves, TranspileOptions::default())
}

/// 任意の局面から変換する
pub fn transpile_from(
    start: &Position,
    moves: &[IntendedMove],
    options: TranspileOptions,
) -> Result<Vec<CanonicalMove>, TranspileError> {
    Transpiler::new(*start, moves.iter(), options)
        .map(|step| step.map(|s| s.mv))
        .collect()
}

/// 変換しながら局面の履歴を作る
pub fn replay(
    start: &Position,
    moves: &[IntendedMove],
    options: TranspileOptions,
) -> Result<Timeline, TranspileError> {
    let mut timeline = Timeline::new(*start);
    for step in Transpiler::new(*start, moves.iter(), options) {
        let step = step?;
        timeline.push_unchecked(step.mv, step.position);
    }
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::intent::{DirectionHint, Lateral};
    use kifu_core::types::{PieceKind, Side, Square};

    fn sq(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    fn intent(side: Side, kind: PieceKind, dest: &str) -> IntendedMove {
        IntendedMove {
            side,
            kind,
            promoted: false,
            names_arrival: false,
            origin: None,
            destination: sq(dest),
            is_drop: false,
            promote: None,
            hint: None,
            line: None,
        }
    }

    fn usi(moves: &[CanonicalMove]) -> Vec<String> {
        moves.iter().map(|m| m.to_usi()).collect()
    }

    #[test]
    fn test_opening_moves() {
        let moves = [
            intent(Side::Sente, PieceKind::Pawn, "7f"),
            intent(Side::Gote, PieceKind::Pawn, "3d"),
            intent(Side::Sente, PieceKind::Pawn, "2f"),
        ];
        assert_eq!(usi(&transpile(&moves).unwrap()), ["7g7f", "3c3d", "2g2f"]);
    }

    #[test]
    fn test_turn_mismatch() {
        let moves = [
            intent(Side::Sente, PieceKind::Pawn, "7f"),
            intent(Side::Sente, PieceKind::Pawn, "2f"),
        ];
        let err = transpile(&moves).unwrap_err();
        assert_eq!(err.ply, 1);
        assert_eq!(
            err.source,
            PlyError::TurnMismatch {
                expected: Side::Gote,
                found: Side::Sente
            }
        );

        let lenient = TranspileOptions {
            check_turn: false,
            ..TranspileOptions::default()
        };
        let moves = [
            intent(Side::Sente, PieceKind::Pawn, "7f"),
            intent(Side::Sente, PieceKind::Pawn, "3d"),
        ];
        let out = transpile_from(&Position::startpos(), &moves, lenient).unwrap();
        assert_eq!(usi(&out), ["7g7f", "3c3d"]);
    }

    #[test]
    fn test_capture_and_hand_drop() {
        // ▲７六歩 △３四歩 ▲２二角成 △同銀 ▲４五角打
        let mut capture = intent(Side::Sente, PieceKind::Bishop, "2b");
        capture.promote = Some(true);
        let mut drop = intent(Side::Sente, PieceKind::Bishop, "4e");
        drop.is_drop = true;
        let moves = [
            intent(Side::Sente, PieceKind::Pawn, "7f"),
            intent(Side::Gote, PieceKind::Pawn, "3d"),
            capture,
            intent(Side::Gote, PieceKind::Silver, "2b"),
            drop,
        ];
        let timeline = replay(&Position::startpos(), &moves, TranspileOptions::default()).unwrap();
        assert_eq!(usi(timeline.moves()), ["7g7f", "3c3d", "8h2b+", "3a2b", "B*4e"]);
        assert_eq!(timeline.last().hands.count(Side::Gote, PieceKind::Bishop), 1);
        assert_eq!(timeline.last().hands.count(Side::Sente, PieceKind::Bishop), 0);
    }

    #[test]
    fn test_implicit_drop() {
        let start = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b G 1").unwrap();
        let moves = [intent(Side::Sente, PieceKind::Gold, "8h")];
        let out = transpile_from(&start, &moves, TranspileOptions::default()).unwrap();
        assert_eq!(usi(&out), ["G*8h"]);
    }

    #[test]
    fn test_forced_promotion() {
        let start = Position::from_sfen("k8/4P4/9/9/9/9/9/9/4K4 b - 1").unwrap();
        let moves = [intent(Side::Sente, PieceKind::Pawn, "5a")];
        let out = transpile_from(&start, &moves, TranspileOptions::default()).unwrap();
        assert_eq!(usi(&out), ["5b5a+"]);

        let mut refused = intent(Side::Sente, PieceKind::Pawn, "5a");
        refused.promote = Some(false);
        let err = transpile_from(&start, &[refused], TranspileOptions::default()).unwrap_err();
        assert!(matches!(err.source, PlyError::Move(MoveError::IllegalPromotion { .. })));
    }

    #[test]
    fn test_optional_promotion_defaults_to_unpromoted() {
        let start = Position::from_sfen("k8/9/9/4S4/9/9/9/9/4K4 b - 1").unwrap();
        let out = transpile_from(&start, &[intent(Side::Sente, PieceKind::Silver, "5c")], TranspileOptions::default())
            .unwrap();
        assert_eq!(usi(&out), ["5d5c"]);
    }

    #[test]
    fn test_double_pawn_policy() {
        let start = Position::from_sfen("4k4/9/9/9/9/9/4P4/9/4K4 b P 1").unwrap();
        let mut drop = intent(Side::Sente, PieceKind::Pawn, "5e");
        drop.is_drop = true;
        let lenient = transpile_from(&start, &[drop.clone()], TranspileOptions::default()).unwrap();
        assert_eq!(usi(&lenient), ["P*5e"]);

        let strict = TranspileOptions {
            reject_double_pawn: true,
            ..TranspileOptions::default()
        };
        let err = transpile_from(&start, &[drop], strict).unwrap_err();
        assert!(matches!(
            err.source,
            PlyError::Move(MoveError::IllegalDrop {
                violation: DropViolation::DoublePawn,
                ..
            })
        ));
    }

    #[test]
    fn test_own_piece_at_destination() {
        let moves = [intent(Side::Sente, PieceKind::Gold, "5i")];
        let err = transpile(&moves).unwrap_err();
        assert_eq!(err.source, PlyError::Move(MoveError::IllegalCapture(sq("5i"))));
    }

    #[test]
    fn test_explicit_origin_must_reach() {
        let mut m = intent(Side::Sente, PieceKind::Pawn, "7e");
        m.origin = Some(sq("7g"));
        m.line = Some(12);
        let err = transpile(&[m]).unwrap_err();
        assert_eq!(err.line, Some(12));
        assert!(matches!(err.source, PlyError::Move(MoveError::IllegalDestination { .. })));
    }

    #[test]
    fn test_stops_after_first_error() {
        let moves = [
            intent(Side::Sente, PieceKind::Bishop, "5e"),
            intent(Side::Gote, PieceKind::Pawn, "3d"),
        ];
        let results: Vec<_> = Transpiler::new(Position::startpos(), moves.iter(), TranspileOptions::default()).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            &results[0],
            Err(TranspileError {
                ply: 0,
                source: PlyError::Resolve(ResolveError::NoLegalOrigin { .. }),
                ..
            })
        ));
    }

    #[test]
    fn test_hint_resolution_in_replay() {
        // 先手の金 4九・6九 → 5八「右」
        let start = Position::from_sfen("4k4/9/9/9/9/9/9/9/3GKG3 b - 1").unwrap();
        let mut m = intent(Side::Sente, PieceKind::Gold, "5h");
        m.hint = Some(DirectionHint {
            lateral: Some(Lateral::Right),
            vertical: None,
        });
        let out = transpile_from(&start, &[m], TranspileOptions::default()).unwrap();
        assert_eq!(usi(&out), ["4i5h"]);
    }
}
