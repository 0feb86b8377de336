//! 局面（Position）
//!
//! 盤面・持ち駒・手番・手数の組。`apply` は新しい局面を返し、元の値は変えない。

use crate::board::Board;
use crate::drop::{DropViolation, basic_drop_violation, drop_targets};
use crate::error::{MoveError, SfenError};
use crate::movement::legal_destinations;
use crate::moves::CanonicalMove;
use crate::promotion::{PromotionState, promotion_state};
use crate::sfen;
use crate::types::{Hands, Piece, PieceKind, Side, Square, SquareSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,
    pub hands: Hands,
    /// 手番
    pub turn: Side,
    /// SFEN の手数（初期局面は 1）
    pub ply: u32,
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl Position {
    pub const fn new(board: Board, hands: Hands, turn: Side, ply: u32) -> Self {
        Position {
            board,
            hands,
            turn,
            ply,
        }
    }

    /// 平手初期局面
    pub fn startpos() -> Self {
        Position::new(Board::initial(), Hands::new(), Side::Sente, 1)
    }

    pub fn from_sfen(s: &str) -> Result<Self, SfenError> {
        sfen::parse_sfen(s)
    }

    pub fn to_sfen(&self) -> String {
        sfen::to_sfen(self)
    }

    /// 平手初期局面と同じ配置・手番か（手数は見ない）
    pub fn is_startpos(&self) -> bool {
        self.board == Board::initial() && self.hands.is_empty() && self.turn == Side::Sente
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    pub fn pieces_of(&self, side: Side, kind: PieceKind, promoted: bool) -> SquareSet {
        self.board.pieces(side, kind, promoted)
    }

    /// 指し手を適用した新しい局面
    pub fn apply(&self, mv: &CanonicalMove) -> Result<Position, MoveError> {
        let mut next = *self;
        next.apply_in_place(mv)?;
        Ok(next)
    }

    /// その場で指し手を適用し、取った駒を返す
    ///
    /// 失敗したときは `self` を変更しない。二歩は見ない（`drop::drop_violation` を使う）。
    pub fn apply_in_place(&mut self, mv: &CanonicalMove) -> Result<Option<Piece>, MoveError> {
        let side = self.turn;
        let captured = match *mv {
            CanonicalMove::Normal { from, to, promote } => {
                let piece = self.board.get(from).ok_or(MoveError::NoPiece(from))?;
                if piece.side != side {
                    return Err(MoveError::WrongOwner { square: from, side });
                }
                if self.board.get(to).is_some_and(|p| p.side == side) {
                    return Err(MoveError::IllegalCapture(to));
                }
                if !legal_destinations(&self.board, from, piece).contains(to) {
                    return Err(MoveError::IllegalDestination { from, to });
                }
                let state = self.promotion_state_for(piece, from, to);
                if state.reconcile(Some(promote)).is_err() {
                    return Err(MoveError::IllegalPromotion {
                        kind: piece.kind,
                        state,
                        requested: promote,
                    });
                }

                let captured = self.board.take(to);
                self.board.take(from);
                self.board.put(to, if promote { piece.promote() } else { piece });
                if let Some(captured) = captured {
                    self.hands.add(side, captured.kind);
                }
                captured
            }
            CanonicalMove::Drop { kind, to } => {
                if let Some(violation) = basic_drop_violation(&self.board, side, kind, to) {
                    return Err(MoveError::IllegalDrop {
                        kind,
                        square: to,
                        violation,
                    });
                }
                self.hands.take(side, kind)?;
                self.board.put(to, Piece::new(kind, side));
                None
            }
        };
        self.turn = !side;
        self.ply += 1;
        Ok(captured)
    }

    /// 盤上の駒 `piece` が `from` から `to` へ動くときの成りの可否（成駒は Forbidden）
    pub fn promotion_state_for(&self, piece: Piece, from: Square, to: Square) -> PromotionState {
        if piece.promoted {
            PromotionState::Forbidden
        } else {
            promotion_state(piece.kind, piece.side, from.rank(), to.rank())
        }
    }

    /// 手番側の駒が `sq` から動ける升（手番側の駒でなければ空）
    pub fn legal_targets(&self, sq: Square) -> SquareSet {
        match self.board.get(sq) {
            Some(piece) if piece.side == self.turn => legal_destinations(&self.board, sq, piece),
            _ => SquareSet::EMPTY,
        }
    }

    /// 手番側が `kind` を打てる升（持ち駒になければ空）
    pub fn drop_targets(&self, kind: PieceKind) -> SquareSet {
        if self.hands.count(self.turn, kind) == 0 {
            return SquareSet::EMPTY;
        }
        drop_targets(&self.board, self.turn, kind)
    }

    /// 手番側の駒打ちが規則に触れるか（二歩を含む）
    pub fn drop_violation(&self, kind: PieceKind, to: Square) -> Option<DropViolation> {
        crate::drop::drop_violation(&self.board, self.turn, kind, to)
    }
}
