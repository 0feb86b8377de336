//! CSA 形式の読み込み
//!
//! 1 行に複数の文を `,` で並べられる。指し手 `+7776FU` の駒コードは着手後の駒を表すので、
//! 成りは移動元の駒と見比べて決める（`IntendedMove::names_arrival`）。

use kifu_core::types::{MAX_HAND_PIECES, PieceKind, Side, Square};
use kifu_core::{Board, Hands, Piece, Position};

use crate::info::{GameResult, Termination, parse_timestamp};
use crate::intent::{IntendedMove, LineIssue, LineWarning, ParsedGame};

/// CSA のテキスト 1 局分を読む
///
/// `/`（対局の区切り）か `%` の終局コマンドで読み込みを終える。
pub fn parse_csa(text: &str) -> ParsedGame {
    let mut parser = CsaParser::default();
    'lines: for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();
        if line.starts_with('\'') {
            continue;
        }
        for statement in line.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !parser.statement(line_no, statement) {
                break 'lines;
            }
        }
    }
    parser.finish()
}

fn side_of(c: u8) -> Option<Side> {
    match c {
        b'+' => Some(Side::Sente),
        b'-' => Some(Side::Gote),
        _ => None,
    }
}

/// 開始局面の組み立て
#[derive(Debug)]
struct StartBuilder {
    board: Board,
    hands: Hands,
    turn: Side,
    /// P 行が 1 つでもあったか
    defined: bool,
}

impl Default for StartBuilder {
    fn default() -> Self {
        StartBuilder {
            board: Board::empty(),
            hands: Hands::new(),
            turn: Side::Sente,
            defined: false,
        }
    }
}

impl StartBuilder {
    fn position(&self) -> Position {
        if self.defined {
            Position::new(self.board, self.hands, self.turn, 1)
        } else {
            let mut position = Position::startpos();
            position.turn = self.turn;
            position
        }
    }

    /// 盤上と駒台にない駒をすべて `side` の持ち駒にする（`00AL`）
    fn give_rest(&mut self, side: Side) {
        for kind in PieceKind::HAND_ORDER {
            let Some(idx) = kind.hand_index() else {
                continue;
            };
            let on_board = self.board.iter().filter(|(_, p)| p.kind == kind).count();
            let in_hands: usize = Side::ALL
                .iter()
                .map(|&s| usize::from(self.hands.count(s, kind)))
                .sum();
            let limit = MAX_HAND_PIECES[idx];
            let rest = usize::from(limit).saturating_sub(on_board + in_hands) as u8;
            let count = self.hands.count(side, kind).saturating_add(rest).min(limit);
            self.hands.set(side, kind, count);
        }
    }
}

#[derive(Default)]
struct CsaParser {
    game: ParsedGame,
    start: StartBuilder,
    /// 最初の指し手を読んだ後は開始局面を変えない
    next_side: Option<Side>,
}

impl CsaParser {
    /// 文を 1 つ読む。false なら読み込みを終える
    fn statement(&mut self, line_no: usize, s: &str) -> bool {
        let bytes = s.as_bytes();
        match bytes[0] {
            b'V' => log::debug!("line {line_no}: CSA version {}", &s[1..]),
            b'N' if s.len() >= 2 => match side_of(bytes[1]) {
                Some(Side::Sente) => self.game.info.sente = Some(s[2..].to_string()),
                Some(Side::Gote) => self.game.info.gote = Some(s[2..].to_string()),
                None => self.warn(line_no, s, LineIssue::MalformedToken),
            },
            b'$' => self.header(line_no, s),
            b'T' => {}
            b'P' => self.position_line(line_no, s),
            b'+' | b'-' if s.len() == 1 => {
                if self.next_side.is_some() {
                    self.warn(line_no, s, LineIssue::MalformedToken);
                } else if let Some(side) = side_of(bytes[0]) {
                    self.start.turn = side;
                }
            }
            b'+' | b'-' => self.move_statement(line_no, s),
            b'%' => {
                self.result(line_no, s);
                return false;
            }
            b'/' => return false,
            _ => self.warn(line_no, s, LineIssue::Unsupported),
        }
        true
    }

    fn warn(&mut self, line_no: usize, text: &str, issue: LineIssue) {
        self.game.warnings.push(LineWarning::new(line_no, text, issue));
    }

    fn header(&mut self, line_no: usize, s: &str) {
        let Some((key, value)) = s[1..].split_once(':') else {
            self.warn(line_no, s, LineIssue::MalformedToken);
            return;
        };
        let info = &mut self.game.info;
        match key {
            "EVENT" => info.event = Some(value.to_string()),
            "START_TIME" => info.start_time = parse_timestamp(value),
            "END_TIME" => info.end_time = parse_timestamp(value),
            _ => log::debug!("line {line_no}: header {key} ignored"),
        }
    }

    fn position_line(&mut self, line_no: usize, s: &str) {
        if self.next_side.is_some() {
            self.warn(line_no, s, LineIssue::Unsupported);
            return;
        }
        let ok = match s.as_bytes().get(1).copied() {
            Some(b'I') => self.initial_with_removals(&s[2..]),
            Some(b'+' | b'-') => self.pieces_line(s),
            Some(d @ b'1'..=b'9') => self.rank_line(d - b'0', &s[2..]),
            _ => false,
        };
        if !ok {
            self.warn(line_no, s, LineIssue::MalformedToken);
        }
    }

    /// `PI82HI22KA`: 平手から駒を除く
    fn initial_with_removals(&mut self, rest: &str) -> bool {
        self.start.board = Board::initial();
        self.start.hands = Hands::new();
        self.start.defined = true;
        if rest.len() % 4 != 0 || !rest.is_ascii() {
            return false;
        }
        for i in (0..rest.len()).step_by(4) {
            let (Some(sq), Some((kind, false))) =
                (Square::from_csa(&rest[i..i + 2]), PieceKind::from_csa(&rest[i + 2..i + 4]))
            else {
                return false;
            };
            if self.start.board.get(sq).map(|p| p.kind) != Some(kind) {
                return false;
            }
            self.start.board.take(sq);
        }
        true
    }

    /// `P1-KY-KE-GI-KI-OU-KI-GI-KE-KY`: 9 筋から 1 筋へ
    fn rank_line(&mut self, rank: u8, cells: &str) -> bool {
        // 行末の空白は切り詰められている
        let cells = format!("{cells:<27}");
        if cells.len() != 27 || !cells.is_ascii() {
            return false;
        }
        self.start.defined = true;
        for (i, file) in (1..=9u8).rev().enumerate() {
            let cell = &cells[i * 3..i * 3 + 3];
            let Some(sq) = Square::new(file, rank) else {
                return false;
            };
            if cell.trim() == "*" {
                self.start.board.take(sq);
                continue;
            }
            let side = side_of(cell.as_bytes()[0]);
            let piece = PieceKind::from_csa(&cell[1..]);
            let piece = side
                .zip(piece)
                .and_then(|(side, (kind, promoted))| Piece::with_state(kind, side, promoted));
            match piece {
                Some(piece) => self.start.board.put(sq, piece),
                None => return false,
            }
        }
        true
    }

    /// `P+00KI00FU` / `P-00AL`: 駒を置く（00 は駒台）
    fn pieces_line(&mut self, s: &str) -> bool {
        let Some(side) = side_of(s.as_bytes()[1]) else {
            return false;
        };
        let rest = &s[2..];
        if rest.len() % 4 != 0 || !rest.is_ascii() {
            return false;
        }
        self.start.defined = true;
        for i in (0..rest.len()).step_by(4) {
            let (square, code) = (&rest[i..i + 2], &rest[i + 2..i + 4]);
            if code == "AL" {
                self.start.give_rest(side);
                continue;
            }
            let Some((kind, promoted)) = PieceKind::from_csa(code) else {
                return false;
            };
            match Square::from_csa(square) {
                Some(sq) => {
                    let Some(piece) = Piece::with_state(kind, side, promoted) else {
                        return false;
                    };
                    self.start.board.put(sq, piece);
                }
                None if square == "00" && !promoted => {
                    let Some(idx) = kind.hand_index() else {
                        return false;
                    };
                    let n = self.start.hands.count(side, kind);
                    if n >= MAX_HAND_PIECES[idx] {
                        return false;
                    }
                    self.start.hands.set(side, kind, n + 1);
                }
                None => return false,
            }
        }
        true
    }

    fn begin_moves(&mut self) -> Side {
        if let Some(side) = self.next_side {
            return side;
        }
        let start = self.start.position();
        self.game.start = start;
        self.next_side = Some(start.turn);
        start.turn
    }

    /// `+7776FU` / `-0055KA`
    fn move_statement(&mut self, line_no: usize, s: &str) {
        self.begin_moves();
        match parse_move(s, line_no) {
            Some(mv) => {
                self.next_side = Some(!mv.side);
                self.game.moves.push(mv);
            }
            None => self.warn(line_no, s, LineIssue::MalformedToken),
        }
    }

    fn result(&mut self, line_no: usize, s: &str) {
        let side_to_move = self.begin_moves();
        let Some(termination) = Termination::from_csa(s) else {
            self.warn(line_no, s, LineIssue::Unsupported);
            return;
        };
        let winner = match s {
            "%TORYO" | "%TSUMI" | "%TIME_UP" | "%ILLEGAL_MOVE" => Some(!side_to_move),
            "%KACHI" => Some(side_to_move),
            "%+ILLEGAL_ACTION" => Some(Side::Gote),
            "%-ILLEGAL_ACTION" => Some(Side::Sente),
            _ => None,
        };
        log::debug!("line {line_no}: game ends by {termination:?}");
        self.game.info.record_result(GameResult {
            termination,
            plies: Some(self.game.moves.len() as u32),
            winner,
        });
    }

    fn finish(mut self) -> ParsedGame {
        self.begin_moves();
        self.game
    }
}

/// 指し手 1 つ（7 文字。続く文字は無視する）
fn parse_move(s: &str, line_no: usize) -> Option<IntendedMove> {
    let head = s.get(..7)?;
    if !head.is_ascii() {
        return None;
    }
    let side = side_of(head.as_bytes()[0])?;
    let (from, to, code) = (&head[1..3], &head[3..5], &head[5..7]);
    let destination = Square::from_csa(to)?;
    let (kind, promoted) = PieceKind::from_csa(code)?;
    let is_drop = from == "00";
    let origin = if is_drop { None } else { Some(Square::from_csa(from)?) };
    if is_drop && (promoted || kind == PieceKind::King) {
        return None;
    }
    Some(IntendedMove {
        side,
        kind,
        promoted,
        names_arrival: true,
        origin,
        destination,
        is_drop,
        promote: None,
        hint: None,
        line: Some(line_no),
    })
}
