//! KIF / KI2 形式の読み込み
//!
//! KIF は 1 行 1 手で移動元 `(77)` が付く。KI2 は `▲７六歩 △３四歩` のように手番記号で区切り、
//! 移動元の代わりに修飾語（右・左・直・上・引・寄）を使う。どちらも同じ読み込みで扱う。
//!
//! 読めない行は警告として残し、読み込みは続ける。終局語（投了など）か「まで」の行以降は
//! 指し手として読まない。変化手順は対象外。

use kifu_core::types::{Hands, MAX_HAND_PIECES, PieceKind, Side, Square};
use kifu_core::{Board, Handicap, Piece, Position};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::info::{GameResult, Termination, parse_timestamp};
use crate::intent::{
    DirectionHint, IntendedMove, Lateral, LineIssue, LineWarning, ParsedGame, Vertical,
};
use crate::kanji::{file_from_char, parse_kanji_number, piece_from_name, rank_from_char};

static MOVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<file>[1-9１-９])(?P<rank>[1-9一二三四五六七八九])|(?P<same>同)\s*)",
        r"(?P<piece>成香|成桂|成銀|杏|圭|全|歩|香|桂|銀|金|角|飛|玉|王|と|馬|龍|竜)",
        r"(?P<lateral>[右左直])?(?P<vertical>[上行引寄])?(?P<action>不成|生|成|打)?",
        r"(?:\s*\((?P<from>[0-9]{2})\))?",
    ))
    .expect("valid regex")
});

static MOVE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\s+").expect("valid regex"));

static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^まで(?P<plies>[0-9]+)手(?:.*?(?P<side>先手|後手|下手|上手)の(?:反則)?(?P<outcome>勝ち|負け))?")
        .expect("valid regex")
});

const SIDE_GLYPHS: [char; 6] = ['▲', '☗', '▼', '△', '☖', '▽'];

fn glyph_side(c: char) -> Option<Side> {
    match c {
        '▲' | '☗' | '▼' => Some(Side::Sente),
        '△' | '☖' | '▽' => Some(Side::Gote),
        _ => None,
    }
}

/// ヘッダ・局面図の「先手／後手」（駒落ちの下手／上手を含む）
fn side_word(word: &str) -> Option<Side> {
    match word {
        "先手" | "下手" => Some(Side::Sente),
        "後手" | "上手" => Some(Side::Gote),
        _ => None,
    }
}

/// KIF / KI2 のテキスト 1 局分を読む
pub fn parse_kif(text: &str) -> ParsedGame {
    let mut parser = KifParser::default();
    for (i, line) in text.lines().enumerate() {
        if !parser.feed(i + 1, line) {
            break;
        }
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stage {
    #[default]
    Header,
    Moves,
    /// 終局語の後。「まで」の行だけ読む
    Finished,
}

/// 局面図（BOD）の断片
#[derive(Debug, Default)]
struct BodBuilder {
    rows: Vec<[Option<Piece>; 9]>,
    hands: Hands,
    turn: Option<Side>,
    /// 最初の局面図の行
    line: Option<usize>,
}

impl BodBuilder {
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn build(&self, default_turn: Side) -> Option<Position> {
        if self.rows.len() != 9 {
            return None;
        }
        let mut board = Board::empty();
        for (r, row) in self.rows.iter().enumerate() {
            for (i, cell) in row.iter().enumerate() {
                // 左端が 9 筋
                let sq = Square::new(9 - i as u8, r as u8 + 1)?;
                if let Some(piece) = cell {
                    board.put(sq, *piece);
                }
            }
        }
        Some(Position::new(board, self.hands, self.turn.unwrap_or(default_turn), 1))
    }
}

#[derive(Default)]
struct KifParser {
    stage: Stage,
    /// 次の手の手番（開始局面が決まってから）
    next_side: Option<Side>,
    last_destination: Option<Square>,
    sfen_start: Option<Position>,
    bod: BodBuilder,
    pending: ParsedGame,
}

impl KifParser {
    /// 1 行読む。false なら以降の行は読まない
    fn feed(&mut self, line_no: usize, raw: &str) -> bool {
        let line = raw.trim();
        if line.is_empty() {
            return true;
        }
        if let Some(caps) = SUMMARY_RE.captures(line) {
            self.record_summary(&caps, line);
            self.stage = Stage::Finished;
            return true;
        }
        if self.stage == Stage::Finished {
            return true;
        }
        if line.starts_with(['#', '*', '&']) || line.starts_with("手数") {
            return true;
        }
        if line.starts_with("変化") {
            log::debug!("line {line_no}: variation ignored");
            self.stage = Stage::Finished;
            return false;
        }
        if self.stage == Stage::Header && self.feed_header(line_no, line) {
            return true;
        }
        self.feed_moves(line_no, line);
        true
    }

    /// ヘッダ・局面図の行なら読んで true
    fn feed_header(&mut self, line_no: usize, line: &str) -> bool {
        if line.starts_with(['|', '｜']) {
            self.feed_bod_row(line_no, line);
            return true;
        }
        // 局面図の枠と筋番号
        if line.starts_with('+')
            || line.chars().all(|c| c.is_whitespace() || file_from_char(c).is_some())
        {
            return true;
        }
        if let Some(word) = line.strip_suffix('番') {
            if let Some(side) = side_word(word) {
                self.bod.turn = Some(side);
                return true;
            }
        }
        let Some((key, value)) = line.split_once('：') else {
            return false;
        };
        let (key, value) = (key.trim(), value.trim());
        let info = &mut self.pending.info;
        match key {
            "開始日時" | "対局日" => info.start_time = parse_timestamp(value),
            "終了日時" => info.end_time = parse_timestamp(value),
            "棋戦" => info.event = Some(value.to_string()),
            "手合割" => match Handicap::from_kif_name(value) {
                Some(handicap) => info.handicap = Some(handicap),
                None => self
                    .pending
                    .warnings
                    .push(LineWarning::new(line_no, line, LineIssue::Unsupported)),
            },
            "開始局面" => match Position::from_sfen(value) {
                Ok(position) => self.sfen_start = Some(position),
                Err(e) => {
                    log::debug!("line {line_no}: {e}");
                    self.pending
                        .warnings
                        .push(LineWarning::new(line_no, line, LineIssue::MalformedToken));
                }
            },
            _ => {
                if let Some(side) = key.strip_suffix("の持駒").and_then(side_word) {
                    self.feed_bod_hands(line_no, line, side, value);
                } else if let Some(side) = side_word(key) {
                    match side {
                        Side::Sente => info.sente = Some(value.to_string()),
                        Side::Gote => info.gote = Some(value.to_string()),
                    }
                } else {
                    log::debug!("line {line_no}: header {key} ignored");
                }
            }
        }
        true
    }

    fn feed_bod_row(&mut self, line_no: usize, line: &str) {
        self.bod.line.get_or_insert(line_no);
        let inner: Vec<char> = line
            .chars()
            .skip(1)
            .take_while(|&c| c != '|' && c != '｜')
            .collect();
        let row = (inner.len() == 18)
            .then(|| parse_bod_cells(&inner))
            .flatten();
        match row {
            Some(row) => self.bod.rows.push(row),
            None => self
                .pending
                .warnings
                .push(LineWarning::new(line_no, line, LineIssue::MalformedToken)),
        }
    }

    fn feed_bod_hands(&mut self, line_no: usize, line: &str, side: Side, value: &str) {
        if value == "なし" || value.is_empty() {
            return;
        }
        for item in value.split(|c: char| c.is_whitespace() || c == '、').filter(|s| !s.is_empty()) {
            let mut chars = item.chars();
            let parsed = chars
                .next()
                .and_then(|c| piece_from_name(c.encode_utf8(&mut [0; 4])))
                .filter(|&(kind, promoted)| !promoted && kind != PieceKind::King)
                .and_then(|(kind, _)| {
                    let rest = chars.as_str();
                    let count = if rest.is_empty() { Some(1) } else { parse_kanji_number(rest) };
                    count.map(|n| (kind, n))
                })
                .filter(|&(kind, n)| kind.hand_index().is_some_and(|i| n <= MAX_HAND_PIECES[i]));
            match parsed {
                Some((kind, n)) => self.bod.hands.set(side, kind, n),
                None => self
                    .pending
                    .warnings
                    .push(LineWarning::new(line_no, line, LineIssue::MalformedToken)),
            }
        }
    }

    /// 開始局面を決め、以降の手番を追えるようにする
    fn begin_moves(&mut self) -> Side {
        if let Some(side) = self.next_side {
            return side;
        }
        let start = self.start_position();
        self.pending.start = start;
        self.stage = Stage::Moves;
        self.next_side = Some(start.turn);
        start.turn
    }

    fn start_position(&mut self) -> Position {
        let handicap = self.pending.info.handicap;
        let default_turn = match handicap {
            Some(h) if h != Handicap::Even => Side::Gote,
            _ => Side::Sente,
        };
        if !self.bod.is_empty() {
            if let Some(position) = self.bod.build(default_turn) {
                return position;
            }
            let line = self.bod.line.unwrap_or(0);
            self.pending.warnings.push(LineWarning::new(
                line,
                &format!("{} board rows", self.bod.rows.len()),
                LineIssue::MalformedToken,
            ));
        }
        if let Some(position) = self.sfen_start {
            return position;
        }
        let mut position = match handicap {
            Some(h) => h.position().unwrap_or_else(|e| {
                log::warn!("handicap {h:?}: {e}");
                Position::startpos()
            }),
            None => Position::startpos(),
        };
        if let Some(turn) = self.bod.turn {
            position.turn = turn;
        }
        position
    }

    fn feed_moves(&mut self, line_no: usize, line: &str) {
        let body = MOVE_NUMBER_RE
            .find(line)
            .map_or(line, |m| &line[m.end()..]);
        for chunk in split_chunks(body) {
            if self.stage == Stage::Finished {
                break;
            }
            self.feed_chunk(line_no, chunk);
        }
    }

    fn feed_chunk(&mut self, line_no: usize, chunk: &str) {
        let expected = self.begin_moves();
        let mut chars = chunk.chars();
        let glyph = chars.next().and_then(glyph_side);
        let side = glyph.unwrap_or(expected);
        let text = if glyph.is_some() { chars.as_str().trim_start() } else { chunk };

        let word: String = text
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '(')
            .collect();
        if let Some(termination) = Termination::from_kif(&word) {
            let winner = match (termination, word.as_str()) {
                (Termination::IllegalMove, "反則勝ち") => Some(side),
                (
                    Termination::Resign | Termination::Timeout | Termination::Checkmate | Termination::IllegalMove,
                    _,
                ) => Some(!side),
                _ => None,
            };
            log::debug!("line {line_no}: game ends by {termination:?}");
            self.pending.info.record_result(GameResult {
                termination,
                plies: None,
                winner,
            });
            self.stage = Stage::Finished;
            return;
        }

        let Some(caps) = MOVE_RE.captures(text) else {
            self.pending
                .warnings
                .push(LineWarning::new(line_no, chunk, LineIssue::MalformedToken));
            return;
        };
        match self.intended_move(&caps, side, line_no) {
            Ok(mv) => {
                self.last_destination = Some(mv.destination);
                self.next_side = Some(!side);
                self.pending.moves.push(mv);
            }
            Err(issue) => self.pending.warnings.push(LineWarning::new(line_no, chunk, issue)),
        }
    }

    fn intended_move(&self, caps: &Captures, side: Side, line_no: usize) -> Result<IntendedMove, LineIssue> {
        let destination = if caps.name("same").is_some() {
            self.last_destination.ok_or(LineIssue::NoPreviousDestination)?
        } else {
            let file = caps
                .name("file")
                .and_then(|m| m.as_str().chars().next())
                .and_then(file_from_char);
            let rank = caps
                .name("rank")
                .and_then(|m| m.as_str().chars().next())
                .and_then(rank_from_char);
            file.zip(rank)
                .and_then(|(f, r)| Square::new(f, r))
                .ok_or(LineIssue::MalformedToken)?
        };

        let (kind, promoted) = caps
            .name("piece")
            .and_then(|m| piece_from_name(m.as_str()))
            .ok_or(LineIssue::MalformedToken)?;

        let action = caps.name("action").map(|m| m.as_str());
        let is_drop = action == Some("打");
        let promote = match action {
            Some("成") => Some(true),
            Some("不成" | "生") => Some(false),
            _ => None,
        };

        let origin = match caps.name("from") {
            Some(m) => {
                let digits: Vec<u8> = m.as_str().bytes().map(|b| b - b'0').collect();
                Some(Square::new(digits[0], digits[1]).ok_or(LineIssue::MalformedToken)?)
            }
            None => None,
        };
        if is_drop && (origin.is_some() || promoted) {
            return Err(LineIssue::MalformedToken);
        }

        let hint = DirectionHint {
            lateral: caps.name("lateral").map(|m| match m.as_str() {
                "右" => Lateral::Right,
                "左" => Lateral::Left,
                _ => Lateral::Straight,
            }),
            vertical: caps.name("vertical").map(|m| match m.as_str() {
                "引" => Vertical::Back,
                "寄" => Vertical::Sideways,
                _ => Vertical::Up,
            }),
        };

        Ok(IntendedMove {
            side,
            kind,
            promoted,
            names_arrival: false,
            origin,
            destination,
            is_drop,
            promote,
            hint: (!hint.is_empty()).then_some(hint),
            line: Some(line_no),
        })
    }

    fn record_summary(&mut self, caps: &Captures, line: &str) {
        let plies = caps.name("plies").and_then(|m| m.as_str().parse().ok());
        let side = caps.name("side").and_then(|m| side_word(m.as_str()));
        let winner = match caps.name("outcome").map(|m| m.as_str()) {
            Some("勝ち") => side,
            Some(_) => side.map(|s| !s),
            None => None,
        };
        let termination = [
            ("千日手", Termination::Repetition),
            ("持将棋", Termination::Impasse),
            ("中断", Termination::Abort),
            ("反則", Termination::IllegalMove),
            ("切れ", Termination::Timeout),
            ("詰", Termination::Checkmate),
        ]
        .into_iter()
        .find(|(word, _)| line.contains(word))
        .map_or(Termination::Other, |(_, t)| t);
        self.pending.info.record_result(GameResult {
            termination,
            plies,
            winner,
        });
    }

    fn finish(mut self) -> ParsedGame {
        self.begin_moves();
        self.pending
    }
}

/// 局面図の 1 段（左が 9 筋）。`v` が付けば後手の駒
fn parse_bod_cells(inner: &[char]) -> Option<[Option<Piece>; 9]> {
    let mut row = [None; 9];
    for (i, cell) in inner.chunks(2).enumerate() {
        let side = match cell[0] {
            'v' | 'V' => Side::Gote,
            _ => Side::Sente,
        };
        if cell[1] == '・' {
            continue;
        }
        let (kind, promoted) = piece_from_name(cell[1].encode_utf8(&mut [0; 4]))?;
        row[i] = Some(Piece::with_state(kind, side, promoted)?);
    }
    Some(row)
}

/// 手番記号ごとに分ける（KI2 は 1 行に複数の手がある）
fn split_chunks(body: &str) -> impl Iterator<Item = &str> {
    let mut starts: Vec<usize> = body
        .char_indices()
        .filter(|(_, c)| SIDE_GLYPHS.contains(c))
        .map(|(i, _)| i)
        .collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }
    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([body.len()]).collect();
    starts
        .into_iter()
        .zip(ends)
        .map(move |(s, e)| body[s..e].trim())
        .filter(|chunk| !chunk.is_empty())
}
