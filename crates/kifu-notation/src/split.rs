//! 複数局を含むテキストを 1 局ずつに分ける
//!
//! 区切りとみなすもの:
//! - 2 行以上続く空行
//! - 終局を表す行（KIF の「まで…」、CSA の `%…`）の直後
//! - CSA の `/` だけの行（行自体は捨てる）
//! - 同じ局の中で 2 度目に現れた開始の目印（開始日時・手合割・`V2`・`PI`・`P1`・`N+`）

use smallvec::SmallVec;

/// 局の始まりを示す行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartMarker {
    StartTime,
    Handicap,
    CsaVersion,
    CsaInitial,
    CsaBoard,
    CsaSente,
}

fn start_marker(line: &str) -> Option<StartMarker> {
    const MARKERS: [(&str, StartMarker); 6] = [
        ("開始日時", StartMarker::StartTime),
        ("手合割", StartMarker::Handicap),
        ("V2", StartMarker::CsaVersion),
        ("PI", StartMarker::CsaInitial),
        ("P1", StartMarker::CsaBoard),
        ("N+", StartMarker::CsaSente),
    ];
    MARKERS
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map(|&(_, marker)| marker)
}

fn is_result_line(line: &str) -> bool {
    line.starts_with("まで") || line.starts_with('%')
}

/// `split_games` の戻り値。空の区間は返さない
#[derive(Debug, Clone)]
pub struct GameSegments<'a> {
    rest: &'a str,
}

/// テキストを 1 局ずつの区間に分ける
pub fn split_games(text: &str) -> GameSegments<'_> {
    GameSegments { rest: text }
}

impl<'a> Iterator for GameSegments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let text = skip_blank_lines(self.rest);
            if text.is_empty() {
                self.rest = text;
                return None;
            }
            let (segment, rest) = cut(text);
            self.rest = rest;
            let segment = segment.trim_end();
            if !segment.is_empty() {
                return Some(segment);
            }
        }
    }
}

impl std::iter::FusedIterator for GameSegments<'_> {}

fn skip_blank_lines(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        offset += line.len();
    }
    &text[offset..]
}

/// 先頭の 1 局と残りに分ける（`text` は空行で始まらない）
fn cut(text: &str) -> (&str, &str) {
    let mut seen: SmallVec<[StartMarker; 6]> = SmallVec::new();
    let mut blank_run = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run >= 2 {
                return (&text[..start], &text[offset..]);
            }
            continue;
        }
        blank_run = 0;

        if trimmed == "/" {
            return (&text[..start], &text[offset..]);
        }
        if let Some(marker) = start_marker(trimmed) {
            if seen.contains(&marker) {
                return (&text[..start], &text[start..]);
            }
            seen.push(marker);
        }
        if is_result_line(trimmed) {
            return (&text[..offset], &text[offset..]);
        }
    }
    (text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_game() {
        let text = "手合割：平手\n▲７六歩 △３四歩\n";
        let games: Vec<&str> = split_games(text).collect();
        assert_eq!(games, ["手合割：平手\n▲７六歩 △３四歩"]);
    }

    #[test]
    fn test_blank_lines() {
        let text = "▲７六歩\n\n△３四歩\n\n\n▲２六歩\n\n\n\n";
        let games: Vec<&str> = split_games(text).collect();
        assert_eq!(games, ["▲７六歩\n\n△３四歩", "▲２六歩"]);
    }

    #[test]
    fn test_after_result_line() {
        let text = "▲７六歩 △投了\nまで1手で先手の勝ち\n▲２六歩\n";
        let games: Vec<&str> = split_games(text).collect();
        assert_eq!(games.len(), 2);
        assert!(games[0].ends_with("まで1手で先手の勝ち"));
        assert_eq!(games[1], "▲２六歩");
    }

    #[test]
    fn test_csa_separator() {
        let text = "V2.2\nPI\n+\n+7776FU\n/\nV2.2\nPI\n+\n+2726FU\n";
        let games: Vec<&str> = split_games(text).collect();
        assert_eq!(games, ["V2.2\nPI\n+\n+7776FU", "V2.2\nPI\n+\n+2726FU"]);
    }

    #[test]
    fn test_repeated_start_marker() {
        let text = "開始日時：2024/01/01\n手合割：平手\n▲７六歩\n開始日時：2024/01/02\n手合割：平手\n▲２六歩\n";
        let games: Vec<&str> = split_games(text).collect();
        assert_eq!(games.len(), 2);
        assert!(games[1].starts_with("開始日時：2024/01/02"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(split_games("").count(), 0);
        assert_eq!(split_games("\n \n\n").count(), 0);
        assert_eq!(split_games("/\n/\n").count(), 0);
    }

    #[test]
    fn test_restartable() {
        let segments = split_games("▲７六歩\n\n\n▲２六歩\n");
        assert_eq!(segments.clone().count(), 2);
        assert_eq!(segments.collect::<Vec<_>>().len(), 2);
    }
}
