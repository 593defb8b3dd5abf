//! PGN movetext extraction
//!
//! Chess.com archives embed clock annotations (`{[%clk 0:02:58.9]}`) in
//! the movetext. The visitor ignores comments and variations and replays
//! every SAN on a real position, so only legal moves reach the opening
//! classifier.

use pgn_reader::{SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};
use std::io::Cursor;
use std::ops::ControlFlow;

use crate::error::Result;

struct CollectedMoves {
    moves: Vec<String>,
    current_position: Chess,
    valid: bool,
}

struct MoveCollector;

impl Visitor for MoveCollector {
    type Tags = ();
    type Movetext = CollectedMoves;
    type Output = Vec<String>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(CollectedMoves {
            moves: Vec::new(),
            current_position: Chess::default(),
            valid: true,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !movetext.valid {
            return ControlFlow::Continue(());
        }

        match san.san.to_move(&movetext.current_position) {
            Ok(m) => match movetext.current_position.clone().play(m) {
                Ok(new_pos) => {
                    movetext.current_position = new_pos;
                    movetext.moves.push(san.san.to_string());
                }
                Err(_) => {
                    movetext.valid = false;
                }
            },
            Err(_) => {
                movetext.valid = false;
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext.moves
    }
}

/// SAN moves of the first game in `pgn`, in played order. A game whose
/// movetext turns illegal partway through yields the legal prefix.
pub fn game_moves(pgn: &str) -> Result<Vec<String>> {
    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);
    let moves = reader.read_game(&mut MoveCollector)?.unwrap_or_default();
    Ok(moves)
}

/// The first `pairs` full moves formatted as `1. e4 e5 2. Nf3 Nc6 ...`.
/// Unreadable or empty movetext comes back as an empty string.
pub fn first_moves(pgn: &str, pairs: usize) -> String {
    let moves = match game_moves(pgn) {
        Ok(moves) => moves,
        Err(_) => return String::new(),
    };

    let mut out = String::new();
    for (i, pair) in moves.chunks(2).take(pairs).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{}. {}", i + 1, pair[0]));
        if let Some(black) = pair.get(1) {
            out.push(' ');
            out.push_str(black);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[Date "2024.06.01"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[TimeControl "600"]

1. e4 {[%clk 0:09:58.1]} 1... e5 {[%clk 0:09:57.3]} 2. Nf3 {[%clk 0:09:55]} 2... Nc6 {[%clk 0:09:50.2]} 3. Bb5 {[%clk 0:09:53.8]} 3... a6 {[%clk 0:09:45]} 1-0
"#;

    #[test]
    fn test_game_moves_strips_clock_comments() {
        let moves = game_moves(SAMPLE_PGN).unwrap();
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
    }

    #[test]
    fn test_first_moves_formatting() {
        assert_eq!(
            first_moves(SAMPLE_PGN, 3),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"
        );
    }

    #[test]
    fn test_first_moves_shorter_game() {
        let pgn = "1. e4 e5 1-0";
        assert_eq!(first_moves(pgn, 3), "1. e4 e5");
    }

    #[test]
    fn test_first_moves_odd_ply_count() {
        let pgn = "1. e4 e5 2. Nf3 1-0";
        assert_eq!(first_moves(pgn, 3), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_first_moves_empty_pgn() {
        assert_eq!(first_moves("", 3), "");
    }

    #[test]
    fn test_first_moves_header_only_pgn() {
        let pgn = "[Event \"Live Chess\"]\n[Result \"1-0\"]\n\n1-0\n";
        assert_eq!(first_moves(pgn, 3), "");
    }

    #[test]
    fn test_illegal_move_keeps_legal_prefix() {
        let pgn = "1. e4 Nf6 2. e5 Nxe5 0-1";
        let moves = game_moves(pgn).unwrap();
        assert_eq!(moves, vec!["e4", "Nf6", "e5"]);
    }

    #[test]
    fn test_variations_are_skipped() {
        let pgn = "1. e4 (1. d4 d5) 1... e5 2. Nf3 1-0";
        let moves = game_moves(pgn).unwrap();
        assert_eq!(moves, vec!["e4", "e5", "Nf3"]);
    }
}
