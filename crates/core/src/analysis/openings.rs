//! Opening classification from early moves
//!
//! Classification works on a fixed catalog of opening prefixes. The
//! longest catalog prefix matching the game's first moves wins, so
//! `1. e4 c5 2. c3` lands on the Alapin rather than the plain Sicilian
//! entry. Entries earlier in the catalog win ties of equal length.

/// Catalog entries are at most six plies deep because records only keep
/// the first three move pairs.
const OPENING_BOOK: &[(&str, &str)] = &[
    ("e4 e5 nf3 nc6 bb5 a6", "Ruy Lopez: Morphy Defense"),
    ("e4 e5 nf3 nc6 bb5 nf6", "Ruy Lopez: Berlin Defense"),
    ("e4 e5 nf3 nc6 bb5", "Ruy Lopez"),
    ("e4 e5 nf3 nc6 bc4 bc5", "Italian Game: Giuoco Piano"),
    ("e4 e5 nf3 nc6 bc4 nf6", "Italian Game: Two Knights Defense"),
    ("e4 e5 nf3 nc6 bc4", "Italian Game"),
    ("e4 e5 nf3 nc6 d4", "Scotch Game"),
    ("e4 e5 nf3 nc6 nc3 nf6", "Four Knights Game"),
    ("e4 e5 nf3 nf6", "Petrov's Defense"),
    ("e4 e5 nf3 d6", "Philidor Defense"),
    ("e4 e5 nf3", "King's Knight Opening"),
    ("e4 e5 f4", "King's Gambit"),
    ("e4 e5 nc3", "Vienna Game"),
    ("e4 e5 bc4", "Bishop's Opening"),
    ("e4 e5", "King's Pawn Game"),
    ("e4 c5 nf3 nc6", "Sicilian Defense: Old Sicilian"),
    ("e4 c5 nf3 e6", "Sicilian Defense: French Variation"),
    ("e4 c5 c3", "Sicilian Defense: Alapin Variation"),
    ("e4 c5 nc3", "Sicilian Defense: Closed"),
    ("e4 c5", "Sicilian Defense"),
    ("e4 e6", "French Defense"),
    ("e4 c6", "Caro-Kann Defense"),
    ("e4 d5", "Scandinavian Defense"),
    ("e4 d6", "Pirc Defense"),
    ("e4 g6", "Modern Defense"),
    ("e4 nf6", "Alekhine's Defense"),
    ("e4 nc6", "Nimzowitsch Defense"),
    ("e4", "King's Pawn Opening"),
    ("d4 d5 c4 e6", "Queen's Gambit Declined"),
    ("d4 d5 c4 c6", "Slav Defense"),
    ("d4 d5 c4 dxc4", "Queen's Gambit Accepted"),
    ("d4 d5 c4", "Queen's Gambit"),
    ("d4 d5", "Queen's Pawn Game"),
    ("d4 nf6 c4 g6", "King's Indian Defense"),
    ("d4 nf6 c4 e6 nc3 bb4", "Nimzo-Indian Defense"),
    ("d4 nf6 c4 e6 nf3 b6", "Queen's Indian Defense"),
    ("d4 nf6 c4 e6", "Indian Game"),
    ("d4 nf6 c4 c5", "Benoni Defense"),
    ("d4 nf6", "Indian Game"),
    ("d4 f5", "Dutch Defense"),
    ("d4 g6", "Modern Defense"),
    ("d4", "Queen's Pawn Opening"),
    ("nf3", "Reti Opening"),
    ("c4", "English Opening"),
    ("g3", "King's Indian Attack"),
    ("b3", "Nimzo-Larsen Attack"),
    ("f4", "Bird's Opening"),
];

/// Name used when no catalog prefix matches.
pub const UNKNOWN_OPENING: &str = "Unknown Opening";

/// Classify a move string like `1. e4 e5 2. Nf3 Nc6 3. Bb5` by its
/// longest matching catalog prefix. Unmatched, empty, or unreadable
/// input classifies as [`UNKNOWN_OPENING`]; this never fails.
pub fn classify_opening(first_moves: &str) -> &'static str {
    let tokens = move_tokens(first_moves);
    if tokens.is_empty() {
        return UNKNOWN_OPENING;
    }

    let mut best_len = 0;
    let mut best_name = UNKNOWN_OPENING;
    for &(prefix, name) in OPENING_BOOK {
        let prefix_tokens: Vec<&str> = prefix.split(' ').collect();
        if prefix_tokens.len() > best_len
            && prefix_tokens.len() <= tokens.len()
            && prefix_tokens
                .iter()
                .zip(&tokens)
                .all(|(p, t)| *p == t.as_str())
        {
            best_len = prefix_tokens.len();
            best_name = name;
        }
    }
    best_name
}

/// Lowercased SAN tokens with move numbers and annotation suffixes
/// stripped.
fn move_tokens(moves: &str) -> Vec<String> {
    moves
        .split_whitespace()
        .filter(|token| !is_move_number(token))
        .map(|token| {
            token
                .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'))
                .to_ascii_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Matches `1.`, `14.`, and black-to-move markers like `1...`.
fn is_move_number(token: &str) -> bool {
    let digits = token.trim_end_matches('.');
    token.ends_with('.') && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ruy_lopez() {
        assert_eq!(classify_opening("1. e4 e5 2. Nf3 Nc6 3. Bb5"), "Ruy Lopez");
    }

    #[test]
    fn test_classify_deepest_prefix_wins() {
        assert_eq!(
            classify_opening("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
            "Ruy Lopez: Morphy Defense"
        );
        assert_eq!(
            classify_opening("1. e4 c5 2. c3 d5"),
            "Sicilian Defense: Alapin Variation"
        );
    }

    #[test]
    fn test_classify_falls_back_to_shorter_prefix() {
        assert_eq!(classify_opening("1. e4 c5 2. b4"), "Sicilian Defense");
        assert_eq!(classify_opening("1. d4 d5 2. Bf4"), "Queen's Pawn Game");
    }

    #[test]
    fn test_classify_unknown_first_move() {
        assert_eq!(classify_opening("1. a4 e5 2. h4 d5"), UNKNOWN_OPENING);
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify_opening(""), UNKNOWN_OPENING);
        assert_eq!(classify_opening("   "), UNKNOWN_OPENING);
    }

    #[test]
    fn test_classify_ignores_case_and_annotations() {
        assert_eq!(
            classify_opening("1. E4 E5 2. NF3! NC6?! 3. BB5+"),
            "Ruy Lopez"
        );
    }

    #[test]
    fn test_classify_ignores_black_move_markers() {
        assert_eq!(classify_opening("1. e4 1... c5 2. nf3 2... nc6"), "Sicilian Defense: Old Sicilian");
    }

    #[test]
    fn test_classify_single_move() {
        assert_eq!(classify_opening("1. d4"), "Queen's Pawn Opening");
        assert_eq!(classify_opening("1. Nf3"), "Reti Opening");
    }

    #[test]
    fn test_move_number_detection() {
        assert!(is_move_number("1."));
        assert!(is_move_number("14."));
        assert!(is_move_number("3..."));
        assert!(!is_move_number("e4"));
        assert!(!is_move_number("1-0"));
        assert!(!is_move_number("."));
    }
}
