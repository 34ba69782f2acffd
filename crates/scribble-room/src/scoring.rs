//! Guess evaluation and scoring.

use scribble_protocol::PlayerId;
use scribble_roster::Registry;

/// The outcome of checking a message against the secret word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A guesser named the word.
    Correct,
    /// Not the word; the text is ordinary chat.
    Miss,
    /// The drawer typed the word. Neither scored nor shown to anyone.
    Suppressed,
}

/// Judges guesses and hands out points.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBoard {
    guesser_points: u32,
    drawer_points: u32,
}

impl ScoreBoard {
    pub fn new(guesser_points: u32, drawer_points: u32) -> Self {
        Self {
            guesser_points,
            drawer_points,
        }
    }

    /// Compares `text` with `word`, ignoring case.
    pub fn judge(&self, word: &str, drawer: PlayerId, author: PlayerId, text: &str) -> Verdict {
        let matches = text.to_lowercase() == word.to_lowercase();
        match (matches, author == drawer) {
            (true, true) => Verdict::Suppressed,
            (true, false) => Verdict::Correct,
            (false, _) => Verdict::Miss,
        }
    }

    /// Credits a correct guess to the guesser and the drawer.
    pub fn award(&self, registry: &mut Registry, guesser: PlayerId, drawer: PlayerId) {
        let guesser_score = registry.award(guesser, self.guesser_points);
        let drawer_score = registry.award(drawer, self.drawer_points);
        tracing::info!(
            %guesser,
            %drawer,
            ?guesser_score,
            ?drawer_score,
            "points awarded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWER: PlayerId = PlayerId(1);
    const GUESSER: PlayerId = PlayerId(2);

    #[test]
    fn test_judge_ignores_case() {
        let board = ScoreBoard::new(10, 5);
        assert_eq!(board.judge("cat", DRAWER, GUESSER, "CAT"), Verdict::Correct);
        assert_eq!(board.judge("Cat", DRAWER, GUESSER, "cAt"), Verdict::Correct);
    }

    #[test]
    fn test_judge_requires_exact_text() {
        let board = ScoreBoard::new(10, 5);
        assert_eq!(board.judge("cat", DRAWER, GUESSER, "cats"), Verdict::Miss);
        assert_eq!(board.judge("cat", DRAWER, GUESSER, "a cat"), Verdict::Miss);
    }

    #[test]
    fn test_judge_suppresses_the_drawer_naming_the_word() {
        let board = ScoreBoard::new(10, 5);
        assert_eq!(board.judge("cat", DRAWER, DRAWER, "cat"), Verdict::Suppressed);
        assert_eq!(board.judge("cat", DRAWER, DRAWER, "hello"), Verdict::Miss);
    }

    #[test]
    fn test_award_credits_both_players() {
        let mut registry = Registry::new();
        registry.join(DRAWER, "dee").unwrap();
        registry.join(GUESSER, "gus").unwrap();

        ScoreBoard::new(10, 5).award(&mut registry, GUESSER, DRAWER);

        assert_eq!(registry.get(GUESSER).unwrap().score, 10);
        assert_eq!(registry.get(DRAWER).unwrap().score, 5);
    }
}
