//! Room configuration.

use std::time::Duration;

use scribble_protocol::Color;
use scribble_tick::{TickConfig, TickPolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Words a round can be about when no vocabulary is configured.
pub const DEFAULT_WORDS: [&str; 30] = [
    "cat", "dog", "house", "tree", "car", "sun", "moon", "fish", "bird", "star", "flower",
    "robot", "pizza", "boat", "cloud", "beach", "chair", "plane", "train", "snake", "apple",
    "heart", "smile", "hat", "ball", "clock", "drum", "shoe", "bread", "book",
];

/// Configuration for the room.
///
/// Timings are counted in ticks; `tick_interval` says how long a tick is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Players needed (all ready) before a countdown starts.
    pub min_players: usize,

    /// Length of the pre-round countdown.
    pub countdown_ticks: u32,

    /// Length of a round.
    pub round_ticks: u32,

    /// Real time per tick.
    pub tick_interval: Duration,

    /// What the timer does when the room wakes up late.
    pub tick_policy: TickPolicy,

    pub canvas_width: u16,
    pub canvas_height: u16,

    /// Color every cell starts with and is reset to.
    pub background: Color,

    /// Points for guessing the word.
    pub guesser_points: u32,

    /// Points for the drawer when someone guesses the word.
    pub drawer_points: u32,

    /// Candidate secret words.
    pub vocabulary: Vec<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            countdown_ticks: 5,
            round_ticks: 60,
            tick_interval: Duration::from_secs(1),
            tick_policy: TickPolicy::Skip,
            canvas_width: 100,
            canvas_height: 80,
            background: Color::WHITE,
            guesser_points: 10,
            drawer_points: 5,
            vocabulary: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl RoomConfig {
    /// Smallest roster that can play: one drawer and one guesser.
    pub const MIN_PLAYERS: usize = 2;

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// - `min_players` is at least [`Self::MIN_PLAYERS`].
    /// - Countdown, round length and canvas dimensions are at least 1.
    /// - Vocabulary entries are trimmed and blanks dropped; an empty
    ///   vocabulary falls back to [`DEFAULT_WORDS`].
    pub fn validated(mut self) -> Self {
        if self.min_players < Self::MIN_PLAYERS {
            warn!(min_players = self.min_players, "min_players too small, clamping");
            self.min_players = Self::MIN_PLAYERS;
        }
        if self.countdown_ticks == 0 {
            warn!("countdown_ticks is 0, clamping to 1");
            self.countdown_ticks = 1;
        }
        if self.round_ticks == 0 {
            warn!("round_ticks is 0, clamping to 1");
            self.round_ticks = 1;
        }
        self.canvas_width = self.canvas_width.max(1);
        self.canvas_height = self.canvas_height.max(1);

        self.vocabulary = self
            .vocabulary
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if self.vocabulary.is_empty() {
            warn!("vocabulary is empty, using the default words");
            self.vocabulary = DEFAULT_WORDS.iter().map(|w| w.to_string()).collect();
        }
        self
    }

    /// Timer settings derived from this config.
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            interval: self.tick_interval,
            policy: self.tick_policy,
        }
    }
}
