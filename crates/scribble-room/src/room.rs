//! The round state machine.
//!
//! [`Room`] is synchronous and owns everything a room needs: roster,
//! canvas, scores, the phase timer and its random source. Every method
//! that changes state returns the events to deliver as
//! `(Recipient, ServerEvent)` pairs; the actor hands them to a
//! [`BroadcastPort`](crate::BroadcastPort). Nothing here performs I/O, so
//! the whole game can be driven from plain unit tests by calling
//! [`Room::handle`] and [`Room::tick`].
//!
//! ```text
//! Waiting ──(≥ min players, all ready)──→ Countdown ──(reaches 0)──→ Playing
//!    ↑                                        │                        │
//!    └───────────(roster too small)───────────┘                        │
//!    └──────────(time up, correct guess, drawer left, roster too small)┘
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use scribble_protocol::{ClientEvent, Color, Phase, PlayerId, Readiness, Recipient, ServerEvent};
use scribble_roster::Registry;
use scribble_tick::TickScheduler;
use tracing::{debug, info, trace, warn};

use crate::{Canvas, RoomConfig, RoomError, ScoreBoard, Verdict};

/// Events produced by one step of the room.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// A running round. Drawer and word exist exactly while playing.
#[derive(Debug, Clone)]
struct ActiveRound {
    drawer: PlayerId,
    drawer_name: String,
    word: String,
    remaining: u32,
}

#[derive(Debug, Clone)]
enum Stage {
    Waiting,
    Countdown { remaining: u32 },
    Playing(ActiveRound),
}

/// A snapshot of room metadata for observers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub phase: Phase,
    pub player_count: usize,
    pub drawer: Option<PlayerId>,
    pub countdown_remaining: Option<u32>,
    pub round_remaining: Option<u32>,
    pub timer_armed: bool,
    /// How many times the phase timer has been armed since the room
    /// was created.
    pub timer_arms: u64,
}

/// The game room: roster, canvas, round phase and timer.
pub struct Room {
    config: RoomConfig,
    roster: Registry,
    canvas: Canvas,
    scores: ScoreBoard,
    timer: TickScheduler,
    stage: Stage,
    rng: StdRng,
}

impl Room {
    /// Creates a room whose drawer and word choices are seeded from the OS.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates a room with reproducible drawer and word choices.
    pub fn with_seed(config: RoomConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RoomConfig, rng: StdRng) -> Self {
        let config = config.validated();
        let canvas = Canvas::new(config.canvas_width, config.canvas_height, config.background);
        let scores = ScoreBoard::new(config.guesser_points, config.drawer_points);
        let timer = TickScheduler::new(config.tick_config());
        Self {
            config,
            roster: Registry::new(),
            canvas,
            scores,
            timer,
            stage: Stage::Waiting,
            rng,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn roster(&self) -> &Registry {
        &self.roster
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The phase timer. The actor waits on it between commands.
    pub fn timer_mut(&mut self) -> &mut TickScheduler {
        &mut self.timer
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Waiting => Phase::Waiting,
            Stage::Countdown { .. } => Phase::Countdown,
            Stage::Playing(_) => Phase::Playing,
        }
    }

    pub fn current_drawer(&self) -> Option<PlayerId> {
        match &self.stage {
            Stage::Playing(round) => Some(round.drawer),
            _ => None,
        }
    }

    fn current_word(&self) -> Option<&str> {
        match &self.stage {
            Stage::Playing(round) => Some(&round.word),
            _ => None,
        }
    }

    pub fn info(&self) -> RoomInfo {
        let (countdown_remaining, round_remaining) = match &self.stage {
            Stage::Waiting => (None, None),
            Stage::Countdown { remaining } => (Some(*remaining), None),
            Stage::Playing(round) => (None, Some(round.remaining)),
        };
        RoomInfo {
            phase: self.phase(),
            player_count: self.roster.len(),
            drawer: self.current_drawer(),
            countdown_remaining,
            round_remaining,
            timer_armed: self.timer.is_armed(),
            timer_arms: self.timer.arms(),
        }
    }

    // -----------------------------------------------------------------
    // Views sent to clients
    // -----------------------------------------------------------------

    fn roster_update(&self) -> ServerEvent {
        ServerEvent::RosterUpdate {
            players: self.roster.summaries(),
        }
    }

    fn room_state(&self) -> ServerEvent {
        let remaining = match &self.stage {
            Stage::Waiting => 0,
            Stage::Countdown { remaining } => *remaining,
            Stage::Playing(round) => round.remaining,
        };
        ServerEvent::RoomState {
            phase: self.phase(),
            drawer: self.current_drawer(),
            remaining,
        }
    }

    /// What a newly attached connection needs to render the room.
    pub fn welcome(&self) -> Vec<ServerEvent> {
        vec![self.roster_update(), self.room_state(), self.canvas.snapshot()]
    }

    // -----------------------------------------------------------------
    // Inbound events
    // -----------------------------------------------------------------

    /// Applies one event from `sender`.
    ///
    /// Events other than `join` from a connection that has not joined
    /// are ignored.
    pub fn handle(&mut self, sender: PlayerId, event: ClientEvent) -> Outbound {
        if !matches!(event, ClientEvent::Join { .. }) && !self.roster.contains(sender) {
            debug!(%sender, event = event.kind(), "event from a connection that has not joined, ignoring");
            return Vec::new();
        }

        match event {
            ClientEvent::Join { username } => self.join(sender, &username),
            ClientEvent::Ready => self.set_readiness(sender, Readiness::Ready),
            ClientEvent::Unready => self.set_readiness(sender, Readiness::NotReady),
            ClientEvent::Draw { index, color } => self.apply_stroke(sender, index, color),
            ClientEvent::Guess { text } => self.evaluate_guess(sender, text),
        }
    }

    fn join(&mut self, id: PlayerId, username: &str) -> Outbound {
        let result = self.roster.join(id, username).map(|_| ());
        match result {
            Ok(()) => vec![(Recipient::All, self.roster_update())],
            Err(err) => {
                debug!(player_id = %id, %err, "join rejected");
                let err = RoomError::from(err);
                vec![(Recipient::Player(id), ServerEvent::error(err.to_string()))]
            }
        }
    }

    /// Removes a player after their connection closed. Leaving twice is
    /// a no-op.
    ///
    /// Everyone left is reset to `not-ready`. If the drawer left, or the
    /// roster fell below the minimum, the running round ends (or the
    /// countdown is cancelled).
    pub fn leave(&mut self, id: PlayerId) -> Outbound {
        if self.roster.leave(id).is_none() {
            return Vec::new();
        }
        self.roster.reset_readiness();

        let short = self.roster.len() < self.config.min_players;
        let drawer_left = self.current_drawer() == Some(id);

        match self.stage {
            Stage::Playing(_) if drawer_left => {
                info!(drawer = %id, "drawer left, aborting round");
                self.end_round()
            }
            Stage::Playing(_) if short => {
                info!(players = self.roster.len(), "too few players, ending round");
                self.end_round()
            }
            Stage::Countdown { .. } if short => self.cancel_countdown(),
            _ => vec![(Recipient::All, self.roster_update())],
        }
    }

    fn set_readiness(&mut self, id: PlayerId, readiness: Readiness) -> Outbound {
        if !matches!(self.stage, Stage::Waiting) {
            trace!(player_id = %id, ?readiness, phase = %self.phase(), "readiness change outside waiting, ignoring");
            return Vec::new();
        }
        if !self.roster.set_readiness(id, readiness) {
            return Vec::new();
        }

        let mut out = vec![(Recipient::All, self.roster_update())];
        if self.roster.len() >= self.config.min_players && self.roster.all_ready() {
            out.extend(self.start_countdown());
        }
        out
    }

    fn apply_stroke(&mut self, author: PlayerId, index: usize, color: Color) -> Outbound {
        if index >= self.canvas.len() {
            let err = RoomError::StrokeOutOfBounds {
                index,
                len: self.canvas.len(),
            };
            return vec![(Recipient::Player(author), ServerEvent::error(err.to_string()))];
        }
        if self.current_drawer() != Some(author) {
            trace!(%author, phase = %self.phase(), "stroke from a non-drawer, dropping");
            return Vec::new();
        }

        match self.canvas.paint(index, color) {
            Ok(()) => vec![(
                Recipient::AllExcept(author),
                ServerEvent::DrawUpdate { index, color },
            )],
            Err(err) => vec![(Recipient::Player(author), ServerEvent::error(err.to_string()))],
        }
    }

    fn evaluate_guess(&mut self, author: PlayerId, text: String) -> Outbound {
        let Some(user) = self.roster.get(author).map(|p| p.username.clone()) else {
            return Vec::new();
        };

        let verdict = match &self.stage {
            Stage::Playing(round) => self.scores.judge(&round.word, round.drawer, author, &text),
            _ => Verdict::Miss,
        };

        match verdict {
            Verdict::Correct => {
                let (Some(drawer), Some(word)) =
                    (self.current_drawer(), self.current_word().map(str::to_owned))
                else {
                    return Vec::new();
                };
                info!(winner = %author, %drawer, "word guessed");
                self.scores.award(&mut self.roster, author, drawer);

                let mut out = vec![
                    (Recipient::All, ServerEvent::CorrectGuess { winner: user, word }),
                    (Recipient::All, self.roster_update()),
                ];
                out.extend(self.end_round());
                out
            }
            Verdict::Suppressed => {
                debug!(drawer = %author, "drawer typed the word, suppressing");
                Vec::new()
            }
            Verdict::Miss => vec![(Recipient::All, ServerEvent::ChatMessage { user, text })],
        }
    }

    // -----------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------

    /// Advances the running countdown or round by one tick.
    pub fn tick(&mut self) -> Outbound {
        match &mut self.stage {
            Stage::Waiting => {
                warn!("tick while waiting, disarming timer");
                self.timer.disarm();
                Vec::new()
            }
            Stage::Countdown { remaining } => {
                *remaining = remaining.saturating_sub(1);
                let remaining = *remaining;
                debug!(remaining, "countdown tick");

                let mut out = vec![(Recipient::All, ServerEvent::CountdownTick { remaining })];
                if remaining == 0 {
                    out.extend(self.start_round());
                }
                out
            }
            Stage::Playing(round) => {
                round.remaining = round.remaining.saturating_sub(1);
                let remaining = round.remaining;
                trace!(remaining, "round tick");

                let mut out = vec![(Recipient::All, ServerEvent::TimeUpdate { remaining })];
                if remaining == 0 {
                    info!("round time is up");
                    out.extend(self.end_round());
                }
                out
            }
        }
    }

    /// The single timer is always disarmed before it is armed again.
    fn rearm_timer(&mut self) {
        self.timer.disarm();
        self.timer.arm();
    }

    // -----------------------------------------------------------------
    // Phase transitions
    // -----------------------------------------------------------------

    fn start_countdown(&mut self) -> Outbound {
        let remaining = self.config.countdown_ticks;
        self.stage = Stage::Countdown { remaining };
        self.rearm_timer();
        info!(players = self.roster.len(), remaining, "countdown started");
        vec![(Recipient::All, ServerEvent::CountdownTick { remaining })]
    }

    fn cancel_countdown(&mut self) -> Outbound {
        self.timer.disarm();
        self.stage = Stage::Waiting;
        info!(players = self.roster.len(), "countdown cancelled");
        vec![
            (Recipient::All, ServerEvent::CountdownCancelled),
            (Recipient::All, self.roster_update()),
        ]
    }

    fn start_round(&mut self) -> Outbound {
        self.timer.disarm();

        let Some(&drawer) = self.roster.ids().choose(&mut self.rng) else {
            warn!("no players left to draw, back to waiting");
            self.stage = Stage::Waiting;
            return vec![(Recipient::All, self.room_state())];
        };
        let Some(word) = self.config.vocabulary.choose(&mut self.rng).cloned() else {
            warn!("empty vocabulary, back to waiting");
            self.stage = Stage::Waiting;
            return vec![(Recipient::All, self.room_state())];
        };
        let drawer_name = self
            .roster
            .get(drawer)
            .map(|p| p.username.clone())
            .unwrap_or_default();

        self.canvas.reset();
        let duration = self.config.round_ticks;
        self.stage = Stage::Playing(ActiveRound {
            drawer,
            drawer_name: drawer_name.clone(),
            word: word.clone(),
            remaining: duration,
        });
        self.rearm_timer();
        info!(%drawer, duration, "round started");

        vec![
            (
                Recipient::All,
                ServerEvent::CanvasReset {
                    color: self.canvas.background(),
                },
            ),
            (
                Recipient::All,
                ServerEvent::RoundStart {
                    drawer,
                    drawer_name,
                    duration,
                },
            ),
            (Recipient::Player(drawer), ServerEvent::SecretWord { word }),
        ]
    }

    /// Shared by every way a round can end: the timer ran out, the word
    /// was guessed, or players left.
    fn end_round(&mut self) -> Outbound {
        self.timer.disarm();
        let stage = std::mem::replace(&mut self.stage, Stage::Waiting);
        self.roster.reset_readiness();

        let mut out = Vec::with_capacity(2);
        if let Stage::Playing(round) = stage {
            let metrics = self.timer.metrics_since_arm();
            info!(
                drawer = %round.drawer,
                late_ticks = metrics.total_overruns,
                skipped_ticks = metrics.total_skipped,
                "round ended"
            );
            out.push((
                Recipient::All,
                ServerEvent::RoundEnd {
                    word: round.word,
                    drawer: round.drawer,
                    drawer_name: round.drawer_name,
                },
            ));
        }
        out.push((Recipient::All, self.roster_update()));
        out
    }
}
