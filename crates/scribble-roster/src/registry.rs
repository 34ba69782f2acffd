//! The player registry: who is seated, in what order, under which name.
//!
//! Three indexes are kept in sync:
//!
//! - `players` maps id → [`Player`] for O(1) lookup.
//! - `order` remembers join order, which is the order of the roster.
//! - `usernames` maps the lowercased name → id, so name uniqueness is
//!   checked without a scan.

use std::collections::HashMap;

use scribble_protocol::{PlayerId, PlayerSummary, Readiness};

use crate::{Player, RosterError};

/// Longest accepted username, in characters, after trimming.
pub const MAX_USERNAME_LEN: usize = 32;

/// All players currently seated in the room.
#[derive(Debug, Default)]
pub struct Registry {
    players: HashMap<PlayerId, Player>,
    order: Vec<PlayerId>,
    usernames: HashMap<String, PlayerId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a new player with score 0 and readiness `not-ready`.
    ///
    /// Surrounding whitespace is trimmed from `username` before any check.
    ///
    /// # Errors
    /// - [`RosterError::DuplicateIdentity`] if `id` already joined.
    /// - [`RosterError::InvalidUsername`] if the trimmed name is empty or
    ///   longer than [`MAX_USERNAME_LEN`].
    /// - [`RosterError::DuplicateUsername`] if the name is taken, ignoring case.
    pub fn join(&mut self, id: PlayerId, username: &str) -> Result<&Player, RosterError> {
        if self.players.contains_key(&id) {
            return Err(RosterError::DuplicateIdentity(id));
        }

        let username = username.trim();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(RosterError::InvalidUsername(username.to_string()));
        }

        let key = username.to_lowercase();
        if self.usernames.contains_key(&key) {
            return Err(RosterError::DuplicateUsername(username.to_string()));
        }

        self.usernames.insert(key, id);
        self.order.push(id);
        tracing::info!(player_id = %id, username, "player joined");

        Ok(self
            .players
            .entry(id)
            .or_insert_with(|| Player::new(id, username.to_string())))
    }

    /// Removes a player. Returns the removed player, or `None` if `id`
    /// was not seated (so leaving twice is harmless).
    pub fn leave(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.order.retain(|p| *p != id);
        self.usernames.remove(&player.username.to_lowercase());
        tracing::info!(player_id = %id, username = %player.username, "player left");
        Some(player)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Sets one player's readiness. Returns `false` if `id` is not seated
    /// or the readiness did not change.
    pub fn set_readiness(&mut self, id: PlayerId, readiness: Readiness) -> bool {
        match self.players.get_mut(&id) {
            Some(player) if player.readiness != readiness => {
                player.readiness = readiness;
                true
            }
            _ => false,
        }
    }

    /// Puts everyone back to `not-ready`.
    pub fn reset_readiness(&mut self) {
        for player in self.players.values_mut() {
            player.readiness = Readiness::NotReady;
        }
    }

    /// `true` if every seated player is ready. Vacuously true when empty;
    /// callers check the minimum roster size separately.
    pub fn all_ready(&self) -> bool {
        self.players.values().all(Player::is_ready)
    }

    /// Adds points to a player's score, saturating at `u32::MAX`.
    /// Returns the new score, or `None` if `id` is not seated.
    pub fn award(&mut self, id: PlayerId, points: u32) -> Option<u32> {
        let player = self.players.get_mut(&id)?;
        player.score = player.score.saturating_add(points);
        Some(player.score)
    }

    /// Player ids in join order.
    pub fn ids(&self) -> &[PlayerId] {
        &self.order
    }

    /// The roster as clients see it, in join order.
    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(Player::summary)
            .collect()
    }
}
