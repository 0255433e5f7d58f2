//! Process-local bookkeeping of running rounds.

use super::stats::Mode;
use ahash::{HashSet, RandomState};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::{sync::Mutex, task::AbortHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundKey {
    pub guild: GuildId,
    pub channel: ChannelId,
    pub user: UserId,
}

#[derive(Debug)]
pub struct ActiveRound {
    pub id: u64,
    pub mode: Mode,
    pub code: String,
    pub answers: HashSet<String>,
    pub wager: i64,
    pub started_at: DateTime<Utc>,
    pub prompt: MessageId,
    pub timeout: Option<AbortHandle>,
}

impl ActiveRound {
    pub fn cancel_timeout(&self) {
        if let Some(timeout) = &self.timeout {
            timeout.abort();
        }
    }
}

#[derive(Debug, Default)]
pub struct RoundRegistry {
    next_id: AtomicU64,
    rounds: DashMap<RoundKey, ActiveRound, RandomState>,
    locks: DashMap<RoundKey, Arc<Mutex<()>>, RandomState>,
    player_locks: DashMap<(GuildId, UserId), Arc<Mutex<()>>, RandomState>,
    recent: DashMap<GuildId, VecDeque<String>, RandomState>,
}

impl RoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
    /// The mutex guarding every check-then-mutate step on `key`.
    pub fn lock(&self, key: RoundKey) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(key).or_default())
    }
    /// The mutex guarding every read-modify-write of a player's stats row.
    /// Always taken after the round lock, never before.
    pub fn player_lock(&self, guild: GuildId, user: UserId) -> Arc<Mutex<()>> {
        Arc::clone(&self.player_locks.entry((guild, user)).or_default())
    }
    pub fn contains(&self, key: RoundKey) -> bool {
        self.rounds.contains_key(&key)
    }
    pub fn insert(&self, key: RoundKey, round: ActiveRound) {
        self.rounds.insert(key, round);
    }
    pub fn inspect<R>(&self, key: RoundKey, f: impl FnOnce(&ActiveRound) -> R) -> Option<R> {
        self.rounds.get(&key).map(|round| f(&round))
    }
    /// Removes the round if it is still the one with id `id`.
    /// Callers must hold the lock of `key`.
    pub fn take(&self, key: RoundKey, id: u64) -> Option<ActiveRound> {
        self.rounds
            .remove_if(&key, |_, round| round.id == id)
            .map(|(_, round)| round)
    }
    pub fn remember(&self, guild: GuildId, code: &str, depth: usize) {
        if depth == 0 {
            return;
        }
        let mut recent = self.recent.entry(guild).or_default();
        recent.push_back(code.to_owned());
        while recent.len() > depth {
            recent.pop_front();
        }
    }
    pub fn recent(&self, guild: GuildId) -> Vec<String> {
        self.recent
            .get(&guild)
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default()
    }
}
