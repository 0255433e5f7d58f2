use crate::config::QuizConfig;
use chrono::{Datelike, NaiveDate};
use std::{fmt, time::Duration};

pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub total_points: i64,
    pub weekly_points: i64,
    pub weekly_key: String,
    pub monthly_points: i64,
    pub monthly_key: String,
    pub correct: i64,
    pub wrong: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub last_daily: Option<NaiveDate>,
}

impl PlayerStats {
    /// Fresh stats for a player that has never played, already keyed to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            weekly_key: week_key(today),
            monthly_key: month_key(today),
            ..Self::default()
        }
    }
    /// Resets the weekly and monthly counters whose period key is stale.
    /// Returns whether anything changed.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        let mut changed = false;
        let week = week_key(today);
        if self.weekly_key != week {
            self.weekly_points = 0;
            self.weekly_key = week;
            changed = true;
        }
        let month = month_key(today);
        if self.monthly_key != month {
            self.monthly_points = 0;
            self.monthly_key = month;
            changed = true;
        }
        changed
    }
    pub fn played_daily_on(&self, day: NaiveDate) -> bool {
        self.last_daily == Some(day)
    }
    /// Takes a wager up front. Period counters never go below zero.
    pub fn stake(&mut self, wager: i64) {
        self.total_points -= wager;
        self.weekly_points = (self.weekly_points - wager).max(0);
        self.monthly_points = (self.monthly_points - wager).max(0);
    }
    pub fn record_correct(&mut self, points: i64) {
        self.total_points += points;
        self.weekly_points += points;
        self.monthly_points += points;
        self.correct += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }
    pub fn record_wrong(&mut self) {
        self.wrong += 1;
        self.current_streak = 0;
    }
    pub const fn rounds(&self) -> i64 {
        self.correct + self.wrong
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagStats {
    pub asked: i64,
    pub correct: i64,
    pub wrong: i64,
}

impl FlagStats {
    /// Share of correct answers in percent, rounded.
    pub fn success_rate(&self) -> i64 {
        let answered = (self.correct + self.wrong).max(1);
        (self.correct * 100 + answered / 2) / answered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Easy,
    Daily,
    Bet,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Easy => "easy",
            Self::Daily => "daily",
            Self::Bet => "bet",
        }
    }
    pub const fn base_points(self, config: &QuizConfig) -> i64 {
        match self {
            Self::Normal | Self::Bet => config.points_normal,
            Self::Easy => config.points_easy,
            Self::Daily => config.points_daily,
        }
    }
    pub const fn time_limit(self, config: &QuizConfig) -> Duration {
        match self {
            Self::Bet => config.bet_time_limit,
            _ => config.time_limit,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points credited for a correct answer.
pub fn payout(mode: Mode, wager: i64, config: &QuizConfig) -> i64 {
    let points = match mode {
        Mode::Bet => wager.saturating_mul(2),
        _ => mode.base_points(config),
    };
    points.min(config.max_round_points).max(0)
}
