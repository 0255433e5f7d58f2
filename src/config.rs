use crate::constants::{
    BET_TIME_LIMIT, DATABASE_URL, MAX_ROUND_POINTS, MAX_WAGER, POINTS_DAILY, POINTS_EASY,
    POINTS_NORMAL, RECENT_CODE_DEPTH, STREAK_MILESTONES, TIME_LIMIT,
};
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnvVar(&'static str),
    #[error("environment variable {name} has an invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug)]
pub struct Config {
    pub token: String,
    pub database_url: String,
    pub quiz: QuizConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: env::var("TOKEN").map_err(|_| ConfigError::MissingEnvVar("TOKEN"))?,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_owned()),
            quiz: QuizConfig::from_env()?,
        })
    }
}

/// Tunables of the round engine.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub time_limit: Duration,
    pub bet_time_limit: Duration,
    pub points_normal: i64,
    pub points_easy: i64,
    pub points_daily: i64,
    /// Upper bound on what a single round can pay out, bet payouts included.
    pub max_round_points: i64,
    pub max_wager: i64,
    /// How many recently shown codes per guild are excluded from random picks.
    pub recent_depth: usize,
    pub streak_milestones: Vec<i64>,
}

impl QuizConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            time_limit: env_or("FLAG_QUIZ_TIME_LIMIT_SECS", defaults.time_limit.as_secs())
                .map(Duration::from_secs)?,
            bet_time_limit: env_or(
                "FLAG_QUIZ_BET_TIME_LIMIT_SECS",
                defaults.bet_time_limit.as_secs(),
            )
            .map(Duration::from_secs)?,
            max_round_points: env_or("FLAG_QUIZ_MAX_ROUND_POINTS", defaults.max_round_points)?,
            max_wager: env_or("FLAG_QUIZ_MAX_WAGER", defaults.max_wager)?,
            recent_depth: env_or("FLAG_QUIZ_RECENT_DEPTH", defaults.recent_depth)?,
            ..defaults
        })
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            time_limit: TIME_LIMIT,
            bet_time_limit: BET_TIME_LIMIT,
            points_normal: POINTS_NORMAL,
            points_easy: POINTS_EASY,
            points_daily: POINTS_DAILY,
            max_round_points: MAX_ROUND_POINTS,
            max_wager: MAX_WAGER,
            recent_depth: RECENT_CODE_DEPTH,
            streak_milestones: STREAK_MILESTONES.to_vec(),
        }
    }
}

fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
