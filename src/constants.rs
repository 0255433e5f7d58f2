use std::time::Duration;

pub const DATABASE_URL: &str = "sqlite://starry_flags.sqlite?mode=rwc";

pub const SUCCESS_COLOR: u32 = 0x57F287;
pub const FAILURE_COLOR: u32 = 0xED4245;
pub const INFO_COLOR: u32 = 0xB16B91;
pub const DESCRIPTION_MAX_LENGTH: usize = 4096;

pub const TIME_LIMIT: Duration = Duration::from_secs(30);
pub const BET_TIME_LIMIT: Duration = Duration::from_secs(15);

pub const POINTS_NORMAL: i64 = 10;
pub const POINTS_EASY: i64 = 8;
pub const POINTS_DAILY: i64 = 25;
pub const MAX_ROUND_POINTS: i64 = 200;
pub const MAX_WAGER: i64 = 100;

pub const RECENT_CODE_DEPTH: usize = 5;
pub const EASY_OPTION_COUNT: usize = 4;
pub const STREAK_MILESTONES: [i64; 4] = [5, 10, 25, 50];
pub const DEFAULT_BLACKLIST: [&str; 5] = ["AQ", "BV", "HM", "UM", "TF"];

pub const LEADERBOARD_LIMIT: u64 = 10;
pub const TOP_FLAGS_MAX: u64 = 20;

pub const CATALOG_URL: &str =
    "https://restcountries.com/v3.1/all?fields=cca2,name,translations,flags";
pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(8);
pub const USER_AGENT: &str = "starry_flags (https://github.com/starry-bot/starry_flags)";

pub const CUSTOM_ID_PREFIX: &str = "flagquiz";
