pub use super::achievement::Entity as Achievement;
pub use super::flag_player::Entity as FlagPlayer;
pub use super::flag_quiz_guild::Entity as FlagQuizGuild;
pub use super::flag_stat::Entity as FlagStat;
