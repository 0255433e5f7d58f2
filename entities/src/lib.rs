pub mod prelude;

pub mod achievement;
pub mod flag_player;
pub mod flag_quiz_guild;
pub mod flag_stat;
