use crate::quiz::{registry::RoundKey, FlagQuiz};
use poise::serenity_prelude::{self, GuildId};
use std::sync::Arc;
use thiserror::Error;

pub mod flag;
pub mod help;
pub mod leaderboard;
pub mod register;
pub mod stats;

pub type Context<'a> = poise::Context<'a, Data, CommandError>;

pub struct Data {
    pub quiz: Arc<FlagQuiz>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Expected(String),
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl From<serenity_prelude::Error> for CommandError {
    fn from(value: serenity_prelude::Error) -> Self {
        Self::Unexpected(value.into())
    }
}

type CommandResult = Result<(), CommandError>;

fn guild_id(ctx: Context<'_>) -> Result<GuildId, CommandError> {
    ctx.guild_id()
        .ok_or_else(|| CommandError::Expected("This command only works in servers.".into()))
}

fn round_key(ctx: Context<'_>) -> Result<RoundKey, CommandError> {
    Ok(RoundKey {
        guild: guild_id(ctx)?,
        channel: ctx.channel_id(),
        user: ctx.author().id,
    })
}
