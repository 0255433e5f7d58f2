#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::unreadable_literal,
    clippy::cast_possible_wrap
)]

mod commands;
mod config;
mod constants;
mod database;
mod error_handler;
mod events;
mod message_utils;
mod quiz;

use std::sync::Arc;

use anyhow::{Context, Result};
use commands::{flag, help, leaderboard, register, stats, Data};
use config::Config;
use database::Database;
use poise::{
    builtins,
    serenity_prelude::{ClientBuilder, Command, CreateAllowedMentions, GatewayIntents},
    Framework, FrameworkOptions, PrefixFrameworkOptions,
};
use quiz::{gateway::DiscordGateway, FlagQuiz};
use tokio::task;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = Config::from_env().context("invalid configuration")?;
    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .context("failed to open the database")?,
    );
    let quiz_config = config.quiz;
    let options = FrameworkOptions {
        commands: vec![
            flag::flag(),
            leaderboard::leaderboard(),
            stats::stats(),
            help::help(),
            register::register(),
        ],
        prefix_options: PrefixFrameworkOptions {
            prefix: Some("!".into()),
            ..Default::default()
        },
        on_error: |err| {
            Box::pin(async move {
                if let Err(err) = error_handler::handle(err).await {
                    error!("Error while handling error: {}", err);
                }
            })
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::event_handler(ctx, event, framework, data))
        },
        allowed_mentions: Some(
            CreateAllowedMentions::new()
                .all_roles(false)
                .all_users(true)
                .replied_user(true),
        ),
        ..Default::default()
    };
    let framework = Framework::builder()
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                let gateway = Arc::new(DiscordGateway::new(ctx.http.clone(), ctx.cache.clone()));
                let quiz = Arc::new(FlagQuiz::new(db, gateway, quiz_config));
                task::spawn({
                    let quiz = Arc::clone(&quiz);
                    async move { quiz.load_catalog().await }
                });
                Command::set_global_commands(
                    ctx,
                    builtins::create_application_commands(&framework.options().commands),
                )
                .await?;
                info!("Logged in as {}", ready.user.name);
                Ok(Data { quiz })
            })
        })
        .options(options)
        .build();
    let mut client = ClientBuilder::new(
        config.token,
        GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT,
    )
    .framework(framework)
    .await?;
    Ok(client.start().await?)
}
