#![forbid(unsafe_code)]

mod announcement_service;
mod commands;
mod engine;
mod models;
mod poise_error_handler;
mod repository;
mod utils;

use std::{process::exit, sync::Arc};

use announcement_service::AnnouncementService;

use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use repository::{
    FormationRepository, GuessRepository, PersonRepository, RoundRepository, TeamRepository,
};
use serde::Deserialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::{select, signal, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::media::{MediaDirectory, MediaResolver};

#[derive(Debug, Deserialize)]
struct AppConfig {
    discord_bot_token: String,
    database_url: String,
    register_commands_globally: Option<bool>,
    register_commands_in_guilds: Option<Vec<u64>>,
    /// Channel for round announcements. No announcements without it.
    announcement_channel: Option<u64>,
    /// Directory that picture question references resolve against.
    media_dir: Option<String>,
}

pub struct BotState {
    pub round_repository: Arc<RoundRepository>,
    pub guess_repository: Arc<GuessRepository>,
    pub team_repository: Arc<TeamRepository>,
    pub person_repository: Arc<PersonRepository>,
    pub formation_repository: Arc<FormationRepository>,
    pub media: Arc<dyn MediaResolver>,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "pub_quiz_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let shutdown_notify = Arc::new(Notify::new());
    let announcement_shutdown = shutdown_notify.clone();

    let media_dir = app_config.media_dir.as_deref().unwrap_or("media");
    info!("Serving question pictures from {media_dir}");

    let app_state = BotState {
        round_repository: Arc::new(RoundRepository::new(db_pool.clone())),
        guess_repository: Arc::new(GuessRepository::new(db_pool.clone())),
        team_repository: Arc::new(TeamRepository::new(db_pool.clone())),
        person_repository: Arc::new(PersonRepository::new(db_pool.clone())),
        formation_repository: Arc::new(FormationRepository::new(db_pool.clone())),
        media: Arc::new(MediaDirectory::new(media_dir)),
    };

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::guess(),
                commands::status(),
                commands::answers(),
                commands::rename(),
                commands::register(),
                commands::team(),
                commands::quiz(),
            ],
            on_error: |error| Box::pin(handle_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    if let Some(true) = app_config.register_commands_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = app_config.register_commands_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    match app_config.announcement_channel {
                        Some(channel) => AnnouncementService::create_and_start(
                            announcement_shutdown,
                            ctx.http.clone(),
                            ChannelId::new(channel),
                            app_state.round_repository.clone(),
                            app_state.team_repository.clone(),
                        ),
                        None => info!("No announcement channel configured"),
                    }

                    Ok(app_state)
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let mut client = match ClientBuilder::new(app_config.discord_bot_token, GatewayIntents::empty())
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_waiters();
            client.shard_manager.shutdown_all().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let pool = SqlitePoolOptions::new().connect(url).await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
