use commands::*;
use config::Config;
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, error, info};
use serenity::all::{CreateInteractionResponse, Message, MessageId};
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;
use store::{RecordStore, SqliteStore};
use tokio::sync::RwLock;
use tokio::time::Instant;
mod commands;
mod config;
mod error;
mod models;
mod pagination;
mod store;
mod time;
mod utils;

struct Handler;

impl TypeMapKey for Bot {
    type Value = Arc<Bot>;
}

// How often idle log views are swept (1 minute)
const LOG_VIEW_SWEEP_INTERVAL: u64 = 60;

pub struct Bot {
    pub config: Config,
    pub records: Box<dyn RecordStore>,
    pub log_views: RwLock<HashMap<MessageId, LogSession>>,
    sweeper_started: AtomicBool,
}

impl Bot {
    pub fn new(config: Config, records: Box<dyn RecordStore>) -> Self {
        Self {
            config,
            records,
            log_views: RwLock::new(HashMap::new()),
            sweeper_started: AtomicBool::new(false),
        }
    }
}

async fn bot(ctx: &Context) -> Arc<Bot> {
    let data = ctx.data.read().await;
    data.get::<Bot>()
        .cloned()
        .expect("Bot is inserted before the client starts")
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        // Commands only work in servers
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let bot = bot(&ctx).await;
        let Some(invocation) = parse_invocation(&bot.config.prefix, &msg.content) else {
            return;
        };
        let Some(spec) = find_command(&invocation.name) else {
            return;
        };

        info!(
            "Command invoked: {}{} by {} (ID: {}) in guild {}",
            bot.config.prefix, invocation.name, msg.author.name, msg.author.id, guild_id
        );

        let now = Instant::now();
        let result = run_command(&ctx, &bot, &msg, guild_id, spec, &invocation.args).await;

        if let Err(why) = result {
            report_error(&ctx, &msg, &invocation.name, &why).await;
        }

        info!(
            "Command {} executed in {} ms",
            invocation.name,
            now.elapsed().as_millis()
        );
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };

        if !component
            .data
            .custom_id
            .starts_with(pagination::PageAction::CUSTOM_ID_PREFIX)
        {
            return;
        }

        info!("Component interaction: {}", component.data.custom_id);
        let bot = bot(&ctx).await;
        if let Err(why) = handle_logs_page(&ctx, &bot, &component).await {
            error!("Error handling log page button: {}", why);
            if let Err(e) = component
                .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
                .await
            {
                error!("Error responding to component interaction: {}", e);
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let bot = bot(&ctx).await;
        // Ready fires again on reconnect, only one sweeper is needed
        if bot.sweeper_started.swap(true, Ordering::SeqCst) {
            return;
        }

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(StdDuration::from_secs(LOG_VIEW_SWEEP_INTERVAL));

            loop {
                interval.tick().await;
                close_expired_views(&ctx, &bot).await;
            }
        });
    }
}

#[tokio::main]
async fn main() {
    // Initialize logger
    let colors_line = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::BrightCyan)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors_line.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for(env!("CARGO_PKG_NAME"), LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()
        .expect("Failed to initialize logger");

    let config = Config::from_env();

    let records = SqliteStore::connect(&config.database_url)
        .await
        .expect("Couldn't open the sqlite record store");

    let intents =
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILDS;

    let token = config.token.clone();
    let bot_data = Arc::new(Bot::new(config, Box::new(records)));

    let mut client = Client::builder(token, intents)
        .event_handler(Handler)
        .await
        .expect("Error creating client");

    {
        let mut data = client.data.write().await;
        data.insert::<Bot>(bot_data);
    }

    // Start the bot
    if let Err(why) = client.start().await {
        error!("An error occurred while running the client: {:?}", why);
    }
}
