//! Shopcast Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Update};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use shopcast::{
    config::Settings,
    database::{connection, UserRepository},
    handlers::{callbacks, commands::start, messages},
    services::AdminGate,
    state::SessionStore,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must outlive the dispatcher
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", shopcast::info());

    // Initialize database
    info!("Connecting to database...");
    let pool = connection::create_pool(&settings.database).await?;
    connection::run_migrations(&pool).await?;

    // Initialize bot and collaborators
    let bot = Bot::new(settings.bot.token.clone());
    let repo = Arc::new(UserRepository::new(pool));
    let gate = Arc::new(AdminGate::new(
        bot.clone(),
        ChatId(settings.bot.admin_group_id),
    ));
    let sessions = Arc::new(SessionStore::new());
    let settings = Arc::new(settings);

    info!("Setting up bot handlers...");

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![repo, gate, sessions, settings])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Shopcast bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("Shopcast bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_message)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Shopcast Bot Commands")]
enum Command {
    #[command(description = "Start the bot: register, or open the admin menu")]
    Start,
}

/// Handle bot commands
async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
) -> HandlerResult {
    let result = match cmd {
        Command::Start => start::handle_start(bot, msg, repo, gate, sessions).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle free-text messages
async fn handle_message(
    bot: Bot,
    msg: Message,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
    settings: Arc<Settings>,
) -> HandlerResult {
    if let Err(e) = messages::handle_message(bot, msg, repo, gate, sessions, settings).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callback(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
) -> HandlerResult {
    if let Err(e) = callbacks::handle_callback_query(bot, query, repo, gate, sessions).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
