// src/main.rs - beergame-coach entry point

use clap::Parser;
use std::sync::Arc;

use beergame_coach::api::{self, ApiState, SessionDefaults};
use beergame_coach::cli::{chat, ChatArgs, Cli, Commands};
use beergame_coach::coach::{CoachService, Session, SessionEvent};
use beergame_coach::infra::config::Config;
use beergame_coach::infra::logger;
use beergame_coach::persistence::PersistenceAdapter;
use beergame_coach::provider::fallback::ResponseGenerator;
use beergame_coach::provider::openai::OpenAIProvider;
use beergame_coach::storage;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Needs neither a model nor a store
    if let Some(Commands::Prompts { mode }) = &cli.command {
        let mode = mode.unwrap_or(config.coach.mode);
        println!("# {} ({})\n", mode.display_name(), mode.key());
        println!("{}", mode.prompt());
        return Ok(());
    }

    let service = Arc::new(build_service(&config).await?);

    match cli.command {
        Some(Commands::Serve { port }) => {
            let mut api_config = config.api.clone();
            if let Some(port) = port {
                api_config.port = port;
            }
            let state = ApiState::new(
                service,
                SessionDefaults::from(&config.coach),
                api_config.token.clone(),
            );
            api::start_server(&api_config, state).await
        }
        Some(Commands::Chat(args)) => run_chat(&service, &config, args).await,
        Some(Commands::Prompts { .. }) => Ok(()),
        None => run_chat(&service, &config, ChatArgs::default()).await,
    }
}

async fn build_service(config: &Config) -> anyhow::Result<CoachService> {
    let provider = OpenAIProvider::from_env(&config.models.base_url)?;
    let generator = ResponseGenerator::new(
        Arc::new(provider),
        config.models.primary.clone(),
        config.models.fallback.clone(),
    );

    // A store that cannot be reached stops the program before any session starts.
    let store = storage::open(&config.storage).await?;
    tracing::info!(store = %store.name(), "Transcript store ready");

    let persistence = PersistenceAdapter::new(store, config.storage.scratch_dir());
    Ok(CoachService::new(generator, persistence))
}

async fn run_chat(service: &CoachService, config: &Config, args: ChatArgs) -> anyhow::Result<()> {
    let mode = args.mode.unwrap_or(config.coach.mode);
    let session =
        Session::new(mode, &config.coach.sections).with_autosave(args.autosave || config.coach.autosave);

    let mut setup = Vec::new();
    if let Some(section) = args.section {
        setup.push(SessionEvent::SelectSection { section });
    }
    if let Some(participant_id) = args.participant {
        setup.push(SessionEvent::EnterParticipant { participant_id });
    }
    if let Some(role) = args.role {
        setup.push(SessionEvent::SelectRole { role });
    }

    chat::run_chat(service, session, setup).await
}
