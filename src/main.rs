use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use kenshoku::api::{self, AppState};
use kenshoku::commands::{print_help, CommandHandler, Flow};
use kenshoku::config::{ConfigError, ProviderConfig, ProviderKind};
use kenshoku::food::api::LookupError;
use kenshoku::food::config::FoodConfig;
use kenshoku::llm::{ChatAssistant, SectionGateway};
use kenshoku::profile::UserProfile;
use kenshoku::providers::create_provider;
use kenshoku::providers::traits::CompletionProvider;
use kenshoku::ResolutionPipeline;
use log::info;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Scan food, get nutrition facts and personalized advice", long_about = None)]
struct Args {
    /// Serve the JSON API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "5000")]
    port: u16,

    /// groq or gemini; defaults to LLM_PROVIDER, then groq
    #[arg(long)]
    provider: Option<String>,

    /// JSON file with profile fields for the interactive prompt
    #[arg(long)]
    profile: Option<PathBuf>,

    #[arg(long, default_value = "256")]
    max_sessions: usize,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Lookup client error: {0}")]
    Lookup(#[from] LookupError),
    #[error("Profile error: {0}")]
    Profile(String),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Terminal error: {0}")]
    Terminal(#[from] ReadlineError),
}

struct Services {
    pipeline: ResolutionPipeline,
    provider: Arc<dyn CompletionProvider>,
}

fn build_services(args: &Args) -> Result<Services, AppError> {
    let kind: ProviderKind = match &args.provider {
        Some(name) => name.parse()?,
        None => env::var("LLM_PROVIDER")
            .ok()
            .map(|name| name.parse::<ProviderKind>())
            .transpose()?
            .unwrap_or_default(),
    };

    let provider_config = ProviderConfig::from_env(kind)?;
    let provider = create_provider(&provider_config).map_err(|e| AppError::Provider(e.to_string()))?;
    info!("Using {} provider", kind);

    let food_config = FoodConfig::from_env();
    let pipeline = ResolutionPipeline::from_config(&food_config, Arc::clone(&provider))?;

    Ok(Services { pipeline, provider })
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let services = build_services(&args)?;
    if let Ok(models) = services.provider.get_model_info().await {
        info!("Models: {}", models);
    }

    if args.api {
        run_api_server(&args, services).await
    } else {
        run_cli_mode(&args, services).await
    }
}

async fn run_api_server(args: &Args, services: Services) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let state = AppState::new(services.pipeline, services.provider, args.max_sessions);
    let app = api::create_api(state);

    let listener = TcpListener::bind(addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_cli_mode(args: &Args, services: Services) -> Result<(), AppError> {
    let profile = match &args.profile {
        Some(path) => UserProfile::from_file(path).map_err(|e| AppError::Profile(e.to_string()))?,
        None => UserProfile::new(),
    };

    let mut command_handler = CommandHandler::new(
        services.pipeline,
        SectionGateway::new(Arc::clone(&services.provider)),
        ChatAssistant::new(services.provider),
        profile,
    );

    print_help();

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("🥗 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
