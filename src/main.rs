use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crackview::api;
use crackview::error::AppError;
use crackview::model::Language;
use crackview::service;
use crackview::settings::{self, Settings};
use crackview::state::AppState;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "crackview",
    about = "Run solutions against typed argument specifications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to config/crackview.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        #[arg(long)]
        host: Option<IpAddr>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate, compile and run once
    Run {
        #[arg(long)]
        lang: Language,
        /// Argument specification file
        #[arg(long)]
        input: PathBuf,
        /// Solution source file
        #[arg(long)]
        solution: PathBuf,
    },
    /// Print the generated program without running it
    Generate {
        #[arg(long)]
        lang: Language,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        solution: PathBuf,
    },
    /// List enabled languages
    Languages,
}

// ── Commands ─────────────────────────────────────────────────────

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| AppError::IoError {
        message: format!("{}: {e}", path.display()),
    })
}

async fn serve(
    settings: Settings,
    host: Option<IpAddr>,
    port: Option<u16>,
) -> Result<i32, AppError> {
    let host = match host {
        Some(host) => host,
        None => settings
            .host
            .parse::<IpAddr>()
            .map_err(|e| AppError::ConfigError {
                message: format!("invalid host `{}`: {e}", settings.host),
            })?,
    };
    let addr = SocketAddr::new(host, port.unwrap_or(settings.port));
    let state = Arc::new(AppState::new(settings)?);
    api::serve(state, addr).await?;
    Ok(0)
}

async fn run_once(
    settings: Settings,
    lang: Language,
    input: &Path,
    solution: &Path,
    json: bool,
) -> Result<i32, AppError> {
    let state = AppState::new(settings)?;
    let (input, solution) = (read(input)?, read(solution)?);

    let result = tokio::select! {
        result = service::execute_text(&state, None, &input, &solution, lang.name()) => result?,
        _ = tokio::signal::ctrl_c() => return Err(AppError::Cancelled),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    } else {
        print!("{}", result.output);
        eprint!("{}", result.error);
    }
    Ok(i32::from(result.is_compile_error()))
}

fn generate(
    settings: Settings,
    lang: Language,
    input: &Path,
    solution: &Path,
    json: bool,
) -> Result<i32, AppError> {
    let state = AppState::new(settings)?;
    let request = service::prepare(&state, &read(input)?, &read(solution)?, lang.name())?;
    let source = service::synthesize(&state, &request)?;
    if json {
        let value = serde_json::json!({ "language": request.language, "source": source });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        print!("{source}");
    }
    Ok(0)
}

fn languages(settings: &Settings, json: bool) -> i32 {
    if json {
        println!("{}", serde_json::to_string(&settings.languages).unwrap_or_default());
    } else {
        for language in &settings.languages {
            println!("{language}");
        }
    }
    0
}

async fn run(cli: Cli) -> Result<i32, AppError> {
    let settings = settings::load_settings(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve { host, port } => serve(settings, host, port).await,
        Commands::Run {
            lang,
            input,
            solution,
        } => run_once(settings, lang, &input, &solution, cli.json).await,
        Commands::Generate {
            lang,
            input,
            solution,
        } => generate(settings, lang, &input, &solution, cli.json),
        Commands::Languages => Ok(languages(&settings, cli.json)),
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
