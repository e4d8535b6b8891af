use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use subtitle_service::api::ApiServer;
use subtitle_service::{create_llm, Config, SubtitleGenerator, YouTubeResolver};

#[tokio::main]
async fn main() -> Result<()> {
    // Local development keeps secrets in .env
    let dotenv_path = dotenvy::dotenv().ok();

    let matches = Command::new("Subtitle Service")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Translate a video's transcript into chunked subtitle segments over HTTP")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (defaults to subtitle-service.toml lookup)")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
        )
        .arg(
            Arg::new("static-dir")
                .short('s')
                .long("static-dir")
                .value_name("DIR")
                .help("Directory holding the front-end files")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_filter = if verbose {
        "subtitle_service=debug,tower_http=debug,info"
    } else {
        "subtitle_service=info,tower_http=info,warn"
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    // Load configuration: file, then environment, then command line
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.apply_env();

    config.apply_cli_overrides(
        matches.get_one::<u16>("port").copied(),
        matches.get_one::<String>("static-dir").map(PathBuf::from),
    );

    config.validate().context("Invalid configuration")?;
    info!("{}", config.summary());

    if !config.index_path().exists() {
        warn!(
            "Front-end entry file {} not found; GET / will return 404",
            config.index_path().display()
        );
    }

    // Process-wide collaborators, built once and shared by every request
    let llm = create_llm(&config.llm).context("Failed to create model client")?;
    let resolver = Arc::new(
        YouTubeResolver::new(config.metadata.clone())
            .context("Failed to create metadata resolver")?,
    );
    let generator = Arc::new(SubtitleGenerator::new(llm, resolver, &config.subtitles));

    info!("🚀 Subtitle Service starting...");
    ApiServer::new(Arc::new(config), generator).run().await
}
