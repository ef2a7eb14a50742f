mod platform;

use std::path::PathBuf;

use clap::Parser;
use docchat_logging::{chat_warn, LogDestination};
use log::LevelFilter;

use platform::config::{read_config, AppConfig, DEFAULT_CONFIG_FILENAME};

/// Chat with your uploaded documents from the terminal.
#[derive(Debug, Parser)]
#[command(name = "docchat", version, about)]
struct Args {
    /// RON configuration file; missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,
    /// Retrieval backend base URL.
    #[arg(long)]
    backend_url: Option<String>,
    /// Text-to-speech endpoint URL.
    #[arg(long)]
    speech_url: Option<String>,
    /// Signed-in user's email, sent as the caller identity.
    #[arg(long)]
    email: Option<String>,
    /// Signed-in user's display name.
    #[arg(long)]
    name: Option<String>,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
    /// Mirror the log to stderr as well as the log file.
    #[arg(long)]
    log_to_terminal: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, config_error) = match read_config(&args.config) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    if let Some(url) = args.speech_url {
        config.speech_url = url;
    }
    config.override_session(args.name, args.email);

    let destination = if args.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    docchat_logging::initialize(destination, level, &config.log_file);
    if let Some(err) = config_error {
        chat_warn!("{}; using defaults", err);
    }

    platform::app::run_app(config)
}
