use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use sonare::app::{
    run_clean_command, run_glossify_command, run_pipeline_command, run_stream_command,
};
use sonare::cli::{Cli, Commands, ConfigAction};
use sonare::config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    tracing::debug!(version = %sonare::version_string(), "starting");

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_pipeline_command(&config, cli.quiet).await?;
        }
        Some(Commands::Run(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run_pipeline_command(&config, cli.quiet).await?;
        }
        Some(Commands::Clean(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run_clean_command(&config, cli.quiet).await?;
        }
        Some(Commands::Glossify(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run_glossify_command(&config, cli.quiet).await?;
        }
        Some(Commands::Stream(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run_stream_command(&config, cli.quiet).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "sonare", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise the level follows -q / -v.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("sonare={level}")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed; keep it.
    }
}

fn config_path(custom_path: Option<&Path>) -> PathBuf {
    custom_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        Config::load_or_default(&Config::default_path())?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let path = config_path(custom_path);
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            if path.exists() {
                println!("{}", format!("# {}", path.display()).dimmed());
            } else {
                println!(
                    "{}",
                    format!("# {} not found, showing defaults", path.display()).dimmed()
                );
            }
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            if path.exists() {
                println!("{} {}", path.display(), "(exists)".green());
            } else {
                println!("{} {}", path.display(), "(not found)".yellow());
            }
        }
        ConfigAction::Dump => {
            print!("{}", Config::default().to_toml()?);
        }
    }
    Ok(())
}
