mod server;

use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hyperparam_report::{compute_summaries, render, ReportConfig, ReportFormat};

#[derive(Parser)]
#[command(
    name = "hyperparam-report",
    about = "Compare hyperparameter configurations across experiment runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    Report(ReportArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct ReportArgs {
    #[arg(long)]
    logs_dir: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "tsv")]
    format: String,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long)]
    logs_dir: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Report(ReportArgs {
        format: "tsv".to_string(),
        ..ReportArgs::default()
    }));

    match command {
        Command::Report(args) => run_report(args),
        Command::Serve(args) => {
            let config = load_config(args.config.clone(), args.logs_dir.clone())?;
            server::serve(args, config).await
        }
    }
}

fn run_report(args: ReportArgs) -> Result<(), String> {
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| format!("invalid report format: {}", args.format))?;
    let config = load_config(args.config, args.logs_dir)?;

    let summaries = compute_summaries(&HashMap::new(), &config).map_err(|err| err.to_string())?;
    let doc = render(&summaries, format).map_err(|err| err.to_string())?;
    print!("{}", doc);
    if format == ReportFormat::Json {
        println!();
    }
    Ok(())
}

fn load_config(
    path: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
) -> Result<ReportConfig, String> {
    let (config, config_path) = ReportConfig::load(path).map_err(|err| err.to_string())?;
    if let Some(path) = config_path {
        tracing::debug!(path = %path.display(), "config path");
    }
    Ok(match logs_dir {
        Some(root) => config.with_logs_root(root),
        None => config,
    })
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
