use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pricelens_lib::config::{ApiKey, AppConfig, LlmArgs, LlmSettings, ServerArgs, ServerSettings};
use pricelens_lib::input::{decode_upload, normalize_transcript};
use pricelens_lib::server::{self, ServerAppState};
use pricelens_lib::{ProductType, Stage};

/// PriceLens - pricing strategy reports from customer-interview transcripts
#[derive(Parser, Debug)]
#[command(name = "pricelens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    #[command(flatten)]
    server: ServerArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API and web UI
    Serve,

    /// Analyze a single transcript and print the markdown report
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Transcript file (.txt or .md); reads stdin when omitted or "-"
    file: Option<PathBuf>,

    /// Product type, e.g. "SaaS" or "Marketplace"
    #[arg(long, default_value = "SaaS")]
    product_type: ProductType,

    /// Company stage, e.g. "Pre-revenue" or "Growth"
    #[arg(long, default_value = "Pre-revenue")]
    stage: Stage,

    /// Also print the intermediate market analysis
    #[arg(long)]
    show_analysis: bool,

    /// Write the report to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() {
    // Must run before parsing so clap's `env` lookups see .env values
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dotenv {
        Ok(path) => log::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Failed to load .env file: {}", e),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::new(
        ApiKey::from_raw(cli.llm.openai_api_key.as_deref()),
        LlmSettings::from_args(&cli.llm)?,
        ServerSettings::from_args(&cli.server)?,
    );

    // Fail at startup, never mid-request
    config.require_credential()?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => rt.block_on(run_server_mode(config)),
        Command::Analyze(args) => rt.block_on(run_analyze(config, args)),
    }
}

async fn run_server_mode(config: AppConfig) -> Result<()> {
    let shutdown_state = pricelens_lib::shutdown::ShutdownState::new();
    if let Err(e) = pricelens_lib::shutdown::register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let state = ServerAppState::from_config(config)?;
    server::run_server(state, shutdown_state).await
}

async fn run_analyze(config: AppConfig, args: AnalyzeArgs) -> Result<()> {
    let transcript = match args.file.as_deref() {
        Some(path) if path != Path::new("-") => read_transcript_file(path)?,
        _ => read_transcript_stdin()?,
    };

    let state = ServerAppState::from_config(config)?;
    let pipeline = state
        .pipeline
        .context("Analysis pipeline is not available")?;

    log::info!(
        "Running pipeline with {} ({} chars, {}, {})",
        pipeline.model_name(),
        transcript.chars().count(),
        args.product_type,
        args.stage
    );

    let output = pipeline
        .run(&transcript, args.product_type, args.stage)
        .await?;

    let rendered = if args.show_analysis {
        format!(
            "# Market Analysis\n\n{}\n\n---\n\n{}\n",
            output.analysis, output.report
        )
    } else {
        format!("{}\n", output.report)
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Same rules as the upload endpoint: .txt/.md only, UTF-8, minimum length
fn read_transcript_file(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(decode_upload(&filename, &bytes)?)
}

fn read_transcript_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read transcript from stdin")?;
    Ok(normalize_transcript(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_transcript_file_accepts_txt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("interview.txt");
        fs::write(&path, "  Founder pays $50/mo for a competitor but hates it.\n").unwrap();

        let transcript = read_transcript_file(&path).unwrap();
        assert_eq!(
            transcript,
            "Founder pays $50/mo for a competitor but hates it."
        );
    }

    #[test]
    fn test_read_transcript_file_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.pdf");
        fs::write(&path, "Founder pays $50/mo for a competitor but hates it.").unwrap();

        let err = read_transcript_file(&path).unwrap_err();
        assert!(err.to_string().contains("Only .txt and .md"));
    }

    #[test]
    fn test_read_transcript_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_transcript_file(&dir.path().join("absent.md")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_cli_parses_analyze_subcommand() {
        let cli = Cli::parse_from([
            "pricelens",
            "--openai-api-key",
            "sk-test",
            "analyze",
            "interview.md",
            "--product-type",
            "hardware",
            "--stage",
            "Growth",
            "--show-analysis",
        ]);

        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.file, Some(PathBuf::from("interview.md")));
                assert_eq!(args.product_type, ProductType::Hardware);
                assert_eq!(args.stage, Stage::Growth);
                assert!(args.show_analysis);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::parse_from(["pricelens", "--port", "9000"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.server.port, 9000);
    }
}
