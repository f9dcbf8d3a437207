//! colscout CLI - sample tables, classify columns, pick QA key columns
//!
//! Usage:
//!   colscout [--config colscout.toml] <collect|classify|run|analyze|all>
//!
//! Connection details come from the environment (HOST, PORT, USER,
//! PASSWORD, HTTP_SCHEME, CATALOG, VERIFY, LLM_HOST, LLM_MODEL, TABLE_LIST).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colscout::config::{EnvConfig, LlmConfig, Settings};
use colscout::engine::EngineClient;
use colscout::llm::OllamaClient;
use colscout::metadata::EngineSampler;
use colscout::pipeline::{self, PipelineResult};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "colscout")]
#[command(about = "colscout - propose QA key columns for a set of warehouse tables")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $COLSCOUT_CONFIG, ./colscout.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Commands {
    /// Sample every table in TABLE_LIST and write the table-info document
    Collect,
    /// Classify the columns of every table in the table-info document
    Classify,
    /// Collect, then classify
    Run,
    /// Aggregate classifications and select QA key columns
    Analyze,
    /// Every stage, in order
    All,
}

impl Commands {
    fn needs_engine(self) -> bool {
        matches!(self, Commands::Collect | Commands::Run | Commands::All)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(path: Option<PathBuf>) -> PipelineResult<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", id = %run_id, command = ?cli.command);

    match execute(cli).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> PipelineResult<()> {
    let settings = load_settings(cli.config)?;

    // Engine-backed stages need the whole environment; the rest only the model.
    let (env, llm) = if cli.command.needs_engine() {
        let env = EnvConfig::from_env()?;
        let llm = env.llm.clone();
        (Some(env), llm)
    } else {
        (None, LlmConfig::from_env()?)
    };
    let model = OllamaClient::new(&llm);

    let start = std::time::Instant::now();
    tracing::info!(model = model.model(), "pipeline started");

    if let Some(env) = &env {
        let client =
            EngineClient::with_timeout(env.connection.clone(), settings.sampling.request_timeout())?;
        let sampler = EngineSampler::new(client);
        pipeline::run_collect(&sampler, &env.tables, &settings).await?;
    }

    if matches!(cli.command, Commands::Classify | Commands::Run | Commands::All) {
        pipeline::run_classify(&model, &settings).await?;
    }

    if matches!(cli.command, Commands::Analyze | Commands::All) {
        pipeline::run_analyze(&model, &settings).await?;
    }

    tracing::info!(elapsed = ?start.elapsed(), "pipeline finished");
    Ok(())
}
