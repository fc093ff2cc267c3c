//! Steuer — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use steuer::{
    Cadence, ErrorPolicy, ExtractionMode, Fetcher, HttpClient, Pipeline, RequestPeriod,
    ScrapeOptions,
};
use steuer_cli::config::{resolve_endpoint, resolve_output_path};

#[derive(Parser)]
#[command(
    name = "steuer",
    about = "Steuer — fetch gross-to-net tax tables for an income range and write them as JSON lines",
    version
)]
struct Cli {
    /// First gross income to query.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Last gross income to query (inclusive).
    #[arg(long, default_value_t = 100_000)]
    stop: u32,

    /// Table layout to parse (yearly, monthly).
    #[arg(long, default_value_t = Cadence::Yearly)]
    cadence: Cadence,

    /// Accounting period requested from the calculator (fixed-yearly, follow-cadence).
    #[arg(long, default_value_t = RequestPeriod::FixedYearly)]
    request_period: RequestPeriod,

    /// How table cells map to fields (positional, labeled).
    #[arg(long, default_value_t = ExtractionMode::Positional)]
    mode: ExtractionMode,

    /// What to do when a page cannot be fetched or parsed (abort, skip).
    #[arg(long, default_value_t = ErrorPolicy::Abort)]
    on_error: ErrorPolicy,

    /// Calculator URL. Also reads STEUER_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,

    /// Output file. Also reads STEUER_OUTPUT.
    #[arg(short, long)]
    output: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "steuer", &mut std::io::stdout());
        return Ok(());
    }

    let options = ScrapeOptions {
        cadence: cli.cadence,
        period: cli.request_period,
        mode: cli.mode,
        policy: cli.on_error,
    };
    if options.cadence == Cadence::Monthly && options.period == RequestPeriod::FixedYearly {
        tracing::warn!(
            "monthly cadence with a yearly request finds no monthly cells; \
             pass --request-period follow-cadence to request monthly tables"
        );
    }

    let endpoint = resolve_endpoint(cli.endpoint.as_deref());
    let output = resolve_output_path(cli.output.as_deref());
    tracing::debug!("endpoint={endpoint} output={}", output.display());

    let fetcher = Fetcher::new(HttpClient::new()).with_endpoint(endpoint);
    let pipeline = Pipeline::new(fetcher, options);

    let code = steuer_cli::run(&pipeline, cli.start, cli.stop, &output).await;
    if code != steuer_cli::EXIT_OK {
        std::process::exit(code);
    }

    Ok(())
}
