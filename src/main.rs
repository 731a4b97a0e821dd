use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use entitlement::api::{AppState, calculate_json, run_http_server};
use entitlement::core::{AreaRateTable, RateSchedule};
use entitlement::mcp::McpServer;

#[derive(Parser, Debug)]
#[command(
    name = "entitlement",
    about = "Universal Credit entitlement calculator (standard allowance, housing, child, childcare, disability and carer elements with earnings taper)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculation API over HTTP
    Serve {
        #[arg(long, env = "ENTITLEMENT_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "ENTITLEMENT_PORT", default_value_t = 8080)]
        port: u16,
        #[arg(
            long,
            env = "ENTITLEMENT_RATES",
            help = "Rate schedule TOML; defaults to the built-in 2026-27 schedule"
        )]
        rates: Option<PathBuf>,
    },
    /// Compute one entitlement from a JSON circumstances file and print the breakdown
    Calculate {
        #[arg(long, help = "Path to a JSON circumstances document")]
        input: PathBuf,
        #[arg(
            long,
            env = "ENTITLEMENT_RATES",
            help = "Rate schedule TOML; defaults to the built-in 2026-27 schedule"
        )]
        rates: Option<PathBuf>,
    },
    /// Serve the calculator as Model Context Protocol tools over stdio
    Mcp {
        #[arg(
            long,
            env = "ENTITLEMENT_RATES",
            help = "Rate schedule TOML; defaults to the built-in 2026-27 schedule"
        )]
        rates: Option<PathBuf>,
    },
}

fn load_rates(path: Option<&Path>) -> Result<RateSchedule, String> {
    match path {
        Some(path) => RateSchedule::from_file(path)
            .map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(RateSchedule::default()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { host, port, rates } => match load_rates(rates.as_deref()) {
            Ok(schedule) => {
                info!(policy_year = %schedule.policy_year, "loaded rate schedule");
                run_http_server(
                    SocketAddr::new(host, port),
                    AppState::with_defaults(schedule),
                )
                .await
                .map_err(|e| format!("Server error: {e}"))
            }
            Err(e) => Err(e),
        },
        Command::Calculate { input, rates } => load_rates(rates.as_deref()).and_then(|schedule| {
            let raw = std::fs::read_to_string(&input)
                .map_err(|e| format!("{}: {e}", input.display()))?;
            let output = calculate_json(&raw, &schedule, &AreaRateTable::lha_2026_27())?;
            println!("{output}");
            Ok(())
        }),
        Command::Mcp { rates } => load_rates(rates.as_deref()).and_then(|schedule| {
            McpServer::new(schedule, AreaRateTable::lha_2026_27())
                .run()
                .map_err(|e| format!("MCP server error: {e}"))
        }),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
