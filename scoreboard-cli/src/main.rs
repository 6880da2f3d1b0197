mod client;
mod config;
mod output;
mod server;
mod simulate;
mod store;

use axum::http::HeaderValue;
use clap::Parser;
use scoreboard_core::constants::{DEFAULT_PAGE_SIZE, DEFAULT_TOP_LIMIT};
use scoreboard_core::{Leaderboard, LeaderboardConfig, SharedLeaderboard};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::client::ScoreboardClient;
use crate::config::ScoreboardConfig;
use crate::server::AppState;
use crate::simulate::SimulationOptions;
use crate::store::JsonlStore;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "scoreboard", version, about = "Game score tracking with a ranked leaderboard")]
struct Cli {
    /// Path to config file (default: ~/.config/scoreboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    #[command(flatten)]
    Remote(RemoteCommand),
    /// Drive an in-process board with random submissions and report timings
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/scoreboard/config.toml
    Init,
}

/// Commands that talk to a running server.
#[derive(clap::Subcommand)]
enum RemoteCommand {
    /// Submit a score to a running server
    Submit(SubmitArgs),
    /// Show one page of the leaderboard
    Leaderboard(PageArgs),
    /// Show the top of the leaderboard
    Top(TopArgs),
    /// Remove every entry with the given name
    Remove(NameArgs),
    /// Show where a player currently stands
    Standing(NameArgs),
    /// Show aggregate statistics for the board
    Summary(RemoteArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Port to listen on
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Origin allowed by CORS
    #[arg(long)]
    allowed_origin: Option<String>,

    /// JSONL file mirroring submissions and removals
    #[arg(long)]
    store: Option<PathBuf>,

    /// Entries per leaderboard page
    #[arg(long)]
    page_size: Option<usize>,

    /// Default size of the top list
    #[arg(long)]
    top_limit: Option<usize>,

    /// Reject submissions with an empty name
    #[arg(long)]
    reject_empty_names: bool,
}

#[derive(Parser)]
struct RemoteArgs {
    /// Server base URL (default: http://127.0.0.1:3500)
    #[arg(long)]
    server: Option<String>,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SubmitArgs {
    name: String,

    /// Integer score
    #[arg(allow_negative_numbers = true)]
    score: String,

    /// Display timestamp stored with the entry
    #[arg(long)]
    time: Option<String>,

    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Parser)]
struct PageArgs {
    /// 1-based page number
    #[arg(default_value_t = 1, allow_negative_numbers = true)]
    page: i64,

    /// Entries per page (server default if omitted)
    #[arg(long)]
    size: Option<usize>,

    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Parser)]
struct TopArgs {
    /// Number of entries (server default if omitted)
    #[arg(long)]
    limit: Option<usize>,

    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Parser)]
struct NameArgs {
    name: String,

    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of random submissions
    #[arg(long, default_value_t = 10_000)]
    entries: usize,

    /// Number of distinct player names to draw from
    #[arg(long, default_value_t = 500)]
    players: usize,

    /// Scores are drawn uniformly from 0..=max-score
    #[arg(long, default_value_t = 100_000)]
    max_score: i64,

    /// Page size for interleaved reads and the final listing
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Remove-by-name operations to run after the submissions
    #[arg(long, default_value_t = 10)]
    removals: usize,
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("scoreboard=debug,scoreboard_core=debug,info")
        } else {
            EnvFilter::new("scoreboard=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Init => {
            let path = config::create_default_config(&config_path);
            println!("Created config at {}", path.display());
            println!("Edit it to set your default port, store path, etc.");
        }
        Commands::Simulate(args) => {
            let options = SimulationOptions {
                entries: args.entries,
                players: args.players,
                max_score: args.max_score,
                page_size: args.page_size,
                removals: args.removals,
            };
            let report = simulate::run_simulation(&options, &mut rand::rng());
            simulate::print_report(&report);
        }
        Commands::Serve(args) => run_serve(args, config::load_config(&config_path)).await,
        Commands::Remote(command) => run_remote(command, config::load_config(&config_path)).await,
    }
}

async fn run_serve(args: ServeArgs, cfg: ScoreboardConfig) {
    // CLI wins over config, config wins over built-in defaults
    let bind = args.bind.or(cfg.bind).unwrap_or_else(|| config::DEFAULT_BIND.to_string());
    let port = args.port.or(cfg.port).unwrap_or(config::DEFAULT_PORT);
    let addr = bind_addr(&bind, port).unwrap_or_else(|e| bail(format!("Invalid bind address \"{bind}\": {e}")));

    let allowed_origin = args
        .allowed_origin
        .or(cfg.allowed_origin)
        .unwrap_or_else(|| config::DEFAULT_ALLOWED_ORIGIN.to_string());
    let allowed_origin: HeaderValue = allowed_origin
        .parse()
        .unwrap_or_else(|_| bail(format!("Invalid allowed origin \"{allowed_origin}\"")));

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    let top_limit = args.top_limit.or(cfg.top_limit).unwrap_or(DEFAULT_TOP_LIMIT);
    if page_size == 0 || top_limit == 0 {
        bail("--page-size and --top-limit must be at least 1");
    }

    let engine_config = LeaderboardConfig {
        reject_empty_names: args.reject_empty_names || cfg.reject_empty_names.unwrap_or(false),
    };

    let store_path = args.store.or(cfg.store_path);
    let (leaderboard, store) = match store_path {
        Some(path) => {
            let entries = JsonlStore::load(&path).unwrap_or_else(|e| bail(e));
            info!(path = %path.display(), entries = entries.len(), "hydrated from store");
            let store = JsonlStore::open(&path).unwrap_or_else(|e| bail(e));
            (Leaderboard::from_entries(entries, engine_config), Some(Arc::new(store)))
        }
        None => (Leaderboard::new(engine_config), None),
    };

    let state = AppState {
        leaderboard: SharedLeaderboard::new(leaderboard),
        store,
        page_size,
        top_limit,
        allowed_origin,
    };

    println!("Server starting on port {port}...");
    if let Err(e) = server::serve(addr, state).await {
        bail(format!("Server failed: {e}"));
    }
}

/// Accepts bare IPv4 or IPv6 addresses (`0.0.0.0`, `::`, `[::1]`).
fn bind_addr(bind: &str, port: u16) -> Result<SocketAddr, std::net::AddrParseError> {
    let host = bind.trim().trim_start_matches('[').trim_end_matches(']');
    let ip: IpAddr = host.parse()?;
    Ok(SocketAddr::new(ip, port))
}

async fn run_remote(command: RemoteCommand, cfg: ScoreboardConfig) {
    let base_url = |remote: &RemoteArgs| {
        remote
            .server
            .clone()
            .or_else(|| cfg.server.clone())
            .unwrap_or_else(|| config::DEFAULT_SERVER_URL.to_string())
    };

    match command {
        RemoteCommand::Submit(args) => {
            let score = scoreboard_core::parse_score(&args.score).unwrap_or_else(|e| bail(e));
            let client = ScoreboardClient::new(&base_url(&args.remote));
            let resp = client
                .submit(&args.name, score, args.time.as_deref())
                .await
                .unwrap_or_else(|e| bail(e));
            if args.remote.json {
                output::print_json(&resp);
            } else {
                println!("{}", resp.message);
            }
        }
        RemoteCommand::Leaderboard(args) => {
            let client = ScoreboardClient::new(&base_url(&args.remote));
            let entries = client.page(args.page, args.size).await.unwrap_or_else(|e| bail(e));
            if args.remote.json {
                output::print_json(&entries);
            } else {
                output::print_table(&entries);
            }
        }
        RemoteCommand::Top(args) => {
            let client = ScoreboardClient::new(&base_url(&args.remote));
            let entries = client.top(args.limit).await.unwrap_or_else(|e| bail(e));
            if args.remote.json {
                output::print_json(&entries);
            } else {
                output::print_table(&entries);
            }
        }
        RemoteCommand::Remove(args) => {
            let client = ScoreboardClient::new(&base_url(&args.remote));
            let resp = client.remove(&args.name).await.unwrap_or_else(|e| bail(e));
            if args.remote.json {
                output::print_json(&resp);
            } else {
                println!("{} ({} removed)", resp.message, resp.removed);
            }
        }
        RemoteCommand::Standing(args) => {
            let client = ScoreboardClient::new(&base_url(&args.remote));
            match client.standing(&args.name).await.unwrap_or_else(|e| bail(e)) {
                Some(standing) if args.remote.json => output::print_json(&standing),
                Some(standing) => output::print_standing(&standing),
                None => bail(format!("No entries for \"{}\"", args.name)),
            }
        }
        RemoteCommand::Summary(args) => {
            let client = ScoreboardClient::new(&base_url(&args));
            let summary = client.summary().await.unwrap_or_else(|e| bail(e));
            if args.json {
                output::print_json(&summary);
            } else {
                output::print_summary(&summary);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_negative_score() {
        let cli = Cli::try_parse_from(["scoreboard", "submit", "ana", "-5", "--time", "12:00"]).unwrap();
        match cli.command {
            Commands::Remote(RemoteCommand::Submit(args)) => {
                assert_eq!(args.name, "ana");
                assert_eq!(args.score, "-5");
                assert_eq!(args.time.as_deref(), Some("12:00"));
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_parse_serve_positional_port() {
        let cli = Cli::try_parse_from(["scoreboard", "serve", "4000", "--store", "s.jsonl"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(4000));
                assert_eq!(args.store, Some(PathBuf::from("s.jsonl")));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_leaderboard_page_defaults_to_one() {
        let cli = Cli::try_parse_from(["scoreboard", "leaderboard", "--json"]).unwrap();
        match cli.command {
            Commands::Remote(RemoteCommand::Leaderboard(args)) => {
                assert_eq!(args.page, 1);
                assert!(args.remote.json);
            }
            _ => panic!("expected leaderboard"),
        }
    }

    #[test]
    fn test_bind_addr_accepts_ipv4_and_ipv6() {
        assert_eq!(bind_addr("0.0.0.0", 3500).unwrap().to_string(), "0.0.0.0:3500");
        assert_eq!(bind_addr("::", 3500).unwrap().to_string(), "[::]:3500");
        assert_eq!(bind_addr("[::1]", 80).unwrap().to_string(), "[::1]:80");
        assert!(bind_addr("localhost", 80).is_err());
    }
}
