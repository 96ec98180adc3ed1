//! astraeus - conversational analytics insights CLI
//!
//! A thin line-mode consumer of the streaming core: it submits queries,
//! prints answer deltas as they arrive, and leaves all presentation
//! beyond plain text to other display layers.

mod config;

use std::io::Write as _;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use astraeus_chat::{ChatManager, TurnEvent};
use astraeus_stream::InsightsClient;

/// astraeus - conversational analytics insights
#[derive(Parser, Debug)]
#[command(name = "astraeus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:8000)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Dataset to query (par, dfr)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Run a single query and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Print the rendered markup after each completed answer
    #[arg(long)]
    markup: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

/// Dataset selector; picks the backend streaming endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dataset {
    Par,
    Dfr,
}

impl Dataset {
    fn stream_path(self) -> &'static str {
        match self {
            Dataset::Par => "/par/stream-insights",
            Dataset::Dfr => "/dfr/stream-insights",
        }
    }
}

fn parse_dataset(s: &str) -> Option<Dataset> {
    match s.to_lowercase().as_str() {
        "par" => Some(Dataset::Par),
        "dfr" => Some(Dataset::Dfr),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("astraeus=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    let endpoint = args
        .endpoint
        .or(cfg.endpoint)
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let dataset = match args.dataset.or(cfg.dataset) {
        Some(name) => parse_dataset(&name)
            .ok_or_else(|| anyhow::anyhow!("unknown dataset: {name} (expected par or dfr)"))?,
        None => Dataset::Par,
    };
    let markup = args.markup || cfg.markup.unwrap_or(false);

    let url = format!("{}{}", endpoint.trim_end_matches('/'), dataset.stream_path());
    tracing::debug!("streaming endpoint: {}", url);

    let mut manager = ChatManager::new(Arc::new(InsightsClient::new(url)));

    if let Some(query) = args.command {
        println!("astraeus> {}", query);
        println!();
        run_query(&mut manager, &query, markup).await;
        return Ok(());
    }

    run_interactive(&mut manager, markup).await
}

async fn run_interactive(manager: &mut ChatManager, markup: bool) -> anyhow::Result<()> {
    use tokio::io::AsyncBufReadExt;

    println!("astraeus - ask about your dataset (\"exit\" to leave)");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("astraeus> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        run_query(manager, input, markup).await;
    }

    Ok(())
}

/// Submit one query, printing deltas as they arrive. Ctrl-C while the
/// stream is open cancels it, which resolves the turn to failed.
async fn run_query(manager: &mut ChatManager, query: &str, markup: bool) {
    if query.trim().is_empty() {
        return;
    }

    let mut rx = manager.subscribe();
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        })
    };

    let (result, ()) = tokio::join!(manager.submit_with_cancel(query, cancel), async {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let done = event.is_terminal();
                    print_event(&event, markup);
                    if done {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
    watcher.abort();

    if let Err(e) = result {
        if !e.is_rejection() {
            eprintln!("Error: {}", e);
        }
    }
}

fn print_event(event: &TurnEvent, markup: bool) {
    match event {
        TurnEvent::StreamUpdate { delta, .. } => {
            print!("{}", delta);
            let _ = std::io::stdout().flush();
        }
        TurnEvent::StreamEnd { turn } => {
            println!();
            if markup {
                if let Some(rendered) = &turn.rendered_markup {
                    println!("\n{}", rendered);
                }
            }
        }
        TurnEvent::StreamFailed { turn } => {
            eprintln!("{}", turn.text);
        }
        TurnEvent::Submitted { .. } | TurnEvent::StreamStart { .. } => {}
    }
}
